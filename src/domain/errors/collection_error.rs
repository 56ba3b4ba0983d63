/// Failure raised by a [`Selectable`](crate::domain::entities::collection::Selectable)
/// collection while filtering its rows.
#[derive(Debug, thiserror::Error)]
pub enum CollectionError {
    #[error("Collection storage error: {0}")]
    Storage(String),
    #[error("Row of class `{class}` does not expose field `{field}`")]
    UnknownField { class: String, field: String },
}
