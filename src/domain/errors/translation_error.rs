use crate::domain::entities::language::Language;
use crate::domain::errors::collection_error::CollectionError;

/// Errors raised by the translation machinery.
///
/// [`Configuration`](TranslationError::Configuration) and
/// [`Consistency`](TranslationError::Consistency) are fatal and are never
/// caught inside this crate. [`Resolution`](TranslationError::Resolution)
/// is raised per call by a read or write that could not locate its
/// translation row.
#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("Translation mapping of `{class}` is invalid: {source}")]
    Configuration {
        class: String,
        #[source]
        source: MappingError,
    },
    #[error("Cannot resolve field `{field}` of `{class}` in language `{language}`: {source}")]
    Resolution {
        class: String,
        field: String,
        language: Language,
        #[source]
        source: CollectionError,
    },
    #[error("Internal consistency violated: {0}")]
    Consistency(String),
}

impl TranslationError {
    pub fn configuration(class: &str, source: MappingError) -> Self {
        Self::Configuration {
            class: class.to_string(),
            source,
        }
    }

    pub fn consistency(message: impl Into<String>) -> Self {
        Self::Consistency(message.into())
    }
}

/// The piece of translation wiring that is missing or unresolvable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MappingError {
    #[error("class `{0}` is not registered")]
    UnknownClass(String),
    #[error("field `{field}` is not declared on `{class}`")]
    UnknownField { class: String, field: String },
    #[error("no association is marked as the translation collection")]
    MissingTranslationCollection,
    #[error("translation collection `{field}` is not a one-to-many association")]
    NotAOneToMany { field: String },
    #[error("translation class `{class}` has no field `{mapped_by}` linking back to the parent")]
    MissingParentLink { class: String, mapped_by: String },
    #[error("translation class `{0}` has no field marked as the language field")]
    MissingLanguageField(String),
    #[error("translatable field `{field}` is not stored through the translatable column type")]
    NotATranslatableColumn { field: String },
    #[error("no field is marked as translatable")]
    MissingTranslatableFields,
    #[error("translatable field `{field}` has no counterpart `{target}` on `{class}`")]
    MissingTranslatedField {
        field: String,
        class: String,
        target: String,
    },
    #[error("no primary language is declared on the class or its ancestors")]
    MissingPrimaryLanguage,
    #[error("translation class `{0}` cannot be instantiated")]
    NotInstantiable(String),
}
