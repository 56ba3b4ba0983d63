use crate::domain::entities::collection::EntityCollection;
use crate::domain::entities::translatable_value::TranslatableValue;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use uuid::Uuid;

pub type EntityRef = Rc<RefCell<dyn Entity>>;
pub type WeakEntityRef = Weak<RefCell<dyn Entity>>;

/// Stable per-process surrogate key of an entity instance.
///
/// Only used to key caches; two entities never share one within a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectIdentity(Uuid);

impl ObjectIdentity {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ObjectIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Content of one entity field as seen through reflection.
#[derive(Clone, Debug)]
pub enum FieldValue {
    Null,
    Text(String),
    Translatable(TranslatableValue),
    /// To-one link; held weakly so a child row never keeps its parent alive.
    Reference(WeakEntityRef),
    Collection(EntityCollection),
}

impl FieldValue {
    pub fn text(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::Text)
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value),
            _ => None,
        }
    }
}

/// A persisted object whose fields can be read and written by name.
///
/// Implementations expose every field their class model declares,
/// inherited ones included. Unknown names yield `None` on read and `false`
/// on write, as does a write whose value variant does not fit the field.
pub trait Entity {
    fn class_name(&self) -> &str;

    fn identity(&self) -> ObjectIdentity;

    fn read_field(&self, name: &str) -> Option<FieldValue>;

    fn write_field(&mut self, name: &str, value: FieldValue) -> bool;
}

impl fmt::Debug for dyn Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("class", &self.class_name())
            .field("identity", &self.identity())
            .finish()
    }
}

/// Wraps a concrete entity into a shared [`EntityRef`].
pub fn entity_ref<E: Entity + 'static>(entity: E) -> EntityRef {
    Rc::new(RefCell::new(entity))
}
