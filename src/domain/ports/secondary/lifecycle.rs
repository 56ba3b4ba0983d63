use crate::domain::entities::entity::EntityRef;
use crate::domain::errors::translation_error::TranslationError;

/// The unit of work as seen from a lifecycle listener during pre-flush.
pub trait PersistenceSession {
    /// Schedules a new entity for insertion by the running flush.
    fn persist(&mut self, entity: EntityRef) -> Result<(), TranslationError>;
}

/// Callbacks fired by the persistence engine.
///
/// The engine fires them in the order load/persist, pre-flush, its own
/// change detection and writes, post-flush; exactly once per flush.
pub trait LifecycleListener {
    fn post_load(&self, entity: &EntityRef) -> Result<(), TranslationError>;

    fn pre_persist(&self, entity: &EntityRef) -> Result<(), TranslationError>;

    fn pre_flush(&self, session: &mut dyn PersistenceSession) -> Result<(), TranslationError>;

    fn post_flush(&self) -> Result<(), TranslationError>;
}
