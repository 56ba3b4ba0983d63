use crate::domain::entities::entity::{EntityRef, FieldValue, ObjectIdentity};
use crate::domain::errors::translation_error::TranslationError;
use crate::domain::model::class_model::FieldKind;
use crate::domain::model::registry::{ClassRegistry, FieldRef};
use crate::domain::ports::secondary::lifecycle::{LifecycleListener, PersistenceSession};
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use tracing::debug;

type ColumnSnapshot = Vec<(String, Option<String>)>;

/// In-memory persistence engine driving a [`LifecycleListener`].
///
/// Tracks managed entities in an identity map and detects changes by
/// comparing their column values with the snapshot taken at load time or
/// at the previous flush. Translatable fields go through the primary column
/// adapter, so a proxy left in place fails the flush.
pub struct UnitOfWork {
    registry: Rc<ClassRegistry>,
    listener: Rc<dyn LifecycleListener>,
    entities: BTreeMap<ObjectIdentity, EntityRef>,
    snapshots: HashMap<ObjectIdentity, ColumnSnapshot>,
    write_count: usize,
}

impl UnitOfWork {
    #[must_use]
    pub fn new(registry: Rc<ClassRegistry>, listener: Rc<dyn LifecycleListener>) -> Self {
        Self {
            registry,
            listener,
            entities: BTreeMap::new(),
            snapshots: HashMap::new(),
            write_count: 0,
        }
    }

    /// Registers an entity hydrated from storage.
    ///
    /// The entity is only registered once the listener accepted it.
    ///
    /// # Errors
    ///
    /// Returns a [`TranslationError`] raised by the listener or while
    /// reading the entity's columns.
    pub fn load(&mut self, entity: EntityRef) -> Result<(), TranslationError> {
        let identity = entity.borrow().identity();
        let columns = self.columns(&entity)?;
        self.listener.post_load(&entity)?;
        self.snapshots.insert(identity, columns);
        self.entities.insert(identity, entity);
        Ok(())
    }

    /// Registers a new entity for insertion by the next flush.
    ///
    /// Persisting an entity twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a [`TranslationError`] raised by the listener; the entity is
    /// then left unregistered.
    pub fn persist(&mut self, entity: EntityRef) -> Result<(), TranslationError> {
        let identity = entity.borrow().identity();
        if self.entities.contains_key(&identity) {
            return Ok(());
        }
        self.listener.pre_persist(&entity)?;
        self.entities.insert(identity, entity);
        Ok(())
    }

    /// Writes every new or changed entity and returns the number of writes.
    ///
    /// Proxies are expanded again whether or not the writes succeed, and a
    /// failed flush leaves every snapshot untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`TranslationError`] raised by the listener or by the
    /// column adapter.
    pub fn flush(&mut self) -> Result<usize, TranslationError> {
        let listener = Rc::clone(&self.listener);
        listener.pre_flush(self)?;
        let written = self.write_changes();
        let reinstated = listener.post_flush();

        let writes = written?;
        reinstated?;
        debug!("Flush wrote {} entities", writes);
        Ok(writes)
    }

    fn write_changes(&mut self) -> Result<usize, TranslationError> {
        let mut changed = Vec::new();
        for (identity, entity) in &self.entities {
            let columns = self.columns(entity)?;
            if self.snapshots.get(identity) != Some(&columns) {
                changed.push((*identity, columns));
            }
        }

        let writes = changed.len();
        self.snapshots.extend(changed);
        self.write_count += writes;
        Ok(writes)
    }

    /// Forgets every managed entity, as at the end of a request.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.snapshots.clear();
    }

    pub fn contains(&self, identity: ObjectIdentity) -> bool {
        self.entities.contains_key(&identity)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Total number of entity writes performed by all flushes.
    pub const fn write_count(&self) -> usize {
        self.write_count
    }

    fn columns(&self, entity: &EntityRef) -> Result<ColumnSnapshot, TranslationError> {
        let entity = entity.borrow();
        let mut columns = Vec::new();
        for model in self.registry.lineage(entity.class_name())? {
            for field in &model.fields {
                if matches!(field.kind, FieldKind::ToMany { .. }) {
                    continue;
                }
                let accessor = self.registry.accessor(&FieldRef::new(&model.name, &field.name))?;
                let value = match accessor.get(&*entity)? {
                    FieldValue::Null => None,
                    FieldValue::Text(text) => Some(text),
                    FieldValue::Translatable(value) => value.to_column()?.map(str::to_string),
                    FieldValue::Reference(parent) => parent
                        .upgrade()
                        .map(|parent| parent.borrow().identity().to_string()),
                    FieldValue::Collection(_) => {
                        return Err(TranslationError::consistency(format!(
                            "column `{}` of `{}` holds a collection",
                            field.name, model.name
                        )));
                    }
                };
                columns.push((field.name.clone(), value));
            }
        }
        Ok(columns)
    }
}

impl PersistenceSession for UnitOfWork {
    fn persist(&mut self, entity: EntityRef) -> Result<(), TranslationError> {
        Self::persist(self, entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::collection::Criteria;
    use crate::domain::entities::entity::{Entity, entity_ref};
    use crate::domain::entities::language::{DefaultLanguage, Language};
    use crate::domain::ports::primary::translatable::Translatable;
    use crate::domain::services::translation_listener::TranslationListener;
    use crate::infrastructure::memory::metadata_cache::InMemoryMetadataCache;
    use crate::test_fixtures::{self, Article};
    use std::cell::RefCell;

    fn unit_of_work() -> (UnitOfWork, Rc<TranslationListener>) {
        let registry = Rc::new(test_fixtures::registry());
        let listener = Rc::new(TranslationListener::new(
            Rc::clone(&registry),
            Rc::new(InMemoryMetadataCache::new()),
            DefaultLanguage::new(Language::new("en_GB")),
        ));
        (UnitOfWork::new(registry, listener.clone()), listener)
    }

    struct Unmapped {
        identity: ObjectIdentity,
    }

    impl Entity for Unmapped {
        fn class_name(&self) -> &str {
            "Unmapped"
        }

        fn identity(&self) -> ObjectIdentity {
            self.identity
        }

        fn read_field(&self, _: &str) -> Option<FieldValue> {
            None
        }

        fn write_field(&mut self, _: &str, _: FieldValue) -> bool {
            false
        }
    }

    fn german_row(article: &Rc<RefCell<Article>>) -> EntityRef {
        article
            .borrow()
            .translations
            .matching(&Criteria::eq("locale", "de_DE"))
            .unwrap()
            .remove(0)
    }

    #[test]
    fn unchanged_entities_are_not_written() {
        let (mut uow, _) = unit_of_work();
        let article = test_fixtures::article_with_rows("text en_GB", &[("de_DE", "text de_DE")]);
        uow.load(article.clone()).unwrap();
        uow.load(german_row(&article)).unwrap();
        article
            .borrow()
            .title
            .translate(Some(&Language::new("de_DE")))
            .unwrap();

        assert_eq!(uow.flush().unwrap(), 0);
        assert_eq!(uow.write_count(), 0);
        assert_eq!(uow.len(), 2);
        assert!(article.borrow().title.as_managed().is_some());
    }

    #[test]
    fn changed_translation_row_is_the_only_write() {
        let (mut uow, _) = unit_of_work();
        let article = test_fixtures::article_with_rows("text en_GB", &[("de_DE", "text de_DE")]);
        let row = german_row(&article);
        uow.load(article.clone()).unwrap();
        uow.load(row.clone()).unwrap();

        article
            .borrow()
            .title
            .set_translation(Some("neu".into()), Some(&Language::new("de_DE")))
            .unwrap();

        assert_eq!(uow.flush().unwrap(), 1);
        assert_eq!(uow.len(), 2);
        assert_eq!(row.borrow().read_field("title").unwrap().as_text(), Some("neu"));
    }

    #[test]
    fn failed_flush_reinstates_proxies_and_keeps_snapshots() {
        let (mut uow, listener) = unit_of_work();
        let article = test_fixtures::article_with_rows("old", &[]);
        uow.load(article.clone()).unwrap();
        article
            .borrow()
            .title
            .set_translation(Some("new".into()), None)
            .unwrap();
        let unmanaged = Article::shared(Article::new("detached"));
        let unmanaged_identity = unmanaged.borrow().identity;
        uow.entities.insert(unmanaged_identity, unmanaged);

        assert!(matches!(uow.flush(), Err(TranslationError::Consistency(_))));
        assert!(article.borrow().title.as_managed().is_some());
        assert_eq!(listener.pending_count(), 0);

        uow.entities.remove(&unmanaged_identity);

        assert_eq!(uow.flush().unwrap(), 1);
        assert!(article.borrow().title.as_managed().is_some());
    }

    #[test]
    fn rejected_entities_are_not_registered() {
        let (mut uow, listener) = unit_of_work();
        let article = test_fixtures::article_with_rows("text", &[]);
        uow.load(article.clone()).unwrap();
        let unmapped = entity_ref(Unmapped {
            identity: ObjectIdentity::new(),
        });

        assert!(uow.persist(unmapped.clone()).is_err());
        assert!(!uow.contains(unmapped.borrow().identity()));
        assert!(uow.load(unmapped).is_err());
        assert_eq!(uow.len(), 1);

        assert_eq!(uow.flush().unwrap(), 0);
        assert!(article.borrow().title.as_managed().is_some());
        assert_eq!(listener.pending_count(), 0);
    }

    #[test]
    fn primary_change_is_written_once() {
        let (mut uow, _) = unit_of_work();
        let article = test_fixtures::article_with_rows("old", &[]);
        uow.load(article.clone()).unwrap();
        article
            .borrow()
            .title
            .set_translation(Some("new".into()), None)
            .unwrap();

        assert_eq!(uow.flush().unwrap(), 1);
        assert_eq!(uow.flush().unwrap(), 0);
        assert_eq!(uow.write_count(), 1);
    }

    #[test]
    fn new_rows_are_persisted_by_the_same_flush() {
        let (mut uow, _) = unit_of_work();
        let article = test_fixtures::article_with_rows("text en_GB", &[]);
        uow.load(article.clone()).unwrap();
        article
            .borrow()
            .title
            .set_translation(Some("texte".into()), Some(&Language::new("fr_FR")))
            .unwrap();

        assert_eq!(uow.flush().unwrap(), 1);
        assert_eq!(uow.len(), 2);
        assert_eq!(uow.flush().unwrap(), 0);
    }

    #[test]
    fn persisting_twice_is_a_no_op() {
        let (mut uow, listener) = unit_of_work();
        let article = Article::shared(Article::new("base text"));

        uow.persist(article.clone()).unwrap();
        uow.persist(article.clone()).unwrap();

        assert_eq!(uow.len(), 1);
        assert_eq!(listener.managed_count(), 1);
        assert_eq!(uow.flush().unwrap(), 1);
    }

    #[test]
    fn proxies_reaching_the_column_adapter_fail_the_flush() {
        let (mut uow, _) = unit_of_work();
        let article = Article::shared(Article::new("base text"));
        uow.entities
            .insert(article.borrow().identity, article.clone());

        assert!(matches!(uow.flush(), Err(TranslationError::Consistency(_))));
    }
}
