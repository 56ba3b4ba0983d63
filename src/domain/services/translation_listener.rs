use crate::config::settings::TranslationSettings;
use crate::domain::entities::entity::{EntityRef, ObjectIdentity, WeakEntityRef};
use crate::domain::entities::language::DefaultLanguage;
use crate::domain::errors::translation_error::TranslationError;
use crate::domain::model::registry::ClassRegistry;
use crate::domain::ports::secondary::lifecycle::{LifecycleListener, PersistenceSession};
use crate::domain::ports::secondary::metadata_cache::MetadataCache;
use crate::domain::services::class_metadata::{ClassTranslationMetadata, MetadataSnapshot};
use crate::domain::services::translation_proxy::{TranslationCache, TranslationProxy};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use tracing::{debug, warn};

type KnownMetadata = Option<Rc<ClassTranslationMetadata>>;

/// Connects translation proxies to the persistence engine's lifecycle.
///
/// Injects managed proxies when entities are loaded or first persisted,
/// collapses them around every flush and registers the translation rows
/// created in between.
pub struct TranslationListener {
    registry: Rc<ClassRegistry>,
    metadata_cache: Rc<dyn MetadataCache>,
    settings: TranslationSettings,
    default_language: DefaultLanguage,
    translation_cache: TranslationCache,
    metadata: RefCell<HashMap<String, KnownMetadata>>,
    managed_entities: RefCell<BTreeMap<ObjectIdentity, WeakEntityRef>>,
    ejected: RefCell<Vec<Rc<TranslationProxy>>>,
}

impl TranslationListener {
    #[must_use]
    pub fn new(
        registry: Rc<ClassRegistry>,
        metadata_cache: Rc<dyn MetadataCache>,
        default_language: DefaultLanguage,
    ) -> Self {
        Self::with_settings(
            registry,
            metadata_cache,
            default_language,
            TranslationSettings::default(),
        )
    }

    #[must_use]
    pub fn with_settings(
        registry: Rc<ClassRegistry>,
        metadata_cache: Rc<dyn MetadataCache>,
        default_language: DefaultLanguage,
        settings: TranslationSettings,
    ) -> Self {
        Self {
            registry,
            metadata_cache,
            settings,
            default_language,
            translation_cache: TranslationCache::new(),
            metadata: RefCell::new(HashMap::new()),
            managed_entities: RefCell::new(BTreeMap::new()),
            ejected: RefCell::new(Vec::new()),
        }
    }

    pub const fn default_language(&self) -> &DefaultLanguage {
        &self.default_language
    }

    pub const fn translation_cache(&self) -> &TranslationCache {
        &self.translation_cache
    }

    /// Number of remembered entities, dead ones not yet pruned included.
    pub fn managed_count(&self) -> usize {
        self.managed_entities.borrow().len()
    }

    /// Number of proxies collapsed by the running flush.
    pub fn pending_count(&self) -> usize {
        self.ejected.borrow().len()
    }

    /// Metadata of the class and of every ancestor declaring its own, leaf first.
    ///
    /// # Errors
    ///
    /// Returns a [`Configuration`](TranslationError::Configuration) error if
    /// the class or an ancestor has incomplete translation wiring.
    pub fn translation_metadatas(
        &self,
        class: &str,
    ) -> Result<Vec<Rc<ClassTranslationMetadata>>, TranslationError> {
        let lineage: Vec<String> = self
            .registry
            .lineage(class)?
            .into_iter()
            .map(|model| model.name.clone())
            .collect();

        let mut found = Vec::new();
        for name in lineage {
            if let Some(metadata) = self.load_translation_metadata_for_class(&name)? {
                found.push(metadata);
            }
        }
        Ok(found)
    }

    /// Metadata declared by this very class, looked up in memory, then in the
    /// external cache, then parsed from the class model.
    ///
    /// A class without translations is remembered as such at both tiers.
    /// Cache failures and unreadable or stale snapshots count as misses.
    ///
    /// # Errors
    ///
    /// Returns a [`Configuration`](TranslationError::Configuration) error if
    /// the class has incomplete translation wiring.
    pub fn load_translation_metadata_for_class(
        &self,
        class: &str,
    ) -> Result<KnownMetadata, TranslationError> {
        if let Some(known) = self.metadata.borrow().get(class) {
            return Ok(known.clone());
        }

        let key = self.settings.cache_key(class);
        let metadata = match self.cached_snapshot(&key) {
            Some(None) => None,
            Some(Some(snapshot)) => {
                match ClassTranslationMetadata::wakeup(snapshot, &self.registry) {
                    Ok(metadata) => Some(metadata),
                    Err(e) => {
                        warn!("Stale translation metadata for {}, parsing again: {}", class, e);
                        self.parse_and_store(class, &key)?
                    }
                }
            }
            None => self.parse_and_store(class, &key)?,
        };

        let metadata = metadata.map(Rc::new);
        self.metadata
            .borrow_mut()
            .insert(class.to_string(), metadata.clone());
        Ok(metadata)
    }

    fn cached_snapshot(&self, key: &str) -> Option<Option<MetadataSnapshot>> {
        let payload = match self.metadata_cache.fetch(key) {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("Translation metadata cache miss: {}", key);
                return None;
            }
            Err(e) => {
                warn!("Failed to read translation metadata cache entry {}: {}", key, e);
                return None;
            }
        };

        match serde_json::from_slice(&payload) {
            Ok(snapshot) => {
                debug!("Translation metadata cache hit: {}", key);
                Some(snapshot)
            }
            Err(e) => {
                warn!("Discarding unreadable translation metadata entry {}: {}", key, e);
                None
            }
        }
    }

    fn parse_and_store(
        &self,
        class: &str,
        key: &str,
    ) -> Result<Option<ClassTranslationMetadata>, TranslationError> {
        let metadata = ClassTranslationMetadata::parse_from_class(class, &self.registry)?;
        debug!(
            "Parsed translation metadata for {} (translatable: {})",
            class,
            metadata.is_some()
        );

        let snapshot = metadata.as_ref().map(ClassTranslationMetadata::sleep);
        match serde_json::to_vec(&snapshot) {
            Ok(payload) => {
                if let Err(e) = self.metadata_cache.save(key, &payload) {
                    warn!("Failed to save translation metadata for {}: {}", class, e);
                }
            }
            Err(e) => warn!("Failed to serialize translation metadata for {}: {}", class, e),
        }
        Ok(metadata)
    }

    fn inject(&self, entity: &EntityRef) -> Result<(), TranslationError> {
        let (class, identity) = {
            let entity = entity.borrow();
            (entity.class_name().to_string(), entity.identity())
        };

        let mut managed = 0;
        for metadata in self.translation_metadatas(&class)? {
            managed += metadata.inject_new_persistent_translatables(
                entity,
                &self.default_language,
                &self.translation_cache,
            )?;
        }
        if managed > 0 {
            self.managed_entities
                .borrow_mut()
                .insert(identity, Rc::downgrade(entity));
        }
        Ok(())
    }

    fn alive_entities(&self) -> Vec<EntityRef> {
        let mut entities = self.managed_entities.borrow_mut();
        let mut alive = Vec::with_capacity(entities.len());
        entities.retain(|identity, entity| match entity.upgrade() {
            Some(entity) => {
                alive.push(entity);
                true
            }
            None => {
                self.translation_cache.evict(*identity);
                false
            }
        });
        alive
    }

    fn collapse_managed(
        &self,
        session: &mut dyn PersistenceSession,
    ) -> Result<(), TranslationError> {
        for entity in self.alive_entities() {
            let class = entity.borrow().class_name().to_string();
            for metadata in self.translation_metadatas(&class)? {
                let proxies = metadata.eject_persistent_translatables(&entity)?;
                self.ejected.borrow_mut().extend(proxies);
            }
        }

        let proxies = self.ejected.borrow().clone();
        let new_rows: Vec<EntityRef> = proxies
            .iter()
            .flat_map(|proxy| proxy.new_translations())
            .collect();
        debug!("Registering {} new translation rows", new_rows.len());
        for row in new_rows {
            session.persist(row)?;
        }
        for proxy in &proxies {
            proxy.take_new_translations();
        }
        Ok(())
    }

    fn reinstate_ejected(&self) -> Result<(), TranslationError> {
        let pending = self.ejected.take();
        let mut result = Ok(());
        for proxy in &pending {
            result = result.and(proxy.reinstate().map(drop));
        }
        result
    }
}

impl LifecycleListener for TranslationListener {
    fn post_load(&self, entity: &EntityRef) -> Result<(), TranslationError> {
        self.inject(entity)
    }

    fn pre_persist(&self, entity: &EntityRef) -> Result<(), TranslationError> {
        self.inject(entity)
    }

    /// Collapses every managed proxy and registers the rows they created.
    ///
    /// On failure the proxies collapsed so far are expanded again and rows
    /// not yet registered stay pending for the next flush.
    fn pre_flush(&self, session: &mut dyn PersistenceSession) -> Result<(), TranslationError> {
        if let Err(e) = self.collapse_managed(session) {
            if let Err(reinstate) = self.reinstate_ejected() {
                warn!("Flush aborted with proxies left collapsed: {}", reinstate);
            }
            return Err(e);
        }
        Ok(())
    }

    fn post_flush(&self) -> Result<(), TranslationError> {
        self.reinstate_ejected()
    }
}
