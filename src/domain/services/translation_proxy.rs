use crate::domain::entities::collection::{Criteria, EntityCollection};
use crate::domain::entities::entity::{Entity, EntityRef, FieldValue, ObjectIdentity, WeakEntityRef};
use crate::domain::entities::language::{DefaultLanguage, Language};
use crate::domain::entities::translatable_value::TranslatableValue;
use crate::domain::errors::translation_error::TranslationError;
use crate::domain::ports::primary::translatable::Translatable;
use crate::domain::services::class_metadata::{ClassTranslationMetadata, TranslatedField};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

type RowsByLanguage = HashMap<Language, Option<EntityRef>>;

/// Translation rows already looked up, shared by every proxy of an owner.
///
/// Keyed by owner identity and translation class: inheritance levels with
/// their own translation class never see each other's rows. A cached `None`
/// records that no row exists. Only rows are held strongly; rows reference
/// their owner weakly, so the cache never keeps an owner alive.
#[derive(Clone, Debug, Default)]
pub struct TranslationCache {
    rows: Rc<RefCell<HashMap<(ObjectIdentity, String), RowsByLanguage>>>,
}

impl TranslationCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn get(
        &self,
        key: &(ObjectIdentity, String),
        language: &Language,
    ) -> Option<Option<EntityRef>> {
        self.rows
            .borrow()
            .get(key)
            .and_then(|rows| rows.get(language))
            .cloned()
    }

    fn insert(&self, key: (ObjectIdentity, String), language: Language, row: Option<EntityRef>) {
        self.rows
            .borrow_mut()
            .entry(key)
            .or_default()
            .insert(language, row);
    }

    /// Drops everything cached for an owner.
    pub fn evict(&self, owner: ObjectIdentity) {
        self.rows.borrow_mut().retain(|(identity, _), _| *identity != owner);
    }

    pub fn contains_owner(&self, owner: ObjectIdentity) -> bool {
        self.rows.borrow().keys().any(|(identity, _)| *identity == owner)
    }
}

/// Dependencies shared by all proxies created in one injection pass.
#[derive(Clone, Debug)]
pub struct ProxyContext {
    pub metadata: Rc<ClassTranslationMetadata>,
    pub default_language: DefaultLanguage,
    pub cache: TranslationCache,
}

/// The entity a proxy is embedded in.
#[derive(Clone, Debug)]
pub struct ProxyOwner {
    pub entity: WeakEntityRef,
    pub identity: ObjectIdentity,
    pub class: String,
    pub translations: EntityCollection,
}

/// Managed stand-in for one translatable field of one persisted entity.
///
/// The primary language value lives on the proxy itself; other languages
/// are read from and written to the owner's translation rows, which are
/// looked up lazily and created on first write.
pub struct TranslationProxy {
    owner: ProxyOwner,
    field: TranslatedField,
    metadata: Rc<ClassTranslationMetadata>,
    default_language: DefaultLanguage,
    cache: TranslationCache,
    primary_value: RefCell<Option<String>>,
    new_translations: RefCell<Vec<EntityRef>>,
}

impl TranslationProxy {
    pub fn new(
        context: &ProxyContext,
        owner: ProxyOwner,
        field: TranslatedField,
        primary_value: Option<String>,
    ) -> Self {
        Self {
            owner,
            field,
            metadata: Rc::clone(&context.metadata),
            default_language: context.default_language.clone(),
            cache: context.cache.clone(),
            primary_value: RefCell::new(primary_value),
            new_translations: RefCell::new(Vec::new()),
        }
    }

    pub fn primary_value(&self) -> Option<String> {
        self.primary_value.borrow().clone()
    }

    pub fn primary_language(&self) -> &Language {
        self.metadata.primary_language()
    }

    pub fn field_name(&self) -> &str {
        self.field.property.name()
    }

    /// Rows created since the last reset.
    pub fn new_translations(&self) -> Vec<EntityRef> {
        self.new_translations.borrow().clone()
    }

    /// Returns the rows created since the last call and forgets them.
    ///
    /// The persistence engine does not cascade to these rows, so the caller
    /// must register each one for insertion.
    pub fn take_new_translations(&self) -> Vec<EntityRef> {
        self.new_translations.take()
    }

    /// Replaces the proxy in the owner's field by its bare primary value.
    ///
    /// # Errors
    ///
    /// Returns a [`Consistency`](TranslationError::Consistency) error if the
    /// owner rejects the write.
    pub fn collapse(&self, owner: &mut dyn Entity) -> Result<(), TranslationError> {
        let primary = TranslatableValue::Primary(self.primary_value());
        self.field
            .property
            .set(owner, FieldValue::Translatable(primary))
    }

    /// Installs this very proxy into the owner's field.
    ///
    /// # Errors
    ///
    /// Returns a [`Consistency`](TranslationError::Consistency) error if the
    /// owner rejects the write.
    pub fn expand(self: &Rc<Self>, owner: &mut dyn Entity) -> Result<(), TranslationError> {
        let managed = TranslatableValue::Managed(Rc::clone(self));
        self.field
            .property
            .set(owner, FieldValue::Translatable(managed))
    }

    /// Expands the proxy into its owner if the owner is still alive.
    ///
    /// Returns whether the owner was found.
    ///
    /// # Errors
    ///
    /// Returns a [`Consistency`](TranslationError::Consistency) error if the
    /// owner rejects the write.
    pub fn reinstate(self: &Rc<Self>) -> Result<bool, TranslationError> {
        match self.owner.entity.upgrade() {
            Some(owner) => {
                self.expand(&mut *owner.borrow_mut())?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn resolve_language(&self, language: Option<&Language>) -> Language {
        language
            .cloned()
            .unwrap_or_else(|| self.default_language.get())
    }

    fn cache_key(&self) -> (ObjectIdentity, String) {
        (
            self.owner.identity,
            self.metadata.translation_class().to_string(),
        )
    }

    fn translation_row(&self, language: &Language) -> Result<Option<EntityRef>, TranslationError> {
        let key = self.cache_key();
        if let Some(cached) = self.cache.get(&key, language) {
            return Ok(cached);
        }

        let criteria = Criteria::eq(self.metadata.language_field().name(), language.code());
        let row = self
            .owner
            .translations
            .matching(&criteria)
            .map_err(|source| TranslationError::Resolution {
                class: self.owner.class.clone(),
                field: self.field_name().to_string(),
                language: language.clone(),
                source,
            })?
            .into_iter()
            .next();

        self.cache.insert(key, language.clone(), row.clone());
        Ok(row)
    }

    fn create_translation_row(&self, language: &Language) -> Result<EntityRef, TranslationError> {
        let row = self
            .metadata
            .registry()
            .instantiate(self.metadata.translation_class())?;
        {
            let mut guard = row.borrow_mut();
            self.metadata
                .language_field()
                .set(&mut *guard, FieldValue::Text(language.code().to_string()))?;
            self.metadata
                .parent_field()
                .set(&mut *guard, FieldValue::Reference(self.owner.entity.clone()))?;
        }

        self.owner.translations.add(Rc::clone(&row));
        self.cache
            .insert(self.cache_key(), language.clone(), Some(Rc::clone(&row)));
        self.new_translations.borrow_mut().push(Rc::clone(&row));
        Ok(row)
    }

    fn translated_value(&self, row: &EntityRef) -> Result<Option<String>, TranslationError> {
        let value = self.field.translation.get(&*row.borrow())?;
        Ok(value.as_text().map(str::to_string))
    }
}

impl Translatable for TranslationProxy {
    fn translate(&self, language: Option<&Language>) -> Result<Option<String>, TranslationError> {
        let language = self.resolve_language(language);
        if language == *self.primary_language() {
            return Ok(self.primary_value());
        }

        if let Some(row) = self.translation_row(&language)? {
            if let Some(value) = self.translated_value(&row)? {
                return Ok(Some(value));
            }
        }
        Ok(self.primary_value())
    }

    fn set_translation(
        &self,
        value: Option<String>,
        language: Option<&Language>,
    ) -> Result<(), TranslationError> {
        let language = self.resolve_language(language);
        if language == *self.primary_language() {
            *self.primary_value.borrow_mut() = value;
            return Ok(());
        }

        let row = match self.translation_row(&language)? {
            Some(row) => row,
            None => self.create_translation_row(&language)?,
        };
        self.field
            .translation
            .set(&mut *row.borrow_mut(), FieldValue::text(value))
    }

    fn is_translated_into(&self, language: &Language) -> Result<bool, TranslationError> {
        if language == self.primary_language() {
            return Ok(self
                .primary_value
                .borrow()
                .as_deref()
                .is_some_and(|value| !value.trim().is_empty()));
        }

        match self.translation_row(language)? {
            Some(row) => Ok(self.translated_value(&row)?.is_some()),
            None => Ok(false),
        }
    }
}

impl fmt::Display for TranslationProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.translate(None) {
            Ok(value) => f.write_str(value.as_deref().unwrap_or_default()),
            Err(error) => {
                tracing::error!(
                    class = %self.owner.class,
                    field = %self.field_name(),
                    %error,
                    "Translation could not be rendered; using an empty string"
                );
                Ok(())
            }
        }
    }
}

impl fmt::Debug for TranslationProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationProxy")
            .field("class", &self.owner.class)
            .field("field", &self.field_name())
            .field("owner", &self.owner.identity)
            .field("primary_language", self.primary_language())
            .field("primary_value", &self.primary_value.borrow())
            .finish_non_exhaustive()
    }
}
