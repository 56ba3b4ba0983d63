use crate::domain::entities::entity::{Entity, EntityRef, FieldValue};
use crate::domain::entities::language::{DefaultLanguage, Language};
use crate::domain::entities::translatable_value::TranslatableValue;
use crate::domain::errors::translation_error::{MappingError, TranslationError};
use crate::domain::model::class_model::{ColumnType, FieldKind, TranslationMarker};
use crate::domain::model::registry::{ClassRegistry, FieldAccessor, FieldRef};
use crate::domain::services::translation_proxy::{
    ProxyContext, ProxyOwner, TranslationCache, TranslationProxy,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

/// A translatable field of the entity paired with its counterpart on the
/// translation class.
#[derive(Clone, Debug)]
pub struct TranslatedField {
    pub property: FieldAccessor,
    pub translation: FieldAccessor,
}

/// Reflection-free form of [`ClassTranslationMetadata`], suitable for an
/// external cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataSnapshot {
    pub class: String,
    pub primary_language: Language,
    pub translation_class: String,
    pub translated_fields: Vec<(FieldRef, FieldRef)>,
    pub translations_field: FieldRef,
    pub parent_field: FieldRef,
    pub language_field: FieldRef,
}

/// Translation wiring of one class, covering only the fields it declares itself.
///
/// Either complete or absent: parsing never yields partial metadata.
pub struct ClassTranslationMetadata {
    class: String,
    primary_language: Language,
    translation_class: String,
    translated_fields: Vec<TranslatedField>,
    translations_field: FieldAccessor,
    parent_field: FieldAccessor,
    language_field: FieldAccessor,
    registry: Rc<ClassRegistry>,
}

impl ClassTranslationMetadata {
    /// Introspects the class model for translation markers.
    ///
    /// Returns `Ok(None)` when the class declares neither a translation
    /// collection nor translatable fields. The primary language is taken
    /// from the nearest class in the lineage that declares one.
    ///
    /// # Errors
    ///
    /// Returns a [`Configuration`](TranslationError::Configuration) error if
    /// the class declares some of the wiring but a piece is missing, naming
    /// that piece.
    pub fn parse_from_class(
        class: &str,
        registry: &Rc<ClassRegistry>,
    ) -> Result<Option<Self>, TranslationError> {
        let lineage = registry.lineage(class)?;
        let model = lineage[0];
        let fail = |source: MappingError| TranslationError::configuration(class, source);

        let collection = model
            .fields_marked(|marker| matches!(marker, TranslationMarker::TranslationCollection))
            .next();
        let translatable: Vec<_> = model
            .fields_marked(|marker| matches!(marker, TranslationMarker::Translatable { .. }))
            .collect();
        if collection.is_none() && translatable.is_empty() {
            return Ok(None);
        }

        let collection =
            collection.ok_or_else(|| fail(MappingError::MissingTranslationCollection))?;
        let FieldKind::ToMany { target, mapped_by } = &collection.kind else {
            return Err(fail(MappingError::NotAOneToMany {
                field: collection.name.clone(),
            }));
        };
        let translations_field = registry.accessor(&FieldRef::new(class, &collection.name))?;
        let parent_field = registry.find_field(target, mapped_by)?.ok_or_else(|| {
            fail(MappingError::MissingParentLink {
                class: target.clone(),
                mapped_by: mapped_by.clone(),
            })
        })?;
        let language_field = Self::find_language_field(target, registry)?
            .ok_or_else(|| fail(MappingError::MissingLanguageField(target.clone())))?;

        if translatable.is_empty() {
            return Err(fail(MappingError::MissingTranslatableFields));
        }
        let mut translated_fields = Vec::with_capacity(translatable.len());
        for field in translatable {
            if field.kind != FieldKind::Scalar(ColumnType::Translatable) {
                return Err(fail(MappingError::NotATranslatableColumn {
                    field: field.name.clone(),
                }));
            }
            let counterpart = field.translated_target().unwrap_or(&field.name);
            let translation = registry.find_field(target, counterpart)?.ok_or_else(|| {
                fail(MappingError::MissingTranslatedField {
                    field: field.name.clone(),
                    class: target.clone(),
                    target: counterpart.to_string(),
                })
            })?;
            translated_fields.push(TranslatedField {
                property: registry.accessor(&FieldRef::new(class, &field.name))?,
                translation,
            });
        }

        let primary_language = lineage
            .iter()
            .find_map(|ancestor| ancestor.primary_language.clone())
            .ok_or_else(|| fail(MappingError::MissingPrimaryLanguage))?;

        Ok(Some(Self {
            class: class.to_string(),
            primary_language,
            translation_class: target.clone(),
            translated_fields,
            translations_field,
            parent_field,
            language_field,
            registry: Rc::clone(registry),
        }))
    }

    fn find_language_field(
        translation_class: &str,
        registry: &ClassRegistry,
    ) -> Result<Option<FieldAccessor>, TranslationError> {
        let reference = registry
            .lineage(translation_class)?
            .into_iter()
            .find_map(|model| {
                model
                    .fields_marked(|marker| matches!(marker, TranslationMarker::Language))
                    .next()
                    .map(|field| FieldRef::new(&model.name, &field.name))
            });
        reference.map(|r| registry.accessor(&r)).transpose()
    }

    pub fn sleep(&self) -> MetadataSnapshot {
        MetadataSnapshot {
            class: self.class.clone(),
            primary_language: self.primary_language.clone(),
            translation_class: self.translation_class.clone(),
            translated_fields: self
                .translated_fields
                .iter()
                .map(|field| {
                    (
                        field.property.reference().clone(),
                        field.translation.reference().clone(),
                    )
                })
                .collect(),
            translations_field: self.translations_field.reference().clone(),
            parent_field: self.parent_field.reference().clone(),
            language_field: self.language_field.reference().clone(),
        }
    }

    /// Rebuilds metadata from a snapshot by re-binding every field reference.
    ///
    /// # Errors
    ///
    /// Returns a [`Configuration`](TranslationError::Configuration) error if
    /// a referenced class or field no longer exists in the registry.
    pub fn wakeup(
        snapshot: MetadataSnapshot,
        registry: &Rc<ClassRegistry>,
    ) -> Result<Self, TranslationError> {
        let translated_fields = snapshot
            .translated_fields
            .iter()
            .map(|(property, translation)| {
                Ok(TranslatedField {
                    property: registry.accessor(property)?,
                    translation: registry.accessor(translation)?,
                })
            })
            .collect::<Result<Vec<_>, TranslationError>>()?;

        Ok(Self {
            translations_field: registry.accessor(&snapshot.translations_field)?,
            parent_field: registry.accessor(&snapshot.parent_field)?,
            language_field: registry.accessor(&snapshot.language_field)?,
            class: snapshot.class,
            primary_language: snapshot.primary_language,
            translation_class: snapshot.translation_class,
            translated_fields,
            registry: Rc::clone(registry),
        })
    }

    /// Replaces every translatable field of the entity by a managed proxy.
    ///
    /// A bare value becomes the proxy's primary value; a detached proxy has
    /// its translations copied over. Fields already holding a managed proxy
    /// are left as they are. Returns the number of fields now managed.
    ///
    /// # Errors
    ///
    /// Returns a [`TranslationError`] if:
    /// - A field holds an unexpected value
    ///   ([`Consistency`](TranslationError::Consistency)).
    /// - Copying a detached value fails while creating translation rows.
    pub fn inject_new_persistent_translatables(
        self: &Rc<Self>,
        entity: &EntityRef,
        default_language: &DefaultLanguage,
        cache: &TranslationCache,
    ) -> Result<usize, TranslationError> {
        let context = ProxyContext {
            metadata: Rc::clone(self),
            default_language: default_language.clone(),
            cache: cache.clone(),
        };
        let mut guard = entity.borrow_mut();
        let FieldValue::Collection(translations) = self.translations_field.get(&*guard)? else {
            return Err(TranslationError::consistency(format!(
                "`{}` does not hold a collection in `{}`",
                guard.class_name(),
                self.translations_field.name()
            )));
        };
        let owner = ProxyOwner {
            entity: Rc::downgrade(entity),
            identity: guard.identity(),
            class: guard.class_name().to_string(),
            translations,
        };

        let mut managed = 0;
        for field in &self.translated_fields {
            let proxy = match field.property.get(&*guard)? {
                FieldValue::Translatable(TranslatableValue::Managed(_)) => {
                    managed += 1;
                    continue;
                }
                FieldValue::Translatable(TranslatableValue::Detached(detached)) => {
                    let proxy = Rc::new(TranslationProxy::new(
                        &context,
                        owner.clone(),
                        field.clone(),
                        None,
                    ));
                    detached.copy_into(&*proxy)?;
                    proxy
                }
                FieldValue::Translatable(TranslatableValue::Primary(value)) => Rc::new(
                    TranslationProxy::new(&context, owner.clone(), field.clone(), value),
                ),
                FieldValue::Text(value) => Rc::new(TranslationProxy::new(
                    &context,
                    owner.clone(),
                    field.clone(),
                    Some(value),
                )),
                FieldValue::Null => Rc::new(TranslationProxy::new(
                    &context,
                    owner.clone(),
                    field.clone(),
                    None,
                )),
                other => {
                    return Err(TranslationError::consistency(format!(
                        "translatable field `{}` of `{}` holds {other:?}",
                        field.property.name(),
                        owner.class
                    )));
                }
            };
            proxy.expand(&mut *guard)?;
            managed += 1;
        }
        Ok(managed)
    }

    /// Collapses every managed proxy of the entity to its primary value.
    ///
    /// Returns the proxies in field order so they can be expanded again
    /// after the flush. Either every field is collapsed or none is.
    ///
    /// # Errors
    ///
    /// Returns a [`Consistency`](TranslationError::Consistency) error if a
    /// translatable field does not hold a managed proxy.
    pub fn eject_persistent_translatables(
        &self,
        entity: &EntityRef,
    ) -> Result<Vec<Rc<TranslationProxy>>, TranslationError> {
        let mut guard = entity.borrow_mut();
        let mut ejected = Vec::with_capacity(self.translated_fields.len());
        for field in &self.translated_fields {
            match Self::eject_field(field, &mut *guard) {
                Ok(proxy) => ejected.push(proxy),
                Err(e) => {
                    for proxy in &ejected {
                        proxy.expand(&mut *guard)?;
                    }
                    return Err(e);
                }
            }
        }
        Ok(ejected)
    }

    fn eject_field(
        field: &TranslatedField,
        owner: &mut dyn Entity,
    ) -> Result<Rc<TranslationProxy>, TranslationError> {
        let FieldValue::Translatable(TranslatableValue::Managed(proxy)) = field.property.get(owner)?
        else {
            return Err(TranslationError::consistency(format!(
                "translatable field `{}` of `{}` does not hold a managed proxy",
                field.property.name(),
                owner.class_name()
            )));
        };
        proxy.collapse(owner)?;
        Ok(proxy)
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub const fn primary_language(&self) -> &Language {
        &self.primary_language
    }

    pub fn translation_class(&self) -> &str {
        &self.translation_class
    }

    pub fn translated_fields(&self) -> &[TranslatedField] {
        &self.translated_fields
    }

    pub const fn translations_field(&self) -> &FieldAccessor {
        &self.translations_field
    }

    pub const fn parent_field(&self) -> &FieldAccessor {
        &self.parent_field
    }

    pub const fn language_field(&self) -> &FieldAccessor {
        &self.language_field
    }

    pub fn registry(&self) -> &ClassRegistry {
        &self.registry
    }
}

impl fmt::Debug for ClassTranslationMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassTranslationMetadata")
            .field("snapshot", &self.sleep())
            .finish_non_exhaustive()
    }
}
