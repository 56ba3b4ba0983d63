use crate::domain::entities::entity::{Entity, EntityRef, FieldValue};
use crate::domain::errors::translation_error::{MappingError, TranslationError};
use crate::domain::model::class_model::{ClassModel, FieldModel};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Serializable identification of a field: the class declaring it and its name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FieldRef {
    pub class: String,
    pub field: String,
}

impl FieldRef {
    pub fn new(class: &str, field: &str) -> Self {
        Self {
            class: class.to_string(),
            field: field.to_string(),
        }
    }
}

/// Live handle reading and writing one declared field on entity instances.
#[derive(Clone, Debug)]
pub struct FieldAccessor {
    reference: FieldRef,
    model: FieldModel,
}

impl FieldAccessor {
    pub const fn reference(&self) -> &FieldRef {
        &self.reference
    }

    pub fn name(&self) -> &str {
        &self.reference.field
    }

    pub const fn model(&self) -> &FieldModel {
        &self.model
    }

    /// Reads the field from an entity.
    ///
    /// # Errors
    ///
    /// Returns a [`Consistency`](TranslationError::Consistency) error if the
    /// entity does not expose the field its class model declares.
    pub fn get(&self, entity: &dyn Entity) -> Result<FieldValue, TranslationError> {
        entity.read_field(self.name()).ok_or_else(|| {
            TranslationError::consistency(format!(
                "`{}` does not expose field `{}` declared by `{}`",
                entity.class_name(),
                self.reference.field,
                self.reference.class
            ))
        })
    }

    /// Writes the field on an entity.
    ///
    /// # Errors
    ///
    /// Returns a [`Consistency`](TranslationError::Consistency) error if the
    /// entity rejects the write.
    pub fn set(&self, entity: &mut dyn Entity, value: FieldValue) -> Result<(), TranslationError> {
        if entity.write_field(self.name(), value) {
            Ok(())
        } else {
            Err(TranslationError::consistency(format!(
                "`{}` rejected a write to field `{}` declared by `{}`",
                entity.class_name(),
                self.reference.field,
                self.reference.class
            )))
        }
    }
}

/// Mapping metadata of every persisted class known to the host.
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: HashMap<String, ClassModel>,
}

impl ClassRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, model: ClassModel) -> Self {
        self.register(model);
        self
    }

    pub fn register(&mut self, model: ClassModel) {
        self.classes.insert(model.name.clone(), model);
    }

    /// # Errors
    ///
    /// Returns a [`Configuration`](TranslationError::Configuration) error if
    /// the class is not registered.
    pub fn class(&self, name: &str) -> Result<&ClassModel, TranslationError> {
        self.classes.get(name).ok_or_else(|| {
            TranslationError::configuration(name, MappingError::UnknownClass(name.to_string()))
        })
    }

    /// The class followed by its ancestors, nearest first.
    ///
    /// # Errors
    ///
    /// Returns a [`Configuration`](TranslationError::Configuration) error if
    /// the class or one of its ancestors is not registered.
    pub fn lineage(&self, name: &str) -> Result<Vec<&ClassModel>, TranslationError> {
        let mut chain = Vec::new();
        let mut current = Some(name);
        while let Some(class_name) = current {
            let model = self.class(class_name)?;
            if chain.iter().any(|seen: &&ClassModel| seen.name == model.name) {
                return Err(TranslationError::consistency(format!(
                    "class hierarchy of `{name}` is cyclic"
                )));
            }
            chain.push(model);
            current = model.parent.as_deref();
        }
        Ok(chain)
    }

    /// Re-binds a serialized field reference to a live accessor.
    ///
    /// # Errors
    ///
    /// Returns a [`Configuration`](TranslationError::Configuration) error if
    /// the class is unknown or does not declare the field itself.
    pub fn accessor(&self, reference: &FieldRef) -> Result<FieldAccessor, TranslationError> {
        let model = self.class(&reference.class)?;
        let field = model.declared_field(&reference.field).ok_or_else(|| {
            TranslationError::configuration(
                &reference.class,
                MappingError::UnknownField {
                    class: reference.class.clone(),
                    field: reference.field.clone(),
                },
            )
        })?;
        Ok(FieldAccessor {
            reference: reference.clone(),
            model: field.clone(),
        })
    }

    /// Finds a field declared by the class or any ancestor, nearest first.
    ///
    /// # Errors
    ///
    /// Returns a [`Configuration`](TranslationError::Configuration) error if
    /// part of the lineage is not registered.
    pub fn find_field(
        &self,
        class: &str,
        field: &str,
    ) -> Result<Option<FieldAccessor>, TranslationError> {
        for model in self.lineage(class)? {
            if model.declared_field(field).is_some() {
                return self.accessor(&FieldRef::new(&model.name, field)).map(Some);
            }
        }
        Ok(None)
    }

    /// Creates a blank instance of a class through its registered factory.
    ///
    /// # Errors
    ///
    /// Returns a [`Configuration`](TranslationError::Configuration) error if
    /// the class is unknown or has no factory.
    pub fn instantiate(&self, class: &str) -> Result<EntityRef, TranslationError> {
        let factory = self.class(class)?.factory.ok_or_else(|| {
            TranslationError::configuration(class, MappingError::NotInstantiable(class.to_string()))
        })?;
        Ok(factory())
    }
}
