use crate::domain::entities::entity::EntityRef;
use crate::domain::entities::language::Language;

/// Storage type of a scalar column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Text,
    /// Text column read and written through the translatable column adapter.
    Translatable,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ColumnType),
    ToOne { target: String },
    ToMany { target: String, mapped_by: String },
}

/// Declarative translation marker placed on a field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TranslationMarker {
    /// The field is translatable; `mapped_to` names its counterpart on the
    /// translation class when it differs.
    Translatable { mapped_to: Option<String> },
    /// The association holding the translation rows.
    TranslationCollection,
    /// The field of a translation class holding its language code.
    Language,
}

#[derive(Clone, Debug)]
pub struct FieldModel {
    pub name: String,
    pub kind: FieldKind,
    pub marker: Option<TranslationMarker>,
}

impl FieldModel {
    pub fn text(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Scalar(ColumnType::Text),
            marker: None,
        }
    }

    pub fn translatable(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Scalar(ColumnType::Translatable),
            marker: Some(TranslationMarker::Translatable { mapped_to: None }),
        }
    }

    pub fn translatable_as(name: &str, mapped_to: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Scalar(ColumnType::Translatable),
            marker: Some(TranslationMarker::Translatable {
                mapped_to: Some(mapped_to.to_string()),
            }),
        }
    }

    pub fn translation_collection(name: &str, target: &str, mapped_by: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::ToMany {
                target: target.to_string(),
                mapped_by: mapped_by.to_string(),
            },
            marker: Some(TranslationMarker::TranslationCollection),
        }
    }

    pub fn language(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Scalar(ColumnType::Text),
            marker: Some(TranslationMarker::Language),
        }
    }

    pub fn to_one(name: &str, target: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::ToOne {
                target: target.to_string(),
            },
            marker: None,
        }
    }

    pub fn to_many(name: &str, target: &str, mapped_by: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::ToMany {
                target: target.to_string(),
                mapped_by: mapped_by.to_string(),
            },
            marker: None,
        }
    }

    /// Name of the counterpart field on the translation class.
    pub fn translated_target(&self) -> Option<&str> {
        match &self.marker {
            Some(TranslationMarker::Translatable { mapped_to }) => {
                Some(mapped_to.as_deref().unwrap_or(&self.name))
            }
            _ => None,
        }
    }
}

/// Mapping metadata of one class: its own declared fields only.
///
/// Inherited fields live on the ancestor's model, reached through `parent`.
#[derive(Clone, Debug)]
pub struct ClassModel {
    pub name: String,
    pub parent: Option<String>,
    pub primary_language: Option<Language>,
    pub fields: Vec<FieldModel>,
    pub factory: Option<fn() -> EntityRef>,
}

impl ClassModel {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            primary_language: None,
            fields: Vec::new(),
            factory: None,
        }
    }

    #[must_use]
    pub fn extends(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    #[must_use]
    pub fn primary_language(mut self, language: &str) -> Self {
        self.primary_language = Some(Language::new(language));
        self
    }

    #[must_use]
    pub fn field(mut self, field: FieldModel) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn factory(mut self, factory: fn() -> EntityRef) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn declared_field(&self, name: &str) -> Option<&FieldModel> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn fields_marked<'a>(
        &'a self,
        predicate: impl Fn(&TranslationMarker) -> bool + 'a,
    ) -> impl Iterator<Item = &'a FieldModel> + 'a {
        self.fields
            .iter()
            .filter(move |field| field.marker.as_ref().is_some_and(&predicate))
    }
}
