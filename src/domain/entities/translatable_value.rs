use crate::domain::entities::language::Language;
use crate::domain::errors::translation_error::TranslationError;
use crate::domain::ports::primary::translatable::Translatable;
use crate::domain::services::detached_proxy::DetachedProxy;
use crate::domain::services::translation_proxy::TranslationProxy;
use std::fmt;
use std::rc::Rc;

/// Content of a translatable field.
///
/// - `Primary` holds the bare primary-language value. It is what the column
///   adapter reads from and writes to storage, and what a managed proxy
///   collapses to around a flush.
/// - `Detached` is used by entities that are not yet known to the
///   persistence engine.
/// - `Managed` is the full proxy installed by the lifecycle listener.
///
/// Clones are shallow for both proxy kinds.
#[derive(Clone, Debug)]
pub enum TranslatableValue {
    Primary(Option<String>),
    Detached(DetachedProxy),
    Managed(Rc<TranslationProxy>),
}

impl TranslatableValue {
    /// A detached value stored under no particular language.
    pub fn detached(value: &str) -> Self {
        Self::Detached(DetachedProxy::new(Some(value.to_string()), None))
    }

    /// Wraps a raw stored string, as the column adapter does on read.
    pub const fn from_column(value: Option<String>) -> Self {
        Self::Primary(value)
    }

    /// Extracts the value written to the primary column.
    ///
    /// # Errors
    ///
    /// Returns a [`Consistency`](TranslationError::Consistency) error if the
    /// field still holds a proxy: only collapsed primary values may reach
    /// storage.
    pub fn to_column(&self) -> Result<Option<&str>, TranslationError> {
        match self {
            Self::Primary(value) => Ok(value.as_deref()),
            Self::Detached(_) => Err(TranslationError::consistency(
                "column adapter received a detached proxy instead of a primary value",
            )),
            Self::Managed(_) => Err(TranslationError::consistency(
                "column adapter received a managed proxy instead of a primary value",
            )),
        }
    }

    pub const fn as_managed(&self) -> Option<&Rc<TranslationProxy>> {
        match self {
            Self::Managed(proxy) => Some(proxy),
            _ => None,
        }
    }
}

impl From<&str> for TranslatableValue {
    fn from(value: &str) -> Self {
        Self::Primary(Some(value.to_string()))
    }
}

impl Translatable for TranslatableValue {
    fn translate(&self, language: Option<&Language>) -> Result<Option<String>, TranslationError> {
        match self {
            Self::Primary(value) => Ok(value.clone()),
            Self::Detached(proxy) => proxy.translate(language),
            Self::Managed(proxy) => proxy.translate(language),
        }
    }

    fn set_translation(
        &self,
        value: Option<String>,
        language: Option<&Language>,
    ) -> Result<(), TranslationError> {
        match self {
            Self::Primary(_) => Err(TranslationError::consistency(
                "a bare primary value cannot take translations; wrap it in a proxy first",
            )),
            Self::Detached(proxy) => proxy.set_translation(value, language),
            Self::Managed(proxy) => proxy.set_translation(value, language),
        }
    }

    fn is_translated_into(&self, language: &Language) -> Result<bool, TranslationError> {
        match self {
            Self::Primary(value) => Ok(value.as_deref().is_some_and(|v| !v.trim().is_empty())),
            Self::Detached(proxy) => proxy.is_translated_into(language),
            Self::Managed(proxy) => proxy.is_translated_into(language),
        }
    }
}

impl fmt::Display for TranslatableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary(value) => f.write_str(value.as_deref().unwrap_or_default()),
            Self::Detached(proxy) => fmt::Display::fmt(proxy, f),
            Self::Managed(proxy) => fmt::Display::fmt(proxy, f),
        }
    }
}
