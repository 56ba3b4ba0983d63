use crate::domain::entities::language::Language;
use crate::domain::errors::translation_error::TranslationError;

/// A value that holds one variant per language.
///
/// A `None` language stands for the caller's default language; how that is
/// determined is up to the implementation.
pub trait Translatable {
    /// Returns the value in the given language.
    ///
    /// # Errors
    ///
    /// Returns a [`TranslationError`] if:
    /// - A [`Resolution`](TranslationError::Resolution) error occurs while looking up the translation row.
    fn translate(&self, language: Option<&Language>) -> Result<Option<String>, TranslationError>;

    /// Stores the value for the given language.
    ///
    /// # Errors
    ///
    /// Returns a [`TranslationError`] if:
    /// - A [`Resolution`](TranslationError::Resolution) error occurs while looking up the translation row.
    /// - A [`Configuration`](TranslationError::Configuration) error occurs while creating a translation row.
    fn set_translation(
        &self,
        value: Option<String>,
        language: Option<&Language>,
    ) -> Result<(), TranslationError>;

    /// Tells whether a value exists for the given language.
    ///
    /// # Errors
    ///
    /// Returns a [`TranslationError`] if:
    /// - A [`Resolution`](TranslationError::Resolution) error occurs while looking up the translation row.
    fn is_translated_into(&self, language: &Language) -> Result<bool, TranslationError>;
}
