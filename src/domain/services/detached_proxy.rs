use crate::domain::entities::language::{DefaultLanguage, Language};
use crate::domain::errors::translation_error::TranslationError;
use crate::domain::ports::primary::translatable::Translatable;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

#[derive(Clone, Debug)]
enum DefaultSource {
    Unknown,
    Fixed(Language),
    Holder(DefaultLanguage),
}

impl DefaultSource {
    fn current(&self) -> Option<Language> {
        match self {
            Self::Unknown => None,
            Self::Fixed(language) => Some(language.clone()),
            Self::Holder(holder) => Some(holder.get()),
        }
    }
}

#[derive(Debug)]
struct DetachedState {
    /// Insertion-ordered; the `None` key is the slot for "no language known yet".
    translations: Vec<(Option<Language>, Option<String>)>,
    default: DefaultSource,
}

impl DetachedState {
    fn resolve(&self, language: Option<&Language>) -> Option<Language> {
        language.cloned().or_else(|| self.default.current())
    }

    fn get(&self, key: Option<&Language>) -> Option<&Option<String>> {
        self.translations
            .iter()
            .find(|(stored, _)| stored.as_ref() == key)
            .map(|(_, value)| value)
    }

    fn put(&mut self, key: Option<Language>, value: Option<String>) {
        match self.translations.iter_mut().find(|(stored, _)| *stored == key) {
            Some((_, slot)) => *slot = value,
            None => self.translations.push((key, value)),
        }
    }
}

/// In-memory translatable for entities the persistence engine does not know yet.
///
/// Holds a plain language → value map and never fails. Once the owner is
/// persisted the lifecycle listener replaces it with a
/// [`TranslationProxy`](crate::domain::services::translation_proxy::TranslationProxy)
/// and copies every stored value over.
#[derive(Clone, Debug)]
pub struct DetachedProxy {
    state: Rc<RefCell<DetachedState>>,
}

impl DetachedProxy {
    /// Creates a proxy storing `value` under `language`, or under the
    /// unlabeled slot when no language is known.
    pub fn new(value: Option<String>, language: Option<Language>) -> Self {
        let default = language.map_or(DefaultSource::Unknown, DefaultSource::Fixed);
        Self::seeded(value, default)
    }

    /// Creates a proxy whose default language follows the given holder.
    pub fn with_default_language(value: Option<String>, default_language: DefaultLanguage) -> Self {
        Self::seeded(value, DefaultSource::Holder(default_language))
    }

    fn seeded(value: Option<String>, default: DefaultSource) -> Self {
        let key = default.current();
        Self {
            state: Rc::new(RefCell::new(DetachedState {
                translations: vec![(key, value)],
                default,
            })),
        }
    }

    /// Fixes the default language, moving a value stored before any language
    /// was known into it.
    pub fn set_default_language(&self, language: Language) {
        let mut state = self.state.borrow_mut();
        if let Some(index) = state.translations.iter().position(|(key, _)| key.is_none()) {
            let (_, value) = state.translations.remove(index);
            state.put(Some(language.clone()), value);
        }
        state.default = DefaultSource::Fixed(language);
    }

    /// Pushes every stored value into `target`.
    ///
    /// A value from the unlabeled slot is handed over without a language so
    /// the target applies its own default.
    ///
    /// # Errors
    ///
    /// Returns the first [`TranslationError`] raised by the target.
    pub fn copy_into(&self, target: &dyn Translatable) -> Result<(), TranslationError> {
        let translations = self.state.borrow().translations.clone();
        for (language, value) in translations {
            target.set_translation(value, language.as_ref())?;
        }
        Ok(())
    }
}

impl Translatable for DetachedProxy {
    fn translate(&self, language: Option<&Language>) -> Result<Option<String>, TranslationError> {
        let state = self.state.borrow();
        let key = state.resolve(language);
        Ok(state.get(key.as_ref()).cloned().flatten())
    }

    fn set_translation(
        &self,
        value: Option<String>,
        language: Option<&Language>,
    ) -> Result<(), TranslationError> {
        let mut state = self.state.borrow_mut();
        let key = state.resolve(language);
        state.put(key, value);
        Ok(())
    }

    fn is_translated_into(&self, language: &Language) -> Result<bool, TranslationError> {
        let state = self.state.borrow();
        Ok(state
            .get(Some(language))
            .and_then(Option::as_deref)
            .is_some_and(|value| !value.trim().is_empty()))
    }
}

impl fmt::Display for DetachedProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.translate(None).ok().flatten();
        f.write_str(value.as_deref().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en() -> Language {
        Language::new("en_GB")
    }

    fn de() -> Language {
        Language::new("de_DE")
    }

    #[test]
    fn unlabeled_value_moves_into_default_language() {
        let proxy = DetachedProxy::new(Some("base text".into()), None);
        assert_eq!(proxy.translate(Some(&en())).unwrap(), None);

        proxy.set_default_language(en());

        assert_eq!(proxy.translate(Some(&en())).unwrap().as_deref(), Some("base text"));
        assert_eq!(proxy.translate(None).unwrap().as_deref(), Some("base text"));
    }

    #[test]
    fn set_default_language_only_migrates_once() {
        let proxy = DetachedProxy::new(Some("base text".into()), None);
        proxy.set_default_language(en());

        proxy.set_default_language(de());

        assert_eq!(proxy.translate(Some(&en())).unwrap().as_deref(), Some("base text"));
        assert_eq!(proxy.translate(Some(&de())).unwrap(), None);
    }

    #[test]
    fn explicit_language_at_construction_labels_the_value() {
        let proxy = DetachedProxy::new(Some("Hallo".into()), Some(de()));

        assert_eq!(proxy.translate(Some(&de())).unwrap().as_deref(), Some("Hallo"));
        assert_eq!(proxy.translate(None).unwrap().as_deref(), Some("Hallo"));
        assert_eq!(proxy.translate(Some(&en())).unwrap(), None);
    }

    #[test]
    fn holder_supplies_default_language() {
        let holder = DefaultLanguage::new(en());
        let proxy = DetachedProxy::with_default_language(Some("colour".into()), holder.clone());

        holder.set(de());
        proxy.set_translation(Some("Farbe".into()), None).unwrap();

        assert_eq!(proxy.translate(Some(&en())).unwrap().as_deref(), Some("colour"));
        assert_eq!(proxy.translate(None).unwrap().as_deref(), Some("Farbe"));
    }

    #[test]
    fn is_translated_into_requires_content() {
        let proxy = DetachedProxy::new(Some("text".into()), Some(en()));
        proxy.set_translation(Some(" ".into()), Some(&de())).unwrap();

        assert!(proxy.is_translated_into(&en()).unwrap());
        assert!(!proxy.is_translated_into(&de()).unwrap());
        assert!(!proxy.is_translated_into(&Language::new("fr_FR")).unwrap());
    }

    #[test]
    fn copy_hands_unlabeled_slot_over_without_language() {
        let source = DetachedProxy::new(Some("base".into()), None);
        source.set_translation(Some("Basis".into()), Some(&de())).unwrap();
        let target = DetachedProxy::new(None, Some(en()));

        source.copy_into(&target).unwrap();

        assert_eq!(target.translate(Some(&en())).unwrap().as_deref(), Some("base"));
        assert_eq!(target.translate(Some(&de())).unwrap().as_deref(), Some("Basis"));
    }

    #[test]
    fn display_falls_back_to_empty_string() {
        let proxy = DetachedProxy::new(None, Some(en()));

        assert_eq!(proxy.to_string(), "");
    }
}
