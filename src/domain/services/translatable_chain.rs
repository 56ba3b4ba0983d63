use crate::domain::entities::language::Language;
use crate::domain::errors::translation_error::TranslationError;
use crate::domain::ports::primary::translatable::Translatable;
use std::fmt;
use std::rc::Rc;

/// Which candidate values a [`TranslatableChain`] accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainPolicy {
    /// Skip values that are absent or blank after trimming.
    FirstNonEmpty,
    /// Skip only absent values.
    FirstTranslation,
}

impl ChainPolicy {
    fn accepts(self, value: Option<&str>) -> bool {
        match self {
            Self::FirstNonEmpty => value.is_some_and(|v| !v.trim().is_empty()),
            Self::FirstTranslation => value.is_some(),
        }
    }
}

/// Ordered fallback across several translatables.
///
/// Writes always go to the first candidate.
#[derive(Clone)]
pub struct TranslatableChain {
    policy: ChainPolicy,
    candidates: Vec<Rc<dyn Translatable>>,
}

impl TranslatableChain {
    pub fn new(policy: ChainPolicy, candidates: Vec<Rc<dyn Translatable>>) -> Self {
        Self { policy, candidates }
    }

    pub fn first_non_empty(candidates: Vec<Rc<dyn Translatable>>) -> Self {
        Self::new(ChainPolicy::FirstNonEmpty, candidates)
    }

    pub fn first_translation(candidates: Vec<Rc<dyn Translatable>>) -> Self {
        Self::new(ChainPolicy::FirstTranslation, candidates)
    }
}

impl Translatable for TranslatableChain {
    fn translate(&self, language: Option<&Language>) -> Result<Option<String>, TranslationError> {
        for candidate in &self.candidates {
            let value = candidate.translate(language)?;
            if self.policy.accepts(value.as_deref()) {
                return Ok(value);
            }
        }
        Ok(None)
    }

    fn set_translation(
        &self,
        value: Option<String>,
        language: Option<&Language>,
    ) -> Result<(), TranslationError> {
        match self.candidates.first() {
            Some(primary) => primary.set_translation(value, language),
            None => Err(TranslationError::consistency(
                "cannot write through an empty translatable chain",
            )),
        }
    }

    fn is_translated_into(&self, language: &Language) -> Result<bool, TranslationError> {
        for candidate in &self.candidates {
            if candidate.is_translated_into(language)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl fmt::Display for TranslatableChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.translate(None) {
            Ok(value) => f.write_str(value.as_deref().unwrap_or_default()),
            Err(error) => {
                tracing::error!(
                    %error,
                    "Translatable chain could not be rendered; using an empty string"
                );
                Ok(())
            }
        }
    }
}

impl fmt::Debug for TranslatableChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslatableChain")
            .field("policy", &self.policy)
            .field("candidates", &self.candidates.len())
            .finish()
    }
}
