use crate::config::constants::METADATA_CACHE_SALT;
use serde::Deserialize;

/// Host-tunable settings of the translation lifecycle.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    /// Suffix keeping metadata entries apart from other users of the same cache.
    pub cache_salt: String,
}

impl TranslationSettings {
    pub fn cache_key(&self, class: &str) -> String {
        format!("{class}{}", self.cache_salt)
    }
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            cache_salt: METADATA_CACHE_SALT.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let settings: TranslationSettings = serde_json::from_str("{}").unwrap();

        assert_eq!(settings, TranslationSettings::default());
        assert_eq!(
            settings.cache_key("Article"),
            format!("Article{METADATA_CACHE_SALT}")
        );
    }

    #[test]
    fn salt_can_be_overridden() {
        let settings: TranslationSettings =
            serde_json::from_str(r#"{"cache_salt": "@v2"}"#).unwrap();

        assert_eq!(settings.cache_key("Article"), "Article@v2");
    }
}
