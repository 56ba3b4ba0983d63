//! Per-field translations for persisted entities.
//!
//! Translatable fields hold their primary-language value on the entity
//! itself and every other language in child translation rows. A
//! [`TranslationListener`](domain::services::translation_listener::TranslationListener)
//! hooked into the persistence engine's lifecycle swaps managed proxies in
//! and out of those fields.

pub mod config;
pub mod domain;
pub mod infrastructure;

#[cfg(test)]
pub(crate) mod test_fixtures;
