use diesel_migrations::{EmbeddedMigrations, embed_migrations};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Appended to class names when keying the external metadata cache.
pub const METADATA_CACHE_SALT: &str = "__translatable_metadata";
