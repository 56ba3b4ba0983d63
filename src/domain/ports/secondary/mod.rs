pub mod lifecycle;
pub mod metadata_cache;
