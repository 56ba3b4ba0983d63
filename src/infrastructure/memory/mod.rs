pub mod metadata_cache;
pub mod unit_of_work;
