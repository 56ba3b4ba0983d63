pub mod cache_repository;
pub mod column;
pub mod pool;
pub mod schema;
