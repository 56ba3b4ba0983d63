pub mod collection_error;
pub mod repository_error;
pub mod translation_error;
