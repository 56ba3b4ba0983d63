use crate::domain::errors::repository_error::RepositoryError;

/// Process-external byte store for serialized class translation metadata.
pub trait MetadataCache {
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, RepositoryError>;
    fn save(&self, key: &str, payload: &[u8]) -> Result<(), RepositoryError>;
}
