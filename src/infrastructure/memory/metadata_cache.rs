use crate::domain::errors::repository_error::RepositoryError;
use crate::domain::ports::secondary::metadata_cache::MetadataCache;
use std::cell::RefCell;
use std::collections::HashMap;

/// Metadata cache living as long as the process.
#[derive(Debug, Default)]
pub struct InMemoryMetadataCache {
    entries: RefCell<HashMap<String, Vec<u8>>>,
}

impl InMemoryMetadataCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.borrow().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl MetadataCache for InMemoryMetadataCache {
    fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, RepositoryError> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, payload: &[u8]) -> Result<(), RepositoryError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), payload.to_vec());
        Ok(())
    }
}
