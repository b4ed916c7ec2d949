//! Process-local attribute storage.
//!
//! Clones of a [`MemoryStorage`] share the same blobs, which makes it
//! convenient for tests and for simulating several writers.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use tracing::debug;

use super::{check_size, AttributeStore, BlobLocation, BlobStorage, DEFAULT_MAX_ATTRIBUTES_SIZE};
use crate::{attributes::AttributeMap, error::StorageError};

type Blobs = Arc<Mutex<HashMap<BlobLocation, AttributeMap>>>;

fn lock(blobs: &Blobs) -> Result<MutexGuard<'_, HashMap<BlobLocation, AttributeMap>>, StorageError> {
    blobs
        .lock()
        .map_err(|_| StorageError::Custom("memory storage lock poisoned".to_string()))
}

#[derive(Debug, Clone)]
pub struct MemoryStorage {
    blobs: Blobs,
    max_attributes_size: usize,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTRIBUTES_SIZE)
    }
}

impl MemoryStorage {
    pub fn new(max_attributes_size: usize) -> Self {
        Self {
            blobs: Arc::default(),
            max_attributes_size,
        }
    }

    /// Number of blobs with committed attributes.
    pub fn len(&self) -> usize {
        self.blobs.lock().map(|blobs| blobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BlobStorage for MemoryStorage {
    type Blob = MemoryBlob;

    fn open_blob(&self, location: &BlobLocation) -> Result<Option<MemoryBlob>, StorageError> {
        if !lock(&self.blobs)?.contains_key(location) {
            return Ok(None);
        }
        Ok(Some(MemoryBlob {
            blobs: Arc::clone(&self.blobs),
            location: location.clone(),
            attributes: AttributeMap::new(),
            max_attributes_size: self.max_attributes_size,
        }))
    }

    fn create_blob(&self, location: &BlobLocation) -> Result<MemoryBlob, StorageError> {
        location.validate()?;
        Ok(MemoryBlob {
            blobs: Arc::clone(&self.blobs),
            location: location.clone(),
            attributes: AttributeMap::new(),
            max_attributes_size: self.max_attributes_size,
        })
    }
}

#[derive(Debug)]
pub struct MemoryBlob {
    blobs: Blobs,
    location: BlobLocation,
    attributes: AttributeMap,
    max_attributes_size: usize,
}

impl AttributeStore for MemoryBlob {
    fn location(&self) -> &BlobLocation {
        &self.location
    }

    fn fetch_attributes(&mut self) -> Result<(), StorageError> {
        let blobs = lock(&self.blobs)?;
        let stored = blobs
            .get(&self.location)
            .ok_or_else(|| StorageError::BlobNotFound(self.location.to_string()))?;
        self.attributes = stored.clone();
        debug!("fetched {} attributes from memory://{}", self.attributes.len(), self.location);
        Ok(())
    }

    fn attributes(&self) -> &AttributeMap {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut AttributeMap {
        &mut self.attributes
    }

    fn commit_attributes(&mut self) -> Result<(), StorageError> {
        check_size(&self.location, &self.attributes, self.max_attributes_size)?;
        lock(&self.blobs)?.insert(self.location.clone(), self.attributes.clone());
        debug!("committed {} attributes to memory://{}", self.attributes.len(), self.location);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> BlobLocation {
        BlobLocation::new("my-package", "1-0-0")
    }

    #[test]
    fn test_open_missing_blob() {
        let storage = MemoryStorage::default();
        assert!(storage.open_blob(&location()).unwrap().is_none());
    }

    #[test]
    fn test_commit_then_fetch() {
        let storage = MemoryStorage::default();
        let mut blob = storage.create_blob(&location()).unwrap();
        blob.attributes_mut()
            .insert("Id".to_string(), "My.Package".to_string());
        blob.commit_attributes().unwrap();

        let mut reopened = storage.open_blob(&location()).unwrap().unwrap();
        assert!(reopened.attributes().is_empty());
        reopened.fetch_attributes().unwrap();
        assert_eq!(reopened.attributes().get("Id").unwrap(), "My.Package");
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_commit_replaces_attribute_set() {
        let storage = MemoryStorage::default();
        let mut blob = storage.create_blob(&location()).unwrap();
        blob.attributes_mut().insert("Title".to_string(), "Old".to_string());
        blob.commit_attributes().unwrap();

        blob.attributes_mut().clear();
        blob.attributes_mut().insert("Id".to_string(), "x".to_string());
        blob.commit_attributes().unwrap();

        blob.fetch_attributes().unwrap();
        assert!(!blob.attributes().contains_key("Title"));
    }

    #[test]
    fn test_commit_rejects_oversized_attributes() {
        let storage = MemoryStorage::new(16);
        let mut blob = storage.create_blob(&location()).unwrap();
        blob.attributes_mut()
            .insert("Description".to_string(), "far too long".to_string());
        assert!(matches!(
            blob.commit_attributes(),
            Err(StorageError::AttributesTooLarge { .. })
        ));
        assert!(storage.is_empty());
    }

    #[test]
    fn test_concurrent_writers_last_commit_wins() {
        let storage = MemoryStorage::default();
        let mut first = storage.create_blob(&location()).unwrap();
        let mut second = storage.clone().create_blob(&location()).unwrap();

        first.attributes_mut().insert("Title".to_string(), "first".to_string());
        second.attributes_mut().insert("Title".to_string(), "second".to_string());
        second.commit_attributes().unwrap();
        first.commit_attributes().unwrap();

        let mut reader = storage.open_blob(&location()).unwrap().unwrap();
        reader.fetch_attributes().unwrap();
        assert_eq!(reader.attributes().get("Title").unwrap(), "first");
    }
}
