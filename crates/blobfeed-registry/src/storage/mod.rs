//! Blob attribute storage.
//!
//! The registry never talks to a storage service directly. It works against
//! two small capabilities:
//!
//! - [`BlobStorage`] opens or creates the blob at a [`BlobLocation`]
//! - [`AttributeStore`] is the blob handle: it fetches the attribute map from
//!   the backing store, exposes it for reading and writing, and commits it back
//!
//! Commits replace the stored attribute set wholesale. There is no version
//! token or conditional write, so two writers committing to the same blob
//! race and the last commit wins.

use std::fmt;

use crate::{attributes::AttributeMap, error::StorageError};

pub mod extended;
pub mod memory;
pub mod sidecar;

pub use extended::{XattrBlob, XattrStorage};
pub use memory::{MemoryBlob, MemoryStorage};
pub use sidecar::{SidecarBlob, SidecarStorage};

/// Attribute size limit applied when none is configured (Azure's 8 KiB cap).
pub const DEFAULT_MAX_ATTRIBUTES_SIZE: usize = 8 * 1024;

/// Container and item name of a blob.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlobLocation {
    pub container: String,
    pub item: String,
}

impl BlobLocation {
    pub fn new(container: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            item: item.into(),
        }
    }

    /// Ensures both names are usable as a single path segment.
    pub fn validate(&self) -> Result<(), StorageError> {
        for name in [&self.container, &self.item] {
            if name.is_empty()
                || name == "."
                || name == ".."
                || name.contains(['/', '\\', '\0'])
            {
                return Err(StorageError::InvalidName(name.clone()));
            }
        }
        Ok(())
    }
}

impl fmt::Display for BlobLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.item)
    }
}

/// A blob-like handle carrying a string-to-string attribute map.
pub trait AttributeStore {
    /// Where this blob lives.
    fn location(&self) -> &BlobLocation;

    /// Refreshes the in-memory attribute map from the backing store.
    fn fetch_attributes(&mut self) -> Result<(), StorageError>;

    /// The in-memory attribute map.
    fn attributes(&self) -> &AttributeMap;

    /// Mutable access to the in-memory attribute map.
    fn attributes_mut(&mut self) -> &mut AttributeMap;

    /// Persists the in-memory attribute map, replacing the stored one.
    fn commit_attributes(&mut self) -> Result<(), StorageError>;
}

/// A container service handing out blob handles.
pub trait BlobStorage {
    type Blob: AttributeStore;

    /// Opens an existing blob, or returns `None` if nothing is stored there.
    fn open_blob(&self, location: &BlobLocation) -> Result<Option<Self::Blob>, StorageError>;

    /// Returns a handle for writing, creating the container when needed.
    ///
    /// The handle starts with an empty attribute map; nothing is persisted
    /// until [`AttributeStore::commit_attributes`] is called.
    fn create_blob(&self, location: &BlobLocation) -> Result<Self::Blob, StorageError>;
}

/// Fails when `attributes` exceeds `limit` bytes.
pub(crate) fn check_size(
    location: &BlobLocation,
    attributes: &AttributeMap,
    limit: usize,
) -> Result<(), StorageError> {
    let size = crate::attributes::attributes_size(attributes);
    if size > limit {
        return Err(StorageError::AttributesTooLarge {
            location: location.to_string(),
            size,
            limit,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_location_validate() {
        assert!(BlobLocation::new("my-package", "1-0-0").validate().is_ok());

        for (container, item) in [("", "1"), ("..", "1"), ("a/b", "1"), ("a", "x\\y"), ("a", ".")] {
            let result = BlobLocation::new(container, item).validate();
            assert!(matches!(result, Err(StorageError::InvalidName(_))));
        }
    }

    #[test]
    fn test_check_size() {
        let location = BlobLocation::new("c", "i");
        let mut attributes = AttributeMap::new();
        attributes.insert("Id".to_string(), "x".repeat(8));
        assert!(check_size(&location, &attributes, 10).is_ok());
        assert!(matches!(
            check_size(&location, &attributes, 9),
            Err(StorageError::AttributesTooLarge { size: 10, limit: 9, .. })
        ));
    }
}
