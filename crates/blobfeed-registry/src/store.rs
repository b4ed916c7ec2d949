//! Package-level access to a blob storage backend.

use tracing::{debug, info};

use crate::{
    attributes::AttributeMap,
    codec::{read_from_blob, save_to_blob},
    error::Result,
    locator,
    package::PackageMetadata,
    storage::{AttributeStore, BlobLocation, BlobStorage},
    traits::PackageExt,
};

/// Reads and writes package metadata at the locations derived from package
/// identities.
///
/// Each read issues exactly one attribute fetch and each write exactly one
/// commit. Writes are unconditional: concurrent writers of the same package
/// overwrite each other.
#[derive(Debug, Clone)]
pub struct PackageStore<S> {
    storage: S,
}

impl<S: BlobStorage> PackageStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Returns where `package` is stored.
    pub fn locate<P: PackageExt + ?Sized>(&self, package: &P) -> BlobLocation {
        locator::locate(package)
    }

    /// Returns true if metadata has been committed for `package`.
    pub fn exists<P: PackageExt + ?Sized>(&self, package: &P) -> Result<bool> {
        Ok(self.storage.open_blob(&self.locate(package))?.is_some())
    }

    /// Reads the metadata of `package`, or `None` if it was never written.
    pub fn read<P: PackageExt + ?Sized>(&self, package: &P) -> Result<Option<PackageMetadata>> {
        let location = self.locate(package);
        debug!("reading package metadata from {location}");
        let mut blob = self.storage.open_blob(&location)?;
        read_from_blob(blob.as_mut())
    }

    /// Reads the raw attribute map of `package` without decoding it.
    pub fn read_attributes<P: PackageExt + ?Sized>(
        &self,
        package: &P,
    ) -> Result<Option<AttributeMap>> {
        let location = self.locate(package);
        let Some(mut blob) = self.storage.open_blob(&location)? else {
            return Ok(None);
        };
        blob.fetch_attributes()?;
        Ok(Some(blob.attributes().clone()))
    }

    /// Writes `metadata` to the blob of its package identity.
    pub fn write(&self, metadata: &PackageMetadata) -> Result<()> {
        let location = self.locate(metadata);
        debug!("writing package metadata to {location}");
        let mut blob = self.storage.create_blob(&location)?;
        save_to_blob(metadata, &mut blob)?;
        info!("Stored {} {} at {}", metadata.id, metadata.version, location);
        Ok(())
    }
}
