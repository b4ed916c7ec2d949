//! Package metadata persistence for the blobfeed package registry.
//!
//! Packages are stored as blobs. Their metadata does not live in the blob
//! content but in the flat string attribute map attached to each blob. This
//! crate provides:
//!
//! - **Locator**: container and item names derived from a package identity
//! - **Dependency codec**: framework-scoped dependency groups packed into a
//!   single base64 attribute value
//! - **Metadata codec**: [`PackageMetadata`] to and from the attribute map
//! - **Storage**: the [`AttributeStore`] / [`BlobStorage`] capabilities with
//!   in-memory, JSON sidecar and xattr backends
//! - **Store**: [`PackageStore`], tying the pieces together
//!
//! # Example
//!
//! ```
//! use blobfeed_registry::{MemoryStorage, PackageIdentity, PackageMetadata, PackageStore};
//!
//! fn publish() -> blobfeed_registry::Result<()> {
//!     let store = PackageStore::new(MemoryStorage::default());
//!     let identity = PackageIdentity::parse("Contoso.Http", "1.0.0")?;
//!     store.write(&PackageMetadata::new(identity.clone()))?;
//!     assert!(store.read(&identity)?.is_some());
//!     Ok(())
//! }
//! # publish().unwrap();
//! ```

pub mod attributes;
pub mod codec;
pub mod dependency;
pub mod error;
pub mod identity;
pub mod locator;
pub mod package;
pub mod storage;
pub mod store;
pub mod traits;
pub mod version;

pub use attributes::{keys, AttributeMap};
pub use codec::{decode_attributes, encode_attributes, encode_attributes_at, read_from_blob, save_to_blob};
pub use dependency::{
    decode_dependency_groups, encode_dependency_groups, DependencyGroup, PackageDependency,
};
pub use error::{EncodingError, ErrorContext, RegistryError, Result, StorageError};
pub use identity::PackageIdentity;
pub use locator::{container_name, item_name};
pub use package::PackageMetadata;
pub use storage::{
    AttributeStore, BlobLocation, BlobStorage, MemoryStorage, SidecarStorage, XattrStorage,
    DEFAULT_MAX_ATTRIBUTES_SIZE,
};
pub use store::PackageStore;
pub use traits::PackageExt;
pub use version::ClientVersion;
