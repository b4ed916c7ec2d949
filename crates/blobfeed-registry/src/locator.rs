//! Storage names derived from a package identity.
//!
//! Blob backends only accept lowercase names with a restricted set of
//! punctuation. A package lives in the container named after its id and
//! under the item named after its version.

use crate::{storage::BlobLocation, traits::PackageExt};

/// Lowercases `value` and replaces every `.` with `-`.
pub fn storage_friendly(value: &str) -> String {
    value.to_lowercase().replace('.', "-")
}

/// Returns the container name for a package.
pub fn container_name<P: PackageExt + ?Sized>(package: &P) -> String {
    storage_friendly(package.package_id())
}

/// Returns the item name for a package, derived from its canonical version.
pub fn item_name<P: PackageExt + ?Sized>(package: &P) -> String {
    storage_friendly(&package.package_version().to_string())
}

/// Returns the full blob location for a package.
pub fn locate<P: PackageExt + ?Sized>(package: &P) -> BlobLocation {
    BlobLocation::new(container_name(package), item_name(package))
}
