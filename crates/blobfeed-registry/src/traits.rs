//! Traits for package types.

use semver::Version;

/// Trait for types that carry a package identity.
///
/// Implemented by both [`PackageIdentity`](crate::PackageIdentity) and
/// [`PackageMetadata`](crate::PackageMetadata) so that storage names can be
/// derived from either without cloning.
pub trait PackageExt {
    /// Returns the package id exactly as published.
    fn package_id(&self) -> &str;

    /// Returns the package version.
    fn package_version(&self) -> &Version;
}
