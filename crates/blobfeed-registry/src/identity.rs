//! Package identity.

use std::fmt;

use semver::Version;
use serde::{Deserialize, Serialize};

use crate::{
    error::{RegistryError, Result},
    traits::PackageExt,
};

/// The `(id, version)` pair naming a single package release.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageIdentity {
    pub id: String,
    pub version: Version,
}

impl PackageIdentity {
    /// Creates an identity, rejecting an empty id.
    pub fn new(id: impl Into<String>, version: Version) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(RegistryError::InvalidIdentity(
                "package id must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id,
            version,
        })
    }

    /// Parses an identity from an id and a semantic version string.
    pub fn parse(id: &str, version: &str) -> Result<Self> {
        let version = Version::parse(version)
            .map_err(|err| RegistryError::InvalidIdentity(format!("{version}: {err}")))?;
        Self::new(id, version)
    }
}

impl PackageExt for PackageIdentity {
    fn package_id(&self) -> &str {
        &self.id
    }

    fn package_version(&self) -> &Version {
        &self.version
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.version)
    }
}
