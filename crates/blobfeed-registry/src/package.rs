//! Package metadata model.
//!
//! [`PackageMetadata`] is what the registry persists for every package
//! release. It is also accepted as a JSON manifest by the CLI, so the serde
//! representation is lenient: empty strings are treated as absent and boolean
//! flags accept string spellings.

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{de, Deserialize, Deserializer, Serialize};
use url::Url;

use crate::{
    dependency::DependencyGroup, identity::PackageIdentity, traits::PackageExt,
    version::ClientVersion,
};

/// Internal enum for deserializing boolean values that may be strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum FlexiBool {
    Bool(bool),
    String(String),
}

fn empty_is_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.is_empty()))
}

fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match FlexiBool::deserialize(deserializer)? {
        FlexiBool::Bool(b) => Ok(b),
        FlexiBool::String(s) => {
            match s.to_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" => Ok(false),
                _ => {
                    Err(de::Error::invalid_value(
                        de::Unexpected::Str(&s),
                        &"a valid boolean (true/false, yes/no, 1/0)",
                    ))
                }
            }
        }
    }
}

fn default_listed() -> bool {
    true
}

/// Full metadata of one package release.
///
/// Optional fields set to `None` are omitted from the stored attribute map,
/// and an omitted attribute decodes back to `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageMetadata {
    pub id: String,
    pub version: Version,

    #[serde(default, deserialize_with = "empty_is_none")]
    pub title: Option<String>,

    #[serde(default, alias = "author")]
    pub authors: Vec<String>,

    #[serde(default, alias = "owner")]
    pub owners: Vec<String>,

    #[serde(default)]
    pub icon_url: Option<Url>,

    #[serde(default)]
    pub license_url: Option<Url>,

    #[serde(default)]
    pub project_url: Option<Url>,

    #[serde(default, deserialize_with = "flexible_bool")]
    pub require_license_acceptance: bool,

    #[serde(default, deserialize_with = "flexible_bool")]
    pub development_dependency: bool,

    #[serde(default, deserialize_with = "empty_is_none")]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "empty_is_none")]
    pub summary: Option<String>,

    #[serde(default, deserialize_with = "empty_is_none")]
    pub release_notes: Option<String>,

    #[serde(default, deserialize_with = "empty_is_none")]
    pub tags: Option<String>,

    #[serde(default, alias = "dependencySets")]
    pub dependency_groups: Vec<DependencyGroup>,

    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_absolute_latest_version: bool,

    #[serde(default, deserialize_with = "flexible_bool")]
    pub is_latest_version: bool,

    #[serde(default)]
    pub min_client_version: Option<ClientVersion>,

    #[serde(default = "default_listed", deserialize_with = "flexible_bool")]
    pub listed: bool,

    #[serde(default = "Utc::now")]
    pub published: DateTime<Utc>,
}

impl PackageMetadata {
    /// Creates listed metadata for `identity` with every optional field unset.
    pub fn new(identity: PackageIdentity) -> Self {
        Self {
            id: identity.id,
            version: identity.version,
            title: None,
            authors: Vec::new(),
            owners: Vec::new(),
            icon_url: None,
            license_url: None,
            project_url: None,
            require_license_acceptance: false,
            development_dependency: false,
            description: None,
            summary: None,
            release_notes: None,
            tags: None,
            dependency_groups: Vec::new(),
            is_absolute_latest_version: false,
            is_latest_version: false,
            min_client_version: None,
            listed: true,
            published: Utc::now(),
        }
    }

    /// Returns a copy of the package identity.
    pub fn identity(&self) -> PackageIdentity {
        PackageIdentity {
            id: self.id.clone(),
            version: self.version.clone(),
        }
    }
}

impl PackageExt for PackageMetadata {
    fn package_id(&self) -> &str {
        &self.id
    }

    fn package_version(&self) -> &Version {
        &self.version
    }
}
