//! The flat attribute map stored on each package blob.
//!
//! Every field of a package is stored under a fixed, case-sensitive key.
//! Optional fields without a value are left out of the map entirely; an
//! empty string is never written.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use semver::Version;
use tracing::trace;
use url::Url;

use crate::{
    error::{RegistryError, Result},
    version::ClientVersion,
};

/// String-keyed, string-valued property bag attached to a blob.
pub type AttributeMap = BTreeMap<String, String>;

/// Attribute keys.
pub mod keys {
    pub const ID: &str = "Id";
    pub const VERSION: &str = "Version";
    pub const TITLE: &str = "Title";
    pub const AUTHORS: &str = "Authors";
    pub const OWNERS: &str = "Owners";
    pub const ICON_URL: &str = "IconUrl";
    pub const LICENSE_URL: &str = "LicenseUrl";
    pub const PROJECT_URL: &str = "ProjectUrl";
    pub const REQUIRE_LICENSE_ACCEPTANCE: &str = "RequireLicenseAcceptance";
    pub const DEVELOPMENT_DEPENDENCY: &str = "DevelopmentDependency";
    pub const DESCRIPTION: &str = "Description";
    pub const SUMMARY: &str = "Summary";
    pub const RELEASE_NOTES: &str = "ReleaseNotes";
    pub const TAGS: &str = "Tags";
    pub const DEPENDENCIES: &str = "Dependencies";
    pub const IS_ABSOLUTE_LATEST_VERSION: &str = "IsAbsoluteLatestVersion";
    pub const IS_LATEST_VERSION: &str = "IsLatestVersion";
    pub const MIN_CLIENT_VERSION: &str = "MinClientVersion";
    pub const LISTED: &str = "Listed";
    pub const PUBLISHED: &str = "Published";

    /// Keys that every decodable attribute map must contain.
    pub const REQUIRED: [&str; 9] = [
        ID,
        VERSION,
        REQUIRE_LICENSE_ACCEPTANCE,
        DEVELOPMENT_DEPENDENCY,
        DEPENDENCIES,
        IS_ABSOLUTE_LATEST_VERSION,
        IS_LATEST_VERSION,
        LISTED,
        PUBLISHED,
    ];
}

/// Separator for list-valued attributes. Embedded separators are not escaped.
pub const LIST_SEPARATOR: &str = ",";

pub(crate) fn required<'a>(attributes: &'a AttributeMap, key: &str) -> Result<&'a str> {
    trace!("reading required attribute {key}");
    attributes
        .get(key)
        .map(String::as_str)
        .ok_or_else(|| RegistryError::MissingRequiredAttribute(key.to_string()))
}

pub(crate) fn optional<'a>(attributes: &'a AttributeMap, key: &str) -> Option<&'a str> {
    trace!("reading optional attribute {key}");
    attributes.get(key).map(String::as_str)
}

pub(crate) fn parse_bool(key: &str, value: &str) -> Result<bool> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(RegistryError::MalformedBoolean(key.to_string()))
    }
}

pub(crate) fn format_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

pub(crate) fn parse_version(key: &str, value: &str) -> Result<Version> {
    Version::parse(value).map_err(|_| RegistryError::MalformedVersion(key.to_string()))
}

pub(crate) fn parse_client_version(key: &str, value: &str) -> Result<ClientVersion> {
    value
        .parse()
        .map_err(|_| RegistryError::MalformedVersion(key.to_string()))
}

pub(crate) fn parse_uri(key: &str, value: &str) -> Result<Url> {
    // `Url::parse` only accepts absolute URLs, relative references fail here.
    Url::parse(value).map_err(|_| RegistryError::MalformedUri(key.to_string()))
}

pub(crate) fn parse_timestamp(key: &str, value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| RegistryError::MalformedTimestamp(key.to_string()))
}

pub(crate) fn split_list(value: &str) -> Vec<String> {
    value.split(LIST_SEPARATOR).map(String::from).collect()
}

pub(crate) fn join_list(values: &[String]) -> String {
    values.join(LIST_SEPARATOR)
}

/// Writes `value` under `key` unless it is empty.
pub(crate) fn put(attributes: &mut AttributeMap, key: &str, value: impl Into<String>) {
    let value = value.into();
    if !value.is_empty() {
        attributes.insert(key.to_string(), value);
    }
}

/// Writes `value` under `key` if present and non-empty.
pub(crate) fn put_opt<T: ToString>(attributes: &mut AttributeMap, key: &str, value: Option<T>) {
    if let Some(value) = value {
        put(attributes, key, value.to_string());
    }
}

/// Total size of an attribute set as counted by blob backends.
pub fn attributes_size(attributes: &AttributeMap) -> usize {
    attributes.iter().map(|(k, v)| k.len() + v.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool_vocabulary() {
        assert!(parse_bool("Listed", "true").unwrap());
        assert!(parse_bool("Listed", "True").unwrap());
        assert!(parse_bool("Listed", "TRUE").unwrap());
        assert!(!parse_bool("Listed", "false").unwrap());
        assert!(!parse_bool("Listed", "False").unwrap());

        for bad in ["maybe", "", "1", "yes", " true"] {
            let err = parse_bool("Listed", bad).unwrap_err();
            assert!(matches!(err, RegistryError::MalformedBoolean(ref k) if k == "Listed"));
        }
    }

    #[test]
    fn test_format_bool_parses_back() {
        assert!(parse_bool("k", format_bool(true)).unwrap());
        assert!(!parse_bool("k", format_bool(false)).unwrap());
    }

    #[test]
    fn test_parse_uri_requires_absolute() {
        assert!(parse_uri("IconUrl", "https://example.com/icon.png").is_ok());
        let err = parse_uri("IconUrl", "/icon.png").unwrap_err();
        assert!(matches!(err, RegistryError::MalformedUri(ref k) if k == "IconUrl"));
        assert!(parse_uri("IconUrl", "not a url").is_err());
    }

    #[test]
    fn test_parse_versions() {
        assert!(parse_version("Version", "1.0.0").is_ok());
        assert!(matches!(
            parse_version("Version", "1.0"),
            Err(RegistryError::MalformedVersion(_))
        ));
        assert!(parse_client_version("MinClientVersion", "2.8").is_ok());
        assert!(matches!(
            parse_client_version("MinClientVersion", "two"),
            Err(RegistryError::MalformedVersion(_))
        ));
    }

    #[test]
    fn test_parse_timestamp() {
        let ts = parse_timestamp("Published", "2024-05-01T10:00:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T08:00:00+00:00");
        assert!(matches!(
            parse_timestamp("Published", "yesterday"),
            Err(RegistryError::MalformedTimestamp(_))
        ));
    }

    #[test]
    fn test_list_split_has_no_escaping() {
        assert_eq!(split_list("alice,bob"), vec!["alice", "bob"]);
        let joined = join_list(&["Smith, John".to_string()]);
        assert_eq!(split_list(&joined), vec!["Smith", " John"]);
    }

    #[test]
    fn test_put_skips_empty_values() {
        let mut attributes = AttributeMap::new();
        put(&mut attributes, keys::TITLE, "");
        put_opt::<String>(&mut attributes, keys::SUMMARY, None);
        put_opt(&mut attributes, keys::TAGS, Some(""));
        assert!(attributes.is_empty());

        put(&mut attributes, keys::TITLE, "Hello");
        assert_eq!(attributes.get(keys::TITLE).map(String::as_str), Some("Hello"));
    }

    #[test]
    fn test_attributes_size() {
        let mut attributes = AttributeMap::new();
        attributes.insert("Id".to_string(), "abc".to_string());
        attributes.insert("Tags".to_string(), "x".to_string());
        assert_eq!(attributes_size(&attributes), 10);
    }
}
