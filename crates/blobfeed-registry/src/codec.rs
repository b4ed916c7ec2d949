//! Conversion between [`PackageMetadata`] and the blob attribute map.
//!
//! Decoding reads each field with its own parser and fails on the first
//! missing required key or malformed value. Encoding writes a key only when
//! the field has a non-empty value, which is what lets an absent attribute
//! decode back to `None`.
//!
//! `Published` is always stamped with the time of encoding. The timestamp
//! carried on the input metadata is ignored, so every rewrite of a package's
//! metadata also moves its publish date.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{
    attributes::{
        format_bool, join_list, keys, optional, parse_bool, parse_client_version, parse_timestamp,
        parse_uri, parse_version, put, put_opt, required, split_list, AttributeMap,
    },
    dependency::{decode_dependency_groups, encode_dependency_groups},
    error::{RegistryError, Result},
    package::PackageMetadata,
    storage::AttributeStore,
};

fn required_bool(attributes: &AttributeMap, key: &str) -> Result<bool> {
    parse_bool(key, required(attributes, key)?)
}

fn optional_string(attributes: &AttributeMap, key: &str) -> Option<String> {
    optional(attributes, key).map(String::from)
}

fn optional_list(attributes: &AttributeMap, key: &str) -> Vec<String> {
    optional(attributes, key).map(split_list).unwrap_or_default()
}

/// Decodes package metadata from an attribute map.
///
/// # Errors
///
/// - [`RegistryError::MissingRequiredAttribute`] if a required key is absent
/// - [`RegistryError::InvalidIdentity`] if `Id` is present but empty
/// - [`RegistryError::MalformedBoolean`], [`RegistryError::MalformedVersion`],
///   [`RegistryError::MalformedUri`], [`RegistryError::MalformedTimestamp`]
///   for unparsable values
/// - [`RegistryError::MalformedEncoding`] if `Dependencies` cannot be decoded
pub fn decode_attributes(attributes: &AttributeMap) -> Result<PackageMetadata> {
    let id = required(attributes, keys::ID)?.to_string();
    if id.is_empty() {
        return Err(RegistryError::InvalidIdentity(
            "stored package id is empty".to_string(),
        ));
    }
    let version = parse_version(keys::VERSION, required(attributes, keys::VERSION)?)?;

    let uri = |key: &str| optional(attributes, key).map(|v| parse_uri(key, v)).transpose();

    Ok(PackageMetadata {
        id,
        version,
        title: optional_string(attributes, keys::TITLE),
        authors: optional_list(attributes, keys::AUTHORS),
        owners: optional_list(attributes, keys::OWNERS),
        icon_url: uri(keys::ICON_URL)?,
        license_url: uri(keys::LICENSE_URL)?,
        project_url: uri(keys::PROJECT_URL)?,
        require_license_acceptance: required_bool(attributes, keys::REQUIRE_LICENSE_ACCEPTANCE)?,
        development_dependency: required_bool(attributes, keys::DEVELOPMENT_DEPENDENCY)?,
        description: optional_string(attributes, keys::DESCRIPTION),
        summary: optional_string(attributes, keys::SUMMARY),
        release_notes: optional_string(attributes, keys::RELEASE_NOTES),
        tags: optional_string(attributes, keys::TAGS),
        dependency_groups: decode_dependency_groups(required(attributes, keys::DEPENDENCIES)?)?,
        is_absolute_latest_version: required_bool(attributes, keys::IS_ABSOLUTE_LATEST_VERSION)?,
        is_latest_version: required_bool(attributes, keys::IS_LATEST_VERSION)?,
        min_client_version: optional(attributes, keys::MIN_CLIENT_VERSION)
            .map(|v| parse_client_version(keys::MIN_CLIENT_VERSION, v))
            .transpose()?,
        listed: required_bool(attributes, keys::LISTED)?,
        published: parse_timestamp(keys::PUBLISHED, required(attributes, keys::PUBLISHED)?)?,
    })
}

/// Encodes package metadata, stamping `Published` with the current time.
pub fn encode_attributes(metadata: &PackageMetadata) -> Result<AttributeMap> {
    encode_attributes_at(metadata, Utc::now())
}

/// Encodes package metadata with an explicit `Published` timestamp.
pub fn encode_attributes_at(
    metadata: &PackageMetadata,
    published: DateTime<Utc>,
) -> Result<AttributeMap> {
    if metadata.id.is_empty() {
        return Err(RegistryError::InvalidIdentity(
            "package id must not be empty".to_string(),
        ));
    }

    let mut attributes = AttributeMap::new();
    put(&mut attributes, keys::ID, metadata.id.as_str());
    put(&mut attributes, keys::VERSION, metadata.version.to_string());
    put_opt(&mut attributes, keys::TITLE, metadata.title.as_deref());
    put(&mut attributes, keys::AUTHORS, join_list(&metadata.authors));
    put(&mut attributes, keys::OWNERS, join_list(&metadata.owners));
    put_opt(&mut attributes, keys::ICON_URL, metadata.icon_url.as_ref().map(|u| u.as_str()));
    put_opt(&mut attributes, keys::LICENSE_URL, metadata.license_url.as_ref().map(|u| u.as_str()));
    put_opt(&mut attributes, keys::PROJECT_URL, metadata.project_url.as_ref().map(|u| u.as_str()));
    put(
        &mut attributes,
        keys::REQUIRE_LICENSE_ACCEPTANCE,
        format_bool(metadata.require_license_acceptance),
    );
    put(
        &mut attributes,
        keys::DEVELOPMENT_DEPENDENCY,
        format_bool(metadata.development_dependency),
    );
    put_opt(&mut attributes, keys::DESCRIPTION, metadata.description.as_deref());
    put_opt(&mut attributes, keys::SUMMARY, metadata.summary.as_deref());
    put_opt(&mut attributes, keys::RELEASE_NOTES, metadata.release_notes.as_deref());
    put_opt(&mut attributes, keys::TAGS, metadata.tags.as_deref());
    put(
        &mut attributes,
        keys::DEPENDENCIES,
        encode_dependency_groups(&metadata.dependency_groups)?,
    );
    put(
        &mut attributes,
        keys::IS_ABSOLUTE_LATEST_VERSION,
        format_bool(metadata.is_absolute_latest_version),
    );
    put(
        &mut attributes,
        keys::IS_LATEST_VERSION,
        format_bool(metadata.is_latest_version),
    );
    put_opt(&mut attributes, keys::MIN_CLIENT_VERSION, metadata.min_client_version);
    put(&mut attributes, keys::LISTED, format_bool(metadata.listed));
    put(
        &mut attributes,
        keys::PUBLISHED,
        published.to_rfc3339_opts(SecondsFormat::AutoSi, true),
    );

    Ok(attributes)
}

/// Fetches and decodes the metadata of `blob`.
///
/// Returns `Ok(None)` when there is no blob at all; a blob whose attributes
/// cannot be decoded is an error.
pub fn read_from_blob<B>(blob: Option<&mut B>) -> Result<Option<PackageMetadata>>
where
    B: AttributeStore + ?Sized,
{
    let Some(blob) = blob else {
        return Ok(None);
    };
    blob.fetch_attributes()?;
    decode_attributes(blob.attributes()).map(Some)
}

/// Encodes `metadata` into `blob`, replacing its attribute map, and commits.
///
/// Storage failures from the commit are returned unchanged.
pub fn save_to_blob<B>(metadata: &PackageMetadata, blob: &mut B) -> Result<()>
where
    B: AttributeStore + ?Sized,
{
    let attributes = encode_attributes(metadata)?;
    *blob.attributes_mut() = attributes;
    blob.commit_attributes()?;
    Ok(())
}
