//! Error types for the registry crate.
//!
//! [`RegistryError`] covers everything that can go wrong while turning a
//! package into an attribute map and back. Failures raised by the backing
//! attribute store are wrapped unchanged in [`RegistryError::Storage`].

use miette::Diagnostic;
use thiserror::Error;

/// Failures of the storage collaborator holding blob attributes.
#[derive(Error, Diagnostic, Debug)]
pub enum StorageError {
    #[error("Error while {action}: {source}")]
    #[diagnostic(code(blobfeed_registry::storage::io))]
    IoError {
        action: String,
        source: std::io::Error,
    },

    #[error("Attribute set of {location} is corrupted: {source}")]
    #[diagnostic(
        code(blobfeed_registry::storage::corrupt),
        help("Rewrite the package metadata with `blobfeed publish`")
    )]
    CorruptAttributes {
        location: String,
        source: serde_json::Error,
    },

    #[error("Blob not found: {0}")]
    #[diagnostic(code(blobfeed_registry::storage::not_found))]
    BlobNotFound(String),

    #[error("Attribute set of {location} is {size} bytes, the limit is {limit} bytes")]
    #[diagnostic(
        code(blobfeed_registry::storage::too_large),
        help("Shorten long fields such as the description or release notes")
    )]
    AttributesTooLarge {
        location: String,
        size: usize,
        limit: usize,
    },

    #[error("Invalid storage name `{0}`")]
    #[diagnostic(
        code(blobfeed_registry::storage::invalid_name),
        help("Container and item names must be non-empty and contain no path separators")
    )]
    InvalidName(String),

    #[error("{0}")]
    #[diagnostic(code(blobfeed_registry::storage::custom))]
    Custom(String),
}

/// Low-level failures of the dependency-group encoding.
#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur while encoding or decoding package metadata.
#[derive(Error, Diagnostic, Debug)]
pub enum RegistryError {
    #[error("Missing required attribute `{0}`")]
    #[diagnostic(
        code(blobfeed_registry::missing_attribute),
        help("The blob was not written by blobfeed or its metadata was truncated")
    )]
    MissingRequiredAttribute(String),

    #[error("Attribute `{0}` is not a boolean")]
    #[diagnostic(
        code(blobfeed_registry::malformed_boolean),
        help("Boolean attributes must be `true` or `false`")
    )]
    MalformedBoolean(String),

    #[error("Attribute `{0}` is not a valid version")]
    #[diagnostic(code(blobfeed_registry::malformed_version))]
    MalformedVersion(String),

    #[error("Attribute `{0}` is not an absolute URI")]
    #[diagnostic(code(blobfeed_registry::malformed_uri))]
    MalformedUri(String),

    #[error("Attribute `{0}` is not an RFC 3339 timestamp")]
    #[diagnostic(code(blobfeed_registry::malformed_timestamp))]
    MalformedTimestamp(String),

    #[error("Malformed dependency encoding: {0}")]
    #[diagnostic(
        code(blobfeed_registry::malformed_encoding),
        help("The `Dependencies` attribute must be base64-encoded JSON")
    )]
    MalformedEncoding(#[from] EncodingError),

    #[error("Invalid package identity: {0}")]
    #[diagnostic(code(blobfeed_registry::invalid_identity))]
    InvalidIdentity(String),

    #[error(transparent)]
    #[diagnostic(code(blobfeed_registry::storage))]
    Storage(#[from] StorageError),
}

/// A specialized Result type for registry operations.
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Extension trait for adding context to I/O errors raised by storage backends.
pub trait ErrorContext<T> {
    /// Adds context to an error, describing what action was being performed.
    fn with_context<C>(self, context: C) -> std::result::Result<T, StorageError>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> std::result::Result<T, StorageError>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            StorageError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}
