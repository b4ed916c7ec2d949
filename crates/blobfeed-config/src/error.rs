use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum PathError {
    #[error("Path is empty")]
    #[diagnostic(code(blobfeed_config::path::empty))]
    Empty,

    #[error("Failed to get current directory: {source}")]
    #[diagnostic(code(blobfeed_config::path::current_dir))]
    CurrentDir { source: std::io::Error },

    #[error("Environment variable `{var}` not set in `{input}`")]
    #[diagnostic(code(blobfeed_config::path::missing_env_var))]
    MissingEnvVar { var: String, input: String },

    #[error("Unclosed variable expression starting at `{input}`")]
    #[diagnostic(code(blobfeed_config::path::unclosed_variable))]
    UnclosedVariable { input: String },
}

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(blobfeed_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(blobfeed_config::toml_deserialize),
        help("Check your config.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(blobfeed_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Invalid attribute size limit: {0}")]
    #[diagnostic(
        code(blobfeed_config::invalid_size_limit),
        help("max_attributes_size must be greater than zero")
    )]
    InvalidSizeLimit(usize),

    #[error("IO error: {0}")]
    #[diagnostic(code(blobfeed_config::io))]
    IoError(#[from] std::io::Error),

    #[error(transparent)]
    #[diagnostic(code(blobfeed_config::path))]
    Path(#[from] PathError),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_error_display() {
        let err = PathError::MissingEnvVar {
            var: "VAR".to_string(),
            input: "$VAR/blobs".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Environment variable `VAR` not set in `$VAR/blobs`"
        );

        let err: ConfigError = PathError::Empty.into();
        assert_eq!(err.to_string(), "Path is empty");
    }
}
