use blobfeed_config::error::ConfigError;
use blobfeed_registry::RegistryError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Registry(#[from] RegistryError),

    #[error("Error while {action}")]
    #[diagnostic(code(blobfeed::io))]
    IoError {
        action: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest {path}")]
    #[diagnostic(
        code(blobfeed::manifest),
        help("The manifest must be a JSON object with at least `id` and `version`")
    )]
    InvalidManifest {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    #[diagnostic(code(blobfeed::json))]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    #[diagnostic(code(blobfeed::toml))]
    Toml(#[from] toml::ser::Error),
}

pub type CliResult<T> = std::result::Result<T, CliError>;

pub trait ErrorContext<T> {
    fn with_context<C>(self, context: C) -> CliResult<T>
    where
        C: FnOnce() -> String;
}

impl<T> ErrorContext<T> for std::io::Result<T> {
    fn with_context<C>(self, context: C) -> CliResult<T>
    where
        C: FnOnce() -> String,
    {
        self.map_err(|err| {
            CliError::IoError {
                action: context(),
                source: err,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_context() {
        let result: std::io::Result<()> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "missing",
        ));
        let err = result.with_context(|| "reading manifest".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "Error while reading manifest");
    }

    #[test]
    fn test_registry_error_is_transparent() {
        let err = CliError::from(RegistryError::MissingRequiredAttribute("Id".into()));
        assert_eq!(
            err.to_string(),
            RegistryError::MissingRequiredAttribute("Id".into()).to_string()
        );
    }
}
