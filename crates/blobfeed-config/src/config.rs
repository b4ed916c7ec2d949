use std::{
    fmt, fs,
    path::{Path, PathBuf},
    sync::{LazyLock, PoisonError, RwLock},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{ConfigError, Result},
    path::{resolve_path, xdg_config_home, xdg_data_home},
};

/// Attribute bytes allowed per blob unless configured otherwise.
pub const DEFAULT_MAX_ATTRIBUTES_SIZE: usize = 8 * 1024;

pub static CONFIG_PATH: LazyLock<RwLock<PathBuf>> = LazyLock::new(|| {
    RwLock::new(match std::env::var("BLOBFEED_CONFIG") {
        Ok(path_str) => PathBuf::from(path_str),
        Err(_) => xdg_config_home().join("blobfeed").join("config.toml"),
    })
});

/// Returns the active configuration file path.
pub fn config_path() -> PathBuf {
    CONFIG_PATH
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Overrides the configuration file path, e.g. from a `--config` flag.
pub fn set_config_path(path: PathBuf) {
    *CONFIG_PATH.write().unwrap_or_else(PoisonError::into_inner) = path;
}

/// Where blob attributes are kept.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// `attributes.json` next to each blob.
    #[default]
    Sidecar,
    /// Extended file attributes on each blob file.
    Xattr,
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageBackend::Sidecar => write!(f, "sidecar"),
            StorageBackend::Xattr => write!(f, "xattr"),
        }
    }
}

/// Application's configuration
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Root directory of the blob store.
    /// Default: $XDG_DATA_HOME/blobfeed/blobs
    pub storage_path: Option<String>,

    /// Attribute storage backend: "sidecar" or "xattr".
    /// Default: sidecar
    pub backend: Option<StorageBackend>,

    /// Maximum total size in bytes of the attributes of one blob.
    /// Default: 8192
    pub max_attributes_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

impl Config {
    pub fn default_config() -> Self {
        let storage_path = xdg_data_home().join("blobfeed").join("blobs");
        Self {
            storage_path: Some(storage_path.to_string_lossy().into_owned()),
            backend: Some(StorageBackend::default()),
            max_attributes_size: Some(DEFAULT_MAX_ATTRIBUTES_SIZE),
        }
    }

    /// Loads the configuration from [`CONFIG_PATH`].
    /// If the configuration file is not found, it uses the default configuration.
    pub fn new() -> Result<Self> {
        Self::load(config_path())
    }

    /// Loads the configuration from `path`, falling back to defaults if the
    /// file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut config = match fs::read_to_string(path) {
            Ok(content) => {
                debug!("loading configuration from {}", path.display());
                toml::from_str(&content)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("no configuration at {}, using defaults", path.display());
                Self::default_config()
            }
            Err(err) => return Err(ConfigError::IoError(err)),
        };

        config.resolve()?;

        Ok(config)
    }

    /// Fills unset values with defaults and validates the result.
    pub fn resolve(&mut self) -> Result<()> {
        if self.storage_path.is_none() {
            self.storage_path = Self::default_config().storage_path;
        }
        self.backend.get_or_insert_with(StorageBackend::default);
        let limit = *self
            .max_attributes_size
            .get_or_insert(DEFAULT_MAX_ATTRIBUTES_SIZE);
        if limit == 0 {
            return Err(ConfigError::InvalidSizeLimit(limit));
        }
        Ok(())
    }

    /// Resolved blob store root. `BLOBFEED_STORAGE` takes precedence.
    pub fn get_storage_path(&self) -> Result<PathBuf> {
        if let Ok(env_path) = std::env::var("BLOBFEED_STORAGE") {
            return Ok(resolve_path(&env_path)?);
        }
        match &self.storage_path {
            Some(path) => Ok(resolve_path(path)?),
            None => Ok(xdg_data_home().join("blobfeed").join("blobs")),
        }
    }

    pub fn backend(&self) -> StorageBackend {
        self.backend.unwrap_or_default()
    }

    pub fn max_attributes_size(&self) -> usize {
        self.max_attributes_size
            .unwrap_or(DEFAULT_MAX_ATTRIBUTES_SIZE)
    }
}

/// Writes the default configuration to [`CONFIG_PATH`].
///
/// Fails with [`ConfigError::ConfigAlreadyExists`] rather than overwriting.
pub fn generate_default_config() -> Result<PathBuf> {
    let config_path = config_path();

    if config_path.exists() {
        return Err(ConfigError::ConfigAlreadyExists);
    }

    let serialized = toml::to_string_pretty(&Config::default_config())?;
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&config_path, serialized)?;
    info!(
        "Default configuration file generated at: {}",
        config_path.display()
    );
    Ok(config_path)
}
