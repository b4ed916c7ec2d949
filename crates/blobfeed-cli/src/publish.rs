use std::{fs, path::Path};

use blobfeed_registry::{BlobStorage, PackageMetadata, PackageStore};
use nu_ansi_term::Color::{Blue, Green, LightRed};
use tracing::{debug, info, warn};

use crate::{
    error::{CliError, CliResult, ErrorContext},
    utils::Colored,
};

/// Parses a JSON package manifest.
pub fn load_manifest(path: &Path) -> CliResult<PackageMetadata> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading manifest {}", path.display()))?;
    serde_json::from_str(&content).map_err(|err| {
        CliError::InvalidManifest {
            path: path.display().to_string(),
            source: err,
        }
    })
}

pub fn publish_package<S: BlobStorage>(
    store: &PackageStore<S>,
    manifest: &Path,
    json: bool,
) -> CliResult<()> {
    let metadata = load_manifest(manifest)?;
    debug!("loaded manifest for {} {}", metadata.id, metadata.version);

    if store.exists(&metadata)? {
        warn!(
            "{} {} is already published, overwriting",
            metadata.id, metadata.version
        );
    }
    store.write(&metadata)?;

    let location = store.locate(&metadata);
    if json {
        let value = serde_json::json!({
            "id": metadata.id,
            "version": metadata.version.to_string(),
            "container": location.container,
            "item": location.item,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        info!(
            "Published {}@{} to {}",
            Colored(Blue, &metadata.id),
            Colored(LightRed, &metadata.version),
            Colored(Green, &location)
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use blobfeed_registry::{MemoryStorage, PackageIdentity};

    use super::*;

    const MANIFEST: &str = r#"{
        "id": "Contoso.Http",
        "version": "2.0.0",
        "authors": ["contoso"],
        "dependencyGroups": [
            {"targetFramework": "net8.0", "dependencies": [{"id": "Contoso.Core", "versionSpec": "[1.0.0,)"}]}
        ]
    }"#;

    #[test]
    fn test_publish_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, MANIFEST).unwrap();

        let store = PackageStore::new(MemoryStorage::default());
        publish_package(&store, &path, true).unwrap();

        let identity = PackageIdentity::parse("Contoso.Http", "2.0.0").unwrap();
        let stored = store.read(&identity).unwrap().unwrap();
        assert_eq!(stored.authors, vec!["contoso"]);
        assert_eq!(stored.dependency_groups.len(), 1);
        assert_eq!(
            stored.dependency_groups[0].dependencies[0].id,
            "Contoso.Core"
        );
    }

    #[test]
    fn test_invalid_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(&path, r#"{"id": "Contoso.Http"}"#).unwrap();

        assert!(matches!(
            load_manifest(&path),
            Err(CliError::InvalidManifest { .. })
        ));
    }

    #[test]
    fn test_missing_manifest() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_manifest(&dir.path().join("absent.json")),
            Err(CliError::IoError { .. })
        ));
    }
}
