use blobfeed_registry::{
    AttributeMap, BlobStorage, PackageIdentity, PackageMetadata, PackageStore,
};
use nu_ansi_term::Color::{Blue, Cyan, Green, LightRed, Yellow};
use tracing::{info, warn};

use crate::{
    error::CliResult,
    utils::{or_dash, Colored},
};

pub fn locate_package<S: BlobStorage>(
    store: &PackageStore<S>,
    identity: &PackageIdentity,
    json: bool,
) -> CliResult<()> {
    let location = store.locate(identity);
    if json {
        let value = serde_json::json!({
            "container": location.container,
            "item": location.item,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        info!(
            "{} {} {}",
            Colored(Blue, identity),
            Colored(Cyan, "→"),
            Colored(Green, &location)
        );
    }
    Ok(())
}

pub fn show_package<S: BlobStorage>(
    store: &PackageStore<S>,
    identity: &PackageIdentity,
    json: bool,
) -> CliResult<()> {
    let Some(metadata) = store.read(identity)? else {
        warn!("Package {} not found", identity);
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
    } else {
        print_metadata(&metadata);
    }
    Ok(())
}

pub fn show_attributes<S: BlobStorage>(
    store: &PackageStore<S>,
    identity: &PackageIdentity,
    json: bool,
) -> CliResult<()> {
    let Some(attributes) = store.read_attributes(identity)? else {
        warn!("Package {} not found", identity);
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&attributes)?);
    } else {
        print_attributes(&attributes);
    }
    Ok(())
}

fn print_metadata(metadata: &PackageMetadata) {
    let field = |label: &str, value: String| {
        info!("{}: {}", Colored(Cyan, format!("{label:<22}")), value);
    };

    field("Id", Colored(Blue, &metadata.id).to_string());
    field("Version", Colored(LightRed, &metadata.version).to_string());
    field("Title", or_dash(metadata.title.as_ref()));
    field("Authors", metadata.authors.join(", "));
    field("Owners", metadata.owners.join(", "));
    field("Description", or_dash(metadata.description.as_ref()));
    field("Summary", or_dash(metadata.summary.as_ref()));
    field("Release Notes", or_dash(metadata.release_notes.as_ref()));
    field("Tags", or_dash(metadata.tags.as_ref()));
    field("Icon URL", or_dash(metadata.icon_url.as_ref()));
    field("License URL", or_dash(metadata.license_url.as_ref()));
    field("Project URL", or_dash(metadata.project_url.as_ref()));
    field(
        "Requires License",
        metadata.require_license_acceptance.to_string(),
    );
    field(
        "Development Dependency",
        metadata.development_dependency.to_string(),
    );
    field("Latest", metadata.is_latest_version.to_string());
    field(
        "Absolute Latest",
        metadata.is_absolute_latest_version.to_string(),
    );
    field("Listed", metadata.listed.to_string());
    field("Min Client Version", or_dash(metadata.min_client_version.as_ref()));
    field("Published", metadata.published.to_rfc3339());

    if metadata.dependency_groups.is_empty() {
        field("Dependencies", "-".to_string());
        return;
    }
    field("Dependencies", String::new());
    for group in &metadata.dependency_groups {
        let framework = group.target_framework.as_deref().unwrap_or("any");
        info!("  {}", Colored(Yellow, framework));
        for dependency in &group.dependencies {
            info!(
                "    {} {}",
                dependency.id,
                or_dash(dependency.version_spec.as_ref())
            );
        }
    }
}

fn print_attributes(attributes: &AttributeMap) {
    let width = attributes.keys().map(String::len).max().unwrap_or(0);
    for (key, value) in attributes {
        info!("{} = {}", Colored(Cyan, format!("{key:<width$}")), value);
    }
}
