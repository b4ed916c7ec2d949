use std::path::Path;

use blobfeed_config::{
    config::{config_path, generate_default_config, set_config_path, Config, StorageBackend},
    error::ConfigError,
    path::resolve_path,
};
use blobfeed_registry::{
    BlobStorage, PackageIdentity, PackageStore, SidecarStorage, XattrStorage,
};
use clap::Parser;
use cli::{Args, Commands};
use error::CliResult;
use inspect::{locate_package, show_attributes, show_package};
use logging::setup_logging;
use publish::publish_package;
use tracing::{debug, info};

mod cli;
mod error;
mod inspect;
mod logging;
mod publish;
mod utils;

fn run<S: BlobStorage>(store: PackageStore<S>, command: Commands, json: bool) -> CliResult<()> {
    match command {
        Commands::Locate {
            id,
            version,
        } => {
            let identity = PackageIdentity::parse(&id, &version)?;
            locate_package(&store, &identity, json)
        }
        Commands::Show {
            id,
            version,
        } => {
            let identity = PackageIdentity::parse(&id, &version)?;
            show_package(&store, &identity, json)
        }
        Commands::Attributes {
            id,
            version,
        } => {
            let identity = PackageIdentity::parse(&id, &version)?;
            show_attributes(&store, &identity, json)
        }
        Commands::Publish {
            manifest,
        } => publish_package(&store, Path::new(&manifest), json),
        // handled before a store is opened
        Commands::Config | Commands::DefConfig => Ok(()),
    }
}

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        utils::set_color(false);
    }

    if let Some(ref c) = args.config {
        set_config_path(resolve_path(c).map_err(ConfigError::from)?);
    }

    match args.command {
        Commands::DefConfig => {
            generate_default_config()?;
        }
        Commands::Config => {
            let config = Config::new()?;
            debug!("configuration path: {}", config_path().display());
            info!("{}", toml::to_string_pretty(&config)?);
        }
        command => {
            let config = Config::new()?;
            let root = config.get_storage_path()?;
            let limit = config.max_attributes_size();
            debug!("using {} backend at {}", config.backend(), root.display());

            match config.backend() {
                StorageBackend::Sidecar => {
                    run(PackageStore::new(SidecarStorage::new(root, limit)), command, args.json)?
                }
                StorageBackend::Xattr => {
                    run(PackageStore::new(XattrStorage::new(root, limit)), command, args.json)?
                }
            }
        }
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
