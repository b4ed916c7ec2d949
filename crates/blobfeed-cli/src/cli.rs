use clap::{ArgAction, Parser, Subcommand, ValueHint};

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    help_template = "{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}",
    arg_required_else_help = true
)]
pub struct Args {
    /// Set output verbosity
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress outputs
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output as json
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Disable colors in output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Provide custom config file
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<String>,

    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the container and item names a package is stored under
    #[command(arg_required_else_help = true)]
    Locate {
        /// Package id
        #[arg(required = true)]
        id: String,

        /// Package version
        #[arg(required = true)]
        version: String,
    },

    /// Show the stored metadata of a package
    #[command(arg_required_else_help = true)]
    #[clap(name = "show", visible_alias = "info")]
    Show {
        /// Package id
        #[arg(required = true)]
        id: String,

        /// Package version
        #[arg(required = true)]
        version: String,
    },

    /// Print the raw attribute map of a package blob
    #[command(arg_required_else_help = true)]
    #[clap(name = "attributes", visible_alias = "attrs")]
    Attributes {
        /// Package id
        #[arg(required = true)]
        id: String,

        /// Package version
        #[arg(required = true)]
        version: String,
    },

    /// Write package metadata from a JSON manifest to the store
    #[command(arg_required_else_help = true)]
    Publish {
        /// Path to the JSON manifest
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        manifest: String,
    },

    /// Print the effective configuration
    Config,

    /// Generate default config
    #[clap(name = "defconfig")]
    DefConfig,
}
