use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "solid-forge")]
#[command(about = "Add integrations to Solid projects by editing vite.config.ts in place")]
#[command(version)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet output (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Base directory (default: ~/.solid-forge)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

/// Starter template variations for `new`
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Variation {
    Bare,
    Ts,
    Js,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add and install integrations: `solid-forge add unocss`
    Add {
        /// Integration names (prints the supported list when omitted)
        integrations: Vec<String>,

        /// Overwrite entries that already exist in the plugin list
        #[arg(short, long)]
        force: bool,

        /// Project directory (default: current directory)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Print the transformed config instead of writing it
        #[arg(short, long)]
        dry_run: bool,

        /// Skip the package install step
        #[arg(long)]
        no_install: bool,
    },

    /// Create a new Solid project from a template
    New {
        /// Template to create, for example `bare`
        #[arg(value_enum)]
        variation: Variation,

        /// Name of the folder to create
        name: Option<String>,

        /// Open the template on StackBlitz instead of cloning
        #[arg(short, long)]
        stackblitz: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "add.config_file")
        key: String,
    },

    /// Set a config value
    Set {
        /// Config key (e.g. "add.force")
        key: String,

        /// New value
        value: String,
    },

    /// List all config values
    List,

    /// Create the config file with defaults
    Init,
}
