//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--quiet` / `-q`: Minimal output
//! - `--template-config <path>`: Template config document
//! - `--regions-config <path>`: Regions config document

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::engine::{DEFAULT_REGIONS_CONFIG, DEFAULT_TEMPLATE_CONFIG};

/// regionforge - fan a report template out across regions and publish it
#[derive(Parser, Debug)]
#[command(name = "rf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if rf was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; only errors are printed
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Template config document
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_TEMPLATE_CONFIG)]
    pub template_config: PathBuf,

    /// Regions config document
    #[arg(long, global = true, value_name = "PATH", default_value = DEFAULT_REGIONS_CONFIG)]
    pub regions_config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show what would be generated for each region
    #[command(
        long_about = "Resolve the template and regions configuration and print, per region, \
            the report name and the model and report directories, marking those that \
            already exist. Nothing is written.",
        after_help = "\
EXAMPLES:
    # Plan with the default config locations
    rf plan

    # Plan a checkout elsewhere
    rf --cwd ../reports plan"
    )]
    Plan,

    /// Create or refresh every region's model and report on disk
    #[command(
        long_about = "Copy the template model and report into each region's directories and \
            rewrite display names, logical ids, the region parameter and the report's \
            model reference. Existing logical ids are kept; new ones are derived from \
            the artifact kind and region code.",
        after_help = "\
EXAMPLES:
    # Generate all regions
    rf generate

    # Use explicit config documents
    rf generate --template-config cfg/template.json --regions-config cfg/regions.json"
    )]
    Generate,

    /// Publish generated artifacts to the workspace
    #[command(
        long_about = "Create or update each region's semantic model and report in the remote \
            workspace, waiting for long-running operations. Credentials are read from \
            AZURE_TENANT_ID, AZURE_CLIENT_ID, AZURE_CLIENT_SECRET and FABRIC_WORKSPACE_ID \
            (or WORKSPACE_ID).",
        after_help = "\
EXAMPLES:
    # Publish with default endpoints and timeouts
    rf publish

    # Override endpoints and timeouts
    rf publish --settings rf.toml"
    )]
    Publish {
        /// Publish settings (TOML)
        #[arg(long, value_name = "PATH")]
        settings: Option<PathBuf>,
    },

    /// Generate, then publish
    Run {
        /// Publish settings (TOML)
        #[arg(long, value_name = "PATH")]
        settings: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    #[command(
        long_about = "Generate shell completion scripts for rf.",
        after_help = "\
EXAMPLES:
    # Bash
    rf completion bash > /etc/bash_completion.d/rf

    # Zsh
    rf completion zsh > \"${fpath[1]}/_rf\"

    # Fish
    rf completion fish > ~/.config/fish/completions/rf.fish

    # PowerShell
    rf completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    PowerShell,
}
