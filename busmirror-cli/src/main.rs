//! busmirror: inspect a mirrored bus object tree.
//!
//! # Usage
//!
//! ```text
//! busmirror [--fixture FILE] [--service NAME] [--root PATH] dump [--json]
//! busmirror get <path> [--text | --valid]
//! busmirror set <path> <value>
//! busmirror add-setting <group> <name> <default> [--type T] [--min V] [--max V]
//! ```
//!
//! Defaults come from `~/.busmirror/config.yaml`; flags override them.

mod commands;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use busmirror_core::{config, MirrorConfig};
use commands::{
    add_setting::AddSettingArgs, dump::DumpArgs, get::GetArgs, set::SetArgs, TargetArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "busmirror",
    version,
    about = "Mirror a bus object tree and read or write its items",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    target: TargetArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print every mirrored path with its text.
    Dump(DumpArgs),

    /// Read one property of a mirrored item.
    Get(GetArgs),

    /// Write a value and report the change notifications it caused.
    Set(SetArgs),

    /// Ask the service to create a setting.
    AddSetting(AddSettingArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();

    let home = dirs::home_dir().context("could not determine home directory")?;
    let mut config = config::load_at(&home).with_context(|| {
        format!(
            "failed to load {}",
            config::config_path_at(&home).display()
        )
    })?;
    cli.target.apply(&mut config);
    init_tracing(&config);

    match cli.command {
        Commands::Dump(args) => args.run(&config),
        Commands::Get(args) => args.run(&config),
        Commands::Set(args) => args.run(&config),
        Commands::AddSetting(args) => args.run(&config),
    }
}

/// `RUST_LOG` wins over the configured filter; `warn` when neither is set.
fn init_tracing(config: &MirrorConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| match config.log_filter.as_deref() {
            Some(directive) => EnvFilter::try_new(directive),
            None => Ok(EnvFilter::new("warn")),
        })
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
