//! `busmirror get <path>`: read one property.

use anyhow::{Context, Result};
use clap::Args;

use busmirror_core::MirrorConfig;

use super::Mirror;

/// Arguments for `busmirror get`.
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Absolute object path of the item.
    pub path: String,

    /// Print the human-readable text instead of the value.
    #[arg(long, conflicts_with = "valid")]
    pub text: bool,

    /// Print whether the item currently holds a valid value.
    #[arg(long)]
    pub valid: bool,
}

impl GetArgs {
    pub fn run(self, config: &MirrorConfig) -> Result<()> {
        let mirror = Mirror::open(config)?;
        let node = mirror.node(&self.path)?;

        let rendered = if self.text {
            node.text()
        } else if self.valid {
            node.valid().map(|valid| valid.to_string())
        } else {
            node.value().map(|value| value.to_string())
        }
        .with_context(|| format!("failed to read {}", self.path))?;

        println!("{rendered}");
        Ok(())
    }
}
