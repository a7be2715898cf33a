//! `busmirror dump`: every mirrored path with its text.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use busmirror_core::{MirrorConfig, Variant};
use busmirror_tree::Node;

use super::Mirror;

/// Arguments for `busmirror dump`.
#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Emit value, text and validity per path as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct ItemJson {
    path: String,
    value: Variant,
    text: String,
    valid: bool,
}

impl DumpArgs {
    pub fn run(self, config: &MirrorConfig) -> Result<()> {
        let mirror = Mirror::open(config)?;

        if self.json {
            let items = collect_items(&mirror.root)?;
            println!("{}", serde_json::to_string_pretty(&items)?);
            return Ok(());
        }

        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        mirror
            .root
            .trace(&mut out)
            .with_context(|| format!("failed to dump {}", mirror.root.path()))?;
        out.flush()?;
        Ok(())
    }
}

fn collect_items(root: &Node) -> Result<Vec<ItemJson>> {
    let mut items = Vec::new();
    root.try_foreach(|node| -> Result<()> {
        let read = || -> Result<ItemJson, busmirror_tree::TreeError> {
            Ok(ItemJson {
                path: node.path().to_string(),
                value: node.value()?,
                text: node.text()?,
                valid: node.valid()?,
            })
        };
        items.push(read().with_context(|| format!("failed to read {}", node.path()))?);
        Ok(())
    })?;
    Ok(items)
}
