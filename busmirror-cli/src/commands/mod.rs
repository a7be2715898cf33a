//! Subcommands and the plumbing they share: resolving the target service
//! and building the mirror over a fixture-backed bus.

pub mod add_setting;
pub mod dump;
pub mod get;
pub mod set;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use busmirror_core::{Fixture, MemoryBus, MirrorConfig, ObjectPath, Variant};
use busmirror_tree::Node;

/// Flags selecting what to mirror. Each one overrides `config.yaml`.
#[derive(Args, Debug, Default)]
pub struct TargetArgs {
    /// YAML fixture describing the services on the bus.
    #[arg(long, global = true, value_name = "FILE")]
    pub fixture: Option<PathBuf>,

    /// Service whose object tree is mirrored.
    #[arg(long, global = true, value_name = "NAME")]
    pub service: Option<String>,

    /// Object path the mirror starts from.
    #[arg(long, global = true, value_name = "PATH")]
    pub root: Option<String>,
}

impl TargetArgs {
    pub fn apply(&self, config: &mut MirrorConfig) {
        if let Some(fixture) = &self.fixture {
            config.fixture = Some(fixture.clone());
        }
        if let Some(service) = &self.service {
            config.service = service.clone();
        }
        if let Some(root) = &self.root {
            config.root = ObjectPath::from(root.as_str());
        }
    }
}

/// A built tree together with the bus it mirrors.
pub struct Mirror {
    pub bus: MemoryBus,
    pub root: Node,
}

impl Mirror {
    pub fn open(config: &MirrorConfig) -> Result<Self> {
        let fixture_path = config.fixture.as_ref().context(
            "no fixture configured; pass --fixture or set `fixture` in ~/.busmirror/config.yaml",
        )?;
        let fixture = Fixture::load(fixture_path)
            .with_context(|| format!("failed to load fixture '{}'", fixture_path.display()))?;
        let bus = MemoryBus::from_fixture(&fixture)
            .with_context(|| format!("invalid fixture '{}'", fixture_path.display()))?;

        let span = tracing::info_span!("mirror", service = %config.service);
        let root = Node::build(&bus, &config.service, &config.root, &span).with_context(|| {
            format!("failed to mirror {} from {}", config.service, config.root)
        })?;
        tracing::debug!(parent: &span, nodes = root.node_count(), "mirror ready");
        Ok(Self { bus, root })
    }

    /// Node at the absolute object `path`, which must lie under the root.
    pub fn node(&self, path: &str) -> Result<&Node> {
        let root = self.root.path();
        let relative = if root.is_root() {
            Some(path)
        } else {
            path.strip_prefix(root.as_str())
                .filter(|rest| rest.is_empty() || rest.starts_with('/'))
        };
        let Some(relative) = relative else {
            bail!("'{path}' is not below the mirror root {root}");
        };
        self.root
            .descendant(relative)
            .with_context(|| format!("no mirrored item at '{path}'"))
    }
}

/// Interpret a command-line argument as JSON where it parses, else as a string.
pub fn parse_variant(raw: &str) -> Variant {
    serde_json::from_str(raw).unwrap_or_else(|_| Variant::from(raw))
}
