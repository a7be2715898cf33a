//! `busmirror add-setting <group> <name> <default>`

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use busmirror_core::{MirrorConfig, SettingSpec, Variant};

use super::{parse_variant, Mirror};

/// Arguments for `busmirror add-setting`.
#[derive(Args, Debug)]
pub struct AddSettingArgs {
    /// Setting group, e.g. `Settings/Relay`.
    pub group: String,

    /// Setting name within the group.
    pub name: String,

    /// Default value.
    pub default: String,

    /// Bus type code of the setting (`i`, `f` or `s`).
    #[arg(long = "type", value_name = "TYPE", default_value = "s")]
    pub item_type: String,

    /// Lower bound; `0` when omitted.
    #[arg(long, value_name = "VALUE")]
    pub min: Option<String>,

    /// Upper bound; `0` when omitted.
    #[arg(long, value_name = "VALUE")]
    pub max: Option<String>,
}

impl AddSettingArgs {
    pub fn run(self, config: &MirrorConfig) -> Result<()> {
        let mirror = Mirror::open(config)?;
        let setting = SettingSpec {
            group: self.group,
            name: self.name,
            default_value: parse_variant(&self.default),
            item_type: self.item_type,
            minimum: bound(self.min.as_deref()),
            maximum: bound(self.max.as_deref()),
        };

        mirror
            .root
            .add_setting(&setting)
            .with_context(|| format!("AddSetting failed for {}", setting.object_path()))?;

        let path = setting.object_path();
        match mirror.bus.object(&config.service, path.clone()) {
            Some(object) => println!("{} Added setting {} = {}", "✓".green(), path, object.text),
            None => println!("{} Added setting {}", "✓".green(), path),
        }
        Ok(())
    }
}

fn bound(raw: Option<&str>) -> Variant {
    raw.map(parse_variant).unwrap_or(Variant::Int(0))
}
