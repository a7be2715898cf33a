//! `busmirror set <path> <value>`: write a value and show the echo.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use busmirror_core::MirrorConfig;
use busmirror_tree::ChangeEvent;

use super::{parse_variant, Mirror};

/// Arguments for `busmirror set`.
#[derive(Args, Debug)]
pub struct SetArgs {
    /// Absolute object path of the item.
    pub path: String,

    /// New value. Sent to the service as a string either way.
    pub value: String,
}

impl SetArgs {
    pub fn run(self, config: &MirrorConfig) -> Result<()> {
        let mirror = Mirror::open(config)?;
        let node = mirror.node(&self.path)?;

        let events: Rc<RefCell<Vec<ChangeEvent>>> = Rc::default();
        let sink = events.clone();
        node.set_callback(move |event| sink.borrow_mut().push(event.clone()));

        node.set_value(parse_variant(&self.value))
            .with_context(|| format!("failed to set {}", self.path))?;
        let delivered = mirror.bus.dispatch_pending();
        tracing::debug!(delivered, "dispatched pending notifications");

        let events = events.borrow();
        if events.is_empty() {
            println!(
                "{} {} written; no change notification received",
                "✓".green(),
                self.path
            );
            return Ok(());
        }
        for event in events.iter() {
            let value = event
                .value
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            let text = event.text.as_deref().unwrap_or_default();
            println!("{} {} = {} ({})", "✓".green(), event.path, value, text);
        }
        Ok(())
    }
}
