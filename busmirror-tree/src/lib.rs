//! # busmirror-tree
//!
//! Locally cached mirror of a remote object tree.
//!
//! [`Node::build`] introspects a service from a starting path and mirrors
//! every object below it. Property reads are fetched once and cached;
//! `PropertiesChanged` notifications overwrite the cache and are forwarded
//! to an optional per-node callback. [`Node::teardown`] releases every
//! subscription, children before parents.

mod builder;
mod dispatch;
pub mod error;
pub mod node;

pub use error::TreeError;
pub use node::{CachedProperties, ChangeCallback, ChangeEvent, Node};
