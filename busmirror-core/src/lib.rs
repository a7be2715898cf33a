//! busmirror core library: bus contract, domain types, errors.
//!
//! - [`types`]: object paths, variants, notification payloads
//! - [`bus`]: the collaborator traits the mirror tree is built on
//! - [`introspect`]: introspection document parsing
//! - [`memory`]: in-process [`bus::Bus`] implementation and fixtures
//! - [`config`]: `~/.busmirror/config.yaml`
//! - [`error`]: [`BusError`], [`IntrospectionError`], [`ConfigError`]

pub mod bus;
pub mod config;
pub mod error;
pub mod introspect;
pub mod memory;
pub mod types;

pub use bus::{Bus, ObjectProxy, SignalHandler, Subscription};
pub use config::MirrorConfig;
pub use error::{BusError, ConfigError, FixtureError, IntrospectionError};
pub use memory::{Fixture, MemoryBus, MemoryObject, RemoteMethod};
pub use types::{ObjectPath, PropertyChanges, SettingSpec, Variant};
