//! The bus collaborator contract consumed by the mirror tree.
//!
//! # Threading
//!
//! Everything here is single-threaded. A collaborator must deliver
//! notifications to [`SignalHandler`]s on the same thread the application uses
//! for direct calls, from its own dispatch loop, and never while one of the
//! proxy methods below is still running. Nothing here is required to be
//! `Send`, so a collaborator that violates this cannot be handed to the tree
//! from another thread by accident.
//!
//! # Timeouts and retries
//!
//! Every call is issued once and blocks until the collaborator returns.
//! Timeouts belong to the collaborator and surface as [`BusError::Timeout`];
//! callers see the error exactly as reported.

use crate::error::BusError;
use crate::types::{ObjectPath, PropertyChanges, SettingSpec, Variant};

/// Handler registered for a signal on one object path.
pub type SignalHandler = Box<dyn FnMut(&PropertyChanges)>;

/// A connection able to hand out proxies for remote objects.
pub trait Bus {
    type Proxy: ObjectProxy;

    /// Proxy for `path` on `service`. Idempotent per `(service, path)`.
    fn get_object(&self, service: &str, path: &ObjectPath) -> Result<Self::Proxy, BusError>;
}

/// Synchronous remote calls against one object.
pub trait ObjectProxy {
    fn object_path(&self) -> &ObjectPath;

    /// Raw introspection document, see [`crate::introspect::child_names`].
    fn introspect(&self) -> Result<String, BusError>;

    fn get_value(&self) -> Result<Variant, BusError>;

    fn set_value(&self, value: Variant) -> Result<(), BusError>;

    fn get_text(&self) -> Result<String, BusError>;

    fn get_property(&self, interface: &str, property: &str) -> Result<Variant, BusError>;

    fn add_setting(&self, setting: &SettingSpec) -> Result<(), BusError>;

    /// Register `handler` for `signal` emitted by this object.
    fn subscribe(
        &self,
        signal: &str,
        handler: SignalHandler,
    ) -> Result<Box<dyn Subscription>, BusError>;
}

/// A live signal registration.
pub trait Subscription {
    /// Stop delivering the signal. Calling it again has no effect.
    fn release(&mut self);

    fn is_released(&self) -> bool;
}
