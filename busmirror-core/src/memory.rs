//! In-process bus collaborator.
//!
//! [`MemoryBus`] holds a set of services and their objects in memory and
//! implements [`Bus`] for them. It keeps a log of every remote call, lets
//! tests inject failures and raw introspection replies, and queues
//! `PropertiesChanged` notifications until [`MemoryBus::dispatch_pending`]
//! delivers them on the calling thread, playing the part of the bus
//! dispatch loop.
//!
//! # Fixture format
//!
//! ```text
//! services:
//!   com.victronenergy.settings:
//!     /Settings/System/TimeZone:
//!       value: Europe/Amsterdam
//!     /Settings/Relay/Function:
//!       value: 1
//!       text: Alarm relay
//!       valid: true
//! ```
//!
//! Intermediate paths (`/Settings`, `/Settings/System`, ...) exist
//! implicitly: they can be introspected but carry no value.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt;
use std::path::Path;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use crate::bus::{Bus, ObjectProxy, SignalHandler, Subscription};
use crate::error::{BusError, FixtureError};
use crate::introspect;
use crate::types::{
    ObjectPath, PropertyChanges, SettingSpec, Variant, BUS_ITEM_INTERFACE, PATH_SEPARATOR,
    PROPERTIES_CHANGED, PROP_TEXT, PROP_VALID, PROP_VALUE,
};

// ---------------------------------------------------------------------------
// Fixture
// ---------------------------------------------------------------------------

/// One exported object in a fixture.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureObject {
    pub value: Variant,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid: Option<Variant>,
}

/// Services and their objects, keyed by service name then object path.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub services: BTreeMap<String, BTreeMap<String, FixtureObject>>,
}

impl Fixture {
    pub fn from_yaml(contents: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let contents = std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&contents)
    }
}

// ---------------------------------------------------------------------------
// Objects and calls
// ---------------------------------------------------------------------------

/// State of one exported object.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryObject {
    pub value: Variant,
    pub text: String,
    pub valid: Variant,
}

impl MemoryObject {
    /// Object whose text is the rendered value and whose validity follows
    /// from the value not being the invalid marker.
    pub fn new(value: impl Into<Variant>) -> Self {
        let value = value.into();
        let valid = Variant::Bool(value != Variant::invalid());
        Self {
            text: value.to_string(),
            value,
            valid,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_valid(mut self, valid: impl Into<Variant>) -> Self {
        self.valid = valid.into();
        self
    }
}

impl From<FixtureObject> for MemoryObject {
    fn from(fixture: FixtureObject) -> Self {
        let mut object = MemoryObject::new(fixture.value);
        if let Some(text) = fixture.text {
            object.text = text;
        }
        if let Some(valid) = fixture.valid {
            object.valid = valid;
        }
        object
    }
}

/// Remote methods tracked by the call log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RemoteMethod {
    Introspect,
    GetValue,
    SetValue,
    GetText,
    GetProperty,
    AddSetting,
    Subscribe,
}

impl fmt::Display for RemoteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RemoteMethod::Introspect => "Introspect",
            RemoteMethod::GetValue => "GetValue",
            RemoteMethod::SetValue => "SetValue",
            RemoteMethod::GetText => "GetText",
            RemoteMethod::GetProperty => "Get",
            RemoteMethod::AddSetting => "AddSetting",
            RemoteMethod::Subscribe => "AddMatch",
        };
        f.write_str(name)
    }
}

/// One entry of the call log.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCall {
    pub service: String,
    pub path: ObjectPath,
    pub method: RemoteMethod,
    /// Argument of `SetValue`, when that was the call.
    pub argument: Option<Variant>,
}

type ObjectKey = (String, ObjectPath);

struct SubscriptionEntry {
    id: u64,
    service: String,
    path: ObjectPath,
    signal: String,
    handler: Rc<RefCell<SignalHandler>>,
    active: bool,
}

struct PendingSignal {
    service: String,
    path: ObjectPath,
    signal: String,
    changes: PropertyChanges,
}

#[derive(Default)]
struct Inner {
    services: BTreeSet<String>,
    objects: BTreeMap<ObjectKey, MemoryObject>,
    introspection: HashMap<ObjectKey, String>,
    failures: HashMap<(String, ObjectPath, RemoteMethod), BusError>,
    calls: Vec<RemoteCall>,
    subscriptions: Vec<SubscriptionEntry>,
    next_subscription: u64,
    pending: VecDeque<PendingSignal>,
    release_log: Vec<ObjectPath>,
    redundant_releases: usize,
    dispatching: bool,
}

impl Inner {
    fn exists(&self, service: &str, path: &ObjectPath) -> bool {
        if !self.services.contains(service) {
            return false;
        }
        if path.is_root() {
            return true;
        }
        let prefix = format!("{}{PATH_SEPARATOR}", path.as_str());
        self.objects
            .keys()
            .any(|(svc, p)| svc == service && (p == path || p.as_str().starts_with(&prefix)))
    }

    fn children(&self, service: &str, path: &ObjectPath) -> Vec<String> {
        let prefix = if path.is_root() {
            PATH_SEPARATOR.to_owned()
        } else {
            format!("{}{PATH_SEPARATOR}", path.as_str())
        };
        let names: BTreeSet<String> = self
            .objects
            .keys()
            .filter(|(svc, _)| svc == service)
            .filter_map(|(_, p)| p.as_str().strip_prefix(prefix.as_str()))
            .filter_map(|rest| rest.split(PATH_SEPARATOR).next())
            .filter(|name| !name.is_empty())
            .map(str::to_owned)
            .collect();
        names.into_iter().collect()
    }

    /// Record the call and return the injected failure for it, if any.
    fn record(
        &mut self,
        service: &str,
        path: &ObjectPath,
        method: RemoteMethod,
        argument: Option<Variant>,
    ) -> Result<(), BusError> {
        self.calls.push(RemoteCall {
            service: service.to_owned(),
            path: path.clone(),
            method,
            argument,
        });
        match self
            .failures
            .get(&(service.to_owned(), path.clone(), method))
        {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn object(&self, service: &str, path: &ObjectPath) -> Option<&MemoryObject> {
        self.objects.get(&(service.to_owned(), path.clone()))
    }
}

// ---------------------------------------------------------------------------
// MemoryBus
// ---------------------------------------------------------------------------

/// Single-threaded in-memory bus. Clones share the same state.
#[derive(Clone, Default)]
pub struct MemoryBus {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: &Fixture) -> Result<Self, FixtureError> {
        let bus = MemoryBus::new();
        for (service, objects) in &fixture.services {
            bus.add_service(service);
            for (path, object) in objects {
                if !path.starts_with(PATH_SEPARATOR) {
                    return Err(FixtureError::RelativePath(path.clone()));
                }
                bus.insert(service, path.as_str(), MemoryObject::from(object.clone()));
            }
        }
        Ok(bus)
    }

    /// Register a service with no objects yet.
    pub fn add_service(&self, service: &str) {
        self.inner.borrow_mut().services.insert(service.to_owned());
    }

    /// Export `object` at `path`, replacing any previous object there.
    pub fn insert(&self, service: &str, path: impl Into<ObjectPath>, object: MemoryObject) {
        let mut inner = self.inner.borrow_mut();
        inner.services.insert(service.to_owned());
        inner.objects.insert((service.to_owned(), path.into()), object);
    }

    /// Current remote state of an object, bypassing the call log.
    pub fn object(&self, service: &str, path: impl Into<ObjectPath>) -> Option<MemoryObject> {
        self.inner.borrow().object(service, &path.into()).cloned()
    }

    /// Reply with `document` instead of the generated introspection data.
    pub fn set_introspection(
        &self,
        service: &str,
        path: impl Into<ObjectPath>,
        document: impl Into<String>,
    ) {
        self.inner
            .borrow_mut()
            .introspection
            .insert((service.to_owned(), path.into()), document.into());
    }

    /// Make every later `method` call on `path` fail with `error`.
    pub fn fail_call(
        &self,
        service: &str,
        path: impl Into<ObjectPath>,
        method: RemoteMethod,
        error: BusError,
    ) {
        self.inner
            .borrow_mut()
            .failures
            .insert((service.to_owned(), path.into(), method), error);
    }

    pub fn clear_failures(&self) {
        self.inner.borrow_mut().failures.clear();
    }

    /// All remote calls so far, in order.
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.inner.borrow().calls.clone()
    }

    /// Number of `method` calls made against `path`.
    pub fn call_count(&self, path: impl Into<ObjectPath>, method: RemoteMethod) -> usize {
        let path = path.into();
        self.inner
            .borrow()
            .calls
            .iter()
            .filter(|c| c.path == path && c.method == method)
            .count()
    }

    pub fn clear_calls(&self) {
        self.inner.borrow_mut().calls.clear();
    }

    /// Update the remote object and queue the matching notification, the way
    /// the owning service would after a local change.
    pub fn update(&self, service: &str, path: impl Into<ObjectPath>, value: impl Into<Variant>) {
        let path = path.into();
        let value = value.into();
        let text = value.to_string();
        {
            let mut inner = self.inner.borrow_mut();
            let key = (service.to_owned(), path.clone());
            let object = inner
                .objects
                .entry(key)
                .or_insert_with(|| MemoryObject::new(Variant::invalid()));
            object.value = value.clone();
            object.text = text.clone();
        }
        let mut changes = PropertyChanges::new();
        changes.insert(PROP_VALUE.to_owned(), value);
        changes.insert(PROP_TEXT.to_owned(), Variant::Str(text));
        self.emit(service, path, changes);
    }

    /// Queue a `PropertiesChanged` notification without touching object state.
    pub fn emit(&self, service: &str, path: impl Into<ObjectPath>, changes: PropertyChanges) {
        self.inner.borrow_mut().pending.push_back(PendingSignal {
            service: service.to_owned(),
            path: path.into(),
            signal: PROPERTIES_CHANGED.to_owned(),
            changes,
        });
    }

    pub fn pending_signals(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// Deliver queued notifications to active subscribers on this thread.
    /// Returns the number of handler invocations.
    ///
    /// A call made from inside a handler delivers nothing and returns 0; the
    /// running dispatch keeps draining the queue, including anything queued
    /// by that handler.
    pub fn dispatch_pending(&self) -> usize {
        if std::mem::replace(&mut self.inner.borrow_mut().dispatching, true) {
            tracing::trace!("dispatch already running; nested call is a no-op");
            return 0;
        }
        let _guard = DispatchGuard(&self.inner);

        let mut delivered = 0;
        loop {
            let Some(signal) = self.inner.borrow_mut().pending.pop_front() else {
                break;
            };
            let targets: Vec<(u64, Rc<RefCell<SignalHandler>>)> = self
                .inner
                .borrow()
                .subscriptions
                .iter()
                .filter(|s| {
                    s.active
                        && s.service == signal.service
                        && s.path == signal.path
                        && s.signal == signal.signal
                })
                .map(|s| (s.id, s.handler.clone()))
                .collect();

            for (id, handler) in targets {
                // An earlier handler may have released this subscription.
                if !self.is_active(id) {
                    continue;
                }
                match handler.try_borrow_mut() {
                    Ok(mut handler) => {
                        (*handler)(&signal.changes);
                        delivered += 1;
                    }
                    Err(_) => {
                        tracing::warn!(
                            path = %signal.path,
                            subscription = id,
                            "skipping re-entrant signal delivery",
                        );
                    }
                }
            }
        }
        delivered
    }

    fn is_active(&self, id: u64) -> bool {
        self.inner
            .borrow()
            .subscriptions
            .iter()
            .any(|s| s.id == id && s.active)
    }

    /// Number of live subscriptions on `path`.
    pub fn active_subscriptions(&self, path: impl Into<ObjectPath>) -> usize {
        let path = path.into();
        self.inner
            .borrow()
            .subscriptions
            .iter()
            .filter(|s| s.active && s.path == path)
            .count()
    }

    /// Number of live subscriptions on the whole bus.
    pub fn total_active_subscriptions(&self) -> usize {
        self.inner
            .borrow()
            .subscriptions
            .iter()
            .filter(|s| s.active)
            .count()
    }

    /// Paths whose subscriptions were released, in release order.
    pub fn release_log(&self) -> Vec<ObjectPath> {
        self.inner.borrow().release_log.clone()
    }

    /// Number of `release()` calls on handles that were already released.
    pub fn redundant_releases(&self) -> usize {
        self.inner.borrow().redundant_releases
    }
}

/// Clears the dispatching flag when the outermost dispatch ends, even by panic.
struct DispatchGuard<'a>(&'a RefCell<Inner>);

impl Drop for DispatchGuard<'_> {
    fn drop(&mut self) {
        self.0.borrow_mut().dispatching = false;
    }
}

impl Bus for MemoryBus {
    type Proxy = MemoryProxy;

    fn get_object(&self, service: &str, path: &ObjectPath) -> Result<MemoryProxy, BusError> {
        if !self.inner.borrow().exists(service, path) {
            return Err(BusError::UnknownObject {
                service: service.to_owned(),
                path: path.clone(),
            });
        }
        Ok(MemoryProxy {
            bus: self.clone(),
            service: service.to_owned(),
            path: path.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Proxy
// ---------------------------------------------------------------------------

/// Proxy for one object on a [`MemoryBus`].
#[derive(Clone)]
pub struct MemoryProxy {
    bus: MemoryBus,
    service: String,
    path: ObjectPath,
}

impl MemoryProxy {
    fn call_failed(&self, method: RemoteMethod, message: impl Into<String>) -> BusError {
        BusError::CallFailed {
            path: self.path.clone(),
            method: method.to_string(),
            message: message.into(),
        }
    }
}

impl ObjectProxy for MemoryProxy {
    fn object_path(&self) -> &ObjectPath {
        &self.path
    }

    fn introspect(&self) -> Result<String, BusError> {
        let mut inner = self.bus.inner.borrow_mut();
        inner.record(&self.service, &self.path, RemoteMethod::Introspect, None)?;
        let key = (self.service.clone(), self.path.clone());
        if let Some(document) = inner.introspection.get(&key) {
            return Ok(document.clone());
        }
        let children = inner.children(&self.service, &self.path);
        let names: Vec<&str> = children.iter().map(String::as_str).collect();
        Ok(introspect::render(&names))
    }

    fn get_value(&self) -> Result<Variant, BusError> {
        let mut inner = self.bus.inner.borrow_mut();
        inner.record(&self.service, &self.path, RemoteMethod::GetValue, None)?;
        Ok(inner
            .object(&self.service, &self.path)
            .map(|o| o.value.clone())
            .unwrap_or_default())
    }

    fn set_value(&self, value: Variant) -> Result<(), BusError> {
        {
            let mut inner = self.bus.inner.borrow_mut();
            inner.record(
                &self.service,
                &self.path,
                RemoteMethod::SetValue,
                Some(value.clone()),
            )?;
            if inner.object(&self.service, &self.path).is_none() {
                return Err(self.call_failed(RemoteMethod::SetValue, "object has no value"));
            }
        }
        self.bus.update(&self.service, self.path.clone(), value);
        Ok(())
    }

    fn get_text(&self) -> Result<String, BusError> {
        let mut inner = self.bus.inner.borrow_mut();
        inner.record(&self.service, &self.path, RemoteMethod::GetText, None)?;
        Ok(inner
            .object(&self.service, &self.path)
            .map(|o| o.text.clone())
            .unwrap_or_default())
    }

    fn get_property(&self, interface: &str, property: &str) -> Result<Variant, BusError> {
        let mut inner = self.bus.inner.borrow_mut();
        inner.record(&self.service, &self.path, RemoteMethod::GetProperty, None)?;
        if interface != BUS_ITEM_INTERFACE || property != PROP_VALID {
            return Err(self.call_failed(
                RemoteMethod::GetProperty,
                format!("unknown property {interface}.{property}"),
            ));
        }
        Ok(inner
            .object(&self.service, &self.path)
            .map(|o| o.valid.clone())
            .unwrap_or(Variant::Bool(false)))
    }

    fn add_setting(&self, setting: &SettingSpec) -> Result<(), BusError> {
        let mut inner = self.bus.inner.borrow_mut();
        inner.record(&self.service, &self.path, RemoteMethod::AddSetting, None)?;
        let key = (self.service.clone(), setting.object_path());
        inner
            .objects
            .entry(key)
            .or_insert_with(|| MemoryObject::new(setting.default_value.clone()));
        Ok(())
    }

    fn subscribe(
        &self,
        signal: &str,
        handler: SignalHandler,
    ) -> Result<Box<dyn Subscription>, BusError> {
        let mut inner = self.bus.inner.borrow_mut();
        inner.record(&self.service, &self.path, RemoteMethod::Subscribe, None)?;
        inner.next_subscription += 1;
        let id = inner.next_subscription;
        inner.subscriptions.push(SubscriptionEntry {
            id,
            service: self.service.clone(),
            path: self.path.clone(),
            signal: signal.to_owned(),
            handler: Rc::new(RefCell::new(handler)),
            active: true,
        });
        Ok(Box::new(MemorySubscription {
            id,
            path: self.path.clone(),
            bus: Rc::downgrade(&self.bus.inner),
            released: false,
        }))
    }
}

// ---------------------------------------------------------------------------
// Subscription handle
// ---------------------------------------------------------------------------

struct MemorySubscription {
    id: u64,
    path: ObjectPath,
    bus: Weak<RefCell<Inner>>,
    released: bool,
}

impl Subscription for MemorySubscription {
    fn release(&mut self) {
        let Some(inner) = self.bus.upgrade() else {
            self.released = true;
            return;
        };
        let mut inner = inner.borrow_mut();
        if self.released {
            inner.redundant_releases += 1;
            return;
        }
        self.released = true;
        inner.subscriptions.retain(|s| s.id != self.id);
        inner.release_log.push(self.path.clone());
    }

    fn is_released(&self) -> bool {
        self.released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const SVC: &str = "com.victronenergy.settings";

    fn sample_bus() -> MemoryBus {
        let bus = MemoryBus::new();
        bus.insert(SVC, "/Settings/System/TimeZone", MemoryObject::new("UTC"));
        bus.insert(SVC, "/Settings/System/Units", MemoryObject::new(0i64));
        bus.insert(SVC, "/Version", MemoryObject::new("1.2"));
        bus
    }

    #[test]
    fn introspection_lists_immediate_children() {
        let bus = sample_bus();
        let root = bus.get_object(SVC, &ObjectPath::root()).expect("root");
        let names = introspect::child_names(&root.introspect().expect("introspect")).expect("doc");
        assert_eq!(names, vec!["Settings", "Version"]);

        let system = bus
            .get_object(SVC, &ObjectPath::from("/Settings/System"))
            .expect("system");
        let names =
            introspect::child_names(&system.introspect().expect("introspect")).expect("doc");
        assert_eq!(names, vec!["TimeZone", "Units"]);
    }

    #[test]
    fn unknown_object_is_rejected() {
        let bus = sample_bus();
        let err = bus
            .get_object(SVC, &ObjectPath::from("/Nope"))
            .err()
            .expect("unknown path");
        assert!(matches!(err, BusError::UnknownObject { .. }), "got: {err}");
        assert!(bus.get_object("com.other", &ObjectPath::root()).is_err());
    }

    #[test]
    fn calls_are_logged_and_failures_injected() {
        let bus = sample_bus();
        let path = ObjectPath::from("/Version");
        let proxy = bus.get_object(SVC, &path).expect("proxy");
        assert_eq!(proxy.get_value().expect("value"), Variant::from("1.2"));
        assert_eq!(bus.call_count("/Version", RemoteMethod::GetValue), 1);

        bus.fail_call(SVC, "/Version", RemoteMethod::GetText, BusError::Disconnected);
        assert_eq!(proxy.get_text().unwrap_err(), BusError::Disconnected);
        assert_eq!(bus.call_count("/Version", RemoteMethod::GetText), 1);
    }

    #[test]
    fn set_value_queues_notification_until_dispatch() {
        let bus = sample_bus();
        let path = ObjectPath::from("/Settings/System/Units");
        let proxy = bus.get_object(SVC, &path).expect("proxy");
        let seen = Rc::new(Cell::new(0));
        let seen_in_handler = seen.clone();
        let _sub = proxy
            .subscribe(
                PROPERTIES_CHANGED,
                Box::new(move |changes: &PropertyChanges| {
                    assert_eq!(changes.get(PROP_VALUE), Some(&Variant::from("1")));
                    seen_in_handler.set(seen_in_handler.get() + 1);
                }),
            )
            .expect("subscribe");

        proxy.set_value(Variant::from("1")).expect("set");
        assert_eq!(seen.get(), 0, "delivery waits for the dispatch loop");
        assert_eq!(bus.dispatch_pending(), 1);
        assert_eq!(seen.get(), 1);
        assert_eq!(bus.object(SVC, path).expect("object").text, "1");
    }

    #[test]
    fn nested_dispatch_leaves_the_queue_to_the_running_one() {
        let bus = sample_bus();
        let path = ObjectPath::from("/Version");
        let proxy = bus.get_object(SVC, &path).expect("proxy");
        let weak = Rc::downgrade(&bus.inner);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _sub = proxy
            .subscribe(
                PROPERTIES_CHANGED,
                Box::new(move |changes: &PropertyChanges| {
                    sink.borrow_mut().push(changes.get(PROP_VALUE).cloned());
                    let inner = weak.upgrade().expect("bus alive");
                    assert_eq!(MemoryBus { inner }.dispatch_pending(), 0);
                }),
            )
            .expect("subscribe");

        bus.update(SVC, "/Version", "1.3");
        bus.update(SVC, "/Version", "1.4");
        assert_eq!(bus.dispatch_pending(), 2);

        assert_eq!(
            *seen.borrow(),
            vec![Some(Variant::from("1.3")), Some(Variant::from("1.4"))]
        );
        assert_eq!(bus.pending_signals(), 0);
    }

    #[test]
    fn released_subscription_gets_nothing_and_release_is_idempotent() {
        let bus = sample_bus();
        let proxy = bus
            .get_object(SVC, &ObjectPath::from("/Version"))
            .expect("proxy");
        let mut sub = proxy
            .subscribe(
                PROPERTIES_CHANGED,
                Box::new(|_: &PropertyChanges| panic!("must not deliver")),
            )
            .expect("subscribe");
        sub.release();
        sub.release();
        assert!(sub.is_released());
        assert_eq!(bus.release_log(), vec![ObjectPath::from("/Version")]);
        assert_eq!(bus.redundant_releases(), 1);

        bus.update(SVC, "/Version", "2.0");
        assert_eq!(bus.dispatch_pending(), 0);
    }

    #[test]
    fn add_setting_creates_missing_object_only() {
        let bus = sample_bus();
        let root = bus.get_object(SVC, &ObjectPath::root()).expect("root");
        let spec = SettingSpec {
            group: "Settings/System".into(),
            name: "TimeZone".into(),
            default_value: Variant::from("CET"),
            item_type: "s".into(),
            minimum: Variant::Int(0),
            maximum: Variant::Int(0),
        };
        root.add_setting(&spec).expect("existing");
        let tz = bus.object(SVC, "/Settings/System/TimeZone").expect("tz");
        assert_eq!(tz.value, Variant::from("UTC"));

        let spec = SettingSpec {
            name: "Language".into(),
            default_value: Variant::from("en"),
            ..spec
        };
        root.add_setting(&spec).expect("new");
        let lang = bus.object(SVC, "/Settings/System/Language").expect("lang");
        assert_eq!(lang.value, Variant::from("en"));
    }

    #[test]
    fn fixture_yaml_populates_objects() {
        let fixture = Fixture::from_yaml(
            r#"
services:
  com.victronenergy.settings:
    /Settings/Relay/Function:
      value: 1
      text: Alarm relay
    /Settings/Relay/Polarity:
      value: []
"#,
        )
        .expect("fixture");
        let bus = MemoryBus::from_fixture(&fixture).expect("bus");
        let relay = bus.object(SVC, "/Settings/Relay/Function").expect("relay");
        assert_eq!(relay.value, Variant::Int(1));
        assert_eq!(relay.text, "Alarm relay");
        assert_eq!(relay.valid, Variant::Bool(true));
        let polarity = bus.object(SVC, "/Settings/Relay/Polarity").expect("polarity");
        assert_eq!(polarity.valid, Variant::Bool(false));
    }

    #[test]
    fn fixture_rejects_relative_paths() {
        let fixture = Fixture::from_yaml("services:\n  svc:\n    Relative: {value: 1}\n")
            .expect("fixture");
        let err = MemoryBus::from_fixture(&fixture).err().expect("relative path");
        assert!(matches!(err, FixtureError::RelativePath(_)), "got: {err}");
    }
}
