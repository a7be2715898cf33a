//! Mirror nodes: lazy property caches, child navigation, traversal and
//! teardown.
//!
//! A [`Node`] shares its cache state with the change handler registered on
//! the bus through an `Rc<RefCell<_>>`. The handler holds only a weak
//! reference, so once the node is gone a late notification is a no-op.
//! All of this assumes the single-threaded dispatch model described in
//! [`busmirror_core::bus`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use tracing::Span;

use busmirror_core::types::{BUS_ITEM_INTERFACE, PROP_VALID};
use busmirror_core::{ObjectPath, ObjectProxy, SettingSpec, Subscription, Variant};

use crate::error::TreeError;

/// What a change callback receives after a notification was applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub path: ObjectPath,
    /// Cached value after the notification; `None` if never fetched or sent.
    pub value: Option<Variant>,
    /// Cached text after the notification; `None` if never fetched or sent.
    pub text: Option<String>,
}

/// Application callback invoked once per applied notification.
pub type ChangeCallback = Rc<dyn Fn(&ChangeEvent)>;

/// Snapshot of a node's cache slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CachedProperties {
    pub value: Option<Variant>,
    pub text: Option<String>,
    pub valid: Option<Variant>,
}

#[derive(Default)]
pub(crate) struct NodeState {
    pub(crate) cache: CachedProperties,
    pub(crate) callback: Option<ChangeCallback>,
}

/// One mirrored remote object and its subtree.
pub struct Node {
    pub(crate) path: ObjectPath,
    pub(crate) proxy: Box<dyn ObjectProxy>,
    pub(crate) children: BTreeMap<String, Node>,
    pub(crate) state: Rc<RefCell<NodeState>>,
    pub(crate) subscription: Option<Box<dyn Subscription>>,
    pub(crate) span: Span,
}

impl Node {
    pub fn path(&self) -> &ObjectPath {
        &self.path
    }

    /// `true` until the node's subscription has been released.
    pub fn is_live(&self) -> bool {
        self.subscription.is_some()
    }

    // -----------------------------------------------------------------------
    // Lazy cached accessors
    // -----------------------------------------------------------------------

    /// Cached value, fetched with `GetValue` on first use.
    pub fn value(&self) -> Result<Variant, TreeError> {
        let cached = self.state.borrow().cache.value.clone();
        if let Some(value) = cached {
            return Ok(value);
        }
        let value = self.proxy.get_value()?;
        tracing::trace!(parent: &self.span, %value, "fetched value");
        self.state.borrow_mut().cache.value = Some(value.clone());
        Ok(value)
    }

    /// Cached text, fetched with `GetText` on first use.
    pub fn text(&self) -> Result<String, TreeError> {
        let cached = self.state.borrow().cache.text.clone();
        if let Some(text) = cached {
            return Ok(text);
        }
        let text = self.proxy.get_text()?;
        tracing::trace!(parent: &self.span, text = %text, "fetched text");
        self.state.borrow_mut().cache.text = Some(text.clone());
        Ok(text)
    }

    /// Cached validity as sent by the remote side.
    pub fn valid_variant(&self) -> Result<Variant, TreeError> {
        let cached = self.state.borrow().cache.valid.clone();
        if let Some(valid) = cached {
            return Ok(valid);
        }
        let valid = self.proxy.get_property(BUS_ITEM_INTERFACE, PROP_VALID)?;
        tracing::trace!(parent: &self.span, %valid, "fetched validity");
        self.state.borrow_mut().cache.valid = Some(valid.clone());
        Ok(valid)
    }

    pub fn valid(&self) -> Result<bool, TreeError> {
        Ok(self.valid_variant()?.is_truthy())
    }

    /// Write a value to the remote object.
    ///
    /// The value always travels as a string in the remote service's own
    /// spelling (see [`Variant::to_wire_string`]): `42` is sent as `"42"`,
    /// `1.0` as `"1.0"`, `true` as `"True"` and `[1, 2]` as `"[1, 2]"`. The
    /// cache is left alone; it follows when the service echoes the change as
    /// a notification.
    pub fn set_value(&self, value: impl Into<Variant>) -> Result<(), TreeError> {
        let wire = Variant::Str(value.into().to_wire_string());
        tracing::debug!(parent: &self.span, value = %wire, "SetValue");
        self.proxy.set_value(wire)?;
        Ok(())
    }

    /// Pass an `AddSetting` call through to the remote object. Nothing is cached.
    pub fn add_setting(&self, setting: &SettingSpec) -> Result<(), TreeError> {
        tracing::info!(parent: &self.span, setting = %setting, "AddSetting");
        self.proxy.add_setting(setting)?;
        Ok(())
    }

    /// Current cache slots, without any remote call.
    pub fn cached(&self) -> CachedProperties {
        self.state.borrow().cache.clone()
    }

    /// Forget all cached slots; the next read of each fetches again.
    pub fn reset_cache(&self) {
        self.state.borrow_mut().cache = CachedProperties::default();
    }

    // -----------------------------------------------------------------------
    // Callback
    // -----------------------------------------------------------------------

    /// Replace the change callback of this node.
    pub fn set_callback<F>(&self, callback: F)
    where
        F: Fn(&ChangeEvent) + 'static,
    {
        self.state.borrow_mut().callback = Some(Rc::new(callback));
    }

    pub fn clear_callback(&self) {
        self.state.borrow_mut().callback = None;
    }

    pub fn has_callback(&self) -> bool {
        self.state.borrow().callback.is_some()
    }

    // -----------------------------------------------------------------------
    // Child navigation
    // -----------------------------------------------------------------------

    /// Immediate child `name`. No remote call is made.
    pub fn child(&self, name: &str) -> Result<&Node, TreeError> {
        self.children.get(name).ok_or_else(|| self.not_found(name))
    }

    pub fn child_mut(&mut self, name: &str) -> Result<&mut Node, TreeError> {
        let path = &self.path;
        self.children
            .get_mut(name)
            .ok_or_else(|| TreeError::NotFound {
                path: path.clone(),
                name: name.to_owned(),
            })
    }

    /// Node at `relative`, e.g. `System/TimeZone`, resolved one child at a time.
    pub fn descendant(&self, relative: &str) -> Result<&Node, TreeError> {
        relative
            .split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self, |node, segment| node.child(segment))
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn child_names(&self) -> Vec<&str> {
        self.children.keys().map(String::as_str).collect()
    }

    fn not_found(&self, name: &str) -> TreeError {
        TreeError::NotFound {
            path: self.path.clone(),
            name: name.to_owned(),
        }
    }

    // -----------------------------------------------------------------------
    // Traversal
    // -----------------------------------------------------------------------

    /// Visit this node, then every descendant, depth first.
    pub fn foreach<F>(&self, mut visit: F)
    where
        F: FnMut(&Node),
    {
        self.walk(&mut visit);
    }

    fn walk(&self, visit: &mut dyn FnMut(&Node)) {
        visit(self);
        for child in self.children.values() {
            child.walk(visit);
        }
    }

    /// Like [`Node::foreach`], stopping at the first error.
    pub fn try_foreach<F, E>(&self, mut visit: F) -> Result<(), E>
    where
        F: FnMut(&Node) -> Result<(), E>,
    {
        self.try_walk(&mut visit)
    }

    fn try_walk<E>(&self, visit: &mut dyn FnMut(&Node) -> Result<(), E>) -> Result<(), E> {
        visit(self)?;
        for child in self.children.values() {
            child.try_walk(visit)?;
        }
        Ok(())
    }

    /// Write `path = text` for this node and every descendant.
    pub fn trace<W: Write>(&self, out: &mut W) -> Result<(), TreeError> {
        self.try_foreach(|node| {
            let text = node.text()?;
            writeln!(out, "{} = {}", node.path, text)?;
            Ok(())
        })
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.foreach(|_| count += 1);
        count
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    // -----------------------------------------------------------------------
    // Teardown
    // -----------------------------------------------------------------------

    /// Release this node's subscription. Returns `false` if it was already
    /// released; repeated calls never reach the bus again.
    pub fn release(&mut self) -> bool {
        match self.subscription.take() {
            Some(mut subscription) => {
                subscription.release();
                tracing::debug!(parent: &self.span, "released change subscription");
                true
            }
            None => false,
        }
    }

    /// Tear down every child, then release this node, then drop the
    /// children and the callback. Safe to call more than once.
    pub fn teardown(&mut self) {
        if !self.is_live() && self.children.is_empty() {
            return;
        }
        tracing::debug!(parent: &self.span, children = self.children.len(), "teardown");
        for child in self.children.values_mut() {
            child.teardown();
        }
        self.release();
        self.children.clear();
        self.state.borrow_mut().callback = None;
    }
}

impl Drop for Node {
    fn drop(&mut self) {
        self.teardown();
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("path", &self.path)
            .field("live", &self.is_live())
            .field("children", &self.child_names())
            .finish()
    }
}
