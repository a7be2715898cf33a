//! Tree builder: recursive construction by introspection.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use tracing::Span;

use busmirror_core::types::PROPERTIES_CHANGED;
use busmirror_core::{introspect, Bus, IntrospectionError, ObjectPath, ObjectProxy};

use crate::dispatch;
use crate::error::TreeError;
use crate::node::{Node, NodeState};

impl Node {
    /// Build the mirror of `path` on `service` and everything below it.
    ///
    /// Each object is introspected, its children are built depth first, and
    /// only then is its own change subscription registered. Log events are
    /// emitted under a `mirror_node` span parented to `span`; pass
    /// [`Span::none()`] to build silently.
    ///
    /// On error nothing is returned: subtrees built before the failure are
    /// torn down, releasing their subscriptions.
    pub fn build<B>(
        bus: &B,
        service: &str,
        path: &ObjectPath,
        span: &Span,
    ) -> Result<Node, TreeError>
    where
        B: Bus,
        B::Proxy: 'static,
    {
        let span = tracing::debug_span!(parent: span, "mirror_node", path = %path);
        tracing::debug!(parent: &span, service, "building node");

        let proxy = bus
            .get_object(service, path)
            .map_err(|source| TreeError::Object {
                path: path.clone(),
                source,
            })?;

        let document = proxy
            .introspect()
            .map_err(|source| TreeError::Introspection {
                path: path.clone(),
                source: IntrospectionError::Call(source),
            })?;
        let names =
            introspect::child_names(&document).map_err(|source| TreeError::Introspection {
                path: path.clone(),
                source,
            })?;

        let mut children = BTreeMap::new();
        for name in names {
            let child_path = path.join(&name);
            match Node::build(bus, service, &child_path, &span) {
                Ok(child) => {
                    children.insert(name, child);
                }
                Err(err) => {
                    tracing::warn!(
                        parent: &span,
                        child = %child_path,
                        discarded = children.len(),
                        error = %err,
                        "discarding partially built subtree",
                    );
                    return Err(err);
                }
            }
        }

        let state = Rc::new(RefCell::new(NodeState::default()));
        let handler = dispatch::handler(path.clone(), Rc::downgrade(&state), span.clone());
        let subscription = proxy
            .subscribe(PROPERTIES_CHANGED, handler)
            .map_err(|source| TreeError::Subscribe {
                path: path.clone(),
                source,
            })?;

        tracing::debug!(parent: &span, children = children.len(), "node built");
        Ok(Node {
            path: proxy.object_path().clone(),
            proxy: Box::new(proxy),
            children,
            state,
            subscription: Some(subscription),
            span,
        })
    }
}
