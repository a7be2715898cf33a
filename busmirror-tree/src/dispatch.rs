//! Change dispatcher: the per-node `PropertiesChanged` handler.

use std::cell::RefCell;
use std::rc::Weak;

use tracing::Span;

use busmirror_core::types::{PROP_TEXT, PROP_VALID, PROP_VALUE};
use busmirror_core::{ObjectPath, PropertyChanges, SignalHandler, Variant};

use crate::node::{ChangeEvent, NodeState};

/// Handler registered on the bus for the node at `path`.
///
/// Holds the node state weakly; a notification delivered after the node was
/// dropped is ignored.
pub(crate) fn handler(
    path: ObjectPath,
    state: Weak<RefCell<NodeState>>,
    span: Span,
) -> SignalHandler {
    Box::new(move |changes: &PropertyChanges| {
        let Some(state) = state.upgrade() else {
            tracing::trace!(parent: &span, "notification for dropped node ignored");
            return;
        };
        apply(&path, &state, changes, &span);
    })
}

/// Overwrite the cache slots named in `changes`, then run the callback once.
///
/// The callback is invoked after the state borrow is released so it may read
/// the node again. No remote call is made here.
pub(crate) fn apply(
    path: &ObjectPath,
    state: &RefCell<NodeState>,
    changes: &PropertyChanges,
    span: &Span,
) {
    let (callback, event) = {
        let mut state = state.borrow_mut();
        for (name, value) in changes {
            match name.as_str() {
                PROP_VALUE => state.cache.value = Some(value.clone()),
                PROP_TEXT => state.cache.text = Some(text_of(value)),
                PROP_VALID => state.cache.valid = Some(value.clone()),
                other => {
                    tracing::trace!(parent: span, property = other, "ignoring unknown property");
                }
            }
        }
        let event = ChangeEvent {
            path: path.clone(),
            value: state.cache.value.clone(),
            text: state.cache.text.clone(),
        };
        (state.callback.clone(), event)
    };

    tracing::trace!(
        parent: span,
        properties = changes.len(),
        callback = callback.is_some(),
        "applied notification",
    );
    if let Some(callback) = callback {
        callback(&event);
    }
}

fn text_of(value: &Variant) -> String {
    match value {
        Variant::Str(text) => text.clone(),
        other => other.to_string(),
    }
}
