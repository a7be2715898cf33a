//! Error types for busmirror-tree.

use thiserror::Error;

use busmirror_core::{BusError, IntrospectionError, ObjectPath};

/// All errors that can arise from building or using a mirror tree.
#[derive(Debug, Error)]
pub enum TreeError {
    /// The bus refused to hand out a proxy for the object.
    #[error("cannot obtain object {path}: {source}")]
    Object {
        path: ObjectPath,
        #[source]
        source: BusError,
    },

    /// Introspection failed or returned a malformed document. The subtree
    /// rooted at `path` was not built.
    #[error("introspection of {path} failed: {source}")]
    Introspection {
        path: ObjectPath,
        #[source]
        source: IntrospectionError,
    },

    /// Registering the change subscription failed.
    #[error("cannot subscribe to changes of {path}: {source}")]
    Subscribe {
        path: ObjectPath,
        #[source]
        source: BusError,
    },

    /// No child of that name was found at construction time.
    #[error("no child named '{name}' under {path}")]
    NotFound { path: ObjectPath, name: String },

    /// A remote read or write failed; the bus error is passed through as is.
    #[error(transparent)]
    Remote(#[from] BusError),

    /// Writing a trace dump failed.
    #[error("failed to write trace output: {0}")]
    Io(#[from] std::io::Error),
}
