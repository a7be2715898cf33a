//! Error types for busmirror-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::ObjectPath;

/// Failures reported by a bus collaborator for a single remote call.
///
/// These are returned verbatim by the mirror; nothing retries them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BusError {
    /// No object is exported at `path` by `service`.
    #[error("no object {path} on service {service}")]
    UnknownObject { service: String, path: ObjectPath },

    /// The remote side replied with an error.
    #[error("{method} on {path} failed: {message}")]
    CallFailed {
        path: ObjectPath,
        method: String,
        message: String,
    },

    /// The transport gave up waiting for a reply.
    #[error("{method} on {path} timed out")]
    Timeout { path: ObjectPath, method: String },

    /// The connection to the bus is gone.
    #[error("bus connection closed")]
    Disconnected,
}

/// Failures while introspecting an object for its children.
#[derive(Debug, Error)]
pub enum IntrospectionError {
    /// The introspection call itself failed.
    #[error("introspection call failed: {0}")]
    Call(#[from] BusError),

    /// The reply was not a well-formed node document.
    #[error("malformed introspection document: {reason}")]
    Malformed { reason: String },
}

impl IntrospectionError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        IntrospectionError::Malformed {
            reason: reason.into(),
        }
    }
}

/// All errors that can arise while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, including file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`: cannot locate `~/.busmirror/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// Errors while loading a memory bus fixture.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse fixture: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// Object paths in a fixture must be absolute.
    #[error("fixture path '{0}' does not start with '/'")]
    RelativePath(String),
}
