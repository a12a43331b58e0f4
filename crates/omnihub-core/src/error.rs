//! The single error type every Omnihub crate funnels into.
//!
//! `AppError` pairs a coarse [`ErrorKind`] with a message and an optional
//! boxed cause, so callers can branch on the category while logs keep the
//! full chain. Lower-level errors convert in via `From` or `.map_err()`.

use std::fmt;

use thiserror::Error;

/// Coarse categorization of runtime failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// A named resource (plugin package, state, object) does not exist.
    NotFound,
    /// Caller-supplied input failed validation.
    Validation,
    /// A plugin misbehaved: failed construction, init, or destroy.
    Plugin,
    /// The persistent store reported a failure.
    Store,
    /// Host configuration could not be loaded or is invalid.
    Configuration,
    /// JSON encoding or decoding failed.
    Serialization,
    /// A bug in the runtime itself.
    Internal,
    /// A required collaborator is not available yet, e.g. the store
    /// handle was never injected.
    ServiceUnavailable,
}

impl ErrorKind {
    /// Stable wire/log name for this kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Validation => "VALIDATION",
            Self::Plugin => "PLUGIN",
            Self::Store => "STORE",
            Self::Configuration => "CONFIGURATION",
            Self::Serialization => "SERIALIZATION",
            Self::Internal => "INTERNAL",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The unified runtime error.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Generates a constructor helper per kind.
macro_rules! kind_ctor {
    ($(#[$doc:meta] $name:ident => $kind:ident),+ $(,)?) => {
        $(
            #[$doc]
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(ErrorKind::$kind, message)
            }
        )+
    };
}

impl AppError {
    /// Create an error with no underlying cause.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            source: Some(Box::new(source)),
            ..Self::new(kind, message)
        }
    }

    kind_ctor! {
        /// A resource lookup came up empty.
        not_found => NotFound,
        /// Caller-supplied input was rejected.
        validation => Validation,
        /// A plugin-originated failure.
        plugin => Plugin,
        /// A persistent-store failure.
        store => Store,
        /// A host-configuration failure.
        configuration => Configuration,
        /// A runtime bug.
        internal => Internal,
        /// A collaborator is not available yet.
        service_unavailable => ServiceUnavailable,
    }

    /// Whether this failure may clear on its own (missing collaborator).
    pub fn is_unavailable(&self) -> bool {
        self.kind == ErrorKind::ServiceUnavailable
    }
}

// The boxed source is not Clone; a clone keeps the kind and message only.
impl Clone for AppError {
    fn clone(&self) -> Self {
        Self::new(self.kind, self.message.clone())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorKind::Serialization, format!("JSON error: {err}"), err)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Store, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}
