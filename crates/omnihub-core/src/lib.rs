//! # omnihub-core
//!
//! Core crate for the Omnihub plugin runtime. Contains traits, configuration
//! schemas, state/object types, namespace helpers, the namespaced plugin
//! logger, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Omnihub crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
