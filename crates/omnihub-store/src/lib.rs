//! # omnihub-store
//!
//! In-memory [`DataStore`] backend. Hosts use it as the default store for
//! single-process deployments; the test suites use it as the store double.
//!
//! [`DataStore`]: omnihub_core::traits::DataStore

pub mod memory;

pub use memory::MemoryStore;
