//! Trait seams between the runtime and its external collaborators.

pub mod store;

pub use store::DataStore;
