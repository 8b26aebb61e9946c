//! Engine controller for running searches off the protocol thread.
//!
//! The [`Engine`] owns the search thread and the per-search stop flag. It
//! never touches protocol state: results leave the search thread only
//! through the callback registered at construction.

mod controller;

pub use controller::{Engine, EngineError, ResultCallback};
