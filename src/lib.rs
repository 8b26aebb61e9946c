//! A small chess engine speaking UCI.
//!
//! The [`uci::Session`] reads commands on a listener thread, runs searches
//! on an engine thread and serializes every reaction on the thread that
//! drives it.

pub mod board;
pub mod config;
pub mod engine;
pub mod search;
pub mod sync;
pub mod uci;

pub use board::{Color, Move, Piece, Position, Square};
pub use config::EngineConfig;
pub use engine::Engine;
pub use search::{SearchLimits, SearchResult};
pub use uci::Session;
