//! Chess board representation and game logic.
//!
//! A compact mailbox board with full legal move generation (castling,
//! en passant, promotions), FEN and UCI move codecs, and Zobrist hashing.
//!
//! # Example
//! ```
//! use toy_chess::board::Position;
//!
//! let mut position = Position::startpos();
//! position.play_uci("e2e4").unwrap();
//! assert_eq!(position.legal_moves().len(), 20);
//! ```

mod error;
mod fen;
mod movegen;
mod position;
mod state;
mod types;
mod zobrist;


pub use error::{FenError, MoveParseError};
pub use fen::START_FEN;
pub use position::Position;
pub use state::Board;
pub use types::{Color, Move, Piece, Square};

pub(crate) use types::{CASTLE_ALL, CASTLE_BLACK_K, CASTLE_BLACK_Q, CASTLE_WHITE_K, CASTLE_WHITE_Q};
