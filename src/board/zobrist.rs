//! Zobrist keys for position hashing.

use once_cell::sync::Lazy;
use rand::prelude::*;

use super::{Color, Piece, Square};

pub(crate) struct ZobristKeys {
    // pieces[color][piece][square]
    pieces: [[[u64; 64]; 6]; 2],
    black_to_move: u64,
    // one key per castling-rights bitmask
    castling: [u64; 16],
    en_passant_file: [u64; 8],
}

impl ZobristKeys {
    fn new() -> Self {
        let mut rng = StdRng::seed_from_u64(1234567890_u64);
        let mut pieces = [[[0; 64]; 6]; 2];
        for color in &mut pieces {
            for piece in color.iter_mut() {
                for key in piece.iter_mut() {
                    *key = rng.gen();
                }
            }
        }

        let black_to_move = rng.gen();

        let mut castling = [0; 16];
        for key in &mut castling {
            *key = rng.gen();
        }

        let mut en_passant_file = [0; 8];
        for key in &mut en_passant_file {
            *key = rng.gen();
        }

        ZobristKeys {
            pieces,
            black_to_move,
            castling,
            en_passant_file,
        }
    }

    #[inline]
    pub(crate) fn piece(&self, color: Color, piece: Piece, sq: Square) -> u64 {
        self.pieces[color.index()][piece.index()][sq.index()]
    }

    #[inline]
    pub(crate) fn black_to_move(&self) -> u64 {
        self.black_to_move
    }

    #[inline]
    pub(crate) fn castling(&self, rights: u8) -> u64 {
        self.castling[usize::from(rights & 0x0f)]
    }

    #[inline]
    pub(crate) fn en_passant(&self, sq: Square) -> u64 {
        self.en_passant_file[usize::from(sq.file())]
    }
}

pub(crate) static ZOBRIST: Lazy<ZobristKeys> = Lazy::new(ZobristKeys::new);
