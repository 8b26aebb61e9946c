use super::zobrist::ZOBRIST;
use super::{
    Color, Piece, Square, CASTLE_ALL, CASTLE_BLACK_K, CASTLE_BLACK_Q, CASTLE_WHITE_K,
    CASTLE_WHITE_Q,
};

/// Complete, copyable game state of a single position.
///
/// `Board` carries no game history; see [`Position`](super::Position) for
/// the repetition-aware wrapper used by the protocol layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Board {
    pub(crate) squares: [Option<(Color, Piece)>; 64],
    pub(crate) side_to_move: Color,
    pub(crate) castling_rights: u8,
    pub(crate) en_passant: Option<Square>,
    pub(crate) halfmove_clock: u32,
    pub(crate) fullmove_number: u32,
    pub(crate) hash: u64,
}

impl Board {
    /// The standard starting position.
    #[must_use]
    pub fn new() -> Self {
        let mut board = Board::empty();
        let back_rank = [
            Piece::Rook,
            Piece::Knight,
            Piece::Bishop,
            Piece::Queen,
            Piece::King,
            Piece::Bishop,
            Piece::Knight,
            Piece::Rook,
        ];
        for (file, piece) in back_rank.iter().enumerate() {
            let file = file as u8;
            board.set_piece(Square::new(0, file), Color::White, *piece);
            board.set_piece(Square::new(1, file), Color::White, Piece::Pawn);
            board.set_piece(Square::new(6, file), Color::Black, Piece::Pawn);
            board.set_piece(Square::new(7, file), Color::Black, *piece);
        }
        board.castling_rights = CASTLE_ALL;
        board.hash = board.compute_hash();
        board
    }

    pub(crate) fn empty() -> Self {
        Board {
            squares: [None; 64],
            side_to_move: Color::White,
            castling_rights: 0,
            en_passant: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
        }
    }

    #[inline]
    pub(crate) fn set_piece(&mut self, sq: Square, color: Color, piece: Piece) {
        self.squares[sq.index()] = Some((color, piece));
    }

    #[inline]
    #[must_use]
    pub fn piece_at(&self, sq: Square) -> Option<(Color, Piece)> {
        self.squares[sq.index()]
    }

    #[inline]
    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    #[must_use]
    pub fn castling_rights(&self) -> u8 {
        self.castling_rights
    }

    #[must_use]
    pub fn en_passant(&self) -> Option<Square> {
        self.en_passant
    }

    #[must_use]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[must_use]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    #[inline]
    #[must_use]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    #[must_use]
    pub fn king_square(&self, color: Color) -> Option<Square> {
        Square::all().find(|&sq| self.piece_at(sq) == Some((color, Piece::King)))
    }

    /// Hash recomputed from scratch.
    #[must_use]
    pub fn compute_hash(&self) -> u64 {
        let mut hash = 0;
        for sq in Square::all() {
            if let Some((color, piece)) = self.piece_at(sq) {
                hash ^= ZOBRIST.piece(color, piece, sq);
            }
        }
        if self.side_to_move == Color::Black {
            hash ^= ZOBRIST.black_to_move();
        }
        hash ^= ZOBRIST.castling(self.castling_rights);
        if let Some(ep) = self.en_passant {
            hash ^= ZOBRIST.en_passant(ep);
        }
        hash
    }

    /// Neither side can possibly deliver mate: bare kings, or a single minor piece.
    #[must_use]
    pub fn is_insufficient_material(&self) -> bool {
        let mut minors = 0;
        for (_, piece) in self.squares.iter().flatten() {
            match piece {
                Piece::King => {}
                Piece::Knight | Piece::Bishop => minors += 1,
                _ => return false,
            }
        }
        minors <= 1
    }

    /// Castling rights lost when a piece moves from or to `sq`.
    pub(crate) fn castling_mask(sq: Square) -> u8 {
        match (sq.rank(), sq.file()) {
            (0, 4) => CASTLE_WHITE_K | CASTLE_WHITE_Q,
            (0, 7) => CASTLE_WHITE_K,
            (0, 0) => CASTLE_WHITE_Q,
            (7, 4) => CASTLE_BLACK_K | CASTLE_BLACK_Q,
            (7, 7) => CASTLE_BLACK_K,
            (7, 0) => CASTLE_BLACK_Q,
            _ => 0,
        }
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}
