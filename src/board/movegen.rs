//! Legal move generation and move application.

use super::{
    Board, Color, Move, Piece, Square, CASTLE_BLACK_K, CASTLE_BLACK_Q, CASTLE_WHITE_K,
    CASTLE_WHITE_Q,
};

const KNIGHT_DELTAS: [(i8, i8); 8] = [
    (1, 2),
    (2, 1),
    (2, -1),
    (1, -2),
    (-1, -2),
    (-2, -1),
    (-2, 1),
    (-1, 2),
];

const KING_DELTAS: [(i8, i8); 8] = [
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, -1),
];

const ROOK_DIRS: [(i8, i8); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];
const BISHOP_DIRS: [(i8, i8); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];

impl Board {
    /// Whether any piece of color `by` attacks `sq`.
    #[must_use]
    pub fn is_square_attacked(&self, sq: Square, by: Color) -> bool {
        let holds = |target: Option<Square>, piece: Piece| {
            target.map_or(false, |t| self.piece_at(t) == Some((by, piece)))
        };

        // A pawn of `by` attacks from one rank behind, in its own direction.
        let behind = -by.forward();
        if holds(sq.offset(behind, -1), Piece::Pawn) || holds(sq.offset(behind, 1), Piece::Pawn)
        {
            return true;
        }
        if KNIGHT_DELTAS
            .iter()
            .any(|&(dr, df)| holds(sq.offset(dr, df), Piece::Knight))
        {
            return true;
        }
        if KING_DELTAS
            .iter()
            .any(|&(dr, df)| holds(sq.offset(dr, df), Piece::King))
        {
            return true;
        }
        self.slider_attacks(sq, by, &ROOK_DIRS, Piece::Rook)
            || self.slider_attacks(sq, by, &BISHOP_DIRS, Piece::Bishop)
    }

    fn slider_attacks(&self, sq: Square, by: Color, dirs: &[(i8, i8)], slider: Piece) -> bool {
        for &(dr, df) in dirs {
            let mut cursor = sq.offset(dr, df);
            while let Some(target) = cursor {
                if let Some((color, piece)) = self.piece_at(target) {
                    if color == by && (piece == slider || piece == Piece::Queen) {
                        return true;
                    }
                    break;
                }
                cursor = target.offset(dr, df);
            }
        }
        false
    }

    /// Whether `color`'s king is attacked.
    #[must_use]
    pub fn is_in_check(&self, color: Color) -> bool {
        self.king_square(color)
            .map_or(false, |king| self.is_square_attacked(king, color.opponent()))
    }

    /// Whether the side to move is in check.
    #[must_use]
    pub fn in_check(&self) -> bool {
        self.is_in_check(self.side_to_move)
    }

    /// All legal moves for the side to move.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<Move> {
        let us = self.side_to_move;
        let mut moves = Vec::with_capacity(64);
        self.pseudo_legal_moves(&mut moves);
        moves.retain(|&mv| {
            let mut child = *self;
            child.make_move(mv);
            !child.is_in_check(us)
        });
        moves
    }

    /// Moves that obey piece movement rules but may leave the king in check.
    pub(crate) fn pseudo_legal_moves(&self, moves: &mut Vec<Move>) {
        let us = self.side_to_move;
        for from in Square::all() {
            match self.piece_at(from) {
                Some((color, piece)) if color == us => match piece {
                    Piece::Pawn => self.pawn_moves(from, moves),
                    Piece::Knight => self.step_moves(from, &KNIGHT_DELTAS, moves),
                    Piece::Bishop => self.slide_moves(from, &BISHOP_DIRS, moves),
                    Piece::Rook => self.slide_moves(from, &ROOK_DIRS, moves),
                    Piece::Queen => {
                        self.slide_moves(from, &ROOK_DIRS, moves);
                        self.slide_moves(from, &BISHOP_DIRS, moves);
                    }
                    Piece::King => {
                        self.step_moves(from, &KING_DELTAS, moves);
                        self.castling_moves(from, moves);
                    }
                },
                _ => {}
            }
        }
    }

    fn pawn_moves(&self, from: Square, moves: &mut Vec<Move>) {
        let us = self.side_to_move;
        let forward = us.forward();
        let start_rank = match us {
            Color::White => 1,
            Color::Black => 6,
        };

        if let Some(one) = from.offset(forward, 0) {
            if self.piece_at(one).is_none() {
                push_pawn_move(from, one, moves);
                if from.rank() == start_rank {
                    if let Some(two) = from.offset(2 * forward, 0) {
                        if self.piece_at(two).is_none() {
                            moves.push(Move::new(from, two));
                        }
                    }
                }
            }
        }

        for side in [-1, 1] {
            let Some(target) = from.offset(forward, side) else {
                continue;
            };
            match self.piece_at(target) {
                Some((color, _)) if color != us => push_pawn_move(from, target, moves),
                None if self.en_passant == Some(target) => moves.push(Move::new(from, target)),
                _ => {}
            }
        }
    }

    fn step_moves(&self, from: Square, deltas: &[(i8, i8)], moves: &mut Vec<Move>) {
        for &(dr, df) in deltas {
            if let Some(to) = from.offset(dr, df) {
                match self.piece_at(to) {
                    Some((color, _)) if color == self.side_to_move => {}
                    _ => moves.push(Move::new(from, to)),
                }
            }
        }
    }

    fn slide_moves(&self, from: Square, dirs: &[(i8, i8)], moves: &mut Vec<Move>) {
        for &(dr, df) in dirs {
            let mut cursor = from.offset(dr, df);
            while let Some(to) = cursor {
                match self.piece_at(to) {
                    None => moves.push(Move::new(from, to)),
                    Some((color, _)) => {
                        if color != self.side_to_move {
                            moves.push(Move::new(from, to));
                        }
                        break;
                    }
                }
                cursor = to.offset(dr, df);
            }
        }
    }

    fn castling_moves(&self, from: Square, moves: &mut Vec<Move>) {
        let us = self.side_to_move;
        let (rank, king_side, queen_side) = match us {
            Color::White => (0, CASTLE_WHITE_K, CASTLE_WHITE_Q),
            Color::Black => (7, CASTLE_BLACK_K, CASTLE_BLACK_Q),
        };
        if from != Square::new(rank, 4) || self.is_square_attacked(from, us.opponent()) {
            return;
        }
        let empty = |files: &[u8]| {
            files
                .iter()
                .all(|&file| self.piece_at(Square::new(rank, file)).is_none())
        };
        let safe = |files: &[u8]| {
            files
                .iter()
                .all(|&file| !self.is_square_attacked(Square::new(rank, file), us.opponent()))
        };
        let rook_at = |file| self.piece_at(Square::new(rank, file)) == Some((us, Piece::Rook));

        if self.castling_rights & king_side != 0 && rook_at(7) && empty(&[5, 6]) && safe(&[5, 6])
        {
            moves.push(Move::new(from, Square::new(rank, 6)));
        }
        if self.castling_rights & queen_side != 0
            && rook_at(0)
            && empty(&[1, 2, 3])
            && safe(&[2, 3])
        {
            moves.push(Move::new(from, Square::new(rank, 2)));
        }
    }

    /// Piece captured by `mv`, including en passant.
    #[must_use]
    pub fn captured_piece(&self, mv: Move) -> Option<Piece> {
        match self.piece_at(mv.to) {
            Some((_, piece)) => Some(piece),
            None if self.is_en_passant(mv) => Some(Piece::Pawn),
            None => None,
        }
    }

    #[must_use]
    pub fn is_capture(&self, mv: Move) -> bool {
        self.captured_piece(mv).is_some()
    }

    fn is_en_passant(&self, mv: Move) -> bool {
        self.en_passant == Some(mv.to)
            && mv.from.file() != mv.to.file()
            && matches!(self.piece_at(mv.from), Some((_, Piece::Pawn)))
    }

    /// Apply a move generated for this position. Moves from an empty square are ignored.
    pub fn make_move(&mut self, mv: Move) {
        let Some((color, piece)) = self.piece_at(mv.from) else {
            return;
        };
        let en_passant_capture = self.is_en_passant(mv);
        let captured = self.piece_at(mv.to);

        if piece == Piece::Pawn || captured.is_some() || en_passant_capture {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock += 1;
        }

        if en_passant_capture {
            self.squares[Square::new(mv.from.rank(), mv.to.file()).index()] = None;
        }

        let placed = match (piece, mv.promotion) {
            (Piece::Pawn, Some(promotion)) => promotion,
            _ => piece,
        };
        self.squares[mv.from.index()] = None;
        self.set_piece(mv.to, color, placed);

        if piece == Piece::King && mv.from.file().abs_diff(mv.to.file()) == 2 {
            let rank = mv.from.rank();
            let (rook_from, rook_to) = if mv.to.file() == 6 { (7, 5) } else { (0, 3) };
            self.squares[Square::new(rank, rook_from).index()] = None;
            self.set_piece(Square::new(rank, rook_to), color, Piece::Rook);
        }

        self.en_passant = if piece == Piece::Pawn && mv.from.rank().abs_diff(mv.to.rank()) == 2 {
            Some(Square::new((mv.from.rank() + mv.to.rank()) / 2, mv.from.file()))
        } else {
            None
        };

        self.castling_rights &= !(Board::castling_mask(mv.from) | Board::castling_mask(mv.to));

        if color == Color::Black {
            self.fullmove_number += 1;
        }
        self.side_to_move = color.opponent();
        self.hash = self.compute_hash();
    }

    /// Count leaf nodes of the legal move tree to `depth`.
    #[must_use]
    pub fn perft(&self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }
        let moves = self.legal_moves();
        if depth == 1 {
            return moves.len() as u64;
        }
        moves
            .into_iter()
            .map(|mv| {
                let mut child = *self;
                child.make_move(mv);
                child.perft(depth - 1)
            })
            .sum()
    }
}

fn push_pawn_move(from: Square, to: Square, moves: &mut Vec<Move>) {
    if to.rank() == 0 || to.rank() == 7 {
        for piece in Piece::PROMOTIONS {
            moves.push(Move::with_promotion(from, to, piece));
        }
    } else {
        moves.push(Move::new(from, to));
    }
}
