use super::error::FenError;
use super::{
    Board, Color, Piece, Square, CASTLE_BLACK_K, CASTLE_BLACK_Q, CASTLE_WHITE_K, CASTLE_WHITE_Q,
};

pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Board {
    /// Parse a board position from FEN notation.
    ///
    /// The halfmove and fullmove counters are optional and default to `0` and `1`.
    pub fn try_from_fen(fen: &str) -> Result<Self, FenError> {
        let mut board = Board::empty();
        let parts: Vec<&str> = fen.split_whitespace().collect();

        if parts.len() < 4 {
            return Err(FenError::TooFewParts { found: parts.len() });
        }

        // Piece placement, rank 8 first
        let ranks: Vec<&str> = parts[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(FenError::InvalidRankCount { found: ranks.len() });
        }
        for (rank_idx, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - rank_idx as u8;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    file += skip as usize;
                    continue;
                }
                let piece = Piece::from_char(c).ok_or(FenError::InvalidPiece { char: c })?;
                if file >= 8 {
                    return Err(FenError::InvalidRankLength {
                        rank: rank_idx,
                        files: file + 1,
                    });
                }
                let color = if c.is_ascii_uppercase() {
                    Color::White
                } else {
                    Color::Black
                };
                board.set_piece(Square::new(rank, file as u8), color, piece);
                file += 1;
            }
            if file != 8 {
                return Err(FenError::InvalidRankLength {
                    rank: rank_idx,
                    files: file,
                });
            }
        }

        for color in [Color::White, Color::Black] {
            let kings = board
                .squares
                .iter()
                .filter(|entry| **entry == Some((color, Piece::King)))
                .count();
            if kings != 1 {
                return Err(FenError::InvalidKingCount {
                    color,
                    found: kings,
                });
            }
        }

        board.side_to_move = match parts[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => {
                return Err(FenError::InvalidSideToMove {
                    found: other.to_string(),
                })
            }
        };

        for c in parts[2].chars() {
            match c {
                'K' => board.castling_rights |= CASTLE_WHITE_K,
                'Q' => board.castling_rights |= CASTLE_WHITE_Q,
                'k' => board.castling_rights |= CASTLE_BLACK_K,
                'q' => board.castling_rights |= CASTLE_BLACK_Q,
                '-' => {}
                _ => return Err(FenError::InvalidCastling { char: c }),
            }
        }
        board.castling_rights &= board.castling_rights_in_place();

        board.en_passant = match parts[3] {
            "-" => None,
            text => {
                let sq = Square::parse(text).filter(|sq| sq.rank() == 2 || sq.rank() == 5);
                Some(sq.ok_or_else(|| FenError::InvalidEnPassant {
                    found: text.to_string(),
                })?)
            }
        };

        if let Some(text) = parts.get(4) {
            board.halfmove_clock = parse_clock(text)?;
        }
        if let Some(text) = parts.get(5) {
            board.fullmove_number = parse_clock(text)?.max(1);
        }

        board.hash = board.compute_hash();
        Ok(board)
    }

    /// Convert the board position to FEN notation.
    #[must_use]
    pub fn to_fen(&self) -> String {
        let mut rows: Vec<String> = Vec::with_capacity(8);
        for rank in (0..8).rev() {
            let mut row = String::new();
            let mut empty = 0;
            for file in 0..8 {
                if let Some((color, piece)) = self.piece_at(Square::new(rank, file)) {
                    if empty > 0 {
                        row.push_str(&empty.to_string());
                        empty = 0;
                    }
                    row.push(piece.to_fen_char(color));
                } else {
                    empty += 1;
                }
            }
            if empty > 0 {
                row.push_str(&empty.to_string());
            }
            rows.push(row);
        }

        let active = match self.side_to_move {
            Color::White => "w",
            Color::Black => "b",
        };

        let mut castling = String::new();
        for (bit, c) in [
            (CASTLE_WHITE_K, 'K'),
            (CASTLE_WHITE_Q, 'Q'),
            (CASTLE_BLACK_K, 'k'),
            (CASTLE_BLACK_Q, 'q'),
        ] {
            if self.castling_rights & bit != 0 {
                castling.push(c);
            }
        }
        if castling.is_empty() {
            castling.push('-');
        }

        let en_passant = self
            .en_passant
            .map_or_else(|| "-".to_string(), |sq| sq.to_string());

        format!(
            "{} {} {} {} {} {}",
            rows.join("/"),
            active,
            castling,
            en_passant,
            self.halfmove_clock,
            self.fullmove_number
        )
    }

    /// Rights whose king and rook still stand on their original squares.
    fn castling_rights_in_place(&self) -> u8 {
        let at = |rank, file, piece, color| {
            self.piece_at(Square::new(rank, file)) == Some((color, piece))
        };
        let mut rights = 0;
        if at(0, 4, Piece::King, Color::White) {
            if at(0, 7, Piece::Rook, Color::White) {
                rights |= CASTLE_WHITE_K;
            }
            if at(0, 0, Piece::Rook, Color::White) {
                rights |= CASTLE_WHITE_Q;
            }
        }
        if at(7, 4, Piece::King, Color::Black) {
            if at(7, 7, Piece::Rook, Color::Black) {
                rights |= CASTLE_BLACK_K;
            }
            if at(7, 0, Piece::Rook, Color::Black) {
                rights |= CASTLE_BLACK_Q;
            }
        }
        rights
    }
}

fn parse_clock(text: &str) -> Result<u32, FenError> {
    text.parse().map_err(|_| FenError::InvalidClock {
        found: text.to_string(),
    })
}
