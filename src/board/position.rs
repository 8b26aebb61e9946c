use super::error::{FenError, MoveParseError};
use super::{Board, Color, Move, Piece, Square};

/// The current game: a board plus the hashes of every earlier position,
/// used for repetition detection.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Position {
    board: Board,
    history: Vec<u64>,
}

impl Position {
    #[must_use]
    pub fn startpos() -> Self {
        Position::from_board(Board::new())
    }

    #[must_use]
    pub fn from_board(board: Board) -> Self {
        Position {
            board,
            history: Vec::new(),
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        Board::try_from_fen(fen).map(Position::from_board)
    }

    #[must_use]
    pub fn to_fen(&self) -> String {
        self.board.to_fen()
    }

    #[inline]
    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Hashes of the positions that preceded the current one, oldest first.
    #[must_use]
    pub fn history(&self) -> &[u64] {
        &self.history
    }

    #[must_use]
    pub fn side_to_move(&self) -> Color {
        self.board.side_to_move()
    }

    #[must_use]
    pub fn legal_moves(&self) -> Vec<Move> {
        self.board.legal_moves()
    }

    /// Number of earlier occurrences of the current position.
    #[must_use]
    pub fn repetitions(&self) -> usize {
        let hash = self.board.hash();
        self.history.iter().filter(|&&h| h == hash).count()
    }

    /// Parse a move in UCI format (e.g., "e2e4", "e7e8q") and check it is legal here.
    pub fn parse_move(&self, text: &str) -> Result<Move, MoveParseError> {
        if !(4..=5).contains(&text.len()) || !text.is_ascii() {
            return Err(MoveParseError::InvalidLength {
                len: text.chars().count(),
            });
        }
        let square = |part: &str| {
            Square::parse(part).ok_or_else(|| MoveParseError::InvalidSquare {
                notation: text.to_string(),
            })
        };
        let from = square(&text[0..2])?;
        let to = square(&text[2..4])?;
        let promotion = match text[4..].chars().next() {
            None => None,
            Some(c) => match Piece::from_char(c) {
                Some(piece) if Piece::PROMOTIONS.contains(&piece) => Some(piece),
                _ => return Err(MoveParseError::InvalidPromotion { char: c }),
            },
        };

        let candidate = Move {
            from,
            to,
            promotion,
        };
        if self.board.legal_moves().contains(&candidate) {
            Ok(candidate)
        } else {
            Err(MoveParseError::IllegalMove {
                notation: text.to_string(),
            })
        }
    }

    /// Apply a legal move, recording the previous position in the history.
    pub fn play(&mut self, mv: Move) {
        self.history.push(self.board.hash());
        self.board.make_move(mv);
    }

    /// Parse and apply a UCI move in one step.
    pub fn play_uci(&mut self, text: &str) -> Result<Move, MoveParseError> {
        let mv = self.parse_move(text)?;
        self.play(mv);
        Ok(mv)
    }
}
