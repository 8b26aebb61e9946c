//! Search module implementing alpha-beta with iterative deepening.
//!
//! Features:
//! - Iterative deepening, previous best move searched first at the root
//! - Negamax alpha-beta with mate-distance scores
//! - Quiescence search over captures with stand-pat
//! - MVV-LVA capture ordering
//! - Draw detection (fifty-move rule, repetition, insufficient material)
//!
//! Termination is cooperative: a [`StopFlag`], a time deadline and a node
//! limit are polled every [`POLL_INTERVAL`] nodes.

mod eval;
mod limits;
mod time;

use std::fmt;
use std::time::{Duration, Instant};

use log::trace;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::board::{Board, Move, Position};
use crate::config::EngineConfig;
use crate::sync::StopFlag;

pub use eval::evaluate;
pub use limits::{LimitsError, SearchLimits};
pub use time::{TimeConfig, DEFAULT_MOVES_TO_GO};

/// Maximum search ply (quiescence included)
pub const MAX_PLY: usize = 128;

/// Score of a checkmate delivered at the root
pub(crate) const MATE_SCORE: i32 = 30_000;
const MATE_THRESHOLD: i32 = MATE_SCORE - MAX_PLY as i32;
const INFINITY: i32 = MATE_SCORE + 1;

/// Nodes between checks of the stop conditions
pub const POLL_INTERVAL: u64 = 1024;

/// Search score as reported over UCI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Score {
    Centipawns(i32),
    /// Mate in N moves; negative when the side to move is being mated
    Mate(i32),
}

impl Score {
    fn from_internal(score: i32) -> Self {
        if score >= MATE_THRESHOLD {
            Score::Mate((MATE_SCORE - score + 1) / 2)
        } else if score <= -MATE_THRESHOLD {
            Score::Mate(-(MATE_SCORE + score) / 2)
        } else {
            Score::Centipawns(score)
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Centipawns(cp) => write!(f, "cp {cp}"),
            Score::Mate(moves) => write!(f, "mate {moves}"),
        }
    }
}

/// Outcome of one search: the chosen move plus statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchResult {
    /// The best move found, `None` when the side to move has no legal move
    pub best_move: Option<Move>,
    /// The expected opponent reply
    pub ponder_move: Option<Move>,
    pub score: Score,
    /// Deepest fully completed iteration
    pub depth: u32,
    pub nodes: u64,
    pub elapsed: Duration,
    /// Principal variation, starting with `best_move`
    pub pv: Vec<Move>,
    /// Whether the search ended on a stop request, deadline or node limit
    pub stopped: bool,
}

impl SearchResult {
    /// The `bestmove` protocol line.
    #[must_use]
    pub fn bestmove_line(&self) -> String {
        let best = self.best_move.unwrap_or_else(Move::null);
        match self.ponder_move {
            Some(ponder) => format!("bestmove {best} ponder {ponder}"),
            None => format!("bestmove {best}"),
        }
    }

    /// The `info` protocol line summarizing the search.
    #[must_use]
    pub fn info_line(&self) -> String {
        let mut line = format!(
            "info depth {} score {} nodes {} time {}",
            self.depth,
            self.score,
            self.nodes,
            self.elapsed.as_millis()
        );
        if !self.pv.is_empty() {
            line.push_str(" pv");
            for mv in &self.pv {
                line.push(' ');
                line.push_str(&mv.to_string());
            }
        }
        line
    }
}

/// Run a complete search on `position` and return its result.
///
/// Blocks the calling thread until a limit is hit or `stop` is set.
#[must_use]
pub fn search(
    position: &Position,
    limits: &SearchLimits,
    config: &EngineConfig,
    stop: &StopFlag,
) -> SearchResult {
    let start = Instant::now();
    let board = *position.board();
    let budget = config.time.budget(limits, board.side_to_move());

    let mut root_moves = board.legal_moves();
    if !limits.search_moves.is_empty() {
        root_moves.retain(|mv| limits.search_moves.contains(mv));
    }
    if root_moves.is_empty() {
        let score = if board.in_check() {
            Score::Mate(0)
        } else {
            Score::Centipawns(0)
        };
        return SearchResult {
            best_move: None,
            ponder_move: None,
            score,
            depth: 0,
            nodes: 0,
            elapsed: start.elapsed(),
            pv: Vec::new(),
            stopped: stop.is_stopped(),
        };
    }

    let mut searcher = Searcher {
        stop,
        deadline: budget.and_then(|b| start.checked_add(b)),
        node_limit: limits.nodes,
        nodes: 0,
        aborted: false,
        path: position.history().to_vec(),
    };

    let mut pv = vec![root_moves[0]];
    let mut score = 0;
    let mut completed = 0;

    for depth in 1..=limits.depth_cap(config.max_depth) {
        // Previous best first
        if let Some(idx) = root_moves.iter().position(|&mv| mv == pv[0]) {
            root_moves[..=idx].rotate_right(1);
        }

        let mut line = Vec::new();
        let value = searcher.root(&board, &root_moves, depth, &mut line);
        if searcher.aborted || line.is_empty() {
            break;
        }
        pv = line;
        score = value;
        completed = depth;
        trace!(
            "depth {depth} score {} nodes {} time {}ms pv {}",
            Score::from_internal(score),
            searcher.nodes,
            start.elapsed().as_millis(),
            pv[0]
        );

        if score.abs() >= MATE_THRESHOLD && !limits.infinite {
            break;
        }
        // The next iteration would take longer than the time left.
        if let Some(budget) = budget {
            if start.elapsed() * 2 >= budget {
                break;
            }
        }
    }

    SearchResult {
        best_move: Some(pv[0]),
        ponder_move: pv.get(1).copied(),
        score: Score::from_internal(score),
        depth: completed,
        nodes: searcher.nodes,
        elapsed: start.elapsed(),
        pv,
        stopped: searcher.aborted,
    }
}

struct Searcher<'a> {
    stop: &'a StopFlag,
    deadline: Option<Instant>,
    node_limit: Option<u64>,
    nodes: u64,
    aborted: bool,
    /// Hashes of the game history followed by the current search path
    path: Vec<u64>,
}

impl Searcher<'_> {
    fn should_stop(&mut self) -> bool {
        if self.aborted {
            return true;
        }
        if let Some(limit) = self.node_limit {
            if self.nodes >= limit {
                self.aborted = true;
            }
        }
        if self.nodes % POLL_INTERVAL == 0 {
            if self.stop.is_stopped() {
                self.aborted = true;
            }
            if let Some(deadline) = self.deadline {
                if Instant::now() >= deadline {
                    self.aborted = true;
                }
            }
        }
        self.aborted
    }

    fn is_repetition(&self, hash: u64) -> bool {
        self.path.iter().rev().any(|&h| h == hash)
    }

    fn root(&mut self, board: &Board, moves: &[Move], depth: u32, pv: &mut Vec<Move>) -> i32 {
        let mut alpha = -INFINITY;
        let mut child_pv = Vec::new();
        self.path.push(board.hash());
        for &mv in moves {
            let mut child = *board;
            child.make_move(mv);
            let score = -self.negamax(&child, depth - 1, 1, -INFINITY, -alpha, &mut child_pv);
            if self.aborted {
                break;
            }
            if score > alpha {
                alpha = score;
                pv.clear();
                pv.push(mv);
                pv.extend_from_slice(&child_pv);
            }
        }
        self.path.pop();
        alpha
    }

    fn negamax(
        &mut self,
        board: &Board,
        depth: u32,
        ply: usize,
        mut alpha: i32,
        beta: i32,
        pv: &mut Vec<Move>,
    ) -> i32 {
        pv.clear();
        if self.should_stop() {
            return 0;
        }
        if board.halfmove_clock() >= 100
            || board.is_insufficient_material()
            || self.is_repetition(board.hash())
        {
            return 0;
        }
        if depth == 0 || ply >= MAX_PLY {
            return self.quiescence(board, ply, alpha, beta);
        }
        self.nodes += 1;

        let mut moves = board.legal_moves();
        if moves.is_empty() {
            return if board.in_check() {
                ply as i32 - MATE_SCORE
            } else {
                0
            };
        }
        order_moves(board, &mut moves);

        let mut child_pv = Vec::new();
        self.path.push(board.hash());
        for mv in moves {
            let mut child = *board;
            child.make_move(mv);
            let score = -self.negamax(&child, depth - 1, ply + 1, -beta, -alpha, &mut child_pv);
            if self.aborted {
                break;
            }
            if score > alpha {
                alpha = score;
                pv.clear();
                pv.push(mv);
                pv.extend_from_slice(&child_pv);
                if alpha >= beta {
                    break;
                }
            }
        }
        self.path.pop();
        alpha
    }

    fn quiescence(&mut self, board: &Board, ply: usize, mut alpha: i32, beta: i32) -> i32 {
        if self.should_stop() {
            return 0;
        }
        self.nodes += 1;

        let stand_pat = evaluate(board);
        if stand_pat >= beta || ply >= MAX_PLY {
            return stand_pat;
        }
        alpha = alpha.max(stand_pat);

        let mut captures = board.legal_moves();
        captures.retain(|&mv| board.is_capture(mv) || mv.promotion.is_some());
        order_moves(board, &mut captures);

        for mv in captures {
            let mut child = *board;
            child.make_move(mv);
            let score = -self.quiescence(&child, ply + 1, -beta, -alpha);
            if self.aborted {
                break;
            }
            if score >= beta {
                return score;
            }
            alpha = alpha.max(score);
        }
        alpha
    }
}

/// MVV-LVA: most valuable victim first, cheapest attacker breaking ties; quiet moves last.
fn order_moves(board: &Board, moves: &mut [Move]) {
    moves.sort_by_cached_key(|&mv| {
        let victim = board
            .captured_piece(mv)
            .map_or(0, |piece| eval::PIECE_VALUES[piece.index()]);
        let attacker = board
            .piece_at(mv.from)
            .map_or(0, |(_, piece)| eval::PIECE_VALUES[piece.index()]);
        let promotion = mv
            .promotion
            .map_or(0, |piece| eval::PIECE_VALUES[piece.index()]);
        if victim > 0 || promotion > 0 {
            -(victim * 10 + promotion - attacker / 10)
        } else {
            0
        }
    });
}
