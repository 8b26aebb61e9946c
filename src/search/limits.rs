//! Parsing of `go` command options into [`SearchLimits`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use log::warn;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::board::{Move, MoveParseError, Position};

/// Keywords that end a `searchmoves` list.
const KEYWORDS: [&str; 12] = [
    "searchmoves",
    "ponder",
    "wtime",
    "btime",
    "winc",
    "binc",
    "movestogo",
    "depth",
    "nodes",
    "mate",
    "movetime",
    "infinite",
];

/// Constraints governing how long or deep a search may run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SearchLimits {
    pub depth: Option<u32>,
    pub nodes: Option<u64>,
    /// Search for a mate in this many moves
    pub mate: Option<u32>,
    pub movetime: Option<Duration>,
    pub wtime: Option<Duration>,
    pub btime: Option<Duration>,
    pub winc: Option<Duration>,
    pub binc: Option<Duration>,
    pub movestogo: Option<u32>,
    pub infinite: bool,
    pub ponder: bool,
    /// Root moves to consider; empty means all legal moves
    pub search_moves: Vec<Move>,
}

/// Error type for `go` option parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LimitsError {
    /// Keyword given without its value
    MissingValue { keyword: &'static str },
    /// Keyword value is not a valid number
    InvalidValue { keyword: &'static str, value: String },
    /// Entry of a `searchmoves` list is not a legal move
    InvalidSearchMove { token: String, error: MoveParseError },
}

impl fmt::Display for LimitsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LimitsError::MissingValue { keyword } => {
                write!(f, "Missing value for '{keyword}'")
            }
            LimitsError::InvalidValue { keyword, value } => {
                write!(f, "Invalid value '{value}' for '{keyword}'")
            }
            LimitsError::InvalidSearchMove { token, error } => {
                write!(f, "Invalid search move '{token}': {error}")
            }
        }
    }
}

impl std::error::Error for LimitsError {}

impl SearchLimits {
    /// Parse the tokens following `go`. Unknown tokens are ignored;
    /// `searchmoves` entries are checked against `position`.
    pub fn parse(args: &[&str], position: &Position) -> Result<Self, LimitsError> {
        let mut limits = SearchLimits::default();
        let mut i = 0;
        while i < args.len() {
            let token = args[i];
            i += 1;
            match token {
                "depth" => limits.depth = Some(value(args, &mut i, "depth")?),
                "nodes" => limits.nodes = Some(value(args, &mut i, "nodes")?),
                "mate" => limits.mate = Some(value(args, &mut i, "mate")?),
                "movestogo" => limits.movestogo = Some(value(args, &mut i, "movestogo")?),
                "movetime" => limits.movetime = Some(millis(args, &mut i, "movetime")?),
                "wtime" => limits.wtime = Some(millis(args, &mut i, "wtime")?),
                "btime" => limits.btime = Some(millis(args, &mut i, "btime")?),
                "winc" => limits.winc = Some(millis(args, &mut i, "winc")?),
                "binc" => limits.binc = Some(millis(args, &mut i, "binc")?),
                "infinite" => limits.infinite = true,
                "ponder" => limits.ponder = true,
                "searchmoves" => {
                    while i < args.len() && !KEYWORDS.contains(&args[i]) {
                        let mv = position.parse_move(args[i]).map_err(|error| {
                            LimitsError::InvalidSearchMove {
                                token: args[i].to_string(),
                                error,
                            }
                        })?;
                        limits.search_moves.push(mv);
                        i += 1;
                    }
                }
                other => warn!("ignoring unknown go option '{other}'"),
            }
        }
        Ok(limits)
    }

    /// Deepest iteration allowed by these limits, capped at `max_depth`.
    #[must_use]
    pub fn depth_cap(&self, max_depth: u32) -> u32 {
        let mut cap = max_depth.max(1);
        if let Some(depth) = self.depth {
            cap = cap.min(depth.max(1));
        }
        if let Some(mate) = self.mate {
            cap = cap.min(mate.saturating_mul(2).saturating_sub(1).max(1));
        }
        cap
    }
}

/// Parse the value following the keyword at `args[*i - 1]`, advancing `i`.
fn value<T: FromStr>(args: &[&str], i: &mut usize, keyword: &'static str) -> Result<T, LimitsError> {
    let raw = args.get(*i).ok_or(LimitsError::MissingValue { keyword })?;
    *i += 1;
    raw.parse().map_err(|_| LimitsError::InvalidValue {
        keyword,
        value: (*raw).to_string(),
    })
}

/// Millisecond values may be negative on an overstepped clock; they clamp to zero.
fn millis(args: &[&str], i: &mut usize, keyword: &'static str) -> Result<Duration, LimitsError> {
    let ms: i64 = value(args, i, keyword)?;
    Ok(Duration::from_millis(ms.max(0) as u64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<SearchLimits, LimitsError> {
        let args: Vec<&str> = line.split_whitespace().collect();
        SearchLimits::parse(&args, &Position::startpos())
    }

    #[test]
    fn test_parse_clock_fields() {
        let limits = parse("wtime 60000 btime 59000 winc 1000 binc 900 movestogo 20").unwrap();
        assert_eq!(limits.wtime, Some(Duration::from_millis(60_000)));
        assert_eq!(limits.btime, Some(Duration::from_millis(59_000)));
        assert_eq!(limits.winc, Some(Duration::from_millis(1_000)));
        assert_eq!(limits.binc, Some(Duration::from_millis(900)));
        assert_eq!(limits.movestogo, Some(20));
        assert!(!limits.infinite);
    }

    #[test]
    fn test_parse_flags_and_depth() {
        let limits = parse("infinite depth 7 nodes 5000").unwrap();
        assert!(limits.infinite);
        assert_eq!(limits.depth, Some(7));
        assert_eq!(limits.nodes, Some(5_000));
        assert!(parse("ponder").unwrap().ponder);
    }

    #[test]
    fn test_negative_clock_clamps_to_zero() {
        let limits = parse("wtime -150").unwrap();
        assert_eq!(limits.wtime, Some(Duration::ZERO));
    }

    #[test]
    fn test_unknown_tokens_are_ignored() {
        let limits = parse("frobnicate movetime 100 banana").unwrap();
        assert_eq!(limits.movetime, Some(Duration::from_millis(100)));
    }

    #[test]
    fn test_malformed_values_are_errors() {
        assert_eq!(
            parse("depth"),
            Err(LimitsError::MissingValue { keyword: "depth" })
        );
        assert_eq!(
            parse("movetime soon"),
            Err(LimitsError::InvalidValue {
                keyword: "movetime",
                value: "soon".to_string()
            })
        );
    }

    #[test]
    fn test_searchmoves_stop_at_keyword() {
        let limits = parse("searchmoves e2e4 d2d4 depth 3").unwrap();
        let moves: Vec<String> = limits.search_moves.iter().map(Move::to_string).collect();
        assert_eq!(moves, ["e2e4", "d2d4"]);
        assert_eq!(limits.depth, Some(3));

        assert!(matches!(
            parse("searchmoves e2e5"),
            Err(LimitsError::InvalidSearchMove { .. })
        ));
    }

    #[test]
    fn test_depth_cap() {
        assert_eq!(SearchLimits::default().depth_cap(64), 64);
        let limits = SearchLimits {
            depth: Some(5),
            ..SearchLimits::default()
        };
        assert_eq!(limits.depth_cap(64), 5);
        assert_eq!(limits.depth_cap(3), 3);
        let mate = SearchLimits {
            mate: Some(2),
            ..SearchLimits::default()
        };
        assert_eq!(mate.depth_cap(64), 3);
    }

    #[test]
    fn test_depth_cap_at_integer_limits() {
        let limits = parse("mate 4294967295 depth 4294967295").unwrap();
        assert_eq!(limits.depth_cap(64), 64);
        assert_eq!(parse("mate 3000000000").unwrap().depth_cap(10), 10);
    }
}
