//! Universal Chess Interface (UCI) protocol layer.
//!
//! Two producers feed one consumer: the [`CommandListener`] forwards input
//! lines and the [`Engine`](crate::engine::Engine) forwards search results,
//! both through an [`EventQueue`]. The [`Session`] is the only consumer and
//! the only code that touches the live [`Position`](crate::board::Position).

use std::fmt;
use std::io;

use crate::board::{FenError, MoveParseError};
use crate::engine::EngineError;
use crate::search::LimitsError;

pub mod command;
mod event;
mod listener;
mod session;

pub use command::{parse_uci_command, UciCommand};
pub use event::{Event, EventQueue};
pub use listener::CommandListener;
pub use session::{Flow, Session, SessionState};

/// Error type for command handling failures.
///
/// Every variant except `Io` is reported as a diagnostic line and the
/// session carries on.
#[derive(Debug)]
pub enum UciError {
    /// Command is recognized but not implemented
    Unsupported { command: String },
    /// First token names no known command
    UnknownCommand { token: String },
    /// Command needs arguments that were not given
    MissingArguments { command: &'static str },
    /// Token not allowed at this point of the command
    UnexpectedToken { token: String },
    /// Invalid FEN string
    InvalidFen(FenError),
    /// Invalid move in the move list
    InvalidMove { token: String, error: MoveParseError },
    /// Unparseable `go` options
    InvalidLimits(LimitsError),
    /// `go` while a search is in flight
    EngineBusy,
    /// The engine failed to start a search
    Engine(EngineError),
    /// Writing to a protocol stream failed
    Io(io::Error),
}

impl fmt::Display for UciError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UciError::Unsupported { .. } => write!(f, "Unsupported command"),
            UciError::UnknownCommand { token } => write!(f, "Unknown command: {token}"),
            UciError::MissingArguments { command } => {
                write!(f, "Missing arguments for '{command}'")
            }
            UciError::UnexpectedToken { token } => write!(f, "Unexpected token '{token}'"),
            UciError::InvalidFen(e) => write!(f, "Invalid FEN: {e}"),
            UciError::InvalidMove { token, error } => write!(f, "Invalid move '{token}': {error}"),
            UciError::InvalidLimits(e) => write!(f, "Invalid go options: {e}"),
            UciError::EngineBusy => write!(f, "engine busy"),
            UciError::Engine(e) => write!(f, "{e}"),
            UciError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for UciError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UciError::InvalidFen(e) => Some(e),
            UciError::InvalidMove { error, .. } => Some(error),
            UciError::InvalidLimits(e) => Some(e),
            UciError::Engine(e) => Some(e),
            UciError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<FenError> for UciError {
    fn from(e: FenError) -> Self {
        UciError::InvalidFen(e)
    }
}

impl From<LimitsError> for UciError {
    fn from(e: LimitsError) -> Self {
        UciError::InvalidLimits(e)
    }
}

impl From<EngineError> for UciError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::Busy => UciError::EngineBusy,
            other => UciError::Engine(other),
        }
    }
}

impl From<io::Error> for UciError {
    fn from(e: io::Error) -> Self {
        UciError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_messages() {
        assert_eq!(
            UciError::Unsupported {
                command: "setoption".to_string()
            }
            .to_string(),
            "Unsupported command"
        );
        assert_eq!(
            UciError::UnknownCommand {
                token: "xyzzy".to_string()
            }
            .to_string(),
            "Unknown command: xyzzy"
        );
        assert_eq!(UciError::EngineBusy.to_string(), "engine busy");
    }

    #[test]
    fn test_engine_busy_conversion() {
        assert!(matches!(UciError::from(EngineError::Busy), UciError::EngineBusy));
        let spawn = EngineError::Spawn(io::Error::new(io::ErrorKind::Other, "no threads"));
        assert!(matches!(UciError::from(spawn), UciError::Engine(_)));
    }

    #[test]
    fn test_messages_name_offending_token() {
        let err = UciError::InvalidMove {
            token: "e2e5".to_string(),
            error: MoveParseError::IllegalMove {
                notation: "e2e5".to_string(),
            },
        };
        assert!(err.to_string().contains("e2e5"));

        let err = UciError::from(LimitsError::InvalidValue {
            keyword: "depth",
            value: "deep".to_string(),
        });
        assert!(err.to_string().contains("deep"));
    }
}
