/// A recognized protocol command, split off its first token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UciCommand {
    Uci,
    Debug,
    IsReady,
    SetOption,
    Register,
    UciNewGame,
    /// Tokens after `position`
    Position(Vec<String>),
    /// Tokens after `go`
    Go(Vec<String>),
    Stop,
    PonderHit,
    Quit,
    Unknown(String),
}

impl UciCommand {
    /// The command token as it appears on the wire.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            UciCommand::Uci => "uci",
            UciCommand::Debug => "debug",
            UciCommand::IsReady => "isready",
            UciCommand::SetOption => "setoption",
            UciCommand::Register => "register",
            UciCommand::UciNewGame => "ucinewgame",
            UciCommand::Position(_) => "position",
            UciCommand::Go(_) => "go",
            UciCommand::Stop => "stop",
            UciCommand::PonderHit => "ponderhit",
            UciCommand::Quit => "quit",
            UciCommand::Unknown(token) => token,
        }
    }
}

/// Parse one input line. Blank lines yield `None`.
#[must_use]
pub fn parse_uci_command(line: &str) -> Option<UciCommand> {
    let mut parts = line.split_whitespace();
    let head = parts.next()?;
    let rest = || parts.map(str::to_string).collect::<Vec<String>>();

    let cmd = match head {
        "uci" => UciCommand::Uci,
        "debug" => UciCommand::Debug,
        "isready" => UciCommand::IsReady,
        "setoption" => UciCommand::SetOption,
        "register" => UciCommand::Register,
        "ucinewgame" => UciCommand::UciNewGame,
        "position" => UciCommand::Position(rest()),
        "go" => UciCommand::Go(rest()),
        "stop" => UciCommand::Stop,
        "ponderhit" => UciCommand::PonderHit,
        "quit" => UciCommand::Quit,
        other => UciCommand::Unknown(other.to_string()),
    };

    Some(cmd)
}
