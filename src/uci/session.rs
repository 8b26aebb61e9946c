//! The dispatcher: sole consumer of the event queue.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use log::{debug, error, warn};

use super::command::{parse_uci_command, UciCommand};
use super::event::{Event, EventQueue};
use super::listener::CommandListener;
use super::UciError;
use crate::board::Position;
use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::search::{SearchLimits, SearchResult};

/// Whether a search is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Searching,
}

/// What the consume loop does after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// One protocol session over an output stream and a diagnostic stream.
///
/// The session owns the engine and the live position. Handlers run only on
/// the thread that drives [`Session::run`] (or calls
/// [`Session::handle_event`]), so the position has a single writer. The
/// engine's result callback holds a weak reference to the queue and does
/// nothing but enqueue.
pub struct Session<W: Write, E: Write> {
    out: W,
    err: E,
    queue: Arc<EventQueue<Event>>,
    engine: Engine,
    position: Position,
    state: SessionState,
}

impl<W: Write, E: Write> Session<W, E> {
    pub fn new(out: W, err: E, config: EngineConfig) -> Self {
        let queue = Arc::new(EventQueue::new());
        let sink = Arc::downgrade(&queue);
        let engine = Engine::new(config, move |result| match sink.upgrade() {
            Some(queue) => queue.put(Event::SearchResult(result)),
            None => debug!("session closed; dropping search result"),
        });

        Session {
            out,
            err,
            queue,
            engine,
            position: Position::startpos(),
            state: SessionState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn position(&self) -> &Position {
        &self.position
    }

    /// The queue both producers feed.
    #[must_use]
    pub fn queue(&self) -> &Arc<EventQueue<Event>> {
        &self.queue
    }

    /// Consume events until `quit` or end of input, then tear down.
    ///
    /// Only failures to write the protocol streams are returned; every
    /// command error is reported as a diagnostic line and the loop carries on.
    pub fn run<R>(mut self, input: R) -> io::Result<()>
    where
        R: BufRead + Send + 'static,
    {
        let listener = CommandListener::spawn(input, Arc::clone(&self.queue))?;

        let outcome = self.monitor_events().and_then(|()| self.finish_search());
        match &outcome {
            // The listener has stopped reading by now.
            Ok(()) => listener.join(),
            Err(e) => {
                error!("protocol stream failed: {e}");
                self.engine.shutdown();
            }
        }
        outcome
    }

    fn monitor_events(&mut self) -> io::Result<()> {
        loop {
            let event = self.queue.take();
            if self.handle_event(event)? == Flow::Quit {
                return Ok(());
            }
        }
    }

    /// Stop an outstanding search, join it and report its result, so no
    /// producer is left writing into the queue.
    fn finish_search(&mut self) -> io::Result<()> {
        if self.state == SessionState::Searching {
            debug!("stopping search for shutdown");
            self.engine.stop();
        }
        self.engine.shutdown();

        while let Some(event) = self.queue.try_take() {
            match event {
                Event::SearchResult(result) => self.on_search_result(&result)?,
                other => debug!("discarding {other:?} after shutdown"),
            }
        }
        Ok(())
    }

    /// Advance the state machine by one event.
    pub fn handle_event(&mut self, event: Event) -> io::Result<Flow> {
        match event {
            Event::Command(line) => self.handle_line(&line),
            Event::SearchResult(result) => {
                self.on_search_result(&result)?;
                Ok(Flow::Continue)
            }
            Event::EndOfInput => {
                debug!("input closed");
                Ok(Flow::Quit)
            }
        }
    }

    fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        let Some(command) = parse_uci_command(line) else {
            return Ok(Flow::Continue);
        };
        debug!("{:?}: {}", self.state, line);

        match self.execute(command) {
            Ok(flow) => Ok(flow),
            Err(UciError::Io(e)) => Err(e),
            Err(e) => {
                self.report_error(&e)?;
                Ok(Flow::Continue)
            }
        }
    }

    fn execute(&mut self, command: UciCommand) -> Result<Flow, UciError> {
        match command {
            UciCommand::Uci => {
                let reply = format!(
                    "name {}\nauthor {}\nuciok",
                    self.engine.config().name,
                    self.engine.config().author
                );
                self.send(&reply)?;
            }
            UciCommand::IsReady => self.send("readyok")?,
            UciCommand::Position(args) => self.set_position(&args)?,
            UciCommand::Go(args) => self.go(&args)?,
            UciCommand::Stop => self.engine.stop(),
            UciCommand::Quit => return Ok(Flow::Quit),
            UciCommand::Unknown(token) => return Err(UciError::UnknownCommand { token }),
            unsupported @ (UciCommand::Debug
            | UciCommand::SetOption
            | UciCommand::Register
            | UciCommand::UciNewGame
            | UciCommand::PonderHit) => {
                return Err(UciError::Unsupported {
                    command: unsupported.name().to_string(),
                })
            }
        }
        Ok(Flow::Continue)
    }

    /// `position (startpos | fen <fen>) [moves <m1> ...]`
    ///
    /// The new position is built aside and swapped in only when every token
    /// applied cleanly.
    fn set_position(&mut self, args: &[String]) -> Result<(), UciError> {
        let (mut position, rest) = match args.split_first() {
            Some((kind, rest)) if kind == "startpos" => (Position::startpos(), rest),
            Some((kind, rest)) if kind == "fen" => {
                let end = rest.iter().position(|t| t == "moves").unwrap_or(rest.len());
                let fen = rest[..end].join(" ");
                (Position::from_fen(&fen)?, &rest[end..])
            }
            Some((token, _)) => {
                return Err(UciError::UnexpectedToken {
                    token: token.clone(),
                })
            }
            None => return Err(UciError::MissingArguments { command: "position" }),
        };

        match rest.split_first() {
            None => {}
            Some((keyword, moves)) if keyword == "moves" => {
                for token in moves {
                    position
                        .play_uci(token)
                        .map_err(|error| UciError::InvalidMove {
                            token: token.clone(),
                            error,
                        })?;
                }
            }
            Some((token, _)) => {
                return Err(UciError::UnexpectedToken {
                    token: token.clone(),
                })
            }
        }

        self.position = position;
        Ok(())
    }

    fn go(&mut self, args: &[String]) -> Result<(), UciError> {
        if self.state == SessionState::Searching {
            return Err(UciError::EngineBusy);
        }
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let limits = SearchLimits::parse(&args, &self.position)?;

        self.engine.search(self.position.clone(), limits)?;
        self.transition(SessionState::Searching);
        Ok(())
    }

    fn on_search_result(&mut self, result: &SearchResult) -> io::Result<()> {
        if self.state == SessionState::Idle {
            warn!("search result arrived while idle");
        }
        self.send(&result.info_line())?;
        self.send(&result.bestmove_line())?;
        self.transition(SessionState::Idle);
        Ok(())
    }

    fn transition(&mut self, next: SessionState) {
        if self.state != next {
            debug!("{:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }

    /// Write complete lines to the output stream and flush.
    fn send(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{text}")?;
        self.out.flush()
    }

    fn report_error(&mut self, e: &UciError) -> io::Result<()> {
        warn!("{e}");
        writeln!(self.err, "ERROR: {e}")?;
        self.err.flush()
    }
}
