use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, error};

use super::event::{Event, EventQueue};

/// Reads the input stream on its own thread and forwards every line as an
/// [`Event::Command`]. Its only side effect is enqueuing.
///
/// Reading stops after a `quit` line has been forwarded, or at end of input,
/// which is reported as [`Event::EndOfInput`].
pub struct CommandListener {
    handle: JoinHandle<()>,
}

impl CommandListener {
    pub fn spawn<R>(input: R, queue: Arc<EventQueue<Event>>) -> io::Result<Self>
    where
        R: BufRead + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("command-listener".to_string())
            .spawn(move || listen(input, &queue))?;
        Ok(CommandListener { handle })
    }

    /// Wait for the listener thread to exit.
    pub fn join(self) {
        if self.handle.join().is_err() {
            error!("command listener panicked");
        }
    }
}

fn listen<R: BufRead>(mut input: R, queue: &EventQueue<Event>) {
    let mut line = Vec::new();
    loop {
        line.clear();
        match input.read_until(b'\n', &mut line) {
            Ok(0) => break,
            Ok(_) => {
                // Undecodable bytes surface as an unknown command, not end of input.
                let command = String::from_utf8_lossy(&line).trim_end().to_string();
                let is_quit = command.split_whitespace().next() == Some("quit");
                queue.put(Event::Command(command));
                if is_quit {
                    debug!("listener saw quit; no longer reading input");
                    return;
                }
            }
            Err(e) => {
                error!("Encountered I/O error reading commands: {e}");
                break;
            }
        }
    }
    debug!("end of input");
    queue.put(Event::EndOfInput);
}
