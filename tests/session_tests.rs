use std::io::{self, Cursor, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use toy_chess::config::EngineConfig;
use toy_chess::uci::Session;

/// Output stream the test can still read after the session consumed it.
#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().clone()).unwrap()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run a whole session over `input`; returns (stdout, stderr).
fn run_session(input: &str) -> (String, String) {
    run_session_bytes(input.as_bytes())
}

fn run_session_bytes(input: &[u8]) -> (String, String) {
    let out = SharedBuffer::default();
    let err = SharedBuffer::default();
    let session = Session::new(out.clone(), err.clone(), EngineConfig::default());
    session
        .run(Cursor::new(input.to_vec()))
        .expect("session failed");
    (out.contents(), err.contents())
}

#[test]
fn test_end_to_end_scenario() {
    let (out, err) = run_session("uci\nisready\nposition startpos\ngo movetime 100\nstop\n");
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines[0], "name toy-chess");
    assert_eq!(lines[1], "author hiro18181");
    assert_eq!(lines[2], "uciok");
    assert_eq!(lines[3], "readyok");
    let bestmoves: Vec<&&str> = lines.iter().filter(|l| l.starts_with("bestmove ")).collect();
    assert_eq!(bestmoves.len(), 1, "output was:\n{out}");
    assert_eq!(lines.last(), bestmoves.last().copied());
    assert!(err.is_empty(), "unexpected diagnostics: {err}");
}

#[test]
fn test_no_go_means_no_search_output() {
    let (out, err) = run_session(
        "uci\nisready\nposition startpos moves e2e4 e7e5\nstop\nposition startpos\nucinewgame\nisready\n",
    );
    assert_eq!(out, "name toy-chess\nauthor hiro18181\nuciok\nreadyok\nreadyok\n");
    assert_eq!(err, "ERROR: Unsupported command\n");
}

#[test]
fn test_uci_reply_independent_of_state() {
    let (out, _) = run_session("uci\nposition startpos moves e2e4\ngo infinite\nuci\nstop\n");
    let ids: Vec<&str> = out
        .lines()
        .filter(|l| l.starts_with("name ") || l.starts_with("author ") || *l == "uciok")
        .collect();
    assert_eq!(
        ids,
        [
            "name toy-chess",
            "author hiro18181",
            "uciok",
            "name toy-chess",
            "author hiro18181",
            "uciok"
        ]
    );
}

#[test]
fn test_busy_go_starts_no_second_search() {
    let (out, err) = run_session("position startpos\ngo infinite\ngo depth 1\ngo movetime 10\nstop\n");
    assert_eq!(err, "ERROR: engine busy\nERROR: engine busy\n");
    assert_eq!(out.matches("bestmove").count(), 1);
}

#[test]
fn test_one_bestmove_per_go() {
    let (out, err) = run_session(
        "position startpos\ngo depth 2\nisready\nposition startpos moves e2e4\ngo depth 2\n",
    );
    // The second go is either accepted after the first result or rejected as busy.
    let busy = err.matches("engine busy").count();
    assert_eq!(out.matches("bestmove").count(), 2 - busy);
}

#[test]
fn test_quit_during_search_still_reports() {
    let (out, _) = run_session("go infinite\nquit\nisready\n");
    assert_eq!(out.matches("bestmove").count(), 1);
    assert!(!out.contains("readyok"));
}

#[test]
fn test_malformed_fen_keeps_prior_position() {
    // Black is stalemated, so a search on the kept position has no move to report.
    let (out, err) = run_session(
        "position fen 7k/5Q2/6K1/8/8/8/8/8 b - - 0 1\n\
         position fen 7k/5Q2/6K1/8/8/8/8/8 x - - 0 1\n\
         go depth 3\n",
    );
    assert_eq!(err.lines().count(), 1);
    assert!(err.starts_with("ERROR: Invalid FEN"));
    let bestmove = out
        .lines()
        .find(|l| l.starts_with("bestmove "))
        .expect("no bestmove");
    assert_eq!(bestmove, "bestmove 0000");
}

#[test]
fn test_huge_mate_value_still_reports() {
    let (out, err) = run_session("go mate 3000000000\ngo depth 1\nquit\n");
    assert_eq!(out.matches("bestmove").count(), 1, "output was:\n{out}");
    assert_eq!(err, "ERROR: engine busy\n");
}

#[test]
fn test_undecodable_line_does_not_end_session() {
    let (out, err) = run_session_bytes(b"isready\n\xff\nisready\nquit\n");
    assert_eq!(out, "readyok\nreadyok\n");
    assert_eq!(err, "ERROR: Unknown command: \u{fffd}\n");
}
