use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Command, Stdio};

#[test]
fn uci_scenario_over_stdio() {
    let exe = env!("CARGO_BIN_EXE_toy_chess");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn engine binary");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let mut reader = BufReader::new(stdout);

    stdin
        .write_all(b"uci\nisready\nposition startpos\ngo movetime 100\nstop\n")
        .unwrap();

    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        let bytes = reader.read_line(&mut line).expect("read failed");
        if bytes == 0 {
            break;
        }
        let line = line.trim_end().to_string();
        let done = line.starts_with("bestmove");
        lines.push(line);
        if done {
            break;
        }
    }

    stdin.write_all(b"quit\n").unwrap();
    drop(stdin);
    let mut rest = String::new();
    reader.read_to_string(&mut rest).expect("read failed");
    let output = child.wait_with_output().expect("engine did not exit");

    assert_eq!(&lines[..4], ["name toy-chess", "author hiro18181", "uciok", "readyok"]);
    let bestmove = lines.last().expect("no output");
    let parts: Vec<&str> = bestmove.split_whitespace().collect();
    assert_eq!(parts[0], "bestmove");
    assert!(parts.len() >= 2, "bestmove missing move: {bestmove}");

    assert!(!rest.contains("bestmove"), "second bestmove: {rest}");
    assert!(output.status.success());
}

#[test]
fn uci_diagnostics_go_to_stderr() {
    let exe = env!("CARGO_BIN_EXE_toy_chess");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn engine binary");

    let input = b"setoption name Hash value 16\nfrobnicate\nposition startpos moves e2e5\nisready\n";
    child.stdin.as_mut().unwrap().write_all(input).unwrap();
    // Closing stdin is an implicit quit.
    drop(child.stdin.take());

    let output = child.wait_with_output().expect("failed to read output");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(stdout, "readyok\n");
    let errors: Vec<&str> = stderr.lines().filter(|l| l.starts_with("ERROR: ")).collect();
    assert_eq!(errors.len(), 3, "stderr was: {stderr}");
    assert_eq!(errors[0], "ERROR: Unsupported command");
    assert_eq!(errors[1], "ERROR: Unknown command: frobnicate");
    assert!(errors[2].contains("e2e5"));
    assert!(output.status.success());
}

#[test]
fn uci_bestmove_is_legal_after_moves() {
    let exe = env!("CARGO_BIN_EXE_toy_chess");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("failed to spawn engine binary");

    let input = b"position startpos moves e2e4\ngo depth 3\n";
    child.stdin.as_mut().unwrap().write_all(input).unwrap();
    drop(child.stdin.take());

    let output = child.wait_with_output().expect("failed to read output");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let bestmove = stdout
        .lines()
        .find(|l| l.starts_with("bestmove "))
        .expect("no bestmove found");
    let mv = bestmove.split_whitespace().nth(1).unwrap();

    let mut position = toy_chess::Position::startpos();
    position.play_uci("e2e4").unwrap();
    assert!(position.parse_move(mv).is_ok(), "bestmove not legal: {mv}");
}
