use std::io::{self, BufReader};
use std::process::ExitCode;

use log::error;

use toy_chess::config::EngineConfig;
use toy_chess::uci::Session;

fn main() -> ExitCode {
    pretty_env_logger::init();

    let config = EngineConfig::from_env();
    let session = Session::new(io::stdout(), io::stderr(), config);
    match session.run(BufReader::new(io::stdin())) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("session ended abnormally: {e}");
            ExitCode::FAILURE
        }
    }
}
