use linkup_core::{logging, LinkupError};

mod cli;

use crate::cli::CliCommand;

fn main() {
    // Log to the state dir when possible; never fail the command over logging.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", err);
    }

    if let Err(err) = CliCommand::run_from_args() {
        eprintln!("linkup error: {:#}", err);
        let code = match err.downcast_ref::<LinkupError>() {
            Some(LinkupError::Config(_)) => 2,
            _ => 1,
        };
        std::process::exit(code);
    }
}
