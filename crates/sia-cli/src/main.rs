//! `sia` binary.

use sia_cli::cli::{self, EXIT_ERROR};
use sia_cli::init_logging;
use std::io;

fn main() {
    let matches = cli::build().get_matches();

    if let Err(error) = init_logging(&cli::log_config(&matches)) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(EXIT_ERROR);
    }

    let exit_code = match cli::run(&matches, &mut io::stdout().lock()) {
        Ok(code) => code,
        Err(error) => {
            eprintln!("error: {error:#}");
            EXIT_ERROR
        }
    };
    std::process::exit(exit_code);
}
