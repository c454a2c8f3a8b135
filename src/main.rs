use clap::Parser;
use fsmc::cli::Cli;
use fsmc::error::ERROR_TAG;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = match Cli::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // usage problems exit with 1, --help and --version with 0
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match fsmc::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{ERROR_TAG} {e:#}");
            ExitCode::FAILURE
        }
    }
}
