use calories::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    Cli::run()
}
