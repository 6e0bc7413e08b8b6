use std::process::ExitCode;

fn main() -> ExitCode {
    virtuoso_cli::run()
}
