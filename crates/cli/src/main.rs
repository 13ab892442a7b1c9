use std::process::ExitCode;

fn main() -> ExitCode {
    inhouse_cli::run()
}
