use std::process::ExitCode;

fn main() -> ExitCode {
    dealband_cli::run()
}
