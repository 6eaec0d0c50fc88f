use std::process::ExitCode;

fn main() -> ExitCode {
    greenpath_cli::run()
}
