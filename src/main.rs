use authorstat::cli::Cli;
use authorstat::logging::setup_logger;
use console::style;
use std::process::ExitCode;

fn main() -> ExitCode {
    setup_logger();
    let cli = Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", style("error:").for_stderr().red().bold());
            ExitCode::from(e.exit_code())
        }
    }
}
