use clap::Parser;
use colored::Colorize;
use ux_enhancer_core::cli::{self, Cli};
use ux_enhancer_core::exit::UxExit;
use ux_enhancer_core::logging;

fn main() -> UxExit {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = if cli.command.is_some() {
        cli::dispatch::execute(cli)
    } else {
        use clap::CommandFactory;
        let _ = Cli::command().print_help();
        Ok(UxExit::Success)
    };

    match result {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red());
            UxExit::Error
        }
    }
}
