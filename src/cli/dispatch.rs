//! Command dispatch, kept out of the binary so it stays a thin shell.

use super::args::{Cli, Commands};
use super::handlers::{handle_analyze, handle_baseline, handle_frames, AnalyzeArgs, BaselineArgs};
use crate::exit::UxExit;
use anyhow::Result;

/// Executes the parsed command.
///
/// # Errors
/// Returns error if the command handler fails.
pub fn execute(cli: Cli) -> Result<UxExit> {
    let Some(command) = cli.command else {
        return Ok(UxExit::Success);
    };
    let config = cli.config;
    match command {
        Commands::Analyze { files, out, format, seed, skip, fail_under } => handle_analyze(&AnalyzeArgs {
            files,
            config,
            out,
            format,
            seed,
            skip,
            fail_under,
        }),
        Commands::Baseline { file, state, accept, out } => handle_baseline(&BaselineArgs {
            file,
            config,
            out,
            states: state,
            accept,
        }),
        Commands::Frames { trace } => handle_frames(&trace),
    }
}
