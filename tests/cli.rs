// tests/cli.rs
//! Argument parsing and handler exit codes.

use anyhow::Result;
use clap::Parser;
use std::fs;
use tempfile::TempDir;
use ux_enhancer_core::cli::handlers::{handle_analyze, handle_frames, AnalyzeArgs};
use ux_enhancer_core::cli::{Cli, Commands, ReportFormat};
use ux_enhancer_core::exit::UxExit;

fn analyze_args(dir: &TempDir, file: &str) -> AnalyzeArgs {
    AnalyzeArgs {
        files: vec![dir.path().join(file)],
        config: None,
        out: Some(dir.path().join("out")),
        format: ReportFormat::Json,
        seed: Some(1),
        skip: Vec::new(),
        fail_under: None,
    }
}

#[test]
fn analyze_flags_parse() {
    let cli = Cli::try_parse_from([
        "ux-enhancer", "analyze", "a.html", "b.tsx", "--format", "json", "--skip", "visual", "--fail-under", "70",
    ])
    .expect("parse");
    let Some(Commands::Analyze { files, format, skip, fail_under, .. }) = cli.command else {
        panic!("expected analyze");
    };
    assert_eq!(files.len(), 2);
    assert_eq!(format, ReportFormat::Json);
    assert_eq!(skip, vec!["visual"]);
    assert_eq!(fail_under, Some(70.0));
}

#[test]
fn analyze_requires_files() {
    assert!(Cli::try_parse_from(["ux-enhancer", "analyze"]).is_err());
}

#[test]
fn missing_component_is_invalid_input() -> Result<()> {
    let dir = TempDir::new()?;
    assert_eq!(handle_analyze(&analyze_args(&dir, "Nope.html"))?, UxExit::InvalidInput);
    Ok(())
}

#[test]
fn unknown_dimension_is_invalid_input() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("A.html"), "<p>hi</p>")?;
    let mut args = analyze_args(&dir, "A.html");
    args.skip = vec!["sparkle".to_string()];
    assert_eq!(handle_analyze(&args)?, UxExit::InvalidInput);
    Ok(())
}

#[test]
fn fail_under_gates_the_exit_code() -> Result<()> {
    let dir = TempDir::new()?;
    fs::write(dir.path().join("Bad.html"), r#"<img src="x.png"><button></button><input><input>"#)?;
    let mut args = analyze_args(&dir, "Bad.html");
    assert_eq!(handle_analyze(&args)?, UxExit::Success);
    args.fail_under = Some(100.0);
    assert_eq!(handle_analyze(&args)?, UxExit::CheckFailed);
    Ok(())
}

#[test]
fn frames_command_validates_trace() -> Result<()> {
    let dir = TempDir::new()?;
    let good = dir.path().join("good.txt");
    let bad = dir.path().join("bad.txt");
    fs::write(&good, "0 16.7 33.4")?;
    fs::write(&bad, "0 sixteen")?;
    assert_eq!(handle_frames(&good)?, UxExit::Success);
    assert_eq!(handle_frames(&bad)?, UxExit::InvalidInput);
    Ok(())
}
