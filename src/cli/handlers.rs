// src/cli/handlers.rs
use crate::aggregate::{self, Aggregator, UxReport};
use crate::animation::FrameTrace;
use crate::artifact::ComponentArtifact;
use crate::cli::args::ReportFormat;
use crate::config::Config;
use crate::exit::UxExit;
use crate::types::Dimension;
use crate::visual::{StateComparison, VisualState};
use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    pub files: Vec<PathBuf>,
    pub config: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub format: ReportFormat,
    pub seed: Option<u64>,
    pub skip: Vec<String>,
    pub fail_under: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct BaselineArgs {
    pub file: PathBuf,
    pub config: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub states: Vec<String>,
    pub accept: bool,
}

fn load_config(path: Option<&Path>, out: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(p) => Config::load_from(p).with_context(|| format!("loading {}", p.display()))?,
        None => Config::load()?,
    };
    if let Some(dir) = out {
        config.output_dir = dir.to_path_buf();
    }
    Ok(config)
}

fn invalid(msg: &str) -> UxExit {
    eprintln!("{} {msg}", "Invalid input:".red().bold());
    UxExit::InvalidInput
}

fn load_artifacts(files: &[PathBuf]) -> std::result::Result<Vec<ComponentArtifact>, String> {
    files
        .iter()
        .map(|f| {
            if !f.is_file() {
                return Err(format!("{} is not a file", f.display()));
            }
            ComponentArtifact::from_path(f).map_err(|e| e.to_string())
        })
        .collect()
}

/// Handles the analyze command.
///
/// # Errors
/// Returns error if configuration or the worker pool is invalid, or output fails.
pub fn handle_analyze(args: &AnalyzeArgs) -> Result<UxExit> {
    let mut config = load_config(args.config.as_deref(), args.out.as_deref())?;
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    for name in &args.skip {
        match Dimension::from_name(name) {
            Some(d) => config.disable(d),
            None => return Ok(invalid(&format!("unknown dimension '{name}'"))),
        }
    }

    let artifacts = match load_artifacts(&args.files) {
        Ok(a) => a,
        Err(msg) => return Ok(invalid(&msg)),
    };

    let aggregator = Aggregator::new(config)?;
    let reports = aggregator.analyze_batch(&artifacts)?;
    print_reports(&reports, args.format)?;

    if let Some(floor) = args.fail_under {
        let failing: Vec<&UxReport> = reports.iter().filter(|r| r.score < floor).collect();
        if !failing.is_empty() {
            for r in &failing {
                eprintln!(
                    "{} {} scored {:.1}, below {floor:.1}",
                    "[!]".red().bold(),
                    r.component_id,
                    r.score
                );
            }
            return Ok(UxExit::CheckFailed);
        }
    }
    Ok(UxExit::Success)
}

fn print_reports(reports: &[UxReport], format: ReportFormat) -> Result<()> {
    match format {
        ReportFormat::Json => {
            let json = match reports {
                [single] => aggregate::to_json(single)?,
                many => serde_json::to_string_pretty(many)?,
            };
            println!("{json}");
        }
        ReportFormat::Terminal => {
            for (i, r) in reports.iter().enumerate() {
                if i > 0 {
                    println!("{}", "-".repeat(60));
                }
                aggregate::print_report(r);
            }
            if reports.len() > 1 {
                println!();
                print!("{}", aggregate::format_batch_summary(reports));
            }
        }
    }
    Ok(())
}

fn parse_states(names: &[String]) -> std::result::Result<Vec<VisualState>, String> {
    if names.is_empty() {
        return Ok(VisualState::ALL.to_vec());
    }
    names
        .iter()
        .map(|n| VisualState::from_name(n).ok_or_else(|| format!("unknown state '{n}'")))
        .collect()
}

/// Handles the baseline command.
///
/// # Errors
/// Returns error if rendering, image IO or baseline promotion fails.
pub fn handle_baseline(args: &BaselineArgs) -> Result<UxExit> {
    let states = match parse_states(&args.states) {
        Ok(s) => s,
        Err(msg) => return Ok(invalid(&msg)),
    };
    if !args.file.is_file() {
        return Ok(invalid(&format!("{} is not a file", args.file.display())));
    }

    let config = load_config(args.config.as_deref(), args.out.as_deref())?;
    let aggregator = Aggregator::new(config)?;
    let visual = aggregator.visual();
    let artifact = ComponentArtifact::from_path(&args.file)?;

    let comparisons = visual.compare_states(&artifact, &states)?;
    for c in &comparisons {
        print_comparison(c);
    }

    if args.accept {
        for c in comparisons.iter().filter(|c| c.changed || c.difference > 0.0) {
            let path = visual.accept_baseline(&artifact.component_id, c.state)?;
            println!("{} {} -> {}", "[+]".green(), c.state, path.display());
        }
        return Ok(UxExit::Success);
    }

    let regressions = visual.regression_issues(&comparisons);
    if regressions.is_empty() {
        Ok(UxExit::Success)
    } else {
        for issue in &regressions {
            eprintln!("{} {}: {}", "[!]".red().bold(), issue.title, issue.description);
        }
        Ok(UxExit::CheckFailed)
    }
}

fn print_comparison(c: &StateComparison) {
    let status = if c.baseline_created {
        "new".cyan().to_string()
    } else if c.changed {
        "changed".red().bold().to_string()
    } else if c.difference > 0.0 {
        "drift".yellow().to_string()
    } else {
        "same".green().to_string()
    };
    println!("  {:<8} {:<8} {:>6.2}%", c.state.slug(), status, c.difference * 100.0);
    if let Some(diff) = &c.diff_path {
        println!("  {} {}", "-->".blue(), diff.display());
    }
}

/// Handles the frames command.
///
/// # Errors
/// Returns error if the trace cannot be read or the summary cannot be serialized.
pub fn handle_frames(trace: &Path) -> Result<UxExit> {
    let text = fs::read_to_string(trace).with_context(|| format!("reading {}", trace.display()))?;
    match FrameTrace::parse(&text) {
        Ok(parsed) => {
            println!("{}", serde_json::to_string_pretty(&parsed)?);
            Ok(UxExit::Success)
        }
        Err(e) => Ok(invalid(&e.to_string())),
    }
}
