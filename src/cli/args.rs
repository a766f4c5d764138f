use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ux-enhancer",
    version,
    about = "Scores UI components for visual, animation, cognitive-load and design-token quality"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Config file (defaults to ./ux-enhancer.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Debug logging on stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    #[default]
    Terminal,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze component files and report a score per component
    Analyze {
        /// Component files (.html, .tsx, .jsx, .vue); sibling stylesheets are picked up
        #[arg(required = true, value_name = "FILES")]
        files: Vec<PathBuf>,
        /// Output directory for reports, snapshots and baselines
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = ReportFormat::Terminal)]
        format: ReportFormat,
        /// Seed for the frame simulation
        #[arg(long)]
        seed: Option<u64>,
        /// Skip a dimension (visual, animation, cognitive, tokens)
        #[arg(long, value_name = "DIM")]
        skip: Vec<String>,
        /// Exit with code 6 if any component scores below this
        #[arg(long, value_name = "SCORE")]
        fail_under: Option<f64>,
    },
    /// Compare per-state snapshots of a component against accepted baselines
    Baseline {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// State to render (default, hover, active, focus); repeatable, defaults to all
        #[arg(long, value_name = "STATE")]
        state: Vec<String>,
        /// Promote the current snapshots to baselines
        #[arg(long)]
        accept: bool,
        #[arg(long, value_name = "DIR")]
        out: Option<PathBuf>,
    },
    /// Summarize a recorded frame-timestamp trace
    Frames {
        #[arg(value_name = "TRACE_FILE")]
        trace: PathBuf,
    },
}
