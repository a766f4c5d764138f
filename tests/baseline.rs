// tests/baseline.rs
//! Visual state baselines on disk.

use anyhow::Result;
use std::fs;
use tempfile::TempDir;
use ux_enhancer_core::visual::VisualState;
use ux_enhancer_core::{Aggregator, ComponentArtifact, Config, Severity};

fn setup(style: &str) -> Result<(TempDir, Aggregator, ComponentArtifact)> {
    let dir = TempDir::new()?;
    let mut config = Config::default();
    config.output_dir = dir.path().join("out");
    config.visual.baseline_dir = Some(dir.path().join("accepted"));
    let agg = Aggregator::new(config)?;
    let artifact = ComponentArtifact::new("cta")
        .with_markup(r#"<button class="cta">Buy now</button>"#)
        .with_style(style.to_string());
    Ok((dir, agg, artifact))
}

#[test]
fn first_run_seeds_baselines() -> Result<()> {
    let (dir, agg, artifact) = setup(".cta { background: #ffffff; }")?;
    let results = agg.visual().compare_states(&artifact, &[VisualState::Default, VisualState::Hover])?;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.baseline_created));
    assert!(dir.path().join("accepted").join("cta").join("default.png").exists());
    assert!(dir.path().join("out").join("visual").join("snapshots").join("cta").join("hover.png").exists());
    Ok(())
}

#[test]
fn restyled_component_regresses_until_accepted() -> Result<()> {
    let (dir, agg, artifact) = setup(".cta { background: #ffffff; width: 600px; height: 300px; }")?;
    agg.visual().compare_states(&artifact, &[VisualState::Default])?;

    let restyled = artifact.clone().with_style(".cta { background: #000000; width: 600px; height: 300px; }");
    let results = agg.visual().compare_states(&restyled, &[VisualState::Default])?;
    let default = &results[0];
    assert!(default.changed);
    assert!(default.difference > 0.1);
    let diff = default.diff_path.as_ref().expect("diff written");
    assert!(diff.starts_with(dir.path().join("out")));
    assert!(fs::metadata(diff)?.len() > 0);

    let issues = agg.visual().regression_issues(&results);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].id, "visual-regression-default");
    assert_eq!(issues[0].severity, Severity::Warning);

    agg.visual().accept_baseline("cta", VisualState::Default)?;
    let again = agg.visual().compare_states(&restyled, &[VisualState::Default])?;
    assert!(!again[0].changed);
    assert!(again[0].difference.abs() < f64::EPSILON);
    Ok(())
}
