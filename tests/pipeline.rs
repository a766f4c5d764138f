// tests/pipeline.rs
//! Aggregator behavior: failure isolation, bounds, determinism, batching.

use anyhow::Result;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use ux_enhancer_core::cognitive::CognitiveLoadSimulator;
use ux_enhancer_core::config::CognitiveConfig;
use ux_enhancer_core::types::penalty_score;
use ux_enhancer_core::{Aggregator, ComponentArtifact, Config, Dimension, Issue, Severity, Source};

const FORM: &str = r#"<form class="card"><label for="e">Email</label><input id="e" type="email"><button>Save</button></form>"#;
const STYLE: &str = ".card { padding: 16px; color: #333333; transition: opacity 200ms; }";

fn aggregator(dir: &TempDir, seed: u64) -> Result<Aggregator> {
    let mut config = Config::default();
    config.output_dir = dir.path().join("out");
    config.seed = Some(seed);
    Ok(Aggregator::new(config)?)
}

#[test]
fn unreadable_style_degrades_only_its_readers() -> Result<()> {
    let dir = TempDir::new()?;
    let artifact = ComponentArtifact::new("broken")
        .with_markup(FORM)
        .with_style(Source::File(PathBuf::from("does/not/exist.css")));
    let report = aggregator(&dir, 1)?.analyze(&artifact);

    let tokens = report.tokens.as_ref().expect("tokens ran");
    assert!(tokens.failed());
    assert!(tokens.score.abs() < f64::EPSILON);
    assert_eq!(tokens.issues.len(), 1);
    assert_eq!(tokens.issues[0].id, "tokens-error");
    assert_eq!(tokens.issues[0].severity, Severity::Error);

    let cognitive = report.dimension(Dimension::CognitiveLoad).expect("cognitive ran");
    let alone = CognitiveLoadSimulator::new(CognitiveConfig::default()).analyze_cognitive_load(FORM, "broken");
    assert!(!cognitive.failed);
    assert!((cognitive.score - alone.score).abs() < 1e-9);

    assert!(report.score < 100.0);
    Ok(())
}

#[test]
fn every_score_is_bounded() -> Result<()> {
    let dir = TempDir::new()?;
    let agg = aggregator(&dir, 3)?;
    let heavy_style = (0..40)
        .map(|i| format!(".c{i} {{ color: #{:06X}; margin: {i}px; animation: a{i} {}ms; }}", i * 4099, 500 + i * 300))
        .collect::<String>();
    let heavy_markup = "<div><img src=x><button></button><input><select><option>a</option></select></div>".repeat(20);
    let cases = [
        ComponentArtifact::new("empty"),
        ComponentArtifact::new("text").with_markup("<p>hello</p>"),
        ComponentArtifact::new("heavy").with_markup(heavy_markup).with_style(heavy_style),
        ComponentArtifact::new("garbage").with_markup("<<<>>>").with_style("}{;;:").with_script("requestAnimationFrame("),
    ];
    for artifact in &cases {
        let r = agg.analyze(artifact);
        assert!((0.0..=100.0).contains(&r.score), "{}: {}", r.component_id, r.score);
        assert!((0.0..=100.0).contains(&r.issue_score));
        for d in &r.dimensions {
            assert!((0.0..=100.0).contains(&d.score), "{:?}: {}", d.dimension, d.score);
        }
    }
    Ok(())
}

#[test]
fn deeply_nested_markup_stays_inside_each_analyzer() -> Result<()> {
    let dir = TempDir::new()?;
    let agg = aggregator(&dir, 5)?;
    let deep = ComponentArtifact::new("deep").with_markup(format!("{}<button>Go</button>", "<div>".repeat(10_000)));
    let flat = ComponentArtifact::new("flat").with_markup("<button>Go</button>");

    let reports = agg.analyze_batch(&[deep, flat])?;
    assert_eq!(reports.len(), 2);
    for r in &reports {
        assert!(r.dimensions.iter().all(|d| !d.failed), "{}", r.component_id);
    }
    let visual = reports[0].visual.as_ref().expect("visual ran");
    assert!(visual.issues.iter().any(|i| i.id == "visual-nesting-depth" && i.severity == Severity::High));
    Ok(())
}

#[test]
fn seeded_runs_are_identical() -> Result<()> {
    let dir = TempDir::new()?;
    let artifact = ComponentArtifact::new("det").with_markup(FORM).with_style(STYLE);
    let a = aggregator(&dir, 99)?.analyze(&artifact);
    let b = aggregator(&dir, 99)?.analyze(&artifact);

    assert!((a.score - b.score).abs() < f64::EPSILON);
    let ids = |r: &ux_enhancer_core::UxReport| r.issues.iter().map(|i| i.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&a), ids(&b));
    for (x, y) in a.dimensions.iter().zip(&b.dimensions) {
        assert!((x.score - y.score).abs() < f64::EPSILON);
    }
    Ok(())
}

#[test]
fn batch_preserves_input_order() -> Result<()> {
    let dir = TempDir::new()?;
    let artifacts: Vec<ComponentArtifact> = (0..8)
        .map(|i| ComponentArtifact::new(format!("c{i}")).with_markup(format!("<button>Action {i}</button>")))
        .collect();
    let reports = aggregator(&dir, 5)?.analyze_batch(&artifacts)?;
    let ids: Vec<&str> = reports.iter().map(|r| r.component_id.as_str()).collect();
    assert_eq!(ids, vec!["c0", "c1", "c2", "c3", "c4", "c5", "c6", "c7"]);
    Ok(())
}

#[test]
fn component_file_picks_up_sibling_stylesheet() -> Result<()> {
    let dir = TempDir::new()?;
    let html = dir.path().join("Card.html");
    fs::write(&html, FORM)?;
    fs::write(dir.path().join("Card.module.css"), STYLE)?;
    fs::write(dir.path().join("Other.css"), "a { color: red; }")?;

    let artifact = ComponentArtifact::from_path(&html)?;
    assert_eq!(artifact.component_id, "Card");
    let report = aggregator(&dir, 2)?.analyze(&artifact);
    assert_eq!(report.dimensions.len(), 4);
    assert!(report.tokens.as_ref().is_some_and(|t| !t.failed()));
    assert!(dir.path().join("out").join("reports").join("Card.json").exists());
    Ok(())
}

#[test]
fn harsher_severity_never_scores_higher() {
    let issue = |s: Severity| Issue::new("x", "x", "x", s);
    let ladder = [Severity::Info, Severity::Warning, Severity::Error, Severity::Critical];
    for pair in ladder.windows(2) {
        let base = vec![issue(Severity::Warning), issue(pair[0])];
        let worse = vec![issue(Severity::Warning), issue(pair[1])];
        assert!(penalty_score(&worse) <= penalty_score(&base));
    }
}
