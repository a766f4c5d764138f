// src/visual/mod.rs
//! Visual analyzer: renders a component, audits the rendered boxes, scores
//! accessibility and responsiveness, and diffs per-state screenshots against
//! accepted baselines.

pub mod audit;
pub mod baseline;
pub mod browser;
pub mod style;

pub use self::baseline::StateComparison;
pub use self::browser::{Browser, PageRequest, RenderedPage, StaticBrowser, Viewport, MAX_LAYOUT_DEPTH};

use crate::analyzer::{load_optional, Analyzer};
use crate::artifact::{sanitize_id, ComponentArtifact};
use crate::config::VisualConfig;
use crate::error::{Result, UxError};
use crate::output;
use crate::types::{clamp_score, Dimension, Issue, Scored, Severity};
use audit::Findings;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Interaction state a page is rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisualState {
    #[default]
    Default,
    Hover,
    Active,
    Focus,
}

impl VisualState {
    pub const ALL: [VisualState; 4] = [Self::Default, Self::Hover, Self::Active, Self::Focus];

    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Hover => "hover",
            Self::Active => "active",
            Self::Focus => "focus",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.slug().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for VisualState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualMetrics {
    pub accessibility_score: f64,
    pub accessibility_violations: usize,
    pub layout_shifts: usize,
    pub overflow_ratio: f64,
    pub responsive_ratio: f64,
    pub element_count: usize,
    pub layout_score: f64,
    pub overflow_score: f64,
    pub responsive_score: f64,
    pub viewports: Vec<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_path: Option<PathBuf>,
}

const MAX_LISTED: usize = 5;

/// Stack for render workers; layout recursion is bounded by [`MAX_LAYOUT_DEPTH`].
const RENDER_STACK_BYTES: usize = 8 * 1024 * 1024;

/// Render workers one analyzer keeps alive at once, abandoned ones included.
pub const MAX_LIVE_RENDERS: usize = 8;

/// Counts a live render worker until dropped.
struct LiveRender(Arc<AtomicUsize>);

impl LiveRender {
    fn acquire(live: &Arc<AtomicUsize>) -> Option<Self> {
        live.fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| (n < MAX_LIVE_RENDERS).then_some(n + 1))
            .ok()
            .map(|_| Self(Arc::clone(live)))
    }
}

impl Drop for LiveRender {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

pub struct VisualAnalyzer {
    config: VisualConfig,
    output_dir: Option<PathBuf>,
    baseline_dir: Option<PathBuf>,
    timeout: Duration,
    browser: Arc<dyn Browser>,
    live_renders: Arc<AtomicUsize>,
}

impl VisualAnalyzer {
    /// Analyzer backed by [`StaticBrowser`] with a 30s render timeout.
    #[must_use]
    pub fn new(config: VisualConfig) -> Self {
        let baseline_dir = config.baseline_dir.clone();
        Self {
            config,
            output_dir: None,
            baseline_dir,
            timeout: Duration::from_secs(30),
            browser: Arc::new(StaticBrowser),
            live_renders: Arc::new(AtomicUsize::new(0)),
        }
    }

    #[must_use]
    pub fn with_browser(mut self, browser: Arc<dyn Browser>) -> Self {
        self.browser = browser;
        self
    }

    /// Directory receiving snapshots and diffs.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_baseline_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.baseline_dir = Some(dir.into());
        self
    }

    fn require_output_dir(&self) -> Result<&Path> {
        self.output_dir
            .as_deref()
            .ok_or_else(|| UxError::Config("visual analyzer has no output directory".to_string()))
    }

    fn baseline_root(&self) -> Result<PathBuf> {
        match &self.baseline_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(self.require_output_dir()?.join("baselines")),
        }
    }

    fn viewports(&self) -> Vec<Viewport> {
        self.config
            .viewports
            .iter()
            .map(|&width| Viewport { width, height: self.config.viewport_height })
            .collect()
    }

    /// Renders one page per request on a worker thread, bounded by the timeout.
    ///
    /// A worker that outlives the timeout cannot be stopped. It keeps running
    /// until the browser returns and still counts toward [`MAX_LIVE_RENDERS`];
    /// past that limit renders fail fast instead of spawning more threads.
    fn render_all(&self, requests: Vec<PageRequest>) -> Result<Vec<RenderedPage>> {
        let live = LiveRender::acquire(&self.live_renders).ok_or_else(|| {
            UxError::Render(format!("{MAX_LIVE_RENDERS} renders are still running"))
        })?;
        let (tx, rx) = mpsc::channel();
        let browser = Arc::clone(&self.browser);
        thread::Builder::new()
            .name("ux-render".to_string())
            .stack_size(RENDER_STACK_BYTES)
            .spawn(move || {
                let _live = live;
                let pages: Result<Vec<RenderedPage>> = requests.iter().map(|r| browser.render(r)).collect();
                // Receiver is gone once the caller timed out.
                let _ = tx.send(pages);
            })
            .map_err(|e| UxError::Render(format!("cannot start render worker: {e}")))?;

        match rx.recv_timeout(self.timeout) {
            Ok(pages) => pages,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                let ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(timeout_ms = ms, "render timed out");
                Err(UxError::Timeout { ms })
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(UxError::Render("render worker exited without a result".to_string()))
            }
        }
    }

    fn render_viewports(&self, markup: &str, style: &str, state: VisualState) -> Result<Vec<RenderedPage>> {
        let requests = self
            .viewports()
            .into_iter()
            .map(|viewport| PageRequest {
                markup: markup.to_string(),
                style: style.to_string(),
                viewport,
                state,
            })
            .collect();
        self.render_all(requests)
    }

    fn render_first(&self, markup: &str, style: &str, state: VisualState) -> Result<RenderedPage> {
        let viewport = self
            .viewports()
            .into_iter()
            .next()
            .ok_or_else(|| UxError::Config("no viewports configured".to_string()))?;
        let request = PageRequest { markup: markup.to_string(), style: style.to_string(), viewport, state };
        self.render_all(vec![request])?
            .pop()
            .ok_or_else(|| UxError::Render("renderer returned no page".to_string()))
    }

    fn snapshot_path(&self, component_id: &str) -> Result<PathBuf> {
        Ok(self
            .require_output_dir()?
            .join("snapshots")
            .join(format!("{}.png", sanitize_id(component_id))))
    }

    /// Renders at the first viewport and writes `snapshots/<id>.png`.
    ///
    /// # Errors
    /// Returns error if no output directory is set, or rendering or writing fails.
    pub fn capture_visual_snapshot(&self, markup: &str, style: &str, component_id: &str) -> Result<PathBuf> {
        let page = self.render_first(markup, style, VisualState::Default)?;
        let path = self.snapshot_path(component_id)?;
        output::write_png(&path, &page.screenshot)?;
        info!(component = component_id, path = %path.display(), "captured snapshot");
        Ok(path)
    }

    /// Renders at every configured viewport, audits, and scores.
    ///
    /// # Errors
    /// Returns error if rendering fails or times out, or the snapshot cannot be written.
    pub fn analyze_component(&self, markup: &str, style: &str, component_id: &str) -> Result<Scored<VisualMetrics>> {
        let pages = self.render_viewports(markup, style, VisualState::Default)?;
        let findings = audit::audit(&pages, self.config.fixed_width_limit_px);
        let layout_shifts = audit::total_layout_shifts(&pages, self.config.layout_shift_px);
        let element_count = pages.first().map_or(0, |p| p.elements.len());
        let depth_limited = pages.first().and_then(|p| p.depth_limited);
        debug!(component = component_id, element_count, layout_shifts, ?depth_limited, "visual audit finished");

        let snapshot_path = match (&self.output_dir, pages.first()) {
            (Some(_), Some(first)) => {
                let path = self.snapshot_path(component_id)?;
                output::write_png(&path, &first.screenshot)?;
                Some(path)
            }
            _ => None,
        };

        let mut metrics = score_metrics(&findings, layout_shifts, element_count);
        metrics.viewports = self.config.viewports.clone();
        metrics.snapshot_path = snapshot_path;

        let mut issues = issues(&findings, self.config.fixed_width_limit_px);
        if let Some(depth) = depth_limited {
            warn!(component = component_id, depth, "markup nesting exceeds layout limit");
            issues.push(nesting_issue(depth));
        }

        Ok(Scored {
            score: overall(&metrics),
            issues,
            metrics,
        })
    }

    /// Renders each state, compares it with its baseline and writes diffs.
    /// Missing baselines are created from the current snapshot.
    ///
    /// # Errors
    /// Returns error if sources cannot be loaded, no output directory is set,
    /// or rendering or image IO fails.
    pub fn compare_states(&self, artifact: &ComponentArtifact, states: &[VisualState]) -> Result<Vec<StateComparison>> {
        let markup = load_optional(artifact.markup.as_ref())?;
        let style = load_optional(artifact.style.as_ref())?;
        let markup = markup.as_deref().unwrap_or("");
        let style = style.as_deref().unwrap_or("");

        let out = self.require_output_dir()?;
        let baselines = self.baseline_root()?;
        let id = sanitize_id(&artifact.component_id);

        states
            .iter()
            .map(|&state| {
                let page = self.render_first(markup, style, state)?;
                let file = format!("{}.png", state.slug());
                let snapshot = out.join("snapshots").join(&id).join(&file);
                output::write_png(&snapshot, &page.screenshot)?;
                baseline::compare(
                    state,
                    &snapshot,
                    &baselines.join(&id).join(&file),
                    &out.join("diffs").join(&id).join(&file),
                    self.config.diff_threshold,
                    self.config.pixel_tolerance,
                )
            })
            .collect()
    }

    /// Promotes the latest state snapshot to the baseline store.
    ///
    /// # Errors
    /// Returns error if no snapshot exists for the state or the copy fails.
    pub fn accept_baseline(&self, component_id: &str, state: VisualState) -> Result<PathBuf> {
        let id = sanitize_id(component_id);
        let file = format!("{}.png", state.slug());
        let snapshot = self.require_output_dir()?.join("snapshots").join(&id).join(&file);
        let target = self.baseline_root()?.join(&id).join(&file);
        baseline::copy_file(&snapshot, &target)?;
        info!(component = component_id, %state, "accepted baseline");
        Ok(target)
    }

    /// Issues for states whose difference exceeds the configured threshold.
    #[must_use]
    pub fn regression_issues(&self, comparisons: &[StateComparison]) -> Vec<Issue> {
        baseline::regression_issues(comparisons, self.config.diff_threshold)
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

#[allow(clippy::cast_precision_loss)]
fn score_metrics(findings: &Findings, layout_shifts: usize, element_count: usize) -> VisualMetrics {
    let violations = findings.accessibility_violations();
    let overflow_ratio = ratio(findings.overflowing.len(), element_count);
    let responsive_ratio = ratio(findings.fixed_width.len(), element_count);
    VisualMetrics {
        accessibility_score: clamp_score(100.0 - violations as f64 * 10.0),
        accessibility_violations: violations,
        layout_shifts,
        overflow_ratio,
        responsive_ratio,
        element_count,
        layout_score: clamp_score(100.0 - layout_shifts as f64 * 20.0),
        overflow_score: clamp_score(100.0 - overflow_ratio * 100.0),
        responsive_score: clamp_score(100.0 - responsive_ratio * 100.0),
        viewports: Vec::new(),
        snapshot_path: None,
    }
}

fn overall(m: &VisualMetrics) -> f64 {
    0.5 * m.accessibility_score + 0.2 * m.layout_score + 0.15 * m.overflow_score + 0.15 * m.responsive_score
}

fn listed(elements: &[String]) -> String {
    let mut text = elements.iter().take(MAX_LISTED).cloned().collect::<Vec<_>>().join(", ");
    if elements.len() > MAX_LISTED {
        text.push_str(&format!(" and {} more", elements.len() - MAX_LISTED));
    }
    text
}

fn issues(f: &Findings, fixed_width_limit: f64) -> Vec<Issue> {
    let mut out = Vec::new();
    let mut rule = |elements: &[String], id: &str, title: &str, what: &str, severity: Severity, fix: &str| {
        if let Some(first) = elements.first() {
            out.push(
                Issue::new(id, title, format!("{} element(s) {what}: {}", elements.len(), listed(elements)), severity)
                    .recommend(fix)
                    .with_selector(first.clone()),
            );
        }
    };

    rule(
        &f.missing_alt,
        "visual-missing-alt",
        "Images without alt text",
        "have no alt attribute",
        Severity::Critical,
        "Add descriptive alt text, or alt=\"\" for decorative images",
    );
    rule(
        &f.empty_buttons,
        "visual-empty-button",
        "Buttons without an accessible name",
        "have no text or aria-label",
        Severity::Critical,
        "Give every button visible text or an aria-label",
    );
    rule(
        &f.low_contrast,
        "visual-low-contrast",
        "Text invisible against its background",
        "use the same color for text and background",
        Severity::High,
        "Ensure text meets a 4.5:1 contrast ratio against its background",
    );
    rule(
        &f.overflowing,
        "visual-overflow",
        "Content overflows its container",
        "overflow their box or the viewport",
        Severity::Medium,
        "Use max-width: 100% and let content wrap at narrow widths",
    );
    rule(
        &f.fixed_width,
        "visual-fixed-width",
        "Fixed widths break responsive layout",
        &format!("have fixed pixel widths above {fixed_width_limit}px"),
        Severity::Medium,
        "Prefer relative widths or max-width over fixed pixel widths",
    );
    out
}

fn nesting_issue(depth: usize) -> Issue {
    Issue::new(
        "visual-nesting-depth",
        "Markup nested too deeply",
        format!("Elements nest {depth} levels deep; only the first {MAX_LAYOUT_DEPTH} levels were laid out and audited"),
        Severity::High,
    )
    .recommend("Flatten wrapper elements; deep trees slow layout and confuse assistive technology")
}

impl Analyzer for VisualAnalyzer {
    type Metrics = VisualMetrics;

    fn dimension(&self) -> Dimension {
        Dimension::Visual
    }

    fn applies_to(&self, artifact: &ComponentArtifact) -> bool {
        artifact.markup.is_some()
    }

    fn evaluate(&self, artifact: &ComponentArtifact) -> Result<Scored<VisualMetrics>> {
        let markup = load_optional(artifact.markup.as_ref())?;
        let style = load_optional(artifact.style.as_ref())?;
        self.analyze_component(
            markup.as_deref().unwrap_or(""),
            style.as_deref().unwrap_or(""),
            &artifact.component_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    struct Stalled;

    impl Browser for Stalled {
        fn render(&self, _: &PageRequest) -> Result<RenderedPage> {
            thread::sleep(Duration::from_millis(500));
            Err(UxError::Render("unreachable".to_string()))
        }
    }

    struct Broken;

    impl Browser for Broken {
        fn render(&self, _: &PageRequest) -> Result<RenderedPage> {
            Err(UxError::Render("navigation failed".to_string()))
        }
    }

    fn analyzer() -> VisualAnalyzer {
        VisualAnalyzer::new(VisualConfig::default())
    }

    #[test]
    fn clean_component_scores_full() {
        let r = analyzer()
            .analyze_component(r#"<main><h1>Title</h1><p>Body text</p><img src="a.png" alt="A"></main>"#, "", "c")
            .unwrap();
        assert!(r.issues.is_empty(), "{:?}", r.issues);
        assert!((r.score - 100.0).abs() < 1e-9);
        assert!(r.metrics.snapshot_path.is_none());
    }

    #[test]
    fn missing_alt_and_empty_button_are_critical() {
        let r = analyzer().analyze_component(r#"<img src="a.png"><button></button>"#, "", "c").unwrap();
        let ids: Vec<&str> = r.issues.iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["visual-missing-alt", "visual-empty-button"]);
        assert!(r.issues.iter().all(|i| i.severity == Severity::Critical));
        assert_eq!(r.metrics.accessibility_violations, 2);
        assert!((r.metrics.accessibility_score - 80.0).abs() < 1e-9);
        assert!(r.score < 100.0);
    }

    #[test]
    fn fixed_width_hero_is_flagged() {
        let r = analyzer()
            .analyze_component(r#"<div class="hero">Hi</div>"#, ".hero { width: 640px; }", "c")
            .unwrap();
        let ids: Vec<&str> = r.issues.iter().map(|i| i.id.as_str()).collect();
        assert!(ids.contains(&"visual-overflow"));
        assert!(ids.contains(&"visual-fixed-width"));
        assert!(r.metrics.responsive_ratio > 0.0);
    }

    #[test]
    fn snapshot_is_written_under_output_dir() {
        let dir = tempdir().unwrap();
        let a = analyzer().with_output_dir(dir.path());
        let path = a.capture_visual_snapshot("<p>Hello</p>", "", "My Card").unwrap();
        assert_eq!(path, dir.path().join("snapshots").join("My_Card.png"));
        assert!(path.exists());
    }

    #[test]
    fn capture_without_output_dir_is_a_config_error() {
        let err = analyzer().capture_visual_snapshot("<p></p>", "", "c").unwrap_err();
        assert!(matches!(err, UxError::Config(_)));
    }

    #[test]
    fn slow_browser_times_out_into_error_issue() {
        let a = analyzer().with_browser(Arc::new(Stalled)).with_timeout(Duration::from_millis(20));
        let r = a.analyze(&ComponentArtifact::new("c").with_markup("<p>x</p>"));
        assert!(r.failed());
        assert_eq!(r.issues[0].id, "visual-error");
        assert!(r.issues[0].description.contains("20"));
    }

    #[test]
    fn abandoned_renders_are_capped() {
        let a = analyzer().with_browser(Arc::new(Stalled)).with_timeout(Duration::from_millis(1));
        let artifact = ComponentArtifact::new("c").with_markup("<p>x</p>");
        for _ in 0..MAX_LIVE_RENDERS {
            assert!(a.analyze(&artifact).failed());
        }
        let r = a.analyze(&artifact);
        assert!(r.issues[0].description.contains("still running"), "{}", r.issues[0].description);

        thread::sleep(Duration::from_millis(2500));
        let r = a.analyze(&artifact);
        assert!(!r.issues[0].description.contains("still running"));
    }

    #[test]
    fn ten_thousand_nested_divs_degrade_to_an_issue() {
        let r = analyzer().analyze(&ComponentArtifact::new("deep").with_markup("<div>".repeat(10_000)));
        assert!(!r.failed());
        let issue = r.issues.iter().find(|i| i.id == "visual-nesting-depth").unwrap();
        assert_eq!(issue.severity, Severity::High);
        assert!(issue.description.contains("10000"));
        assert_eq!(r.metrics.as_ref().map(|m| m.element_count), Some(MAX_LAYOUT_DEPTH));
    }

    #[test]
    fn broken_browser_degrades() {
        let r = analyzer()
            .with_browser(Arc::new(Broken))
            .analyze(&ComponentArtifact::new("c").with_markup("<p>x</p>"));
        assert!(r.failed());
        assert!(r.issues[0].description.contains("navigation failed"));
    }

    #[test]
    fn states_create_then_match_baselines() {
        let dir = tempdir().unwrap();
        let a = analyzer().with_output_dir(dir.path());
        let artifact = ComponentArtifact::new("btn")
            .with_markup(r#"<button class="b">Go</button>"#)
            .with_style(".b { background: #fff; } .b:hover { background: #000; }");

        let first = a.compare_states(&artifact, &VisualState::ALL).unwrap();
        assert!(first.iter().all(|c| c.baseline_created));
        assert!(dir.path().join("baselines").join("btn").join("hover.png").exists());

        let second = a.compare_states(&artifact, &VisualState::ALL).unwrap();
        assert!(second.iter().all(|c| !c.baseline_created && !c.changed));
        assert!(a.regression_issues(&second).is_empty());
    }

    #[test]
    fn accept_baseline_requires_snapshot() {
        let dir = tempdir().unwrap();
        let a = analyzer().with_output_dir(dir.path());
        assert!(a.accept_baseline("missing", VisualState::Hover).is_err());
    }

    #[test]
    fn state_names_parse() {
        assert_eq!(VisualState::from_name("Hover"), Some(VisualState::Hover));
        assert_eq!(VisualState::from_name("pressed"), None);
    }
}
