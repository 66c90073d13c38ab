//! Knockoff CLI Library
//!
//! Scenario file → headless tracker run → report (text or JSON)
//! Config / schema helpers for hosts authoring their own files

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use knockoff_core::tracking::horizontal_distance;
use knockoff_core::{
    config_schema, point, run_scenario, scenario_schema, Membership, ScenarioReport,
    ScenarioSpec, TrackerConfig,
};

/// Output encoding for reports and generated documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaKind {
    Config,
    Scenario,
}

/// Result of classifying a single point against configured bounds.
#[derive(Debug, Clone, Serialize)]
pub struct PointClassification {
    pub position: [f64; 3],
    pub membership: Membership,
    pub horizontal_distance: f64,
    pub radius: f64,
    pub fall_threshold: f64,
}

pub fn load_scenario(path: &Path) -> Result<ScenarioSpec> {
    ScenarioSpec::load_from_path(path)
        .with_context(|| format!("Failed to load scenario: {}", path.display()))
}

/// Load and run one scenario file.
pub fn run_scenario_file(path: &Path) -> Result<ScenarioReport> {
    let spec = load_scenario(path)?;
    let steps = spec.steps.len();
    log::info!("Running scenario '{}' ({} steps)", spec.id, steps);
    run_scenario(&spec).with_context(|| format!("Scenario '{}' could not run", spec.id))
}

pub fn load_config(path: Option<&Path>) -> Result<TrackerConfig> {
    match path {
        Some(path) => TrackerConfig::load_from_path(path)
            .with_context(|| format!("Failed to load config: {}", path.display())),
        None => Ok(TrackerConfig::default()),
    }
}

/// Classify `position` against the bounds described by `config`.
///
/// No platform object is available here, so auto-detection never applies.
pub fn classify_point(config: &TrackerConfig, position: [f64; 3]) -> Result<PointClassification> {
    let bounds = config.bounds()?;
    let p = point(position);
    Ok(PointClassification {
        position,
        membership: bounds.classify(&p),
        horizontal_distance: horizontal_distance(&p, &bounds.center()),
        radius: bounds.radius(),
        fall_threshold: bounds.fall_threshold(),
    })
}

pub fn render_report(report: &ScenarioReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
        OutputFormat::Text => Ok(render_report_text(report)),
    }
}

fn render_report_text(report: &ScenarioReport) -> String {
    let mut out = String::new();
    out.push_str(&format!("Scenario: {}\n", report.id));
    out.push_str(&format!(
        "  Ticks:     {} processed, {} skipped\n",
        report.ticks_processed, report.ticks_skipped
    ));
    out.push_str(&format!(
        "  Entities:  {} registered, {} tracked\n",
        report.stats.registered, report.stats.tracked
    ));
    out.push_str(&format!(
        "  Platform:  {} on, {} off\n",
        report.stats.on_platform, report.stats.off_platform
    ));
    out.push_str(&format!("  Won:       {}\n", report.stats.has_won));
    out.push_str("  Events:\n");
    for (kind, count) in &report.events_by_kind {
        out.push_str(&format!("    {}: {}\n", kind, count));
    }
    out.push_str(&format!("  Digest:    {}\n", report.event_digest));
    if report.passed() {
        out.push_str("  Result:    PASS\n");
    } else {
        out.push_str("  Result:    FAIL\n");
        for failure in &report.assertion_failures {
            out.push_str(&format!("    - {}\n", failure));
        }
    }
    out
}

pub fn render_classification(c: &PointClassification, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(c)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(c)?),
        OutputFormat::Text => Ok(format!(
            "({}, {}, {}) is {} (horizontal distance {:.3} / radius {:.3}, fall threshold {:.3})",
            c.position[0],
            c.position[1],
            c.position[2],
            match c.membership {
                Membership::OnPlatform => "on the platform",
                Membership::OffPlatform => "off the platform",
            },
            c.horizontal_distance,
            c.radius,
            c.fall_threshold
        )),
    }
}

/// Default configuration document. Text falls back to YAML.
pub fn default_config_text(format: OutputFormat) -> Result<String> {
    let config = TrackerConfig::default();
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(&config)?),
        OutputFormat::Yaml | OutputFormat::Text => Ok(serde_yaml::to_string(&config)?),
    }
}

pub fn schema_text(kind: SchemaKind) -> Result<String> {
    let schema = match kind {
        SchemaKind::Config => config_schema(),
        SchemaKind::Scenario => scenario_schema(),
    };
    Ok(serde_json::to_string_pretty(&schema)?)
}

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
    }
    fs::write(path, contents).with_context(|| format!("Failed to write: {}", path.display()))
}
