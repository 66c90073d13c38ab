//! Scripted headless sessions.
//!
//! A scenario stands in for the game scene: it declares the platform object,
//! the entities present at start, and a list of steps (ticks with positions,
//! spawns, destroys, restarts, scene reloads). Running it records every event
//! and checks the assertions at the end.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;

use crate::config::{is_yaml_path, TrackerConfig};
use crate::controller::{PlatformTracker, TrackerStats};
use crate::error::{Result, TrackerError};
use crate::tracking::{
    point, EntityId, EventKind, PlatformGeometry, PositionMap, TrackableEntity, TrackingEvent,
};

fn default_tracked() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioEntity {
    /// Explicit id; derived from `name` when absent.
    #[serde(default)]
    pub id: Option<EntityId>,
    pub name: String,
    #[serde(default = "default_tracked")]
    pub tracked: bool,
}

impl ScenarioEntity {
    fn to_entity(&self, tracker: &mut PlatformTracker) -> TrackableEntity {
        let id = match &self.id {
            Some(id) => id.clone(),
            None => tracker.allocate_id(&self.name),
        };
        let mut entity = TrackableEntity::new(id, self.name.clone());
        entity.is_tracked = self.tracked;
        entity
    }
}

pub type ScenarioPositions = BTreeMap<EntityId, [f64; 3]>;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// One host frame at `time` seconds.
    Tick {
        time: f64,
        #[serde(default)]
        positions: ScenarioPositions,
    },
    Spawn {
        entity: ScenarioEntity,
    },
    Destroy {
        id: EntityId,
    },
    Restart,
    /// Scene reload: re-register everything currently registered,
    /// classified from `positions`.
    Refresh {
        #[serde(default)]
        positions: ScenarioPositions,
    },
    SetTracked {
        id: EntityId,
        tracked: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioAssertion {
    pub event: EventKind,
    #[serde(default)]
    pub count_min: Option<u32>,
    #[serde(default)]
    pub count_max: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioStateAssertion {
    #[serde(default)]
    pub has_won: Option<bool>,
    #[serde(default)]
    pub on_platform: Option<usize>,
    #[serde(default)]
    pub off_platform: Option<usize>,
    #[serde(default)]
    pub tracked: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioSpec {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub config: TrackerConfig,
    /// The designated platform object, if the scene has one.
    #[serde(default)]
    pub platform: Option<PlatformGeometry>,
    #[serde(default)]
    pub entities: Vec<ScenarioEntity>,
    #[serde(default)]
    pub steps: Vec<ScenarioStep>,
    #[serde(default)]
    pub assertions: Vec<ScenarioAssertion>,
    #[serde(default)]
    pub state_assertions: Vec<ScenarioStateAssertion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub id: String,
    pub events_by_kind: BTreeMap<EventKind, usize>,
    pub events: Vec<TrackingEvent>,
    pub stats: TrackerStats,
    pub ticks_processed: usize,
    pub ticks_skipped: usize,
    pub assertion_failures: Vec<String>,
    /// SHA-256 (hex) of the JSON-encoded event log.
    pub event_digest: String,
}

impl ScenarioReport {
    pub fn passed(&self) -> bool {
        self.assertion_failures.is_empty()
    }
}

impl ScenarioSpec {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        if is_yaml_path(path) {
            Self::from_yaml_str(&raw)
        } else {
            Self::from_json_str(&raw)
        }
    }
}

fn to_position_map(positions: &ScenarioPositions) -> PositionMap {
    positions
        .iter()
        .map(|(id, p)| (id.clone(), point(*p)))
        .collect()
}

fn event_digest(events: &[TrackingEvent]) -> Result<String> {
    let bytes = serde_json::to_vec(events)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn run_scenario(spec: &ScenarioSpec) -> Result<ScenarioReport> {
    let (report, _tracker) = run_scenario_internal(spec)?;
    Ok(report)
}

/// Like [`run_scenario`] but also hands back the tracker in its final state.
pub fn run_scenario_with_tracker(
    spec: &ScenarioSpec,
) -> Result<(ScenarioReport, PlatformTracker)> {
    run_scenario_internal(spec)
}

fn run_scenario_internal(spec: &ScenarioSpec) -> Result<(ScenarioReport, PlatformTracker)> {
    let mut tracker = PlatformTracker::initialize(spec.config.clone(), &spec.platform)?;
    let (_, log) = tracker.subscribe_log();

    for entity in &spec.entities {
        let entity = entity.to_entity(&mut tracker);
        tracker.register(entity);
    }

    let mut ticks_processed = 0;
    let mut ticks_skipped = 0;

    for (index, step) in spec.steps.iter().enumerate() {
        match step {
            ScenarioStep::Tick { time, positions } => {
                if !time.is_finite() {
                    return Err(TrackerError::Scenario(format!(
                        "step {}: tick time must be finite, got {}",
                        index, time
                    )));
                }
                let report = tracker.tick(*time, &to_position_map(positions));
                if report.processed {
                    ticks_processed += 1;
                } else {
                    ticks_skipped += 1;
                }
            }
            ScenarioStep::Spawn { entity } => {
                let entity = entity.to_entity(&mut tracker);
                tracker.register(entity);
            }
            ScenarioStep::Destroy { id } => {
                tracker.unregister(id);
            }
            ScenarioStep::Restart => tracker.restart(),
            ScenarioStep::Refresh { positions } => {
                let current: Vec<TrackableEntity> =
                    tracker.registry().entities().cloned().collect();
                tracker.refresh(current, &to_position_map(positions));
            }
            ScenarioStep::SetTracked { id, tracked } => {
                tracker.set_tracked(id, *tracked);
            }
        }
    }

    let events = log.snapshot();
    let mut events_by_kind: BTreeMap<EventKind, usize> = BTreeMap::new();
    for event in &events {
        *events_by_kind.entry(event.kind()).or_insert(0) += 1;
    }

    let mut assertion_failures = Vec::new();
    for assertion in &spec.assertions {
        let min = assertion.count_min.unwrap_or(0) as usize;
        let max = assertion.count_max.map_or(usize::MAX, |m| m as usize);
        let count = events_by_kind.get(&assertion.event).copied().unwrap_or(0);
        if count < min || count > max {
            let max_label = match assertion.count_max {
                Some(m) => m.to_string(),
                None => "∞".to_string(),
            };
            assertion_failures.push(format!(
                "Event {:?} count {} outside [{}, {}]",
                assertion.event, count, min, max_label
            ));
        }
    }

    let stats = tracker.stats();
    for assertion in &spec.state_assertions {
        check_state(assertion, &stats, &mut assertion_failures);
    }

    let report = ScenarioReport {
        id: spec.id.clone(),
        event_digest: event_digest(&events)?,
        events_by_kind,
        events,
        stats,
        ticks_processed,
        ticks_skipped,
        assertion_failures,
    };
    Ok((report, tracker))
}

fn check_state(
    assertion: &ScenarioStateAssertion,
    stats: &TrackerStats,
    failures: &mut Vec<String>,
) {
    if let Some(expected) = assertion.has_won {
        if stats.has_won != expected {
            failures.push(format!(
                "has_won {} did not match expected {}",
                stats.has_won, expected
            ));
        }
    }
    let counts = [
        ("on_platform", assertion.on_platform, stats.on_platform),
        ("off_platform", assertion.off_platform, stats.off_platform),
        ("tracked", assertion.tracked, stats.tracked),
    ];
    for (label, expected, actual) in counts {
        if let Some(expected) = expected {
            if actual != expected {
                failures.push(format!(
                    "{} {} did not match expected {}",
                    label, actual, expected
                ));
            }
        }
    }
}

/// JSON Schema for [`TrackerConfig`] documents.
pub fn config_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(TrackerConfig)
}

/// JSON Schema for [`ScenarioSpec`] documents.
pub fn scenario_schema() -> schemars::schema::RootSchema {
    schemars::schema_for!(ScenarioSpec)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOCK_OFF: &str = r#"{
        "id": "knock_off_three",
        "config": { "platform": { "auto_detect_platform": false } },
        "entities": [
            { "id": "e1", "name": "Crate" },
            { "id": "e2", "name": "Crate" },
            { "id": "e3", "name": "Barrel" }
        ],
        "steps": [
            { "type": "tick", "time": 0.0,
              "positions": { "e1": [0, -6, 0], "e2": [15, 0, 0], "e3": [5, 0, 0] } },
            { "type": "tick", "time": 0.1,
              "positions": { "e1": [0, -6, 0], "e2": [15, 0, 0], "e3": [0, -9, 0] } },
            { "type": "tick", "time": 0.2,
              "positions": { "e1": [5, 0, 0], "e2": [15, 0, 0], "e3": [0, -9, 0] } }
        ],
        "assertions": [
            { "event": "win_condition_met", "count_min": 1, "count_max": 1 }
        ],
        "state_assertions": [ { "has_won": true, "on_platform": 1 } ]
    }"#;

    #[test]
    fn test_knock_off_scenario_passes() {
        let spec = ScenarioSpec::from_json_str(KNOCK_OFF).unwrap();
        let report = run_scenario(&spec).unwrap();
        assert!(report.passed(), "{:?}", report.assertion_failures);
        assert_eq!(report.ticks_processed, 3);
        assert_eq!(report.events_by_kind[&EventKind::EntityTransitioned], 4);
    }

    #[test]
    fn test_same_scenario_same_digest() {
        let spec = ScenarioSpec::from_json_str(KNOCK_OFF).unwrap();
        let a = run_scenario(&spec).unwrap();
        let b = run_scenario(&spec).unwrap();
        assert_eq!(a.event_digest, b.event_digest);
        assert_eq!(a.event_digest.len(), 64);
    }

    #[test]
    fn test_failed_assertions_are_reported() {
        let mut spec = ScenarioSpec::from_json_str(KNOCK_OFF).unwrap();
        spec.assertions.push(ScenarioAssertion {
            event: EventKind::WinConditionMet,
            count_min: Some(2),
            count_max: None,
        });
        spec.state_assertions.push(ScenarioStateAssertion {
            off_platform: Some(3),
            ..Default::default()
        });
        let report = run_scenario(&spec).unwrap();
        assert!(!report.passed());
        assert_eq!(report.assertion_failures.len(), 2);
    }

    #[test]
    fn test_yaml_scenario_with_restart_and_destroy() {
        let raw = r#"
id: restart_then_destroy
config:
  platform:
    auto_detect_platform: false
entities:
  - name: crate
  - name: crate
steps:
  - type: tick
    time: 0.0
    positions:
      crate_0: [0, -6, 0]
      crate_1: [0, -6, 0]
  - type: restart
  - type: destroy
    id: crate_1
  - type: tick
    time: 1.0
    positions:
      crate_0: [0, -6, 0]
"#;
        let spec = ScenarioSpec::from_yaml_str(raw).unwrap();
        let (report, tracker) = run_scenario_with_tracker(&spec).unwrap();
        assert_eq!(report.events_by_kind[&EventKind::WinConditionMet], 2);
        assert_eq!(tracker.tracked_count(), 1);
        assert!(tracker.has_won());
    }

    #[test]
    fn test_platform_object_from_scenario() {
        let raw = r#"{
            "id": "auto",
            "platform": { "position": [0, 0, 0],
                          "bounding_box": { "min": [-3, -1, -3], "max": [3, 0, 3] } },
            "entities": [ { "id": "a", "name": "A" } ],
            "steps": [ { "type": "tick", "time": 0, "positions": { "a": [4, 0, 0] } } ],
            "state_assertions": [ { "has_won": true } ]
        }"#;
        let spec = ScenarioSpec::from_json_str(raw).unwrap();
        let report = run_scenario(&spec).unwrap();
        assert!(report.passed(), "{:?}", report.assertion_failures);
    }

    #[test]
    fn test_refresh_and_set_tracked_steps() {
        let raw = r#"{
            "id": "reload",
            "config": { "platform": { "auto_detect_platform": false } },
            "entities": [ { "id": "a", "name": "A" }, { "id": "b", "name": "B" } ],
            "steps": [
                { "type": "set_tracked", "id": "b", "tracked": false },
                { "type": "refresh", "positions": { "a": [0, -20, 0] } }
            ],
            "state_assertions": [ { "has_won": true, "tracked": 1, "off_platform": 1 } ]
        }"#;
        let spec = ScenarioSpec::from_json_str(raw).unwrap();
        let report = run_scenario(&spec).unwrap();
        assert!(report.passed(), "{:?}", report.assertion_failures);
    }

    #[test]
    fn test_non_finite_time_rejected() {
        let mut spec = ScenarioSpec::from_json_str(KNOCK_OFF).unwrap();
        spec.steps.push(ScenarioStep::Tick {
            time: f64::NAN,
            positions: Default::default(),
        });
        let err = run_scenario(&spec).unwrap_err();
        assert!(matches!(err, TrackerError::Scenario(_)));
    }

    #[test]
    fn test_schemas_name_their_sections() {
        let config = serde_json::to_value(config_schema()).unwrap();
        assert!(config["properties"]["platform"].is_object());
        let scenario = serde_json::to_string(&scenario_schema()).unwrap();
        assert!(scenario.contains("state_assertions"));
        assert!(scenario.contains("set_tracked"));
    }

    #[test]
    fn test_invalid_scenario_config_is_fatal() {
        let raw = r#"{ "id": "bad", "config": { "platform": { "radius": 0 } } }"#;
        let spec = ScenarioSpec::from_json_str(raw).unwrap();
        assert!(run_scenario(&spec).unwrap_err().is_configuration());
    }
}
