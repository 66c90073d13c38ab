//! # knockoff_core - Platform Membership Tracking and Win Condition Engine
//!
//! Tracks which objects are still on a circular platform, reports when they
//! fall off or climb back, and fires a one-shot win event once every tracked
//! object has been knocked off.
//!
//! ## Features
//! - Pure, deterministic classification (horizontal radius + fall threshold)
//! - Optional platform auto-detection from the scene's platform object
//! - Throttled evaluation driven by the host clock
//! - Scripted headless scenarios with event digests for regression checks
//!
//! ```rust
//! use knockoff_core::{PlatformTracker, PositionMap, Point3, TrackerConfig};
//!
//! let mut tracker =
//!     PlatformTracker::new(TrackerConfig::manual_bounds(Point3::origin(), 10.0, -5.0)).unwrap();
//! let crate_id = tracker.spawn("crate");
//!
//! let mut positions = PositionMap::new();
//! positions.insert(crate_id, Point3::new(0.0, -6.0, 0.0));
//! assert!(tracker.tick(0.0, &positions).won);
//! ```

// Struct initialization pattern used intentionally
#![allow(clippy::field_reassign_with_default)]

pub mod config;
pub mod controller;
pub mod error;
pub mod scenario;
pub mod shared;
pub mod tracking;

pub use config::{PlatformConfig, TrackerConfig, TrackingConfig, WinConfig};
pub use controller::{PlatformTracker, TrackerStats};
pub use error::{Result, TrackerError};
pub use scenario::{
    config_schema, run_scenario, run_scenario_with_tracker, scenario_schema, ScenarioAssertion,
    ScenarioEntity, ScenarioReport, ScenarioSpec, ScenarioStateAssertion, ScenarioStep,
};
pub use shared::SharedTracker;
pub use tracking::{
    classify, detect_bounds, point, Aabb, EntityId, EntityIdAllocator, EventChannel, EventKind,
    EventLog, Membership, PlatformBounds, PlatformGeometry, PlatformProbe, Point3, PositionMap,
    SubscriptionId, TickReport, TrackableEntity, TrackingEvent, WinEvaluation, WinState,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
