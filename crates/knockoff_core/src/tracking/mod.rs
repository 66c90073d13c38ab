//! Platform membership tracking.
//!
//! Leaves first: geometry → bounds (classification) → entity/registry →
//! scheduler (tick diffing) → win evaluator, with events fanning out of the
//! registry and scheduler.

pub mod bounds;
pub mod entity;
pub mod events;
pub mod geometry;
pub mod registry;
pub mod scheduler;
pub mod win;

pub use bounds::{
    classify, detect_bounds, Membership, PlatformBounds, PlatformProbe,
    DEFAULT_AUTO_DETECT_MARGIN,
};
pub use entity::{EntityId, EntityIdAllocator, TrackableEntity};
pub use events::{EventChannel, EventKind, EventLog, SubscriptionId, TrackingEvent};
pub use geometry::{horizontal_distance, point, Aabb, PlatformGeometry, Point3};
pub use registry::{EntityRegistry, PositionMap};
pub use scheduler::{TickReport, TrackingScheduler};
pub use win::{WinConditionEvaluator, WinEvaluation, WinPhase, WinState};
