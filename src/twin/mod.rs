//! Digital Twin Core
//!
//! Fixed-step simulation of a CNC production floor. Real elapsed time is
//! turned into logical iterations by the [`SimulationClock`]; every iteration
//! advances each running machine's bearings through the external
//! [`DegradationPredictor`](crate::predictors::DegradationPredictor) and
//! [`RulPredictor`](crate::predictors::RulPredictor), detects failures and
//! reports them as [`FloorEvent`]s returned from the tick call.

mod bearing;
mod clock;
mod error;
mod events;
mod floor;
mod machine;
mod sampler;
mod snapshot;

pub use bearing::Bearing;
pub use clock::SimulationClock;
pub use error::TwinError;
pub use events::FloorEvent;
pub use floor::{AttentionItem, ProductionFloor};
pub use machine::{Machine, MachineId, TickParams};
pub use sampler::{BoundedRandomVector, CalibrationBounds};
pub use snapshot::{BearingSnapshot, FloorSnapshot, MachineSnapshot};
