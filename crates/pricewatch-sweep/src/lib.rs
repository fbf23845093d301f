//! Periodic price sweeps: check every tracked item, record price changes,
//! latch alerts, and report the outcome.

pub mod alert;
pub mod checker;
pub mod diff;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod sink;

pub use checker::ItemChecker;
pub use engine::{StopSignal, SweepEngine};
pub use error::SweepError;
pub use scheduler::{Scheduler, SweepState};
pub use sink::{CompositeSink, TracingSink};
