//! # Probe
//!
//! The write/read/evaluate machinery: a single [`ProbeCycle`], the
//! [`PeriodicScheduler`] that repeats it, the [`StartupProbe`] run once at
//! launch, and the comparison rules in [`evaluator`].

pub mod cycle;
pub mod evaluator;
pub mod scheduler;
pub mod startup;

pub use cycle::{CycleReport, ProbeCycle, TargetObservation, WriteOutcome};
pub use evaluator::{evaluate, ConsistencyOutcome, OutcomeSeverity};
pub use scheduler::{PeriodicScheduler, SchedulerLifecycle, SchedulerSnapshot};
pub use startup::{StartupProbe, StartupReport};
