//! # Formwork Project Management
//!
//! Three engines over one task model:
//!
//! ```text
//! BaseTask templates -> expansion -> per-(floor, zone) Task instances
//!                                       |                |
//!                              resource-constrained    CPM (nominal,
//!                                  scheduler             unconstrained)
//! ```
//!
//! - **Expansion** (`expansion`) turns a handful of base task templates into
//!   the full per-floor, per-zone task graph, resolving every predecessor
//!   edge class along the way.
//! - **Scheduling** (`scheduler`) walks that graph in dependency order,
//!   committing each task to the earliest window its required crews and
//!   equipment are actually free.
//! - **CPM** (`cpm`) runs the same graph at nominal (unconstrained)
//!   durations to report float and the critical path, independent of
//!   whatever the resource-constrained run actually committed.
//!
//! `calendar`, `duration`, and `resources` are the shared machinery all three
//! engines sit on top of; `input` is the plain-data loader boundary, `report`
//! collects non-fatal warnings raised along the way, and `metrics` summarizes
//! a committed schedule into project duration, total cost, and per-resource
//! utilization.

pub mod calendar;
pub mod cpm;
pub mod duration;
pub mod expansion;
pub mod input;
pub mod metrics;
pub mod report;
pub mod resources;
pub mod scheduler;
pub mod types;

pub use calendar::{Calendar, CalendarException, ExceptionType, Holiday};
pub use cpm::CpmAnalyzer;
pub use expansion::{expand, ExpansionResult};
pub use input::{ProjectInput, RonProjectLoader};
pub use metrics::{compute_metrics, ProjectMetrics, ResourceUtilization};
pub use report::{ScheduleReport, Warning};
pub use scheduler::{schedule, ScheduleOutcome};
pub use types::{BaseTask, DurationMethod, EquipmentKey, EquipmentResource, FloorPolicy, Task, TaskStatus, TaskType, WorkerResource};

pub use formwork_core::{FormworkError, Result};
