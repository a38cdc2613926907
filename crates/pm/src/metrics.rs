//! Project-level metrics derived from a committed schedule (§6 Outputs):
//! project duration, total cost, and per-resource utilization. Purely a
//! read-only summary over a `ScheduleOutcome` — it never touches either
//! pool's ledger, only queries it.

use crate::calendar::Calendar;
use crate::resources::{EquipmentPool, WorkerPool};
use crate::types::{EquipmentResource, Task, WorkerResource};
use chrono::NaiveDate;
use indexmap::IndexMap;

/// Peak concurrent usage against declared capacity for one named resource.
#[derive(Debug, Clone)]
pub struct ResourceUtilization {
    pub name: String,
    pub capacity: u32,
    pub peak_concurrent_usage: u32,
    /// `peak_concurrent_usage / capacity`; `0.0` for a zero-capacity resource
    /// rather than dividing by zero.
    pub utilization: f64,
}

fn utilization_of(name: &str, capacity: u32, peak: u32) -> ResourceUtilization {
    let utilization = if capacity == 0 { 0.0 } else { peak as f64 / capacity as f64 };
    ResourceUtilization { name: name.to_string(), capacity, peak_concurrent_usage: peak, utilization }
}

/// Cost and schedule-span metrics for a committed schedule.
#[derive(Debug, Clone)]
pub struct ProjectMetrics {
    /// Working days from the project start to the latest scheduled end.
    pub project_duration: f64,
    /// Sum over every task of `hourly_rate * 8 * units * working_days`,
    /// for both its allocated crews and its allocated equipment.
    pub total_cost: f64,
    pub worker_utilization: IndexMap<String, ResourceUtilization>,
    pub equipment_utilization: IndexMap<String, ResourceUtilization>,
}

fn task_cost(task: &Task, calendar: &Calendar, workers: &[WorkerResource], equipment: &[EquipmentResource]) -> f64 {
    let (Some(start), Some(end)) = (task.earliest_start, task.scheduled_end) else {
        return 0.0;
    };
    let working_days = calendar.working_days_between(start, end);

    let mut cost = 0.0;
    if task.allocated_crews > 0 {
        if let Some(role) = workers.iter().find(|w| w.name == task.resource_type) {
            cost += role.daily_cost() * task.allocated_crews as f64 * working_days;
        }
    }
    for (name, &units) in &task.allocated_equipment {
        if let Some(piece) = equipment.iter().find(|e| &e.name == name) {
            cost += piece.daily_cost() * units as f64 * working_days;
        }
    }
    cost
}

/// Computes §6's project-level metrics over a committed schedule. `tasks`
/// must be the post-scheduling set (with `earliest_start`/`scheduled_end`
/// populated); `worker_pool`/`equipment_pool` are queried for peak usage
/// over the whole project span, never mutated.
pub fn compute_metrics(
    tasks: &IndexMap<String, Task>,
    project_start: NaiveDate,
    calendar: &Calendar,
    workers: &[WorkerResource],
    equipment: &[EquipmentResource],
    worker_pool: &WorkerPool,
    equipment_pool: &EquipmentPool,
) -> ProjectMetrics {
    let project_end = tasks.values().filter_map(|t| t.scheduled_end).max().unwrap_or(project_start);
    let project_duration = calendar.working_days_between(project_start, project_end);

    let total_cost = tasks.values().map(|t| task_cost(t, calendar, workers, equipment)).sum();

    let worker_utilization = workers
        .iter()
        .map(|w| {
            let peak = worker_pool.peak_usage(&w.name, project_start, project_end);
            (w.name.clone(), utilization_of(&w.name, w.count, peak))
        })
        .collect();
    let equipment_utilization = equipment
        .iter()
        .map(|e| {
            let peak = equipment_pool.peak_usage(&e.name, project_start, project_end);
            (e.name.clone(), utilization_of(&e.name, e.count, peak))
        })
        .collect();

    ProjectMetrics { project_duration, total_cost, worker_utilization, equipment_utilization }
}
