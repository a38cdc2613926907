//! Duration policies: fixed, quantity-based, resource-based (component B).

use crate::types::{DurationMethod, Task, TaskType};
use formwork_core::FormworkError;
use std::collections::HashMap;

/// Hours in a standard working day, before any shift multiplier is applied.
pub const BASE_HOURS_PER_DAY: f64 = 8.0;

/// Per-discipline shift multiplier applied to `BASE_HOURS_PER_DAY` before the
/// resource-calculation ceiling division (§10.4). A discipline absent from
/// the profile gets the default multiplier of `1.0`, so an empty profile
/// reproduces the base spec exactly.
#[derive(Debug, Clone, Default)]
pub struct ShiftProfile {
    multipliers: HashMap<String, f64>,
}

impl ShiftProfile {
    pub fn new(multipliers: HashMap<String, f64>) -> Self {
        Self { multipliers }
    }

    pub fn multiplier(&self, discipline: &str) -> f64 {
        self.multipliers.get(discipline).copied().unwrap_or(1.0)
    }

    pub fn hours_per_day(&self, discipline: &str) -> f64 {
        BASE_HOURS_PER_DAY * self.multiplier(discipline)
    }
}

fn check_finite(task: &Task, days: f64) -> Result<f64, FormworkError> {
    if days < 0.0 || !days.is_finite() {
        return Err(FormworkError::InvalidDuration {
            task_id: task.id.clone(),
            reason: format!("computed duration {days} is negative or non-finite"),
        });
    }
    Ok(days)
}

fn quantity_based_days(quantity: f64, unit_duration: f64) -> f64 {
    (quantity * unit_duration).max(0.5).ceil()
}

/// Nominal duration for the two policies that don't depend on the realized
/// allocation. Returns `None` for `ResourceCalculation`, which is deferred
/// until the scheduler has a tentative crew/equipment count (§4.E step 4).
pub fn precompute_nominal_duration(task: &Task) -> Result<Option<f64>, FormworkError> {
    match task.duration_method {
        DurationMethod::Fixed => {
            let days = task.base_duration.unwrap_or(0.0);
            Ok(Some(check_finite(task, days)?))
        }
        DurationMethod::QuantityBased => {
            let days = quantity_based_days(task.quantity, task.unit_duration);
            Ok(Some(check_finite(task, days)?))
        }
        DurationMethod::ResourceCalculation => Ok(None),
    }
}

/// Duration implied by a tentative resource allocation. `worker_productivity`
/// and `equipment_productivity` are units processed per crew-hour /
/// equipment-hour for this base task; callers pass `Some(1.0)` (matching the
/// validation-pass default, §4.D) when no rate is on file rather than
/// leaving it `None`. Hybrid tasks (both productivities present) take the
/// max of the two computed durations, matching worker/equipment contention
/// for the slower of the two trades.
pub fn resource_based_duration(
    task: &Task,
    crews: u32,
    equipment_units: u32,
    worker_productivity: Option<f64>,
    equipment_productivity: Option<f64>,
    shift_profile: &ShiftProfile,
) -> Result<f64, FormworkError> {
    let hours_per_day = shift_profile.hours_per_day(&task.discipline);

    let worker_days = if matches!(task.task_type, TaskType::Equipment) {
        None
    } else {
        worker_productivity.filter(|_| crews > 0).map(|rate| {
            (task.quantity / (crews as f64 * rate * hours_per_day)).ceil()
        })
    };

    let equipment_days = if matches!(task.task_type, TaskType::Worker | TaskType::Supervision) {
        None
    } else {
        equipment_productivity
            .filter(|_| equipment_units > 0)
            .map(|rate| (task.quantity / (equipment_units as f64 * rate * hours_per_day)).ceil())
    };

    let days = match (worker_days, equipment_days) {
        (Some(w), Some(e)) => w.max(e),
        (Some(w), None) => w,
        (None, Some(e)) => e,
        (None, None) => {
            return Err(FormworkError::InvalidDuration {
                task_id: task.id.clone(),
                reason: "resource_calculation task has no feasible crew or equipment allocation"
                    .to_string(),
            })
        }
    };

    check_finite(task, days)
}
