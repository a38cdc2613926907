//! Non-aborting warning collection for the validation/auto-patch pass (§4.D, §7).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Warning {
    MissingQuantity { task_id: String, defaulted_to: f64 },
    MissingProductivity { task_id: String, resource: String, defaulted_to: f64 },
    UnresolvedUserDependency { task_id: String, target: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::MissingQuantity { task_id, defaulted_to } => write!(
                f,
                "no quantity defined for task {task_id}; defaulting to {defaulted_to}"
            ),
            Warning::MissingProductivity { task_id, resource, defaulted_to } => write!(
                f,
                "no productivity for resource '{resource}' on task {task_id}; defaulting to {defaulted_to} unit/hour"
            ),
            Warning::UnresolvedUserDependency { task_id, target } => write!(
                f,
                "user dependency not found: task {task_id} references {target}"
            ),
        }
    }
}

/// Collects warnings keyed by the task they concern. Never aborts a run;
/// every entry here corresponds to an auto-patched default being applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScheduleReport {
    warnings: HashMap<String, Vec<Warning>>,
}

impl ScheduleReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_warning(&mut self, task_id: impl Into<String>, warning: Warning) {
        self.warnings.entry(task_id.into()).or_default().push(warning);
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.values().map(|v| v.len()).sum()
    }

    pub fn for_task(&self, task_id: &str) -> &[Warning] {
        self.warnings.get(task_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn summary(&self) -> String {
        if self.warnings.is_empty() {
            return "no warnings".to_string();
        }
        let mut lines = Vec::with_capacity(self.warning_count());
        for warnings in self.warnings.values() {
            for warning in warnings {
                lines.push(warning.to_string());
            }
        }
        lines.join("\n")
    }
}
