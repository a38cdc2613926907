//! Critical Path Method analysis over the expanded task graph (component F).
//!
//! Independent of the resource-constrained scheduler: durations here are
//! nominal (as if resources were never scarce), so the result is the
//! idealized schedule the resource-constrained run is judged against. The
//! forward/backward pass structure mirrors a textbook CPM implementation —
//! Kahn order, ES/EF forward, LS/LF backward, float = LS - ES, critical path
//! enumerated by walking zero-float edges from zero-float roots.

use crate::duration::{precompute_nominal_duration, resource_based_duration, ShiftProfile};
use crate::types::Task;
use formwork_core::{FormworkError, Result};
use indexmap::IndexMap;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

fn effective_duration(task: &Task) -> Result<f64> {
    if let Some(days) = task.nominal_duration {
        return Ok(days);
    }
    if let Some(days) = precompute_nominal_duration(task)? {
        return Ok(days);
    }
    // ResourceCalculation with no tentative allocation yet: assume the
    // minimum requested crew/equipment at unit productivity, matching the
    // validation-pass default (§4.D) so an idealized CPM run stays possible
    // before the resource-constrained scheduler has committed anything.
    let equipment_units: u32 = task.min_equipment_needed.values().sum();
    resource_based_duration(
        task,
        task.min_crews_needed.max(1),
        equipment_units.max(1),
        Some(1.0),
        Some(1.0),
        &ShiftProfile::default(),
    )
}

/// Forward/backward pass state for one task graph. `backward_pass` requires
/// `forward_pass` to have run first; querying float or critical path before
/// both have run returns stale/default data rather than panicking, since
/// those accessors only read already-computed maps.
#[derive(Debug, Default)]
pub struct CpmAnalyzer {
    order: Vec<String>,
    successors: IndexMap<String, Vec<String>>,
    delay: HashMap<String, i64>,
    duration: HashMap<String, f64>,
    early_start: HashMap<String, f64>,
    early_finish: HashMap<String, f64>,
    late_start: HashMap<String, f64>,
    late_finish: HashMap<String, f64>,
    forward_done: bool,
}

impl CpmAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    fn topological_order(tasks: &IndexMap<String, Task>) -> Result<Vec<String>> {
        let mut graph = DiGraph::<String, ()>::new();
        let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();
        for id in tasks.keys() {
            nodes.insert(id.as_str(), graph.add_node(id.clone()));
        }
        for task in tasks.values() {
            for pred in &task.predecessors {
                if let (Some(&from), Some(&to)) = (nodes.get(pred.as_str()), nodes.get(task.id.as_str())) {
                    graph.add_edge(from, to, ());
                }
            }
        }
        let sorted = toposort(&graph, None).map_err(|_| FormworkError::CycleDetected)?;
        Ok(sorted.into_iter().map(|idx| graph[idx].clone()).collect())
    }

    /// Computes earliest start/finish for every task in Kahn order. A
    /// successor's earliest start is bounded by each predecessor's earliest
    /// finish plus that predecessor's configured delay (the delay is a
    /// property of the predecessor, never a self-offset, per `BaseTask::delay`).
    pub fn forward_pass(&mut self, tasks: &IndexMap<String, Task>) -> Result<()> {
        self.order = Self::topological_order(tasks)?;
        self.successors.clear();
        self.delay.clear();
        self.duration.clear();
        self.early_start.clear();
        self.early_finish.clear();

        for id in &self.order {
            self.successors.insert(id.clone(), Vec::new());
        }
        for task in tasks.values() {
            self.delay.insert(task.id.clone(), task.delay);
            self.duration.insert(task.id.clone(), effective_duration(task)?);
            for pred in &task.predecessors {
                self.successors.entry(pred.clone()).or_default().push(task.id.clone());
            }
        }

        for id in &self.order {
            let task = &tasks[id];
            let es = task
                .predecessors
                .iter()
                .filter_map(|pred| {
                    let ef = self.early_finish.get(pred)?;
                    let lag = *self.delay.get(pred).unwrap_or(&0) as f64;
                    Some(ef + lag)
                })
                .fold(0.0_f64, f64::max);
            let ef = es + self.duration[id];
            self.early_start.insert(id.clone(), es);
            self.early_finish.insert(id.clone(), ef);
        }

        self.forward_done = true;
        Ok(())
    }

    /// Computes latest start/finish working back from the project duration.
    /// Sink tasks (no successors) finish exactly at the project duration;
    /// every other task's latest finish is bounded by each successor's
    /// latest start, reduced by this task's own delay contribution.
    pub fn backward_pass(&mut self) -> Result<()> {
        if !self.forward_done {
            return Err(FormworkError::ForwardPassRequired);
        }
        self.late_start.clear();
        self.late_finish.clear();

        let project_duration = self.early_finish.values().copied().fold(0.0_f64, f64::max);

        for id in self.order.iter().rev() {
            let successors = &self.successors[id];
            let lf = if successors.is_empty() {
                project_duration
            } else {
                let lag = *self.delay.get(id).unwrap_or(&0) as f64;
                successors
                    .iter()
                    .filter_map(|succ| self.late_start.get(succ).map(|ls| ls - lag))
                    .fold(f64::INFINITY, f64::min)
            };
            let ls = lf - self.duration[id];
            self.late_finish.insert(id.clone(), lf);
            self.late_start.insert(id.clone(), ls);
        }

        Ok(())
    }

    pub fn early_start(&self, task_id: &str) -> Option<f64> {
        self.early_start.get(task_id).copied()
    }

    pub fn early_finish(&self, task_id: &str) -> Option<f64> {
        self.early_finish.get(task_id).copied()
    }

    pub fn late_start(&self, task_id: &str) -> Option<f64> {
        self.late_start.get(task_id).copied()
    }

    pub fn late_finish(&self, task_id: &str) -> Option<f64> {
        self.late_finish.get(task_id).copied()
    }

    pub fn float(&self, task_id: &str) -> Option<f64> {
        let ls = self.late_start.get(task_id)?;
        let es = self.early_start.get(task_id)?;
        Some(ls - es)
    }

    pub fn project_duration(&self) -> f64 {
        self.early_finish.values().copied().fold(0.0_f64, f64::max)
    }

    fn is_critical(&self, id: &str) -> bool {
        const EPSILON: f64 = 1e-6;
        self.float(id).map(|f| f.abs() < EPSILON).unwrap_or(false)
    }

    /// Every maximal zero-float path from a zero-float root (a critical task
    /// with no critical predecessor) to a zero-float leaf (a critical task
    /// with no critical successor), enumerated by DFS restricted to edges
    /// between critical tasks. A root with two critical successors yields two
    /// paths, branching at that point rather than picking one arbitrarily.
    pub fn critical_paths(&self) -> Vec<Vec<String>> {
        let roots: Vec<&String> = self
            .order
            .iter()
            .filter(|id| self.is_critical(id))
            .filter(|id| {
                !self.successors.iter().any(|(pred, succs)| {
                    self.is_critical(pred) && succs.iter().any(|s| s == *id)
                })
            })
            .collect();

        let mut paths = Vec::new();
        for root in roots {
            self.extend_critical_paths(root, vec![root.clone()], &mut paths);
        }
        paths
    }

    fn extend_critical_paths(&self, current: &str, path: Vec<String>, out: &mut Vec<Vec<String>>) {
        let critical_successors: Vec<&String> = self
            .successors
            .get(current)
            .map(|succs| succs.iter().filter(|s| self.is_critical(s)).collect())
            .unwrap_or_default();

        if critical_successors.is_empty() {
            out.push(path);
            return;
        }
        for next_id in critical_successors {
            let mut extended = path.clone();
            extended.push(next_id.clone());
            self.extend_critical_paths(next_id, extended, out);
        }
    }

    /// The longest critical path, for callers that just want a single
    /// headline chain (e.g. a CLI summary line) rather than the full set.
    pub fn critical_path(&self) -> Vec<String> {
        self.critical_paths().into_iter().max_by_key(|p| p.len()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DurationMethod, EquipmentKey, TaskStatus, TaskType};

    fn task(id: &str, duration: f64, predecessors: Vec<&str>) -> Task {
        Task {
            id: id.to_string(),
            base_id: id.to_string(),
            discipline: "Test".into(),
            zone: "Z1".into(),
            floor: 0,
            resource_type: String::new(),
            task_type: TaskType::Worker,
            duration_method: DurationMethod::Fixed,
            base_duration: Some(duration),
            unit_duration: 0.0,
            quantity: 0.0,
            min_crews_needed: 1,
            min_equipment_needed: IndexMap::<EquipmentKey, u32>::new(),
            predecessors: predecessors.into_iter().map(String::from).collect(),
            delay: 0,
            included: true,
            nominal_duration: Some(duration),
            allocated_crews: 0,
            allocated_equipment: IndexMap::new(),
            earliest_start: None,
            scheduled_end: None,
            status: TaskStatus::Planned,
        }
    }

    fn tasks(list: Vec<Task>) -> IndexMap<String, Task> {
        list.into_iter().map(|t| (t.id.clone(), t)).collect()
    }

    #[test]
    fn backward_pass_before_forward_pass_errors() {
        let mut cpm = CpmAnalyzer::new();
        assert!(matches!(cpm.backward_pass(), Err(FormworkError::ForwardPassRequired)));
    }

    #[test]
    fn linear_chain_has_zero_float_throughout() {
        // A(3) -> B(2) -> C(4): every task sits on the single path, so float is zero everywhere.
        let set = tasks(vec![task("A", 3.0, vec![]), task("B", 2.0, vec!["A"]), task("C", 4.0, vec!["B"])]);
        let mut cpm = CpmAnalyzer::new();
        cpm.forward_pass(&set).unwrap();
        cpm.backward_pass().unwrap();

        assert_eq!(cpm.early_start("A"), Some(0.0));
        assert_eq!(cpm.early_finish("A"), Some(3.0));
        assert_eq!(cpm.early_start("B"), Some(3.0));
        assert_eq!(cpm.early_finish("C"), Some(9.0));
        assert_eq!(cpm.project_duration(), 9.0);

        for id in ["A", "B", "C"] {
            assert!((cpm.float(id).unwrap()).abs() < 1e-9, "{id} should be critical");
        }
        assert_eq!(cpm.critical_path(), vec!["A".to_string(), "B".to_string(), "C".to_string()]);
    }

    #[test]
    fn parallel_branch_has_positive_float() {
        // A(5) feeds both B(5, critical) and C(1, slack=4); D needs both.
        let set = tasks(vec![
            task("A", 5.0, vec![]),
            task("B", 5.0, vec!["A"]),
            task("C", 1.0, vec!["A"]),
            task("D", 1.0, vec!["B", "C"]),
        ]);
        let mut cpm = CpmAnalyzer::new();
        cpm.forward_pass(&set).unwrap();
        cpm.backward_pass().unwrap();

        assert!((cpm.float("B").unwrap()).abs() < 1e-9);
        assert!(cpm.float("C").unwrap() > 0.0);
        assert_eq!(cpm.project_duration(), 11.0);
    }

    #[test]
    fn two_equally_long_branches_both_surface_as_critical_paths() {
        // A feeds both B and C, each duration 5 (both critical); D needs both.
        let set = tasks(vec![
            task("A", 2.0, vec![]),
            task("B", 5.0, vec!["A"]),
            task("C", 5.0, vec!["A"]),
            task("D", 1.0, vec!["B", "C"]),
        ]);
        let mut cpm = CpmAnalyzer::new();
        cpm.forward_pass(&set).unwrap();
        cpm.backward_pass().unwrap();

        assert!((cpm.float("B").unwrap()).abs() < 1e-9);
        assert!((cpm.float("C").unwrap()).abs() < 1e-9);

        let paths: std::collections::HashSet<Vec<String>> = cpm.critical_paths().into_iter().collect();
        assert_eq!(paths.len(), 2);
        assert!(paths.contains(&vec!["A".to_string(), "B".to_string(), "D".to_string()]));
        assert!(paths.contains(&vec!["A".to_string(), "C".to_string(), "D".to_string()]));
    }

    #[test]
    fn delay_pushes_back_successor_earliest_start() {
        let mut pred = task("A", 2.0, vec![]);
        pred.delay = 3;
        let set = tasks(vec![pred, task("B", 1.0, vec!["A"])]);
        let mut cpm = CpmAnalyzer::new();
        cpm.forward_pass(&set).unwrap();
        // A finishes at day 2, plus 3 days of delay before B can start.
        assert_eq!(cpm.early_start("B"), Some(5.0));
    }

    #[test]
    fn cycle_is_rejected() {
        let mut a = task("A", 1.0, vec!["B"]);
        let b = task("B", 1.0, vec!["A"]);
        a.predecessors = vec!["B".to_string()];
        let set = tasks(vec![a, b]);
        let mut cpm = CpmAnalyzer::new();
        assert!(matches!(cpm.forward_pass(&set), Err(FormworkError::CycleDetected)));
    }

    /// §8 round-trip property: recomputing CPM on a schedule's realized
    /// (post-allocation) durations reproduces the same critical set as CPM
    /// on the nominal durations, when resources never actually constrained
    /// the window search.
    #[test]
    fn cpm_on_realized_durations_matches_cpm_on_nominal_durations() {
        use crate::calendar::Calendar;
        use crate::duration::ShiftProfile;
        use crate::input::AccelerationProfile;
        use crate::report::ScheduleReport;
        use crate::scheduler::schedule;
        use crate::types::WorkerResource;
        use chrono::NaiveDate;
        use std::collections::HashMap;

        let mut nominal = tasks(vec![task("A", 3.0, vec![]), task("B", 2.0, vec!["A"]), task("C", 4.0, vec!["B"])]);
        for t in nominal.values_mut() {
            t.nominal_duration = None; // force precompute from base_duration, as a fresh expansion would have it
        }

        let mut cpm_nominal = CpmAnalyzer::new();
        cpm_nominal.forward_pass(&nominal).unwrap();
        cpm_nominal.backward_pass().unwrap();
        let nominal_critical: std::collections::HashSet<String> = cpm_nominal.critical_path().into_iter().collect();

        let calendar = Calendar::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let mut report = ScheduleReport::new();
        let outcome = schedule(
            nominal,
            &calendar,
            calendar.current_date,
            &[WorkerResource {
                name: String::new(),
                count: 1000,
                hourly_rate: 0.0,
                productivity_rates: HashMap::new(),
                max_crews: HashMap::new(),
                efficiency: 1.0,
            }],
            &[],
            &AccelerationProfile::new(),
            &ShiftProfile::default(),
            &mut report,
        )
        .unwrap();

        let mut cpm_realized = CpmAnalyzer::new();
        cpm_realized.forward_pass(&outcome.tasks).unwrap();
        cpm_realized.backward_pass().unwrap();
        let realized_critical: std::collections::HashSet<String> =
            cpm_realized.critical_path().into_iter().collect();

        assert_eq!(nominal_critical, realized_critical);
    }
}
