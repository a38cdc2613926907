//! Expands base task templates into per-(floor, zone) task instances and
//! resolves every predecessor edge class (component D, §4.A, §4.D).
//!
//! Edge classes, in the order they're evaluated for each instance:
//!   E1 - plain intra-floor predecessors (`BaseTask::predecessors`); a
//!        predecessor in a ground discipline flattens to floor 0
//!   E2 - predefined cross-floor links between distinct base tasks
//!        (`CrossFloorLinks`), unconditional on `floor > 0`
//!   E3 - user-authored cross-floor dependencies (`CrossFloorDependency`)
//!   E4 - vertical repetition of the same base task, gated on both
//!        `cross_floor_repetition` and `vertical_workflow`
//!   E5 - cross-zone group sequencing (`SequencingConfig`)
//!   E6 - user-authored custom dependencies (`CustomDependency`)
//!
//! Every edge is gated on the target instance actually existing in the
//! expanded task set, mirroring the defensive `if pred_id in task_ids`
//! pattern a hand-written expander would use rather than trusting the
//! configuration blindly. Edges the expander couldn't resolve because a
//! *user-authored* dependency (E3, E6) pointed nowhere are recorded as
//! warnings rather than aborting the run; a plain predecessor (E1) silently
//! drops, since omitting the floor/zone combination entirely is routine.

use crate::input::{ProjectInput, SequencingStrategy};
use crate::report::{ScheduleReport, Warning};
use crate::types::{BaseTask, FloorPolicy, Task, TaskStatus};
use formwork_core::{FormworkError, Result};
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashSet, VecDeque};

pub struct ExpansionResult {
    pub tasks: IndexMap<String, Task>,
    pub report: ScheduleReport,
}

/// Resolves the inclusive `[start_floor, end_floor]` range a base task
/// applies to. `FloorPolicy::Auto` falls through to the ground-discipline
/// set, then to whether the task repeats per floor at all (REDESIGN FLAG:
/// this replaces probing `applies_to_floors`/`custom_floor_range`).
fn floor_range(base: &BaseTask, max_floor: u32, ground_disciplines: &HashSet<String>) -> (u32, u32) {
    match &base.floor_policy {
        FloorPolicy::GroundOnly => (0, 0),
        FloorPolicy::AboveGround => (1.min(max_floor), max_floor),
        FloorPolicy::AllFloors => (0, max_floor),
        FloorPolicy::CustomRange { start_floor, end_floor } => (*start_floor, (*end_floor).min(max_floor)),
        FloorPolicy::Auto => {
            if ground_disciplines.contains(&base.discipline) {
                (0, 0)
            } else if base.repeat_on_floor {
                (0, max_floor)
            } else {
                (0, 0)
            }
        }
    }
}

/// Zones present on a given floor, in declaration order.
fn zones_on_floor<'a>(zones: &'a crate::input::ZoneMap, floor: u32) -> Vec<&'a str> {
    zones
        .iter()
        .filter(|(_, &max_floor)| floor <= max_floor)
        .map(|(name, _)| name.as_str())
        .collect()
}

fn quantity_for(
    input: &ProjectInput,
    base_id: &str,
    floor: u32,
    zone: &str,
    report: &mut ScheduleReport,
) -> f64 {
    match input
        .quantity_matrix
        .get(base_id)
        .and_then(|by_floor| by_floor.get(&floor))
        .and_then(|by_zone| by_zone.get(zone))
    {
        Some(&q) => q,
        None => {
            let instance_id = Task::instance_id(base_id, floor, zone);
            report.add_warning(
                &instance_id,
                Warning::MissingQuantity { task_id: instance_id.clone(), defaulted_to: 1.0 },
            );
            1.0
        }
    }
}

fn make_instance(
    input: &ProjectInput,
    base: &BaseTask,
    floor: u32,
    zone: &str,
    report: &mut ScheduleReport,
) -> Task {
    let id = Task::instance_id(&base.id, floor, zone);
    let quantity = quantity_for(input, &base.id, floor, zone, report);
    Task {
        id,
        base_id: base.id.clone(),
        discipline: base.discipline.clone(),
        zone: zone.to_string(),
        floor,
        resource_type: base.resource_type.clone(),
        task_type: base.task_type,
        duration_method: base.duration_method,
        base_duration: Some(base.base_duration),
        unit_duration: base.unit_duration,
        quantity,
        min_crews_needed: base.min_crews_needed,
        min_equipment_needed: base.min_equipment_needed.clone(),
        predecessors: Vec::new(),
        delay: base.delay,
        included: base.included,
        nominal_duration: None,
        allocated_crews: 0,
        allocated_equipment: IndexMap::new(),
        earliest_start: None,
        scheduled_end: None,
        status: TaskStatus::Planned,
    }
}

/// E5: the zone-group index a zone belongs to under a discipline's
/// sequencing policy, if configured.
fn group_index(groups: &[Vec<String>], zone: &str) -> Option<usize> {
    groups.iter().position(|g| g.iter().any(|z| z == zone))
}

fn resolve_predecessors(
    input: &ProjectInput,
    base: &BaseTask,
    floor: u32,
    zone: &str,
    task_ids: &IndexSet<String>,
    report: &mut ScheduleReport,
) -> Vec<String> {
    let this_id = Task::instance_id(&base.id, floor, zone);
    let mut preds = Vec::new();

    // E1: plain intra-floor predecessors. A predecessor whose own discipline
    // is a ground discipline only ever materializes at floor 0 (it never
    // repeats upward), so its floor flattens to 0 regardless of `floor`.
    for pred_base_id in &base.predecessors {
        let pred_floor = input
            .base_tasks
            .get(pred_base_id)
            .filter(|p| input.ground_disciplines.contains(&p.discipline))
            .map(|_| 0)
            .unwrap_or(floor);
        let candidate = Task::instance_id(pred_base_id, pred_floor, zone);
        if task_ids.contains(&candidate) {
            preds.push(candidate);
        }
    }

    // E2: predefined cross-floor links to a distinct base task on the floor
    // below. Fires whenever the base id has an entry in `cross_floor_links`
    // and `floor > 0` — no `vertical_workflow` gate (that belongs to E4).
    if floor > 0 {
        if let Some(targets) = input.cross_floor_links.get(&base.id) {
            for target_base_id in targets {
                let candidate = Task::instance_id(target_base_id, floor - 1, zone);
                if task_ids.contains(&candidate) {
                    preds.push(candidate);
                }
            }
        }
    }

    // E3: user-authored cross-floor dependency.
    for dep in &base.extended_edges.cross_floor_dependencies {
        let target_zone = dep.zone.as_deref().unwrap_or(zone);
        let target_floor = floor as i64 + dep.floor_offset as i64;
        let resolved = if target_floor >= 0 {
            let candidate = Task::instance_id(&dep.target_base_id, target_floor as u32, target_zone);
            task_ids.contains(&candidate).then_some(candidate)
        } else {
            None
        };
        match resolved {
            Some(candidate) => preds.push(candidate),
            None => report.add_warning(
                &this_id,
                Warning::UnresolvedUserDependency {
                    task_id: this_id.clone(),
                    target: format!("{}@F{}/{}", dep.target_base_id, target_floor, target_zone),
                },
            ),
        }
    }

    // E4: vertical repetition of the same base task, one floor below. Both
    // `cross_floor_repetition` and `vertical_workflow` must be set.
    if base.cross_floor_repetition && base.vertical_workflow && floor > 0 {
        let candidate = Task::instance_id(&base.id, floor - 1, zone);
        if task_ids.contains(&candidate) {
            preds.push(candidate);
        }
    }

    // E5: cross-zone group sequencing. Every zone in the previous group
    // must complete before this zone starts, unless explicitly exempted.
    if let Some(config) = input.sequencing.get(&base.discipline) {
        if config.strategy == SequencingStrategy::GroupSequential {
            if let Some(idx) = group_index(&config.zone_groups, zone) {
                if idx > 0 {
                    let exempt = config.parallel_with.get(zone).cloned().unwrap_or_default();
                    for prev_zone in &config.zone_groups[idx - 1] {
                        if exempt.contains(prev_zone) {
                            continue;
                        }
                        let candidate = Task::instance_id(&base.id, floor, prev_zone);
                        if task_ids.contains(&candidate) {
                            preds.push(candidate);
                        }
                    }
                }
            }
        }
    }

    // E6: user-authored custom dependency, gated by optional zone/floor scope.
    for dep in &base.extended_edges.custom_dependencies {
        let zone_applies = dep.zones.as_ref().map(|zs| zs.iter().any(|z| z == zone)).unwrap_or(true);
        let floor_applies = dep
            .floor_range
            .map(|(start, end)| floor >= start && floor <= end)
            .unwrap_or(true);
        if !zone_applies || !floor_applies {
            continue;
        }
        let candidate = Task::instance_id(&dep.target_base_id, floor, zone);
        if task_ids.contains(&candidate) {
            preds.push(candidate);
        } else {
            report.add_warning(
                &this_id,
                Warning::UnresolvedUserDependency {
                    task_id: this_id.clone(),
                    target: format!("{}@F{}/{}", dep.target_base_id, floor, zone),
                },
            );
        }
    }

    preds
}

/// Kahn's algorithm over the expanded instance set: confirms every
/// predecessor reference actually resolved (defense in depth; the edge
/// resolvers above already gate on `task_ids`) and that the graph is acyclic.
fn validate_acyclic(tasks: &IndexMap<String, Task>) -> Result<()> {
    let mut in_degree: IndexMap<&str, u32> = tasks.keys().map(|id| (id.as_str(), 0)).collect();
    let mut successors: IndexMap<&str, Vec<&str>> = tasks.keys().map(|id| (id.as_str(), Vec::new())).collect();

    for task in tasks.values() {
        for pred in &task.predecessors {
            if !tasks.contains_key(pred) {
                return Err(FormworkError::MissingPredecessor {
                    task_id: task.id.clone(),
                    predecessor_id: pred.clone(),
                });
            }
            successors.get_mut(pred.as_str()).unwrap().push(task.id.as_str());
            *in_degree.get_mut(task.id.as_str()).unwrap() += 1;
        }
    }

    let mut queue: VecDeque<&str> =
        in_degree.iter().filter(|(_, &d)| d == 0).map(|(&id, _)| id).collect();
    let mut visited = 0usize;
    while let Some(id) = queue.pop_front() {
        visited += 1;
        for &succ in &successors[id] {
            let degree = in_degree.get_mut(succ).unwrap();
            *degree -= 1;
            if *degree == 0 {
                queue.push_back(succ);
            }
        }
    }

    if visited != tasks.len() {
        return Err(FormworkError::CycleDetected);
    }
    Ok(())
}

/// Up-front validation (§7): any zone named in configuration that isn't
/// actually declared in `input.zones` is a configuration mistake, not a
/// "this task doesn't run here" situation — it aborts the run rather than
/// silently resolving to nothing, unlike the E3/E6 warnings below which cover
/// edges that fail to resolve against the *expanded task set* for reasons
/// other than a bad zone name.
fn validate_zone_references(input: &ProjectInput) -> Result<()> {
    let known = |zone: &str| input.zones.contains_key(zone);
    let check = |zone: &str| -> Result<()> {
        if known(zone) {
            Ok(())
        } else {
            Err(FormworkError::InvalidZoneReference { zone: zone.to_string() })
        }
    };

    for base in input.base_tasks.values() {
        for dep in &base.extended_edges.cross_floor_dependencies {
            if let Some(zone) = &dep.zone {
                check(zone)?;
            }
        }
        for dep in &base.extended_edges.custom_dependencies {
            if let Some(zones) = &dep.zones {
                for zone in zones {
                    check(zone)?;
                }
            }
        }
    }

    for group_config in input.sequencing.values() {
        for group in &group_config.zone_groups {
            for zone in group {
                check(zone)?;
            }
        }
        for (zone, parallels) in &group_config.parallel_with {
            check(zone)?;
            for other in parallels {
                check(other)?;
            }
        }
    }

    for by_floor in input.quantity_matrix.values() {
        for by_zone in by_floor.values() {
            for zone in by_zone.keys() {
                check(zone)?;
            }
        }
    }

    Ok(())
}

/// Up-front validation (§7): a negative or non-finite quantity is a
/// configuration error, caught here rather than propagating into a nonsense
/// duration deep inside `duration::quantity_based_days`.
fn validate_quantities(input: &ProjectInput) -> Result<()> {
    for (base_id, by_floor) in &input.quantity_matrix {
        for by_zone in by_floor.values() {
            for (zone, &quantity) in by_zone {
                if quantity < 0.0 || !quantity.is_finite() {
                    return Err(FormworkError::ConfigurationError(format!(
                        "quantity {quantity} for task {base_id} in zone {zone} is negative or non-finite"
                    )));
                }
            }
        }
    }
    Ok(())
}

pub fn expand(input: &ProjectInput) -> Result<ExpansionResult> {
    validate_zone_references(input)?;
    validate_quantities(input)?;
    let mut report = ScheduleReport::new();
    let max_floor = input.zones.values().copied().max().unwrap_or(0);

    // Pass 1: materialize every instance id up front so edge resolution can
    // check membership without forward references to tasks not yet built.
    let mut task_ids = IndexSet::new();
    for base in input.base_tasks.values() {
        if !base.included {
            continue;
        }
        let (start, end) = floor_range(base, max_floor, &input.ground_disciplines);
        for floor in start..=end {
            for zone in zones_on_floor(&input.zones, floor) {
                task_ids.insert(Task::instance_id(&base.id, floor, zone));
            }
        }
    }

    // Pass 2: build tasks and resolve predecessors now that task_ids is complete.
    let mut tasks = IndexMap::new();
    for base in input.base_tasks.values() {
        if !base.included {
            continue;
        }
        let (start, end) = floor_range(base, max_floor, &input.ground_disciplines);
        for floor in start..=end {
            for zone in zones_on_floor(&input.zones, floor) {
                let mut instance = make_instance(input, base, floor, zone, &mut report);
                instance.predecessors = resolve_predecessors(input, base, floor, zone, &task_ids, &mut report);
                tasks.insert(instance.id.clone(), instance);
            }
        }
    }

    validate_acyclic(&tasks)?;

    Ok(ExpansionResult { tasks, report })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::Calendar;
    use crate::input::{AccelerationProfile, CalendarConfig, CrossFloorLinks, ProjectInput, QuantityMatrix, SequencingConfig, ZoneMap};
    use crate::types::{DurationMethod, TaskType};
    use chrono::NaiveDate;
    use std::collections::HashMap;

    fn calendar_config() -> CalendarConfig {
        let cal = Calendar::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        CalendarConfig {
            start_date: cal.current_date,
            working_days: cal.working_days,
            holidays: Vec::new(),
            exceptions: Vec::new(),
        }
    }

    fn minimal_input(base_tasks: IndexMap<String, BaseTask>, zones: ZoneMap) -> ProjectInput {
        ProjectInput {
            base_tasks,
            zones,
            quantity_matrix: QuantityMatrix::new(),
            workers: Vec::new(),
            equipment: Vec::new(),
            calendar: calendar_config(),
            sequencing: SequencingConfig::new(),
            cross_floor_links: CrossFloorLinks::new(),
            ground_disciplines: HashSet::new(),
            acceleration: AccelerationProfile::new(),
            shift_profile: HashMap::new(),
        }
    }

    #[test]
    fn single_zone_linear_chain_resolves_intra_floor_predecessors() {
        let mut a = BaseTask::new("A", "Footing", "GrosŒuvre");
        a.task_type = TaskType::Worker;
        let mut b = BaseTask::new("B", "Wall", "GrosŒuvre");
        b.predecessors = vec!["A".to_string()];
        b.task_type = TaskType::Worker;

        let mut base_tasks = IndexMap::new();
        base_tasks.insert("A".to_string(), a);
        base_tasks.insert("B".to_string(), b);
        let mut zones = ZoneMap::new();
        zones.insert("Z1".to_string(), 0);

        let result = expand(&minimal_input(base_tasks, zones)).unwrap();
        assert_eq!(result.tasks.len(), 2);
        let b_task = &result.tasks["B-F0-Z1"];
        assert_eq!(b_task.predecessors, vec!["A-F0-Z1".to_string()]);
    }

    #[test]
    fn vertical_repetition_chains_floors_within_a_zone() {
        let mut base = BaseTask::new("C", "Column", "GrosŒuvre");
        base.repeat_on_floor = true;
        base.cross_floor_repetition = true;

        let mut base_tasks = IndexMap::new();
        base_tasks.insert("C".to_string(), base);
        let mut zones = ZoneMap::new();
        zones.insert("Z1".to_string(), 2);

        let result = expand(&minimal_input(base_tasks, zones)).unwrap();
        assert_eq!(result.tasks.len(), 3);
        assert!(result.tasks["C-F1-Z1"].predecessors.contains(&"C-F0-Z1".to_string()));
        assert!(result.tasks["C-F2-Z1"].predecessors.contains(&"C-F1-Z1".to_string()));
        assert!(result.tasks["C-F0-Z1"].predecessors.is_empty());
    }

    #[test]
    fn cross_zone_group_sequential_chains_groups_not_zones_within_a_group() {
        let mut base = BaseTask::new("D", "Slab", "GrosŒuvre");
        base.repeat_on_floor = false;

        let mut base_tasks = IndexMap::new();
        base_tasks.insert("D".to_string(), base);
        let mut zones = ZoneMap::new();
        zones.insert("Z1".to_string(), 0);
        zones.insert("Z2".to_string(), 0);
        zones.insert("Z3".to_string(), 0);

        let mut input = minimal_input(base_tasks, zones);
        input.sequencing.insert(
            "GrosŒuvre".to_string(),
            crate::input::ZoneGroupConfig {
                zone_groups: vec![vec!["Z1".to_string(), "Z2".to_string()], vec!["Z3".to_string()]],
                strategy: SequencingStrategy::GroupSequential,
                parallel_with: HashMap::new(),
            },
        );

        let result = expand(&input).unwrap();
        assert!(result.tasks["D-F0-Z1"].predecessors.is_empty());
        assert!(result.tasks["D-F0-Z2"].predecessors.is_empty());
        let z3_preds = &result.tasks["D-F0-Z3"].predecessors;
        assert!(z3_preds.contains(&"D-F0-Z1".to_string()));
        assert!(z3_preds.contains(&"D-F0-Z2".to_string()));
    }

    #[test]
    fn unresolved_custom_dependency_is_a_warning_not_a_failure() {
        let mut base = BaseTask::new("E", "Finish", "Finitions");
        base.repeat_on_floor = false;
        base.extended_edges.custom_dependencies.push(crate::types::CustomDependency {
            target_base_id: "Nonexistent".to_string(),
            zones: None,
            floor_range: None,
        });

        let mut base_tasks = IndexMap::new();
        base_tasks.insert("E".to_string(), base);
        let mut zones = ZoneMap::new();
        zones.insert("Z1".to_string(), 0);

        let result = expand(&minimal_input(base_tasks, zones)).unwrap();
        assert!(result.report.has_warnings());
        assert!(result.tasks["E-F0-Z1"].predecessors.is_empty());
    }

    #[test]
    fn cycle_is_rejected() {
        let mut a = BaseTask::new("A", "A", "X");
        a.predecessors = vec!["B".to_string()];
        a.repeat_on_floor = false;
        let mut b = BaseTask::new("B", "B", "X");
        b.predecessors = vec!["A".to_string()];
        b.repeat_on_floor = false;

        let mut base_tasks = IndexMap::new();
        base_tasks.insert("A".to_string(), a);
        base_tasks.insert("B".to_string(), b);
        let mut zones = ZoneMap::new();
        zones.insert("Z1".to_string(), 0);

        let err = expand(&minimal_input(base_tasks, zones)).unwrap_err();
        assert!(matches!(err, FormworkError::CycleDetected));
    }

    #[test]
    fn expansion_is_deterministic_across_runs() {
        let mut a = BaseTask::new("A", "Footing", "GrosŒuvre");
        a.repeat_on_floor = false;
        let mut b = BaseTask::new("B", "Wall", "GrosŒuvre");
        b.predecessors = vec!["A".to_string()];
        b.repeat_on_floor = false;

        let mut base_tasks = IndexMap::new();
        base_tasks.insert("A".to_string(), a);
        base_tasks.insert("B".to_string(), b);
        let mut zones = ZoneMap::new();
        zones.insert("Z1".to_string(), 1);

        let input = minimal_input(base_tasks, zones);
        let first = expand(&input).unwrap();
        let second = expand(&input).unwrap();

        let first_ids: Vec<&String> = first.tasks.keys().collect();
        let second_ids: Vec<&String> = second.tasks.keys().collect();
        assert_eq!(first_ids, second_ids);
        for id in first.tasks.keys() {
            assert_eq!(first.tasks[id].predecessors, second.tasks[id].predecessors);
        }
    }

    #[test]
    fn cross_floor_dependency_naming_an_undeclared_zone_is_rejected() {
        use crate::types::{CrossFloorDependency, ExtendedEdges};

        let mut a = BaseTask::new("A", "Footing", "GrosŒuvre");
        a.extended_edges = ExtendedEdges {
            cross_floor_dependencies: vec![CrossFloorDependency {
                target_base_id: "A".to_string(),
                floor_offset: -1,
                zone: Some("GhostZone".to_string()),
            }],
            custom_dependencies: Vec::new(),
        };

        let mut base_tasks = IndexMap::new();
        base_tasks.insert("A".to_string(), a);
        let mut zones = ZoneMap::new();
        zones.insert("Z1".to_string(), 1);

        let err = expand(&minimal_input(base_tasks, zones)).unwrap_err();
        assert!(matches!(err, FormworkError::InvalidZoneReference { zone } if zone == "GhostZone"));
    }

    #[test]
    fn cross_floor_link_fires_regardless_of_vertical_workflow() {
        let mut rebar = BaseTask::new("REBAR", "Rebar", "GrosŒuvre");
        rebar.repeat_on_floor = true;
        let mut pour = BaseTask::new("POUR", "Pour", "GrosŒuvre");
        pour.repeat_on_floor = true;
        pour.vertical_workflow = false;

        let mut base_tasks = IndexMap::new();
        base_tasks.insert("REBAR".to_string(), rebar);
        base_tasks.insert("POUR".to_string(), pour);
        let mut zones = ZoneMap::new();
        zones.insert("Z1".to_string(), 1);

        let mut input = minimal_input(base_tasks, zones);
        input.cross_floor_links.insert("POUR".to_string(), vec!["REBAR".to_string()]);

        let result = expand(&input).unwrap();
        assert!(result.tasks["POUR-F1-Z1"].predecessors.contains(&"REBAR-F0-Z1".to_string()));
        assert!(result.tasks["POUR-F0-Z1"].predecessors.is_empty());
    }

    #[test]
    fn vertical_repetition_requires_vertical_workflow_too() {
        let mut base = BaseTask::new("C", "Column", "GrosŒuvre");
        base.repeat_on_floor = true;
        base.cross_floor_repetition = true;
        base.vertical_workflow = false;

        let mut base_tasks = IndexMap::new();
        base_tasks.insert("C".to_string(), base);
        let mut zones = ZoneMap::new();
        zones.insert("Z1".to_string(), 2);

        let result = expand(&minimal_input(base_tasks, zones)).unwrap();
        assert!(result.tasks["C-F1-Z1"].predecessors.is_empty());
        assert!(result.tasks["C-F2-Z1"].predecessors.is_empty());
    }

    #[test]
    fn ground_discipline_predecessor_flattens_to_floor_zero() {
        let mut foundation = BaseTask::new("FOUND", "Foundation", "Terrassement");
        foundation.repeat_on_floor = false;
        let mut wall = BaseTask::new("WALL", "Wall", "GrosŒuvre");
        wall.predecessors = vec!["FOUND".to_string()];
        wall.repeat_on_floor = true;

        let mut base_tasks = IndexMap::new();
        base_tasks.insert("FOUND".to_string(), foundation);
        base_tasks.insert("WALL".to_string(), wall);
        let mut zones = ZoneMap::new();
        zones.insert("Z1".to_string(), 2);

        let mut input = minimal_input(base_tasks, zones);
        input.ground_disciplines.insert("Terrassement".to_string());

        let result = expand(&input).unwrap();
        assert!(result.tasks["WALL-F0-Z1"].predecessors.contains(&"FOUND-F0-Z1".to_string()));
        assert!(result.tasks["WALL-F1-Z1"].predecessors.contains(&"FOUND-F0-Z1".to_string()));
        assert!(result.tasks["WALL-F2-Z1"].predecessors.contains(&"FOUND-F0-Z1".to_string()));
    }

    #[test]
    fn negative_quantity_in_the_quantity_matrix_is_a_configuration_error() {
        let a = BaseTask::new("A", "Footing", "GrosŒuvre");
        let mut base_tasks = IndexMap::new();
        base_tasks.insert("A".to_string(), a);
        let mut zones = ZoneMap::new();
        zones.insert("Z1".to_string(), 0);

        let mut input = minimal_input(base_tasks, zones);
        let mut by_zone = HashMap::new();
        by_zone.insert("Z1".to_string(), -5.0);
        let mut by_floor = HashMap::new();
        by_floor.insert(0u32, by_zone);
        input.quantity_matrix.insert("A".to_string(), by_floor);

        let err = expand(&input).unwrap_err();
        assert!(matches!(err, FormworkError::ConfigurationError(_)));
    }
}
