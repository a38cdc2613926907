//! The data model (§3): base task templates, expanded instances, resources,
//! and the equipment-group key used throughout the allocator.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskType {
    Worker,
    Equipment,
    Material,
    Hybrid,
    Supervision,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DurationMethod {
    Fixed,
    QuantityBased,
    ResourceCalculation,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TaskStatus {
    Planned,
    InProgress,
    Completed,
    Delayed,
    OnHold,
}

/// Which floors a base task applies to. Replaces attribute-presence probing
/// (`applies_to_floors`, `custom_floor_range`) with an explicit tagged variant;
/// `Auto` falls through to the ground-discipline / repeat-on-floor default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FloorPolicy {
    Auto,
    GroundOnly,
    AboveGround,
    AllFloors,
    CustomRange { start_floor: u32, end_floor: u32 },
}

impl Default for FloorPolicy {
    fn default() -> Self {
        FloorPolicy::Auto
    }
}

/// A single equipment requirement key: either one named piece of equipment,
/// or a group of mutually interchangeable names, scanned in declared order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum EquipmentKey {
    Single(String),
    Group(Vec<String>),
}

impl EquipmentKey {
    pub fn members(&self) -> &[String] {
        match self {
            EquipmentKey::Single(name) => std::slice::from_ref(name),
            EquipmentKey::Group(names) => names,
        }
    }
}

/// A user-configured cross-floor predecessor (E3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossFloorDependency {
    pub target_base_id: String,
    pub floor_offset: i32,
    pub zone: Option<String>,
}

/// A user-configured custom predecessor (E6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomDependency {
    pub target_base_id: String,
    pub zones: Option<Vec<String>>,
    pub floor_range: Option<(u32, u32)>,
}

/// The extended, user-authored edge sets a base task may carry beyond its
/// plain `predecessors` list (E1). Grouped per the REDESIGN FLAG so the
/// expander can match on a single optional record instead of probing fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtendedEdges {
    pub cross_floor_dependencies: Vec<CrossFloorDependency>,
    pub custom_dependencies: Vec<CustomDependency>,
}

/// The template for a kind of work, reusable across zones and floors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseTask {
    pub id: String,
    pub name: String,
    pub discipline: String,
    pub sub_discipline: Option<String>,
    pub resource_type: String,
    pub task_type: TaskType,
    pub base_duration: f64,
    pub unit_duration: f64,
    pub duration_method: DurationMethod,
    pub min_crews_needed: u32,
    pub min_equipment_needed: IndexMap<EquipmentKey, u32>,
    pub predecessors: Vec<String>,
    pub floor_policy: FloorPolicy,
    pub repeat_on_floor: bool,
    pub cross_floor_repetition: bool,
    pub vertical_workflow: bool,
    pub extended_edges: ExtendedEdges,
    pub risk_factor: f64,
    /// Calendar days appended to this task's end when a successor computes
    /// its earliest start (a predecessor-side lag, never a self-offset).
    pub delay: i64,
    pub weather_sensitive: bool,
    pub quality_gate: Option<String>,
    pub included: bool,
}

impl BaseTask {
    /// Minimal base task with every policy at its documented default.
    pub fn new(id: impl Into<String>, name: impl Into<String>, discipline: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            discipline: discipline.into(),
            sub_discipline: None,
            resource_type: String::new(),
            task_type: TaskType::Worker,
            base_duration: 1.0,
            unit_duration: 0.0,
            duration_method: DurationMethod::Fixed,
            min_crews_needed: 1,
            min_equipment_needed: IndexMap::new(),
            predecessors: Vec::new(),
            floor_policy: FloorPolicy::Auto,
            repeat_on_floor: true,
            cross_floor_repetition: false,
            vertical_workflow: true,
            extended_edges: ExtendedEdges::default(),
            risk_factor: 1.0,
            delay: 0,
            weather_sensitive: false,
            quality_gate: None,
            included: true,
        }
    }
}

/// A concrete realization of a `BaseTask` for a given (zone, floor), with the
/// mutable fields the scheduler fills in as it commits the task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// `"{base_id}-F{floor}-{zone}"`.
    pub id: String,
    pub base_id: String,
    pub discipline: String,
    pub zone: String,
    pub floor: u32,
    pub resource_type: String,
    pub task_type: TaskType,
    pub duration_method: DurationMethod,
    pub base_duration: Option<f64>,
    pub unit_duration: f64,
    pub quantity: f64,
    pub min_crews_needed: u32,
    pub min_equipment_needed: IndexMap<EquipmentKey, u32>,
    pub predecessors: Vec<String>,
    pub delay: i64,
    pub included: bool,

    // Filled in during scheduling:
    pub nominal_duration: Option<f64>,
    pub allocated_crews: u32,
    pub allocated_equipment: IndexMap<String, u32>,
    pub earliest_start: Option<NaiveDate>,
    pub scheduled_end: Option<NaiveDate>,
    pub status: TaskStatus,
}

impl Task {
    pub fn instance_id(base_id: &str, floor: u32, zone: &str) -> String {
        format!("{base_id}-F{floor}-{zone}")
    }
}

/// A worker role's capacity, rates, and per-task productivity/caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerResource {
    pub name: String,
    pub count: u32,
    pub hourly_rate: f64,
    pub productivity_rates: HashMap<String, f64>,
    pub max_crews: HashMap<String, u32>,
    pub efficiency: f64,
}

impl WorkerResource {
    pub fn daily_cost(&self) -> f64 {
        self.hourly_rate * 8.0
    }
}

/// A named piece of equipment's capacity, rates, and per-task productivity/caps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentResource {
    pub name: String,
    pub count: u32,
    pub hourly_rate: f64,
    pub productivity_rates: HashMap<String, f64>,
    pub max_equipment: HashMap<String, u32>,
    pub efficiency: f64,
}

impl EquipmentResource {
    pub fn daily_cost(&self) -> f64 {
        self.hourly_rate * 8.0
    }
}
