//! Per-resource allocation ledgers for workers and equipment (component C).
//!
//! Two parallel pools — one keyed by worker role, one by equipment name —
//! share the same ledger shape: an ordered sequence of allocation records per
//! resource, plus a `task_id -> records` index so `release` doesn't have to
//! scan every resource's full history.

use crate::types::{EquipmentKey, EquipmentResource, Task, WorkerResource};
use chrono::NaiveDate;
use indexmap::IndexMap;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct AllocationRecord {
    pub task_id: String,
    pub base_id: String,
    pub units: u32,
    pub start: NaiveDate,
    /// Exclusive.
    pub end: NaiveDate,
}

impl AllocationRecord {
    fn overlaps(&self, start: NaiveDate, end: NaiveDate) -> bool {
        self.start < end && start < self.end
    }
}

/// The allocation ledger for a single named resource (one worker role, or one
/// named piece of equipment).
#[derive(Debug, Clone, Default)]
struct ResourceLedger {
    records: Vec<AllocationRecord>,
}

impl ResourceLedger {
    /// Peak simultaneous occupancy over `[start, end)`, via a sweep over the
    /// endpoints of every overlapping record.
    fn peak_usage(&self, start: NaiveDate, end: NaiveDate) -> u32 {
        let overlapping: Vec<&AllocationRecord> =
            self.records.iter().filter(|r| r.overlaps(start, end)).collect();
        if overlapping.is_empty() {
            return 0;
        }
        let mut events: Vec<(NaiveDate, i64)> = Vec::with_capacity(overlapping.len() * 2);
        for r in &overlapping {
            events.push((r.start.max(start), r.units as i64));
            events.push((r.end.min(end), -(r.units as i64)));
        }
        events.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
        let mut running = 0i64;
        let mut peak = 0i64;
        for (_, delta) in events {
            running += delta;
            peak = peak.max(running);
        }
        peak.max(0) as u32
    }

    fn push(&mut self, record: AllocationRecord) {
        self.records.push(record);
    }

    fn release(&mut self, task_id: &str) {
        self.records.retain(|r| r.task_id != task_id);
    }
}

/// Shared capacity/ledger machinery for one role (worker pool) or one named
/// piece of equipment (equipment pool).
#[derive(Debug, Clone)]
struct ResourceEntry {
    capacity: u32,
    per_task_cap: HashMap<String, u32>,
    ledger: ResourceLedger,
}

impl ResourceEntry {
    fn new(capacity: u32, per_task_cap: HashMap<String, u32>) -> Self {
        Self {
            capacity,
            per_task_cap,
            ledger: ResourceLedger::default(),
        }
    }

    fn feasible_units(&self, base_id: &str, start: NaiveDate, end: NaiveDate) -> u32 {
        let peak = self.ledger.peak_usage(start, end);
        let headroom = self.capacity.saturating_sub(peak);
        match self.per_task_cap.get(base_id) {
            Some(&cap) => headroom.min(cap),
            None => headroom,
        }
    }
}

/// Worker pool keyed by role name (`WorkerResource::name`).
#[derive(Debug, Clone, Default)]
pub struct WorkerPool {
    entries: HashMap<String, ResourceEntry>,
    task_role: HashMap<String, String>,
}

impl WorkerPool {
    pub fn new(resources: &[WorkerResource]) -> Self {
        let entries = resources
            .iter()
            .map(|r| (r.name.clone(), ResourceEntry::new(r.count, r.max_crews.clone())))
            .collect();
        Self {
            entries,
            task_role: HashMap::new(),
        }
    }

    pub fn capacity(&self, role: &str) -> u32 {
        self.entries.get(role).map(|e| e.capacity).unwrap_or(0)
    }

    /// Largest feasible crew count over `[start, end)`; the caller compares
    /// this against `task.min_crews_needed` (or an accelerated target) and
    /// slides the window on shortfall.
    pub fn compute_allocation(&self, task: &Task, start: NaiveDate, end: NaiveDate) -> u32 {
        match self.entries.get(&task.resource_type) {
            Some(entry) => entry.feasible_units(&task.base_id, start, end),
            None => 0,
        }
    }

    pub fn allocate(&mut self, task: &Task, start: NaiveDate, end: NaiveDate, units: u32) {
        self.release(&task.id);
        if let Some(entry) = self.entries.get_mut(&task.resource_type) {
            entry.ledger.push(AllocationRecord {
                task_id: task.id.clone(),
                base_id: task.base_id.clone(),
                units,
                start,
                end,
            });
        }
        self.task_role.insert(task.id.clone(), task.resource_type.clone());
    }

    pub fn release(&mut self, task_id: &str) {
        if let Some(role) = self.task_role.remove(task_id) {
            if let Some(entry) = self.entries.get_mut(&role) {
                entry.ledger.release(task_id);
            }
        }
    }

    pub fn peak_usage(&self, role: &str, start: NaiveDate, end: NaiveDate) -> u32 {
        self.entries.get(role).map(|e| e.ledger.peak_usage(start, end)).unwrap_or(0)
    }
}

/// The set of per-member units granted for one equipment requirement key.
#[derive(Debug, Clone, Default)]
pub struct EquipmentAllocation {
    pub by_member: IndexMap<String, u32>,
}

impl EquipmentAllocation {
    pub fn total(&self) -> u32 {
        self.by_member.values().sum()
    }
}

/// Equipment pool keyed by named piece of equipment (`EquipmentResource::name`).
#[derive(Debug, Clone, Default)]
pub struct EquipmentPool {
    entries: HashMap<String, ResourceEntry>,
    task_members: HashMap<String, Vec<String>>,
}

impl EquipmentPool {
    pub fn new(resources: &[EquipmentResource]) -> Self {
        let entries = resources
            .iter()
            .map(|r| (r.name.clone(), ResourceEntry::new(r.count, r.max_equipment.clone())))
            .collect();
        Self {
            entries,
            task_members: HashMap::new(),
        }
    }

    pub fn capacity(&self, name: &str) -> u32 {
        self.entries.get(name).map(|e| e.capacity).unwrap_or(0)
    }

    /// Tries to fill `min_needed` units of `key` over `[start, end)`, scanning
    /// interchangeable members in declared order and greedily assigning the
    /// spare capacity of each until the requirement is met or members are
    /// exhausted. Does not mutate the ledger.
    pub fn compute_allocation(
        &self,
        base_id: &str,
        key: &EquipmentKey,
        min_needed: u32,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EquipmentAllocation {
        let mut result = EquipmentAllocation::default();
        let mut remaining = min_needed;
        for member in key.members() {
            if remaining == 0 {
                break;
            }
            let available = self
                .entries
                .get(member)
                .map(|e| e.feasible_units(base_id, start, end))
                .unwrap_or(0);
            if available == 0 {
                continue;
            }
            let grant = available.min(remaining);
            result.by_member.insert(member.clone(), grant);
            remaining -= grant;
        }
        result
    }

    pub fn allocate(
        &mut self,
        task: &Task,
        start: NaiveDate,
        end: NaiveDate,
        allocation: &EquipmentAllocation,
    ) {
        self.release(&task.id);
        let mut members = Vec::new();
        for (member, &units) in &allocation.by_member {
            if units == 0 {
                continue;
            }
            if let Some(entry) = self.entries.get_mut(member) {
                entry.ledger.push(AllocationRecord {
                    task_id: task.id.clone(),
                    base_id: task.base_id.clone(),
                    units,
                    start,
                    end,
                });
                members.push(member.clone());
            }
        }
        self.task_members.insert(task.id.clone(), members);
    }

    pub fn release(&mut self, task_id: &str) {
        if let Some(members) = self.task_members.remove(task_id) {
            for member in members {
                if let Some(entry) = self.entries.get_mut(&member) {
                    entry.ledger.release(task_id);
                }
            }
        }
    }

    pub fn peak_usage(&self, name: &str, start: NaiveDate, end: NaiveDate) -> u32 {
        self.entries.get(name).map(|e| e.ledger.peak_usage(start, end)).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DurationMethod, TaskStatus, TaskType};

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::days(offset)
    }

    fn worker_task(id: &str, role: &str, base_id: &str) -> Task {
        Task {
            id: id.to_string(),
            base_id: base_id.to_string(),
            discipline: "Test".into(),
            zone: "Z1".into(),
            floor: 0,
            resource_type: role.to_string(),
            task_type: TaskType::Worker,
            duration_method: DurationMethod::Fixed,
            base_duration: Some(3.0),
            unit_duration: 0.0,
            quantity: 0.0,
            min_crews_needed: 1,
            min_equipment_needed: IndexMap::new(),
            predecessors: Vec::new(),
            delay: 0,
            included: true,
            nominal_duration: Some(3.0),
            allocated_crews: 0,
            allocated_equipment: IndexMap::new(),
            earliest_start: None,
            scheduled_end: None,
            status: TaskStatus::Planned,
        }
    }

    #[test]
    fn capacity_one_serializes_two_contending_tasks() {
        let mut pool = WorkerPool::new(&[WorkerResource {
            name: "R".into(),
            count: 1,
            hourly_rate: 10.0,
            productivity_rates: HashMap::new(),
            max_crews: HashMap::new(),
            efficiency: 1.0,
        }]);

        let x = worker_task("X", "R", "X");
        assert_eq!(pool.compute_allocation(&x, day(0), day(3)), 1);
        pool.allocate(&x, day(0), day(3), 1);

        // Y contends for the same window: no headroom left.
        let y = worker_task("Y", "R", "Y");
        assert_eq!(pool.compute_allocation(&y, day(0), day(3)), 0);
        // After X's window, Y fits.
        assert_eq!(pool.compute_allocation(&y, day(3), day(6)), 1);
    }

    #[test]
    fn release_frees_capacity_for_the_same_window() {
        let mut pool = WorkerPool::new(&[WorkerResource {
            name: "R".into(),
            count: 1,
            hourly_rate: 10.0,
            productivity_rates: HashMap::new(),
            max_crews: HashMap::new(),
            efficiency: 1.0,
        }]);
        let x = worker_task("X", "R", "X");
        pool.allocate(&x, day(0), day(3), 1);
        pool.release("X");
        assert_eq!(pool.compute_allocation(&x, day(0), day(3)), 1);
    }

    #[test]
    fn interchangeable_group_fills_from_spare_member() {
        let pool = EquipmentPool::new(&[
            EquipmentResource {
                name: "E1".into(),
                count: 0,
                hourly_rate: 0.0,
                productivity_rates: HashMap::new(),
                max_equipment: HashMap::new(),
                efficiency: 1.0,
            },
            EquipmentResource {
                name: "E2".into(),
                count: 1,
                hourly_rate: 0.0,
                productivity_rates: HashMap::new(),
                max_equipment: HashMap::new(),
                efficiency: 1.0,
            },
        ]);
        let key = EquipmentKey::Group(vec!["E1".into(), "E2".into()]);
        let allocation = pool.compute_allocation("T", &key, 1, day(0), day(3));
        assert_eq!(allocation.total(), 1);
        assert_eq!(allocation.by_member.get("E2"), Some(&1));
        assert!(allocation.by_member.get("E1").is_none());
    }
}
