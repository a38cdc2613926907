//! The loader boundary (§1, §6, §10.3): plain record types a caller
//! populates however it likes. Spreadsheet parsing itself is out of scope —
//! these are the records a loader is expected to yield, plus a RON-backed
//! `RonProjectLoader` used by the CLI demo runner and integration tests.

use crate::types::{BaseTask, EquipmentResource, WorkerResource};
use crate::calendar::{Calendar, CalendarException, Holiday};
use chrono::{NaiveDate, Weekday};
use formwork_core::{utils, FormworkError, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// `zone_name -> max_floor`. An `IndexMap` so zone declaration order is
/// preserved — it governs iteration order for zone-group resolution (§5).
pub type ZoneMap = IndexMap<String, u32>;

/// `base_id -> floor -> zone -> quantity`.
pub type QuantityMatrix = HashMap<String, HashMap<u32, HashMap<String, f64>>>;

/// `base_id -> [base_id, ...]`, "depends on floor below" (E2).
pub type CrossFloorLinks = HashMap<String, Vec<String>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequencingStrategy {
    FullyParallel,
    GroupSequential,
}

/// A discipline's zone-group sequencing policy (E5).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneGroupConfig {
    pub zone_groups: Vec<Vec<String>>,
    pub strategy: SequencingStrategy,
    /// zone -> zones it runs in parallel with (exempted from E5's edge).
    pub parallel_with: HashMap<String, Vec<String>>,
}

impl ZoneGroupConfig {
    pub fn fully_parallel(zones: Vec<String>) -> Self {
        Self {
            zone_groups: vec![zones],
            strategy: SequencingStrategy::FullyParallel,
            parallel_with: HashMap::new(),
        }
    }
}

/// `discipline -> zone group sequencing policy`.
pub type SequencingConfig = HashMap<String, ZoneGroupConfig>;

/// A discipline's acceleration policy (§4.E acceleration hook).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccelerationEntry {
    pub factor: f64,
    pub max_crews: u32,
    pub constraints: Vec<String>,
}

/// `discipline -> acceleration policy`.
pub type AccelerationProfile = HashMap<String, AccelerationEntry>;

/// `discipline -> shift multiplier` (§10.4).
pub type ShiftConfig = HashMap<String, f64>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalendarConfig {
    pub start_date: NaiveDate,
    pub working_days: Vec<Weekday>,
    pub holidays: Vec<Holiday>,
    pub exceptions: Vec<CalendarException>,
}

impl CalendarConfig {
    pub fn into_calendar(self) -> Calendar {
        Calendar::new(self.start_date)
            .with_working_days(self.working_days)
            .with_holidays(self.holidays)
            .with_exceptions(self.exceptions)
    }
}

/// Every input `formwork_pm` needs for one scheduling run, as a single
/// serializable record. This is the loader boundary (§1): nothing here reads
/// a spreadsheet or a database, it is just data a caller already has.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInput {
    pub base_tasks: IndexMap<String, BaseTask>,
    pub zones: ZoneMap,
    pub quantity_matrix: QuantityMatrix,
    pub workers: Vec<WorkerResource>,
    pub equipment: Vec<EquipmentResource>,
    pub calendar: CalendarConfig,
    pub sequencing: SequencingConfig,
    pub cross_floor_links: CrossFloorLinks,
    pub ground_disciplines: HashSet<String>,
    pub acceleration: AccelerationProfile,
    #[serde(default)]
    pub shift_profile: ShiftConfig,
}

/// Reads a single RON document containing a whole `ProjectInput`. This is
/// config loading (§10.3), not the spreadsheet ingestion the spec excludes.
pub struct RonProjectLoader;

impl RonProjectLoader {
    pub fn load(path: impl AsRef<Path>) -> Result<ProjectInput> {
        let path = path.as_ref();
        if !utils::file_exists(path) {
            return Err(FormworkError::NotFound {
                kind: "project file",
                id: path.display().to_string(),
            });
        }
        let content = utils::read_file_to_string(path)?;
        utils::parse_ron(&content)
    }

    pub fn save(path: impl AsRef<Path>, input: &ProjectInput) -> Result<()> {
        let content = utils::format_ron_pretty(input)?;
        utils::write_string_to_file(path, &content)
    }
}
