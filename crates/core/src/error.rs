use thiserror::Error;

/// Closed set of failure kinds the scheduling engines can raise.
#[derive(Error, Debug)]
pub enum FormworkError {
    #[error("missing predecessor: task {task_id} references undefined predecessor {predecessor_id}")]
    MissingPredecessor {
        task_id: String,
        predecessor_id: String,
    },

    #[error("cycle detected in task dependency graph")]
    CycleDetected,

    #[error("invalid duration for task {task_id}: {reason}")]
    InvalidDuration { task_id: String, reason: String },

    #[error("resource starvation scheduling task {task_id}: {reason}")]
    ResourceStarvation { task_id: String, reason: String },

    #[error("scheduler stuck after {attempts} requeue attempts (task {task_id} waiting on unscheduled predecessor)")]
    SchedulerStuck { task_id: String, attempts: u32 },

    #[error("forward pass must run before backward pass")]
    ForwardPassRequired,

    #[error("invalid zone reference: {zone}")]
    InvalidZoneReference { zone: String },

    #[error("configuration error: {0}")]
    ConfigurationError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON serialization error: {0}")]
    RonSerialization(#[from] ron::Error),

    #[error("RON deserialization error: {0}")]
    RonDeserialization(#[from] ron::error::SpannedError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
}

pub type Result<T> = std::result::Result<T, FormworkError>;
