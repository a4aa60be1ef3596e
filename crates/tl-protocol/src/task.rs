//! Task and step snapshot types
//!
//! These mirror the orchestration service's authoritative task records. The
//! client treats them as opaque, read-only snapshots: it never mutates fields
//! locally, only replaces its last-known copy when a new `task_update` event
//! arrives.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a single step within a task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    /// Step has not been started
    #[serde(rename = "open")]
    Open,
    /// Step is currently executing
    #[serde(rename = "in-progress")]
    InProgress,
    /// Step finished successfully
    #[serde(rename = "completed")]
    Completed,
    /// Step failed (may be retried up to the task's `max_retries`)
    #[serde(rename = "failed")]
    Failed,
    /// Step is waiting on human input
    #[serde(rename = "human")]
    Human,
}

/// A single step within a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// What this step does
    pub description: String,
    /// Why the planner chose this step
    pub reasoning: String,
    /// Current lifecycle status
    #[serde(default = "StepStatus::default_status")]
    pub status: StepStatus,
    /// Details of the most recent failure, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_details: Option<String>,
    /// Number of times this step has been retried
    #[serde(default)]
    pub retry_count: u32,
}

impl StepStatus {
    fn default_status() -> Self {
        StepStatus::Open
    }
}

/// Snapshot of a task held by the orchestration service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier
    pub task_id: String,
    /// Human-readable task description
    pub description: String,
    /// The goal the orchestrator is currently working toward
    pub current_goal: String,
    /// Accumulated detail lines, in insertion order
    #[serde(default)]
    pub details: Vec<String>,
    /// Accumulated notes, in insertion order
    #[serde(default)]
    pub notes: Vec<String>,
    /// Planned steps, in execution order
    #[serde(default)]
    pub steps: Vec<Step>,
    /// Path to the task's scratchpad file on the orchestrator
    pub scratchpad_path: String,
    /// Maximum retries per step before the task is marked failed
    #[serde(default = "Task::default_max_retries")]
    pub max_retries: u32,
}

impl Task {
    fn default_max_retries() -> u32 {
        3
    }
}
