//! Result types produced by the GPA engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// GPA computed under a single policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpaResult {
    pub campus: Option<String>,
    pub gpa: f64,
    pub policy_version: Option<String>,
    pub credits_counted: f64,
    pub semester_grades_counted: usize,
}

/// Output of one batch run, keyed by school name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpaSummary {
    pub last_updated: DateTime<Utc>,
    pub gpas: BTreeMap<String, GpaResult>,
}
