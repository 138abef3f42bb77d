//! Declarative GPA policy documents.
//!
//! A policy describes how one institution computes GPA: which rows count,
//! which grade columns to read, the letter-to-points scale and the rounding
//! precision. Policies are loaded from JSON; nested sections reject unknown
//! fields so a misspelled key fails at load time instead of silently taking a
//! default.

use crate::transcript::Cell;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Default number of decimal digits in a reported GPA.
pub const DEFAULT_PRECISION: u32 = 2;

/// A complete GPA policy for one school/campus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpaPolicy {
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default)]
    pub campus: Option<String>,
    #[serde(default)]
    pub gpa_policy_version: Option<String>,
    #[serde(default)]
    pub course_inclusion: Option<CourseInclusion>,
    pub grade_selection: GradeSelection,
    pub grade_scale: HashMap<String, f64>,
    #[serde(default)]
    pub calculation: Calculation,
}

/// Rows whose `dimension` value is in `exclude_values` are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CourseInclusion {
    #[serde(default)]
    pub dimension: Option<String>,
    #[serde(default)]
    pub exclude_values: Vec<Cell>,
}

/// Candidate grade columns, in priority order, and values meaning "no grade".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GradeSelection {
    pub use_columns: Vec<String>,
    /// `None` entries stand for JSON `null`.
    #[serde(default = "default_ignore_values")]
    pub ignore_values: Vec<Option<Cell>>,
}

fn default_ignore_values() -> Vec<Option<Cell>> {
    vec![None]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Calculation {
    #[serde(default)]
    pub rounding: Rounding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Rounding {
    #[serde(default = "default_precision")]
    pub precision: u32,
}

fn default_precision() -> u32 {
    DEFAULT_PRECISION
}

impl Default for Rounding {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl GpaPolicy {
    /// Minimal policy reading `use_columns` against `grade_scale`.
    pub fn new(school: &str, use_columns: &[&str], grade_scale: &[(&str, f64)]) -> Self {
        Self {
            school: Some(school.to_string()),
            campus: None,
            gpa_policy_version: None,
            course_inclusion: None,
            grade_selection: GradeSelection {
                use_columns: use_columns.iter().map(|c| c.to_string()).collect(),
                ignore_values: default_ignore_values(),
            },
            grade_scale: grade_scale
                .iter()
                .map(|(letter, points)| (letter.to_string(), *points))
                .collect(),
            calculation: Calculation::default(),
        }
    }

    /// School name usable as a summary key; empty names count as absent.
    pub fn school_key(&self) -> Option<&str> {
        self.school.as_deref().filter(|s| !s.is_empty())
    }

    /// Name used in diagnostics when the policy has no school.
    pub fn school_label(&self) -> &str {
        self.school_key().unwrap_or("<unnamed policy>")
    }

    pub fn precision(&self) -> u32 {
        self.calculation.rounding.precision
    }

    /// `true` if `value` counts as "no grade" under this policy.
    pub fn is_ignored(&self, value: Option<&Cell>) -> bool {
        match value {
            None => true,
            Some(cell) if cell.is_null() => true,
            Some(cell) => self
                .grade_selection
                .ignore_values
                .iter()
                .any(|ignored| ignored.as_ref() == Some(cell)),
        }
    }
}

/// Parses a single policy document.
pub fn parse_policy(json: &str) -> Result<GpaPolicy> {
    Ok(serde_json::from_str(json)?)
}

/// Loads one policy file.
pub fn load_policy<P: AsRef<Path>>(path: P) -> Result<GpaPolicy> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read policy {}", path.display()))?;
    parse_policy(&content).with_context(|| format!("invalid policy {}", path.display()))
}

/// Loads every `*.json` policy in `dir`, ordered by file name.
#[tracing::instrument(skip_all, fields(dir = %dir.as_ref().display()))]
pub fn load_policies<P: AsRef<Path>>(dir: P) -> Result<Vec<GpaPolicy>> {
    let dir = dir.as_ref();
    let mut paths: Vec<PathBuf> = Vec::new();

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read policy directory {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some("json") {
            paths.push(path);
        }
    }
    paths.sort();

    let mut policies = Vec::with_capacity(paths.len());
    for path in paths {
        let policy = load_policy(&path)?;
        debug!(path = %path.display(), school = policy.school_label(), "Loaded policy");
        policies.push(policy);
    }

    info!(count = policies.len(), "Loaded GPA policies");
    Ok(policies)
}
