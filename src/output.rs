//! Output formatting and persistence for GPA summaries.
//!
//! Supports JSON logging, writing the summary document, and appending a CSV
//! history of per-school results.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info};

use crate::gpa::GpaSummary;
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// One CSV history row: a single school's result from one batch run.
#[derive(Debug, Serialize)]
pub struct HistoryRecord<'a> {
    pub last_updated: String,
    pub school: &'a str,
    pub campus: Option<&'a str>,
    pub policy_version: Option<&'a str>,
    pub gpa: f64,
    pub credits_counted: f64,
    pub semester_grades_counted: usize,
}

/// Logs the summary as pretty-printed JSON.
pub fn print_json(summary: &GpaSummary) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// Writes the summary as pretty-printed JSON, creating parent directories.
pub fn write_summary(path: &str, summary: &GpaSummary) -> Result<()> {
    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let body = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, body).with_context(|| format!("failed to write summary {path}"))?;
    debug!(path, schools = summary.gpas.len(), "Summary written");
    Ok(())
}

/// Appends one row per school to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_history(path: &str, summary: &GpaSummary) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, "Appending GPA history");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists) // IMPORTANT when appending
        .from_writer(file);

    let last_updated = summary.last_updated.to_rfc3339();
    for (school, result) in &summary.gpas {
        writer.serialize(HistoryRecord {
            last_updated: last_updated.clone(),
            school,
            campus: result.campus.as_deref(),
            policy_version: result.policy_version.as_deref(),
            gpa: result.gpa,
            credits_counted: result.credits_counted,
            semester_grades_counted: result.semester_grades_counted,
        })?;
    }
    writer.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpa::GpaResult;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn summary() -> GpaSummary {
        let mut gpas = BTreeMap::new();
        gpas.insert(
            "North".to_string(),
            GpaResult {
                campus: Some("Main".into()),
                gpa: 3.5,
                policy_version: Some("1.0".into()),
                credits_counted: 2.0,
                semester_grades_counted: 2,
            },
        );
        gpas.insert(
            "South".to_string(),
            GpaResult {
                campus: None,
                gpa: 3.0,
                policy_version: None,
                credits_counted: 1.0,
                semester_grades_counted: 1,
            },
        );
        GpaSummary {
            last_updated: Utc::now(),
            gpas,
        }
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&summary()).unwrap();
    }

    #[test]
    fn test_write_summary_shape() {
        let dir = env::temp_dir().join("transcript_gpa_test_summary");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("nested/gpa_summary.json");
        let path = path.to_str().unwrap();

        write_summary(path, &summary()).unwrap();

        let doc: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert!(doc["last_updated"].is_string());
        assert_eq!(doc["gpas"]["North"]["gpa"], 3.5);
        assert_eq!(doc["gpas"]["North"]["semester_grades_counted"], 2);
        assert!(doc["gpas"]["South"]["campus"].is_null());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_append_history_writes_header_once() {
        let path = temp_path("transcript_gpa_test_history.csv");
        let _ = fs::remove_file(&path);

        append_history(&path, &summary()).unwrap();
        append_history(&path, &summary()).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let header_count = content.lines().filter(|l| l.starts_with("last_updated")).count();
        assert_eq!(header_count, 1);
        // 1 header + 2 schools * 2 runs
        assert_eq!(content.lines().count(), 5);

        fs::remove_file(&path).unwrap();
    }
}
