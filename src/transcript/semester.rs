//! Semester tagging for raw transcript documents.
//!
//! Records graded in Q1/Q2 belong to semester 1, records graded in Q3/Q4 to
//! semester 2. Records with no quarter grade get `semester: null`.

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use std::path::Path;
use tracing::info;

const FIRST_SEMESTER: &[&str] = &["Q1", "Q2"];
const SECOND_SEMESTER: &[&str] = &["Q3", "Q4"];

/// Semester implied by a course record's `grades` object.
pub fn semester_of(record: &Value) -> Option<u8> {
    let graded = |quarters: &[&str]| {
        quarters.iter().any(|q| {
            record
                .get("grades")
                .and_then(|g| g.get(q))
                .is_some_and(|v| !v.is_null())
        })
    };

    if graded(FIRST_SEMESTER) {
        Some(1)
    } else if graded(SECOND_SEMESTER) {
        Some(2)
    } else {
        None
    }
}

/// Sets `semester` on every object in `course_history`. Returns the number of
/// records that received a non-null semester.
pub fn tag_semesters(doc: &mut Value) -> Result<usize> {
    let history = doc
        .get_mut("course_history")
        .and_then(Value::as_array_mut)
        .ok_or_else(|| anyhow!("transcript has no course_history array"))?;

    let mut tagged = 0;
    for record in history.iter_mut() {
        let semester = semester_of(record);
        if semester.is_some() {
            tagged += 1;
        }
        if let Value::Object(map) = record {
            map.insert("semester".to_string(), semester.map_or(Value::Null, Value::from));
        }
    }

    Ok(tagged)
}

/// Tags the transcript at `path` in place.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn tag_transcript_file<P: AsRef<Path>>(path: P) -> Result<usize> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read transcript {}", path.display()))?;
    let mut doc: Value = serde_json::from_str(&content)
        .with_context(|| format!("transcript {} is not valid JSON", path.display()))?;

    let tagged = tag_semesters(&mut doc)?;

    std::fs::write(path, serde_json::to_string_pretty(&doc)?)
        .with_context(|| format!("failed to write transcript {}", path.display()))?;
    info!(tagged, "Added semester field to transcript");
    Ok(tagged)
}
