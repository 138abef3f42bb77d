//! Builds a [`TranscriptTable`] from transcript JSON.
//!
//! Nested objects are flattened into dotted column names, so
//! `{"grades": {"Q1": "A"}}` becomes the column `grades.Q1`.

use super::{Cell, CourseRecord, TranscriptTable};
use anyhow::{Context, Result, anyhow, bail};
use serde_json::{Map, Value};
use std::path::Path;
use tracing::info;

/// Loads `course_history` from a transcript JSON file.
#[tracing::instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_transcript<P: AsRef<Path>>(path: P) -> Result<TranscriptTable> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read transcript {}", path.display()))?;
    let doc: Value = serde_json::from_str(&content)
        .with_context(|| format!("transcript {} is not valid JSON", path.display()))?;

    let history = doc
        .get("course_history")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("transcript {} has no course_history array", path.display()))?;

    let table = TranscriptTable::from_json_records(history)
        .with_context(|| format!("invalid course record in {}", path.display()))?;
    info!(entries = table.len(), "Loaded transcript");
    Ok(table)
}

impl TranscriptTable {
    /// Builds a table from raw JSON course records.
    pub fn from_json_records(records: &[Value]) -> Result<Self> {
        let mut rows = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            let Value::Object(map) = record else {
                bail!("course record {index} is not a JSON object");
            };
            let mut row = CourseRecord::new();
            flatten_into(&mut row, "", map);
            rows.push(row);
        }
        Ok(Self::from_records(rows))
    }
}

fn flatten_into(row: &mut CourseRecord, prefix: &str, map: &Map<String, Value>) {
    for (key, value) in map {
        let column = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };

        match value {
            Value::Object(nested) => flatten_into(row, &column, nested),
            Value::Null => row.insert(&column, None),
            Value::Bool(b) => row.insert(&column, Some(Cell::Bool(*b))),
            Value::Number(n) => row.insert(&column, n.as_f64().map(Cell::Number)),
            Value::String(s) => row.insert(&column, Some(Cell::Text(s.clone()))),
            Value::Array(_) => row.insert(&column, Some(Cell::Text(value.to_string()))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    #[test]
    fn test_nested_grades_are_flattened() {
        let records = vec![json!({
            "course_name": "English 9",
            "credits": 0.5,
            "grades": {"Q1": "A", "Q2": null},
            "tags": ["honors"]
        })];
        let table = TranscriptTable::from_json_records(&records).unwrap();

        assert!(table.has_column("grades.Q1"));
        assert!(table.has_column("grades.Q2"));
        assert!(!table.has_column("grades"));

        let row = table.rows().next().unwrap();
        assert_eq!(row.get("grades.Q1"), Some(&Cell::Text("A".into())));
        assert_eq!(row.get("grades.Q2"), None);
        assert_eq!(row.get("credits"), Some(&Cell::Number(0.5)));
        assert_eq!(row.get("tags"), Some(&Cell::Text("[\"honors\"]".into())));
    }

    #[test]
    fn test_union_of_columns_across_records() {
        let records = vec![
            json!({"course_name": "Biology", "grades": {"Q1": "B"}}),
            json!({"course_name": "Spanish", "grades": {"Q3": "A"}, "department": "LANG"}),
        ];
        let table = TranscriptTable::from_json_records(&records).unwrap();
        assert!(table.has_column("grades.Q1"));
        assert!(table.has_column("grades.Q3"));
        assert!(table.has_column("department"));

        let first = table.rows().next().unwrap();
        assert_eq!(first.get("grades.Q3"), None);
    }

    #[test]
    fn test_non_object_record_is_rejected() {
        let records = vec![json!("not a course")];
        assert!(TranscriptTable::from_json_records(&records).is_err());
    }

    #[test]
    fn test_load_transcript_from_file() {
        let path = temp_path("transcript_gpa_test_load.json");
        let doc = json!({
            "student": {"name": "Test"},
            "course_history": [
                {"course_name": "Geometry", "credits": 1, "grades": {"Q1": "A"}}
            ]
        });
        fs::write(&path, doc.to_string()).unwrap();

        let table = load_transcript(&path).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.rows().next().unwrap().get("credits"),
            Some(&Cell::Number(1.0))
        );

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_load_transcript_without_history_fails() {
        let path = temp_path("transcript_gpa_test_no_history.json");
        fs::write(&path, "{\"student\": {}}").unwrap();

        let err = load_transcript(&path).unwrap_err();
        assert!(err.to_string().contains("course_history"));

        fs::remove_file(&path).unwrap();
    }
}
