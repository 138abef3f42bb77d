//! Errors raised while evaluating a GPA policy against a transcript.

/// Broad category of a [`GpaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The policy references transcript columns that do not exist.
    Configuration,
    /// The transcript data cannot be evaluated under the policy.
    Validation,
}

/// Errors produced by the GPA engine.
///
/// Every message names the school it was raised for, plus the course and
/// offending value(s) where one exists.
#[derive(Debug, thiserror::Error)]
pub enum GpaError {
    /// One or more `grade_selection.use_columns` entries are not in the table.
    #[error("missing grade columns for {school}: {missing:?}")]
    MissingColumns { school: String, missing: Vec<String> },

    /// More than one candidate grade column holds a value for the same row.
    #[error(
        "course {course} has multiple semester grades {values:?} under {school}; ambiguous credit allocation"
    )]
    AmbiguousGrades {
        school: String,
        course: String,
        values: Vec<String>,
    },

    /// The selected grade has no entry in the policy's grade scale.
    #[error("grade '{grade}' for course {course} not found in grade scale for {school}")]
    UnmappedGrade {
        school: String,
        course: String,
        grade: String,
    },

    /// The credits cell of a contributing row is not a non-negative number.
    #[error("invalid credits '{value}' for course {course} under {school}")]
    InvalidCredits {
        school: String,
        course: String,
        value: String,
    },
}

impl GpaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GpaError::MissingColumns { .. } => ErrorKind::Configuration,
            GpaError::AmbiguousGrades { .. }
            | GpaError::UnmappedGrade { .. }
            | GpaError::InvalidCredits { .. } => ErrorKind::Validation,
        }
    }

    /// School the error was raised for.
    pub fn school(&self) -> &str {
        match self {
            GpaError::MissingColumns { school, .. }
            | GpaError::AmbiguousGrades { school, .. }
            | GpaError::UnmappedGrade { school, .. }
            | GpaError::InvalidCredits { school, .. } => school,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let missing = GpaError::MissingColumns {
            school: "North".into(),
            missing: vec!["grades.Q3".into()],
        };
        assert_eq!(missing.kind(), ErrorKind::Configuration);

        let unmapped = GpaError::UnmappedGrade {
            school: "North".into(),
            course: "Biology".into(),
            grade: "Z".into(),
        };
        assert_eq!(unmapped.kind(), ErrorKind::Validation);
        assert_eq!(unmapped.school(), "North");
    }

    #[test]
    fn test_messages_are_attributable() {
        let err = GpaError::AmbiguousGrades {
            school: "North".into(),
            course: "Chemistry".into(),
            values: vec!["A".into(), "B".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("North"));
        assert!(msg.contains("Chemistry"));
        assert!(msg.contains("\"A\""));
        assert!(msg.contains("\"B\""));

        let err = GpaError::MissingColumns {
            school: "South".into(),
            missing: vec!["grades.Q4".into()],
        };
        assert!(err.to_string().starts_with("missing grade columns for South"));
    }
}
