use crate::error::GpaError;
use crate::gpa::rounding::round_half_even;
use crate::gpa::types::{GpaResult, GpaSummary};
use crate::policy::GpaPolicy;
use crate::transcript::{Cell, CourseRecord, TranscriptTable};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Decimal digits kept in `credits_counted`.
const CREDITS_PRECISION: u32 = 2;

/// Running credit-weighted totals for one policy evaluation.
#[derive(Debug, Default)]
struct Totals {
    weighted_points: f64,
    credits: f64,
    grades_counted: usize,
}

impl Totals {
    fn add(&mut self, points: f64, credits: f64) {
        self.weighted_points += points * credits;
        self.credits += credits;
        self.grades_counted += 1;
    }

    fn gpa(&self) -> f64 {
        if self.credits == 0.0 {
            0.0
        } else {
            self.weighted_points / self.credits
        }
    }
}

/// Computes the GPA of `table` under `policy`.
///
/// Excluded rows are dropped first; every `use_columns` entry must then exist
/// in the table. Each remaining row contributes at most one grade: a row
/// with no usable grade is skipped, a row with more than one is an error.
#[tracing::instrument(skip_all, fields(school = policy.school_label()))]
pub fn calculate_gpa(table: &TranscriptTable, policy: &GpaPolicy) -> Result<GpaResult, GpaError> {
    let school = policy.school_label();

    let table = match &policy.course_inclusion {
        Some(inclusion) => {
            table.filter_excluding(inclusion.dimension.as_deref(), &inclusion.exclude_values)
        }
        None => table.clone(),
    };

    let missing: Vec<String> = policy
        .grade_selection
        .use_columns
        .iter()
        .filter(|col| !table.has_column(col))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(GpaError::MissingColumns {
            school: school.to_string(),
            missing,
        });
    }

    let mut totals = Totals::default();

    for row in table.rows() {
        let Some(grade) = select_grade(row, policy)? else {
            debug!(course = %row.course_name(), "No countable grade; skipping row");
            continue;
        };

        let label = grade.to_string();
        let Some(&points) = policy.grade_scale.get(&label) else {
            return Err(GpaError::UnmappedGrade {
                school: school.to_string(),
                course: row.course_name(),
                grade: label,
            });
        };

        let credits = row_credits(row, school)?;
        totals.add(points, credits);
    }

    let result = GpaResult {
        campus: policy.campus.clone(),
        gpa: round_half_even(totals.gpa(), policy.precision()),
        policy_version: policy.gpa_policy_version.clone(),
        credits_counted: round_half_even(totals.credits, CREDITS_PRECISION),
        semester_grades_counted: totals.grades_counted,
    };

    info!(
        gpa = result.gpa,
        credits = result.credits_counted,
        grades = result.semester_grades_counted,
        "GPA computed"
    );
    Ok(result)
}

/// Picks the single applicable grade of `row`, scanning `use_columns` in order.
fn select_grade<'a>(row: &'a CourseRecord, policy: &GpaPolicy) -> Result<Option<&'a Cell>, GpaError> {
    let found: Vec<&Cell> = policy
        .grade_selection
        .use_columns
        .iter()
        .map(|col| row.get(col))
        .filter(|value| !policy.is_ignored(*value))
        .flatten()
        .collect();

    match found.as_slice() {
        [] => Ok(None),
        [grade] => Ok(Some(*grade)),
        _ => Err(GpaError::AmbiguousGrades {
            school: policy.school_label().to_string(),
            course: row.course_name(),
            values: found.iter().map(|c| c.to_string()).collect(),
        }),
    }
}

fn row_credits(row: &CourseRecord, school: &str) -> Result<f64, GpaError> {
    let Some(cell) = row.get("credits") else {
        return Ok(0.0);
    };

    match cell.as_f64() {
        Some(credits) if credits.is_finite() && credits >= 0.0 => Ok(credits),
        _ => Err(GpaError::InvalidCredits {
            school: school.to_string(),
            course: row.course_name(),
            value: cell.to_string(),
        }),
    }
}

/// Evaluates every policy in order and keys the results by school.
///
/// Fails on the first policy that fails; no partial summary is returned.
/// Policies without a `school` (or with an empty one) are evaluated but not
/// recorded.
pub fn calculate_all(
    table: &TranscriptTable,
    policies: &[GpaPolicy],
) -> Result<GpaSummary, GpaError> {
    calculate_all_at(table, policies, Utc::now())
}

/// [`calculate_all`] with an explicit batch timestamp.
pub fn calculate_all_at(
    table: &TranscriptTable,
    policies: &[GpaPolicy],
    last_updated: DateTime<Utc>,
) -> Result<GpaSummary, GpaError> {
    let mut gpas = BTreeMap::new();

    for policy in policies {
        let result = calculate_gpa(table, policy)?;
        match policy.school_key() {
            Some(school) => {
                gpas.insert(school.to_string(), result);
            }
            None => debug!("Policy has no school; result not recorded"),
        }
    }

    Ok(GpaSummary { last_updated, gpas })
}

/// Evaluates every policy in order, isolating failures.
///
/// Unlike [`calculate_all`], a failing policy does not abort the batch: the
/// summary holds every successful result that has a school, and the errors
/// are returned alongside in policy order.
pub fn calculate_isolated(
    table: &TranscriptTable,
    policies: &[GpaPolicy],
) -> (GpaSummary, Vec<GpaError>) {
    calculate_isolated_at(table, policies, Utc::now())
}

/// [`calculate_isolated`] with an explicit batch timestamp.
pub fn calculate_isolated_at(
    table: &TranscriptTable,
    policies: &[GpaPolicy],
    last_updated: DateTime<Utc>,
) -> (GpaSummary, Vec<GpaError>) {
    let mut gpas = BTreeMap::new();
    let mut errors = Vec::new();

    for policy in policies {
        match (calculate_gpa(table, policy), policy.school_key()) {
            (Ok(result), Some(school)) => {
                gpas.insert(school.to_string(), result);
            }
            (Ok(_), None) => debug!("Policy has no school; result not recorded"),
            (Err(e), _) => {
                warn!(school = e.school(), error = %e, "Policy evaluation failed");
                errors.push(e);
            }
        }
    }

    (GpaSummary { last_updated, gpas }, errors)
}
