//! Policy-driven GPA calculation.
//!
//! Each policy is evaluated independently against the same read-only
//! [`TranscriptTable`](crate::transcript::TranscriptTable): rows are filtered,
//! one grade is selected per row, mapped through the policy's grade scale and
//! credit-weighted into a rounded GPA.

pub mod calculator;
pub mod rounding;
pub mod types;

pub use calculator::{
    calculate_all, calculate_all_at, calculate_gpa, calculate_isolated, calculate_isolated_at,
};
pub use types::{GpaResult, GpaSummary};
