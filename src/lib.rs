pub mod error;
pub mod gpa;
pub mod output;
pub mod policy;
pub mod transcript;

pub use error::{ErrorKind, GpaError};
