//! Common types for apidiff-task
//!
//! This crate contains the data model shared by the loader, engine, and
//! pipeline crates: spec references, the engine result shapes, normalized
//! findings, and configuration errors.

mod diff;
mod finding;
mod spec;

pub use diff::{
    ClassicDiff, DiffResult, Difference, EntityDetails, OpenApiDiff, RuleViolation,
};
pub use finding::{Finding, FindingCategory, FindingText, Severity};
pub use spec::{SpecContent, SpecKind, SpecRef};

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving task inputs
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Input required and not supplied: {0}")]
    MissingInput(String),

    #[error("Invalid value for input {input}: {value}")]
    InvalidValue { input: String, value: String },

    #[error("Not found {input}: {}", path.display())]
    PathNotFound { input: String, path: PathBuf },

    #[error("Invalid swagger-diff config: {0}")]
    InvalidClassicConfig(String),
}

/// Result type for input resolution
pub type Result<T> = std::result::Result<T, ConfigError>;
