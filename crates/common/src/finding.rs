//! Normalized findings derived from a [`DiffResult`](crate::DiffResult)

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Log channel a finding is reported on
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Bucket the engine placed the entry in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingCategory {
    /// Classic `errors`
    Error,
    /// Classic `warnings`
    Warning,
    /// Classic `infos`
    Info,
    /// OpenAPI `breakingDifferences`
    Breaking,
    /// OpenAPI `nonBreakingDifferences`
    NonBreaking,
    /// OpenAPI `unclassifiedDifferences`
    Unclassified,
}

impl FindingCategory {
    /// Prefix used for the debug line carrying the raw entry
    pub fn label(&self) -> &'static str {
        match self {
            FindingCategory::Error => "Error",
            FindingCategory::Warning => "Warning",
            FindingCategory::Info => "Info",
            FindingCategory::Breaking => "Error",
            FindingCategory::NonBreaking => "Warning",
            FindingCategory::Unclassified => "Unclassified",
        }
    }
}

/// Engine-specific wording of a finding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindingText {
    /// Classic: a rule message
    Rule { message: String },

    /// OpenAPI: a typed change and the action taken on the path
    Change { change_type: String, action: String },
}

/// A single classified finding
///
/// Transient: built for reporting and dropped afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub severity: Severity,
    pub category: FindingCategory,
    pub rule_or_code: String,
    pub text: FindingText,
    pub location: Option<String>,

    /// The engine entry this finding was built from
    pub detail: Value,
}

impl Finding {
    /// Debug line carrying the raw entry, e.g. `Error: {"ruleId":...}`
    pub fn debug_line(&self) -> String {
        format!("{}: {}", self.category.label(), self.detail)
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            FindingText::Rule { message } => {
                write!(f, "Rule: {}, Message {}", self.rule_or_code, message)
            }
            FindingText::Change {
                change_type,
                action,
            } => {
                write!(
                    f,
                    "[{} change] Rule: {}, Path {}",
                    change_type, self.rule_or_code, action
                )?;
                if let Some(location) = &self.location {
                    write!(f, " {}", location)?;
                }
                Ok(())
            }
        }
    }
}
