//! Spec document sniffing
//!
//! The engines do their own parsing; this only peeks at the top-level
//! `swagger`/`openapi` field so a mismatched `swaggerVersion` input can be
//! flagged early, and picks a file extension for staged copies.

use serde_json::Value;
use std::fmt;

/// Serialization of a spec document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// JSON documents start with `{`; everything else is treated as YAML
    pub fn detect(content: &str) -> Self {
        let trimmed = content.trim_start_matches('\u{feff}').trim_start();
        if trimmed.starts_with('{') {
            DocumentFormat::Json
        } else {
            DocumentFormat::Yaml
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Json => "json",
            DocumentFormat::Yaml => "yaml",
        }
    }
}

/// Spec version declared by a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecVersion {
    /// `swagger: "2.0"`
    Swagger2,
    /// `openapi: "3.x.y"`
    OpenApi3,
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecVersion::Swagger2 => write!(f, "Swagger 2.0"),
            SpecVersion::OpenApi3 => write!(f, "OpenAPI 3"),
        }
    }
}

/// Detect the declared spec version, if the document parses and declares one
pub fn detect_version(content: &str) -> Option<SpecVersion> {
    let root = match DocumentFormat::detect(content) {
        DocumentFormat::Json => serde_json::from_str::<Value>(content).ok()?,
        DocumentFormat::Yaml => serde_yaml::from_str::<Value>(content).ok()?,
    };

    let declared = |key: &str| -> Option<String> {
        match root.get(key)? {
            Value::String(s) => Some(s.clone()),
            // YAML allows an unquoted `swagger: 2.0`
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    };

    if let Some(version) = declared("openapi") {
        if version.starts_with('3') {
            return Some(SpecVersion::OpenApi3);
        }
    }

    if let Some(version) = declared("swagger") {
        if version.starts_with('2') {
            return Some(SpecVersion::Swagger2);
        }
    }

    None
}
