//! Spec references and loaded spec content

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Where a spec comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecKind {
    File,
    Url,
}

impl SpecKind {
    /// Parse the `leftType`/`rightType` input value
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "file" => Some(SpecKind::File),
            "url" => Some(SpecKind::Url),
            _ => None,
        }
    }
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecKind::File => write!(f, "file"),
            SpecKind::Url => write!(f, "url"),
        }
    }
}

/// Reference to one side of the comparison, as supplied by configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecRef {
    /// Local filesystem path
    File(PathBuf),

    /// Remote URL fetched with an HTTP GET
    Url(String),
}

impl SpecRef {
    pub fn kind(&self) -> SpecKind {
        match self {
            SpecRef::File(_) => SpecKind::File,
            SpecRef::Url(_) => SpecKind::Url,
        }
    }

    /// The reference as the engines see it (`location` in a diff request)
    pub fn location(&self) -> String {
        match self {
            SpecRef::File(path) => path.display().to_string(),
            SpecRef::Url(url) => url.clone(),
        }
    }
}

impl fmt::Display for SpecRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind(), self.location())
    }
}

/// Raw text of a loaded spec
///
/// Created once per side per run and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecContent {
    pub source: SpecRef,
    pub content: String,
}

impl SpecContent {
    pub fn new(source: SpecRef, content: impl Into<String>) -> Self {
        Self {
            source,
            content: content.into(),
        }
    }

    pub fn location(&self) -> String {
        self.source.location()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_kind_parse() {
        assert_eq!(SpecKind::parse("file"), Some(SpecKind::File));
        assert_eq!(SpecKind::parse(" url "), Some(SpecKind::Url));
        assert_eq!(SpecKind::parse("ftp"), None);
    }

    #[test]
    fn test_spec_ref_location() {
        let file = SpecRef::File(PathBuf::from("specs/petstore.json"));
        assert_eq!(file.kind(), SpecKind::File);
        assert_eq!(file.location(), "specs/petstore.json");

        let url = SpecRef::Url("https://example.com/openapi.yaml".to_string());
        assert_eq!(url.kind(), SpecKind::Url);
        assert_eq!(url.to_string(), "url https://example.com/openapi.yaml");
    }
}
