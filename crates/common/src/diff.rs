//! Result shapes produced by the external diff engines
//!
//! Both engines emit JSON. Fields this crate does not name are kept in the
//! flattened `extra` maps so that a result serializes back to exactly what the
//! engine produced.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single rule hit reported by the classic (Swagger v2) engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleViolation {
    pub rule_id: String,

    #[serde(default)]
    pub message: String,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Classic engine output, bucketed by configured level
///
/// All three buckets are required so that an arbitrary JSON object emitted by
/// a failing engine is not mistaken for an empty result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassicDiff {
    pub errors: Vec<RuleViolation>,

    pub warnings: Vec<RuleViolation>,

    pub infos: Vec<RuleViolation>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Location of an entity in one of the two specs
///
/// Kept as the raw object so an explicit `"location": null` survives.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityDetails {
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl EntityDetails {
    /// The `location` field, when it is a string
    pub fn location(&self) -> Option<&str> {
        self.fields.get("location").and_then(Value::as_str)
    }
}

/// A single difference reported by the OpenAPI (v3) engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Difference {
    #[serde(rename = "type")]
    pub change_type: String,

    pub code: String,

    pub action: String,

    #[serde(default)]
    pub source_spec_entity_details: Vec<EntityDetails>,

    #[serde(default)]
    pub destination_spec_entity_details: Vec<EntityDetails>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Difference {
    /// First known location, source details before destination details
    pub fn location(&self) -> Option<&str> {
        self.source_spec_entity_details
            .iter()
            .chain(self.destination_spec_entity_details.iter())
            .next()
            .and_then(EntityDetails::location)
    }
}

/// OpenAPI engine output
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenApiDiff {
    pub breaking_differences_found: bool,

    #[serde(default)]
    pub breaking_differences: Vec<Difference>,

    #[serde(default)]
    pub non_breaking_differences: Vec<Difference>,

    #[serde(default)]
    pub unclassified_differences: Vec<Difference>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Exactly one of these is produced per run
///
/// Serialized untagged: the webhook payload is the engine's own shape.
/// `OpenApi` is tried first when parsing; its required
/// `breakingDifferencesFound` never appears in classic output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DiffResult {
    OpenApi(OpenApiDiff),
    Classic(ClassicDiff),
}

impl DiffResult {
    /// Whether this result should be forwarded to the webhook
    pub fn has_breaking(&self) -> bool {
        match self {
            DiffResult::Classic(diff) => !diff.errors.is_empty(),
            DiffResult::OpenApi(diff) => diff.breaking_differences_found,
        }
    }

    /// Number of error-level (classic) or breaking (OpenAPI) entries
    pub fn breaking_count(&self) -> usize {
        match self {
            DiffResult::Classic(diff) => diff.errors.len(),
            DiffResult::OpenApi(diff) if diff.breaking_differences_found => {
                diff.breaking_differences.len()
            }
            DiffResult::OpenApi(_) => 0,
        }
    }
}

impl From<ClassicDiff> for DiffResult {
    fn from(diff: ClassicDiff) -> Self {
        DiffResult::Classic(diff)
    }
}

impl From<OpenApiDiff> for DiffResult {
    fn from(diff: OpenApiDiff) -> Self {
        DiffResult::OpenApi(diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classic_diff_keeps_engine_fields() {
        let raw = json!({
            "errors": [{"ruleId": "delete-path", "message": "/pets was removed", "path": "/pets"}],
            "warnings": [],
            "infos": [],
            "raw": {"version": 1}
        });

        let diff: ClassicDiff = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(diff.errors[0].rule_id, "delete-path");
        assert_eq!(diff.errors[0].extra["path"], "/pets");
        assert_eq!(serde_json::to_value(&diff).unwrap(), raw);
    }

    #[test]
    fn test_difference_location_prefers_source() {
        let diff: Difference = serde_json::from_value(json!({
            "type": "breaking",
            "code": "path.remove",
            "action": "remove",
            "sourceSpecEntityDetails": [{"location": "paths./pets"}],
            "destinationSpecEntityDetails": [{"location": "paths./animals"}]
        }))
        .unwrap();
        assert_eq!(diff.location(), Some("paths./pets"));
    }

    #[test]
    fn test_difference_location_falls_back_to_destination() {
        let diff: Difference = serde_json::from_value(json!({
            "type": "non-breaking",
            "code": "path.add",
            "action": "add",
            "sourceSpecEntityDetails": [],
            "destinationSpecEntityDetails": [{"location": "paths./owners"}]
        }))
        .unwrap();
        assert_eq!(diff.location(), Some("paths./owners"));
    }

    #[test]
    fn test_difference_without_details_has_no_location() {
        let diff: Difference = serde_json::from_value(json!({
            "type": "unclassified",
            "code": "info.title",
            "action": "edit"
        }))
        .unwrap();
        assert_eq!(diff.location(), None);
    }

    #[test]
    fn test_null_location_is_kept() {
        let raw = json!({
            "type": "breaking",
            "code": "path.remove",
            "action": "remove",
            "sourceSpecEntityDetails": [{"location": null, "value": {"get": {}}}],
            "destinationSpecEntityDetails": []
        });
        let diff: Difference = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(diff.location(), None);
        assert_eq!(serde_json::to_value(&diff).unwrap(), raw);
    }

    #[test]
    fn test_untagged_parse_picks_variant() {
        let openapi: DiffResult =
            serde_json::from_value(json!({"breakingDifferencesFound": false})).unwrap();
        assert!(matches!(openapi, DiffResult::OpenApi(_)));

        let classic: DiffResult =
            serde_json::from_value(json!({"errors": [], "warnings": [], "infos": []})).unwrap();
        assert!(matches!(classic, DiffResult::Classic(_)));
    }

    #[test]
    fn test_classic_diff_requires_buckets() {
        let err = serde_json::from_value::<ClassicDiff>(json!({"message": "boom"}));
        assert!(err.is_err());
    }

    #[test]
    fn test_breaking_count_ignores_list_when_flag_unset() {
        let diff = OpenApiDiff {
            breaking_differences_found: false,
            breaking_differences: vec![Difference {
                change_type: "breaking".to_string(),
                code: "path.remove".to_string(),
                action: "remove".to_string(),
                source_spec_entity_details: vec![],
                destination_spec_entity_details: vec![],
                extra: Map::new(),
            }],
            ..Default::default()
        };
        let result = DiffResult::from(diff);
        assert!(!result.has_breaking());
        assert_eq!(result.breaking_count(), 0);
    }
}
