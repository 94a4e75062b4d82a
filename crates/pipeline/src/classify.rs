//! Result classification and reporting

use crate::host::TaskHost;
use apidiff_task_common::{
    ClassicDiff, DiffResult, Difference, Finding, FindingCategory, FindingText, OpenApiDiff,
    RuleViolation, Severity,
};
use serde::Serialize;
use serde_json::Value;

/// Flatten a result into findings, in reporting order
///
/// `breaking_severity` is the channel for OpenAPI breaking differences;
/// classic errors are always [`Severity::Error`].
pub fn classify(result: &DiffResult, breaking_severity: Severity) -> Vec<Finding> {
    match result {
        DiffResult::Classic(diff) => classify_classic(diff),
        DiffResult::OpenApi(diff) => classify_openapi(diff, breaking_severity),
    }
}

fn classify_classic(diff: &ClassicDiff) -> Vec<Finding> {
    let buckets = [
        (&diff.errors, Severity::Error, FindingCategory::Error),
        (&diff.warnings, Severity::Warning, FindingCategory::Warning),
        (&diff.infos, Severity::Info, FindingCategory::Info),
    ];

    buckets
        .into_iter()
        .flat_map(|(entries, severity, category)| {
            entries
                .iter()
                .map(move |entry| rule_finding(entry, severity, category))
        })
        .collect()
}

fn classify_openapi(diff: &OpenApiDiff, breaking_severity: Severity) -> Vec<Finding> {
    // The breaking list is only trusted when the engine flags it
    let breaking: &[Difference] = if diff.breaking_differences_found {
        &diff.breaking_differences
    } else {
        &[]
    };

    let buckets = [
        (breaking, breaking_severity, FindingCategory::Breaking),
        (
            diff.non_breaking_differences.as_slice(),
            Severity::Warning,
            FindingCategory::NonBreaking,
        ),
        (
            diff.unclassified_differences.as_slice(),
            Severity::Info,
            FindingCategory::Unclassified,
        ),
    ];

    buckets
        .into_iter()
        .flat_map(|(entries, severity, category)| {
            entries
                .iter()
                .map(move |entry| change_finding(entry, severity, category))
        })
        .collect()
}

fn rule_finding(entry: &RuleViolation, severity: Severity, category: FindingCategory) -> Finding {
    Finding {
        severity,
        category,
        rule_or_code: entry.rule_id.clone(),
        text: FindingText::Rule {
            message: entry.message.clone(),
        },
        location: None,
        detail: to_detail(entry),
    }
}

fn change_finding(entry: &Difference, severity: Severity, category: FindingCategory) -> Finding {
    Finding {
        severity,
        category,
        rule_or_code: entry.code.clone(),
        text: FindingText::Change {
            change_type: entry.change_type.clone(),
            action: entry.action.clone(),
        },
        location: entry.location().map(String::from),
        detail: to_detail(entry),
    }
}

fn to_detail<T: Serialize>(entry: &T) -> Value {
    serde_json::to_value(entry).unwrap_or_default()
}

/// Emit each finding on its severity's channel, followed by its raw entry at
/// debug level
pub fn report(host: &mut dyn TaskHost, findings: &[Finding]) {
    for finding in findings {
        let line = finding.to_string();
        match finding.severity {
            Severity::Error => host.error(&line),
            Severity::Warning => host.warning(&line),
            Severity::Info => host.info(&line),
        }
        host.debug(&finding.debug_line());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classic(value: Value) -> DiffResult {
        DiffResult::Classic(serde_json::from_value(value).unwrap())
    }

    fn openapi(value: Value) -> DiffResult {
        DiffResult::OpenApi(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn test_classic_buckets_map_to_severities() {
        let result = classic(json!({
            "errors": [{"ruleId": "R1", "message": "removed field"}],
            "warnings": [{"ruleId": "R2", "message": "added optional param"}],
            "infos": [{"ruleId": "R3", "message": "description changed"}]
        }));

        let findings = classify(&result, Severity::Warning);
        let summary: Vec<_> = findings
            .iter()
            .map(|f| (f.severity, f.category, f.to_string()))
            .collect();

        assert_eq!(
            summary,
            vec![
                (
                    Severity::Error,
                    FindingCategory::Error,
                    "Rule: R1, Message removed field".to_string()
                ),
                (
                    Severity::Warning,
                    FindingCategory::Warning,
                    "Rule: R2, Message added optional param".to_string()
                ),
                (
                    Severity::Info,
                    FindingCategory::Info,
                    "Rule: R3, Message description changed".to_string()
                ),
            ]
        );
        assert_eq!(findings[0].detail["ruleId"], "R1");
    }

    #[test]
    fn test_openapi_breaking_logged_at_configured_severity() {
        let result = openapi(json!({
            "breakingDifferencesFound": true,
            "breakingDifferences": [{
                "type": "breaking", "code": "path.remove", "action": "remove",
                "sourceSpecEntityDetails": [{"location": "paths./pets"}],
                "destinationSpecEntityDetails": []
            }],
            "nonBreakingDifferences": [],
            "unclassifiedDifferences": []
        }));

        let findings = classify(&result, Severity::Warning);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::Warning);
        assert_eq!(findings[0].category, FindingCategory::Breaking);
        assert_eq!(
            findings[0].to_string(),
            "[breaking change] Rule: path.remove, Path remove paths./pets"
        );

        let escalated = classify(&result, Severity::Error);
        assert_eq!(escalated[0].severity, Severity::Error);
    }

    #[test]
    fn test_openapi_breaking_skipped_without_flag() {
        let result = openapi(json!({
            "breakingDifferencesFound": false,
            "breakingDifferences": [{
                "type": "breaking", "code": "path.remove", "action": "remove"
            }],
            "nonBreakingDifferences": [{
                "type": "add", "code": "C1", "action": "added",
                "sourceSpecEntityDetails": [{"location": "/pets"}],
                "destinationSpecEntityDetails": []
            }],
            "unclassifiedDifferences": [{
                "type": "edit", "code": "info.title", "action": "edit",
                "sourceSpecEntityDetails": [],
                "destinationSpecEntityDetails": [{"location": "info.title"}]
            }]
        }));

        let findings = classify(&result, Severity::Warning);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].category, FindingCategory::NonBreaking);
        assert_eq!(findings[0].to_string(), "[add change] Rule: C1, Path added /pets");
        assert_eq!(findings[1].severity, Severity::Info);
        assert_eq!(findings[1].location.as_deref(), Some("info.title"));
    }

    #[test]
    fn test_difference_without_details_has_no_location() {
        let result = openapi(json!({
            "breakingDifferencesFound": false,
            "nonBreakingDifferences": [{
                "type": "add", "code": "C9", "action": "add",
                "sourceSpecEntityDetails": [],
                "destinationSpecEntityDetails": []
            }]
        }));

        let findings = classify(&result, Severity::Warning);
        assert_eq!(findings[0].location, None);
        assert_eq!(findings[0].to_string(), "[add change] Rule: C9, Path add");
    }

    #[test]
    fn test_empty_results_have_no_findings() {
        let result = classic(json!({"errors": [], "warnings": [], "infos": []}));
        assert!(classify(&result, Severity::Warning).is_empty());

        let result = openapi(json!({"breakingDifferencesFound": false}));
        assert!(classify(&result, Severity::Warning).is_empty());
    }
}
