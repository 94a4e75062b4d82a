//! Task input resolution
//!
//! Raw values arrive from the CLI (flags or `INPUT_*` variables). Resolution
//! applies the requirement rules: the path or URL of each side is required
//! according to its type, file paths must exist, and the classic engine config
//! must parse.

use apidiff_task_common::{ConfigError, Result, Severity, SpecKind, SpecRef};
use apidiff_task_engine::{ClassicConfig, SwaggerVersion};
use std::path::PathBuf;

/// Unvalidated task inputs
#[derive(Debug, Clone, Default)]
pub struct RawInputs {
    pub swagger_version: Option<String>,
    pub left_type: Option<String>,
    pub right_type: Option<String>,
    pub left_file_path: Option<PathBuf>,
    pub right_file_path: Option<PathBuf>,
    pub left_url: Option<String>,
    pub right_url: Option<String>,
    pub webhook_url: Option<String>,
    pub config: Option<String>,
    pub breaking_as_error: bool,
}

/// Validated inputs for a single run
#[derive(Debug, Clone)]
pub struct TaskInputs {
    pub version: SwaggerVersion,
    pub left: SpecRef,
    pub right: SpecRef,
    pub webhook_url: String,
    pub classic_config: ClassicConfig,

    /// Severity breaking OpenAPI differences are logged at
    pub breaking_severity: Severity,
}

impl TaskInputs {
    pub fn resolve(raw: &RawInputs) -> Result<Self> {
        let version = SwaggerVersion::parse(&required("swaggerVersion", &raw.swagger_version)?);

        let left = spec_ref(
            "left",
            &raw.left_type,
            &raw.left_file_path,
            &raw.left_url,
        )?;
        let right = spec_ref(
            "right",
            &raw.right_type,
            &raw.right_file_path,
            &raw.right_url,
        )?;

        let webhook_url = required("webhookUrl", &raw.webhook_url)?;

        // Only the classic engine takes a config
        let classic_config = match version {
            SwaggerVersion::V2 => ClassicConfig::from_input(raw.config.as_deref())?,
            SwaggerVersion::V3 => ClassicConfig::default(),
        };

        let breaking_severity = if raw.breaking_as_error {
            Severity::Error
        } else {
            Severity::Warning
        };

        Ok(Self {
            version,
            left,
            right,
            webhook_url,
            classic_config,
            breaking_severity,
        })
    }
}

/// Blank values count as missing
fn required(name: &str, value: &Option<String>) -> Result<String> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_string()),
        _ => Err(ConfigError::MissingInput(name.to_string())),
    }
}

fn spec_ref(
    side: &str,
    kind: &Option<String>,
    file_path: &Option<PathBuf>,
    url: &Option<String>,
) -> Result<SpecRef> {
    let type_input = format!("{}Type", side);
    let raw_kind = required(&type_input, kind)?;
    let kind = SpecKind::parse(&raw_kind).ok_or_else(|| ConfigError::InvalidValue {
        input: type_input,
        value: raw_kind,
    })?;

    match kind {
        SpecKind::File => {
            let input = format!("{}FilePath", side);
            let path = file_path
                .as_ref()
                .filter(|p| !p.as_os_str().is_empty())
                .ok_or_else(|| ConfigError::MissingInput(input.clone()))?;
            if !path.exists() {
                return Err(ConfigError::PathNotFound {
                    input,
                    path: path.clone(),
                });
            }
            Ok(SpecRef::File(path.clone()))
        }
        SpecKind::Url => {
            let url = required(&format!("{}Url", side), url)?;
            Ok(SpecRef::Url(url))
        }
    }
}
