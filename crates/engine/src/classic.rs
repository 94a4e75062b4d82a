//! Classic (Swagger v2) engine: swagger-diff

use crate::command::{stage, CommandTemplate};
use crate::EngineError;
use apidiff_task_common::{ClassicDiff, ConfigError, SpecContent};
use apidiff_task_loader::DocumentFormat;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default program line for the classic engine
pub const DEFAULT_CLASSIC_COMMAND: &str = "swagger-diff {left} {right} --config {config} --outformat json";

/// Highest level swagger-diff understands (3 = error)
pub const MAX_LEVEL: u8 = 3;

fn default_breaks() -> u8 {
    3
}

fn default_smooths() -> u8 {
    2
}

/// Levels assigned to breaking and smooth changes
///
/// 3 = error, 2 = warning, 1 = info, 0 = ignore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeLevels {
    #[serde(default = "default_breaks")]
    pub breaks: u8,

    #[serde(default = "default_smooths")]
    pub smooths: u8,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ChangeLevels {
    fn default() -> Self {
        Self {
            breaks: default_breaks(),
            smooths: default_smooths(),
            extra: Map::new(),
        }
    }
}

/// swagger-diff configuration
///
/// Anything besides `changes` (such as per-rule level overrides) is passed
/// through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassicConfig {
    #[serde(default)]
    pub changes: ChangeLevels,

    #[serde(flatten)]
    pub rules: Map<String, Value>,
}

impl ClassicConfig {
    /// Parse the optional `config` input; blank input yields the defaults
    pub fn from_input(input: Option<&str>) -> Result<Self, ConfigError> {
        match input.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(json) => Self::from_json(json),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: ClassicConfig = serde_json::from_str(json)
            .map_err(|e| ConfigError::InvalidClassicConfig(e.to_string()))?;

        for (name, level) in [
            ("breaks", config.changes.breaks),
            ("smooths", config.changes.smooths),
        ] {
            if level > MAX_LEVEL {
                return Err(ConfigError::InvalidClassicConfig(format!(
                    "changes.{} must be between 0 and {}, got {}",
                    name, MAX_LEVEL, level
                )));
            }
        }

        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Classic diff engine
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClassicDiffEngine: Send + Sync {
    async fn diff(
        &self,
        left: &SpecContent,
        right: &SpecContent,
        config: &ClassicConfig,
    ) -> Result<ClassicDiff, EngineError>;
}

/// Runs swagger-diff (or a compatible program) as a child process
#[derive(Debug, Clone)]
pub struct CommandClassicEngine {
    template: CommandTemplate,
}

impl CommandClassicEngine {
    pub fn new(template: CommandTemplate) -> Self {
        Self { template }
    }
}

impl Default for CommandClassicEngine {
    fn default() -> Self {
        Self::new(CommandTemplate::builtin(DEFAULT_CLASSIC_COMMAND))
    }
}

#[async_trait]
impl ClassicDiffEngine for CommandClassicEngine {
    async fn diff(
        &self,
        left: &SpecContent,
        right: &SpecContent,
        config: &ClassicConfig,
    ) -> Result<ClassicDiff, EngineError> {
        let left_file = stage(
            "apidiff-left-",
            DocumentFormat::detect(&left.content).extension(),
            &left.content,
        )
        .await?;
        let right_file = stage(
            "apidiff-right-",
            DocumentFormat::detect(&right.content).extension(),
            &right.content,
        )
        .await?;
        let config_file = stage("apidiff-config-", "json", &config.to_json()).await?;

        self.template
            .run(&[
                ("left", left_file.path()),
                ("right", right_file.path()),
                ("config", config_file.path()),
            ])
            .await
    }
}
