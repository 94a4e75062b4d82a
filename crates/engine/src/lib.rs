//! Diff engine invocation for apidiff-task
//!
//! The diff algorithms are external. This crate defines the two engine seams
//! ([`ClassicDiffEngine`] for Swagger v2, [`OpenApiDiffEngine`] for OpenAPI
//! v3), child-process implementations of both, and the [`DiffInvoker`] that
//! dispatches on the configured `swaggerVersion`.
//!
//! Both engines receive pre-loaded spec content. The command engines stage
//! that content into temporary files before running the external program.

mod classic;
mod command;
mod openapi;

pub use classic::{
    ChangeLevels, ClassicConfig, ClassicDiffEngine, CommandClassicEngine,
    DEFAULT_CLASSIC_COMMAND, MAX_LEVEL,
};
pub use command::CommandTemplate;
pub use openapi::{
    CommandOpenApiEngine, DiffSpecsRequest, OpenApiDiffEngine, SpecDescriptor,
    DEFAULT_OPENAPI_COMMAND, OPENAPI3_FORMAT,
};

use apidiff_task_common::{DiffResult, SpecContent};
use apidiff_task_loader::SpecVersion;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Marker carried by openapi-diff parse failures
pub const PARSE_ERROR_CODE: &str = "OPENAPI_DIFF_PARSE_ERROR";

/// Errors raised by a diff engine
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to stage spec for the diff engine: {0}")]
    Stage(#[source] std::io::Error),

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    #[error("{message}")]
    Parse { message: String },

    #[error("{program} produced output that is not a diff result: {source}")]
    MalformedOutput {
        program: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid engine command: {0:?}")]
    InvalidCommand(String),
}

impl EngineError {
    /// Whether the engine could not parse one of the specs
    pub fn is_parse_error(&self) -> bool {
        matches!(self, EngineError::Parse { .. })
    }
}

/// Which engine a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwaggerVersion {
    /// swagger-diff
    V2,
    /// openapi-diff
    V3,
}

impl SwaggerVersion {
    /// `"v2"` selects the classic engine; any other value selects OpenAPI
    pub fn parse(value: &str) -> Self {
        if value.trim() == "v2" {
            SwaggerVersion::V2
        } else {
            SwaggerVersion::V3
        }
    }

    /// Name of the external engine, used in log and outcome messages
    pub fn engine_name(&self) -> &'static str {
        match self {
            SwaggerVersion::V2 => "swagger-diff",
            SwaggerVersion::V3 => "openapi-diff",
        }
    }

    /// Document version the engine expects
    pub fn expected_spec(&self) -> SpecVersion {
        match self {
            SwaggerVersion::V2 => SpecVersion::Swagger2,
            SwaggerVersion::V3 => SpecVersion::OpenApi3,
        }
    }
}

impl fmt::Display for SwaggerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwaggerVersion::V2 => write!(f, "v2"),
            SwaggerVersion::V3 => write!(f, "v3"),
        }
    }
}

/// Dispatches a comparison to the engine selected by [`SwaggerVersion`]
#[derive(Clone)]
pub struct DiffInvoker {
    classic: Arc<dyn ClassicDiffEngine>,
    openapi: Arc<dyn OpenApiDiffEngine>,
}

impl DiffInvoker {
    pub fn new(classic: Arc<dyn ClassicDiffEngine>, openapi: Arc<dyn OpenApiDiffEngine>) -> Self {
        Self { classic, openapi }
    }

    /// Invoker backed by the given external programs
    pub fn with_commands(classic: CommandTemplate, openapi: CommandTemplate) -> Self {
        Self::new(
            Arc::new(CommandClassicEngine::new(classic)),
            Arc::new(CommandOpenApiEngine::new(openapi)),
        )
    }

    /// Run the comparison; `config` is only used by the classic engine
    pub async fn invoke(
        &self,
        version: SwaggerVersion,
        left: &SpecContent,
        right: &SpecContent,
        config: &ClassicConfig,
    ) -> Result<DiffResult, EngineError> {
        info!(engine = version.engine_name(), "invoking diff engine");
        match version {
            SwaggerVersion::V2 => self
                .classic
                .diff(left, right, config)
                .await
                .map(DiffResult::Classic),
            SwaggerVersion::V3 => self
                .openapi
                .diff_specs(&DiffSpecsRequest::new(left, right))
                .await
                .map(DiffResult::OpenApi),
        }
    }
}

impl Default for DiffInvoker {
    fn default() -> Self {
        Self::new(
            Arc::new(CommandClassicEngine::default()),
            Arc::new(CommandOpenApiEngine::default()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classic::MockClassicDiffEngine;
    use crate::openapi::MockOpenApiDiffEngine;
    use apidiff_task_common::{ClassicDiff, OpenApiDiff, SpecRef};

    fn spec(name: &str) -> SpecContent {
        SpecContent::new(SpecRef::File(name.into()), format!("# {}", name))
    }

    #[test]
    fn test_swagger_version_parse() {
        assert_eq!(SwaggerVersion::parse("v2"), SwaggerVersion::V2);
        assert_eq!(SwaggerVersion::parse("v3"), SwaggerVersion::V3);
        assert_eq!(SwaggerVersion::parse("anything"), SwaggerVersion::V3);
        assert_eq!(SwaggerVersion::V2.engine_name(), "swagger-diff");
        assert_eq!(SwaggerVersion::V3.expected_spec(), SpecVersion::OpenApi3);
    }

    #[tokio::test]
    async fn test_v2_dispatches_to_classic_engine() {
        let mut classic = MockClassicDiffEngine::new();
        classic
            .expect_diff()
            .withf(|left, right, config| {
                left.location() == "left.json"
                    && right.location() == "right.json"
                    && config.changes.breaks == 3
            })
            .times(1)
            .returning(|_, _, _| Ok(ClassicDiff::default()));

        let mut openapi = MockOpenApiDiffEngine::new();
        openapi.expect_diff_specs().never();

        let invoker = DiffInvoker::new(Arc::new(classic), Arc::new(openapi));
        let result = invoker
            .invoke(
                SwaggerVersion::V2,
                &spec("left.json"),
                &spec("right.json"),
                &ClassicConfig::default(),
            )
            .await
            .unwrap();
        assert!(matches!(result, DiffResult::Classic(_)));
    }

    #[tokio::test]
    async fn test_v3_dispatches_to_openapi_engine() {
        let mut classic = MockClassicDiffEngine::new();
        classic.expect_diff().never();

        let mut openapi = MockOpenApiDiffEngine::new();
        openapi
            .expect_diff_specs()
            .withf(|request| {
                request.source_spec.location == "left.yaml"
                    && request.destination_spec.content == "# right.yaml"
                    && request.source_spec.format == OPENAPI3_FORMAT
            })
            .times(1)
            .returning(|_| Ok(OpenApiDiff::default()));

        let invoker = DiffInvoker::new(Arc::new(classic), Arc::new(openapi));
        let result = invoker
            .invoke(
                SwaggerVersion::V3,
                &spec("left.yaml"),
                &spec("right.yaml"),
                &ClassicConfig::default(),
            )
            .await
            .unwrap();
        assert!(matches!(result, DiffResult::OpenApi(_)));
    }

    #[tokio::test]
    async fn test_engine_error_is_propagated() {
        let classic = MockClassicDiffEngine::new();
        let mut openapi = MockOpenApiDiffEngine::new();
        openapi.expect_diff_specs().returning(|_| {
            Err(EngineError::Parse {
                message: "bad yaml".to_string(),
            })
        });

        let invoker = DiffInvoker::new(Arc::new(classic), Arc::new(openapi));
        let err = invoker
            .invoke(
                SwaggerVersion::V3,
                &spec("a"),
                &spec("b"),
                &ClassicConfig::default(),
            )
            .await
            .unwrap_err();
        assert!(err.is_parse_error());
        assert_eq!(err.to_string(), "bad yaml");
    }
}
