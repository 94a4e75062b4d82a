//! OpenAPI v3 engine: openapi-diff

use crate::command::{stage, CommandTemplate};
use crate::EngineError;
use apidiff_task_common::{OpenApiDiff, SpecContent};
use apidiff_task_loader::DocumentFormat;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Default program line for the OpenAPI engine
pub const DEFAULT_OPENAPI_COMMAND: &str = "openapi-diff {left} {right}";

/// Format tag passed with both specs
pub const OPENAPI3_FORMAT: &str = "openapi3";

/// One side of an openapi-diff request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecDescriptor {
    pub content: String,
    pub location: String,
    pub format: String,
}

impl SpecDescriptor {
    pub fn openapi3(spec: &SpecContent) -> Self {
        Self {
            content: spec.content.clone(),
            location: spec.location(),
            format: OPENAPI3_FORMAT.to_string(),
        }
    }
}

/// Input to [`OpenApiDiffEngine::diff_specs`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSpecsRequest {
    pub source_spec: SpecDescriptor,
    pub destination_spec: SpecDescriptor,
}

impl DiffSpecsRequest {
    pub fn new(source: &SpecContent, destination: &SpecContent) -> Self {
        Self {
            source_spec: SpecDescriptor::openapi3(source),
            destination_spec: SpecDescriptor::openapi3(destination),
        }
    }
}

/// OpenAPI diff engine
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OpenApiDiffEngine: Send + Sync {
    async fn diff_specs(&self, request: &DiffSpecsRequest) -> Result<OpenApiDiff, EngineError>;
}

/// Runs openapi-diff (or a compatible program) as a child process
#[derive(Debug, Clone)]
pub struct CommandOpenApiEngine {
    template: CommandTemplate,
}

impl CommandOpenApiEngine {
    pub fn new(template: CommandTemplate) -> Self {
        Self { template }
    }
}

impl Default for CommandOpenApiEngine {
    fn default() -> Self {
        Self::new(CommandTemplate::builtin(DEFAULT_OPENAPI_COMMAND))
    }
}

#[async_trait]
impl OpenApiDiffEngine for CommandOpenApiEngine {
    async fn diff_specs(&self, request: &DiffSpecsRequest) -> Result<OpenApiDiff, EngineError> {
        let source = &request.source_spec.content;
        let destination = &request.destination_spec.content;

        let source_file = stage(
            "apidiff-source-",
            DocumentFormat::detect(source).extension(),
            source,
        )
        .await?;
        let destination_file = stage(
            "apidiff-destination-",
            DocumentFormat::detect(destination).extension(),
            destination,
        )
        .await?;

        self.template
            .run(&[
                ("left", source_file.path()),
                ("right", destination_file.path()),
            ])
            .await
    }
}
