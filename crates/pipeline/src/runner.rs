//! A single task run: load, diff, report, notify, set the outcome

use crate::classify::{classify, report};
use crate::host::{TaskHost, TaskOutcome};
use crate::inputs::TaskInputs;
use crate::notify::WebhookNotifier;
use apidiff_task_common::{ConfigError, SpecContent};
use apidiff_task_engine::{DiffInvoker, EngineError, SwaggerVersion};
use apidiff_task_loader::{detect_version, SpecLoader};
use tracing::{debug, error, info, warn};

/// Outcome message when inputs cannot be resolved
pub const CONFIG_FAILURE_MESSAGE: &str = "Invalid task configuration!";

/// Outcome message for a run that completed, whatever was found
pub const SUCCESS_MESSAGE: &str = "There were 0 breaking differences found";

/// Outcome message for a run that could not produce a result
pub fn failure_message(version: SwaggerVersion) -> String {
    format!("An error occurred calling {}!", version.engine_name())
}

/// Report unresolvable inputs and fail the task
pub fn fail_configuration(host: &mut dyn TaskHost, err: &ConfigError) -> TaskOutcome {
    error!(error = %err, "invalid task configuration");
    host.error(&err.to_string());
    let outcome = TaskOutcome::Failed(CONFIG_FAILURE_MESSAGE.to_string());
    host.set_result(&outcome);
    outcome
}

/// Runs the comparison pipeline once
pub struct TaskRunner {
    loader: SpecLoader,
    invoker: DiffInvoker,
    notifier: WebhookNotifier,
}

impl TaskRunner {
    pub fn new(loader: SpecLoader, invoker: DiffInvoker, notifier: WebhookNotifier) -> Self {
        Self {
            loader,
            invoker,
            notifier,
        }
    }

    /// Run and set the outcome on `host`; the outcome is also returned
    pub async fn run(&self, inputs: &TaskInputs, host: &mut dyn TaskHost) -> TaskOutcome {
        let outcome = self.execute(inputs, host).await;
        info!(outcome = %outcome, "task finished");
        host.set_result(&outcome);
        outcome
    }

    async fn execute(&self, inputs: &TaskInputs, host: &mut dyn TaskHost) -> TaskOutcome {
        let version = inputs.version;

        let (left, right) = match self.loader.load_pair(&inputs.left, &inputs.right).await {
            Ok(pair) => pair,
            Err(e) => {
                error!(error = %e, "failed to load specs");
                host.error(&format!(
                    "An error occurred calling {}: {}",
                    version.engine_name(),
                    e
                ));
                return TaskOutcome::Failed(failure_message(version));
            }
        };

        check_declared_versions(version, [&left, &right], host);

        if version == SwaggerVersion::V2 {
            host.debug(&format!("Config: {}", inputs.classic_config.to_json()));
        }

        let result = match self
            .invoker
            .invoke(version, &left, &right, &inputs.classic_config)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, engine = version.engine_name(), "diff engine failed");
                host.error(&engine_error_message(version, &e));
                return TaskOutcome::Failed(failure_message(version));
            }
        };

        let findings = classify(&result, inputs.breaking_severity);
        info!(count = findings.len(), "classified differences");
        report(host, &findings);

        host.debug(&serde_json::to_string(&result).unwrap_or_default());

        let status = self.notifier.notify(&result, host).await;
        debug!(status = ?status, "notification finished");

        host.debug(&format!(
            "There were {} breaking differences found",
            result.breaking_count()
        ));

        TaskOutcome::Succeeded(SUCCESS_MESSAGE.to_string())
    }
}

fn engine_error_message(version: SwaggerVersion, err: &EngineError) -> String {
    match version {
        SwaggerVersion::V3 if err.is_parse_error() => {
            format!("Error parsing OpenAPI file: {}", err)
        }
        _ => format!("An error occurred calling {}: {}", version.engine_name(), err),
    }
}

/// Note when a document declares a version the selected engine does not handle
fn check_declared_versions(
    version: SwaggerVersion,
    specs: [&SpecContent; 2],
    host: &mut dyn TaskHost,
) {
    let expected = version.expected_spec();
    for spec in specs {
        match detect_version(&spec.content) {
            Some(declared) if declared != expected => {
                warn!(location = %spec.location(), declared = %declared, "spec version mismatch");
                host.debug(&format!(
                    "{} declares {} but swaggerVersion {} expects {}",
                    spec.location(),
                    declared,
                    version,
                    expected
                ));
            }
            Some(declared) => {
                host.debug(&format!("{} declares {}", spec.location(), declared));
            }
            None => {
                debug!(location = %spec.location(), "spec version not detected");
            }
        }
    }
}
