//! apidiff-task CLI
//!
//! Pipeline entry point: compares two Swagger/OpenAPI specs, reports the
//! differences on the pipeline log and posts breaking results to a webhook.
//! Every input can be given as a flag or through the agent's `INPUT_*`
//! environment variables.

use anyhow::{Context, Result};
use apidiff_task_engine::{
    CommandTemplate, DiffInvoker, DEFAULT_CLASSIC_COMMAND, DEFAULT_OPENAPI_COMMAND,
};
use apidiff_task_loader::{HttpClientOptions, ReqwestClient, SpecLoader};
use apidiff_task_pipeline::{
    fail_configuration, failure_message, AzurePipelinesHost, ConsoleHost, RawInputs, TaskHost,
    TaskInputs, TaskOutcome, TaskRunner, WebhookNotifier,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "apidiff-task")]
#[command(version, about = "Diff two Swagger/OpenAPI specs and report breaking changes", long_about = None)]
#[command(after_help = "EXAMPLES:\n  \
    # Compare two local OpenAPI v3 specs\n  \
    apidiff-task --swagger-version v3 \\\n    \
    --left-type file --left-file-path api/v1.yaml \\\n    \
    --right-type file --right-file-path api/v2.yaml \\\n    \
    --webhook-url https://hooks.example.com/api-diff --host console\n\n  \
    # Compare a published Swagger 2.0 spec against the working copy\n  \
    apidiff-task --swagger-version v2 \\\n    \
    --left-type url --left-url https://petstore.swagger.io/v2/swagger.json \\\n    \
    --right-type file --right-file-path swagger.json \\\n    \
    --webhook-url https://hooks.example.com/api-diff \\\n    \
    --config '{\"changes\": {\"breaks\": 3, \"smooths\": 1}}'")]
struct Cli {
    /// "v2" runs swagger-diff; any other value runs openapi-diff
    #[arg(long, env = "INPUT_SWAGGERVERSION")]
    swagger_version: Option<String>,

    /// Source of the old spec: file or url
    #[arg(long, env = "INPUT_LEFTTYPE")]
    left_type: Option<String>,

    /// Source of the new spec: file or url
    #[arg(long, env = "INPUT_RIGHTTYPE")]
    right_type: Option<String>,

    /// Path of the old spec (left-type file)
    #[arg(long, env = "INPUT_LEFTFILEPATH")]
    left_file_path: Option<PathBuf>,

    /// Path of the new spec (right-type file)
    #[arg(long, env = "INPUT_RIGHTFILEPATH")]
    right_file_path: Option<PathBuf>,

    /// URL of the old spec (left-type url)
    #[arg(long, env = "INPUT_LEFTURL")]
    left_url: Option<String>,

    /// URL of the new spec (right-type url)
    #[arg(long, env = "INPUT_RIGHTURL")]
    right_url: Option<String>,

    /// Endpoint that receives breaking results as JSON
    #[arg(long, env = "INPUT_WEBHOOKURL")]
    webhook_url: Option<String>,

    /// swagger-diff config as JSON (v2 only)
    #[arg(long, env = "INPUT_CONFIG")]
    config: Option<String>,

    /// Log breaking OpenAPI differences as errors instead of warnings
    #[arg(long, env = "INPUT_BREAKINGASERROR")]
    breaking_as_error: bool,

    /// Skip TLS certificate verification when fetching specs
    #[arg(long, env = "INPUT_INSECURESPECFETCH")]
    insecure_spec_fetch: bool,

    /// Skip TLS certificate verification when posting to the webhook
    #[arg(long, env = "INPUT_INSECUREWEBHOOK")]
    insecure_webhook: bool,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "INPUT_HTTPTIMEOUTSECS")]
    http_timeout_secs: Option<u64>,

    /// swagger-diff program line; {left}, {right} and {config} are replaced with file paths
    #[arg(long, env = "INPUT_CLASSICENGINE", default_value = DEFAULT_CLASSIC_COMMAND)]
    classic_engine: CommandTemplate,

    /// openapi-diff program line; {left} and {right} are replaced with file paths
    #[arg(long, env = "INPUT_OPENAPIENGINE", default_value = DEFAULT_OPENAPI_COMMAND)]
    openapi_engine: CommandTemplate,

    /// Output protocol
    #[arg(long, env = "APIDIFF_HOST", value_enum, default_value = "azure")]
    host: HostKind,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum HostKind {
    /// Azure Pipelines logging commands
    Azure,
    /// Colored output for local runs
    Console,
}

impl Cli {
    fn raw_inputs(&self) -> RawInputs {
        RawInputs {
            swagger_version: self.swagger_version.clone(),
            left_type: self.left_type.clone(),
            right_type: self.right_type.clone(),
            left_file_path: self.left_file_path.clone(),
            right_file_path: self.right_file_path.clone(),
            left_url: self.left_url.clone(),
            right_url: self.right_url.clone(),
            webhook_url: self.webhook_url.clone(),
            config: self.config.clone(),
            breaking_as_error: self.breaking_as_error,
        }
    }

    fn http_options(&self, accept_invalid_certs: bool) -> HttpClientOptions {
        HttpClientOptions {
            accept_invalid_certs,
            timeout: self.http_timeout_secs.map(Duration::from_secs),
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let mut host: Box<dyn TaskHost> = match cli.host {
        HostKind::Azure => Box::new(AzurePipelinesHost::stdout()),
        HostKind::Console => Box::new(ConsoleHost::stdout(cli.verbose)),
    };

    let inputs = match TaskInputs::resolve(&cli.raw_inputs()) {
        Ok(inputs) => inputs,
        Err(e) => {
            fail_configuration(host.as_mut(), &e);
            return Ok(ExitCode::FAILURE);
        }
    };
    debug!(
        version = %inputs.version,
        left = %inputs.left,
        right = %inputs.right,
        "resolved task inputs"
    );

    let runner = match build_runner(&cli, &inputs) {
        Ok(runner) => runner,
        Err(e) => {
            host.error(&format!("{:#}", e));
            host.set_result(&TaskOutcome::Failed(failure_message(inputs.version)));
            return Ok(ExitCode::FAILURE);
        }
    };

    let outcome = runner.run(&inputs, host.as_mut()).await;
    Ok(exit_code(&outcome))
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_level).context("Invalid log filter")?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}

/// Separate clients so that TLS relaxation on one never affects the other
fn build_runner(cli: &Cli, inputs: &TaskInputs) -> Result<TaskRunner> {
    let fetch_http = ReqwestClient::new(&cli.http_options(cli.insecure_spec_fetch))
        .context("Failed to create HTTP client for spec fetches")?;
    let webhook_http = ReqwestClient::new(&cli.http_options(cli.insecure_webhook))
        .context("Failed to create HTTP client for the webhook")?;

    let invoker =
        DiffInvoker::with_commands(cli.classic_engine.clone(), cli.openapi_engine.clone());

    Ok(TaskRunner::new(
        SpecLoader::new(Arc::new(fetch_http)),
        invoker,
        WebhookNotifier::new(Arc::new(webhook_http), inputs.webhook_url.clone()),
    ))
}

fn exit_code(outcome: &TaskOutcome) -> ExitCode {
    if outcome.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
