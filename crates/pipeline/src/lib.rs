//! Task pipeline for apidiff-task
//!
//! Wires the loader and diff invoker into a single run:
//!
//! 1. Load both specs concurrently
//! 2. Invoke the engine selected by `swaggerVersion`
//! 3. Classify each entry of the result into a [`Finding`](apidiff_task_common::Finding)
//! 4. Report findings on the host's log channels
//! 5. Post the full result to the webhook if anything is breaking
//! 6. Set the task outcome, exactly once
//!
//! # Examples
//!
//! ```no_run
//! use apidiff_task_engine::DiffInvoker;
//! use apidiff_task_loader::{HttpClientOptions, ReqwestClient, SpecLoader};
//! use apidiff_task_pipeline::{AzurePipelinesHost, RawInputs, TaskInputs, TaskRunner, WebhookNotifier};
//! use std::sync::Arc;
//!
//! # async fn run(raw: RawInputs) -> Result<(), Box<dyn std::error::Error>> {
//! let inputs = TaskInputs::resolve(&raw)?;
//! let http = Arc::new(ReqwestClient::new(&HttpClientOptions::default())?);
//! let runner = TaskRunner::new(
//!     SpecLoader::new(http.clone()),
//!     DiffInvoker::default(),
//!     WebhookNotifier::new(http, inputs.webhook_url.clone()),
//! );
//! let outcome = runner.run(&inputs, &mut AzurePipelinesHost::stdout()).await;
//! println!("{}", outcome);
//! # Ok(())
//! # }
//! ```

mod classify;
mod host;
mod inputs;
mod notify;
mod runner;

pub use classify::{classify, report};
pub use host::{escape_data, AzurePipelinesHost, ConsoleHost, TaskHost, TaskOutcome};
pub use inputs::{RawInputs, TaskInputs};
pub use notify::{NotifyStatus, WebhookNotifier};
pub use runner::{
    fail_configuration, failure_message, TaskRunner, CONFIG_FAILURE_MESSAGE, SUCCESS_MESSAGE,
};
