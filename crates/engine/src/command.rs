//! External-command engine plumbing
//!
//! An engine is a program line such as `openapi-diff {left} {right}`. Each
//! `{name}` placeholder is replaced by the path of a staged temporary file
//! before the program runs; its output must contain the engine's JSON result.

use crate::{EngineError, PARSE_ERROR_CODE};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, warn};

/// Program line with `{left}`, `{right}` and `{config}` placeholders
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    program: String,
    args: Vec<String>,
}

impl CommandTemplate {
    /// Split a program line on whitespace
    pub fn parse(line: &str) -> Result<Self, EngineError> {
        let mut parts = line.split_whitespace().map(String::from);
        let program = parts
            .next()
            .ok_or_else(|| EngineError::InvalidCommand(line.to_string()))?;

        Ok(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Build from one of the built-in program lines
    pub(crate) fn builtin(line: &'static str) -> Self {
        let mut parts = line.split_whitespace().map(String::from);
        Self {
            program: parts.next().unwrap_or_default(),
            args: parts.collect(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments with every `{name}` placeholder substituted
    pub fn render_args(&self, vars: &[(&str, &Path)]) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| {
                vars.iter().fold(arg.clone(), |acc, (name, path)| {
                    acc.replace(&format!("{{{}}}", name), &path.display().to_string())
                })
            })
            .collect()
    }

    /// Run the program and parse the JSON document it prints as `T`
    ///
    /// The document may be preceded by a summary line and may be written to
    /// stdout or stderr (stdout wins). Output that parses is accepted whatever
    /// the exit status, since diff tools commonly exit non-zero when they find
    /// breaking changes.
    pub async fn run<T: DeserializeOwned>(&self, vars: &[(&str, &Path)]) -> Result<T, EngineError> {
        let args = self.render_args(vars);
        debug!(program = %self.program, args = ?args, "running diff engine");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .await
            .map_err(|source| EngineError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        let parsed = extract_json::<T>(&stdout)
            .or_else(|stdout_err| extract_json::<T>(&stderr).map_err(|_| stdout_err));

        match parsed {
            Ok(result) => {
                if !output.status.success() {
                    debug!(program = %self.program, status = %output.status, "engine exited non-zero with a result");
                }
                Ok(result)
            }
            Err(source) if output.status.success() => Err(EngineError::MalformedOutput {
                program: self.program.clone(),
                source,
            }),
            Err(_) => {
                warn!(program = %self.program, status = %output.status, "diff engine failed");
                if stdout.contains(PARSE_ERROR_CODE) || stderr.contains(PARSE_ERROR_CODE) {
                    Err(EngineError::Parse {
                        message: parse_error_message(&stdout, &stderr),
                    })
                } else {
                    Err(EngineError::Failed {
                        program: self.program.clone(),
                        status: output.status.to_string(),
                        stderr: stderr.trim().to_string(),
                    })
                }
            }
        }
    }
}

impl FromStr for CommandTemplate {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Message text of a parse failure, without the marker prefix
fn parse_error_message(stdout: &str, stderr: &str) -> String {
    let text = if stderr.contains(PARSE_ERROR_CODE) {
        stderr
    } else {
        stdout
    };

    // openapi-diff may print the error object itself
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(text.trim()) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.to_string();
        }
    }

    text.lines()
        .find(|line| line.contains(PARSE_ERROR_CODE))
        .unwrap_or(text)
        .split_once(PARSE_ERROR_CODE)
        .map(|(_, rest)| rest.trim_start_matches(':').trim())
        .unwrap_or_else(|| text.trim())
        .to_string()
}

/// First JSON document in `text` that parses as `T`
///
/// Each `{` is tried as the start of the document; text after the matching
/// end is ignored. The error is the one from parsing the first candidate.
fn extract_json<T: DeserializeOwned>(text: &str) -> Result<T, serde_json::Error> {
    let mut first_error = None;
    for (start, _) in text.match_indices('{') {
        let mut deserializer = serde_json::Deserializer::from_str(&text[start..]);
        match T::deserialize(&mut deserializer) {
            Ok(value) => return Ok(value),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => serde_json::from_str(text.trim()),
    }
}

/// Write `content` to a temporary file that lives until dropped
///
/// File creation and the write run on the blocking pool.
pub(crate) async fn stage(
    prefix: &str,
    extension: &str,
    content: &str,
) -> Result<NamedTempFile, EngineError> {
    let prefix = prefix.to_string();
    let suffix = format!(".{}", extension);
    let content = content.to_string();

    tokio::task::spawn_blocking(move || {
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile()?;
        file.write_all(content.as_bytes())?;
        file.flush()?;
        Ok::<_, std::io::Error>(file)
    })
    .await
    .map_err(|e| EngineError::Stage(std::io::Error::other(e)))?
    .map_err(EngineError::Stage)
}
