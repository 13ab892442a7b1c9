use std::process::Stdio;

use async_trait::async_trait;
use inhouse_core::config::EngineConfig;
use inhouse_core::errors::ValidationError;
use inhouse_core::pipeline::TeamValidator;
use tokio::process::Command;
use tracing::debug;

/// Runs `<program> <args...> '<json names>'` and classifies its exit.
#[derive(Clone, Debug)]
pub struct ProcessValidator {
    program: String,
    args: Vec<String>,
    marker: String,
}

impl ProcessValidator {
    pub fn new(program: impl Into<String>, args: Vec<String>, marker: impl Into<String>) -> Self {
        Self { program: program.into(), args, marker: marker.into() }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            &config.validator_program,
            config.validator_args.clone(),
            &config.rejection_marker,
        )
    }
}

/// Returns the text after `<marker>:` on the first stderr line that carries a
/// non-empty reason.
pub fn extract_reason(stderr: &str, marker: &str) -> Option<String> {
    let needle = format!("{marker}:");
    stderr.lines().find_map(|line| {
        let start = line.find(&needle)? + needle.len();
        let reason = line[start..].trim();
        (!reason.is_empty()).then(|| reason.to_owned())
    })
}

#[async_trait]
impl TeamValidator for ProcessValidator {
    async fn validate(&self, display_names: &[String]) -> Result<(), ValidationError> {
        let names = serde_json::to_string(display_names)
            .map_err(|error| ValidationError::Spawn(error.to_string()))?;

        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(names)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|error| ValidationError::Spawn(error.to_string()))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        debug!(
            event_name = "engine.validator_exited",
            code = ?output.status.code(),
            stdout = %String::from_utf8_lossy(&output.stdout),
            stderr = %stderr,
            "validator finished"
        );

        if output.status.success() {
            return Ok(());
        }

        match extract_reason(&stderr, &self.marker) {
            Some(reason) => Err(ValidationError::Rejected { reason }),
            None => Err(ValidationError::Failed {
                code: output.status.code(),
                stderr: stderr.trim().to_owned(),
            }),
        }
    }
}
