//! Inference engine backed by an external predictor program.
//!
//! The program is run once per prediction:
//!
//! ```text
//! <program> <args...> --smiles <SMILES> --target <logP|pKa> [--fast] --model <h2o|gnn>
//! ```
//!
//! It must print the predicted value alone on the last non-empty line of
//! stdout, so wrappers may log freely before it. Exit status 65
//! (`EX_DATAERR`) marks the identifier as malformed; any other non-zero status
//! is an engine failure.
//!
//! On Unix the program runs in its own process group, so a terminal Ctrl-C
//! reaches the cancellation handler and not the prediction in flight.

#[cfg(unix)]
use std::os::unix::process::CommandExt;
use std::process::Command;

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{FluoroError, Result};

use super::provider::{EngineError, InferenceEngine, PredictionRequest};

/// Environment variable holding the predictor command line.
pub const ENGINE_CMD_ENV: &str = "FLUORO_ENGINE_CMD";

/// Exit status for a malformed identifier.
const EXIT_DATAERR: i32 = 65;

static FLOAT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?$").expect("valid float pattern")
});

/// Configuration for [`CommandEngine`].
#[derive(Debug, Clone)]
pub struct CommandEngineConfig {
    /// Program to execute.
    pub program: String,
    /// Arguments placed before the per-request arguments.
    pub args: Vec<String>,
}

impl CommandEngineConfig {
    /// Parse a whitespace-separated command line such as
    /// `"python -m fluoriclogppka.cli"`.
    pub fn from_command_line(line: &str) -> Result<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next().ok_or_else(|| {
            FluoroError::Configuration("engine command line is empty".to_string())
        })?;
        Ok(Self {
            program,
            args: parts.collect(),
        })
    }
}

/// Runs an external program for each prediction.
pub struct CommandEngine {
    config: CommandEngineConfig,
}

impl CommandEngine {
    /// Create an engine with explicit configuration.
    pub fn with_config(config: CommandEngineConfig) -> Self {
        Self { config }
    }

    /// Create an engine from the `FLUORO_ENGINE_CMD` environment variable.
    pub fn from_env() -> Result<Self> {
        let line = std::env::var(ENGINE_CMD_ENV).map_err(|_| {
            FluoroError::Configuration(format!(
                "{} is not set; point it at the predictor command",
                ENGINE_CMD_ENV
            ))
        })?;
        Ok(Self::with_config(CommandEngineConfig::from_command_line(&line)?))
    }

    fn build_command(&self, request: &PredictionRequest<'_>) -> Command {
        let mut command = Command::new(&self.config.program);
        command
            .args(&self.config.args)
            .arg("--smiles")
            .arg(request.identifier)
            .arg("--target")
            .arg(request.property.engine_target());
        if request.parameters.conformers.is_fast() {
            command.arg("--fast");
        }
        command
            .arg("--model")
            .arg(request.parameters.model.engine_name());
        #[cfg(unix)]
        command.process_group(0);
        command
    }
}

/// Parse the predicted value from the last non-empty line of stdout.
///
/// The whole line must be a finite decimal number.
pub fn parse_prediction(stdout: &str) -> std::result::Result<f64, EngineError> {
    let line = stdout
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .ok_or_else(|| EngineError::InvalidResponse("predictor printed nothing".to_string()))?;

    if !FLOAT_PATTERN.is_match(line) {
        return Err(EngineError::InvalidResponse(format!("not a number: {:?}", line)));
    }
    let value = line
        .parse::<f64>()
        .map_err(|e| EngineError::InvalidResponse(format!("{}: {}", line, e)))?;
    if !value.is_finite() {
        return Err(EngineError::InvalidResponse(format!("non-finite value {}", line)));
    }
    Ok(value)
}

impl InferenceEngine for CommandEngine {
    fn predict(&self, request: &PredictionRequest<'_>) -> std::result::Result<f64, EngineError> {
        debug!(
            "Running {} for {} ({})",
            self.config.program, request.identifier, request.property
        );

        let output = self.build_command(request).output().map_err(|e| {
            EngineError::Unavailable(format!("failed to start '{}': {}", self.config.program, e))
        })?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        match output.status.code() {
            Some(0) => parse_prediction(&String::from_utf8_lossy(&output.stdout)),
            Some(EXIT_DATAERR) => Err(EngineError::MalformedIdentifier(format!(
                "{}: {}",
                request.identifier,
                stderr.trim()
            ))),
            Some(code) => Err(EngineError::Internal(format!(
                "exit status {}: {}",
                code,
                stderr.trim()
            ))),
            None => Err(EngineError::Internal("predictor terminated by signal".to_string())),
        }
    }

    fn name(&self) -> &str {
        "command"
    }
}
