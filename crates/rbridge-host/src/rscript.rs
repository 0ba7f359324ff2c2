//! Host backed by an `Rscript` child process
//!
//! Each operation starts a fresh process running the embedded driver
//! (`driver.R`), which loads the project environment, changes to the
//! script's directory, sources the script and then does its one job.
//! Arguments and results travel as tagged JSON through temporary files.

use crate::args::CallArgs;
use crate::environment::ProjectEnvironment;
use crate::error::HostError;
use crate::host::ScriptHost;
use rbridge_core::{ForeignValue, HostConfig};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// The embedded driver script
pub const DRIVER: &str = include_str!("driver.R");

/// Driver exit status for an undefined function
const EXIT_FUNCTION_NOT_FOUND: i32 = 3;

/// What the driver does after sourcing the script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Load,
    Check,
    Call,
}

impl Mode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Check => "check",
            Self::Call => "call",
        }
    }
}

/// Runs foreign functions through `Rscript`
#[derive(Debug, Clone)]
pub struct RscriptHost {
    rscript: PathBuf,
    project: Option<PathBuf>,
    script: Option<PathBuf>,
    env_vars: BTreeMap<String, String>,
}

impl RscriptHost {
    /// Host using the given `Rscript` executable
    pub fn new(rscript: impl Into<PathBuf>) -> Self {
        Self {
            rscript: rscript.into(),
            project: None,
            script: None,
            env_vars: BTreeMap::new(),
        }
    }

    pub fn from_config(config: &HostConfig) -> Self {
        Self::new(&config.rscript)
    }

    fn run(&self, mode: Mode, function: &str, args: &CallArgs) -> Result<Option<ForeignValue>, HostError> {
        let script = self
            .script
            .as_deref()
            .ok_or_else(|| HostError::Protocol("no script has been sourced".to_string()))?;

        let workdir = tempfile::tempdir()?;
        let driver_path = workdir.path().join("driver.R");
        let args_path = workdir.path().join("args.json");
        let result_path = workdir.path().join("result.json");

        std::fs::write(&driver_path, DRIVER)?;
        let encoded = serde_json::to_string(args).map_err(|e| HostError::Protocol(e.to_string()))?;
        std::fs::write(&args_path, encoded)?;

        let project = self
            .project
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();

        tracing::debug!(mode = mode.as_str(), function, "Starting {}", self.rscript.display());
        let output = Command::new(&self.rscript)
            .arg(&driver_path)
            .arg(mode.as_str())
            .arg(project)
            .arg(script)
            .arg(function)
            .arg(&args_path)
            .arg(&result_path)
            .envs(&self.env_vars)
            .output()?;

        check_status(&output, mode, script, function)?;

        if mode != Mode::Call {
            return Ok(None);
        }

        let json = std::fs::read_to_string(&result_path)
            .map_err(|e| HostError::Protocol(format!("missing result file: {}", e)))?;
        let value = serde_json::from_str(&json).map_err(|e| HostError::Protocol(e.to_string()))?;
        Ok(Some(value))
    }
}

/// Map the driver's exit status to an error
fn check_status(output: &Output, mode: Mode, script: &Path, function: &str) -> Result<(), HostError> {
    if output.status.success() {
        return Ok(());
    }

    let message = stderr_message(&output.stderr);
    match (mode, output.status.code()) {
        (Mode::Load, _) => Err(HostError::LoadFailed {
            script: script.to_path_buf(),
            message,
        }),
        (_, Some(EXIT_FUNCTION_NOT_FOUND)) => Err(HostError::FunctionNotFound {
            function: function.to_string(),
        }),
        _ => Err(HostError::CallFailed {
            function: function.to_string(),
            message,
        }),
    }
}

/// Last non-empty stderr lines, which carry the foreign error message
fn stderr_message(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(5);
    let message = lines[start..].join("\n");
    if message.is_empty() {
        "process exited without an error message".to_string()
    } else {
        message
    }
}

impl ScriptHost for RscriptHost {
    fn name(&self) -> &'static str {
        "Rscript"
    }

    fn load(&mut self, env: Option<&ProjectEnvironment>, script: &Path) -> Result<(), HostError> {
        self.project = env.map(|e| e.project_dir.clone());
        self.env_vars = env.map(|e| e.env_vars.clone()).unwrap_or_default();
        self.script = Some(script.to_path_buf());

        if let Some(project) = &self.project {
            tracing::info!("Environment will be loaded for project: {}", project.display());
        }
        self.run(Mode::Load, "", &CallArgs::new()).map(|_| ())
    }

    fn has_function(&self, function: &str) -> Result<bool, HostError> {
        match self.run(Mode::Check, function, &CallArgs::new()) {
            Ok(_) => Ok(true),
            Err(HostError::FunctionNotFound { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn invoke(&mut self, function: &str, args: &CallArgs) -> Result<ForeignValue, HostError> {
        self.run(Mode::Call, function, args)?
            .ok_or_else(|| HostError::Protocol("driver returned no result".to_string()))
    }
}
