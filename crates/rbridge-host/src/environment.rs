//! Project environment activation
//!
//! A project environment is a directory holding a package-library
//! activation script and a lockfile. Activation only validates the layout
//! and collects the variables the foreign process must be started with;
//! nothing is applied to the current process.

use crate::error::HostError;
use rbridge_core::HostConfig;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Variable pointing the foreign runtime at a user environment file
pub const R_ENVIRON_USER: &str = "R_ENVIRON_USER";

/// An activated project environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectEnvironment {
    /// Absolute project directory
    pub project_dir: PathBuf,

    /// Activation script inside the project
    pub activate_script: PathBuf,

    /// Lockfile inside the project
    pub lockfile: PathBuf,

    /// Variables to set on the foreign process
    pub env_vars: BTreeMap<String, String>,
}

impl ProjectEnvironment {
    /// Validate `project_dir` and collect its environment variables
    ///
    /// Fails with [`HostError::EnvironmentNotFound`] unless both the
    /// activation script and the lockfile exist. An environment file is
    /// optional; when present it is recorded under [`R_ENVIRON_USER`].
    pub fn activate(project_dir: &Path, config: &HostConfig) -> Result<Self, HostError> {
        let not_found = || HostError::EnvironmentNotFound {
            path: project_dir.to_path_buf(),
        };

        let project_dir = project_dir.canonicalize().map_err(|_| not_found())?;
        let activate_script = project_dir.join(&config.activate_script);
        let lockfile = project_dir.join(&config.lockfile);

        if !activate_script.is_file() || !lockfile.is_file() {
            return Err(HostError::EnvironmentNotFound { path: project_dir });
        }

        let mut env_vars = BTreeMap::new();
        let renviron = project_dir.join(&config.renviron);
        if !config.renviron.is_empty() && renviron.is_file() {
            tracing::info!("{} set to: {}", R_ENVIRON_USER, renviron.display());
            env_vars.insert(R_ENVIRON_USER.to_string(), renviron.display().to_string());
        }

        tracing::info!("Project environment found: {}", project_dir.display());

        Ok(Self {
            project_dir,
            activate_script,
            lockfile,
            env_vars,
        })
    }

    /// The environment file, if one was found
    pub fn renviron(&self) -> Option<&str> {
        self.env_vars.get(R_ENVIRON_USER).map(String::as_str)
    }
}
