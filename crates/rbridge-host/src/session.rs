//! Script session handle
//!
//! A session owns one host with one sourced script. Calls go through
//! `&mut self`, so a session can only run one foreign call at a time.

use crate::args::CallArgs;
use crate::environment::ProjectEnvironment;
use crate::error::HostError;
use crate::host::ScriptHost;
use rbridge_convert::ValueConverter;
use rbridge_core::{ForeignValue, HostConfig, NativeValue};
use std::path::{Path, PathBuf};

/// A foreign script loaded into a host, ready to be called
pub struct ScriptSession<H: ScriptHost> {
    host: H,
    environment: Option<ProjectEnvironment>,
    script: PathBuf,
    working_dir: PathBuf,
    auto_convert: bool,
    converter: ValueConverter,
}

impl<H: ScriptHost> ScriptSession<H> {
    /// Activate the project environment (when given) and source `script`
    pub fn open(
        mut host: H,
        project_dir: Option<&Path>,
        script: &Path,
        config: &HostConfig,
    ) -> Result<Self, HostError> {
        if !script.is_file() {
            return Err(HostError::ScriptNotFound(script.to_path_buf()));
        }
        let script = script.canonicalize()?;
        let working_dir = script
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let environment = project_dir
            .map(|dir| ProjectEnvironment::activate(dir, config))
            .transpose()?;

        host.load(environment.as_ref(), &script)?;
        tracing::info!(
            "Script sourced: {} ({} host)",
            script.file_name().unwrap_or_default().to_string_lossy(),
            host.name()
        );

        Ok(Self {
            host,
            environment,
            script,
            working_dir,
            auto_convert: config.auto_convert,
            converter: ValueConverter::new(),
        })
    }

    /// Call a function and return the raw foreign result
    pub fn call(&mut self, function: &str, args: &CallArgs) -> Result<ForeignValue, HostError> {
        tracing::debug!(function, args = args.len(), "Calling foreign function");
        self.host.invoke(function, args)
    }

    /// Call a function and convert its result
    pub fn call_native(&mut self, function: &str, args: &CallArgs) -> Result<NativeValue, HostError> {
        let raw = self.call(function, args)?;
        Ok(self.converter.convert(raw))
    }

    /// Call a function, converting unless `convert` (or the session default) says not to
    ///
    /// An unconverted result comes back as [`NativeValue::Foreign`].
    pub fn call_with(
        &mut self,
        function: &str,
        args: &CallArgs,
        convert: Option<bool>,
    ) -> Result<NativeValue, HostError> {
        let raw = self.call(function, args)?;
        if convert.unwrap_or(self.auto_convert) {
            Ok(self.converter.convert(raw))
        } else {
            Ok(NativeValue::Foreign(raw))
        }
    }

    pub fn has_function(&self, function: &str) -> Result<bool, HostError> {
        self.host.has_function(function)
    }

    pub fn script(&self) -> &Path {
        &self.script
    }

    /// Directory the host runs in (the script's directory)
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn environment(&self) -> Option<&ProjectEnvironment> {
        self.environment.as_ref()
    }

    pub fn auto_convert(&self) -> bool {
        self.auto_convert
    }

    pub fn set_auto_convert(&mut self, auto_convert: bool) {
        self.auto_convert = auto_convert;
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Give the host back, ending the session
    pub fn into_host(self) -> H {
        self.host
    }
}
