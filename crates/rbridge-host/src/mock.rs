//! In-memory script host for testing
//!
//! Functions are plain Rust closures registered by name. Nothing is
//! executed on `load`; the call is only recorded.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rbridge_host::{CallArgs, MockHost, ScriptSession};
//!
//! let host = MockHost::new().with_function("add_one", |args| {
//!     Ok(args.positional[0].clone())
//! });
//! let mut session = ScriptSession::open(host, None, &script, &HostConfig::default())?;
//! let result = session.call("add_one", &CallArgs::new().arg(1))?;
//! ```
//!
//! ## Simulating Failures
//!
//! A closure returning `Err(message)` surfaces as [`HostError::CallFailed`];
//! [`MockHost::with_load_failure`] makes `load` fail.

use crate::args::CallArgs;
use crate::environment::ProjectEnvironment;
use crate::error::HostError;
use crate::host::ScriptHost;
use rbridge_core::ForeignValue;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

type MockFunction = Box<dyn FnMut(&CallArgs) -> Result<ForeignValue, String>>;

/// One recorded `load`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRecord {
    pub script: PathBuf,
    pub project_dir: Option<PathBuf>,
    pub env_vars: BTreeMap<String, String>,
}

/// Mock host for testing
#[derive(Default)]
pub struct MockHost {
    /// Registered functions by name
    functions: HashMap<String, MockFunction>,

    /// Every `load`, in order
    loads: Vec<LoadRecord>,

    /// Every invoked function name, in order
    calls: Vec<String>,

    /// Message returned by `load`, when set
    load_failure: Option<String>,
}

impl MockHost {
    /// Create a mock host with no functions
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a function
    pub fn with_function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: FnMut(&CallArgs) -> Result<ForeignValue, String> + 'static,
    {
        self.add_function(name, function);
        self
    }

    /// Register a function that always returns `value`
    pub fn with_value(self, name: impl Into<String>, value: ForeignValue) -> Self {
        self.with_function(name, move |_| Ok(value.clone()))
    }

    /// Make `load` fail with `message`
    pub fn with_load_failure(mut self, message: impl Into<String>) -> Self {
        self.load_failure = Some(message.into());
        self
    }

    /// Register a function on an existing host
    pub fn add_function<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: FnMut(&CallArgs) -> Result<ForeignValue, String> + 'static,
    {
        self.functions.insert(name.into(), Box::new(function));
    }

    pub fn loads(&self) -> &[LoadRecord] {
        &self.loads
    }

    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    fn is_loaded(&self) -> bool {
        !self.loads.is_empty()
    }
}

impl ScriptHost for MockHost {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn load(&mut self, env: Option<&ProjectEnvironment>, script: &Path) -> Result<(), HostError> {
        if let Some(message) = &self.load_failure {
            return Err(HostError::LoadFailed {
                script: script.to_path_buf(),
                message: message.clone(),
            });
        }

        self.loads.push(LoadRecord {
            script: script.to_path_buf(),
            project_dir: env.map(|e| e.project_dir.clone()),
            env_vars: env.map(|e| e.env_vars.clone()).unwrap_or_default(),
        });
        Ok(())
    }

    fn has_function(&self, function: &str) -> Result<bool, HostError> {
        Ok(self.is_loaded() && self.functions.contains_key(function))
    }

    fn invoke(&mut self, function: &str, args: &CallArgs) -> Result<ForeignValue, HostError> {
        self.calls.push(function.to_string());

        // Nothing is defined before a script has been sourced.
        let loaded = self.is_loaded();
        let Some(f) = self.functions.get_mut(function).filter(|_| loaded) else {
            return Err(HostError::FunctionNotFound {
                function: function.to_string(),
            });
        };

        f(args).map_err(|message| HostError::CallFailed {
            function: function.to_string(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn functions_are_undefined_before_load() {
        let mut host = MockHost::new().with_value("f", ForeignValue::Null);

        assert!(!host.has_function("f").unwrap());
        assert!(matches!(
            host.invoke("f", &CallArgs::new()),
            Err(HostError::FunctionNotFound { .. })
        ));

        host.load(None, Path::new("script.R")).unwrap();
        assert!(host.has_function("f").unwrap());
        assert_eq!(host.invoke("f", &CallArgs::new()).unwrap(), ForeignValue::Null);
        assert_eq!(host.calls(), &["f".to_string(), "f".to_string()]);
    }

    #[test]
    fn closure_errors_become_call_failures() {
        let mut host = MockHost::new().with_function("boom", |_| Err("argument 4 is empty".into()));
        host.load(None, Path::new("script.R")).unwrap();

        let err = host.invoke("boom", &CallArgs::new()).unwrap_err();
        assert!(matches!(
            err,
            HostError::CallFailed { ref function, ref message }
                if function == "boom" && message == "argument 4 is empty"
        ));
    }

    #[test]
    fn closures_keep_state() {
        let mut counter = 0;
        let mut host = MockHost::new().with_function("next", move |_| {
            counter += 1;
            Ok(ForeignValue::from(counter))
        });
        host.load(None, Path::new("script.R")).unwrap();

        host.invoke("next", &CallArgs::new()).unwrap();
        assert_eq!(host.invoke("next", &CallArgs::new()).unwrap(), ForeignValue::from(2));
    }
}
