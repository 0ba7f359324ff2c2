//! Foreign script host seam

use crate::args::CallArgs;
use crate::environment::ProjectEnvironment;
use crate::error::HostError;
use rbridge_core::ForeignValue;
use std::path::Path;

/// Something that can source a foreign script and call its functions
///
/// A host holds interpreter state (working directory, sourced script,
/// loaded environment), so every state-changing method takes `&mut self`.
pub trait ScriptHost {
    /// Short host name for diagnostics
    fn name(&self) -> &'static str;

    /// Load the environment (if any), change to the script's directory and
    /// source the script
    fn load(&mut self, env: Option<&ProjectEnvironment>, script: &Path) -> Result<(), HostError>;

    /// Whether the sourced script defines `function`
    ///
    /// Host failures are returned as errors, not as `false`.
    fn has_function(&self, function: &str) -> Result<bool, HostError>;

    /// Call `function` and return its raw result
    ///
    /// Fails with [`HostError::FunctionNotFound`] when the function is not
    /// defined and [`HostError::CallFailed`] when the foreign call raises.
    fn invoke(&mut self, function: &str, args: &CallArgs) -> Result<ForeignValue, HostError>;
}
