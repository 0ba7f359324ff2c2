//! Host error types

use std::path::PathBuf;

/// Errors raised while preparing or calling into the foreign runtime
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Project environment not found or incomplete at: {}", path.display())]
    EnvironmentNotFound { path: PathBuf },

    #[error("Script not found: {}", .0.display())]
    ScriptNotFound(PathBuf),

    #[error("Failed to source script {}: {message}", script.display())]
    LoadFailed { script: PathBuf, message: String },

    #[error("Function '{function}' not found in the sourced script")]
    FunctionNotFound { function: String },

    #[error("Error calling function '{function}': {message}")]
    CallFailed { function: String, message: String },

    #[error("Invalid response from host: {0}")]
    Protocol(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_function() {
        let err = HostError::CallFailed {
            function: "generate_master_main_bl_df".to_string(),
            message: "argument 4 is empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Error calling function 'generate_master_main_bl_df': argument 4 is empty"
        );

        let err = HostError::FunctionNotFound {
            function: "missing_fn".to_string(),
        };
        assert!(err.to_string().contains("'missing_fn'"));
    }
}
