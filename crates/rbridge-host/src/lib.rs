//! Foreign script host
//!
//! Activates a project environment, sources a foreign script and calls its
//! functions, handing results back raw or converted to native values.
//!
//! ## Example
//!
//! ```rust,ignore
//! use rbridge_host::{CallArgs, RscriptHost, ScriptSession};
//!
//! let host = RscriptHost::from_config(&config.host);
//! let mut session = ScriptSession::open(host, Some(&project), &script, &config.host)?;
//! let result = session.call_native(
//!     "generate_master_main_bl_df",
//!     &CallArgs::new().arg("6236-001").named("assay", "all"),
//! )?;
//! let df = result.get("df").and_then(|v| v.as_table());
//! ```

pub mod args;
pub mod environment;
pub mod error;
pub mod host;
pub mod mock;
pub mod rscript;
pub mod session;

pub use args::CallArgs;
pub use environment::{ProjectEnvironment, R_ENVIRON_USER};
pub use error::HostError;
pub use host::ScriptHost;
pub use mock::{LoadRecord, MockHost};
pub use rscript::RscriptHost;
pub use session::ScriptSession;
