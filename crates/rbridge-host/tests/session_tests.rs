//! Session and environment tests against the mock host
//!
//! Project layouts are built in temporary directories; no foreign runtime
//! is needed.

use pretty_assertions::assert_eq;
use rbridge_core::{
    ForeignColumn, ForeignTable, ForeignValue, HostConfig, NamedList, NativeValue, VectorData,
};
use rbridge_host::{CallArgs, HostError, MockHost, ProjectEnvironment, ScriptSession, R_ENVIRON_USER};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// Fixtures
// =============================================================================

/// Project directory with an activation script and a lockfile
fn project(with_renviron: bool) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("renv")).unwrap();
    fs::write(dir.path().join("renv/activate.R"), "source('renv/activate.R')\n").unwrap();
    fs::write(dir.path().join("renv.lock"), "{}\n").unwrap();
    if with_renviron {
        fs::write(dir.path().join(".Renviron"), "DB_USER=analyst\n").unwrap();
    }
    dir
}

fn script(dir: &Path) -> PathBuf {
    let lib = dir.join("lib/master");
    fs::create_dir_all(&lib).unwrap();
    let path = lib.join("generate_main_bl_df.R");
    fs::write(&path, "generate_master_main_bl_df <- function(study, assay) list()\n").unwrap();
    path
}

fn baseline_result() -> ForeignValue {
    ForeignValue::List(NamedList::from_pairs(vec![
        (
            "df",
            ForeignValue::DataFrame(ForeignTable::new(vec![ForeignColumn::new(
                "Patient_ID",
                VectorData::Character(vec![Some("P1".to_string()), Some("P2".to_string())]),
            )])),
        ),
        (
            "patient_ids",
            ForeignValue::List(NamedList::from_pairs(vec![(
                "# patients in EDC",
                ForeignValue::from(vec!["P1".to_string(), "P2".to_string()]),
            )])),
        ),
    ]))
}

fn mock() -> MockHost {
    MockHost::new().with_function("generate_master_main_bl_df", |args| {
        match args.get_named("assay") {
            Some(_) => Ok(baseline_result()),
            None => Err("argument \"assay\" is missing, with no default".to_string()),
        }
    })
}

// =============================================================================
// Environment Activation
// =============================================================================

#[test]
fn test_activate_complete_project() {
    let dir = project(true);
    let env = ProjectEnvironment::activate(dir.path(), &HostConfig::default()).unwrap();

    assert_eq!(env.project_dir, dir.path().canonicalize().unwrap());
    assert!(env.activate_script.ends_with("renv/activate.R"));
    assert!(env.renviron().unwrap().ends_with(".Renviron"));
    assert_eq!(env.env_vars.len(), 1);
}

#[test]
fn test_missing_renviron_is_not_fatal() {
    let dir = project(false);
    let env = ProjectEnvironment::activate(dir.path(), &HostConfig::default()).unwrap();

    assert_eq!(env.renviron(), None);
    assert!(env.env_vars.is_empty());
}

#[test]
fn test_missing_lockfile_fails() {
    let dir = project(false);
    fs::remove_file(dir.path().join("renv.lock")).unwrap();

    let err = ProjectEnvironment::activate(dir.path(), &HostConfig::default()).unwrap_err();
    assert!(matches!(err, HostError::EnvironmentNotFound { .. }));
}

#[test]
fn test_missing_project_dir_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nowhere");

    let err = ProjectEnvironment::activate(&missing, &HostConfig::default()).unwrap_err();
    assert!(matches!(err, HostError::EnvironmentNotFound { path } if path == missing));
}

#[test]
fn test_custom_layout_from_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("activate.R"), "").unwrap();
    fs::write(dir.path().join("packages.lock"), "").unwrap();
    let config = HostConfig {
        activate_script: "activate.R".to_string(),
        lockfile: "packages.lock".to_string(),
        ..HostConfig::default()
    };

    assert!(ProjectEnvironment::activate(dir.path(), &config).is_ok());
    assert!(ProjectEnvironment::activate(dir.path(), &HostConfig::default()).is_err());
}

// =============================================================================
// Sessions
// =============================================================================

#[test]
fn test_open_sources_script_with_environment() {
    let dir = project(true);
    let script = script(dir.path());

    let session =
        ScriptSession::open(mock(), Some(dir.path()), &script, &HostConfig::default()).unwrap();

    assert_eq!(session.working_dir(), script.canonicalize().unwrap().parent().unwrap());
    assert!(session.has_function("generate_master_main_bl_df").unwrap());
    assert!(!session.has_function("generate_master_main_eot_df").unwrap());

    let loads = session.host().loads();
    assert_eq!(loads.len(), 1);
    assert_eq!(loads[0].script, script.canonicalize().unwrap());
    assert!(loads[0].env_vars.contains_key(R_ENVIRON_USER));
}

#[test]
fn test_open_without_project() {
    let dir = tempfile::tempdir().unwrap();
    let script = script(dir.path());

    let session = ScriptSession::open(mock(), None, &script, &HostConfig::default()).unwrap();

    assert!(session.environment().is_none());
    assert_eq!(session.host().loads()[0].project_dir, None);
}

#[test]
fn test_missing_script() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.R");

    let err = ScriptSession::open(mock(), None, &missing, &HostConfig::default())
        .err()
        .unwrap();
    assert!(matches!(err, HostError::ScriptNotFound(path) if path == missing));
}

#[test]
fn test_incomplete_environment_stops_open() {
    let dir = tempfile::tempdir().unwrap();
    let script = script(dir.path());

    let result = ScriptSession::open(mock(), Some(dir.path()), &script, &HostConfig::default());
    assert!(matches!(result, Err(HostError::EnvironmentNotFound { .. })));
}

#[test]
fn test_call_native_converts_nested_result() {
    let dir = tempfile::tempdir().unwrap();
    let script = script(dir.path());
    let mut session = ScriptSession::open(mock(), None, &script, &HostConfig::default()).unwrap();

    let args = CallArgs::new().arg("6236-001").named("assay", "all");
    let result = session
        .call_native("generate_master_main_bl_df", &args)
        .unwrap();

    let df = result.get("df").and_then(NativeValue::as_table).unwrap();
    assert_eq!(df.shape(), (2, 1));
    let ids = result
        .get("patient_ids")
        .and_then(|v| v.get("# patients in EDC"))
        .unwrap();
    assert_eq!(ids.len(), 2);
}

#[test]
fn test_conversion_override() {
    let dir = tempfile::tempdir().unwrap();
    let script = script(dir.path());
    let config = HostConfig {
        auto_convert: false,
        ..HostConfig::default()
    };
    let mut session = ScriptSession::open(mock(), None, &script, &config).unwrap();
    let args = CallArgs::new().named("assay", "all");

    let raw = session
        .call_with("generate_master_main_bl_df", &args, None)
        .unwrap();
    assert_eq!(raw, NativeValue::Foreign(baseline_result()));

    let converted = session
        .call_with("generate_master_main_bl_df", &args, Some(true))
        .unwrap();
    assert!(converted.as_map().is_some());
}

#[test]
fn test_call_errors() {
    let dir = tempfile::tempdir().unwrap();
    let script = script(dir.path());
    let mut session = ScriptSession::open(mock(), None, &script, &HostConfig::default()).unwrap();

    let err = session
        .call("generate_master_main_eot_df", &CallArgs::new())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Function 'generate_master_main_eot_df' not found in the sourced script"
    );

    let err = session
        .call("generate_master_main_bl_df", &CallArgs::new().arg("6236-001"))
        .unwrap_err();
    assert!(matches!(
        err,
        HostError::CallFailed { ref message, .. } if message.contains("\"assay\" is missing")
    ));
}

#[test]
fn test_load_failure_surfaces() {
    let dir = tempfile::tempdir().unwrap();
    let script = script(dir.path());
    let host = MockHost::new().with_load_failure("unexpected symbol");

    let result = ScriptSession::open(host, None, &script, &HostConfig::default());
    assert!(matches!(result, Err(HostError::LoadFailed { .. })));
}
