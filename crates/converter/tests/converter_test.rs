//! Integration tests for the converter invoker using stand-in scripts

#![cfg(unix)]

use postman_sync_common::SyncError;
use postman_sync_converter::{Converter, ConverterConfig};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tempfile::TempDir;

// A script still open for writing in one test leaks into a child forked by
// another, and exec then fails with ETXTBSY. Writes and spawns take turns.
static SCRIPTS: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SCRIPTS.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Write an executable shell script standing in for openapi2postmanv2
fn fake_converter(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("fake-openapi2postmanv2");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

fn openapi_file(dir: &Path) -> PathBuf {
    let path = dir.join("openapi.json");
    fs::write(
        &path,
        r#"{"openapi": "3.0.0", "info": {"title": "Pets", "version": "1.0.0"}, "paths": {}}"#,
    )
    .unwrap();
    path
}

#[tokio::test]
async fn test_successful_conversion_writes_output() {
    let _serial = serial();
    let temp_dir = TempDir::new().unwrap();
    // $2 is the source path, $4 the output path
    let program = fake_converter(
        temp_dir.path(),
        r#"echo '{"info": {"name": "Pets"}, "item": []}' > "$4"
echo "Conversion successful, collection written to file""#,
    );
    let input = openapi_file(temp_dir.path());
    let output = temp_dir.path().join("collection.json");

    let converter = Converter::default().with_program(&program);
    let stdout = converter.convert(&input, &output).await.unwrap();

    assert!(stdout.contains("Conversion successful"));
    let written = fs::read_to_string(&output).unwrap();
    assert!(written.contains("\"Pets\""));
}

#[tokio::test]
async fn test_nonzero_exit_is_process_error() {
    let _serial = serial();
    let temp_dir = TempDir::new().unwrap();
    let program = fake_converter(temp_dir.path(), "echo 'invalid spec' >&2\nexit 3");
    let input = openapi_file(temp_dir.path());

    let converter = Converter::default().with_program(&program);
    let err = converter
        .convert(&input, temp_dir.path().join("out.json"))
        .await
        .unwrap_err();

    match err {
        SyncError::Process { message, data } => {
            assert_eq!(message, "Error executing command");
            assert!(data.contains("invalid spec"), "data was: {data}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_stderr_with_zero_exit_is_process_error() {
    let _serial = serial();
    let temp_dir = TempDir::new().unwrap();
    let program = fake_converter(
        temp_dir.path(),
        "echo '{}' > \"$4\"\necho 'warning: unresolved $ref' >&2\nexit 0",
    );
    let input = openapi_file(temp_dir.path());

    let converter = Converter::default().with_program(&program);
    let err = converter
        .convert(&input, temp_dir.path().join("out.json"))
        .await
        .unwrap_err();

    match err {
        SyncError::Process { message, data } => {
            assert_eq!(message, "Command threw errors");
            assert!(data.contains("unresolved $ref"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_lenient_mode_accepts_stderr() {
    let _serial = serial();
    let temp_dir = TempDir::new().unwrap();
    let program = fake_converter(
        temp_dir.path(),
        "echo '{}' > \"$4\"\necho 'warning' >&2\necho done",
    );
    let input = openapi_file(temp_dir.path());

    let converter = Converter::new(ConverterConfig {
        program,
        strict: false,
    });
    let stdout = converter
        .convert(&input, temp_dir.path().join("out.json"))
        .await
        .unwrap();

    assert_eq!(stdout.trim(), "done");
}

#[tokio::test]
async fn test_missing_program_is_process_error() {
    let _serial = serial();
    let temp_dir = TempDir::new().unwrap();
    let input = openapi_file(temp_dir.path());

    let converter = Converter::default().with_program(temp_dir.path().join("no-such-binary"));
    let err = converter
        .convert(&input, temp_dir.path().join("out.json"))
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Process { ref message, .. } if message == "Error executing command"));
}
