//! CLI integration tests for Slipway.
//!
//! These tests run the binary against a scrubbed environment so host
//! compiler signals never leak into assertions.

use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;

/// Get the slipway binary with host compiler signals removed.
fn slipway() -> Command {
    let mut cmd = Command::cargo_bin("slipway").unwrap();
    cmd.env_remove("VCINSTALLDIR")
        .env_remove("VSCMD_ARG_TGT_ARCH")
        .env_remove("WindowsSdkDir")
        .env_remove("INCLUDE")
        .env_remove("LIB")
        .env_remove("MINGW32_PREFIX")
        .env_remove("MINGW64_PREFIX");
    cmd
}

// ============================================================================
// slipway resolve
// ============================================================================

#[test]
fn test_resolve_mingw_text_output() {
    slipway()
        .args(["resolve", "--use-mingw", "--arch", "x86_64"])
        .assert()
        .success()
        .stdout(predicate::str::contains("x86_64-w64-mingw32-gcc"))
        .stdout(predicate::str::contains("WINDOWS_ENABLED"))
        .stdout(predicate::str::contains("-Wl,--stack,8388608"));
}

#[test]
fn test_resolve_json_output_parses() {
    let output = slipway()
        .args([
            "resolve",
            "--use-mingw",
            "--arch",
            "x86_64",
            "--format",
            "json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let config: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(config["backend"], "mingw");
    assert_eq!(config["arch"], "x86_64");
    assert_eq!(config["tools"]["cc"], "x86_64-w64-mingw32-gcc");
    assert_eq!(config["tools"]["rc"], "x86_64-w64-mingw32-windres");
}

#[test]
fn test_resolve_rejects_unknown_arch() {
    slipway()
        .args(["resolve", "--arch", "x86_128"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported CPU architecture"))
        .stderr(predicate::str::contains("x86_128"));
}

#[test]
fn test_resolve_console_subsystem_adds_define() {
    slipway()
        .args([
            "resolve",
            "--use-mingw",
            "--arch",
            "x86_64",
            "--subsystem",
            "console",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("WINDOWS_SUBSYSTEM_CONSOLE"))
        .stdout(predicate::str::contains("-Wl,--subsystem,console"));
}

#[test]
fn test_resolve_gui_subsystem_has_no_console_define() {
    slipway()
        .args(["resolve", "--use-mingw", "--arch", "x86_64"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WINDOWS_SUBSYSTEM_CONSOLE").not());
}

#[test]
fn test_resolve_custom_prefix_from_env() {
    slipway()
        .args(["resolve", "--use-mingw", "--arch", "x86_64"])
        .env("MINGW64_PREFIX", "x86_64-w64-mingw32ucrt-")
        .assert()
        .success()
        .stdout(predicate::str::contains("x86_64-w64-mingw32ucrt-gcc"));
}

#[test]
fn test_resolve_rejects_unknown_format() {
    slipway()
        .args(["resolve", "--use-mingw", "--format", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown output format"));
}

#[test]
fn test_resolve_manual_msvc_rejects_explicit_arch() {
    slipway()
        .args(["resolve", "--arch", "x86_64"])
        .env("VCINSTALLDIR", "C:\\VC")
        .env("VSCMD_ARG_TGT_ARCH", "x64")
        .assert()
        .failure()
        .stderr(predicate::str::contains("VCINSTALLDIR"));
}

// ============================================================================
// slipway windres
// ============================================================================

#[test]
fn test_windres_rejects_malformed_pair() {
    slipway()
        .args(["windres", "app.rc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("malformed pair"));
}

#[test]
fn test_windres_requires_pairs() {
    slipway().args(["windres"]).assert().failure();
}

#[cfg(unix)]
#[test]
fn test_windres_drives_fake_tool() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempfile::TempDir::new().unwrap();
    let tool = tmp.path().join("fake-windres");
    fs::write(
        &tool,
        "#!/bin/sh\nwhile [ \"$1\" != \"-o\" ]; do shift; done; touch \"$2\"\n",
    )
    .unwrap();
    let mut perms = fs::metadata(&tool).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&tool, perms).unwrap();

    let source = tmp.path().join("app.rc");
    let output = tmp.path().join("app.res.o");
    fs::write(&source, "1 ICON \"app.ico\"").unwrap();

    let prefix = format!("{}/fake-", tmp.path().display());
    slipway()
        .args([
            "windres",
            &format!("{}={}", source.display(), output.display()),
            "--arch",
            "x86_64",
        ])
        .env("MINGW64_PREFIX", &prefix)
        .assert()
        .success();
    assert!(output.exists());
}

#[cfg(unix)]
#[test]
fn test_windres_reports_failing_pair() {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempfile::TempDir::new().unwrap();
    let tool = tmp.path().join("fake-windres");
    fs::write(&tool, "#!/bin/sh\necho 'bad resource' >&2\n").unwrap();
    let mut perms = fs::metadata(&tool).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&tool, perms).unwrap();

    let source = tmp.path().join("app.rc");
    fs::write(&source, "garbage").unwrap();
    let output = tmp.path().join("app.res.o");

    let prefix = format!("{}/fake-", tmp.path().display());
    slipway()
        .args([
            "windres",
            &format!("{}={}", source.display(), output.display()),
            "--arch",
            "x86_64",
        ])
        .env("MINGW64_PREFIX", &prefix)
        .assert()
        .failure()
        .stderr(predicate::str::contains("bad resource"));
    assert!(!output.exists());
}

// ============================================================================
// slipway doctor / completions
// ============================================================================

#[test]
fn test_doctor_reports_backend() {
    slipway()
        .args(["doctor"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default backend:"));
}

#[test]
fn test_completions_bash() {
    slipway()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("slipway"));
}
