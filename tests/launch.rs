#![cfg(unix)]

use assert_fs::prelude::*;
use assert_fs::TempDir;
use elastix_cli::cli::parse_from;
use elastix_cli::launch;
use elastix_cli::launcher::ExitOutcome;
use elastix_cli::schema::ModuleSchema;
use insta::assert_snapshot;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;
use std::str::FromStr;

/// Writes an executable shell script standing in for elastix.
fn fake_elastix(dir: &TempDir, body: &str) -> PathBuf {
    let script = dir.child("elastix");
    script
        .write_str(&format!("#!/bin/sh\n{body}\n"))
        .unwrap();
    fs::set_permissions(script.path(), fs::Permissions::from_mode(0o755)).unwrap();
    script.path().to_path_buf()
}

/// A stand-in that records each argument it receives on its own line.
fn recording_elastix(dir: &TempDir) -> (PathBuf, PathBuf) {
    let record = dir.child("argv.txt").path().to_path_buf();
    let script = fake_elastix(
        dir,
        &format!(r#"printf '[%s]\n' "$@" > '{}'"#, record.display()),
    );
    (script, record)
}

#[test]
fn forwards_set_parameters_in_schema_order() {
    let dir = TempDir::new().unwrap();
    let (elastix, record) = recording_elastix(&dir);
    let schema = ModuleSchema::bundled().unwrap();

    let arguments = parse_from(
        &schema,
        [
            "elastix-cli",
            "--out",
            "/tmp/result",
            "--threads",
            "4",
            "-m",
            "moving.nii",
            "-f",
            "my fixed image.nii",
        ],
    )
    .unwrap();

    let outcome = launch(&elastix, &arguments).unwrap();
    assert!(outcome.success());

    let recorded = fs::read_to_string(record).unwrap();
    assert_snapshot!(recorded.trim_end_matches('\n'), @r###"
    [-f my fixed image.nii]
    [-m moving.nii]
    [-threads 4]
    [-out /tmp/result]
    "###);
}

#[test]
fn booleans_become_bare_flags_and_false_ones_vanish() {
    let dir = TempDir::new().unwrap();
    let (elastix, record) = recording_elastix(&dir);
    let schema = ModuleSchema::from_str(
        "<executable><parameters>\
         <image><name>f</name><flag>f</flag></image>\
         <boolean><name>verbose</name><longflag>verbose</longflag></boolean>\
         <boolean><name>debug</name><longflag>debug</longflag><default>false</default></boolean>\
         <double><name>threshold</name><longflag>threshold</longflag></double>\
         </parameters></executable>",
    )
    .unwrap();

    let arguments =
        parse_from(&schema, ["elastix-cli", "-f", "image.nii", "--verbose"]).unwrap();
    launch(&elastix, &arguments).unwrap();

    let recorded = fs::read_to_string(record).unwrap();
    assert_snapshot!(recorded.trim_end_matches('\n'), @r###"
    [-f image.nii]
    [-verbose]
    "###);
}

#[test]
fn positional_values_follow_declared_indices() {
    let dir = TempDir::new().unwrap();
    let (elastix, record) = recording_elastix(&dir);
    let schema = ModuleSchema::from_str(
        "<executable><parameters>\
         <directory><name>out</name><index>1</index></directory>\
         <image><name>input</name><index>0</index></image>\
         </parameters></executable>",
    )
    .unwrap();

    let arguments = parse_from(&schema, ["elastix-cli", "in.nii", "/tmp/out"]).unwrap();
    launch(&elastix, &arguments).unwrap();

    let recorded = fs::read_to_string(record).unwrap();
    assert_snapshot!(recorded.trim_end_matches('\n'), @r###"
    [-out /tmp/out]
    [-input in.nii]
    "###);
}

#[test]
fn propagates_child_exit_status() {
    let dir = TempDir::new().unwrap();
    let elastix = fake_elastix(&dir, "exit 2");
    let schema = ModuleSchema::bundled().unwrap();

    let arguments = parse_from(&schema, ["elastix-cli", "-f", "fixed.nii"]).unwrap();
    let outcome = launch(&elastix, &arguments).unwrap();
    assert_eq!(outcome, ExitOutcome::Exited(2));
    assert_eq!(outcome.exit_code(), 2);
}

#[test]
fn signal_termination_maps_to_128_plus_signal() {
    let dir = TempDir::new().unwrap();
    let elastix = fake_elastix(&dir, "kill -TERM $$");
    let schema = ModuleSchema::bundled().unwrap();

    let arguments = parse_from(&schema, ["elastix-cli", "-f", "fixed.nii"]).unwrap();
    let outcome = launch(&elastix, &arguments).unwrap();
    assert_eq!(outcome, ExitOutcome::Signaled(15));
    assert_eq!(outcome.exit_code(), 143);
}

#[test]
fn runs_with_no_parameters_at_all() {
    let dir = TempDir::new().unwrap();
    let record = dir.child("argc.txt").path().to_path_buf();
    let elastix = fake_elastix(&dir, &format!(r#"echo "argc=$#" > '{}'"#, record.display()));
    let schema = ModuleSchema::bundled().unwrap();

    let arguments = parse_from(&schema, ["elastix-cli"]).unwrap();
    assert!(launch(&elastix, &arguments).unwrap().success());

    let recorded = fs::read_to_string(record).unwrap();
    assert_snapshot!(recorded.trim_end_matches('\n'), @"argc=0");
}

#[test]
fn unlaunchable_executable_names_its_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.child("bin/elastix").path().to_path_buf();
    let schema = ModuleSchema::bundled().unwrap();

    let arguments = parse_from(&schema, ["elastix-cli", "-f", "fixed.nii"]).unwrap();
    let err = launch(&missing, &arguments).unwrap_err();
    assert!(err.to_string().contains(&missing.display().to_string()));
}
