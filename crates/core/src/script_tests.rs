// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::os::unix::fs::PermissionsExt;

#[yare::parameterized(
    plain_word = { "Echo", "echo" },
    spaces = { "Echo text", "echo_text" },
    spaces_and_punct = { "Echo text to file!", "echo_text_to_file_" },
    already_lower = { "echo_text", "echo_text" },
)]
fn normalise_cases(label: &str, expected: &str) {
    assert_eq!(normalise(label), expected);
}

#[test]
fn build_writes_expected_template() {
    let dir = tempfile::tempdir().unwrap();
    let cmd = CommandSpec::new("echo", ["hello", "there"]);
    let path = ScriptBuilder::build("EchoCmd", &cmd, dir.path()).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        contents,
        "#!/bin/bash\n\
         echo \"#### COMMAND EchoCmd\"\n\
         echo \"#### HOSTNAME $HOSTNAME\"\n\
         echo \"#### USER $USER\"\n\
         echo \"#### START $(date)\"\n\
         echo hello there\n\
         exit_code=$?\n\
         echo \"#### END $(date)\"\n\
         echo \"#### EXIT_CODE $exit_code\"\n\
         exit $exit_code"
    );
}

#[test]
fn build_marks_script_executable() {
    let dir = tempfile::tempdir().unwrap();
    let cmd = CommandSpec::new("true", Vec::<String>::new());
    let path = ScriptBuilder::build("True", &cmd, dir.path()).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o111, 0o111);
}

#[test]
fn build_avoids_collisions_for_same_label() {
    let dir = tempfile::tempdir().unwrap();
    let cmd = CommandSpec::new("echo", ["hi"]);
    let p1 = ScriptBuilder::build("Echo", &cmd, dir.path()).unwrap();
    let p2 = ScriptBuilder::build("Echo", &cmd, dir.path()).unwrap();
    assert_ne!(p1, p2);
    assert!(p1.exists());
    assert!(p2.exists());
}

#[test]
fn build_creates_scripts_dir_if_missing() {
    let dir = tempfile::tempdir().unwrap();
    let scripts_dir = dir.path().join("nested").join("scripts");
    let cmd = CommandSpec::new("true", Vec::<String>::new());
    let path = ScriptBuilder::build("True", &cmd, &scripts_dir).unwrap();
    assert!(path.exists());
}
