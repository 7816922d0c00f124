// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    plain_word = { "Echo", "echo" },
    spaces = { "Echo text", "echo_text" },
    spaces_and_punct = { "Echo text to file!", "echo_text_to_file!" },
)]
fn wrapper_name_normalises_label(label: &str, expected: &str) {
    let wrapper = PipelineCommandWrapper::new(label, ["echo", "hi"]);
    assert_eq!(wrapper.name(), expected);
}

#[test]
fn wrapper_cmd_reflects_tokens() {
    let wrapper = PipelineCommandWrapper::new("Echo text", ["echo", "item1"]);
    let cmd = wrapper.cmd();
    assert_eq!(cmd.program(), "echo");
    assert_eq!(cmd.args(), ["item1"]);
}

#[test]
fn add_args_appends_tokens() {
    let mut wrapper = PipelineCommandWrapper::new("Echo", ["echo"]);
    wrapper.add_args(["a", "b"]);
    assert_eq!(wrapper.cmd().argv(), vec!["echo", "a", "b"]);
}

#[test]
fn make_wrapper_script_writes_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let wrapper = PipelineCommandWrapper::new("Echo text", ["echo", "Hello!"]);
    let script = wrapper.make_wrapper_script(dir.path()).unwrap();
    let contents = std::fs::read_to_string(&script).unwrap();
    assert!(contents.contains("#### COMMAND Echo text"));
    assert!(contents.contains("echo Hello!"));
}
