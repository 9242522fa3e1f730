#![allow(dead_code)]

use assert_cmd::Command;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const PARSER: &str = "\
* PROJ-001 Parser
:PROPERTIES:
:GOAL: Parse everything
:END:
** CHK-001-01 Lexer
:PROPERTIES:
:CRITERIA: all tokens
:VERIFY: unit tests
:END:
*** DONE ITEM-001 Lex numbers
CLOSED: [2024-03-08 Fri 10:00]
:PROPERTIES:
:ID: ITEM-001
:AGENT: @backend
:EFFORT: 2h
:PRIORITY: A
:TEST_PLAN: unit tests
:COMPONENT: lexer
:END:
*** TODO ITEM-002 Lex strings
:PROPERTIES:
:ID: ITEM-002
:AGENT: backend:api
:EFFORT: 45m
:PRIORITY: B
:DEPENDS: ITEM-003
:TEST_PLAN: unit tests
:COMPONENT: lexer
:ARTIFACT: [[file:../docs/design.org::#lexer]]
:END:
*** DOING ITEM-003 Lex comments
:PROPERTIES:
:ID: ITEM-003
:AGENT: qa
:EFFORT: 1h
:PRIORITY: C
:TEST_PLAN: unit tests
:COMPONENT: lexer
:END:
";

pub const DESIGN: &str = "\
* Lexer
:PROPERTIES:
:ID: lexer
:END:
See [[file:missing.org][the missing page]].
";

pub fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().expect("parent")).expect("create dir");
    fs::write(path, text).expect("write file");
}

pub fn backlog() -> TempDir {
    let temp = TempDir::new().expect("tempdir");
    let root = temp.path();
    write(root, "agents/README.org", "* Agent registry\n");
    write(root, "agents/backend.org", "* API\n* Storage\n");
    write(root, "agents/qa.org", "* Smoke tests\n");
    write(root, "projects/parser.org", PARSER);
    write(root, "docs/design.org", DESIGN);
    temp
}

#[allow(deprecated)]
pub fn backlog_cmd(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("backlog").expect("binary");
    cmd.arg("--root").arg(root).arg("--now").arg("2024-03-10");
    cmd
}

/// Run a subcommand with `--json`; returns (exit success, response)
pub fn run_json(root: &Path, args: &[&str]) -> (bool, Value) {
    let output = backlog_cmd(root)
        .args(args)
        .arg("--json")
        .output()
        .expect("command run");
    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    (output.status.success(), body)
}

/// Run a Command API request; returns (exit success, response)
pub fn run_request(root: &Path, request: &str) -> (bool, Value) {
    let output = backlog_cmd(root)
        .arg("command")
        .arg("--json")
        .arg(request)
        .output()
        .expect("command run");
    let body: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    (output.status.success(), body)
}
