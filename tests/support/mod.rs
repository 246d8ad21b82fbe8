#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::TempDir;

/// Throwaway data directory for one test.
pub struct TestData {
    dir: TempDir,
}

impl TestData {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn snapshot_file(&self) -> PathBuf {
        self.dir.path().join("tasks.json")
    }

    pub fn write_config(&self, contents: &str) -> PathBuf {
        let path = self.dir.path().join("taskheap.toml");
        fs::write(&path, contents).expect("write config");
        path
    }

    pub fn write_snapshot(&self, contents: &str) {
        fs::write(self.snapshot_file(), contents).expect("write snapshot");
    }

    pub fn read_snapshot(&self) -> serde_json::Value {
        let raw = fs::read_to_string(self.snapshot_file()).expect("read snapshot");
        serde_json::from_str(&raw).expect("parse snapshot")
    }

    /// `taskheap` pointed at this data directory, with logging off.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("taskheap").expect("binary");
        cmd.env("TASKHEAP_DIR", self.dir.path());
        cmd.env_remove("RUST_LOG");
        cmd
    }

    pub fn add(&self, name: &str, priority: i64, due: &str, deps: &[&str]) {
        let priority = priority.to_string();
        let mut cmd = self.cmd();
        cmd.args(["add", name, "--priority", priority.as_str(), "--due", due]);
        for dep in deps {
            cmd.args(["--dep", *dep]);
        }
        cmd.assert().success();
    }

    /// Run with `--json` and parse the envelope printed on stdout.
    pub fn json(&self, args: &[&str]) -> serde_json::Value {
        let output = self
            .cmd()
            .arg("--json")
            .args(args)
            .output()
            .expect("run taskheap");
        serde_json::from_slice(&output.stdout).expect("json envelope")
    }
}
