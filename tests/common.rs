#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Sandbox holding the config directory and any files a test creates.
pub struct Sandbox {
    pub dir: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Sandbox {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// `datebook` command with HOME and the config dir pointed into the sandbox.
    pub fn datebook(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("datebook");
        cmd.env("HOME", self.dir.path())
            .env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env_remove("RUST_LOG");
        cmd
    }

    /// Append an appointment to `db` via the CLI.
    pub fn add(&self, db: &Path, start: &str, end: Option<&str>, description: &str) {
        let mut cmd = self.datebook();
        cmd.args(["new", "--start", start, "--description", description, "--db"])
            .arg(db);
        if let Some(end) = end {
            cmd.args(["--end", end]);
        }
        cmd.assert().success();
    }
}
