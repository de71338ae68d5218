//! A small `assert_cmd`-based harness for exercising the `deskarena`
//! binary end to end (manifest file + CLI args in, exit code/stdout out),
//! mirroring `agtrace-testing::TestWorld`'s shape without its
//! provider/session machinery, which has no deskarena analogue.

use assert_cmd::Command;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct CliWorld {
    temp_dir: TempDir,
}

impl CliWorld {
    pub fn new() -> Self {
        Self { temp_dir: TempDir::new().expect("create temp dir") }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&path, contents).expect("write fixture file");
        path
    }

    /// A `Command` for the `deskarena` binary under test, cwd'd into this
    /// world's temp directory.
    #[allow(deprecated)]
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("deskarena").expect("find deskarena binary");
        cmd.current_dir(self.temp_dir.path());
        cmd
    }
}

impl Default for CliWorld {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_creates_parent_directories() {
        let world = CliWorld::new();
        let path = world.write("nested/dir/file.json", "{}");
        assert!(path.is_file());
    }
}
