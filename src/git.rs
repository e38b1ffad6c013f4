//! Thin wrapper around the `git` binary.
//!
//! Every command runs with an explicit working directory; the process-wide
//! current directory is never touched.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::warn;

use crate::model::{GitHead, GitInfo};

pub struct Git {
    binary: PathBuf,
    dir: PathBuf,
}

impl Git {
    /// Run `binary` inside `dir`.
    pub fn new(binary: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            dir: dir.into(),
        }
    }

    fn output(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.binary)
            .args(args)
            .current_dir(&self.dir)
            .output()
            .with_context(|| format!("Failed to run {}", self.binary.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("git {} failed: {stderr}", args.join(" "));
        }

        String::from_utf8(output.stdout).context("git output not valid UTF-8")
    }

    /// Output with surrounding whitespace removed; an empty string (and a
    /// warning) when git fails.
    fn output_or_empty(&self, args: &[&str]) -> String {
        match self.output(args) {
            Ok(out) => out.trim().to_string(),
            Err(e) => {
                warn!("{e:#}");
                String::new()
            }
        }
    }

    fn log_format(&self, placeholder: &str) -> String {
        let pretty = format!("--pretty=format:%{placeholder}");
        self.output_or_empty(&["log", "-1", pretty.as_str()])
    }

    /// Branch and head commit metadata. Missing pieces are left empty.
    pub fn info(&self) -> GitInfo {
        GitInfo {
            branch: self.output_or_empty(&["rev-parse", "--abbrev-ref", "HEAD"]),
            head: GitHead {
                id: self.log_format("H"),
                author_name: self.log_format("an"),
                author_email: self.log_format("ae"),
                committer_name: self.log_format("cn"),
                committer_email: self.log_format("ce"),
                message: self.log_format("B"),
            },
            remotes: Vec::new(),
        }
    }

    /// Root of the working tree containing the git directory.
    pub fn toplevel(&self) -> Result<PathBuf> {
        let out = self.output(&["rev-parse", "--show-toplevel"])?;
        Ok(PathBuf::from(out.trim()))
    }

    /// Contents of `path` (relative to the repository root) at `commit`.
    pub fn show(&self, commit: &str, path: &str) -> Result<String> {
        let spec = format!("{commit}:{path}");
        self.output(&["show", spec.as_str()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_yields_empty_info() {
        let dir = tempfile::tempdir().unwrap();
        let git = Git::new("/nonexistent/git-binary", dir.path());
        let info = git.info();
        assert_eq!(info, GitInfo::default());
        assert!(git.toplevel().is_err());
    }
}
