//! Where the HTML listings get their source text from.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::git::Git;

/// A source for the text of a covered file.
pub trait ListingSource {
    /// Full contents of `name` (a snapshot path).
    fn load(&self, name: &str) -> Result<String>;
}

/// The file as committed at the snapshot's head.
pub struct CommittedSource {
    pub git: Git,
    pub commit: String,
}

impl ListingSource for CommittedSource {
    fn load(&self, name: &str) -> Result<String> {
        self.git.show(&self.commit, name)
    }
}

/// The file as it currently is in the working tree (`--dirty`).
pub struct WorkingTreeSource {
    pub root: PathBuf,
}

impl ListingSource for WorkingTreeSource {
    fn load(&self, name: &str) -> Result<String> {
        let path = self.root.join(name);
        let bytes =
            std::fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
