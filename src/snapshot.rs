//! Reading and writing snapshot JSON files.

use std::path::Path;

use tracing::warn;

use crate::error::Result;
use crate::model::Snapshot;

pub fn load(path: &Path) -> Result<Snapshot> {
    let content = std::fs::read(path)?;
    Ok(serde_json::from_slice(&content)?)
}

/// Load the snapshot of an earlier run. A missing or unreadable file means
/// there is nothing to compare against, so an empty snapshot is returned.
pub fn load_previous(path: &Path) -> Snapshot {
    match load(path) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(path = %path.display(), "ignoring previous snapshot: {e}");
            Snapshot::default()
        }
    }
}

pub fn save(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_vec(snapshot)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SourceFile;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/coveralls.json");
        let snapshot = Snapshot {
            service_name: "travis-ci".to_string(),
            source_files: vec![SourceFile {
                name: "a.c".to_string(),
                source_digest: "x".to_string(),
                coverage: vec![None, Some(2)],
            }],
            ..Snapshot::default()
        };
        save(&path, &snapshot).unwrap();
        assert_eq!(load(&path).unwrap(), snapshot);
    }

    #[test]
    fn test_load_previous_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert_eq!(load_previous(&missing), Snapshot::default());

        let corrupt = dir.path().join("corrupt.json");
        std::fs::write(&corrupt, "{ not json").unwrap();
        assert_eq!(load_previous(&corrupt), Snapshot::default());
        assert!(load(&corrupt).is_err());
    }
}
