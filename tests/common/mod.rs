#![allow(dead_code)]

use std::path::Path;

use gcovrs::model::{DumpData, FileRecords, LineRecord};
use tempfile::TempDir;

/// Create a temporary source tree with the given `(relative path, content)`
/// files. The caller must hold onto `TempDir` to keep it alive.
pub fn source_tree(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
        let path = dir.path().join(name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }
    dir
}

/// A single-file dump with the given `(line, hits)` records.
pub fn dump(path: &Path, lines: &[(u32, u64)]) -> DumpData {
    let mut data = DumpData::new();
    data.insert(
        path.to_string_lossy().into_owned(),
        FileRecords {
            functions: vec![],
            lines: lines
                .iter()
                .map(|&(line_number, hit_count)| LineRecord {
                    line_number,
                    hit_count,
                    has_unexecuted_block: false,
                })
                .collect(),
        },
    );
    data
}

/// `n` lines of filler source.
pub fn lines(n: usize) -> String {
    (1..=n).map(|i| format!("line {i};\n")).collect()
}
