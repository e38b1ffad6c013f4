//! In-memory representation of coverage data. Parsers produce `DumpData`
//! for one translation unit; the aggregator folds many of those into a
//! `Snapshot`, which is what gets persisted as JSON and fed to the reports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A function reported by the dump tool. Carried through from the parse,
/// but not used by aggregation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRecord {
    pub start_line: u32,
    pub end_line: u32,
    pub invocation_count: u64,
    pub name: String,
}

/// One line as seen by one translation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord {
    pub line_number: u32,
    pub hit_count: u64,
    pub has_unexecuted_block: bool,
}

/// Records for a single source file within one dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileRecords {
    pub functions: Vec<FunctionRecord>,
    pub lines: Vec<LineRecord>,
}

/// The complete result of parsing one dump: source path (as reported by the
/// tool) to its records.
pub type DumpData = BTreeMap<String, FileRecords>;

/// Head commit of the repository at the time of the run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitHead {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub author_name: String,
    #[serde(default)]
    pub author_email: String,
    #[serde(default)]
    pub committer_name: String,
    #[serde(default)]
    pub committer_email: String,
    #[serde(default)]
    pub message: String,
}

impl GitHead {
    #[must_use]
    pub fn author(&self) -> String {
        format!("{} <{}>", self.author_name, self.author_email)
    }

    #[must_use]
    pub fn committer(&self) -> String {
        format!("{} <{}>", self.committer_name, self.committer_email)
    }

    /// Split the message into its subject line and the (possibly empty) body.
    #[must_use]
    pub fn subject_and_body(&self) -> (&str, &str) {
        match self.message.split_once("\n\n") {
            Some((subject, body)) => (subject, body),
            None => (self.message.as_str(), ""),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitInfo {
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub head: GitHead,
    #[serde(default)]
    pub remotes: Vec<serde_json::Value>,
}

/// Coverage of one source file: one entry per physical line, `None` for
/// lines that were never instrumented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    /// Path relative to the source root, `/`-separated.
    pub name: String,
    pub source_digest: String,
    pub coverage: Vec<Option<u64>>,
}

/// One build's coverage across all translation units.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub service_name: String,
    #[serde(default)]
    pub service_job_id: String,
    #[serde(default)]
    pub repo_token: String,
    #[serde(default)]
    pub git: GitInfo,
    #[serde(default)]
    pub source_files: Vec<SourceFile>,
}
