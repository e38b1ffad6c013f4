//! Merge per-translation-unit dumps into one snapshot's worth of source
//! files.
//!
//! Headers and templates are compiled into many translation units, so the
//! same `(file, line)` pair shows up in many dumps. Hit counts are summed;
//! the order in which dumps are added never changes the result.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::Result;
use crate::model::{DumpData, SourceFile};

/// Digest and physical line count of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub digest: String,
    pub line_count: usize,
}

impl SourceInfo {
    /// SHA-256 of the raw bytes; a trailing line without `\n` still counts.
    #[must_use]
    pub fn from_content(content: &[u8]) -> Self {
        let newlines = content.iter().filter(|&&b| b == b'\n').count();
        let line_count = match content.last() {
            Some(b'\n') | None => newlines,
            Some(_) => newlines + 1,
        };
        Self {
            digest: format!("{:x}", Sha256::digest(content)),
            line_count,
        }
    }
}

/// Reads the actual source behind a dump entry.
pub trait SourceProbe {
    /// `Ok(None)` when the file does not exist.
    fn probe(&self, path: &Path) -> Result<Option<SourceInfo>>;
}

/// Probe backed by the filesystem.
pub struct FsProbe;

impl SourceProbe for FsProbe {
    fn probe(&self, path: &Path) -> Result<Option<SourceInfo>> {
        match std::fs::read(path) {
            Ok(content) => Ok(Some(SourceInfo::from_content(&content))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// Directory prefixes (relative to the source root) whose files are kept.
#[derive(Debug, Clone, Default)]
pub struct RelevantDirs {
    dirs: Vec<String>,
}

impl RelevantDirs {
    pub fn new<I, S>(dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let dirs = dirs
            .into_iter()
            .map(|d| d.as_ref().replace('\\', "/").trim_matches('/').to_string())
            .filter(|d| !d.is_empty())
            .collect();
        Self { dirs }
    }

    /// Parse a `:`-separated list, e.g. `libs:app/src`.
    pub fn parse(list: &str) -> Self {
        Self::new(list.split(':'))
    }

    /// Segment-wise prefix match: `foo` matches `foo/x` but not `foobar/x`
    /// and not `foo` itself.
    #[must_use]
    pub fn matches(&self, relative: &str) -> bool {
        self.dirs.iter().any(|dir| {
            relative
                .strip_prefix(dir.as_str())
                .and_then(|rest| rest.strip_prefix('/'))
                .is_some_and(|rest| !rest.is_empty())
        })
    }
}

/// Path of `path` below `root`, `/`-separated, or `None` when it lies
/// outside (or is) the root.
#[must_use]
pub fn relative_to_root(root: &Path, path: &str) -> Option<String> {
    let rel = Path::new(path).strip_prefix(root).ok()?;
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Running per-file, per-line totals.
pub struct Accumulator {
    root: PathBuf,
    dirs: RelevantDirs,
    files: BTreeMap<String, BTreeMap<u32, u64>>,
}

impl Accumulator {
    pub fn new(root: impl Into<PathBuf>, dirs: RelevantDirs) -> Self {
        Self {
            root: root.into(),
            dirs,
            files: BTreeMap::new(),
        }
    }

    /// Fold one translation unit's dump into the totals.
    pub fn add(&mut self, dump: &DumpData) {
        for (path, records) in dump {
            let Some(name) = relative_to_root(&self.root, path) else {
                debug!(path = %path, "outside source root, skipping");
                continue;
            };
            if !self.dirs.matches(&name) {
                debug!(path = %name, "not in a relevant directory, skipping");
                continue;
            }
            for line in &records.lines {
                if line.line_number == 0 {
                    continue;
                }
                let hits = self
                    .files
                    .entry(name.clone())
                    .or_default()
                    .entry(line.line_number)
                    .or_insert(0);
                *hits = hits.saturating_add(line.hit_count);
            }
        }
    }

    /// Number of files with at least one line record so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Accumulated hits of a file, keyed by 1-based line number.
    pub fn hits(&self, name: &str) -> Option<&BTreeMap<u32, u64>> {
        self.files.get(name)
    }

    /// Resolve every accumulated file against its source and lay the totals
    /// out as per-line vectors, sorted by path. Files missing on disk are
    /// dropped.
    pub fn finish(self, probe: &dyn SourceProbe) -> Result<Vec<SourceFile>> {
        let mut out = Vec::with_capacity(self.files.len());
        for (name, lines) in self.files {
            let Some(info) = probe.probe(&self.root.join(&name))? else {
                debug!(path = %name, "source file missing, skipping");
                continue;
            };
            let highest = lines.keys().next_back().copied().unwrap_or(0) as usize;
            let mut coverage = vec![None; info.line_count.max(highest)];
            for (line, hits) in lines {
                coverage[line as usize - 1] = Some(hits);
            }
            out.push(SourceFile {
                name,
                source_digest: info.digest,
                coverage,
            });
        }
        Ok(out)
    }
}

/// Aggregate a batch of dumps in one go.
pub fn aggregate<'a, I>(
    root: &Path,
    dirs: RelevantDirs,
    dumps: I,
    probe: &dyn SourceProbe,
) -> Result<Vec<SourceFile>>
where
    I: IntoIterator<Item = &'a DumpData>,
{
    let mut acc = Accumulator::new(root, dirs);
    for dump in dumps {
        acc.add(dump);
    }
    acc.finish(probe)
}
