//! File, directory and total statistics of a snapshot, optionally paired with
//! the same statistics from a previous snapshot.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::Snapshot;
use crate::stats::{Stats, StatsDelta};

/// Directory part of a `/`-separated path; `""` for top-level files.
#[must_use]
pub fn parent_dir(name: &str) -> &str {
    name.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Last component of a `/`-separated path.
#[must_use]
pub fn basename(name: &str) -> &str {
    name.rsplit_once('/').map_or(name, |(_, base)| base)
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub name: String,
    pub stats: Stats,
    pub previous: Option<Stats>,
    /// `None` for a file that only exists in the previous snapshot.
    pub digest: Option<String>,
    pub coverage: Vec<Option<u64>>,
}

impl FileReport {
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.digest.is_none()
    }

    #[must_use]
    pub fn basename(&self) -> &str {
        basename(&self.name)
    }

    #[must_use]
    pub fn delta(&self) -> StatsDelta {
        StatsDelta::between(&self.stats, self.previous.as_ref())
    }

    /// 1-based line a listing should open at: the first line that was hit,
    /// else the first executable line, else the top.
    #[must_use]
    pub fn anchor_line(&self) -> usize {
        let hit = self.coverage.iter().position(|c| matches!(c, Some(h) if *h > 0));
        let executable = || self.coverage.iter().position(Option::is_some);
        hit.or_else(executable).map_or(1, |idx| idx + 1)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectoryReport {
    pub name: String,
    pub stats: Stats,
    pub previous: Option<Stats>,
    pub files: BTreeSet<String>,
}

impl DirectoryReport {
    #[must_use]
    pub fn delta(&self) -> StatsDelta {
        StatsDelta::between(&self.stats, self.previous.as_ref())
    }
}

/// Everything the renderers need, keyed and ordered by path.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rollup {
    pub total: Stats,
    pub previous: Option<Stats>,
    pub files: BTreeMap<String, FileReport>,
    pub dirs: BTreeMap<String, DirectoryReport>,
}

impl Rollup {
    /// Roll up `current`; with `previous`, every file, directory and the
    /// total also carry the previous side so the reports can show deltas.
    pub fn build(current: &Snapshot, previous: Option<&Snapshot>) -> Self {
        let diffed = previous.is_some();
        let mut files: BTreeMap<String, FileReport> = BTreeMap::new();

        for file in &current.source_files {
            files.insert(
                file.name.clone(),
                FileReport {
                    name: file.name.clone(),
                    stats: Stats::from_coverage(&file.coverage),
                    previous: diffed.then(Stats::default),
                    digest: Some(file.source_digest.clone()),
                    coverage: file.coverage.clone(),
                },
            );
        }

        for file in previous.into_iter().flat_map(|p| p.source_files.iter()) {
            let report = files
                .entry(file.name.clone())
                .or_insert_with(|| FileReport {
                    name: file.name.clone(),
                    stats: Stats::default(),
                    previous: None,
                    digest: None,
                    coverage: Vec::new(),
                });
            report.previous = Some(Stats::from_coverage(&file.coverage));
        }

        let mut rollup = Rollup {
            previous: diffed.then(Stats::default),
            ..Rollup::default()
        };
        for report in files.values() {
            let dir_name = parent_dir(&report.name);
            let dir = rollup
                .dirs
                .entry(dir_name.to_string())
                .or_insert_with(|| DirectoryReport {
                    name: dir_name.to_string(),
                    previous: diffed.then(Stats::default),
                    ..DirectoryReport::default()
                });
            dir.stats += report.stats;
            dir.files.insert(report.name.clone());
            rollup.total += report.stats;

            if let Some(prev) = report.previous {
                if let Some(dir_prev) = dir.previous.as_mut() {
                    *dir_prev += prev;
                }
                if let Some(total_prev) = rollup.previous.as_mut() {
                    *total_prev += prev;
                }
            }
        }
        rollup.files = files;
        rollup
    }

    #[must_use]
    pub fn delta(&self) -> StatsDelta {
        StatsDelta::between(&self.total, self.previous.as_ref())
    }

    /// Member files of a directory, in path order.
    pub fn files_in<'a>(&'a self, dir: &'a DirectoryReport) -> impl Iterator<Item = &'a FileReport> {
        dir.files.iter().filter_map(|name| self.files.get(name))
    }
}
