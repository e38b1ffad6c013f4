//! Command handler functions for the gcovrs CLI.
//!
//! Each `cmd_*` function returns its output as a `String`, making them easy
//! to test without capturing stdout.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::aggregate::FsProbe;
use crate::collect::{self, CollectOptions, ServiceInfo};
use crate::git::Git;
use crate::html;
use crate::report::{CoverageReport, TextFormatter};
use crate::snapshot;
use crate::source::{CommittedSource, ListingSource, WorkingTreeSource};

/// Options of the `report` command.
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub input: PathBuf,
    pub previous: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub dirty: bool,
    pub git: PathBuf,
}

/// Gather coverage from the build tree and write the snapshot JSON.
pub fn cmd_collect(opts: &CollectOptions, out: &Path) -> Result<String> {
    let snapshot = collect::collect(opts, ServiceInfo::from_env(), &FsProbe)?;
    if !snapshot.service_job_id.is_empty() {
        info!(job = %snapshot.service_job_id, "preparing Coveralls data for Travis-CI job");
    }
    snapshot::save(out, &snapshot)
        .with_context(|| format!("Failed to write {}", out.display()))?;
    Ok(format!(
        "Wrote coverage of {} files to {}\n",
        snapshot.source_files.len(),
        out.display()
    ))
}

/// Render the text report, and the HTML tree when an output directory is
/// given.
pub fn cmd_report(opts: &ReportOptions) -> Result<String> {
    let current = snapshot::load(&opts.input)
        .with_context(|| format!("Failed to read {}", opts.input.display()))?;
    let previous = opts.previous.as_deref().map(snapshot::load_previous);

    let report = CoverageReport::new(&current, previous.as_ref());
    let text = report.format(&TextFormatter);

    if let Some(out_dir) = &opts.out {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let root = Git::new(&opts.git, cwd).toplevel()?;
        let source: Box<dyn ListingSource> = if opts.dirty {
            Box::new(WorkingTreeSource { root })
        } else {
            Box::new(CommittedSource {
                git: Git::new(&opts.git, root),
                commit: current.git.head.id.clone(),
            })
        };
        html::write_report(out_dir, &report, source.as_ref())?;
    }

    Ok(text)
}
