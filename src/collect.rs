//! Build-tree side of the pipeline: find the compiler's notes files, run the
//! dump tool over them and fold the resulting dumps into a snapshot.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result};
use rayon::prelude::*;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::aggregate::{Accumulator, RelevantDirs, SourceProbe};
use crate::error::GcovError;
use crate::git::Git;
use crate::model::{Snapshot, SourceFile};
use crate::parsers::gcov::GcovParser;
use crate::parsers::Parser;

/// Extension of the per-object notes files written at compile time.
pub const NOTES_EXTENSION: &str = "gcno";
/// Extension of the dumps written by the dump tool.
pub const DUMP_EXTENSION: &str = "gcov";

/// Everything `collect` needs to know.
#[derive(Debug, Clone)]
pub struct CollectOptions {
    pub git: PathBuf,
    pub gcov: PathBuf,
    pub src_dir: PathBuf,
    pub bin_dir: PathBuf,
    pub int_dir: PathBuf,
    pub dirs: RelevantDirs,
}

/// CI service fields of the snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceInfo {
    pub service_name: String,
    pub service_job_id: String,
    pub repo_token: String,
}

impl ServiceInfo {
    /// Read `TRAVIS_JOB_ID` and `COVERALLS_REPO_TOKEN`.
    pub fn from_env() -> Self {
        Self::new(
            std::env::var("TRAVIS_JOB_ID").ok(),
            std::env::var("COVERALLS_REPO_TOKEN").ok(),
        )
    }

    pub fn new(job_id: Option<String>, repo_token: Option<String>) -> Self {
        let service_job_id = job_id.unwrap_or_default();
        let service_name = if service_job_id.is_empty() {
            String::new()
        } else {
            "travis-ci".to_string()
        };
        Self {
            service_name,
            service_job_id,
            repo_token: repo_token.unwrap_or_default(),
        }
    }
}

/// `path` made absolute against the current directory, with `.` and `..`
/// resolved lexically. Symlinks are left alone since the dump tool reports
/// paths as the compiler saw them.
pub fn absolute(path: &Path) -> Result<PathBuf> {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .context("Failed to read current directory")?
            .join(path)
    };
    Ok(normalize(&joined))
}

/// Drop `.` components and let each `..` remove the component before it.
/// `..` above the root stays at the root.
#[must_use]
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

fn files_with_extension(root: &Path, ext: &str) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", root.display()))?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some(ext)
        {
            found.push(entry.into_path());
        }
    }
    Ok(found)
}

/// Notes files below `bin_dir`, grouped by the directory holding them.
pub fn find_notes(bin_dir: &Path) -> Result<BTreeMap<PathBuf, Vec<PathBuf>>> {
    let mut groups: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for path in files_with_extension(bin_dir, NOTES_EXTENSION)? {
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        groups.entry(dir).or_default().push(path);
    }
    Ok(groups)
}

/// Name of the intermediate directory for one object directory: its path
/// below `bin_dir` with separators turned into `#`.
#[must_use]
pub fn intermediate_dir_name(bin_dir: &Path, object_dir: &Path) -> String {
    let rel = object_dir.strip_prefix(bin_dir).unwrap_or(object_dir);
    let parts: Vec<_> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("#")
    }
}

/// Run the dump tool over one object directory's notes, writing its output
/// into `work_dir`.
pub fn run_dump_tool(
    gcov: &Path,
    object_dir: &Path,
    notes: &[PathBuf],
    work_dir: &Path,
) -> crate::error::Result<()> {
    let output = Command::new(gcov)
        .args(["-l", "-i", "-p", "-o"])
        .arg(object_dir)
        .args(notes)
        .current_dir(work_dir)
        .output()?;

    if !output.status.success() {
        return Err(GcovError::Tool {
            tool: gcov.display().to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }
    Ok(())
}

/// Produce dumps for every object directory below `bin_dir`. Each directory
/// gets its own intermediate directory, so the runs are independent and go
/// in parallel.
pub fn generate_dumps(gcov: &Path, bin_dir: &Path, int_dir: &Path) -> Result<usize> {
    let groups = find_notes(bin_dir)?;
    info!(directories = groups.len(), "running {}", gcov.display());

    groups.par_iter().try_for_each(|(object_dir, notes)| -> Result<()> {
        let work_dir = int_dir.join(intermediate_dir_name(bin_dir, object_dir));
        std::fs::create_dir_all(&work_dir)
            .with_context(|| format!("Failed to create {}", work_dir.display()))?;
        debug!(dir = %object_dir.display(), notes = notes.len(), "dumping");
        run_dump_tool(gcov, object_dir, notes, &work_dir)?;
        Ok(())
    })?;

    Ok(groups.len())
}

/// Parse every dump below `int_dir` and fold them into per-file coverage.
pub fn read_dumps(
    int_dir: &Path,
    src_dir: &Path,
    dirs: RelevantDirs,
    probe: &dyn SourceProbe,
) -> Result<Vec<SourceFile>> {
    let mut acc = Accumulator::new(src_dir, dirs);
    let dumps = if int_dir.exists() {
        files_with_extension(int_dir, DUMP_EXTENSION)?
    } else {
        Vec::new()
    };
    for path in &dumps {
        let content =
            std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
        let data = GcovParser
            .parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        acc.add(&data);
    }
    info!(dumps = dumps.len(), files = acc.len(), "dumps aggregated");
    Ok(acc.finish(probe)?)
}

/// The whole collection run: dumps, aggregation, git and service metadata.
pub fn collect(
    opts: &CollectOptions,
    service: ServiceInfo,
    probe: &dyn SourceProbe,
) -> Result<Snapshot> {
    let src_dir = absolute(&opts.src_dir)?;
    let bin_dir = absolute(&opts.bin_dir)?;
    let int_dir = absolute(&opts.int_dir)?;

    let git = Git::new(&opts.git, &src_dir).info();

    generate_dumps(&opts.gcov, &bin_dir, &int_dir)?;
    let source_files = read_dumps(&int_dir, &src_dir, opts.dirs.clone(), probe)?;

    Ok(Snapshot {
        service_name: service.service_name,
        service_job_id: service.service_job_id,
        repo_token: service.repo_token,
        git,
        source_files,
    })
}
