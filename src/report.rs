//! Report model shared by the output formats, and the plain-text format.

use std::fmt::Write;

use crate::model::{GitInfo, Snapshot};
use crate::rollup::Rollup;
use crate::stats::{format_average, format_percent, Delta, StatsDelta};

/// Label used for files at the top of the source tree.
pub const ROOT_DIR_LABEL: &str = ".";

/// A rolled-up snapshot plus the commit it was taken at, ready to be
/// formatted.
#[derive(Debug, Clone)]
pub struct CoverageReport {
    pub git: GitInfo,
    pub rollup: Rollup,
}

impl CoverageReport {
    pub fn new(current: &Snapshot, previous: Option<&Snapshot>) -> Self {
        Self {
            git: current.git.clone(),
            rollup: Rollup::build(current, previous),
        }
    }

    /// Format using a specific formatter.
    #[must_use]
    pub fn format(&self, formatter: &dyn ReportFormatter) -> String {
        formatter.format(self)
    }
}

/// Trait for formatting coverage reports.
pub trait ReportFormatter {
    /// Format the report to a string.
    fn format(&self, report: &CoverageReport) -> String;
}

/// Display name of a directory key.
#[must_use]
pub fn dir_label(name: &str) -> &str {
    if name.is_empty() {
        ROOT_DIR_LABEL
    } else {
        name
    }
}

/// Plain text formatter.
pub struct TextFormatter;

impl ReportFormatter for TextFormatter {
    fn format(&self, report: &CoverageReport) -> String {
        let mut out = String::new();
        write_git_header(&mut out, &report.git);

        writeln!(
            out,
            "COVERAGE             TOTAL           RELEVANT            COVERED            HITS/LINE             NAME"
        )
        .unwrap();

        let rollup = &report.rollup;
        writeln!(out, " {} TOTAL", stats_columns(&rollup.delta())).unwrap();
        out.push('\n');

        for (name, dir) in &rollup.dirs {
            writeln!(out, " {} {}", stats_columns(&dir.delta()), dir_label(name)).unwrap();
            for file in rollup.files_in(dir) {
                writeln!(
                    out,
                    " {}     {}",
                    stats_columns(&file.delta()),
                    file.basename()
                )
                .unwrap();
            }
            out.push('\n');
        }

        out
    }
}

fn write_git_header(out: &mut String, git: &GitInfo) {
    let head = &git.head;
    let author = head.author();
    let committer = head.committer();

    writeln!(out, "branch: {}", git.branch).unwrap();
    writeln!(out, "commit: {}", head.id).unwrap();
    writeln!(out, "author: {author}").unwrap();
    if author != committer {
        writeln!(out, "committer: {committer}").unwrap();
    }
    out.push('\n');
    for line in head.message.trim_end().lines() {
        writeln!(out, "    {line}").unwrap();
    }
    out.push('\n');
}

/// The five value columns of a summary line.
#[must_use]
pub fn stats_columns(delta: &StatsDelta) -> String {
    [
        column(&delta.coverage, format_percent, 7),
        column(&delta.total, |v: u64| v.to_string(), 8),
        column(&delta.relevant, |v: u64| v.to_string(), 8),
        column(&delta.covered, |v: u64| v.to_string(), 8),
        column(&delta.average, format_average, 10),
    ]
    .join(" ")
}

/// `value`, sign and magnitude; sign and magnitude are blank when unchanged.
fn column<T, F>(delta: &Delta<T>, conv: F, width: usize) -> String
where
    T: Copy,
    F: Fn(T) -> String,
{
    let sign = delta.trend.sign();
    let magnitude = if sign.is_empty() {
        String::new()
    } else {
        conv(delta.magnitude)
    };
    format!(
        "{:>width$}{:>2}{:<width$}",
        conv(delta.current),
        sign,
        magnitude,
        width = width
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GitHead, SourceFile};
    use crate::stats::Stats;

    fn snapshot(files: &[(&str, Vec<Option<u64>>)]) -> Snapshot {
        Snapshot {
            git: GitInfo {
                branch: "main".to_string(),
                head: GitHead {
                    id: "0123abcd".to_string(),
                    author_name: "Ann".to_string(),
                    author_email: "ann@example.com".to_string(),
                    committer_name: "Ann".to_string(),
                    committer_email: "ann@example.com".to_string(),
                    message: "Add parser\n\nWith tests.\n".to_string(),
                },
                remotes: vec![],
            },
            source_files: files
                .iter()
                .map(|(name, coverage)| SourceFile {
                    name: name.to_string(),
                    source_digest: "d".to_string(),
                    coverage: coverage.clone(),
                })
                .collect(),
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_column_without_previous() {
        let delta = StatsDelta::between(
            &Stats {
                total_lines: 10,
                relevant_lines: 4,
                covered_lines: 3,
                total_hits: 9,
            },
            None,
        );
        let expected = [
            format!("{:>7}{:>2}{:<7}", "75.00%", "", ""),
            format!("{:>8}{:>2}{:<8}", "10", "", ""),
            format!("{:>8}{:>2}{:<8}", "4", "", ""),
            format!("{:>8}{:>2}{:<8}", "3", "", ""),
            format!("{:>10}{:>2}{:<10}", "2.25", "", ""),
        ]
        .join(" ");
        assert_eq!(stats_columns(&delta), expected);
    }

    #[test]
    fn test_column_signs() {
        let up = column(&Delta::between(80.0, Some(70.0)), format_percent, 7);
        assert_eq!(up, " 80.00% +10.00% ");
        let down = column(&Delta::between(60.0, Some(75.0)), format_percent, 7);
        assert_eq!(down, " 60.00% -15.00% ");
        let same = column(&Delta::between(3u64, Some(3)), |v: u64| v.to_string(), 8);
        assert_eq!(same, format!("{:>8}{:>2}{:<8}", "3", "", ""));
    }

    #[test]
    fn test_text_layout_is_sorted() {
        let current = snapshot(&[
            ("src/b.cpp", vec![Some(1)]),
            ("src/a.cpp", vec![Some(0), None]),
            ("include/x.hpp", vec![Some(2)]),
            ("top.cpp", vec![None]),
        ]);
        let text = CoverageReport::new(&current, None).format(&TextFormatter);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "branch: main");
        assert_eq!(lines[1], "commit: 0123abcd");
        assert_eq!(lines[2], "author: Ann <ann@example.com>");
        assert!(!text.contains("committer:"));
        assert_eq!(lines[4], "    Add parser");
        assert_eq!(lines[6], "    With tests.");
        assert!(lines[8].starts_with("COVERAGE"));
        assert!(lines[9].ends_with(" TOTAL"));

        let names: Vec<&str> = lines[10..]
            .iter()
            .filter(|l| !l.is_empty())
            .map(|l| l.split_whitespace().last().unwrap())
            .collect();
        assert_eq!(
            names,
            vec![".", "top.cpp", "include", "x.hpp", "src", "a.cpp", "b.cpp"]
        );
        assert!(!text.contains('+'));
    }

    #[test]
    fn test_text_shows_committer_when_different() {
        let mut current = snapshot(&[]);
        current.git.head.committer_name = "Bot".to_string();
        let text = CoverageReport::new(&current, None).format(&TextFormatter);
        assert!(text.contains("committer: Bot <ann@example.com>"));
    }

    #[test]
    fn test_text_diff_against_previous() {
        let current = snapshot(&[("src/a.cpp", vec![Some(1), Some(1), Some(1), Some(0)])]);
        let previous = snapshot(&[
            ("src/a.cpp", vec![Some(1), Some(0), Some(0), Some(0)]),
            ("src/gone.cpp", vec![Some(4)]),
        ]);
        let text = CoverageReport::new(&current, Some(&previous)).format(&TextFormatter);

        let file_line = text
            .lines()
            .find(|l| l.ends_with("     a.cpp"))
            .unwrap();
        assert!(file_line.starts_with(&format!(" {:>7}{:>2}{:<7}", "75.00%", "+", "50.00%")));

        let gone = text.lines().find(|l| l.ends_with("gone.cpp")).unwrap();
        assert!(gone.starts_with(&format!(" {:>7}{:>2}{:<7}", "0.00%", "-", "100.00%")));
    }
}
