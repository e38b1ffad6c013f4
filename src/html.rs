//! HTML report: an `index.html` summary table plus one annotated listing per
//! covered file, named after the file's digest.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use md5::{Digest, Md5};
use tracing::{debug, info};

use crate::report::{dir_label, CoverageReport, ReportFormatter};
use crate::rollup::FileReport;
use crate::source::ListingSource;
use crate::stats::{format_average, format_percent, Delta, Stats, StatsDelta};

const INDICATOR: &str =
    r#"<span class="ind"><span class="ind-up"></span><span class="ind-down"></span></span>"#;

/// Escape text for use in HTML bodies and attribute values.
#[must_use]
pub fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// File name of the listing page for a digest.
#[must_use]
pub fn listing_file_name(digest: &str) -> String {
    format!("{digest}.html")
}

/// `index.html` formatter.
pub struct HtmlFormatter;

impl ReportFormatter for HtmlFormatter {
    fn format(&self, report: &CoverageReport) -> String {
        let mut out = String::new();
        writeln!(
            out,
            "<html>\n<head>\n<title>Coverage</title>\n<style type=\"text/css\">\n{CSS}\n</style>\n</head>\n<body>\n<div class=\"content\">\n<h1>Coverage</h1>\n"
        )
        .unwrap();
        write_commit_table(&mut out, report);

        out.push_str("<table class=\"stats\">\n<thead><tr><th>Name</th>");
        for title in ["Coverage", "Total", "Relevant", "Covered", "Missed", "Hits/Line"] {
            write!(out, "<th>{title}</th><th>&nbsp;</th>").unwrap();
        }
        out.push_str("</tr></thead>\n");

        let rollup = &report.rollup;
        writeln!(
            out,
            "<tr class=\"total\"><td class=\"name\">(Total)</td>{}</tr>",
            stats_cells(&rollup.total, &rollup.delta())
        )
        .unwrap();

        for (name, dir) in &rollup.dirs {
            writeln!(
                out,
                "<tr class=\"filler\"><td colspan=\"13\">&nbsp;</td></tr>\n<tr class=\"dir\"><td class=\"name\">{}</td>{}</tr>",
                escape(dir_label(name)),
                stats_cells(&dir.stats, &dir.delta())
            )
            .unwrap();
            for file in rollup.files_in(dir) {
                writeln!(out, "{}", file_row(file)).unwrap();
            }
        }

        out.push_str("</table>\n</div>\n</body>\n</html>\n");
        out
    }
}

fn write_commit_table(out: &mut String, report: &CoverageReport) {
    let head = &report.git.head;
    let (subject, body) = head.subject_and_body();

    out.push_str("<table id=\"commit\">\n");
    write_person_row(out, "Author", "author", &head.author_name, &head.author_email);
    if head.author() != head.committer() {
        write_person_row(
            out,
            "Committed&nbsp;by",
            "committer",
            &head.committer_name,
            &head.committer_email,
        );
    }
    writeln!(
        out,
        "<tr><td class=\"label\">Commit</td><td>{}</td></tr>",
        escape(&head.id)
    )
    .unwrap();
    writeln!(
        out,
        "<tr><td class=\"label\">Branch</td><td>{}</td></tr>",
        escape(&report.git.branch)
    )
    .unwrap();
    write!(
        out,
        "<tr><td class=\"label\">&nbsp;</td><td><h4>{}</h4>",
        escape(subject)
    )
    .unwrap();
    if !body.trim().is_empty() {
        write!(out, "\n<pre>{}</pre>", escape(body.trim_end())).unwrap();
    }
    out.push_str("</td></tr>\n</table>\n\n");
}

fn write_person_row(out: &mut String, label: &str, id: &str, name: &str, email: &str) {
    writeln!(
        out,
        "<tr><td class=\"label\">{label}</td><td id=\"{id}\" title=\"{}\"><img src=\"{}\" width=\"16px\" height=\"16px\"/> {}</td></tr>",
        escape(email),
        gravatar_url(email),
        escape(name)
    )
    .unwrap();
}

/// Avatar for `email`, falling back to the mystery-person image.
#[must_use]
pub fn gravatar_url(email: &str) -> String {
    format!(
        "https://www.gravatar.com/avatar/{:x}?s=96&amp;d=mp",
        Md5::digest(email.to_lowercase().as_bytes())
    )
}

fn file_row(file: &FileReport) -> String {
    let cells = stats_cells(&file.stats, &file.delta());
    let name = escape(file.basename());
    match &file.digest {
        None => format!("<tr class=\"file\"><td class=\"name\"><del>{name}</del></td>{cells}</tr>"),
        Some(digest) => format!(
            "<tr class=\"file\"><td class=\"name\"><a href=\"{}#L{}\">{name}</a></td>{cells}</tr>",
            escape(&listing_file_name(digest)),
            file.anchor_line()
        ),
    }
}

/// The six value/indicator cell pairs of a table row.
fn stats_cells(stats: &Stats, delta: &StatsDelta) -> String {
    let cov_class = format!("cov cov-{}", stats.severity().as_str());
    let missed_class = if stats.missed_lines() == 0 {
        "missed missed-nothing"
    } else {
        "missed missed-lines"
    };
    let count = |v: u64| v.to_string();

    [
        delta_cells(&delta.coverage, format_percent, Some(cov_class.as_str())),
        delta_cells(&delta.total, count, None),
        delta_cells(&delta.relevant, count, None),
        delta_cells(&delta.covered, count, None),
        delta_cells(&delta.missed, count, Some(missed_class)),
        delta_cells(&delta.average, format_average, None),
    ]
    .concat()
}

fn delta_cells<T, F>(delta: &Delta<T>, conv: F, class: Option<&str>) -> String
where
    T: Copy,
    F: Fn(T) -> String,
{
    let class = class.map(|c| format!(" {c}")).unwrap_or_default();
    let diff = if delta.trend.sign().is_empty() {
        String::new()
    } else {
        format!(
            "<span class=\"diff\">{}{}</span>",
            delta.trend.sign(),
            conv(delta.magnitude)
        )
    };
    format!(
        "<td class=\"value{class}\">{}</td><td class=\"{}{class}\">{INDICATOR}{diff}</td>",
        conv(delta.current),
        delta.trend.as_str()
    )
}

/// Annotated listing of one file. `content` is the file's source text.
#[must_use]
pub fn render_listing(file: &FileReport, content: &str) -> String {
    let name = escape(&file.name);
    let mut out = String::new();
    writeln!(
        out,
        "<html>\n<head>\n<title>{name} &mdash; Coverage</title>\n<style type=\"text/css\">\n{CSS}\n</style>\n</head>\n<body>\n<h1>{name}</h1>\n<div class=\"content\">\n<table class=\"listing\">"
    )
    .unwrap();

    for (idx, code) in content.lines().enumerate() {
        let lineno = idx + 1;
        let (class, hits) = match file.coverage.get(idx).copied().flatten() {
            None => ("", String::new()),
            Some(0) => (" class=\"error\"", String::new()),
            Some(n) => (
                " class=\"success\"",
                format!("<a href=\"#L{lineno}\">{n}&times;</a>"),
            ),
        };
        writeln!(
            out,
            "<tr{class}><td><a name=\"L{lineno}\"></a><a href=\"#L{lineno}\">{lineno}</a></td><td><a href=\"#L{lineno}\"><pre>{}</pre></a></td><td>{hits}</td></tr>",
            escape(code)
        )
        .unwrap();
    }

    out.push_str("</table>\n</div>\n</body>\n</html>\n");
    out
}

/// Write `index.html` and every listing into `out_dir`, creating it if
/// needed. Deleted files get no listing.
pub fn write_report(
    out_dir: &Path,
    report: &CoverageReport,
    source: &dyn ListingSource,
) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    let index = out_dir.join("index.html");
    std::fs::write(&index, report.format(&HtmlFormatter))
        .with_context(|| format!("Failed to write {}", index.display()))?;

    let mut listings = 0;
    for file in report.rollup.files.values() {
        let Some(digest) = &file.digest else {
            continue;
        };
        let content = source
            .load(&file.name)
            .with_context(|| format!("Failed to load source of {}", file.name))?;
        let path = out_dir.join(listing_file_name(digest));
        debug!(file = %file.name, listing = %path.display(), "writing listing");
        std::fs::write(&path, render_listing(file, &content))
            .with_context(|| format!("Failed to write {}", path.display()))?;
        listings += 1;
    }

    info!(dir = %out_dir.display(), listings, "HTML report written");
    Ok(())
}

const CSS: &str = r#"*, td, th { box-sizing: border-box; }
body, td, th { font-family: "Segoe UI", Candara, "DejaVu Sans", Verdana, sans-serif; }
div.content { max-width: 1000px; margin: 0 auto; }

table.listing { width: 100%; padding: 1em; border-collapse: separate; border-spacing: 0; }
table.listing tr td { color: #555; font-family: monospace; padding: 0 1em; background: rgba(192,192,192,0.1); }
table.listing tr.success td { background: rgba(208,233,153,0.2); }
table.listing tr.error td { background: rgba(216,134,123,0.2); }
table.listing a { color: inherit; text-decoration: none; }
table.listing td:nth-child(odd) { text-align: right; }
table.listing td:nth-child(1) { border-right: solid 1px #ddd; }
table.listing td:nth-child(2) { border-left: solid 1px #fff; }
table.listing td:nth-child(3) { font-size: smaller; }
table.listing pre { margin: 0; word-wrap: break-word; }

table.stats { border-collapse: collapse; font-size: .9em; width: 100% }
table.stats th { font-size: 1.1em }
table.stats th, table.stats td { padding: 0.2em }
table.stats th, td.value { text-align: right; padding-left: .5em }
table.stats th:first-child { text-align: left; padding-left: .2em }
table.stats th, tr.total td.name { font-variant: small-caps }

td.same, td.up, td.down { padding-right: .83333em; padding-left: .33333em; font-size: .7em }
.ind { color: gray; font-size: 2em; font-family: monospace; margin-right: .3em }
.ind-up:before { content: "\25b2" }
.ind-down:before { content: "\25bc" }
td.same .ind { display: none }
td.up { color: green }
td.down { color: red }
td.up .ind-up { color: #4a4 }
td.down .ind-down { color: red }
td.up .ind-down, td.down .ind-up { display: none }

tr.total td.name { font-style: italic }
tr.filler td { padding-top: .5em; padding-bottom: .5em; }
tr.file td.name a, tr.file td.name del { padding-left: 2.2em; display: inline-block; min-width: 100% }
tr.file td.name a { color: inherit; text-decoration: none; }
tr.file td.name a:hover { text-decoration: underline; }
tr.file td.name del { color: #555; }
tr.total td, tr.dir td { font-weight: bolder }

thead tr { background: #111; color: #f5f5f5 }
tr.dir, tr.total { background: #eee }
tr.file:nth-child(odd) { background: #f5f5f5 }
tr.file:nth-child(even) { background: #fcfcfc }

tr td.cov-bad { background: rgba(255, 0, 0, .1) }
tr td.cov-ok { background: rgba(255, 255, 0, .1) }
tr td.cov-good { background: rgba(0, 255, 0, .1) }
tr td.value.cov-bad { color: #c44 }
tr td.value.cov-ok { color: #883 }
tr td.value.cov-good { color: #080 }
tr td.value.missed-lines { font-style: italic }

table#commit { border-collapse: collapse; width: 100%; margin-bottom: 2em; }
table#commit td.label { color: silver; text-align: right; padding-right: 1em; font-size: .8em; font-weight: bold; }
table#commit h4 { padding-top: 1em; }"#;
