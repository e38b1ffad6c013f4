mod common;

use gcovrs::aggregate::{aggregate, FsProbe, RelevantDirs, SourceInfo};
use gcovrs::model::DumpData;
use gcovrs::parsers::gcov::GcovParser;
use gcovrs::parsers::Parser;

/// Two translation units include the same header; their counts add up.
#[test]
fn overlapping_units_are_summed() {
    let tree = common::source_tree(&[("app/src/util.hpp", &common::lines(12))]);
    let header = tree.path().join("app/src/util.hpp");

    let unit_a = format!("file:{}\nlcount:10,3,0\nlcount:11,0,0\n", header.display());
    let unit_b = format!("file:{}\nlcount:10,4,0\n", header.display());
    let dumps = [
        GcovParser.parse(unit_a.as_bytes()).unwrap(),
        GcovParser.parse(unit_b.as_bytes()).unwrap(),
    ];

    let files = aggregate(tree.path(), RelevantDirs::parse("app"), &dumps, &FsProbe).unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].name, "app/src/util.hpp");
    assert_eq!(files[0].coverage.len(), 12);
    assert_eq!(files[0].coverage[9], Some(7));
    assert_eq!(files[0].coverage[10], Some(0));
    assert_eq!(files[0].coverage[11], None);
}

#[test]
fn merge_is_order_independent() {
    let tree = common::source_tree(&[("lib/a.cpp", &common::lines(6))]);
    let path = tree.path().join("lib/a.cpp");
    let dumps = vec![
        common::dump(&path, &[(1, 1), (2, 0), (5, 9)]),
        common::dump(&path, &[(2, 2), (3, 0)]),
        common::dump(&path, &[(1, 4), (6, 1)]),
    ];

    let forward = aggregate(tree.path(), RelevantDirs::parse("lib"), &dumps, &FsProbe).unwrap();
    let reversed: Vec<DumpData> = dumps.iter().rev().cloned().collect();
    let backward =
        aggregate(tree.path(), RelevantDirs::parse("lib"), &reversed, &FsProbe).unwrap();
    let rotated: Vec<DumpData> = vec![dumps[1].clone(), dumps[2].clone(), dumps[0].clone()];
    let shuffled =
        aggregate(tree.path(), RelevantDirs::parse("lib"), &rotated, &FsProbe).unwrap();

    assert_eq!(forward, backward);
    assert_eq!(forward, shuffled);
    assert_eq!(
        forward[0].coverage,
        vec![Some(5), Some(2), Some(0), None, Some(9), Some(1)]
    );
}

#[test]
fn reaggregating_a_snapshot_vector_is_idempotent() {
    let tree = common::source_tree(&[("lib/a.cpp", &common::lines(8))]);
    let path = tree.path().join("lib/a.cpp");
    let dumps = vec![
        common::dump(&path, &[(2, 1), (4, 0)]),
        common::dump(&path, &[(2, 5), (7, 3)]),
    ];
    let first = aggregate(tree.path(), RelevantDirs::parse("lib"), &dumps, &FsProbe).unwrap();

    let records: Vec<(u32, u64)> = first[0]
        .coverage
        .iter()
        .enumerate()
        .filter_map(|(idx, hits)| hits.map(|h| (idx as u32 + 1, h)))
        .collect();
    let again = aggregate(
        tree.path(),
        RelevantDirs::parse("lib"),
        &[common::dump(&path, &records)],
        &FsProbe,
    )
    .unwrap();

    assert_eq!(first, again);
}

#[test]
fn relevant_dirs_match_whole_segments() {
    let tree = common::source_tree(&[
        ("app/src/x.cpp", "int x;\n"),
        ("app/srcfoo/x.cpp", "int x;\n"),
    ]);
    let dumps = vec![
        common::dump(&tree.path().join("app/src/x.cpp"), &[(1, 1)]),
        common::dump(&tree.path().join("app/srcfoo/x.cpp"), &[(1, 1)]),
    ];

    let files = aggregate(tree.path(), RelevantDirs::parse("app/src"), &dumps, &FsProbe).unwrap();
    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["app/src/x.cpp"]);
}

#[test]
fn null_and_zero_are_distinct() {
    let tree = common::source_tree(&[("src/a.c", &common::lines(3))]);
    let path = tree.path().join("src/a.c");
    let dumps = vec![common::dump(&path, &[(2, 0)]), common::dump(&path, &[(3, 0)])];

    let files = aggregate(tree.path(), RelevantDirs::parse("src"), &dumps, &FsProbe).unwrap();
    assert_eq!(files[0].coverage, vec![None, Some(0), Some(0)]);
}

#[test]
fn vector_covers_instrumented_lines_past_end_of_file() {
    let tree = common::source_tree(&[("src/short.c", "one\ntwo")]);
    let path = tree.path().join("src/short.c");
    let files = aggregate(
        tree.path(),
        RelevantDirs::parse("src"),
        &[common::dump(&path, &[(5, 1)])],
        &FsProbe,
    )
    .unwrap();

    assert_eq!(files[0].coverage, vec![None, None, None, None, Some(1)]);
    assert_eq!(
        files[0].source_digest,
        SourceInfo::from_content(b"one\ntwo").digest
    );
}

#[test]
fn out_of_tree_missing_and_empty_files_are_dropped() {
    let tree = common::source_tree(&[("src/kept.c", "a\n"), ("src/empty.c", "a\n")]);
    let outside = tempfile::tempdir().unwrap();
    let dumps = vec![
        common::dump(&tree.path().join("src/kept.c"), &[(1, 1)]),
        common::dump(&tree.path().join("src/empty.c"), &[]),
        common::dump(&tree.path().join("src/deleted.c"), &[(1, 1)]),
        common::dump(&outside.path().join("src/other.c"), &[(1, 1)]),
        common::dump(std::path::Path::new("/usr/include/stdio.h"), &[(1, 1)]),
    ];

    let files = aggregate(tree.path(), RelevantDirs::parse("src"), &dumps, &FsProbe).unwrap();
    let names: Vec<_> = files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["src/kept.c"]);
}

#[test]
fn filters_matching_nothing_yield_empty_result() {
    let tree = common::source_tree(&[("src/a.c", "a\n")]);
    let dumps = vec![common::dump(&tree.path().join("src/a.c"), &[(1, 1)])];
    let files = aggregate(tree.path(), RelevantDirs::parse("nothing"), &dumps, &FsProbe).unwrap();
    assert!(files.is_empty());
}

#[test]
fn malformed_dump_is_fatal() {
    assert!(GcovParser.parse(b"file:/x/a.c\nlcount:1,x,0\n").is_err());
}
