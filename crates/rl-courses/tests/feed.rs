use std::fs;
use std::path::PathBuf;

use rl_courses::{CourseCodeIndex, DEFAULT_DELIMITER, FeedError};
use rl_model::ModuleCode;

fn feed_row(key: &str, section: &str, year: &str, id1: &str, id2: &str, id3: &str) -> String {
    let mut cols = vec![""; 17];
    cols[0] = key;
    cols[2] = section;
    cols[13] = year;
    cols[14] = id1;
    cols[15] = id2;
    cols[16] = id3;
    cols.join("\t")
}

fn write_feed(rows: &[String]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("courses.tsv");
    fs::write(&path, rows.join("\n")).expect("write feed");
    (dir, path)
}

#[test]
fn builds_index_from_feed_columns() {
    let rows = vec![feed_row(
        "LAW-ACF503-2016-A",
        "2",
        "2016",
        "ACF503",
        "ACF503A",
        "LAW503",
    )];
    let (_dir, path) = write_feed(&rows);
    let index = CourseCodeIndex::from_feed(&path, DEFAULT_DELIMITER).expect("build index");

    let module = ModuleCode::new("ACF503").unwrap();
    let records = index.lookup(&module, 2016);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].code, "LAW-ACF503-2016-A");
    assert_eq!(records[0].section_id, "2");
    assert_eq!(records[0].search_id1, "ACF503");
    assert_eq!(records[0].search_id2, "ACF503A");
    assert_eq!(records[0].search_id3, "LAW503");
    assert_eq!(records[0].mnemonic, "ACF503");
}

#[test]
fn cohorts_accumulate_in_feed_order() {
    let rows = vec![
        feed_row("LAW-ACF503-2016-A", "1", "2016", "ACF503", "", ""),
        feed_row("LAW-ACF503-2016-B", "2", "2016", "ACF503", "", ""),
        feed_row("LAW-ACF503-2017-A", "1", "2017", "ACF503", "", ""),
    ];
    let (_dir, path) = write_feed(&rows);
    let index = CourseCodeIndex::from_feed(&path, DEFAULT_DELIMITER).expect("build index");

    let module = ModuleCode::new("ACF503").unwrap();
    let records = index.lookup(&module, 2016);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].code, "LAW-ACF503-2016-A");
    assert_eq!(records[1].code, "LAW-ACF503-2016-B");
    assert_eq!(index.lookup(&module, 2017).len(), 1);
    assert_eq!(index.record_count(), 3);
    assert_eq!(index.module_count(), 1);
}

#[test]
fn year_comes_from_numeric_column_not_composite_key() {
    // Composite key says 2016, the year column says 2017. The year column
    // wins.
    let rows = vec![feed_row("LAW-ACF503-2016-A", "1", "2017", "ACF503", "", "")];
    let (_dir, path) = write_feed(&rows);
    let index = CourseCodeIndex::from_feed(&path, DEFAULT_DELIMITER).expect("build index");

    let module = ModuleCode::new("ACF503").unwrap();
    assert!(index.lookup(&module, 2016).is_empty());
    assert_eq!(index.lookup(&module, 2017).len(), 1);
}

#[test]
fn unknown_module_or_year_resolves_empty() {
    let rows = vec![feed_row("LAW-ACF503-2016-A", "1", "2016", "ACF503", "", "")];
    let (_dir, path) = write_feed(&rows);
    let index = CourseCodeIndex::from_feed(&path, DEFAULT_DELIMITER).expect("build index");

    let missing = ModuleCode::new("HIST100").unwrap();
    assert!(index.lookup(&missing, 2016).is_empty());
    let module = ModuleCode::new("ACF503").unwrap();
    assert!(index.lookup(&module, 1999).is_empty());
}

#[test]
fn malformed_composite_key_reports_line() {
    let rows = vec![
        feed_row("LAW-ACF503-2016-A", "1", "2016", "ACF503", "", ""),
        feed_row("not a composite key", "1", "2016", "ACF503", "", ""),
    ];
    let (_dir, path) = write_feed(&rows);
    let error = CourseCodeIndex::from_feed(&path, DEFAULT_DELIMITER).unwrap_err();
    match error {
        FeedError::MalformedRow { line, key, .. } => {
            assert_eq!(line, 2);
            assert_eq!(key, "not a composite key");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unknown_record_is_the_sentinel() {
    let (_dir, path) = write_feed(&[feed_row("A-B-1-C", "1", "1", "", "", "")]);
    let index = CourseCodeIndex::from_feed(&path, DEFAULT_DELIMITER).expect("build index");
    let unknown = index.unknown_record();
    assert!(unknown.is_unknown());
    assert_eq!(unknown.code, "unknown");
    assert_eq!(unknown.section_id, "1");
}
