use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use proptest::prelude::ProptestConfig;
use proptest::{prop_assert_eq, proptest};

use rl_courses::{CourseCodeIndex, DEFAULT_DELIMITER};
use rl_directory::{DirectoryLookup, FileDirectory};
use rl_export::{
    DirectoryErrorPolicy, ErrorPolicy, ExportError, HEADER, OwnerResolver, RowGenerator,
    TableWriter, always_quoted_writer,
};
use rl_model::{
    DirectoryAttribute, DirectoryEntry, DirectoryService, DirectoryServiceError, EmailSelector,
    Item, ListSource, ModelError, Module, ModuleCode, Person, ReadingList, Resource, Section,
    TimePeriod,
};

fn feed_row(key: &str, section: &str, year: &str, id1: &str) -> String {
    let mut cols = vec![""; 17];
    cols[0] = key;
    cols[2] = section;
    cols[13] = year;
    cols[14] = id1;
    cols.join("\t")
}

fn write_feed(rows: &[String]) -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("courses.tsv");
    fs::write(&path, rows.join("\n")).expect("write feed");
    (dir, path)
}

/// Feed with two 2016 cohorts for every given module code.
fn two_cohort_index(codes: &[&str]) -> (tempfile::TempDir, CourseCodeIndex) {
    let mut rows = Vec::new();
    for code in codes {
        rows.push(feed_row(&format!("LAW-{code}-2016-A"), "1", "2016", code));
        rows.push(feed_row(&format!("LAW-{code}-2016-B"), "2", "2016", code));
    }
    let (dir, path) = write_feed(&rows);
    let index = CourseCodeIndex::from_feed(&path, DEFAULT_DELIMITER).expect("build index");
    (dir, index)
}

fn module(code: &str) -> Option<Module> {
    Some(Module {
        code: ModuleCode::new(code).unwrap(),
        name: None,
    })
}

fn resource_item(title: &str) -> Item {
    Item {
        title: Some(title.to_string()),
        resource: Some(Resource {
            citation_title: Some(title.to_string()),
            ..Resource::default()
        }),
        ..Item::default()
    }
}

fn list_with(modules: Vec<Option<Module>>, items: Vec<Item>) -> ReadingList {
    ReadingList {
        uri: "http://lists.example.ac.uk/lists/ABC123".to_string(),
        name: "Accounting".to_string(),
        time_period: Some(TimePeriod {
            year: 2016,
            title: None,
        }),
        modules,
        sections: vec![Section {
            name: "Week 1".to_string(),
            items,
            ..Section::default()
        }],
        ..ReadingList::default()
    }
}

struct MapSource(HashMap<String, ReadingList>);

impl MapSource {
    fn single(list: ReadingList) -> Self {
        Self(HashMap::from([(list.uri.clone(), list)]))
    }
}

impl ListSource for MapSource {
    fn resolve(&self, uri: &str) -> Result<ReadingList, ModelError> {
        self.0
            .get(uri)
            .cloned()
            .ok_or_else(|| ModelError::resolve(uri, "not in fixture"))
    }
}

struct FirstEmail;

impl EmailSelector for FirstEmail {
    fn primary_email(&self, candidates: &[String]) -> Option<String> {
        candidates.first().cloned()
    }
}

struct FailingDirectory;

impl DirectoryService for FailingDirectory {
    fn search(
        &self,
        _attribute: DirectoryAttribute,
        _value: &str,
    ) -> Result<Vec<DirectoryEntry>, DirectoryServiceError> {
        Err(DirectoryServiceError::new("connection refused"))
    }
}

fn col(name: &str) -> usize {
    HEADER.iter().position(|h| *h == name).expect("column")
}

fn parse(bytes: &[u8]) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(bytes);
    reader
        .records()
        .map(|record| {
            record
                .expect("parse output")
                .iter()
                .map(String::from)
                .collect()
        })
        .collect()
}

fn write_list_rows(
    index: &CourseCodeIndex,
    list: &ReadingList,
    all_items: bool,
) -> Vec<Vec<String>> {
    let mut generator = RowGenerator::new(index);
    let mut writer = always_quoted_writer(vec![]);
    generator
        .write_list(&mut writer, list, all_items)
        .expect("write list");
    parse(&writer.into_inner().expect("flush output"))
}

#[test]
fn fan_out_per_module_per_record_per_item() {
    let (_dir, index) = two_cohort_index(&["ACF503", "HIST200"]);
    let list = list_with(
        vec![module("ACF503"), module("HIST200")],
        vec![
            resource_item("One"),
            resource_item("Two"),
            resource_item("Three"),
        ],
    );

    let rows = write_list_rows(&index, &list, false);
    // 2 modules x 2 cohort records x 3 items
    assert_eq!(rows.len(), 12);

    // List-then-module-then-record-then-item order.
    let codes: Vec<&str> = rows
        .iter()
        .map(|row| row[col("course_code")].as_str())
        .collect();
    assert_eq!(&codes[0..3], &["LAW-ACF503-2016-A"; 3]);
    assert_eq!(&codes[3..6], &["LAW-ACF503-2016-B"; 3]);
    assert_eq!(&codes[6..9], &["LAW-HIST200-2016-A"; 3]);
    assert_eq!(&codes[9..12], &["LAW-HIST200-2016-B"; 3]);
    let titles: Vec<&str> = rows
        .iter()
        .map(|row| row[col("citation_title")].as_str())
        .collect();
    assert_eq!(&titles[0..3], &["One", "Two", "Three"]);
}

#[test]
fn null_module_entries_are_discarded() {
    let (_dir, index) = two_cohort_index(&["ACF503"]);
    let list = list_with(
        vec![None, module("ACF503"), None],
        vec![resource_item("One")],
    );

    let rows = write_list_rows(&index, &list, false);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| row[col("course_code")] != "unknown"));
}

#[test]
fn empty_module_set_emits_one_sentinel_pass() {
    let (_dir, index) = two_cohort_index(&["ACF503"]);
    let list = list_with(vec![], vec![resource_item("One"), resource_item("Two")]);

    let mut generator = RowGenerator::new(&index);
    let mut writer = always_quoted_writer(vec![]);
    let stats = generator.write_list(&mut writer, &list, false).unwrap();
    assert_eq!(stats.rows, 2);
    assert_eq!(stats.unknown_passes, 1);

    let rows = parse(&writer.into_inner().unwrap());
    assert!(rows.iter().all(|row| row[col("course_code")] == "unknown"));
    // The sentinel also forces the URI-derived list code.
    assert!(
        rows.iter()
            .all(|row| row[col("Reading_list_code")] == "ABC123")
    );
}

#[test]
fn unmatched_module_year_falls_back_to_sentinel() {
    let (_dir, index) = two_cohort_index(&["ACF503"]);
    let mut list = list_with(vec![module("ACF503")], vec![resource_item("One")]);
    list.time_period = Some(TimePeriod {
        year: 1999,
        title: None,
    });

    let mut generator = RowGenerator::new(&index);
    let mut writer = always_quoted_writer(vec![]);
    let stats = generator.write_list(&mut writer, &list, false).unwrap();
    assert_eq!(stats.rows, 1);
    assert_eq!(stats.unknown_passes, 1);
    let rows = parse(&writer.into_inner().unwrap());
    assert_eq!(rows[0][col("course_code")], "unknown");
}

#[test]
fn missing_time_period_falls_back_per_module() {
    let (_dir, index) = two_cohort_index(&["ACF503", "HIST200"]);
    let mut list = list_with(
        vec![module("ACF503"), module("HIST200")],
        vec![resource_item("One")],
    );
    list.time_period = None;

    let mut generator = RowGenerator::new(&index);
    let mut writer = always_quoted_writer(vec![]);
    let stats = generator.write_list(&mut writer, &list, false).unwrap();
    assert_eq!(stats.rows, 2);
    assert_eq!(stats.unknown_passes, 2);
}

#[test]
fn resourceless_items_are_skipped_unless_requested() {
    let (_dir, index) = two_cohort_index(&["ACF503"]);
    let list = list_with(
        vec![module("ACF503")],
        vec![
            resource_item("With resource"),
            Item {
                title: Some("Notes only".to_string()),
                local_control_number: Some("LCN9".to_string()),
                ..Item::default()
            },
        ],
    );

    let rows = write_list_rows(&index, &list, false);
    assert_eq!(rows.len(), 2);

    let rows = write_list_rows(&index, &list, true);
    assert_eq!(rows.len(), 4);
    let notes_row = rows
        .iter()
        .find(|row| row[col("citation_title")] == "Notes only")
        .expect("resourceless row");
    assert_eq!(notes_row[col("citation_originating_system_id")], "LCN9");
    assert_eq!(notes_row[col("citation_isbn")], "");
}

#[test]
fn owner_username_resolves_through_directory() {
    let (_dir, index) = two_cohort_index(&["ACF503"]);
    let snapshot_dir = tempfile::tempdir().unwrap();
    let snapshot = snapshot_dir.path().join("directory.tsv");
    fs::write(&snapshot, "smithj\tj.smith@example.ac.uk\n").unwrap();
    let directory = FileDirectory::open(&snapshot).unwrap();

    let mut list = list_with(vec![module("ACF503")], vec![resource_item("One")]);
    list.owner = vec![Person {
        name: Some("J. Smith".to_string()),
        email: vec!["j.smith@example.ac.uk".to_string()],
    }];

    let mut generator = RowGenerator::new(&index).with_owner_resolver(OwnerResolver {
        lookup: DirectoryLookup::new(Box::new(directory), true),
        selector: Box::new(FirstEmail),
    });
    let mut writer = always_quoted_writer(vec![]);
    generator.write_list(&mut writer, &list, false).unwrap();
    let rows = parse(&writer.into_inner().unwrap());
    assert!(
        rows.iter()
            .all(|row| row[col("owner_user_name")] == "smithj")
    );
}

#[test]
fn creator_is_the_owner_fallback() {
    let (_dir, index) = two_cohort_index(&["ACF503"]);
    let snapshot_dir = tempfile::tempdir().unwrap();
    let snapshot = snapshot_dir.path().join("directory.tsv");
    fs::write(&snapshot, "jonesk\tk.jones@example.ac.uk\n").unwrap();
    let directory = FileDirectory::open(&snapshot).unwrap();

    let mut list = list_with(vec![module("ACF503")], vec![resource_item("One")]);
    list.owner = vec![];
    list.creator = vec![Person {
        name: None,
        email: vec!["k.jones@example.ac.uk".to_string()],
    }];

    let mut generator = RowGenerator::new(&index).with_owner_resolver(OwnerResolver {
        lookup: DirectoryLookup::new(Box::new(directory), true),
        selector: Box::new(FirstEmail),
    });
    let mut writer = always_quoted_writer(vec![]);
    generator.write_list(&mut writer, &list, false).unwrap();
    let rows = parse(&writer.into_inner().unwrap());
    assert_eq!(rows[0][col("owner_user_name")], "jonesk");
}

#[test]
fn owner_is_empty_without_collaborators() {
    let (_dir, index) = two_cohort_index(&["ACF503"]);
    let mut list = list_with(vec![module("ACF503")], vec![resource_item("One")]);
    list.owner = vec![Person {
        name: None,
        email: vec!["j.smith@example.ac.uk".to_string()],
    }];

    let rows = write_list_rows(&index, &list, false);
    assert_eq!(rows[0][col("owner_user_name")], "");
}

#[test]
fn directory_failure_aborts_by_default() {
    let (_dir, index) = two_cohort_index(&["ACF503"]);
    let mut list = list_with(vec![module("ACF503")], vec![resource_item("One")]);
    list.owner = vec![Person {
        name: None,
        email: vec!["j.smith@example.ac.uk".to_string()],
    }];

    let mut generator = RowGenerator::new(&index).with_owner_resolver(OwnerResolver {
        lookup: DirectoryLookup::new(Box::new(FailingDirectory), true),
        selector: Box::new(FirstEmail),
    });
    let mut writer = always_quoted_writer(vec![]);
    let error = generator.write_list(&mut writer, &list, false).unwrap_err();
    assert!(matches!(error, ExportError::Directory(_)));
}

#[test]
fn directory_failure_degrades_when_policy_allows() {
    let (_dir, index) = two_cohort_index(&["ACF503"]);
    let mut list = list_with(vec![module("ACF503")], vec![resource_item("One")]);
    list.owner = vec![Person {
        name: None,
        email: vec!["j.smith@example.ac.uk".to_string()],
    }];

    let mut generator = RowGenerator::new(&index)
        .with_owner_resolver(OwnerResolver {
            lookup: DirectoryLookup::new(Box::new(FailingDirectory), true),
            selector: Box::new(FirstEmail),
        })
        .with_directory_error_policy(DirectoryErrorPolicy::EmptyUsername);
    let mut writer = always_quoted_writer(vec![]);
    generator.write_list(&mut writer, &list, false).unwrap();
    let rows = parse(&writer.into_inner().unwrap());
    assert_eq!(rows[0][col("owner_user_name")], "");
}

#[test]
fn table_writer_emits_header_then_rows() {
    let (_dir, index) = two_cohort_index(&["ACF503"]);
    let list = list_with(vec![module("ACF503")], vec![resource_item("One")]);
    let uri = list.uri.clone();
    let source = MapSource::single(list);

    let mut writer = TableWriter::new(&source, RowGenerator::new(&index));
    let mut output = vec![];
    let summary = writer.write(&mut output, &[uri], false).unwrap();
    assert_eq!(summary.rows(), 2);
    assert!(!summary.has_errors());

    let rows = parse(&output);
    assert_eq!(rows.len(), 3);
    let header: Vec<&str> = rows[0].iter().map(String::as_str).collect();
    assert_eq!(header, HEADER);
}

#[test]
fn failed_resolution_aborts_under_fail_fast() {
    let (_dir, index) = two_cohort_index(&["ACF503"]);
    let source = MapSource(HashMap::new());
    let mut writer = TableWriter::new(&source, RowGenerator::new(&index));
    let mut output = vec![];
    let error = writer
        .write(
            &mut output,
            &["http://lists.example.ac.uk/lists/MISSING".to_string()],
            false,
        )
        .unwrap_err();
    assert!(matches!(error, ExportError::Resolve { .. }));
}

#[test]
fn failed_resolution_is_recorded_under_skip_list() {
    let (_dir, index) = two_cohort_index(&["ACF503"]);
    let list = list_with(vec![module("ACF503")], vec![resource_item("One")]);
    let good = list.uri.clone();
    let source = MapSource::single(list);

    let mut writer =
        TableWriter::new(&source, RowGenerator::new(&index)).with_error_policy(ErrorPolicy::SkipList);
    let mut output = vec![];
    let summary = writer
        .write(
            &mut output,
            &[
                "http://lists.example.ac.uk/lists/MISSING".to_string(),
                good,
            ],
            false,
        )
        .unwrap();
    assert!(summary.has_errors());
    assert_eq!(summary.errors().count(), 1);
    // The failed list contributes no rows; the good list still streams.
    assert_eq!(summary.rows(), 2);
    assert_eq!(parse(&output).len(), 3);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn fan_out_row_count_is_modules_by_records_by_items(
        n_modules in 1usize..4,
        n_cohorts in 1usize..4,
        n_items in 0usize..5,
    ) {
        let mut feed = Vec::new();
        let codes: Vec<String> = (0..n_modules).map(|m| format!("MOD{m}")).collect();
        for code in &codes {
            for cohort in 0..n_cohorts {
                feed.push(feed_row(
                    &format!("LAW-{code}-2016-{cohort}"),
                    "1",
                    "2016",
                    code,
                ));
            }
        }
        let (_dir, path) = write_feed(&feed);
        let index = CourseCodeIndex::from_feed(&path, DEFAULT_DELIMITER).unwrap();

        let items: Vec<Item> = (0..n_items)
            .map(|i| resource_item(&format!("Item {i}")))
            .collect();
        let modules: Vec<Option<Module>> = codes.iter().map(|code| module(code)).collect();
        let list = list_with(modules, items);

        let rows = write_list_rows(&index, &list, false);
        prop_assert_eq!(rows.len(), n_modules * n_cohorts * n_items);
    }
}
