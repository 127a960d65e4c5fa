//! Course-code index built from the tab-separated catalogue feed.
//!
//! Each feed row describes one course/section offering for a cohort. The
//! index maps `(module code, year)` to the records for every cohort of that
//! offering, in feed encounter order. Lookups that resolve nothing return an
//! empty slice; the caller substitutes [`CourseCodeIndex::unknown_record`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use rl_model::{CourseCodeRecord, ModuleCode};

/// Default feed field delimiter.
pub const DEFAULT_DELIMITER: u8 = b'\t';

// Fixed feed column positions.
const COL_COMPOSITE_KEY: usize = 0;
const COL_SECTION_ID: usize = 2;
const COL_YEAR: usize = 13;
const COL_SEARCH_ID1: usize = 14;
const COL_SEARCH_ID2: usize = 15;
const COL_SEARCH_ID3: usize = 16;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("read course feed {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("course feed {path} line {line}: malformed composite key {key:?}")]
    MalformedRow {
        path: PathBuf,
        line: usize,
        key: String,
    },
}

/// Read-only mapping from `(module code, year)` to course-code records.
#[derive(Debug, Clone)]
pub struct CourseCodeIndex {
    entries: BTreeMap<ModuleCode, BTreeMap<i32, Vec<CourseCodeRecord>>>,
    unknown: CourseCodeRecord,
}

impl CourseCodeIndex {
    /// Load the catalogue feed. The first column of every row is a composite
    /// `prefix-moduleCode-year-cohort` key; the year is read from its own
    /// numeric column rather than the key. A key that does not split into
    /// exactly four parts fails the build with the offending line number.
    pub fn from_feed(path: &Path, delimiter: u8) -> Result<Self, FeedError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(delimiter)
            .flexible(true)
            .from_path(path)
            .map_err(|source| FeedError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut entries: BTreeMap<ModuleCode, BTreeMap<i32, Vec<CourseCodeRecord>>> =
            BTreeMap::new();

        for (idx, record) in reader.records().enumerate() {
            let line = idx + 1;
            let record = record.map_err(|source| FeedError::Read {
                path: path.to_path_buf(),
                source,
            })?;

            let key = field(&record, COL_COMPOSITE_KEY);
            let parts: Vec<&str> = key.split('-').collect();
            let module = match parts.as_slice() {
                [_prefix, module, _year, _cohort] => ModuleCode::new(*module),
                _ => Err(rl_model::ModelError::InvalidModuleCode(key.to_string())),
            };
            let module = module.map_err(|_| FeedError::MalformedRow {
                path: path.to_path_buf(),
                line,
                key: key.to_string(),
            })?;

            let year_field = field(&record, COL_YEAR);
            let year: i32 = match year_field.parse() {
                Ok(year) => year,
                Err(_) => {
                    debug!(line, year = %year_field, "non-numeric year column, treating as 0");
                    0
                }
            };

            let course = CourseCodeRecord {
                code: key.to_string(),
                section_id: field(&record, COL_SECTION_ID).to_string(),
                search_id1: field(&record, COL_SEARCH_ID1).to_string(),
                search_id2: field(&record, COL_SEARCH_ID2).to_string(),
                search_id3: field(&record, COL_SEARCH_ID3).to_string(),
                mnemonic: field(&record, COL_SEARCH_ID1).to_string(),
            };

            entries
                .entry(module)
                .or_default()
                .entry(year)
                .or_default()
                .push(course);
        }

        Ok(Self {
            entries,
            unknown: CourseCodeRecord::unknown(),
        })
    }

    /// All cohort records for a module/year, in feed order. Empty when the
    /// module or year is absent.
    pub fn lookup(&self, module: &ModuleCode, year: i32) -> &[CourseCodeRecord] {
        self.entries
            .get(module)
            .and_then(|years| years.get(&year))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The fixed sentinel record for unresolvable lists.
    pub fn unknown_record(&self) -> &CourseCodeRecord {
        &self.unknown
    }

    /// Number of distinct module codes in the index.
    pub fn module_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of course-code records loaded.
    pub fn record_count(&self) -> usize {
        self.entries
            .values()
            .flat_map(|years| years.values())
            .map(Vec::len)
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn field<'a>(record: &'a csv::StringRecord, idx: usize) -> &'a str {
    record.get(idx).unwrap_or("").trim()
}
