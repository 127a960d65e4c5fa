//! The "all lists" report export.
//!
//! The reading-list platform exports a header-keyed CSV of every list it
//! knows about. The exporter enumerates candidate lists from that report
//! rather than crawling the API: only published, public lists in the
//! configured time periods are worth fetching.

use std::path::Path;

use anyhow::{Context, Result, bail};

const COLUMN_LINK: &str = "List Link";
const COLUMN_TIME_PERIOD: &str = "Time Period";
const COLUMN_STATUS: &str = "Status";
const COLUMN_PRIVACY: &str = "Privacy Control";

/// One report row, reduced to the fields the filter needs.
#[derive(Debug, Clone)]
struct ReportRow {
    link: String,
    time_period: String,
    status: String,
    privacy: String,
}

/// Which report rows are exported.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    /// Accepted time periods; empty accepts every period.
    pub time_periods: Vec<String>,
}

/// The parsed report, in file order.
#[derive(Debug)]
pub struct ListReport {
    rows: Vec<ReportRow>,
}

impl ListReport {
    /// Read a report export. The header row must carry the `List Link`,
    /// `Time Period`, `Status`, and `Privacy Control` columns.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("open list report {}", path.display()))?;
        let headers = reader
            .headers()
            .with_context(|| format!("read list report header {}", path.display()))?
            .clone();
        let position = |name: &str| -> Result<usize> {
            match headers.iter().position(|header| header.trim() == name) {
                Some(idx) => Ok(idx),
                None => bail!("list report {} has no {name:?} column", path.display()),
            }
        };
        let link = position(COLUMN_LINK)?;
        let time_period = position(COLUMN_TIME_PERIOD)?;
        let status = position(COLUMN_STATUS)?;
        let privacy = position(COLUMN_PRIVACY)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record =
                record.with_context(|| format!("read list report {}", path.display()))?;
            let field = |idx: usize| record.get(idx).unwrap_or("").trim().to_string();
            rows.push(ReportRow {
                link: field(link),
                time_period: field(time_period),
                status: field(status),
                privacy: field(privacy),
            });
        }
        Ok(Self { rows })
    }

    /// URIs of the lists that pass the filter, preserving report order.
    ///
    /// A list qualifies when its time period is in the configured set (or
    /// the set is empty), its status starts with `Published`, and its
    /// privacy control is `Public`.
    pub fn uris(&self, filter: &ReportFilter) -> Vec<String> {
        self.rows
            .iter()
            .filter(|row| {
                (filter.time_periods.is_empty()
                    || filter.time_periods.iter().any(|p| *p == row.time_period))
                    && row.status.starts_with("Published")
                    && row.privacy == "Public"
            })
            .map(|row| row.link.clone())
            .collect()
    }

    /// Total number of report rows, before filtering.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use super::*;

    fn write_report(rows: &[&str]) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("report.csv");
        let mut contents =
            String::from("List Link,List Name,Time Period,Status,Privacy Control\n");
        for row in rows {
            contents.push_str(row);
            contents.push('\n');
        }
        fs::write(&path, contents).expect("write report");
        (dir, path)
    }

    #[test]
    fn filters_published_public_in_period() {
        let (_dir, path) = write_report(&[
            "http://lists/1,One,2016-17,Published,Public",
            "http://lists/2,Two,2016-17,Draft,Public",
            "http://lists/3,Three,2016-17,Published,Private",
            "http://lists/4,Four,2015-16,Published,Public",
            "http://lists/5,Five,2016-17,Published with changes,Public",
        ]);
        let report = ListReport::from_csv(&path).unwrap();
        assert_eq!(report.len(), 5);

        let filter = ReportFilter {
            time_periods: vec!["2016-17".to_string()],
        };
        assert_eq!(
            report.uris(&filter),
            vec![
                "http://lists/1".to_string(),
                "http://lists/5".to_string()
            ]
        );
    }

    #[test]
    fn empty_period_set_accepts_every_period() {
        let (_dir, path) = write_report(&[
            "http://lists/1,One,2016-17,Published,Public",
            "http://lists/4,Four,2015-16,Published,Public",
        ]);
        let report = ListReport::from_csv(&path).unwrap();
        let uris = report.uris(&ReportFilter::default());
        assert_eq!(uris.len(), 2);
    }

    #[test]
    fn order_of_appearance_is_preserved() {
        let (_dir, path) = write_report(&[
            "http://lists/9,Nine,2016-17,Published,Public",
            "http://lists/1,One,2016-17,Published,Public",
            "http://lists/5,Five,2016-17,Published,Public",
        ]);
        let report = ListReport::from_csv(&path).unwrap();
        let uris = report.uris(&ReportFilter::default());
        assert_eq!(uris, vec!["http://lists/9", "http://lists/1", "http://lists/5"]);
    }

    #[test]
    fn missing_column_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        fs::write(&path, "List Link,Status\nhttp://lists/1,Published\n").unwrap();
        let error = ListReport::from_csv(&path).unwrap_err();
        assert!(error.to_string().contains("Time Period"));
    }
}
