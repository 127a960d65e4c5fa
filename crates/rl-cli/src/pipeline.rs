//! Export pipeline with explicit stages.
//!
//! 1. **Index**: load the course catalogue feed
//! 2. **Collaborators**: open the directory snapshot, wire owner resolution
//! 3. **Enumerate**: read and filter the "all lists" report
//! 4. **Stream**: resolve each list and write its rows
//!
//! Configuration is explicit: every path and policy choice arrives through
//! [`ExportConfig`], never through the environment. Collaborator
//! construction failures are fatal before any list is processed.

use std::fs::File;
use std::io::{BufWriter, IsTerminal};
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span};

use rl_courses::CourseCodeIndex;
use rl_directory::{DirectoryLookup, FileDirectory};
use rl_export::{
    DirectoryErrorPolicy, ErrorPolicy, OwnerResolver, RowGenerator, TableWriter,
    always_quoted_writer,
};
use rl_model::EmailSelector;

use crate::report::{ListReport, ReportFilter};
use crate::source::JsonListSource;

/// Everything one export run needs, enumerated explicitly.
#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub feed_path: PathBuf,
    pub feed_delimiter: u8,
    pub lists_dir: PathBuf,
    pub report_path: PathBuf,
    /// Accepted report time periods; empty accepts all.
    pub time_periods: Vec<String>,
    /// Directory snapshot for owner attribution; `None` leaves owner
    /// usernames empty.
    pub directory_snapshot: Option<PathBuf>,
    pub use_cache: bool,
    /// Whether owner emails are selected and resolved at all.
    pub resolve_owners: bool,
    pub all_items: bool,
    pub skip_failed_lists: bool,
    pub ignore_directory_errors: bool,
    pub output_path: PathBuf,
}

/// Per-list line of the run summary.
#[derive(Debug, Clone)]
pub struct ListSummary {
    pub uri: String,
    pub rows: usize,
    pub unknown_passes: usize,
    pub error: Option<String>,
}

/// The finished run, as reported to the operator.
#[derive(Debug)]
pub struct ExportResult {
    pub output_path: PathBuf,
    pub lists: Vec<ListSummary>,
    pub rows: usize,
    pub unknown_passes: usize,
    pub errors: Vec<String>,
    pub has_errors: bool,
}

/// Reference email policy: the first candidate address wins.
///
/// The platform's richer selection policies plug in through the
/// [`EmailSelector`] trait.
pub struct FirstEmailSelector;

impl EmailSelector for FirstEmailSelector {
    fn primary_email(&self, candidates: &[String]) -> Option<String> {
        candidates.first().cloned()
    }
}

/// Run one export end-to-end.
pub fn run_export(config: &ExportConfig) -> Result<ExportResult> {
    let span = info_span!("export", output = %config.output_path.display());
    let _guard = span.enter();

    // =========================================================================
    // Stage 1: Course-code index
    // =========================================================================
    let index_start = Instant::now();
    let index = CourseCodeIndex::from_feed(&config.feed_path, config.feed_delimiter)
        .context("load course feed")?;
    info!(
        modules = index.module_count(),
        records = index.record_count(),
        duration_ms = index_start.elapsed().as_millis(),
        "course feed loaded"
    );

    // =========================================================================
    // Stage 2: Collaborators
    // =========================================================================
    let mut generator = RowGenerator::new(&index).with_directory_error_policy(
        if config.ignore_directory_errors {
            DirectoryErrorPolicy::EmptyUsername
        } else {
            DirectoryErrorPolicy::Fail
        },
    );
    if config.resolve_owners
        && let Some(snapshot) = &config.directory_snapshot
    {
        let directory = FileDirectory::open(snapshot).context("open directory snapshot")?;
        info!(entries = directory.len(), "directory snapshot loaded");
        generator = generator.with_owner_resolver(OwnerResolver {
            lookup: DirectoryLookup::new(Box::new(directory), config.use_cache),
            selector: Box::new(FirstEmailSelector),
        });
    }

    // =========================================================================
    // Stage 3: Enumerate lists from the report
    // =========================================================================
    let report = ListReport::from_csv(&config.report_path).context("read list report")?;
    let filter = ReportFilter {
        time_periods: config.time_periods.clone(),
    };
    let uris = report.uris(&filter);
    info!(
        total = report.len(),
        selected = uris.len(),
        "list report filtered"
    );

    // =========================================================================
    // Stage 4: Stream rows
    // =========================================================================
    let source = JsonListSource::new(&config.lists_dir);
    let mut writer = TableWriter::new(&source, generator).with_error_policy(
        if config.skip_failed_lists {
            ErrorPolicy::SkipList
        } else {
            ErrorPolicy::FailFast
        },
    );

    let file = File::create(&config.output_path)
        .with_context(|| format!("create {}", config.output_path.display()))?;
    let mut csv_writer = always_quoted_writer(BufWriter::new(file));
    writer.write_header(&mut csv_writer).context("write header")?;

    let stream_start = Instant::now();
    let progress = progress_bar(uris.len() as u64);
    let mut lists = Vec::with_capacity(uris.len());
    for uri in &uris {
        let outcome = writer.write_one(&mut csv_writer, uri, config.all_items)?;
        lists.push(ListSummary {
            uri: outcome.uri,
            rows: outcome.rows,
            unknown_passes: outcome.unknown_passes,
            error: outcome.error,
        });
        progress.inc(1);
    }
    csv_writer.flush().context("flush output")?;
    progress.finish_and_clear();

    let rows = lists.iter().map(|list| list.rows).sum();
    let unknown_passes = lists.iter().map(|list| list.unknown_passes).sum();
    let errors: Vec<String> = lists
        .iter()
        .filter_map(|list| {
            list.error
                .as_ref()
                .map(|error| format!("{}: {error}", list.uri))
        })
        .collect();
    info!(
        lists = lists.len(),
        rows,
        unknown_passes,
        error_count = errors.len(),
        duration_ms = stream_start.elapsed().as_millis(),
        "export complete"
    );

    let has_errors = !errors.is_empty();
    Ok(ExportResult {
        output_path: config.output_path.clone(),
        lists,
        rows,
        unknown_passes,
        errors,
        has_errors,
    })
}

fn progress_bar(len: u64) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    bar.set_style(
        ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} lists {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}
