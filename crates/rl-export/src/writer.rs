//! Import-file orchestration: the header plus per-list row streaming.

use std::io::Write;
use std::time::Instant;

use tracing::{info, info_span, warn};

use rl_model::ListSource;

use crate::columns::HEADER;
use crate::error::ExportError;
use crate::generator::RowGenerator;

/// What to do when a list identifier cannot be resolved to a list object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Abort the run on the first failed list.
    #[default]
    FailFast,
    /// Record the failure, skip the list, continue with the rest.
    SkipList,
}

/// The outcome of writing one list.
#[derive(Debug, Clone)]
pub struct ListOutcome {
    pub uri: String,
    pub rows: usize,
    pub unknown_passes: usize,
    /// Resolution failure, present only under [`ErrorPolicy::SkipList`].
    pub error: Option<String>,
}

/// Aggregated outcomes for a run.
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub lists: Vec<ListOutcome>,
}

impl ExportSummary {
    pub fn rows(&self) -> usize {
        self.lists.iter().map(|outcome| outcome.rows).sum()
    }

    pub fn unknown_passes(&self) -> usize {
        self.lists.iter().map(|outcome| outcome.unknown_passes).sum()
    }

    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lists.iter().filter_map(|outcome| {
            outcome
                .error
                .as_deref()
                .map(|error| (outcome.uri.as_str(), error))
        })
    }

    pub fn has_errors(&self) -> bool {
        self.lists.iter().any(|outcome| outcome.error.is_some())
    }
}

/// A CSV writer with every field quoted, as the downstream import expects.
pub fn always_quoted_writer<W: Write>(sink: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(sink)
}

/// Streams the import file: header first, then each list's rows in
/// identifier order.
pub struct TableWriter<'a> {
    source: &'a dyn ListSource,
    generator: RowGenerator<'a>,
    policy: ErrorPolicy,
}

impl<'a> TableWriter<'a> {
    pub fn new(source: &'a dyn ListSource, generator: RowGenerator<'a>) -> Self {
        Self {
            source,
            generator,
            policy: ErrorPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Write the whole import file to `sink`.
    pub fn write<W: Write>(
        &mut self,
        sink: W,
        uris: &[String],
        all_items: bool,
    ) -> Result<ExportSummary, ExportError> {
        let mut writer = always_quoted_writer(sink);
        self.write_header(&mut writer)?;
        let mut summary = ExportSummary::default();
        for uri in uris {
            summary.lists.push(self.write_one(&mut writer, uri, all_items)?);
        }
        writer.flush()?;
        Ok(summary)
    }

    /// Emit the fixed 41-column header.
    pub fn write_header<W: Write>(&self, writer: &mut csv::Writer<W>) -> Result<(), ExportError> {
        writer.write_record(HEADER)?;
        Ok(())
    }

    /// Resolve one identifier and stream its rows.
    ///
    /// Rows are flushed before returning, so a later failure never leaves a
    /// partially-written row behind. Resolution failures follow the
    /// configured [`ErrorPolicy`].
    pub fn write_one<W: Write>(
        &mut self,
        writer: &mut csv::Writer<W>,
        uri: &str,
        all_items: bool,
    ) -> Result<ListOutcome, ExportError> {
        let span = info_span!("list", list_uri = %uri);
        let _guard = span.enter();
        let start = Instant::now();

        let list = match self.source.resolve(uri) {
            Ok(list) => list,
            Err(error) => match self.policy {
                ErrorPolicy::FailFast => {
                    return Err(ExportError::Resolve {
                        uri: uri.to_string(),
                        source: error,
                    });
                }
                ErrorPolicy::SkipList => {
                    warn!(%error, "skipping unresolvable list");
                    return Ok(ListOutcome {
                        uri: uri.to_string(),
                        rows: 0,
                        unknown_passes: 0,
                        error: Some(error.to_string()),
                    });
                }
            },
        };

        let stats = self.generator.write_list(writer, &list, all_items)?;
        writer.flush()?;
        info!(
            rows = stats.rows,
            unknown_passes = stats.unknown_passes,
            duration_ms = start.elapsed().as_millis(),
            "list written"
        );
        Ok(ListOutcome {
            uri: uri.to_string(),
            rows: stats.rows,
            unknown_passes: stats.unknown_passes,
            error: None,
        })
    }
}
