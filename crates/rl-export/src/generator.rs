//! The list-to-row transformation walk.
//!
//! A list is written as one full item pass per module per applicable
//! course-code record. A list with N modules, each resolving to M records,
//! emits N×M rows for every qualifying item. Lists or modules that cannot
//! be resolved fall back to the unknown sentinel record for a single pass.

use std::io::Write;

use tracing::{debug, warn};

use rl_courses::CourseCodeIndex;
use rl_directory::DirectoryLookup;
use rl_model::{CourseCodeRecord, EmailSelector, Module, ReadingList};

use crate::error::ExportError;
use crate::row::build_row;

/// How a directory failure during owner resolution is handled.
///
/// Username resolution is required for correct owner attribution, so the
/// default aborts the run. Degrading to empty usernames is an explicit
/// integrator choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DirectoryErrorPolicy {
    /// Propagate the failure and abort the run.
    #[default]
    Fail,
    /// Log the failure and leave the owner username empty.
    EmptyUsername,
}

/// Owner-attribution collaborators. A username is only ever resolved when
/// both are configured.
pub struct OwnerResolver {
    pub lookup: DirectoryLookup,
    pub selector: Box<dyn EmailSelector>,
}

/// Counters for one written list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListStats {
    /// Rows emitted for the list.
    pub rows: usize,
    /// Fan-out passes that used the unknown sentinel record.
    pub unknown_passes: usize,
}

/// Walks a reading list and streams its output rows.
pub struct RowGenerator<'a> {
    index: &'a CourseCodeIndex,
    owner: Option<OwnerResolver>,
    on_directory_error: DirectoryErrorPolicy,
}

impl<'a> RowGenerator<'a> {
    pub fn new(index: &'a CourseCodeIndex) -> Self {
        Self {
            index,
            owner: None,
            on_directory_error: DirectoryErrorPolicy::default(),
        }
    }

    /// Enable owner-username resolution.
    #[must_use]
    pub fn with_owner_resolver(mut self, owner: OwnerResolver) -> Self {
        self.owner = Some(owner);
        self
    }

    #[must_use]
    pub fn with_directory_error_policy(mut self, policy: DirectoryErrorPolicy) -> Self {
        self.on_directory_error = policy;
        self
    }

    /// Write every row for one list.
    ///
    /// Null module entries are discarded. A list left with no modules is
    /// treated as unresolved and written in a single pass under the unknown
    /// record. Items without a resource are skipped unless `all_items`.
    pub fn write_list<W: Write>(
        &mut self,
        writer: &mut csv::Writer<W>,
        list: &ReadingList,
        all_items: bool,
    ) -> Result<ListStats, ExportError> {
        let owner_username = self.owner_username(list)?;
        let index = self.index;
        let mut stats = ListStats::default();

        let modules: Vec<&Module> = list.modules.iter().flatten().collect();
        if modules.is_empty() {
            debug!(list_uri = %list.uri, "list has no modules, using the unknown record");
            stats.unknown_passes += 1;
            write_pass(
                writer,
                list,
                index.unknown_record(),
                &owner_username,
                all_items,
                &mut stats,
            )?;
            return Ok(stats);
        }

        for module in modules {
            match resolve_records(index, list, module) {
                Some(records) => {
                    for record in records {
                        write_pass(writer, list, record, &owner_username, all_items, &mut stats)?;
                    }
                }
                None => {
                    stats.unknown_passes += 1;
                    write_pass(
                        writer,
                        list,
                        index.unknown_record(),
                        &owner_username,
                        all_items,
                        &mut stats,
                    )?;
                }
            }
        }
        Ok(stats)
    }

    /// Resolve the owner username for a list, or empty.
    ///
    /// Missing owner, missing primary email, and directory misses all
    /// degrade to an empty string. A directory failure is handled per the
    /// configured policy.
    fn owner_username(&mut self, list: &ReadingList) -> Result<String, ExportError> {
        let Some(owner) = self.owner.as_mut() else {
            return Ok(String::new());
        };
        let Some(person) = list.owner.first().or_else(|| list.creator.first()) else {
            debug!(list_uri = %list.uri, "list has no owner or creator");
            return Ok(String::new());
        };
        let Some(email) = owner.selector.primary_email(&person.email) else {
            debug!(list_uri = %list.uri, "no primary email for list owner");
            return Ok(String::new());
        };
        match owner.lookup.find(&email) {
            Ok(Some(uid)) => Ok(uid),
            Ok(None) => Ok(String::new()),
            Err(error) => match self.on_directory_error {
                DirectoryErrorPolicy::Fail => Err(error.into()),
                DirectoryErrorPolicy::EmptyUsername => {
                    warn!(list_uri = %list.uri, %error, "directory lookup failed, owner left empty");
                    Ok(String::new())
                }
            },
        }
    }
}

/// Course-code records applicable to one module, or `None` when the list
/// has no time period or the catalogue has no entry for the module/year.
fn resolve_records<'a>(
    index: &'a CourseCodeIndex,
    list: &ReadingList,
    module: &Module,
) -> Option<&'a [CourseCodeRecord]> {
    let Some(period) = list.time_period.as_ref() else {
        debug!(list_uri = %list.uri, module = %module.code, "list has no time period, using the unknown record");
        return None;
    };
    let records = index.lookup(&module.code, period.year);
    if records.is_empty() {
        debug!(
            list_uri = %list.uri,
            module = %module.code,
            year = period.year,
            "no course codes for module, using the unknown record"
        );
        return None;
    }
    Some(records)
}

/// One pass over the list's items under a single course-code record.
fn write_pass<W: Write>(
    writer: &mut csv::Writer<W>,
    list: &ReadingList,
    record: &CourseCodeRecord,
    owner_username: &str,
    all_items: bool,
    stats: &mut ListStats,
) -> Result<(), ExportError> {
    list.for_each_item(|item, sections| {
        if !all_items && item.resource.is_none() {
            return Ok(());
        }
        let row = build_row(list, item, sections, record, owner_username);
        writer.write_record(&row)?;
        stats.rows += 1;
        Ok(())
    })
}
