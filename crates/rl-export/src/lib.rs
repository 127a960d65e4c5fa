//! Reading-list to import-file transformation.
//!
//! The engine walks a reading list's module/section/item hierarchy, fans
//! each qualifying item out across the course-code records applicable to
//! its modules, and maps list, item, and resource fields into the fixed
//! 41-column import schema. [`TableWriter`] orchestrates the header and the
//! per-list streaming; [`RowGenerator`] owns the walk and the fallback
//! rules.

pub mod columns;
mod error;
mod generator;
mod row;
mod writer;

pub use columns::{COLUMN_COUNT, HEADER};
pub use error::ExportError;
pub use generator::{DirectoryErrorPolicy, ListStats, OwnerResolver, RowGenerator};
pub use row::build_row;
pub use writer::{ErrorPolicy, ExportSummary, ListOutcome, TableWriter, always_quoted_writer};
