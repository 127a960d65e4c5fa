use anyhow::{Context, Result};
use comfy_table::Table;

use rl_cli::pipeline::{ExportConfig, ExportResult, run_export as run_pipeline};
use rl_export::HEADER;

use crate::cli::ExportArgs;
use crate::summary::apply_table_style;

pub fn run_export(args: &ExportArgs) -> Result<ExportResult> {
    let feed_delimiter =
        u8::try_from(args.feed_delimiter).context("feed delimiter must be an ASCII character")?;
    let config = ExportConfig {
        feed_path: args.feed.clone(),
        feed_delimiter,
        lists_dir: args.lists_dir.clone(),
        report_path: args.report.clone(),
        time_periods: args.time_periods.clone(),
        directory_snapshot: args.directory.clone(),
        use_cache: !args.no_cache,
        resolve_owners: !args.no_owner_lookup,
        all_items: args.all_items,
        skip_failed_lists: args.skip_failed_lists,
        ignore_directory_errors: args.ignore_directory_errors,
        output_path: args.output.clone(),
    };
    run_pipeline(&config)
}

pub fn run_columns() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["#", "Column"]);
    apply_table_style(&mut table);
    for (idx, column) in HEADER.iter().enumerate() {
        table.add_row(vec![idx.to_string(), (*column).to_string()]);
    }
    println!("{table}");
    Ok(())
}
