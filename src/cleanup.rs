//! # Database Export Cleanup Module
//!
//! One-pass, stateless removal of bulky, regeneratable `.data.sql` exports
//! from a database dump directory. Operates on `<source_path>/db/latest`,
//! non-recursively: data files for log, report, index, cache and session
//! tables are deleted, structural `.sql` files are never touched.
//!
//! A failed deletion aborts immediately; there is nothing to resume, the
//! next invocation simply starts over.

use anyhow::{bail, Context, Result};
use regex::Regex;
use std::path::Path;
use tracing::{debug, info};

/// Table-name patterns whose data exports are regeneratable and safe to
/// delete. A trailing `$` marks a complete table name; everything else is a
/// prefix.
pub const DELETABLE_TABLE_PATTERNS: &[&str] = &[
    "log_",
    "report_event$",
    "report_compared_product_index",
    "report_viewed_product_index",
    "index_event",
    "index_process_event",
    "catalog_product_flat_",
    "asynccache",
    "enterprise_logging_event",
    "core_cache$",
    "core_cache_tag",
    "enterprise_giftcard",
    "core_session",
    "cron_schedule",
    "sales_flat",
    "core_file_storage",
    "enterprise_customer_sales_",
    "enterprise_sales_order_grid_archive",
    "sales_payment_transaction",
    "sales_bestsellers",
];

/// Compile the combined expression matching deletable data-export names.
pub fn deletable_file_regex() -> Regex {
    let alternatives: Vec<String> = DELETABLE_TABLE_PATTERNS
        .iter()
        .map(|pattern| match pattern.strip_suffix('$') {
            Some(exact) => format!("^{}\\.data\\.sql$", regex::escape(exact)),
            None => format!("^{}.*\\.data\\.sql$", regex::escape(pattern)),
        })
        .collect();
    Regex::new(&alternatives.join("|")).expect("static deletable-file expression")
}

/// Delete regeneratable `.data.sql` exports under `<source_path>/db/latest`.
///
/// Returns the number of files deleted. The first deletion failure aborts
/// the whole pass.
pub fn cleanup_db_export(source_path: &Path) -> Result<usize> {
    if !source_path.is_dir() {
        bail!(
            "Please provide a valid source path using --sourcePath=<path>; \
             '{}' is not a directory",
            source_path.display()
        );
    }

    let dump_dir = source_path.join("db").join("latest");

    info!("Start processing directory {}", dump_dir.display());

    let regex = deletable_file_regex();
    info!("Using regular expression: {}", regex.as_str());

    let entries = std::fs::read_dir(&dump_dir).with_context(|| {
        format!("Could not process given directory: {}", dump_dir.display())
    })?;

    let mut deleted = 0usize;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }

        let file_name = entry.file_name();
        let file_name = file_name.to_string_lossy();
        debug!("Processing file {}", entry.path().display());

        if regex.is_match(&file_name) {
            info!("Deleting futile sql file: {}", entry.path().display());
            std::fs::remove_file(entry.path()).with_context(|| {
                format!("Could not delete sql file: {}", entry.path().display())
            })?;
            deleted += 1;
        }
    }

    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn dump_dir(root: &Path) -> std::path::PathBuf {
        let dir = root.join("db").join("latest");
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_prefix_patterns_match_data_exports_only() {
        let regex = deletable_file_regex();

        assert!(regex.is_match("log_visitor.data.sql"));
        assert!(regex.is_match("sales_flat_order.data.sql"));
        assert!(regex.is_match("catalog_product_flat_1.data.sql"));

        // structural dumps are kept
        assert!(!regex.is_match("log_visitor.sql"));
        // unrelated tables are kept
        assert!(!regex.is_match("customer_entity.data.sql"));
        // the suffix is anchored, near-misses are kept
        assert!(!regex.is_match("log_visitor.data.sql.bak"));
    }

    #[test]
    fn test_exact_name_patterns_do_not_match_longer_names() {
        let regex = deletable_file_regex();

        assert!(regex.is_match("report_event.data.sql"));
        assert!(regex.is_match("core_cache.data.sql"));

        // `report_event$` is a complete name, not a prefix
        assert!(!regex.is_match("report_event_types.data.sql"));
        // core_cache_tag is separately listed and still matches
        assert!(regex.is_match("core_cache_tag.data.sql"));
    }

    #[test]
    fn test_cleanup_deletes_matching_files_and_keeps_the_rest() {
        let root = TempDir::new().unwrap();
        let dir = dump_dir(root.path());

        std::fs::write(dir.join("log_visitor.data.sql"), "data").unwrap();
        std::fs::write(dir.join("cron_schedule.data.sql"), "data").unwrap();
        std::fs::write(dir.join("log_visitor.sql"), "structure").unwrap();
        std::fs::write(dir.join("customer_entity.data.sql"), "data").unwrap();

        let deleted = cleanup_db_export(root.path()).unwrap();
        assert_eq!(deleted, 2);

        assert!(!dir.join("log_visitor.data.sql").exists());
        assert!(!dir.join("cron_schedule.data.sql").exists());
        assert!(dir.join("log_visitor.sql").exists());
        assert!(dir.join("customer_entity.data.sql").exists());
    }

    #[test]
    fn test_cleanup_requires_an_existing_source_path() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("nope");
        let err = cleanup_db_export(&missing).unwrap_err();
        assert!(err.to_string().contains("--sourcePath"));
    }

    #[test]
    fn test_cleanup_requires_the_dump_directory() {
        // Source exists but has no db/latest below it.
        let root = TempDir::new().unwrap();
        let err = cleanup_db_export(root.path()).unwrap_err();
        assert!(err.to_string().contains("Could not process given directory"));
    }

    #[test]
    fn test_cleanup_of_empty_dump_dir_deletes_nothing() {
        let root = TempDir::new().unwrap();
        dump_dir(root.path());
        assert_eq!(cleanup_db_export(root.path()).unwrap(), 0);
    }
}
