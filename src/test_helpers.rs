//! Shared test utilities.
//!
//! Fixture setup plus lookups over resolved page maps that panic with the
//! available keys on a miss, so a failing test says what was produced.

use std::collections::BTreeMap;
use std::path::Path;
use tempfile::TempDir;

use crate::flatten::Stamp;
use crate::types::PageRecord;

/// Copy `fixtures/site/` to a temp directory and return it.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/site");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Fixed stamp so records compare deterministically.
pub fn test_stamp() -> Stamp {
    Stamp {
        version: "0.0.0-test".to_string(),
        timestamp: 1_700_000_000,
    }
}

/// Find a record by output path. Panics if not found.
pub fn find_record<'a>(records: &'a BTreeMap<String, PageRecord>, key: &str) -> &'a PageRecord {
    records.get(key).unwrap_or_else(|| {
        let keys: Vec<&str> = records.keys().map(String::as_str).collect();
        panic!("record '{key}' not found. Available: {keys:?}")
    })
}

/// Assert the exact set of output paths, in map order.
pub fn assert_record_keys(records: &BTreeMap<String, PageRecord>, expected: &[&str]) {
    let keys: Vec<&str> = records.keys().map(String::as_str).collect();
    assert_eq!(keys, expected, "output paths");
}
