//! Loading structure-description files from disk.
//!
//! Every file under the structure directory becomes one entry keyed by its
//! `/`-separated path relative to that directory. `.json` files are parsed into
//! [`StructureDocument`]s; anything else is kept as an opaque entry so the
//! builder can report it as skipped.
//!
//! ```text
//! structure/
//! ├── en.json          → StructureFile::Document
//! ├── de.json          → StructureFile::Document
//! └── README.md        → StructureFile::Other
//! ```

use crate::types::StructureDocument;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot read structure directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Structure directory not found: {0}")]
    MissingDirectory(PathBuf),
    #[error("Invalid structure file {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: serde_json::Error,
    },
}

/// One entry of the structure directory.
#[derive(Debug, Clone)]
pub enum StructureFile {
    Document(StructureDocument),
    Other,
}

/// Structure entries keyed by relative path, in path order.
pub type StructureFiles = BTreeMap<String, StructureFile>;

/// True if the identifier names a structure description.
pub fn is_structure_file(name: &str) -> bool {
    Path::new(name)
        .extension()
        .is_some_and(|ext| ext.to_str() == Some("json"))
}

/// Parse a single structure description.
pub fn parse_structure(name: &str, json: &str) -> Result<StructureDocument, LoadError> {
    serde_json::from_str(json).map_err(|source| LoadError::Parse {
        file: name.to_string(),
        source,
    })
}

/// Read every file below `dir`. Hidden files are ignored.
pub fn load_structures(dir: &Path) -> Result<StructureFiles, LoadError> {
    if !dir.is_dir() {
        return Err(LoadError::MissingDirectory(dir.to_path_buf()));
    }

    let mut files = StructureFiles::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = relative_name(entry.path(), dir);
        let file = if is_structure_file(&name) {
            let json = fs::read_to_string(entry.path())?;
            StructureFile::Document(parse_structure(&name, &json)?)
        } else {
            StructureFile::Other
        };
        tracing::debug!(file = %name, "Loaded structure entry");
        files.insert(name, file);
    }
    Ok(files)
}

/// `/`-separated path of `path` relative to `root`.
pub(crate) fn relative_name(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn json_extension_detection() {
        assert!(is_structure_file("en.json"));
        assert!(is_structure_file("nested/de.json"));
        assert!(!is_structure_file("nested/de.JSON"));
        assert!(!is_structure_file("README.md"));
        assert!(!is_structure_file("json"));
    }

    #[test]
    fn loads_documents_and_other_entries() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("en.json"),
            r#"{"data": {"pages": [{"path": "", "data": {}}]}}"#,
        )
        .unwrap();
        fs::write(tmp.path().join("notes.txt"), "not a structure").unwrap();
        fs::create_dir(tmp.path().join("locales")).unwrap();
        fs::write(tmp.path().join("locales/de.json"), r#"{}"#).unwrap();

        let files = load_structures(tmp.path()).unwrap();
        let names: Vec<&str> = files.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["en.json", "locales/de.json", "notes.txt"]);

        assert!(matches!(&files["en.json"], StructureFile::Document(d) if d.data.is_some()));
        assert!(matches!(&files["locales/de.json"], StructureFile::Document(d) if d.data.is_none()));
        assert!(matches!(files["notes.txt"], StructureFile::Other));
    }

    #[test]
    fn hidden_files_ignored() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(".draft.json"), "{ broken").unwrap();
        assert!(load_structures(tmp.path()).unwrap().is_empty());
    }

    #[test]
    fn invalid_json_names_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("broken.json"), "{ not json").unwrap();

        let err = load_structures(tmp.path()).unwrap_err();
        assert!(matches!(&err, LoadError::Parse { file, .. } if file == "broken.json"));
        assert!(err.to_string().starts_with("Invalid structure file broken.json"));
    }

    #[test]
    fn uppercase_json_extension_is_not_parsed() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.JSON"), "{ not json").unwrap();

        let files = load_structures(tmp.path()).unwrap();
        assert!(matches!(files["notes.JSON"], StructureFile::Other));
    }

    #[test]
    fn missing_directory_is_error() {
        let tmp = TempDir::new().unwrap();
        let err = load_structures(&tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, LoadError::MissingDirectory(_)));
    }
}
