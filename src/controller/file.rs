use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

/// A user-chosen CSV file: display name plus raw bytes.
///
/// Contents are shared, so cloning a selection is cheap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    contents: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, contents: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }

    /// Read a file from disk. Only the `.csv` extension is checked; the
    /// contents are uploaded as-is.
    pub fn open(path: &Path) -> Result<Self> {
        if !has_csv_extension(path) {
            anyhow::bail!("expected a .csv file, got {}", path.display());
        }
        let contents =
            fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(name, contents))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }
}

/// Extension filter applied by every file picker.
pub fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_extension_is_case_insensitive() {
        assert!(has_csv_extension(Path::new("usage.csv")));
        assert!(has_csv_extension(Path::new("dir/USAGE.CSV")));
        assert!(!has_csv_extension(Path::new("usage.json")));
        assert!(!has_csv_extension(Path::new("csv")));
    }

    #[test]
    fn open_rejects_other_extensions() {
        let err = SelectedFile::open(Path::new("report.xlsx")).unwrap_err();
        assert!(err.to_string().contains("expected a .csv file"));
    }

    #[test]
    fn open_reads_name_and_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("billing.csv");
        fs::write(&path, "a,b\n").unwrap();

        let file = SelectedFile::open(&path).unwrap();
        assert_eq!(file.name(), "billing.csv");
        assert_eq!(file.contents(), b"a,b\n");
    }
}
