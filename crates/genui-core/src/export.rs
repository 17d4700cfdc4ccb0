use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ViewError;

pub const EXPORT_FILE_NAME: &str = "GenUI-Code.html";
pub const EXPORT_MIME: &str = "text/plain";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub path: PathBuf,
    pub mime: &'static str,
    pub bytes: usize,
}

/// Write `code` byte for byte to `<dir>/GenUI-Code.html`, replacing any
/// earlier export.
pub fn export_code(dir: &Path, code: &str) -> Result<ExportReceipt, ViewError> {
    let path = dir.join(EXPORT_FILE_NAME);
    let to_failure = |source| ViewError::ExportFailure {
        path: path.clone(),
        source,
    };

    fs::create_dir_all(dir).map_err(to_failure)?;
    fs::write(&path, code.as_bytes()).map_err(to_failure)?;

    tracing::info!(path = %path.display(), bytes = code.len(), "exported code");

    Ok(ExportReceipt {
        path,
        mime: EXPORT_MIME,
        bytes: code.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_writes_fixed_name_unmodified() {
        let dir = TempDir::new().unwrap();
        let receipt = export_code(dir.path(), "<p>Hi</p>").unwrap();

        assert_eq!(receipt.path, dir.path().join("GenUI-Code.html"));
        assert_eq!(receipt.mime, "text/plain");
        assert_eq!(receipt.bytes, 9);
        assert_eq!(fs::read_to_string(&receipt.path).unwrap(), "<p>Hi</p>");
    }

    #[test]
    fn test_overwrites_previous_export() {
        let dir = TempDir::new().unwrap();
        export_code(dir.path(), "<p>first, and longer</p>").unwrap();
        let receipt = export_code(dir.path(), "<p>2</p>").unwrap();
        assert_eq!(fs::read_to_string(&receipt.path).unwrap(), "<p>2</p>");
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("exports").join("ui");
        let receipt = export_code(&target, "<p>x</p>").unwrap();
        assert!(receipt.path.exists());
    }
}
