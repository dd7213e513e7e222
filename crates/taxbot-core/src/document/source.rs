//! OCR text sources.

use std::path::{Path, PathBuf};

use crate::error::ExtractionError;

/// Producer of raw document text, typically an OCR engine.
pub trait TextSource {
    /// Produce the document text.
    fn text(&self) -> Result<String, ExtractionError>;

    /// Short description used in logs.
    fn describe(&self) -> String {
        "text source".to_string()
    }
}

impl TextSource for str {
    fn text(&self) -> Result<String, ExtractionError> {
        Ok(self.to_string())
    }
}

impl TextSource for String {
    fn text(&self) -> Result<String, ExtractionError> {
        Ok(self.clone())
    }
}

/// Text previously written to disk by an OCR run.
#[derive(Debug, Clone)]
pub struct FileTextSource {
    path: PathBuf,
}

impl FileTextSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TextSource for FileTextSource {
    fn text(&self) -> Result<String, ExtractionError> {
        std::fs::read_to_string(&self.path)
            .map_err(|e| ExtractionError::Source(format!("{}: {}", self.path.display(), e)))
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("receipt.txt");
        std::fs::write(&path, "TOTAL 1.00").unwrap();

        assert_eq!(FileTextSource::new(&path).text().unwrap(), "TOTAL 1.00");
    }

    #[test]
    fn test_invalid_utf8_is_source_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.bin");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();

        assert!(matches!(
            FileTextSource::new(&path).text(),
            Err(ExtractionError::Source(_))
        ));
    }
}
