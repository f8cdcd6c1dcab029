//! Document text extraction.
//!
//! Supports PDF, CSV and plain text. Multiple files (or directories, walked
//! recursively) are concatenated into one document, each followed by a
//! newline.

use crate::progress::ProgressReporter;
use docchat_core::{AppError, AppResult};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Supported document kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Csv,
    PlainText,
}

impl DocumentKind {
    /// Detect document kind from file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "csv" => Some(Self::Csv),
            "txt" | "md" | "markdown" => Some(Self::PlainText),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Csv => "csv",
            Self::PlainText => "text",
        }
    }
}

/// Extract UTF-8 text from a single document.
pub fn extract(path: &Path) -> AppResult<String> {
    let kind = DocumentKind::from_path(path).ok_or_else(|| {
        AppError::Extraction(format!(
            "Unsupported file type: {:?} (expected .pdf, .csv, .txt or .md)",
            path
        ))
    })?;

    if !path.is_file() {
        return Err(AppError::Extraction(format!("File not found: {:?}", path)));
    }

    tracing::debug!("Extracting {} text from {:?}", kind.as_str(), path);

    match kind {
        DocumentKind::Pdf => extract_pdf(path),
        DocumentKind::Csv => extract_csv(path),
        DocumentKind::PlainText => fs::read_to_string(path)
            .map_err(|e| AppError::Extraction(format!("Failed to read {:?}: {}", path, e))),
    }
}

fn extract_pdf(path: &Path) -> AppResult<String> {
    // pdf-extract panics on some malformed files
    let result = std::panic::catch_unwind(|| pdf_extract::extract_text(path)).map_err(|_| {
        AppError::Extraction(format!("PDF extraction failed for {:?}: malformed document", path))
    })?;

    let text = result
        .map_err(|e| AppError::Extraction(format!("PDF extraction failed for {:?}: {}", path, e)))?;

    if text.trim().is_empty() {
        tracing::warn!("No extractable text in {:?}", path);
    }

    Ok(text)
}

/// Render each CSV record as one `header: value, header: value` line.
fn extract_csv(path: &Path) -> AppResult<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| AppError::Extraction(format!("Failed to open CSV {:?}: {}", path, e)))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| AppError::Extraction(format!("Failed to read CSV headers {:?}: {}", path, e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut lines = Vec::new();
    for record in reader.records() {
        let record = record
            .map_err(|e| AppError::Extraction(format!("Failed to read CSV {:?}: {}", path, e)))?;

        let line = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| format!("{}: {}", header, value.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(line);
    }

    Ok(lines.join("\n"))
}

/// Expand files and directories into the list of documents to extract.
///
/// Explicit files are kept as given (unsupported ones fail at extraction).
/// Directories contribute their supported files in path order.
pub fn collect_documents(paths: &[PathBuf]) -> AppResult<Vec<PathBuf>> {
    let mut documents = Vec::new();

    for path in paths {
        if path.is_file() {
            documents.push(path.clone());
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
                .map(|e| e.into_path())
                .filter(|p| DocumentKind::from_path(p).is_some())
                .collect();
            found.sort();

            tracing::debug!("Found {} documents in {:?}", found.len(), path);
            documents.extend(found);
        } else {
            return Err(AppError::Extraction(format!("Path does not exist: {:?}", path)));
        }
    }

    Ok(documents)
}

/// Extract and concatenate every document under `paths`.
pub fn load_documents(paths: &[PathBuf], progress: &ProgressReporter) -> AppResult<String> {
    let documents = collect_documents(paths)?;
    if documents.is_empty() {
        return Err(AppError::Extraction(
            "No supported documents found (expected .pdf, .csv, .txt or .md)".to_string(),
        ));
    }

    let total = documents.len() as u64;
    let mut text = String::new();

    for (i, path) in documents.iter().enumerate() {
        progress.extract(i as u64 + 1, Some(total), &path.display().to_string());
        text.push_str(&extract(path)?);
        text.push('\n');
    }

    tracing::info!("Extracted {} bytes from {} documents", text.len(), total);
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_document_kind_detection() {
        assert_eq!(DocumentKind::from_path(Path::new("cv.PDF")), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_path(Path::new("staff.csv")), Some(DocumentKind::Csv));
        assert_eq!(
            DocumentKind::from_path(Path::new("notes.md")),
            Some(DocumentKind::PlainText)
        );
        assert_eq!(DocumentKind::from_path(Path::new("image.png")), None);
        assert_eq!(DocumentKind::from_path(Path::new("README")), None);
    }

    #[test]
    fn test_extract_plain_text_verbatim() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("notes.txt");
        fs::write(&path, "line one\n\nline two").unwrap();

        assert_eq!(extract(&path).unwrap(), "line one\n\nline two");
    }

    #[test]
    fn test_extract_csv_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("staff.csv");
        fs::write(&path, "name,role\nAda,engineer\nGrace, admiral\n").unwrap();

        assert_eq!(
            extract(&path).unwrap(),
            "name: Ada, role: engineer\nname: Grace, role: admiral"
        );
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("photo.png");
        fs::write(&path, [0u8, 1, 2]).unwrap();

        assert!(matches!(extract(&path), Err(AppError::Extraction(_))));
    }

    #[test]
    fn test_missing_file() {
        let result = extract(Path::new("/definitely/not/here.txt"));
        assert!(matches!(result, Err(AppError::Extraction(_))));
    }

    #[test]
    fn test_malformed_pdf() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.pdf");
        fs::write(&path, "this is not a pdf").unwrap();

        assert!(matches!(extract(&path), Err(AppError::Extraction(_))));
    }

    #[test]
    fn test_load_documents_concatenates_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("a.txt"), "first").unwrap();
        fs::write(dir.path().join("nested/b.md"), "second").unwrap();
        fs::write(dir.path().join("skip.png"), "ignored").unwrap();

        let text = load_documents(&[dir.path().to_path_buf()], &ProgressReporter::noop()).unwrap();
        assert_eq!(text, "first\nsecond\n");
    }

    #[test]
    fn test_load_documents_empty_directory() {
        let dir = TempDir::new().unwrap();
        let result = load_documents(&[dir.path().to_path_buf()], &ProgressReporter::noop());
        assert!(matches!(result, Err(AppError::Extraction(_))));
    }
}
