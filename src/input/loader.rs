//! Document loading with per-file skip reporting

use crate::error::{Result, ScreenerError};
use crate::input::file_detector::FileType;
use crate::input::text_extractor::{
    MarkdownExtractor, PdfExtractor, PlainTextExtractor, TextExtractor,
};
use crate::processing::document::{Document, DocumentRole};
use crate::processing::ranker::SkippedCandidate;
use log::{info, warn};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Candidate documents that loaded, plus the ones that did not and why.
pub struct LoadedBatch {
    pub documents: Vec<Document>,
    pub skipped: Vec<SkippedCandidate>,
}

pub struct DocumentLoader {
    markdown_extractor: MarkdownExtractor,
}

impl DocumentLoader {
    pub fn new() -> Self {
        Self {
            markdown_extractor: MarkdownExtractor::new(),
        }
    }

    /// Extracts raw text from a single file, routed by extension.
    pub async fn load_text(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(ScreenerError::InvalidInput(format!(
                "File does not exist: {}",
                path.display()
            )));
        }

        if path.extension().is_none() {
            return Err(ScreenerError::InvalidInput(format!(
                "File has no extension: {}",
                path.display()
            )));
        }

        match FileType::from_path(path) {
            FileType::Pdf => {
                info!("Extracting text from PDF: {}", path.display());
                PdfExtractor.extract(path).await
            }
            FileType::Text => {
                info!("Reading plain text file: {}", path.display());
                PlainTextExtractor.extract(path).await
            }
            FileType::Markdown => {
                info!("Processing markdown file: {}", path.display());
                self.markdown_extractor.extract(path).await
            }
            FileType::Unknown => Err(ScreenerError::UnsupportedFormat(
                path.display().to_string(),
            )),
        }
    }

    /// Loads one document, using the file name as its id.
    pub async fn load_document(&self, path: &Path, role: DocumentRole) -> Result<Document> {
        let text = self.load_text(path).await?;
        let document = Document::new(document_id(path), text, role)
            .with_source_path(path.display().to_string());
        Ok(document)
    }

    /// Loads candidate files, turning per-file failures into skip entries
    /// rather than aborting the batch.
    pub async fn load_candidates(&self, paths: &[PathBuf]) -> LoadedBatch {
        let mut documents = Vec::with_capacity(paths.len());
        let mut skipped = Vec::new();

        for path in paths {
            match self.load_document(path, DocumentRole::Candidate).await {
                Ok(document) => documents.push(document),
                Err(e) => {
                    warn!("Skipping candidate '{}': {}", path.display(), e);
                    skipped.push(SkippedCandidate {
                        candidate_id: document_id(path),
                        reason: e.to_string(),
                    });
                }
            }
        }

        LoadedBatch { documents, skipped }
    }

    /// Collects supported resume files directly inside a directory, sorted
    /// by path. Subdirectories are not descended into.
    pub async fn discover_resumes(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(ScreenerError::InvalidInput(format!(
                "Resume directory does not exist: {}",
                dir.display()
            )));
        }

        let mut paths = Vec::new();
        let mut entries = fs::read_dir(dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if entry.file_type().await?.is_file() && FileType::from_path(&path).is_supported() {
                paths.push(path);
            }
        }

        paths.sort();
        Ok(paths)
    }
}

impl Default for DocumentLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn document_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, content).await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_load_document_sets_id_and_source() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "job.txt", "Backend engineer").await;

        let loader = DocumentLoader::new();
        let document = loader
            .load_document(&path, DocumentRole::Reference)
            .await
            .unwrap();

        assert_eq!(document.id, "job.txt");
        assert_eq!(document.role, DocumentRole::Reference);
        assert_eq!(document.raw_text, "Backend engineer");
        assert!(document.metadata.source_path.is_some());
    }

    #[tokio::test]
    async fn test_load_candidates_reports_unsupported_files() {
        let dir = tempdir().unwrap();
        let a = write_file(dir.path(), "a.txt", "Python developer").await;
        let b = write_file(dir.path(), "b.md", "# Rust developer").await;
        let c = write_file(dir.path(), "c.xyz", "binary blob").await;

        let loader = DocumentLoader::new();
        let batch = loader.load_candidates(&[a, b, c]).await;

        assert_eq!(batch.documents.len(), 2);
        assert_eq!(batch.documents[0].id, "a.txt");
        assert_eq!(batch.documents[1].id, "b.md");
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].candidate_id, "c.xyz");
        assert!(batch.skipped[0].reason.contains("Unsupported"));
    }

    #[tokio::test]
    async fn test_missing_candidate_becomes_a_skip() {
        let loader = DocumentLoader::new();
        let batch = loader
            .load_candidates(&[PathBuf::from("/nonexistent/ghost.txt")])
            .await;

        assert!(batch.documents.is_empty());
        assert_eq!(batch.skipped.len(), 1);
        assert_eq!(batch.skipped[0].candidate_id, "ghost.txt");
        assert!(batch.skipped[0].reason.contains("does not exist"));
    }

    #[tokio::test]
    async fn test_discover_resumes_filters_and_sorts() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "b.txt", "b").await;
        write_file(dir.path(), "a.md", "a").await;
        write_file(dir.path(), "notes.xyz", "x").await;
        fs::create_dir(dir.path().join("archive")).await.unwrap();

        let loader = DocumentLoader::new();
        let paths = loader.discover_resumes(dir.path()).await.unwrap();

        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.md", "b.txt"]);
    }

    #[tokio::test]
    async fn test_discover_rejects_missing_directory() {
        let loader = DocumentLoader::new();
        let result = loader.discover_resumes(Path::new("/nonexistent/dir")).await;
        assert!(matches!(result, Err(ScreenerError::InvalidInput(_))));
    }
}
