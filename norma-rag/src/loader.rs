//! Loading of source PDF documents from a directory.
//!
//! Text extraction is delegated to the `pdf-extract` crate and treated as
//! opaque: whatever page text it yields becomes the document body. A
//! document that cannot be extracted is skipped with a warning; ingestion
//! never aborts for a single bad file.

use std::path::Path;

use tracing::{info, warn};

use crate::document::Document;
use crate::error::{AssistantError, Result};

/// Load every readable PDF in `dir` as a [`Document`].
///
/// Files are visited in filename order so ingestion (and therefore index
/// layout) is deterministic. The document id is the filename including its
/// extension, which is the citation identity shown to the user.
///
/// Returns the loaded documents and the number of skipped files.
///
/// # Errors
///
/// Returns [`AssistantError::Ingestion`] if `dir` cannot be read or if no
/// document could be loaded at all.
pub fn load_directory(dir: &Path) -> Result<(Vec<Document>, usize)> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        AssistantError::Ingestion(format!("cannot read document directory '{}': {e}", dir.display()))
    })?;

    let mut pdf_paths: Vec<_> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
        })
        .collect();
    pdf_paths.sort();

    if pdf_paths.is_empty() {
        return Err(AssistantError::Ingestion(format!(
            "no PDF documents found in '{}'",
            dir.display()
        )));
    }

    let mut documents = Vec::new();
    let mut skipped = 0;

    for path in &pdf_paths {
        let Some(filename) = path.file_name().and_then(|n| n.to_str()) else {
            warn!(path = %path.display(), "skipping file with non-UTF-8 name");
            skipped += 1;
            continue;
        };

        match pdf_extract::extract_text(path) {
            Ok(text) if !text.trim().is_empty() => {
                info!(document.id = filename, chars = text.len(), "loaded document");
                documents.push(Document::new(filename, text));
            }
            Ok(_) => {
                warn!(document.id = filename, "skipping document with no extractable text");
                skipped += 1;
            }
            Err(e) => {
                warn!(document.id = filename, error = %e, "skipping unreadable document");
                skipped += 1;
            }
        }
    }

    if documents.is_empty() {
        return Err(AssistantError::Ingestion(format!(
            "all {} PDF documents in '{}' failed to load",
            pdf_paths.len(),
            dir.display()
        )));
    }

    Ok((documents, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_is_an_ingestion_error() {
        let result = load_directory(Path::new("/nonexistent/norma/docs"));
        assert!(matches!(result, Err(AssistantError::Ingestion(_))));
    }

    #[test]
    fn directory_without_pdfs_is_an_ingestion_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notas.txt"), "não é pdf").unwrap();
        let result = load_directory(dir.path());
        assert!(matches!(result, Err(AssistantError::Ingestion(_))));
    }

    #[test]
    fn corrupt_pdf_alone_is_an_ingestion_error_not_a_panic() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("corrompido.pdf"), b"not a real pdf").unwrap();
        let result = load_directory(dir.path());
        // The single document fails extraction, is skipped, and the
        // all-documents-failed condition surfaces.
        assert!(matches!(result, Err(AssistantError::Ingestion(_))));
    }
}
