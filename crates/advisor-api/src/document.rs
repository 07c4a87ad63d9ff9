//! Documents selected for upload.

use std::path::Path;

use crate::error::ApiResult;

/// The only document type the service parses.
pub const PDF_MIME: &str = "application/pdf";

/// A file read from disk, ready to be sent as a multipart `file` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl Document {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for(&file_name).to_string();
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    /// Read a document from disk. The MIME type follows the extension.
    pub fn from_path(path: impl AsRef<Path>) -> ApiResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(file_name, bytes))
    }

    pub fn is_pdf(&self) -> bool {
        self.mime == PDF_MIME
    }

    pub fn size_display(&self) -> String {
        let bytes = self.bytes.len() as f64;
        if bytes < 1024.0 {
            format!("{} B", self.bytes.len())
        } else if bytes < 1024.0 * 1024.0 {
            format!("{:.1} KB", bytes / 1024.0)
        } else {
            format!("{:.1} MB", bytes / (1024.0 * 1024.0))
        }
    }
}

/// MIME type for a file name, judged by extension the way a browser file
/// picker does.
pub fn mime_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => PDF_MIME,
        "txt" => "text/plain",
        "md" => "text/markdown",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "html" | "htm" => "text/html",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_mime_by_extension() {
        assert_eq!(mime_for("syllabus.pdf"), PDF_MIME);
        assert_eq!(mime_for("SYLLABUS.PDF"), PDF_MIME);
        assert_eq!(mime_for("notes.txt"), "text/plain");
        assert_eq!(mime_for("no_extension"), "application/octet-stream");
        assert_eq!(mime_for("archive.pdf.zip"), "application/octet-stream");
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cs5187.pdf");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"%PDF-1.4 test").unwrap();

        let doc = Document::from_path(&path).unwrap();
        assert_eq!(doc.file_name, "cs5187.pdf");
        assert!(doc.is_pdf());
        assert_eq!(doc.bytes, b"%PDF-1.4 test");
        assert_eq!(doc.size_display(), "13 B");
    }

    #[test]
    fn test_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = Document::from_path(dir.path().join("missing.pdf"));
        assert!(matches!(result, Err(crate::RequestError::Io(_))));
    }

    #[test]
    fn test_non_pdf_document() {
        let doc = Document::new("essay.docx", vec![1, 2, 3]);
        assert!(!doc.is_pdf());
    }
}
