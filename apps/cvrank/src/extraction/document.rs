use std::io::{Cursor, Read};
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractionError;

/// File formats the text extractor understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Result<Self, ExtractionError> {
        let extension = path
            .extension()
            .and_then(|v| v.to_str())
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(DocumentKind::Pdf),
            "docx" => Ok(DocumentKind::Docx),
            "txt" | "md" | "text" => Ok(DocumentKind::PlainText),
            _ => Err(ExtractionError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Reads a resume file and returns its plain text.
///
/// Decoding runs on the blocking pool. A panic inside the PDF library is
/// reported as an `ExtractionError` for this file only.
pub async fn read_document_text(path: &Path) -> Result<String, ExtractionError> {
    read_as(path, DocumentKind::from_path(path)?).await
}

/// Reads a job description file. PDF and DOCX are decoded; any other
/// extension, or none, is read as lossy UTF-8 text.
pub async fn read_job_description_text(path: &Path) -> Result<String, ExtractionError> {
    let kind = DocumentKind::from_path(path).unwrap_or(DocumentKind::PlainText);
    read_as(path, kind).await
}

async fn read_as(path: &Path, kind: DocumentKind) -> Result<String, ExtractionError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|source| ExtractionError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;

    let display = path.display().to_string();
    let text = tokio::task::spawn_blocking(move || decode(kind, &data))
        .await
        .map_err(|e| ExtractionError::Extraction(format!("{display}: decoder crashed: {e}")))?
        .map_err(|e| ExtractionError::Extraction(format!("{display}: {e}")))?;

    if text.trim().is_empty() {
        return Err(ExtractionError::Extraction(format!(
            "{}: document contains no extractable text",
            path.display()
        )));
    }
    Ok(text)
}

fn decode(kind: DocumentKind, data: &[u8]) -> anyhow::Result<String> {
    match kind {
        DocumentKind::Pdf => Ok(pdf_extract::extract_text_from_mem(data)?),
        DocumentKind::Docx => extract_docx_text(data),
        DocumentKind::PlainText => Ok(String::from_utf8_lossy(data).into_owned()),
    }
}

/// Pulls paragraph text out of `word/document.xml`, one paragraph per line.
pub(crate) fn extract_docx_text(data: &[u8]) -> anyhow::Result<String> {
    let cursor = Cursor::new(data);
    let mut archive = zip::ZipArchive::new(cursor)?;

    let mut document_file = archive.by_name("word/document.xml")?;
    let mut xml = String::new();
    document_file.read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut current = String::new();
    let mut lines = Vec::new();
    let mut in_paragraph = false;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:p" => {
                in_paragraph = true;
                current.clear();
            }
            Ok(Event::Empty(e)) if in_paragraph && e.name().as_ref() == b"w:tab" => {
                current.push('\t');
            }
            Ok(Event::End(e)) if e.name().as_ref() == b"w:p" => {
                if !current.trim().is_empty() {
                    lines.push(current.trim().to_string());
                }
                current.clear();
                in_paragraph = false;
            }
            Ok(Event::Text(e)) if in_paragraph => {
                let value = e.xml_content()?.into_owned();
                current.push_str(&value);
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(err.into()),
            _ => {}
        }

        buf.clear();
    }

    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn docx_bytes(document_xml: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file("word/document.xml", options).unwrap();
            writer.write_all(document_xml.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        buf
    }

    #[test]
    fn test_kind_from_extension_is_case_insensitive() {
        assert_eq!(
            DocumentKind::from_path(Path::new("cv/Jane.PDF")).unwrap(),
            DocumentKind::Pdf
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("cv/jane.docx")).unwrap(),
            DocumentKind::Docx
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("jd.txt")).unwrap(),
            DocumentKind::PlainText
        );
    }

    #[test]
    fn test_legacy_doc_is_unsupported() {
        let err = DocumentKind::from_path(Path::new("old.doc")).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_no_extension_is_unsupported() {
        assert!(DocumentKind::from_path(Path::new("README")).is_err());
    }

    #[test]
    fn test_docx_paragraphs_become_lines() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>
<w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p>
<w:p><w:r><w:t>Skills: </w:t></w:r><w:r><w:t>Rust, SQL</w:t></w:r></w:p>
<w:p></w:p>
</w:body>
</w:document>"#;
        let text = extract_docx_text(&docx_bytes(xml)).unwrap();
        assert_eq!(text, "Jane Doe\nSkills: Rust, SQL");
    }

    #[test]
    fn test_docx_without_document_xml_fails() {
        let mut buf = Vec::new();
        {
            let mut writer = zip::ZipWriter::new(Cursor::new(&mut buf));
            let options = zip::write::SimpleFileOptions::default();
            writer.start_file("other.xml", options).unwrap();
            writer.write_all(b"<x/>").unwrap();
            writer.finish().unwrap();
        }
        assert!(extract_docx_text(&buf).is_err());
    }

    #[tokio::test]
    async fn test_missing_file_is_unreadable() {
        let err = read_document_text(Path::new("/definitely/not/here.txt"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Unreadable { .. }));
    }

    #[tokio::test]
    async fn test_empty_text_file_is_extraction_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "   \n").unwrap();
        let err = read_document_text(&path).await.unwrap_err();
        assert!(matches!(err, ExtractionError::Extraction(_)));
    }

    #[tokio::test]
    async fn test_plain_text_is_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.txt");
        std::fs::write(&path, "Jane Doe\nRust engineer").unwrap();
        let text = read_document_text(&path).await.unwrap();
        assert_eq!(text, "Jane Doe\nRust engineer");
    }
}
