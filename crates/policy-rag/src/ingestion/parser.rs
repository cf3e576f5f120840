//! Text extraction from uploaded files

use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

use crate::error::{Error, Result};
use crate::types::FileFormat;

/// Plain text pulled out of an uploaded file
#[derive(Debug, Clone)]
pub struct ExtractedText {
    pub text: String,
    pub format: FileFormat,
}

/// File-format text extraction capability
///
/// Fails with `UnsupportedFormat` when the type cannot be parsed at all and
/// `ExtractionFailed` when the content is malformed.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract_text(&self, data: &[u8], filename: &str) -> Result<ExtractedText>;
}

/// Extension-based parser for PDF, DOCX, text and markdown
#[derive(Debug, Clone, Copy, Default)]
pub struct FileParser;

impl FileParser {
    /// Parse a file based on its extension (blocking)
    pub fn parse(filename: &str, data: &[u8]) -> Result<ExtractedText> {
        let format = FileFormat::from_filename(filename);

        let raw = match format {
            FileFormat::Pdf => Self::parse_pdf(filename, data)?,
            FileFormat::Docx => Self::parse_docx(filename, data)?,
            FileFormat::Txt | FileFormat::Markdown => String::from_utf8_lossy(data).into_owned(),
            FileFormat::Unknown => {
                let extension = filename
                    .rsplit_once('.')
                    .map(|(_, ext)| ext.to_lowercase())
                    .unwrap_or_else(|| "(none)".to_string());
                return Err(Error::UnsupportedFormat(format!(
                    "'{}' (extension {}); upload a PDF, DOCX, TXT or MD file",
                    filename, extension
                )));
            }
        };

        Ok(ExtractedText {
            text: cleanup_text(&raw),
            format,
        })
    }

    #[cfg(feature = "pdf")]
    fn parse_pdf(filename: &str, data: &[u8]) -> Result<String> {
        pdf_extract::extract_text_from_mem(data)
            .map_err(|e| Error::extraction(filename, e.to_string()))
    }

    #[cfg(not(feature = "pdf"))]
    fn parse_pdf(filename: &str, _data: &[u8]) -> Result<String> {
        Err(Error::UnsupportedFormat(format!(
            "'{}' (PDF support not compiled in)",
            filename
        )))
    }

    #[cfg(feature = "docx")]
    fn parse_docx(filename: &str, data: &[u8]) -> Result<String> {
        let doc = docx_rs::read_docx(data).map_err(|e| Error::extraction(filename, e.to_string()))?;

        let mut content = String::new();
        for child in doc.document.children {
            match child {
                docx_rs::DocumentChild::Paragraph(p) => {
                    push_paragraph(&mut content, &p);
                    content.push('\n');
                }
                docx_rs::DocumentChild::Table(table) => {
                    for docx_rs::TableChild::TableRow(row) in table.rows {
                        let mut cells = Vec::new();
                        for docx_rs::TableRowChild::TableCell(cell) in row.cells {
                            let mut cell_text = String::new();
                            for child in cell.children {
                                if let docx_rs::TableCellContent::Paragraph(p) = child {
                                    push_paragraph(&mut cell_text, &p);
                                }
                            }
                            cells.push(cell_text.trim().to_string());
                        }
                        content.push_str(&cells.join(" | "));
                        content.push('\n');
                    }
                }
                _ => {}
            }
        }

        Ok(content)
    }

    #[cfg(not(feature = "docx"))]
    fn parse_docx(filename: &str, _data: &[u8]) -> Result<String> {
        Err(Error::UnsupportedFormat(format!(
            "'{}' (DOCX support not compiled in)",
            filename
        )))
    }
}

#[cfg(feature = "docx")]
fn push_paragraph(out: &mut String, paragraph: &docx_rs::Paragraph) {
    for child in &paragraph.children {
        if let docx_rs::ParagraphChild::Run(run) = child {
            for child in &run.children {
                if let docx_rs::RunChild::Text(t) = child {
                    out.push_str(&t.text);
                }
            }
        }
    }
}

#[async_trait]
impl TextExtractor for FileParser {
    async fn extract_text(&self, data: &[u8], filename: &str) -> Result<ExtractedText> {
        let data = data.to_vec();
        parse_blocking(filename, move |name| Self::parse(name, &data)).await
    }
}

/// Run a blocking parse off the async runtime
///
/// A panic inside the parser is reported as `ExtractionFailed` for `filename`.
async fn parse_blocking<F>(filename: &str, parse: F) -> Result<ExtractedText>
where
    F: FnOnce(&str) -> Result<ExtractedText> + Send + 'static,
{
    let name = filename.to_string();
    match tokio::task::spawn_blocking(move || parse(&name)).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => {
            tracing::error!("Parser crashed on '{}'", filename);
            Err(Error::extraction(filename, "parser crashed"))
        }
        Err(e) => Err(Error::internal(format!("Extraction task failed: {}", e))),
    }
}

fn blank_run_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("valid blank-line regex"))
}

/// Normalize extracted text: drop NULs, trailing spaces and long blank runs
fn cleanup_text(text: &str) -> String {
    let text = text.replace('\0', "").replace("\r\n", "\n");
    let trimmed = text
        .lines()
        .map(|l| l.trim_end())
        .collect::<Vec<_>>()
        .join("\n");
    blank_run_regex()
        .replace_all(&trimmed, "\n\n")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passthrough() {
        let parsed = FileParser::parse("policy.txt", b"Deductible: $500\n").unwrap();
        assert_eq!(parsed.text, "Deductible: $500");
        assert_eq!(parsed.format, FileFormat::Txt);
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let result = FileParser::parse("claims.xlsx", b"whatever");
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));

        let result = FileParser::parse("no_extension", b"whatever");
        assert!(matches!(result, Err(Error::UnsupportedFormat(_))));
    }

    #[cfg(feature = "pdf")]
    #[test]
    fn test_malformed_pdf_is_extraction_failure() {
        let result = FileParser::parse("broken.pdf", b"this is not a pdf");
        assert!(matches!(result, Err(Error::ExtractionFailed { .. })));
    }

    #[cfg(feature = "docx")]
    #[test]
    fn test_malformed_docx_is_extraction_failure() {
        let result = FileParser::parse("broken.docx", b"PK-not-really-a-zip");
        assert!(matches!(result, Err(Error::ExtractionFailed { .. })));
    }

    #[test]
    fn test_cleanup_collapses_blank_runs() {
        let cleaned = cleanup_text("a  \r\n\n\n\n\nb\0c\n\n  ");
        assert_eq!(cleaned, "a\n\nbc");
    }

    #[test]
    fn test_whitespace_only_cleans_to_empty() {
        let parsed = FileParser::parse("blank.md", b"  \n\n\t\n").unwrap();
        assert!(parsed.text.is_empty());
    }

    #[tokio::test]
    async fn test_extractor_trait_runs_off_thread() {
        let parsed = FileParser
            .extract_text(b"Rental reimbursement is not covered.", "terms.md")
            .await
            .unwrap();
        assert_eq!(parsed.format, FileFormat::Markdown);
        assert!(parsed.text.contains("Rental"));
    }

    #[tokio::test]
    async fn test_parser_panic_is_extraction_failure() {
        let result = parse_blocking("fonts.pdf", |_| -> Result<ExtractedText> {
            panic!("unexpected glyph table")
        })
        .await;

        match result {
            Err(Error::ExtractionFailed { filename, .. }) => assert_eq!(filename, "fonts.pdf"),
            other => panic!("expected extraction failure, got {:?}", other),
        }
    }
}
