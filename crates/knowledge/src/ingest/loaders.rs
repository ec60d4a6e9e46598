//! Per-format document loaders.
//!
//! Each loader turns a file into plain-text passages. JSON book catalogues
//! come out pre-chunked (one passage per book); every other format yields a
//! single passage that is split afterwards.

use docqa_core::{AppError, AppResult};
use scraper::{ElementRef, Html};
use serde::Deserialize;
use std::path::Path;

use crate::topic::extension_of;

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Text,
    Html,
    Json,
}

impl DocumentFormat {
    /// Format from a file name's extension (case-insensitive).
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        match extension_of(file_name).as_deref() {
            Some(".pdf") => Some(Self::Pdf),
            Some(".txt") => Some(Self::Text),
            Some(".html") => Some(Self::Html),
            Some(".json") => Some(Self::Json),
            _ => None,
        }
    }

    /// Whether passages still need to go through the text splitter.
    pub fn needs_splitting(&self) -> bool {
        !matches!(self, Self::Json)
    }
}

/// Text extracted from one document.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedDocument {
    pub source: String,
    pub format: DocumentFormat,
    pub passages: Vec<String>,
}

/// Load a document from disk.
///
/// Returns `Ok(None)` for unsupported formats.
pub fn load_document(path: &Path) -> AppResult<Option<LoadedDocument>> {
    let source = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| AppError::Knowledge(format!("Not a file: {:?}", path)))?;

    let Some(format) = DocumentFormat::from_file_name(&source) else {
        return Ok(None);
    };

    let passages = match format {
        DocumentFormat::Pdf => vec![load_pdf(path)?],
        DocumentFormat::Text => vec![read_utf8(path)?],
        DocumentFormat::Html => vec![html_to_text(&read_utf8(path)?)],
        DocumentFormat::Json => book_passages(&read_utf8(path)?)?,
    };

    Ok(Some(LoadedDocument {
        source,
        format,
        passages,
    }))
}

fn read_utf8(path: &Path) -> AppResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| AppError::Knowledge(format!("Failed to read {:?}: {}", path, e)))
}

/// `pdf-extract` panics on some malformed documents, so a panic is turned
/// into an error like any other extraction failure.
fn load_pdf(path: &Path) -> AppResult<String> {
    match std::panic::catch_unwind(|| pdf_extract::extract_text(path)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(AppError::Knowledge(format!(
            "Failed to extract PDF text from {:?}: {}",
            path, e
        ))),
        Err(payload) => Err(AppError::Knowledge(format!(
            "PDF extractor aborted on {:?}: {}",
            path,
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Visible text of an HTML document, with scripts and styles removed.
pub fn html_to_text(raw: &str) -> String {
    let document = Html::parse_document(raw);
    let mut text = String::new();
    collect_text(&document.root_element(), &mut text);

    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn collect_text(element: &ElementRef<'_>, out: &mut String) {
    for node in element.children() {
        if let Some(child) = ElementRef::wrap(node) {
            let tag = child.value().name();
            if matches!(tag, "script" | "style" | "noscript" | "template") {
                continue;
            }

            let block = matches!(
                tag,
                "p" | "div" | "section" | "article" | "br" | "li" | "tr" | "title"
                    | "h1" | "h2" | "h3" | "h4" | "h5" | "h6"
            );
            if block && !out.ends_with('\n') {
                out.push('\n');
            }

            collect_text(&child, out);

            if block {
                out.push('\n');
            }
        } else if let Some(text) = node.value().as_text() {
            out.push_str(text);
        }
    }
}

#[derive(Debug, Deserialize)]
struct Catalogue {
    books: Vec<Book>,
}

#[derive(Debug, Deserialize)]
struct Book {
    title: String,
    author: String,
    genre: String,
    publication_year: serde_json::Value,
    description: String,
    reviews: Reviews,
}

#[derive(Debug, Deserialize)]
struct Reviews {
    positive: String,
    negative: String,
}

/// One passage per book in a `{"books": [...]}` catalogue.
pub fn book_passages(raw: &str) -> AppResult<Vec<String>> {
    let catalogue: Catalogue = serde_json::from_str(raw)
        .map_err(|e| AppError::Knowledge(format!("Invalid book catalogue: {}", e)))?;

    Ok(catalogue
        .books
        .iter()
        .map(|book| {
            let year = match &book.publication_year {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };

            format!(
                "Title: {}\nAuthor: {}\nGenre: {}\nPublication Year: {}\nDescription: {}\nPositive Review: {}\nNegative Review: {}",
                book.title,
                book.author,
                book.genre,
                year,
                book.description,
                book.reviews.positive,
                book.reviews.negative
            )
        })
        .collect())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tempfile::TempDir;

    /// A structurally valid one-page PDF whose content stream selects a
    /// font (`/F1`) that the page resources never declare.
    pub(crate) fn pdf_with_undeclared_font() -> Vec<u8> {
        let content = "BT /F1 12 Tf 72 720 Td (Hello) Tj ET";
        let objects = [
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            "<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_string(),
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] /Resources << >> /Contents 4 0 R >>"
                .to_string(),
            format!(
                "<< /Length {} >>\nstream\n{}\nendstream",
                content.len(),
                content
            ),
        ];

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::new();
        for (i, body) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", i + 1, body).as_bytes());
        }

        let xref_at = pdf.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
        for offset in offsets {
            xref.push_str(&format!("{:010} 00000 n \n", offset));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%EOF\n",
            objects.len() + 1,
            xref_at
        ));
        pdf.extend_from_slice(xref.as_bytes());
        pdf
    }

    const CATALOGUE: &str = r#"{
        "books": [
            {
                "title": "The Road",
                "author": "Cormac McCarthy",
                "genre": "Post-apocalyptic",
                "publication_year": 2006,
                "description": "A father and son walk through a burned America.",
                "reviews": {"positive": "Devastating and tender.", "negative": "Relentlessly bleak."}
            },
            {
                "title": "Gilead",
                "author": "Marilynne Robinson",
                "genre": "Literary fiction",
                "publication_year": "2004",
                "description": "A dying pastor writes to his young son.",
                "reviews": {"positive": "Luminous.", "negative": "Slow."}
            }
        ]
    }"#;

    #[test]
    fn test_format_detection() {
        assert_eq!(DocumentFormat::from_file_name("a.PDF"), Some(DocumentFormat::Pdf));
        assert_eq!(DocumentFormat::from_file_name("b.txt"), Some(DocumentFormat::Text));
        assert_eq!(DocumentFormat::from_file_name("c.html"), Some(DocumentFormat::Html));
        assert_eq!(DocumentFormat::from_file_name("d.json"), Some(DocumentFormat::Json));
        assert_eq!(DocumentFormat::from_file_name("e.docx"), None);
        assert!(!DocumentFormat::Json.needs_splitting());
        assert!(DocumentFormat::Html.needs_splitting());
    }

    #[test]
    fn test_book_passages() {
        let passages = book_passages(CATALOGUE).unwrap();
        assert_eq!(passages.len(), 2);
        assert_eq!(
            passages[0],
            "Title: The Road\nAuthor: Cormac McCarthy\nGenre: Post-apocalyptic\nPublication Year: 2006\nDescription: A father and son walk through a burned America.\nPositive Review: Devastating and tender.\nNegative Review: Relentlessly bleak."
        );
        assert!(passages[1].contains("Publication Year: 2004\n"));
    }

    #[test]
    fn test_book_catalogue_requires_books_array() {
        assert!(book_passages(r#"{"items": []}"#).is_err());
    }

    #[test]
    fn test_html_strips_scripts_and_styles() {
        let html = r#"<html><head><title>Climate</title><style>p { color: red; }</style></head>
            <body><h1>Ocean warming</h1><script>track("view");</script>
            <p>Coral   reefs bleach when
            water warms.</p><ul><li>Heat</li><li>Acidity</li></ul></body></html>"#;

        let text = html_to_text(html);
        assert_eq!(
            text,
            "Climate\nOcean warming\nCoral reefs bleach when\nwater warms.\nHeat\nAcidity"
        );
        assert!(!text.contains("track"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_load_document_by_format() {
        let temp = TempDir::new().unwrap();
        let txt = temp.path().join("inventors.txt");
        std::fs::write(&txt, "Nikola Tesla was born in 1856.").unwrap();
        let json = temp.path().join("data.json");
        std::fs::write(&json, CATALOGUE).unwrap();
        let other = temp.path().join("notes.md");
        std::fs::write(&other, "# ignored").unwrap();

        let doc = load_document(&txt).unwrap().unwrap();
        assert_eq!(doc.source, "inventors.txt");
        assert_eq!(doc.format, DocumentFormat::Text);
        assert_eq!(doc.passages, vec!["Nikola Tesla was born in 1856.".to_string()]);

        let doc = load_document(&json).unwrap().unwrap();
        assert_eq!(doc.passages.len(), 2);

        assert!(load_document(&other).unwrap().is_none());
    }

    #[test]
    fn test_broken_pdf_is_an_error() {
        let temp = TempDir::new().unwrap();
        let pdf = temp.path().join("broken.pdf");
        std::fs::write(&pdf, b"not really a pdf").unwrap();

        assert!(load_document(&pdf).is_err());
    }

    #[test]
    fn test_pdf_with_undeclared_font_is_an_error() {
        let temp = TempDir::new().unwrap();
        let pdf = temp.path().join("paper.pdf");
        std::fs::write(&pdf, pdf_with_undeclared_font()).unwrap();

        let err = load_document(&pdf).unwrap_err();
        assert!(matches!(err, AppError::Knowledge(_)));
    }
}
