//! Extension-dispatched document loading.
//!
//! `.txt` and `.docx` yield one segment per file, `.pdf` one per page.
//! Upload-side validation restricts what arrives here, but the loader
//! still classifies anything else as `UnsupportedFormat`.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use askrag_core::error::{Error, Result};

pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["pdf", "docx", "txt"];

/// One contiguous span of raw text extracted from a source file, before
/// chunking.
#[derive(Debug, Clone)]
pub struct RawSegment {
    pub text: String,
    pub source_path: String,
}

/// Load a document into ordered raw segments, dispatching on the file
/// extension. Blank segments (empty PDF pages and the like) are dropped.
pub fn load(path: &Path) -> Result<Vec<RawSegment>> {
    if !path.exists() {
        return Err(Error::NotFound(path.display().to_string()));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(Error::UnsupportedFormat(format!(".{ext}")));
    }
    let segments = match ext.as_str() {
        "pdf" => load_pdf(path)?,
        "docx" => load_docx(path)?,
        _ => load_txt(path)?,
    };
    let segments: Vec<RawSegment> = segments
        .into_iter()
        .filter(|s| !s.text.trim().is_empty())
        .collect();
    debug!("loaded {} segments from {}", segments.len(), path.display());
    Ok(segments)
}

fn load_txt(path: &Path) -> Result<Vec<RawSegment>> {
    // Reread lossily when the file is not valid UTF-8.
    let text = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => {
            let bytes = std::fs::read(path)
                .map_err(|e| Error::EmptyExtraction(format!("{}: {e}", path.display())))?;
            String::from_utf8_lossy(&bytes).to_string()
        }
    };
    Ok(vec![RawSegment {
        text,
        source_path: path.display().to_string(),
    }])
}

fn load_pdf(path: &Path) -> Result<Vec<RawSegment>> {
    let text = pdf_extract::extract_text(path)
        .map_err(|e| Error::EmptyExtraction(format!("{}: {e}", path.display())))?;
    let source_path = path.display().to_string();
    // pdf-extract separates pages with form feeds
    Ok(text
        .split('\x0c')
        .map(|page| RawSegment {
            text: page.to_string(),
            source_path: source_path.clone(),
        })
        .collect())
}

/// Extract the text runs of `word/document.xml`, one paragraph per `<w:p>`.
fn load_docx(path: &Path) -> Result<Vec<RawSegment>> {
    let file = std::fs::File::open(path)
        .map_err(|e| Error::EmptyExtraction(format!("{}: {e}", path.display())))?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| Error::EmptyExtraction(format!("{}: not a DOCX archive: {e}", path.display())))?;

    let mut doc_xml = String::new();
    {
        let mut entry = archive.by_name("word/document.xml").map_err(|_| {
            Error::EmptyExtraction(format!("{}: missing word/document.xml", path.display()))
        })?;
        entry
            .read_to_string(&mut doc_xml)
            .map_err(|e| Error::EmptyExtraction(format!("{}: {e}", path.display())))?;
    }

    let mut reader = quick_xml::Reader::from_str(&doc_xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut paragraph = String::new();
    let mut in_text = false;
    loop {
        match reader.read_event() {
            Ok(quick_xml::events::Event::Start(ref e)) => match e.local_name().as_ref() {
                b"p" => paragraph.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Ok(quick_xml::events::Event::Empty(ref e)) => {
                // self-closing elements carry no text run
                if e.local_name().as_ref() == b"p" {
                    paragraph.clear();
                }
            }
            Ok(quick_xml::events::Event::End(ref e)) => match e.local_name().as_ref() {
                b"p" => {
                    if !paragraph.is_empty() {
                        paragraphs.push(std::mem::take(&mut paragraph));
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Ok(quick_xml::events::Event::Text(ref e)) => {
                if in_text {
                    if let Ok(text) = e.unescape() {
                        paragraph.push_str(&text);
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => {
                return Err(Error::EmptyExtraction(format!(
                    "{}: malformed document.xml: {e}",
                    path.display()
                )))
            }
            _ => {}
        }
    }

    Ok(vec![RawSegment {
        text: paragraphs.join("\n\n"),
        source_path: path.display().to_string(),
    }])
}
