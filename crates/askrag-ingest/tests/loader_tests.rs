use std::io::Write;
use std::path::Path;

use tempfile::TempDir;

use askrag_core::error::Error;
use askrag_ingest::loader;

/// Minimal but well-formed DOCX: a ZIP holding word/document.xml.
fn write_docx(path: &Path, paragraphs: &[&str]) {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t>{p}</w:t></w:r></w:p>"))
        .collect();
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );
    let file = std::fs::File::create(path).expect("create docx");
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    zip.start_file("word/document.xml", options).expect("start entry");
    zip.write_all(xml.as_bytes()).expect("write entry");
    zip.finish().expect("finish docx");
}

#[test]
fn txt_loads_as_one_segment() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("notes.txt");
    std::fs::write(&path, "first paragraph\n\nsecond paragraph").unwrap();

    let segments = loader::load(&path).expect("load txt");
    assert_eq!(segments.len(), 1);
    assert!(segments[0].text.contains("second paragraph"));
    assert_eq!(segments[0].source_path, path.display().to_string());
}

#[test]
fn txt_with_invalid_utf8_falls_back_to_lossy() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("weird.txt");
    std::fs::write(&path, [b'o', b'k', 0xFF, b'!', b'\n']).unwrap();

    let segments = loader::load(&path).expect("load lossy");
    assert_eq!(segments.len(), 1);
    assert!(segments[0].text.starts_with("ok"));
}

#[test]
fn docx_extracts_paragraph_text() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("report.docx");
    write_docx(&path, &["Quarterly revenue grew.", "Costs were flat."]);

    let segments = loader::load(&path).expect("load docx");
    assert_eq!(segments.len(), 1);
    assert_eq!(
        segments[0].text,
        "Quarterly revenue grew.\n\nCosts were flat."
    );
}

#[test]
fn docx_without_document_xml_is_an_extraction_failure() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("hollow.docx");
    let file = std::fs::File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    zip.start_file("unrelated.txt", options).unwrap();
    zip.write_all(b"nothing here").unwrap();
    zip.finish().unwrap();

    let err = loader::load(&path).unwrap_err();
    assert!(matches!(err, Error::EmptyExtraction(_)));
}

#[test]
fn missing_file_is_not_found() {
    let err = loader::load(Path::new("/no/such/file.txt")).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));
}

#[test]
fn unsupported_extension_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("memo.rtf");
    std::fs::write(&path, "{\\rtf1 not supported}").unwrap();

    let err = loader::load(&path).unwrap_err();
    match err {
        Error::UnsupportedFormat(ext) => assert_eq!(ext, ".rtf"),
        other => panic!("expected UnsupportedFormat, got {other}"),
    }
}

#[test]
fn blank_content_yields_zero_segments() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("blank.txt");
    std::fs::write(&path, "   \n\n  ").unwrap();

    let segments = loader::load(&path).expect("load blank");
    assert!(segments.is_empty());
}
