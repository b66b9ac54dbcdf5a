use std::io::{Cursor, Write};

use async_trait::async_trait;
use epublinks::{Fetch, FetchError};
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

pub fn section(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<!DOCTYPE html>
<html xmlns="http://www.w3.org/1999/xhtml">
<head><title>Section</title></head>
<body>
{body}
</body>
</html>"#
    )
}

/// Build an EPUB-shaped archive: `mimetype` stored first, then `entries`
/// deflated in the given order.
pub fn epub(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    writer.start_file("mimetype", stored).unwrap();
    writer.write_all(b"application/epub+zip").unwrap();

    for (name, content) in entries {
        writer.start_file(*name, deflated).unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }

    writer.finish().unwrap().into_inner()
}

/// A small book with three sections, a stylesheet and a navigation document.
pub fn sample_book() -> Vec<u8> {
    epub(&[
        (
            "OEBPS/content.opf",
            r#"<package><manifest><item href="Text/Section0001.xhtml"/></manifest></package>"#,
        ),
        (
            "OEBPS/Text/Section0001.xhtml",
            &section(
                r#"<p><a href="https://en.wikipedia.org/wiki/Information">Information</a>
<a href="https://example.org/one">one</a></p>"#,
            ),
        ),
        ("OEBPS/Styles/style.css", "a { color: blue; }"),
        (
            "OEBPS/Text/Section0002.xhtml",
            &section(r#"<p>No links here, only <a id="target">a target</a>.</p>"#),
        ),
        (
            "OEBPS/Text/Section0003.xhtml",
            &section(
                r#"<ol><li><a href="https://example.org/one">again</a></li>
<li><a href="Section0001.xhtml#top">back</a></li></ol>"#,
            ),
        ),
        (
            "OEBPS/Text/nav.xhtml",
            &section(r#"<nav><a href="Section0001.xhtml">Start</a></nav>"#),
        ),
    ])
}

pub const SAMPLE_BOOK_LINKS: [&str; 4] = [
    "https://en.wikipedia.org/wiki/Information",
    "https://example.org/one",
    "https://example.org/one",
    "Section0001.xhtml#top",
];

/// Serves one fixed body, or a 404 for any other URL.
pub struct FakeFetcher {
    pub url: String,
    pub body: Vec<u8>,
}

#[async_trait]
impl Fetch for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        if url == self.url {
            Ok(self.body.clone())
        } else {
            Err(FetchError::Status {
                url: url.to_string(),
                status: reqwest::StatusCode::NOT_FOUND,
            })
        }
    }
}
