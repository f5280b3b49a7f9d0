//! XML text escaping and the zip package both Office writers fill.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

use crate::error::Result;

pub const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Escapes markup characters and drops control characters XML 1.0 cannot carry.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' | '\n' | '\r' => out.push(ch),
            c if (c as u32) < 0x20 => {}
            _ => out.push(ch),
        }
    }
    out
}

/// `docProps/core.xml`. No timestamps, so output stays reproducible.
pub fn core_properties_xml(title: Option<&str>) -> String {
    let title = title
        .map(|t| format!("<dc:title>{}</dc:title>", escape_text(t)))
        .unwrap_or_default();
    format!(
        r#"{XML_DECL}
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">{title}<dc:creator>{creator}</dc:creator></cp:coreProperties>"#,
        creator = env!("CARGO_PKG_NAME"),
    )
}

pub const CORE_PROPERTIES_REL: &str =
    "http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties";
pub const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
pub const HYPERLINK_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";
pub const IMAGE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";

/// Package-level `_rels/.rels` pointing at the main part and the core properties.
pub fn package_rels_xml(main_part: &str) -> String {
    format!(
        r#"{XML_DECL}
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="{OFFICE_DOCUMENT_REL}" Target="{main_part}"/>
  <Relationship Id="rId2" Type="{CORE_PROPERTIES_REL}" Target="docProps/core.xml"/>
</Relationships>"#
    )
}

/// In-memory zip archive with fixed timestamps, so equal input gives equal bytes.
pub struct Package {
    zip: ZipWriter<Cursor<Vec<u8>>>,
    opts: SimpleFileOptions,
}

impl Package {
    pub fn new() -> Self {
        Self {
            zip: ZipWriter::new(Cursor::new(Vec::new())),
            opts: SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .last_modified_time(DateTime::default()),
        }
    }

    pub fn add(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.zip.start_file(name, self.opts)?;
        self.zip.write_all(data)?;
        Ok(())
    }

    pub fn finish(self) -> Result<Vec<u8>> {
        let cursor = self.zip.finish()?;
        Ok(cursor.into_inner())
    }
}

impl Default for Package {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn escapes_markup_and_drops_controls() {
        assert_eq!(escape_text("a<b & 'c'\u{1}\n"), "a&lt;b &amp; &apos;c&apos;\n");
    }

    #[test]
    fn core_properties_carry_the_title() {
        let xml = core_properties_xml(Some("Q&A"));
        assert!(xml.contains("<dc:title>Q&amp;A</dc:title>"));
        assert!(!core_properties_xml(None).contains("dc:title"));
    }

    #[test]
    fn package_round_trips_through_zip() {
        let mut pkg = Package::new();
        pkg.add("a/b.xml", b"<x/>").unwrap();
        let bytes = pkg.finish().unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut s = String::new();
        archive.by_name("a/b.xml").unwrap().read_to_string(&mut s).unwrap();
        assert_eq!(s, "<x/>");
    }
}
