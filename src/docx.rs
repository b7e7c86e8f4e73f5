//! Minimal WordprocessingML (.docx) writer.
//!
//! A DOCX file is a ZIP package of XML parts. Only the parts Word needs to open
//! a plain text document are written:
//!
//! - `[Content_Types].xml`
//! - `_rels/.rels`
//! - `word/_rels/document.xml.rels`
//! - `word/styles.xml`
//! - `word/document.xml`
//! - `docProps/core.xml`
//!
//! Every paragraph uses the `Normal` style with a fixed font and size.

use crate::cleaning::sanitize;
use crate::error::{Error, Result};
use quick_xml::escape::escape;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Twips per inch.
const TWIPS_PER_INCH: u32 = 1440;

/// Output document styling.
#[derive(Debug, Clone)]
pub struct DocxConfig {
    /// Font applied to every run
    pub font_name: String,
    /// Font size in points
    pub font_size_pt: f32,
    /// Optional `dc:title` stored in the core properties
    pub title: Option<String>,
    /// Page margin on all four sides, in twips
    pub margin_twips: u32,
}

impl Default for DocxConfig {
    fn default() -> Self {
        Self {
            font_name: "Calibri".to_string(),
            font_size_pt: 11.0,
            title: None,
            margin_twips: TWIPS_PER_INCH,
        }
    }
}

impl DocxConfig {
    /// Create the default configuration (Calibri 11 pt, 1 inch margins).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the document title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Font size in half-points, as stored in `w:sz`.
    pub fn half_points(&self) -> u32 {
        (self.font_size_pt * 2.0).round().max(1.0) as u32
    }
}

/// Writes cleaned text as a DOCX document.
#[derive(Debug, Clone, Default)]
pub struct DocxWriter {
    config: DocxConfig,
}

impl DocxWriter {
    /// Create a writer with the default styling.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom styling.
    pub fn with_config(config: DocxConfig) -> Self {
        Self { config }
    }

    /// Split text into paragraphs on blank lines, dropping empty ones.
    ///
    /// # Examples
    ///
    /// ```
    /// use pdf_article_cleaner::docx::DocxWriter;
    ///
    /// let paras = DocxWriter::paragraphs("First\nline\n\n  \n\nSecond ");
    /// assert_eq!(paras, vec!["First\nline", "Second"]);
    /// ```
    pub fn paragraphs(text: &str) -> Vec<&str> {
        text.split("\n\n")
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect()
    }

    /// Serialize `text` into the bytes of a DOCX package.
    pub fn to_bytes(&self, text: &str) -> Result<Vec<u8>> {
        let document = self.document_xml(&sanitize(text));

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let parts: [(&str, String); 6] = [
            ("[Content_Types].xml", content_types_xml()),
            ("_rels/.rels", package_rels_xml()),
            ("word/_rels/document.xml.rels", document_rels_xml()),
            ("word/styles.xml", self.styles_xml()),
            ("word/document.xml", document),
            ("docProps/core.xml", self.core_xml()),
        ];
        for (name, xml) in parts {
            zip.start_file(name, options)?;
            zip.write_all(xml.as_bytes())?;
        }

        Ok(zip.finish()?.into_inner())
    }

    /// Write `text` to `path` as a DOCX document.
    ///
    /// The package is written to a temporary file in the destination directory
    /// and renamed into place, so a failed write leaves no partial file behind.
    pub fn write_file(&self, text: &str, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let write_error = |reason: String| Error::Write {
            path: path.to_path_buf(),
            reason,
        };

        let bytes = self.to_bytes(text).map_err(|e| write_error(e.to_string()))?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| write_error(e.to_string()))?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| write_error(e.to_string()))?;
        tmp.write_all(&bytes).map_err(|e| write_error(e.to_string()))?;
        tmp.flush().map_err(|e| write_error(e.to_string()))?;
        tmp.persist(path).map_err(|e| write_error(e.error.to_string()))?;

        log::debug!("wrote {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    fn run_properties(&self) -> String {
        let font = escape(self.config.font_name.as_str());
        let size = self.config.half_points();
        format!(
            r#"<w:rPr><w:rFonts w:ascii="{font}" w:hAnsi="{font}" w:eastAsia="{font}" w:cs="{font}"/><w:sz w:val="{size}"/><w:szCs w:val="{size}"/></w:rPr>"#
        )
    }

    pub(crate) fn document_xml(&self, text: &str) -> String {
        let mut xml = String::with_capacity(text.len() * 2 + 512);
        xml.push_str(XML_DECL);
        xml.push_str(&format!(r#"<w:document xmlns:w="{}"><w:body>"#, NS_W));

        let run_props = self.run_properties();
        for paragraph in Self::paragraphs(text) {
            xml.push_str(r#"<w:p><w:pPr><w:pStyle w:val="Normal"/></w:pPr><w:r>"#);
            xml.push_str(&run_props);
            push_run_content(&mut xml, paragraph);
            xml.push_str("</w:r></w:p>");
        }

        let m = self.config.margin_twips;
        xml.push_str(&format!(
            r#"<w:sectPr><w:pgSz w:w="12240" w:h="15840"/><w:pgMar w:top="{m}" w:right="{m}" w:bottom="{m}" w:left="{m}" w:header="720" w:footer="720" w:gutter="0"/></w:sectPr>"#
        ));
        xml.push_str("</w:body></w:document>");
        xml
    }

    fn styles_xml(&self) -> String {
        format!(
            r#"{decl}<w:styles xmlns:w="{ns}"><w:docDefaults><w:rPrDefault>{rpr}</w:rPrDefault></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/>{rpr}</w:style></w:styles>"#,
            decl = XML_DECL,
            ns = NS_W,
            rpr = self.run_properties()
        )
    }

    fn core_xml(&self) -> String {
        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
        let title = self
            .config
            .title
            .as_deref()
            .map(|t| format!("<dc:title>{}</dc:title>", escape(sanitize(t).as_str())))
            .unwrap_or_default();
        format!(
            r#"{XML_DECL}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance">{title}<dc:creator>pdf_article_cleaner</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified></cp:coreProperties>"#
        )
    }
}

/// Emit `w:t` pieces for one paragraph: newlines become `w:br`, tabs `w:tab`.
fn push_run_content(xml: &mut String, paragraph: &str) {
    for (i, line) in paragraph.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        for (j, piece) in line.trim_end_matches('\r').split('\t').enumerate() {
            if j > 0 {
                xml.push_str("<w:tab/>");
            }
            if !piece.is_empty() {
                xml.push_str(r#"<w:t xml:space="preserve">"#);
                xml.push_str(&escape(piece));
                xml.push_str("</w:t>");
            }
        }
    }
}

fn content_types_xml() -> String {
    format!(
        r#"{XML_DECL}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#
    )
}

fn package_rels_xml() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#
    )
}

fn document_rels_xml() -> String {
    format!(
        r#"{XML_DECL}<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#
    )
}
