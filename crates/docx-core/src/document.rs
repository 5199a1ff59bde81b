//! The in-memory document: package parts plus the parsed body model

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::paragraph::{Paragraph, Run};
use crate::reader::parse_document_xml;
use crate::table::Table;
use crate::writer;
use crate::{DocxError, Result};

const DOCUMENT_PART: &str = "word/document.xml";

/// A body-level block
#[derive(Debug, Clone)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

/// An in-memory .docx package.
///
/// Opening never touches the source bytes again: all mutation happens on the
/// parsed body model, and `save` re-serializes it into a fresh package while
/// carrying every other part (styles, settings, themes) over unchanged.
#[derive(Debug, Clone)]
pub struct DocxDocument {
    blocks: Vec<Block>,
    sect_props: Option<String>,
    root_attrs: Option<String>,
    parts: BTreeMap<String, Vec<u8>>,
}

impl Default for DocxDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl DocxDocument {
    /// An empty document with a minimal part set (Times New Roman 11pt
    /// defaults, A4 contract margins)
    pub fn new() -> Self {
        let mut parts = BTreeMap::new();
        parts.insert(
            "[Content_Types].xml".to_string(),
            writer::CONTENT_TYPES.as_bytes().to_vec(),
        );
        parts.insert(
            "_rels/.rels".to_string(),
            writer::PACKAGE_RELS.as_bytes().to_vec(),
        );
        parts.insert(
            "word/_rels/document.xml.rels".to_string(),
            writer::DOCUMENT_RELS.as_bytes().to_vec(),
        );
        parts.insert(
            "word/styles.xml".to_string(),
            writer::STYLES.as_bytes().to_vec(),
        );

        Self {
            blocks: Vec::new(),
            sect_props: None,
            root_attrs: None,
            parts,
        }
    }

    /// Open a package from bytes
    pub fn open(bytes: &[u8]) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut parts = BTreeMap::new();

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            if entry.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            parts.insert(entry.name().to_string(), data);
        }

        let document_xml = parts
            .get(DOCUMENT_PART)
            .ok_or_else(|| DocxError::MissingPart(DOCUMENT_PART.to_string()))?;
        let document_xml = std::str::from_utf8(document_xml)
            .map_err(|e| DocxError::Parse(e.to_string()))?
            .to_string();

        let body = parse_document_xml(&document_xml)?;

        Ok(Self {
            blocks: body.blocks,
            sect_props: body.sect_props,
            root_attrs: body.root_attrs,
            parts,
        })
    }

    /// Serialize the package to bytes
    pub fn save(&self) -> Result<Vec<u8>> {
        let document_xml = writer::document_xml(self);

        let mut cursor = Cursor::new(Vec::new());
        let mut archive = ZipWriter::new(&mut cursor);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, data) in &self.parts {
            archive.start_file(name.as_str(), options)?;
            if name == DOCUMENT_PART {
                archive.write_all(document_xml.as_bytes())?;
            } else {
                archive.write_all(data)?;
            }
        }
        // A freshly built document has no document.xml part entry yet
        if !self.parts.contains_key(DOCUMENT_PART) {
            archive.start_file(DOCUMENT_PART, options)?;
            archive.write_all(document_xml.as_bytes())?;
        }

        archive.finish()?;
        Ok(cursor.into_inner())
    }

    pub fn add_paragraph(&mut self, paragraph: Paragraph) -> &mut Self {
        self.blocks.push(Block::Paragraph(paragraph));
        self
    }

    pub fn add_table(&mut self, table: Table) -> &mut Self {
        self.blocks.push(Block::Table(table));
        self
    }

    pub fn add_page_break(&mut self) -> &mut Self {
        self.add_paragraph(Paragraph::new().add_run(Run::page_break()))
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Body-level paragraphs, in document order
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    pub fn tables_mut(&mut self) -> impl Iterator<Item = &mut Table> {
        self.blocks.iter_mut().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    /// Replace placeholders in every body paragraph and, recursively, in
    /// every paragraph of every cell of every table
    pub fn replace_placeholders(&mut self, replacements: &[(String, String)]) {
        for block in &mut self.blocks {
            match block {
                Block::Paragraph(paragraph) => paragraph.replace_placeholders(replacements),
                Block::Table(table) => {
                    for row in &mut table.rows {
                        for cell in &mut row.cells {
                            for paragraph in &mut cell.paragraphs {
                                paragraph.replace_placeholders(replacements);
                            }
                        }
                    }
                }
            }
        }
    }

    /// All document text (body paragraphs and table cells), newline-joined
    pub fn body_text(&self) -> String {
        let mut lines = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(paragraph) => lines.push(paragraph.text()),
                Block::Table(table) => {
                    for row in &table.rows {
                        for cell in &row.cells {
                            lines.push(cell.text());
                        }
                    }
                }
            }
        }
        lines.join("\n")
    }

    pub(crate) fn sect_props(&self) -> Option<&str> {
        self.sect_props.as_deref()
    }

    pub(crate) fn root_attrs(&self) -> Option<&str> {
        self.root_attrs.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{TableCell, TableRow};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_roundtrip_paragraph_text() {
        let mut doc = DocxDocument::new();
        doc.add_paragraph(Paragraph::with_text("Договор возмездного оказания услуг"));
        let bytes = doc.save().unwrap();

        let reopened = DocxDocument::open(&bytes).unwrap();
        let texts: Vec<String> = reopened.paragraphs().map(|p| p.text()).collect();
        assert_eq!(texts, vec!["Договор возмездного оказания услуг".to_string()]);
    }

    #[test]
    fn test_roundtrip_table() {
        let mut doc = DocxDocument::new();
        doc.add_table(
            Table::new(vec![567, 4536])
                .bordered()
                .add_row(TableRow::new(vec![
                    TableCell::with_text("1."),
                    TableCell::with_text("Консультация"),
                ])),
        );
        let bytes = doc.save().unwrap();

        let reopened = DocxDocument::open(&bytes).unwrap();
        let table = reopened.tables().next().unwrap();
        assert_eq!(table.grid, vec![567, 4536]);
        assert_eq!(table.rows[0].cells[1].text(), "Консультация");
    }

    #[test]
    fn test_replace_placeholders_reaches_table_cells() {
        let mut doc = DocxDocument::new();
        doc.add_paragraph(Paragraph::with_text("№ {{number}}"));
        doc.add_table(Table::new(vec![1000]).add_row(TableRow::new(vec![
            TableCell::with_text("Исполнитель: {{executor}}"),
        ])));

        doc.replace_placeholders(&[
            ("{{number}}".to_string(), "12".to_string()),
            ("{{executor}}".to_string(), "ИП Петров".to_string()),
        ]);

        assert_eq!(doc.body_text(), "№ 12\nИсполнитель: ИП Петров");
    }

    #[test]
    fn test_open_rejects_non_package() {
        assert!(DocxDocument::open(b"not a zip").is_err());
    }
}
