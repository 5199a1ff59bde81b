//! Parsing of `word/document.xml` into the document model

use crate::document::Block;
use crate::paragraph::{Paragraph, Run};
use crate::table::{Table, TableCell, TableRow};
use crate::{DocxError, Result};

const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

pub(crate) struct ParsedBody {
    pub blocks: Vec<Block>,
    pub sect_props: Option<String>,
    /// Attributes of the original `<w:document>` start tag, preserved so
    /// namespace prefixes used inside raw property fragments stay declared
    pub root_attrs: Option<String>,
}

fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

/// Slice the raw XML of a node out of the source text
fn raw_xml(xml: &str, node: roxmltree::Node) -> String {
    xml[node.range()].to_string()
}

fn root_attrs(xml: &str, root: roxmltree::Node) -> Option<String> {
    let start = root.range().start;
    let tag_end = xml[start..].find('>')?;
    let tag = &xml[start..start + tag_end];
    let name_end = tag.find(char::is_whitespace)?;
    Some(tag[name_end..].trim().trim_end_matches('/').to_string())
}

pub(crate) fn parse_document_xml(xml: &str) -> Result<ParsedBody> {
    let tree =
        roxmltree::Document::parse(xml).map_err(|e| DocxError::Parse(e.to_string()))?;

    let root = tree.root_element();
    let body = root
        .children()
        .find(|n| is_wml(*n, "body"))
        .ok_or_else(|| DocxError::Parse("document has no w:body".to_string()))?;

    let mut blocks = Vec::new();
    let mut sect_props = None;

    for child in body.children().filter(|n| n.is_element()) {
        if is_wml(child, "p") {
            blocks.push(Block::Paragraph(parse_paragraph(xml, child)));
        } else if is_wml(child, "tbl") {
            blocks.push(Block::Table(parse_table(xml, child)));
        } else if is_wml(child, "sectPr") {
            sect_props = Some(raw_xml(xml, child));
        }
    }

    Ok(ParsedBody {
        blocks,
        sect_props,
        root_attrs: root_attrs(xml, root),
    })
}

fn parse_paragraph(xml: &str, node: roxmltree::Node) -> Paragraph {
    let mut props = None;
    let mut runs = Vec::new();

    for child in node.children().filter(|n| n.is_element()) {
        if is_wml(child, "pPr") {
            props = Some(raw_xml(xml, child));
        } else if is_wml(child, "r") {
            runs.push(parse_run(xml, child));
        } else if is_wml(child, "hyperlink") {
            for inner in child.children().filter(|n| is_wml(*n, "r")) {
                runs.push(parse_run(xml, inner));
            }
        }
    }

    Paragraph::from_parsed(props, runs)
}

fn parse_run(xml: &str, node: roxmltree::Node) -> Run {
    let mut props = None;
    let mut text = String::new();
    let mut page_break = false;

    for child in node.children().filter(|n| n.is_element()) {
        if is_wml(child, "rPr") {
            props = Some(raw_xml(xml, child));
        } else if is_wml(child, "t") {
            for piece in child.children().filter(|n| n.is_text()) {
                if let Some(value) = piece.text() {
                    text.push_str(value);
                }
            }
        } else if is_wml(child, "br") && child.attribute((WML_NS, "type")) == Some("page") {
            page_break = true;
        } else if is_wml(child, "tab") {
            text.push('\t');
        }
    }

    Run::from_parsed(props, text, page_break)
}

fn parse_table(xml: &str, node: roxmltree::Node) -> Table {
    let mut props = None;
    let mut grid = Vec::new();
    let mut rows = Vec::new();

    for child in node.children().filter(|n| n.is_element()) {
        if is_wml(child, "tblPr") {
            props = Some(raw_xml(xml, child));
        } else if is_wml(child, "tblGrid") {
            for col in child.children().filter(|n| is_wml(*n, "gridCol")) {
                let width = col
                    .attribute((WML_NS, "w"))
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(0);
                grid.push(width);
            }
        } else if is_wml(child, "tr") {
            rows.push(parse_row(xml, child));
        }
    }

    Table::from_parsed(props, grid, rows)
}

fn parse_row(xml: &str, node: roxmltree::Node) -> TableRow {
    let mut props = None;
    let mut cells = Vec::new();

    for child in node.children().filter(|n| n.is_element()) {
        if is_wml(child, "trPr") {
            props = Some(raw_xml(xml, child));
        } else if is_wml(child, "tc") {
            cells.push(parse_cell(xml, child));
        }
    }

    TableRow::from_parsed(props, cells)
}

fn parse_cell(xml: &str, node: roxmltree::Node) -> TableCell {
    let mut props = None;
    let mut paragraphs = Vec::new();

    for child in node.children().filter(|n| n.is_element()) {
        if is_wml(child, "tcPr") {
            props = Some(raw_xml(xml, child));
        } else if is_wml(child, "p") {
            paragraphs.push(parse_paragraph(xml, child));
        }
    }

    TableCell::from_parsed(props, paragraphs)
}
