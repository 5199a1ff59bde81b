//! Tables, rows, and cells

use crate::paragraph::Paragraph;

/// Cell vertical alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Top,
    Center,
    Bottom,
}

impl VAlign {
    fn wml_value(self) -> &'static str {
        match self {
            VAlign::Top => "top",
            VAlign::Center => "center",
            VAlign::Bottom => "bottom",
        }
    }
}

/// Builder-side table formatting; serialized to `<w:tblPr>` on save
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableFormat {
    /// Total table width in twips
    pub width: Option<u32>,
    /// Emit explicit single borders on every edge
    pub borders: bool,
    /// Fixed column layout
    pub fixed_layout: bool,
}

impl TableFormat {
    fn to_xml(&self) -> String {
        let mut xml = String::from("<w:tblPr>");
        if let Some(width) = self.width {
            xml.push_str(&format!(r#"<w:tblW w:w="{width}" w:type="dxa"/>"#));
        }
        if self.borders {
            xml.push_str("<w:tblBorders>");
            for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
                xml.push_str(&format!(
                    r#"<w:{edge} w:val="single" w:sz="4" w:space="0" w:color="000000"/>"#
                ));
            }
            xml.push_str("</w:tblBorders>");
        }
        if self.fixed_layout {
            xml.push_str(r#"<w:tblLayout w:type="fixed"/>"#);
        }
        xml.push_str("</w:tblPr>");
        xml
    }
}

/// Builder-side cell formatting; serialized to `<w:tcPr>` on save
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CellFormat {
    /// Cell width in twips
    pub width: Option<u32>,
    pub valign: Option<VAlign>,
}

impl CellFormat {
    fn is_empty(&self) -> bool {
        self == &CellFormat::default()
    }

    fn to_xml(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut xml = String::from("<w:tcPr>");
        if let Some(width) = self.width {
            xml.push_str(&format!(r#"<w:tcW w:w="{width}" w:type="dxa"/>"#));
        }
        if let Some(valign) = self.valign {
            xml.push_str(&format!(r#"<w:vAlign w:val="{}"/>"#, valign.wml_value()));
        }
        xml.push_str("</w:tcPr>");
        Some(xml)
    }
}

/// A table cell holding one or more paragraphs
#[derive(Debug, Clone, Default)]
pub struct TableCell {
    raw_props: Option<String>,
    pub fmt: CellFormat,
    pub paragraphs: Vec<Paragraph>,
}

impl TableCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new().add_paragraph(Paragraph::with_text(text))
    }

    pub fn add_paragraph(mut self, paragraph: Paragraph) -> Self {
        self.paragraphs.push(paragraph);
        self
    }

    /// Cell width in twips
    pub fn width(mut self, twips: u32) -> Self {
        self.fmt.width = Some(twips);
        self
    }

    pub fn valign(mut self, valign: VAlign) -> Self {
        self.fmt.valign = Some(valign);
        self
    }

    pub(crate) fn from_parsed(raw_props: Option<String>, paragraphs: Vec<Paragraph>) -> Self {
        Self {
            raw_props,
            fmt: CellFormat::default(),
            paragraphs,
        }
    }

    /// Concatenated text of all paragraphs, newline-separated
    pub fn text(&self) -> String {
        self.paragraphs
            .iter()
            .map(|p| p.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn props_xml(&self) -> Option<String> {
        self.raw_props.clone().or_else(|| self.fmt.to_xml())
    }

    pub(crate) fn write_xml(&self, out: &mut String) {
        out.push_str("<w:tc>");
        if let Some(props) = self.props_xml() {
            out.push_str(&props);
        }
        if self.paragraphs.is_empty() {
            // A cell must contain at least one paragraph
            out.push_str("<w:p/>");
        }
        for paragraph in &self.paragraphs {
            paragraph.write_xml(out);
        }
        out.push_str("</w:tc>");
    }
}

/// A table row
#[derive(Debug, Clone, Default)]
pub struct TableRow {
    raw_props: Option<String>,
    pub cells: Vec<TableCell>,
}

impl TableRow {
    pub fn new(cells: Vec<TableCell>) -> Self {
        Self {
            raw_props: None,
            cells,
        }
    }

    pub(crate) fn from_parsed(raw_props: Option<String>, cells: Vec<TableCell>) -> Self {
        Self { raw_props, cells }
    }

    pub(crate) fn write_xml(&self, out: &mut String) {
        out.push_str("<w:tr>");
        if let Some(ref props) = self.raw_props {
            out.push_str(props);
        }
        for cell in &self.cells {
            cell.write_xml(out);
        }
        out.push_str("</w:tr>");
    }
}

/// A table: grid column widths plus an ordered row list
#[derive(Debug, Clone, Default)]
pub struct Table {
    raw_props: Option<String>,
    pub fmt: TableFormat,
    /// Grid column widths in twips
    pub grid: Vec<u32>,
    pub rows: Vec<TableRow>,
}

impl Table {
    pub fn new(grid: Vec<u32>) -> Self {
        Self {
            grid,
            ..Self::default()
        }
    }

    pub fn bordered(mut self) -> Self {
        self.fmt.borders = true;
        self
    }

    pub fn fixed_layout(mut self) -> Self {
        self.fmt.fixed_layout = true;
        self.fmt.width = Some(self.grid.iter().sum());
        self
    }

    pub fn add_row(mut self, row: TableRow) -> Self {
        self.rows.push(row);
        self
    }

    pub(crate) fn from_parsed(
        raw_props: Option<String>,
        grid: Vec<u32>,
        rows: Vec<TableRow>,
    ) -> Self {
        Self {
            raw_props,
            fmt: TableFormat::default(),
            grid,
            rows,
        }
    }

    /// Index of the first row with a cell whose text contains `needle`
    pub fn find_row(&self, needle: &str) -> Option<usize> {
        self.rows
            .iter()
            .position(|row| row.cells.iter().any(|c| c.text().contains(needle)))
    }

    fn props_xml(&self) -> String {
        self.raw_props.clone().unwrap_or_else(|| self.fmt.to_xml())
    }

    pub(crate) fn write_xml(&self, out: &mut String) {
        out.push_str("<w:tbl>");
        out.push_str(&self.props_xml());
        if !self.grid.is_empty() {
            out.push_str("<w:tblGrid>");
            for width in &self.grid {
                out.push_str(&format!(r#"<w:gridCol w:w="{width}"/>"#));
            }
            out.push_str("</w:tblGrid>");
        }
        for row in &self.rows {
            row.write_xml(out);
        }
        out.push_str("</w:tbl>");
    }
}
