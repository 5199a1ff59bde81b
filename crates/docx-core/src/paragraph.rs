//! Paragraphs, formatting runs, and the placeholder substitution engine

use crate::writer::{escape_attr, escape_text};

/// Paragraph alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Align {
    pub(crate) fn wml_value(self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
            Align::Justify => "both",
        }
    }
}

/// Builder-side run formatting; serialized to `<w:rPr>` on save
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunFormat {
    /// Font family, applied to all script ranges
    pub font: Option<String>,
    /// Font size in half-points (22 = 11pt)
    pub size: Option<u32>,
    pub bold: bool,
}

impl RunFormat {
    fn is_empty(&self) -> bool {
        self.font.is_none() && self.size.is_none() && !self.bold
    }

    fn to_xml(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut xml = String::from("<w:rPr>");
        if let Some(ref font) = self.font {
            let name = escape_attr(font);
            xml.push_str(&format!(
                r#"<w:rFonts w:ascii="{name}" w:hAnsi="{name}" w:cs="{name}" w:eastAsia="{name}"/>"#
            ));
        }
        if self.bold {
            xml.push_str("<w:b/>");
        }
        if let Some(size) = self.size {
            xml.push_str(&format!(
                r#"<w:sz w:val="{size}"/><w:szCs w:val="{size}"/>"#
            ));
        }
        xml.push_str("</w:rPr>");
        Some(xml)
    }
}

/// A minimal span of text sharing one formatting style
#[derive(Debug, Clone, Default)]
pub struct Run {
    /// Property XML carried verbatim from a parsed package; takes priority
    /// over `fmt` so untouched formatting metadata survives a round trip
    raw_props: Option<String>,
    pub fmt: RunFormat,
    pub text: String,
    /// Emit a page break before the text
    pub page_break: bool,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// A run consisting of a single page break
    pub fn page_break() -> Self {
        Self {
            page_break: true,
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.fmt.bold = true;
        self
    }

    /// Font size in half-points
    pub fn size(mut self, half_points: u32) -> Self {
        self.fmt.size = Some(half_points);
        self
    }

    pub fn font(mut self, name: impl Into<String>) -> Self {
        self.fmt.font = Some(name.into());
        self
    }

    pub(crate) fn from_parsed(raw_props: Option<String>, text: String, page_break: bool) -> Self {
        Self {
            raw_props,
            fmt: RunFormat::default(),
            text,
            page_break,
        }
    }

    pub(crate) fn props_xml(&self) -> Option<String> {
        self.raw_props.clone().or_else(|| self.fmt.to_xml())
    }

    pub(crate) fn write_xml(&self, out: &mut String) {
        out.push_str("<w:r>");
        if let Some(props) = self.props_xml() {
            out.push_str(&props);
        }
        if self.page_break {
            out.push_str(r#"<w:br w:type="page"/>"#);
        }
        if !self.text.is_empty() {
            out.push_str(r#"<w:t xml:space="preserve">"#);
            out.push_str(&escape_text(&self.text));
            out.push_str("</w:t>");
        }
        out.push_str("</w:r>");
    }
}

/// Builder-side paragraph formatting; serialized to `<w:pPr>` on save
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParaFormat {
    pub align: Option<Align>,
    /// Space before in twips
    pub space_before: Option<u32>,
    /// Space after in twips
    pub space_after: Option<u32>,
    /// Line spacing as a multiple of single spacing
    pub line_spacing: Option<f64>,
    /// First-line indent in twips
    pub first_line_indent: Option<u32>,
    /// Left indent in twips
    pub left_indent: Option<u32>,
}

impl ParaFormat {
    fn is_empty(&self) -> bool {
        self == &ParaFormat::default()
    }

    fn to_xml(&self) -> Option<String> {
        if self.is_empty() {
            return None;
        }
        let mut xml = String::from("<w:pPr>");
        if self.space_before.is_some() || self.space_after.is_some() || self.line_spacing.is_some()
        {
            xml.push_str("<w:spacing");
            if let Some(before) = self.space_before {
                xml.push_str(&format!(r#" w:before="{before}""#));
            }
            if let Some(after) = self.space_after {
                xml.push_str(&format!(r#" w:after="{after}""#));
            }
            if let Some(spacing) = self.line_spacing {
                let line = (spacing * 240.0).round() as u32;
                xml.push_str(&format!(r#" w:line="{line}" w:lineRule="auto""#));
            }
            xml.push_str("/>");
        }
        if self.first_line_indent.is_some() || self.left_indent.is_some() {
            xml.push_str("<w:ind");
            if let Some(left) = self.left_indent {
                xml.push_str(&format!(r#" w:left="{left}""#));
            }
            if let Some(first) = self.first_line_indent {
                xml.push_str(&format!(r#" w:firstLine="{first}""#));
            }
            xml.push_str("/>");
        }
        if let Some(align) = self.align {
            xml.push_str(&format!(r#"<w:jc w:val="{}"/>"#, align.wml_value()));
        }
        xml.push_str("</w:pPr>");
        Some(xml)
    }
}

/// An ordered sequence of formatting runs
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    raw_props: Option<String>,
    pub fmt: ParaFormat,
    pub runs: Vec<Run>,
}

impl Paragraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A paragraph with a single unstyled run
    pub fn with_text(text: impl Into<String>) -> Self {
        Self::new().add_run(Run::new(text))
    }

    pub fn add_run(mut self, run: Run) -> Self {
        self.runs.push(run);
        self
    }

    pub fn align(mut self, align: Align) -> Self {
        self.fmt.align = Some(align);
        self
    }

    /// Space before in twips
    pub fn space_before(mut self, twips: u32) -> Self {
        self.fmt.space_before = Some(twips);
        self
    }

    /// Space after in twips
    pub fn space_after(mut self, twips: u32) -> Self {
        self.fmt.space_after = Some(twips);
        self
    }

    pub fn line_spacing(mut self, multiple: f64) -> Self {
        self.fmt.line_spacing = Some(multiple);
        self
    }

    /// First-line indent in twips
    pub fn first_line_indent(mut self, twips: u32) -> Self {
        self.fmt.first_line_indent = Some(twips);
        self
    }

    /// Left indent in twips
    pub fn left_indent(mut self, twips: u32) -> Self {
        self.fmt.left_indent = Some(twips);
        self
    }

    pub(crate) fn from_parsed(raw_props: Option<String>, runs: Vec<Run>) -> Self {
        Self {
            raw_props,
            fmt: ParaFormat::default(),
            runs,
        }
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Replace every occurrence of every key with its value.
    ///
    /// Interactive editing splits placeholder literals across run boundaries;
    /// when a key occurs in the paragraph text but in no single run, the run
    /// sequence is coalesced into one run carrying the first run's formatting
    /// before the literal replacement is applied.
    pub fn replace_placeholders(&mut self, replacements: &[(String, String)]) {
        for (key, value) in replacements {
            let full_text = self.text();
            if !full_text.contains(key.as_str()) {
                continue;
            }

            let found_in_single_run = self.runs.iter().any(|r| r.text.contains(key.as_str()));
            if !found_in_single_run && !self.runs.is_empty() {
                let mut merged = self.runs[0].clone();
                merged.text = full_text;
                self.runs = vec![merged];
            }

            for run in &mut self.runs {
                if run.text.contains(key.as_str()) {
                    run.text = run.text.replace(key.as_str(), value);
                }
            }
        }
    }

    pub(crate) fn props_xml(&self) -> Option<String> {
        self.raw_props.clone().or_else(|| self.fmt.to_xml())
    }

    pub(crate) fn write_xml(&self, out: &mut String) {
        out.push_str("<w:p>");
        if let Some(props) = self.props_xml() {
            out.push_str(&props);
        }
        for run in &self.runs {
            run.write_xml(out);
        }
        out.push_str("</w:p>");
    }
}
