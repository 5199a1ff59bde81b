//! Worksheet text surgery: cell access, styled row insertion, package IO

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};

use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::addr::split_coord;
use crate::{Result, XlsxError};

/// An in-memory .xlsx package opened for editing.
///
/// The worksheet is held as XML text and edited by splicing; every other
/// part is carried over to the saved package unchanged unless an operation
/// (image anchoring) adds to it.
pub struct XlsxEditor {
    parts: BTreeMap<String, Vec<u8>>,
    sheet_path: String,
    sheet_xml: String,
    shared_strings: Vec<String>,
}

impl XlsxEditor {
    /// Open a workbook from bytes, targeting its first worksheet
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

        let workbook = part_text(&parts, "xl/workbook.xml")?;
        let rels = part_text(&parts, "xl/_rels/workbook.xml.rels")?;
        let sheet_rid = first_sheet_rid(&workbook)?;
        let target = relationship_target(&rels, &sheet_rid)?;
        let sheet_path = match target.strip_prefix('/') {
            Some(absolute) => absolute.to_string(),
            None => format!("xl/{target}"),
        };

        let sheet_xml = parts
            .remove(&sheet_path)
            .ok_or_else(|| XlsxError::MissingPart(sheet_path.clone()))?;
        let sheet_xml = String::from_utf8(sheet_xml)
            .map_err(|e| XlsxError::Malformed(e.to_string()))?;

        let shared_strings = match parts.get("xl/sharedStrings.xml") {
            Some(xml) => parse_shared_strings(xml)?,
            None => Vec::new(),
        };

        Ok(Self {
            parts,
            sheet_path,
            sheet_xml,
            shared_strings,
        })
    }

    /// Serialize the package to bytes
    pub fn save(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        let mut archive = ZipWriter::new(&mut cursor);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for (name, data) in &self.parts {
            archive.start_file(name.as_str(), options)?;
            archive.write_all(data)?;
        }
        archive.start_file(self.sheet_path.as_str(), options)?;
        archive.write_all(self.sheet_xml.as_bytes())?;

        archive.finish()?;
        Ok(cursor.into_inner())
    }

    /// Resolved text of a cell: shared, inline, and plain values
    pub fn cell_text(&self, reference: &str) -> Option<String> {
        let (start, end) = self.find_cell(reference)?;
        let cell = &self.sheet_xml[start..end];
        let tag_end = cell.find('>')?;
        let attrs = &cell[..tag_end];

        if attrs.contains(r#" t="s""#) {
            let index: usize = extract_between(cell, "<v>", "</v>")?.trim().parse().ok()?;
            self.shared_strings.get(index).cloned()
        } else if attrs.contains(r#" t="inlineStr""#) {
            Some(concat_t_text(cell))
        } else {
            extract_between(cell, "<v>", "</v>").map(unescape_xml)
        }
    }

    /// Write a cell as an inline string, keeping its style id
    pub fn set_cell_text(&mut self, reference: &str, value: &str) -> Result<()> {
        let style = self.cell_style_attr(reference);
        let cell = format!(
            r#"<c r="{reference}"{style} t="inlineStr"><is><t xml:space="preserve">{}</t></is></c>"#,
            escape_xml(value)
        );
        self.put_cell(reference, &cell)
    }

    /// Write a cell as a numeric value, keeping its style id
    pub fn set_cell_number(&mut self, reference: &str, value: &str) -> Result<()> {
        let style = self.cell_style_attr(reference);
        let cell = format!(r#"<c r="{reference}"{style}><v>{value}</v></c>"#);
        self.put_cell(reference, &cell)
    }

    /// Literal whole-value substitution inside one cell.
    ///
    /// A cell whose text contains no key is left untouched.
    pub fn replace_in_cell(&mut self, reference: &str, replacements: &[(String, String)]) -> Result<()> {
        let Some(mut text) = self.cell_text(reference) else {
            return Ok(());
        };
        let mut changed = false;
        for (key, value) in replacements {
            if text.contains(key.as_str()) {
                text = text.replace(key.as_str(), value);
                changed = true;
            }
        }
        if changed {
            self.set_cell_text(reference, &text)?;
        }
        Ok(())
    }

    /// Insert `count` blank rows before `at_row`, shifting every row at or
    /// below it (cells, merged ranges, the dimension) down by `count` and
    /// cloning the cell style ids and row height of `style_from_row` into
    /// each inserted row.
    pub fn insert_rows(&mut self, at_row: u32, count: u32, style_from_row: u32) -> Result<()> {
        if count == 0 {
            return Ok(());
        }

        let skeleton = self.row_skeleton(style_from_row)?;
        self.shift_rows_down(at_row, count);

        let mut inserted = String::new();
        for offset in 0..count {
            inserted.push_str(&skeleton.materialize(at_row + offset));
        }

        let insert_at = self
            .first_row_at_or_after(at_row + count)
            .unwrap_or(self.before_sheet_data_end()?);
        self.sheet_xml.insert_str(insert_at, &inserted);
        Ok(())
    }

    /// A package part by name, if present
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        if name == self.sheet_path {
            return Some(self.sheet_xml.as_bytes());
        }
        self.parts.get(name).map(|v| v.as_slice())
    }

    pub(crate) fn put_part(&mut self, name: impl Into<String>, data: Vec<u8>) {
        self.parts.insert(name.into(), data);
    }

    pub(crate) fn part_mut(&mut self, name: &str) -> Option<&mut Vec<u8>> {
        self.parts.get_mut(name)
    }

    pub(crate) fn sheet_path(&self) -> &str {
        &self.sheet_path
    }

    pub(crate) fn part_names(&self) -> Vec<String> {
        self.parts.keys().cloned().collect()
    }

    /// Current worksheet XML text
    pub fn sheet_xml(&self) -> &str {
        &self.sheet_xml
    }

    pub(crate) fn sheet_xml_mut(&mut self) -> &mut String {
        &mut self.sheet_xml
    }

    // ---- worksheet text helpers ----

    /// Byte range of a `<c>` element, or None when the cell is absent
    fn find_cell(&self, reference: &str) -> Option<(usize, usize)> {
        let tag = format!(r#"<c r="{reference}""#);
        let start = self.sheet_xml.find(&tag)?;
        let tag_end = find_from(&self.sheet_xml, ">", start)?;
        if self.sheet_xml.as_bytes()[tag_end - 1] == b'/' {
            Some((start, tag_end + 1))
        } else {
            let close = find_from(&self.sheet_xml, "</c>", tag_end)?;
            Some((start, close + "</c>".len()))
        }
    }

    /// The existing ` s="…"` attribute of a cell, or empty
    fn cell_style_attr(&self, reference: &str) -> String {
        let Some((start, end)) = self.find_cell(reference) else {
            return String::new();
        };
        let cell = &self.sheet_xml[start..end];
        let tag_end = cell.find('>').unwrap_or(cell.len());
        match extract_attr(&cell[..tag_end], "s") {
            Some(style) => format!(r#" s="{style}""#),
            None => String::new(),
        }
    }

    fn put_cell(&mut self, reference: &str, cell_xml: &str) -> Result<()> {
        if let Some((start, end)) = self.find_cell(reference) {
            self.sheet_xml.replace_range(start..end, cell_xml);
            return Ok(());
        }

        let (row, col) = split_coord(reference)
            .ok_or_else(|| XlsxError::InvalidReference(reference.to_string()))?;
        let (body_start, body_end) = self.ensure_row(row)?;
        let insert_at = self.cell_insert_position(body_start, body_end, col);
        self.sheet_xml.insert_str(insert_at, cell_xml);
        Ok(())
    }

    /// Byte range of a row's body (between its start tag and `</row>`),
    /// creating the row when missing
    fn ensure_row(&mut self, row: u32) -> Result<(usize, usize)> {
        let tag = format!(r#"<row r="{row}""#);
        if let Some(start) = self.sheet_xml.find(&tag) {
            let tag_end = find_from(&self.sheet_xml, ">", start)
                .ok_or_else(|| XlsxError::Malformed("unterminated <row> tag".to_string()))?;
            if self.sheet_xml.as_bytes()[tag_end - 1] == b'/' {
                // Self-closing empty row: open it up
                self.sheet_xml
                    .replace_range(tag_end - 1..tag_end + 1, "></row>");
                return Ok((tag_end, tag_end));
            }
            let close = find_from(&self.sheet_xml, "</row>", tag_end)
                .ok_or_else(|| XlsxError::Malformed("missing </row>".to_string()))?;
            return Ok((tag_end + 1, close));
        }

        let row_xml = format!(r#"<row r="{row}"></row>"#);
        let insert_at = self
            .first_row_at_or_after(row + 1)
            .unwrap_or(self.before_sheet_data_end()?);
        self.sheet_xml.insert_str(insert_at, &row_xml);
        let body = insert_at + row_xml.len() - "</row>".len();
        Ok((body, body))
    }

    /// Position of the first cell in the row body with a column index
    /// greater than `col`, keeping cells in column order
    fn cell_insert_position(&self, body_start: usize, body_end: usize, col: u32) -> usize {
        let body = &self.sheet_xml[body_start..body_end];
        let mut offset = 0;
        while let Some(pos) = body[offset..].find("<c r=\"") {
            let ref_start = offset + pos + "<c r=\"".len();
            let Some(ref_end) = body[ref_start..].find('"') else {
                break;
            };
            if let Some((_, existing_col)) = split_coord(&body[ref_start..ref_start + ref_end]) {
                if existing_col > col {
                    return body_start + offset + pos;
                }
            }
            offset = ref_start + ref_end;
        }
        body_end
    }

    /// Start position of the first `<row>` with index >= `row`
    fn first_row_at_or_after(&self, row: u32) -> Option<usize> {
        let row_re = Regex::new(r#"<row r="(\d+)""#).unwrap();
        for caps in row_re.captures_iter(&self.sheet_xml) {
            let r: u32 = caps[1].parse().unwrap_or(0);
            if r >= row {
                return Some(caps.get(0).unwrap().start());
            }
        }
        None
    }

    fn before_sheet_data_end(&self) -> Result<usize> {
        self.sheet_xml
            .find("</sheetData>")
            .ok_or_else(|| XlsxError::Malformed("missing </sheetData>".to_string()))
    }

    /// Rewrite every row-bearing reference at or below `at_row`
    fn shift_rows_down(&mut self, at_row: u32, count: u32) {
        let shift = |r: u32| if r >= at_row { r + count } else { r };

        let row_re = Regex::new(r#"<row r="(\d+)""#).unwrap();
        let shifted = row_re.replace_all(&self.sheet_xml, |caps: &regex::Captures| {
            let r: u32 = caps[1].parse().unwrap_or(0);
            format!(r#"<row r="{}""#, shift(r))
        });
        self.sheet_xml = shifted.into_owned();

        let cell_re = Regex::new(r#"<c r="([A-Za-z]+)(\d+)""#).unwrap();
        let shifted = cell_re.replace_all(&self.sheet_xml, |caps: &regex::Captures| {
            let r: u32 = caps[2].parse().unwrap_or(0);
            format!(r#"<c r="{}{}""#, &caps[1], shift(r))
        });
        self.sheet_xml = shifted.into_owned();

        // A merged range entirely below the gap moves as a whole; one that
        // spans the gap is extended
        let merge_re =
            Regex::new(r#"<mergeCell ref="([A-Za-z]+)(\d+):([A-Za-z]+)(\d+)"/>"#).unwrap();
        let shifted = merge_re.replace_all(&self.sheet_xml, |caps: &regex::Captures| {
            let top: u32 = caps[2].parse().unwrap_or(0);
            let bottom: u32 = caps[4].parse().unwrap_or(0);
            let (top, bottom) = if top >= at_row {
                (top + count, bottom + count)
            } else if bottom >= at_row {
                (top, bottom + count)
            } else {
                (top, bottom)
            };
            format!(r#"<mergeCell ref="{}{}:{}{}"/>"#, &caps[1], top, &caps[3], bottom)
        });
        self.sheet_xml = shifted.into_owned();

        let dim_re =
            Regex::new(r#"<dimension ref="([A-Za-z]+)(\d+):([A-Za-z]+)(\d+)"/>"#).unwrap();
        let shifted = dim_re.replace_all(&self.sheet_xml, |caps: &regex::Captures| {
            let bottom: u32 = caps[4].parse().unwrap_or(0);
            format!(
                r#"<dimension ref="{}{}:{}{}"/>"#,
                &caps[1],
                &caps[2],
                &caps[3],
                shift(bottom)
            )
        });
        self.sheet_xml = shifted.into_owned();
    }

    /// Extract a reusable style skeleton of a row: row attributes minus the
    /// reference, plus the (column, style id) of every cell
    fn row_skeleton(&self, row: u32) -> Result<RowSkeleton> {
        let tag = format!(r#"<row r="{row}""#);
        let start = self
            .sheet_xml
            .find(&tag)
            .ok_or_else(|| XlsxError::Malformed(format!("row {row} not found")))?;
        let tag_end = find_from(&self.sheet_xml, ">", start)
            .ok_or_else(|| XlsxError::Malformed("unterminated <row> tag".to_string()))?;

        let attrs_text = &self.sheet_xml[start + tag.len()..tag_end];
        let attrs = carried_row_attrs(attrs_text.trim_end_matches('/'));

        let mut cells = Vec::new();
        if self.sheet_xml.as_bytes()[tag_end - 1] != b'/' {
            let close = find_from(&self.sheet_xml, "</row>", tag_end)
                .ok_or_else(|| XlsxError::Malformed("missing </row>".to_string()))?;
            let body = &self.sheet_xml[tag_end + 1..close];
            let cell_re = Regex::new(r#"<c r="([A-Za-z]+)\d+"([^>]*?)/?>"#).unwrap();
            for caps in cell_re.captures_iter(body) {
                let column = caps[1].to_string();
                let style = extract_attr(&caps[2], "s");
                cells.push((column, style));
            }
        }

        Ok(RowSkeleton { attrs, cells })
    }
}

/// Style-only copy of a row, materialized per inserted row index
struct RowSkeleton {
    attrs: String,
    cells: Vec<(String, Option<String>)>,
}

impl RowSkeleton {
    fn materialize(&self, row: u32) -> String {
        let mut xml = format!(r#"<row r="{row}"{}>"#, self.attrs);
        for (column, style) in &self.cells {
            match style {
                Some(style) => xml.push_str(&format!(r#"<c r="{column}{row}" s="{style}"/>"#)),
                None => xml.push_str(&format!(r#"<c r="{column}{row}"/>"#)),
            }
        }
        xml.push_str("</row>");
        xml
    }
}

/// Row attributes worth carrying onto a cloned row
fn carried_row_attrs(attrs: &str) -> String {
    let mut out = String::new();
    for name in ["ht", "customHeight", "s", "customFormat"] {
        if let Some(value) = extract_attr(attrs, name) {
            out.push_str(&format!(r#" {name}="{value}""#));
        }
    }
    out
}

fn part_text(parts: &BTreeMap<String, Vec<u8>>, name: &str) -> Result<String> {
    let data = parts
        .get(name)
        .ok_or_else(|| XlsxError::MissingPart(name.to_string()))?;
    String::from_utf8(data.clone()).map_err(|e| XlsxError::Malformed(e.to_string()))
}

/// `r:id` of the first `<sheet>` in workbook.xml
fn first_sheet_rid(workbook_xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(workbook_xml);
    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e) if e.name().as_ref() == b"sheet" => {
                for attr in e.attributes().with_checks(false).flatten() {
                    if attr.key.as_ref() == b"r:id" {
                        return Ok(String::from_utf8_lossy(&attr.value).into_owned());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Err(XlsxError::Malformed(
        "workbook has no sheet entries".to_string(),
    ))
}

/// Target of the relationship with the given id
fn relationship_target(rels_xml: &str, rid: &str) -> Result<String> {
    let mut reader = Reader::from_str(rels_xml);
    loop {
        match reader.read_event()? {
            Event::Start(ref e) | Event::Empty(ref e)
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                for attr in e.attributes().with_checks(false).flatten() {
                    match attr.key.as_ref() {
                        b"Id" => id = Some(String::from_utf8_lossy(&attr.value).into_owned()),
                        b"Target" => {
                            target = Some(String::from_utf8_lossy(&attr.value).into_owned())
                        }
                        _ => {}
                    }
                }
                if id.as_deref() == Some(rid) {
                    if let Some(target) = target {
                        return Ok(target);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Err(XlsxError::Malformed(format!("relationship {rid} not found")))
}

fn parse_shared_strings(xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    let mut strings = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => match e.name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"t" if in_si => in_t = true,
                _ => {}
            },
            Event::Empty(ref e) if e.name().as_ref() == b"si" => strings.push(String::new()),
            Event::Text(ref e) if in_t => current.push_str(&e.unescape()?),
            Event::End(ref e) => match e.name().as_ref() {
                b"si" => {
                    in_si = false;
                    strings.push(std::mem::take(&mut current));
                }
                b"t" => in_t = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(strings)
}

fn find_from(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    haystack[from..].find(needle).map(|p| p + from)
}

fn extract_between<'a>(text: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = text.find(open)? + open.len();
    let end = find_from(text, close, start)?;
    Some(&text[start..end])
}

/// Value of a named attribute inside a tag's attribute text
fn extract_attr(attrs: &str, name: &str) -> Option<String> {
    let needle = format!(r#" {name}=""#);
    let start = attrs.find(&needle)? + needle.len();
    let end = find_from(attrs, "\"", start)?;
    Some(attrs[start..end].to_string())
}

/// Concatenated, unescaped `<t>` runs inside an inline-string cell
fn concat_t_text(cell: &str) -> String {
    let mut out = String::new();
    let mut offset = 0;
    while let Some(pos) = cell[offset..].find("<t") {
        let tag_start = offset + pos;
        let Some(tag_end) = find_from(cell, ">", tag_start) else {
            break;
        };
        if cell.as_bytes()[tag_end - 1] == b'/' {
            offset = tag_end + 1;
            continue;
        }
        let Some(close) = find_from(cell, "</t>", tag_end) else {
            break;
        };
        out.push_str(&unescape_xml(&cell[tag_end + 1..close]));
        offset = close + "</t>".len();
    }
    out
}

pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SHEET: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        r#"<dimension ref="A1:BF40"/>"#,
        r#"<sheetData>"#,
        r#"<row r="10"><c r="B10" s="1" t="s"><v>0</v></c></row>"#,
        r#"<row r="25" ht="22" customHeight="1">"#,
        r#"<c r="B25" s="2"/><c r="D25" s="3"/><c r="AS25" s="4"/></row>"#,
        r#"<row r="26"><c r="B26" t="inlineStr"><is><t>Итого</t></is></c></row>"#,
        r#"<row r="32"><c r="B32" s="5"/></row>"#,
        r#"</sheetData>"#,
        r#"<mergeCells count="1"><mergeCell ref="B32:J32"/></mergeCells>"#,
        r#"</worksheet>"#
    );

    const SHARED: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="1" uniqueCount="1">"#,
        r#"<si><t>Счет на оплату № {{contract_number}}</t></si>"#,
        r#"</sst>"#
    );

    pub(crate) fn build_workbook(sheet_xml: &str, shared_strings: Option<&str>) -> Vec<u8> {
        let mut content_types = String::from(concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
            r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
            r#"<Default Extension="xml" ContentType="application/xml"/>"#,
            r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
            r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
        ));
        if shared_strings.is_some() {
            content_types.push_str(r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#);
        }
        content_types.push_str("</Types>");

        let package_rels = concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>"#,
            r#"</Relationships>"#
        );
        let workbook = concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"<sheets><sheet name="Счет" sheetId="1" r:id="rId1"/></sheets>"#,
            r#"</workbook>"#
        );
        let workbook_rels = concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
            r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
            r#"</Relationships>"#
        );

        let mut cursor = Cursor::new(Vec::new());
        let mut archive = ZipWriter::new(&mut cursor);
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut entries: Vec<(&str, &str)> = vec![
            ("[Content_Types].xml", content_types.as_str()),
            ("_rels/.rels", package_rels),
            ("xl/workbook.xml", workbook),
            ("xl/_rels/workbook.xml.rels", workbook_rels),
            ("xl/worksheets/sheet1.xml", sheet_xml),
        ];
        if let Some(shared) = shared_strings {
            entries.push(("xl/sharedStrings.xml", shared));
        }
        for (name, data) in entries {
            archive.start_file(name, options).unwrap();
            archive.write_all(data.as_bytes()).unwrap();
        }
        archive.finish().unwrap();
        cursor.into_inner()
    }

    fn sample_editor() -> XlsxEditor {
        XlsxEditor::open(&build_workbook(SHEET, Some(SHARED))).unwrap()
    }

    #[test]
    fn test_cell_text_shared_and_inline() {
        let editor = sample_editor();
        assert_eq!(
            editor.cell_text("B10").unwrap(),
            "Счет на оплату № {{contract_number}}"
        );
        assert_eq!(editor.cell_text("B26").unwrap(), "Итого");
        assert_eq!(editor.cell_text("Z99"), None);
    }

    #[test]
    fn test_set_cell_text_preserves_style() {
        let mut editor = sample_editor();
        editor.set_cell_text("B25", "Консультация").unwrap();
        assert_eq!(editor.cell_text("B25").unwrap(), "Консультация");
        assert!(editor.sheet_xml().contains(r#"<c r="B25" s="2" t="inlineStr">"#));
    }

    #[test]
    fn test_set_cell_in_missing_row_keeps_order() {
        let mut editor = sample_editor();
        editor.set_cell_number("C30", "125.50").unwrap();
        assert_eq!(editor.cell_text("C30").unwrap(), "125.50");
        let xml = editor.sheet_xml();
        let row30 = xml.find(r#"<row r="30""#).unwrap();
        let row32 = xml.find(r#"<row r="32""#).unwrap();
        assert!(row30 < row32);
    }

    #[test]
    fn test_replace_in_cell() {
        let mut editor = sample_editor();
        editor
            .replace_in_cell(
                "B10",
                &[("{{contract_number}}".to_string(), "7-У".to_string())],
            )
            .unwrap();
        assert_eq!(editor.cell_text("B10").unwrap(), "Счет на оплату № 7-У");
    }

    #[test]
    fn test_insert_rows_shifts_and_clones_styles() {
        let mut editor = sample_editor();
        editor.insert_rows(26, 4, 25).unwrap();
        let xml = editor.sheet_xml();

        // The old totals row moved down by four
        assert!(xml.contains(r#"<row r="30"><c r="B30" t="inlineStr">"#));
        assert_eq!(editor.cell_text("B30").unwrap(), "Итого");

        // Inserted rows carry the base row's styles and height
        assert!(xml.contains(r#"<row r="26" ht="22" customHeight="1"><c r="B26" s="2"/><c r="D26" s="3"/><c r="AS26" s="4"/></row>"#));
        assert!(xml.contains(r#"<c r="AS29" s="4"/>"#));

        // Merged range and dimension shifted
        assert!(xml.contains(r#"<mergeCell ref="B36:J36"/>"#));
        assert!(xml.contains(r#"<dimension ref="A1:BF44"/>"#));
    }

    #[test]
    fn test_insert_rows_zero_is_noop() {
        let mut editor = sample_editor();
        let before = editor.sheet_xml().to_string();
        editor.insert_rows(26, 0, 25).unwrap();
        assert_eq!(editor.sheet_xml(), before);
    }

    #[test]
    fn test_save_roundtrip() {
        let mut editor = sample_editor();
        editor.set_cell_text("D25", "Сопровождение").unwrap();
        let bytes = editor.save().unwrap();

        let reopened = XlsxEditor::open(&bytes).unwrap();
        assert_eq!(reopened.cell_text("D25").unwrap(), "Сопровождение");
        assert_eq!(
            reopened.cell_text("B10").unwrap(),
            "Счет на оплату № {{contract_number}}"
        );
    }
}
