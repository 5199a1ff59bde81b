//! PNG image anchoring via a spreadsheet drawing part

use regex::Regex;

use crate::editor::XlsxEditor;
use crate::{Result, XlsxError};

/// EMUs per pixel at 96 dpi
const EMU_PER_PIXEL: u32 = 9525;

const DRAWING_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.drawing+xml";
const IMAGE_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const DRAWING_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/drawing";
const RELS_HEADER: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#
);

impl XlsxEditor {
    /// Anchor a PNG image at a cell (1-based row and column), sized in
    /// pixels. Creates the drawing part on first use and appends further
    /// images to it.
    pub fn add_png_image(
        &mut self,
        png: &[u8],
        anchor_row: u32,
        anchor_col: u32,
        width_px: u32,
        height_px: u32,
    ) -> Result<()> {
        let media_count = self
            .part_names()
            .iter()
            .filter(|n| n.starts_with("xl/media/"))
            .count();
        let image_path = format!("xl/media/image{}.png", media_count + 1);
        self.put_part(image_path.clone(), png.to_vec());
        self.ensure_png_content_type();

        let (drawing_path, image_rid) = match self.existing_drawing_path()? {
            Some(path) => {
                let rid = self.add_relationship(&rels_path_for(&path), IMAGE_REL_TYPE, &format!("../media/{}", file_name(&image_path)));
                (path, rid)
            }
            None => {
                let path = self.create_drawing_part()?;
                let rid = self.add_relationship(&rels_path_for(&path), IMAGE_REL_TYPE, &format!("../media/{}", file_name(&image_path)));
                (path, rid)
            }
        };

        let anchor = one_cell_anchor(
            anchor_row,
            anchor_col,
            width_px * EMU_PER_PIXEL,
            height_px * EMU_PER_PIXEL,
            &image_rid,
            media_count as u32 + 1,
        );
        let drawing = self
            .part_mut(&drawing_path)
            .ok_or_else(|| XlsxError::MissingPart(drawing_path.clone()))?;
        let mut xml = String::from_utf8(std::mem::take(drawing))
            .map_err(|e| XlsxError::Malformed(e.to_string()))?;
        let Some(end) = xml.rfind("</xdr:wsDr>") else {
            return Err(XlsxError::Malformed("drawing part has no root".to_string()));
        };
        xml.insert_str(end, &anchor);
        *drawing = xml.into_bytes();

        Ok(())
    }

    /// Path of the drawing part already referenced by the worksheet
    fn existing_drawing_path(&self) -> Result<Option<String>> {
        let drawing_re = Regex::new(r#"<drawing r:id="([^"]+)"/>"#).unwrap();
        let Some(caps) = drawing_re.captures(self.sheet_xml()) else {
            return Ok(None);
        };
        let rid = caps[1].to_string();
        let rels = self
            .part(&rels_path_for(self.sheet_path()))
            .ok_or_else(|| XlsxError::MissingPart(rels_path_for(self.sheet_path())))?;
        let rels = String::from_utf8(rels.to_vec())
            .map_err(|e| XlsxError::Malformed(e.to_string()))?;

        let rel_re =
            Regex::new(r#"<Relationship Id="([^"]+)"[^>]*Target="([^"]+)""#).unwrap();
        for rel in rel_re.captures_iter(&rels) {
            if &rel[1] == rid {
                let target = &rel[2];
                let path = match target.strip_prefix("../") {
                    Some(relative) => format!("xl/{relative}"),
                    None => target.strip_prefix('/').unwrap_or(target).to_string(),
                };
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    /// Create an empty drawing part, wire it into the worksheet, and return
    /// its path
    fn create_drawing_part(&mut self) -> Result<String> {
        let drawing_count = self
            .part_names()
            .iter()
            .filter(|n| n.starts_with("xl/drawings/drawing"))
            .count();
        let drawing_path = format!("xl/drawings/drawing{}.xml", drawing_count + 1);

        let root = concat!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
            r#"<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" "#,
            r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
            r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
            r#"</xdr:wsDr>"#
        );
        self.put_part(drawing_path.clone(), root.as_bytes().to_vec());

        self.add_content_type_override(&format!("/{drawing_path}"), DRAWING_CONTENT_TYPE);

        let sheet_rels_path = rels_path_for(self.sheet_path());
        let drawing_target = format!("../drawings/{}", file_name(&drawing_path));
        let sheet_rid = self.add_relationship(&sheet_rels_path, DRAWING_REL_TYPE, &drawing_target);

        self.ensure_rels_namespace();
        let element = format!(r#"<drawing r:id="{sheet_rid}"/>"#);
        let xml = self.sheet_xml_mut();
        let Some(end) = xml.rfind("</worksheet>") else {
            return Err(XlsxError::Malformed("worksheet has no root".to_string()));
        };
        xml.insert_str(end, &element);

        Ok(drawing_path)
    }

    /// Append a relationship to a rels part (created when absent) and
    /// return the new id
    fn add_relationship(&mut self, rels_path: &str, rel_type: &str, target: &str) -> String {
        let existing = self
            .part(rels_path)
            .map(|data| String::from_utf8_lossy(data).into_owned())
            .unwrap_or_else(|| format!("{RELS_HEADER}</Relationships>"));

        let rid_re = Regex::new(r#"Id="rId(\d+)""#).unwrap();
        let next = rid_re
            .captures_iter(&existing)
            .filter_map(|caps| caps[1].parse::<u32>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        let rid = format!("rId{next}");

        let relationship =
            format!(r#"<Relationship Id="{rid}" Type="{rel_type}" Target="{target}"/>"#);
        let updated = existing.replace(
            "</Relationships>",
            &format!("{relationship}</Relationships>"),
        );
        self.put_part(rels_path.to_string(), updated.into_bytes());
        rid
    }

    fn ensure_png_content_type(&mut self) {
        let Some(types) = self.part("[Content_Types].xml") else {
            return;
        };
        let mut xml = String::from_utf8_lossy(types).into_owned();
        if !xml.contains(r#"Extension="png""#) {
            xml = xml.replace(
                "</Types>",
                r#"<Default Extension="png" ContentType="image/png"/></Types>"#,
            );
            self.put_part("[Content_Types].xml".to_string(), xml.into_bytes());
        }
    }

    fn add_content_type_override(&mut self, part_name: &str, content_type: &str) {
        let Some(types) = self.part("[Content_Types].xml") else {
            return;
        };
        let mut xml = String::from_utf8_lossy(types).into_owned();
        let entry = format!(r#"<Override PartName="{part_name}" ContentType="{content_type}"/>"#);
        if !xml.contains(&entry) {
            xml = xml.replace("</Types>", &format!("{entry}</Types>"));
            self.put_part("[Content_Types].xml".to_string(), xml.into_bytes());
        }
    }

    /// The `<drawing>` element needs the officeDocument relationship prefix
    /// declared on the worksheet root
    fn ensure_rels_namespace(&mut self) {
        let xml = self.sheet_xml_mut();
        let Some(root_start) = xml.find("<worksheet") else {
            return;
        };
        let Some(root_end) = xml[root_start..].find('>') else {
            return;
        };
        if !xml[root_start..root_start + root_end].contains("xmlns:r=") {
            xml.insert_str(
                root_start + "<worksheet".len(),
                r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
            );
        }
    }

}

/// Rels part path for a part: `xl/worksheets/sheet1.xml` ->
/// `xl/worksheets/_rels/sheet1.xml.rels`
fn rels_path_for(part_path: &str) -> String {
    match part_path.rfind('/') {
        Some(slash) => format!(
            "{}/_rels/{}.rels",
            &part_path[..slash],
            &part_path[slash + 1..]
        ),
        None => format!("_rels/{part_path}.rels"),
    }
}

fn file_name(part_path: &str) -> &str {
    part_path.rsplit('/').next().unwrap_or(part_path)
}

/// A oneCellAnchor picture: fixed offset from a cell, absolute extent
fn one_cell_anchor(row: u32, col: u32, cx: u32, cy: u32, rid: &str, pic_id: u32) -> String {
    // Anchors are 0-based
    let row0 = row.saturating_sub(1);
    let col0 = col.saturating_sub(1);
    format!(
        concat!(
            "<xdr:oneCellAnchor>",
            "<xdr:from><xdr:col>{col}</xdr:col><xdr:colOff>0</xdr:colOff>",
            "<xdr:row>{row}</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from>",
            "<xdr:ext cx=\"{cx}\" cy=\"{cy}\"/>",
            "<xdr:pic>",
            "<xdr:nvPicPr><xdr:cNvPr id=\"{id}\" name=\"Image {id}\"/><xdr:cNvPicPr/></xdr:nvPicPr>",
            "<xdr:blipFill><a:blip r:embed=\"{rid}\"/><a:stretch><a:fillRect/></a:stretch></xdr:blipFill>",
            "<xdr:spPr><a:prstGeom prst=\"rect\"><a:avLst/></a:prstGeom></xdr:spPr>",
            "</xdr:pic>",
            "<xdr:clientData/>",
            "</xdr:oneCellAnchor>"
        ),
        col = col0,
        row = row0,
        cx = cx,
        cy = cy,
        id = pic_id,
        rid = rid,
    )
}
