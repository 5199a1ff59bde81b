//! DOCX Core - Low-level WordprocessingML package manipulation
//!
//! This crate provides:
//! - Opening a .docx package from bytes and saving it back
//! - An owned in-memory tree of paragraphs, runs, and tables
//! - Placeholder substitution with formatting-run coalescing
//! - A builder API for constructing documents from scratch
//!
//! # Example
//!
//! ```
//! use docx_core::{DocxDocument, Paragraph, Run};
//!
//! let mut doc = DocxDocument::new();
//! doc.add_paragraph(Paragraph::new().add_run(Run::new("Договор № {{number}}").bold()));
//! doc.replace_placeholders(&[("{{number}}".to_string(), "42".to_string())]);
//! let bytes = doc.save().unwrap();
//! let reopened = DocxDocument::open(&bytes).unwrap();
//! assert!(reopened.body_text().contains("Договор № 42"));
//! ```

mod document;
mod paragraph;
mod reader;
mod table;
mod writer;

pub use document::{Block, DocxDocument};
pub use paragraph::{Align, ParaFormat, Paragraph, Run, RunFormat};
pub use table::{CellFormat, Table, TableCell, TableFormat, TableRow, VAlign};

use thiserror::Error;

/// Errors that can occur during package operations
#[derive(Debug, Error)]
pub enum DocxError {
    #[error("failed to read package: {0}")]
    Package(String),

    #[error("failed to parse document XML: {0}")]
    Parse(String),

    #[error("missing package part: {0}")]
    MissingPart(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Result type for package operations
pub type Result<T> = std::result::Result<T, DocxError>;

/// Convert typographic points to twips (twentieths of a point)
pub fn pt_to_twips(pt: f64) -> u32 {
    (pt * 20.0).round() as u32
}

/// Convert centimeters to twips
pub fn cm_to_twips(cm: f64) -> u32 {
    (cm * 567.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversions() {
        assert_eq!(pt_to_twips(6.0), 120);
        assert_eq!(pt_to_twips(0.5), 10);
        assert_eq!(cm_to_twips(1.0), 567);
        assert_eq!(cm_to_twips(3.0), 1701);
    }
}
