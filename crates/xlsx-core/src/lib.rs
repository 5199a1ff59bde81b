//! XLSX Core - Low-level SpreadsheetML template editing
//!
//! This crate provides:
//! - Opening an .xlsx package from bytes and saving it back
//! - Whole-value cell reads and writes at fixed addresses
//! - Styled row insertion with downstream reference shifting
//! - PNG image anchoring at a cell
//!
//! The editor works directly on the worksheet XML text: the spreadsheet
//! format has no template-row construct, so row insertion clones the base
//! row's cell style ids and rewrites every downstream row reference.
//!
//! # Example
//!
//! ```ignore
//! use xlsx_core::XlsxEditor;
//!
//! let mut editor = XlsxEditor::open(&template_bytes)?;
//! editor.insert_rows(26, 4, 25)?;
//! editor.set_cell_text("B25", "Консультация")?;
//! let bytes = editor.save()?;
//! ```

mod addr;
mod drawing;
mod editor;

pub use addr::{column_index, column_letter, coord, split_coord};
pub use editor::XlsxEditor;

use thiserror::Error;

/// Errors that can occur during spreadsheet operations
#[derive(Debug, Error)]
pub enum XlsxError {
    #[error("failed to read package: {0}")]
    Package(String),

    #[error("missing package part: {0}")]
    MissingPart(String),

    #[error("malformed worksheet XML: {0}")]
    Malformed(String),

    #[error("invalid cell reference: {0}")]
    InvalidReference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Result type for spreadsheet operations
pub type Result<T> = std::result::Result<T, XlsxError>;
