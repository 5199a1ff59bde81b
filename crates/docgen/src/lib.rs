//! Docgen - contract and invoice document generation
//!
//! This crate produces legally formatted business documents from an
//! [`Agreement`](model::Agreement) record:
//! - Word contract documents by placeholder substitution into a template,
//!   with line-item table synthesis and a degraded fallback document
//! - Excel payment invoices by styled row insertion into a fixed-layout
//!   template, with a GOST R 56042-2014 payment QR code
//! - PDF renditions via an external office-suite converter
//!
//! # Example
//!
//! ```ignore
//! use docgen::{DocumentEngine, EngineConfig};
//!
//! let engine = DocumentEngine::new(EngineConfig::from_file("docgen.json".as_ref())?);
//! let docx = engine.contract_docx(&agreement)?;
//! let xlsx = engine.invoice_xlsx(&agreement)?;
//! ```

pub mod config;
pub mod contract;
pub mod engine;
pub mod invoice;
pub mod model;
pub mod pdf;
pub mod qr;
pub mod replacements;
pub mod sections;
pub mod template_builder;

pub use config::{ConverterConfig, EngineConfig};
pub use engine::DocumentEngine;
pub use model::{
    Agreement, BankDetails, CompanyForm, Executor, FullName, IdentityDocument, LineItem, Party,
    PartyKind,
};
pub use pdf::{PdfConverter, SourceKind};
pub use qr::PaymentOrder;
pub use replacements::ReplacementMap;
pub use template_builder::ContractTemplateBuilder;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during document generation
#[derive(Debug, Error)]
pub enum DocgenError {
    #[error("template asset not found: {0}")]
    TemplateMissing(PathBuf),

    #[error("template structure mismatch: {0}")]
    TemplateStructureMismatch(String),

    #[error("field {field} contains characters not representable in Windows-1251")]
    UnencodableField { field: String },

    #[error("invalid payment amount: {0}")]
    InvalidAmount(String),

    #[error("QR encoding error: {0}")]
    Qr(String),

    #[error("image encoding error: {0}")]
    Image(String),

    #[error("PDF conversion failed: {reason}")]
    ConversionFailed { reason: String, stderr: String },

    #[error("document error: {0}")]
    Docx(#[from] docx_core::DocxError),

    #[error("spreadsheet error: {0}")]
    Xlsx(#[from] xlsx_core::XlsxError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for document generation
pub type Result<T> = std::result::Result<T, DocgenError>;
