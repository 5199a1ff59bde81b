//! Engine entry points binding configuration to the generators

use tracing::info;

use crate::config::EngineConfig;
use crate::contract::generate_contract_from_path;
use crate::invoice::generate_invoice;
use crate::model::Agreement;
use crate::pdf::{PdfConverter, SourceKind};
use crate::{DocgenError, Result};

/// Stateless document generation facade.
///
/// Every call reads the template asset fresh and works on its own
/// in-memory copy, so concurrent generations need no coordination; only
/// the PDF converter is pooled.
pub struct DocumentEngine {
    config: EngineConfig,
    converter: PdfConverter,
}

impl DocumentEngine {
    pub fn new(config: EngineConfig) -> Self {
        let converter = PdfConverter::new(&config.converter);
        Self { config, converter }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Contract as a Word package
    pub fn contract_docx(&self, agreement: &Agreement) -> Result<Vec<u8>> {
        info!(number = %agreement.number, "generating contract document");
        generate_contract_from_path(
            agreement,
            &self.config.contract_template,
            &self.config.executor,
        )
    }

    /// Invoice as an Excel package with the embedded payment QR
    pub fn invoice_xlsx(&self, agreement: &Agreement) -> Result<Vec<u8>> {
        info!(number = %agreement.number, "generating invoice document");
        let path = &self.config.invoice_template;
        if !path.exists() {
            return Err(DocgenError::TemplateMissing(path.clone()));
        }
        let template = std::fs::read(path)?;
        generate_invoice(agreement, &template, &self.config.executor)
    }

    /// Contract rendered to PDF via the external converter
    pub fn contract_pdf(&self, agreement: &Agreement) -> Result<Vec<u8>> {
        let docx = self.contract_docx(agreement)?;
        self.converter.convert(&docx, SourceKind::Docx)
    }

    /// Invoice rendered to PDF via the external converter
    pub fn invoice_pdf(&self, agreement: &Agreement) -> Result<Vec<u8>> {
        let xlsx = self.invoice_xlsx(agreement)?;
        self.converter.convert(&xlsx, SourceKind::Xlsx)
    }
}
