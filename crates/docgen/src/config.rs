//! Engine configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::model::Executor;
use crate::Result;

/// Document generation configuration, loadable from a JSON file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Word contract template asset
    pub contract_template: PathBuf,
    /// Excel invoice template asset
    pub invoice_template: PathBuf,
    /// The fixed service-provider requisites
    pub executor: Executor,
    pub converter: ConverterConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            contract_template: PathBuf::from("assets/contract_template.docx"),
            invoice_template: PathBuf::from("assets/invoice_template.xlsx"),
            executor: Executor::default(),
            converter: ConverterConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// External PDF converter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub binary: String,
    pub timeout_secs: u64,
    /// Concurrent converter invocations are capped at this many permits
    pub max_concurrency: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            binary: "libreoffice".to_string(),
            timeout_secs: 120,
            max_concurrency: 1,
        }
    }
}
