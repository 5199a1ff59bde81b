//! External office-suite PDF conversion

use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::config::ConverterConfig;
use crate::{DocgenError, Result};

/// Kind of the source package handed to the converter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Docx,
    Xlsx,
}

impl SourceKind {
    fn extension(self) -> &'static str {
        match self {
            SourceKind::Docx => "docx",
            SourceKind::Xlsx => "xlsx",
        }
    }
}

/// Converts generated packages to PDF by invoking an external office suite
/// over a temporary file.
///
/// The converter process is single-instance-per-machine and serializes
/// internally, so concurrent invocations are capped by a permit pool
/// instead of fanning out.
pub struct PdfConverter {
    binary: String,
    timeout: Duration,
    permits: Permits,
}

impl PdfConverter {
    pub fn new(config: &ConverterConfig) -> Self {
        Self {
            binary: config.binary.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
            permits: Permits::new(config.max_concurrency.max(1)),
        }
    }

    /// Convert a generated package to PDF bytes. Failures surface the
    /// converter's captured stderr; no retries are attempted.
    pub fn convert(&self, source: &[u8], kind: SourceKind) -> Result<Vec<u8>> {
        let _permit = self.permits.acquire();

        let dir = tempfile::tempdir()?;
        let source_path = dir.path().join(format!("document.{}", kind.extension()));
        std::fs::write(&source_path, source)?;

        debug!(binary = %self.binary, kind = ?kind, bytes = source.len(), "converting to PDF");

        let mut child = Command::new(&self.binary)
            .args(["--headless", "--convert-to", "pdf", "--outdir"])
            .arg(dir.path())
            .arg(&source_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| DocgenError::ConversionFailed {
                reason: format!("failed to launch {}: {e}", self.binary),
                stderr: String::new(),
            })?;

        let started = Instant::now();
        let status = loop {
            match child.try_wait()? {
                Some(status) => break status,
                None if started.elapsed() >= self.timeout => {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!(timeout = ?self.timeout, "PDF converter timed out");
                    return Err(DocgenError::ConversionFailed {
                        reason: format!("converter timed out after {:?}", self.timeout),
                        stderr: String::new(),
                    });
                }
                None => std::thread::sleep(Duration::from_millis(100)),
            }
        };

        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            let _ = pipe.read_to_string(&mut stderr);
        }

        if !status.success() {
            return Err(DocgenError::ConversionFailed {
                reason: format!("converter exited with {status}"),
                stderr,
            });
        }

        let pdf_path = source_path.with_extension("pdf");
        match std::fs::read(&pdf_path) {
            Ok(bytes) => Ok(bytes),
            Err(_) => Err(DocgenError::ConversionFailed {
                reason: "converter produced no output file".to_string(),
                stderr,
            }),
        }
    }
}

/// A counting semaphore: bounded converter concurrency without pulling in
/// an async runtime
struct Permits {
    available: Mutex<usize>,
    released: Condvar,
}

impl Permits {
    fn new(count: usize) -> Self {
        Self {
            available: Mutex::new(count),
            released: Condvar::new(),
        }
    }

    fn acquire(&self) -> PermitGuard<'_> {
        let mut available = self
            .available
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        while *available == 0 {
            available = self
                .released
                .wait(available)
                .unwrap_or_else(|poisoned| poisoned.into_inner());
        }
        *available -= 1;
        PermitGuard { permits: self }
    }

    fn release(&self) {
        let mut available = self
            .available
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *available += 1;
        self.released.notify_one();
    }
}

struct PermitGuard<'a> {
    permits: &'a Permits,
}

impl Drop for PermitGuard<'_> {
    fn drop(&mut self) {
        self.permits.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_conversion_failure() {
        let converter = PdfConverter::new(&ConverterConfig {
            binary: "/nonexistent/office-converter".to_string(),
            timeout_secs: 5,
            max_concurrency: 1,
        });
        match converter.convert(b"dummy", SourceKind::Docx) {
            Err(DocgenError::ConversionFailed { reason, .. }) => {
                assert!(reason.contains("failed to launch"));
            }
            other => panic!("expected ConversionFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_nonzero_exit_captures_stderr() {
        // `false` exits 1 without reading its arguments
        let converter = PdfConverter::new(&ConverterConfig {
            binary: "false".to_string(),
            timeout_secs: 5,
            max_concurrency: 1,
        });
        match converter.convert(b"dummy", SourceKind::Xlsx) {
            Err(DocgenError::ConversionFailed { reason, .. }) => {
                assert!(reason.contains("exited with"));
            }
            other => panic!("expected ConversionFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_permits_bound_concurrency() {
        let permits = Permits::new(2);
        let first = permits.acquire();
        let _second = permits.acquire();
        assert_eq!(*permits.available.lock().unwrap(), 0);
        drop(first);
        assert_eq!(*permits.available.lock().unwrap(), 1);
    }
}
