//! GOST R 56042-2014 payment QR payload encoding and rasterization

use std::io::Cursor;

use chrono::NaiveDate;
use encoding_rs::WINDOWS_1251;
use image::Luma;
use qrcode::{EcLevel, QrCode};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use ru_text::format_date_compact;

use crate::model::Executor;
use crate::{DocgenError, Result};

/// Format tag: version 0001, payload encoded in Windows-1251
pub const FORMAT_TAG: &str = "ST00011";

/// A payment order rendered into the pipe-delimited payload of
/// GOST R 56042-2014
#[derive(Debug, Clone, PartialEq)]
pub struct PaymentOrder {
    pub payee_name: String,
    pub account: String,
    pub bank_name: String,
    pub bic: String,
    pub correspondent_account: String,
    pub payee_inn: String,
    /// Absent for sole proprietors; encoded as the literal "0"
    pub kpp: Option<String>,
    pub purpose: String,
    pub amount: Decimal,
}

impl PaymentOrder {
    /// Payment order for an invoice issued by the executor
    pub fn for_invoice(
        executor: &Executor,
        invoice_number: &str,
        invoice_date: NaiveDate,
        amount: Decimal,
    ) -> Self {
        Self {
            payee_name: executor.legal_name_upper(),
            account: executor.settlement_account.clone(),
            bank_name: executor.bank.name.clone(),
            bic: executor.bank.bik.clone(),
            correspondent_account: executor.bank.correspondent_account.clone(),
            payee_inn: executor.inn.clone(),
            kpp: executor.kpp.clone(),
            purpose: format!(
                "Оплата по счету №{} от {}",
                invoice_number,
                format_date_compact(invoice_date)
            ),
            amount,
        }
    }

    /// Amount in integer minor currency units (kopecks), no fractional point
    pub fn minor_units(&self) -> Result<u64> {
        (self.amount * Decimal::from(100))
            .round()
            .to_u64()
            .ok_or_else(|| DocgenError::InvalidAmount(self.amount.to_string()))
    }

    fn fields(&self) -> Result<Vec<(&'static str, String)>> {
        Ok(vec![
            ("Name", self.payee_name.clone()),
            ("PersonalAcc", self.account.clone()),
            ("BankName", self.bank_name.clone()),
            ("BIC", self.bic.clone()),
            ("CorrespAcc", self.correspondent_account.clone()),
            ("PayeeINN", self.payee_inn.clone()),
            ("KPP", self.kpp.clone().unwrap_or_else(|| "0".to_string())),
            ("Purpose", self.purpose.clone()),
            ("Sum", self.minor_units()?.to_string()),
        ])
    }

    /// The payload as text, for inspection and tests
    pub fn payload(&self) -> Result<String> {
        let mut parts = vec![FORMAT_TAG.to_string()];
        for (name, value) in self.fields()? {
            parts.push(format!("{name}={value}"));
        }
        Ok(parts.join("|"))
    }

    /// Encode the payload in Windows-1251.
    ///
    /// This is a bank-read standard: a field with characters outside the
    /// codepage is a hard error, never a lossy substitution.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut payload = FORMAT_TAG.as_bytes().to_vec();
        for (name, value) in self.fields()? {
            payload.push(b'|');
            let field = format!("{name}={value}");
            let (encoded, _, had_errors) = WINDOWS_1251.encode(&field);
            if had_errors {
                return Err(DocgenError::UnencodableField {
                    field: name.to_string(),
                });
            }
            payload.extend_from_slice(&encoded);
        }
        Ok(payload)
    }
}

/// Rasterize a payload as a PNG QR image: automatic version sizing,
/// error-correction level M (~15%)
pub fn render_qr_png(payload: &[u8]) -> Result<Vec<u8>> {
    let code = QrCode::with_error_correction_level(payload, EcLevel::M)
        .map_err(|e| DocgenError::Qr(e.to_string()))?;

    let image = code.render::<Luma<u8>>().min_dimensions(200, 200).build();

    let mut bytes = Vec::new();
    image::DynamicImage::ImageLuma8(image)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .map_err(|e| DocgenError::Image(e.to_string()))?;

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn order() -> PaymentOrder {
        PaymentOrder::for_invoice(
            &Executor::default(),
            "12-У",
            NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(),
            Decimal::new(1234567, 2),
        )
    }

    #[test]
    fn test_amount_in_minor_units() {
        assert_eq!(order().minor_units().unwrap(), 1234567);

        let mut whole = order();
        whole.amount = Decimal::new(2000000, 2);
        assert_eq!(whole.minor_units().unwrap(), 2000000);
    }

    #[test]
    fn test_payload_layout() {
        let payload = order().payload().unwrap();
        assert!(payload.starts_with("ST00011|Name=ИНДИВИДУАЛЬНЫЙ ПРЕДПРИНИМАТЕЛЬ "));
        assert!(payload.contains("|PersonalAcc=40802810000000000000|"));
        assert!(payload.contains("|BIC=044525000|"));
        assert!(payload.contains("|KPP=0|"));
        assert!(payload.contains("|Purpose=Оплата по счету №12-У от 07.08.2026|"));
        assert!(payload.ends_with("|Sum=1234567"));
    }

    #[test]
    fn test_encode_windows_1251() {
        let encoded = order().encode().unwrap();
        // The codepage is single-byte: "Name=" is ASCII, the Cyrillic
        // banner starts with И = 0xC8
        let name_at = encoded
            .windows(5)
            .position(|w| w == b"Name=")
            .unwrap();
        assert_eq!(encoded[name_at + 5], 0xC8);
    }

    #[test]
    fn test_unrepresentable_character_is_hard_error() {
        let mut bad = order();
        bad.bank_name = "АО «Crédit Банк»".to_string(); // é has no cp1251 mapping
        match bad.encode() {
            Err(DocgenError::UnencodableField { field }) => assert_eq!(field, "BankName"),
            other => panic!("expected UnencodableField, got {other:?}"),
        }
    }

    #[test]
    fn test_windows_1251_punctuation_is_representable() {
        // The codepage carries the Windows typographic range: «», — and №
        // must pass through, only truly unmappable characters fail
        let mut typographic = order();
        typographic.purpose = "Оплата по счету №12 — услуги".to_string();
        assert!(typographic.encode().is_ok());
    }

    #[test]
    fn test_render_qr_png_signature() {
        let png = render_qr_png(&order().encode().unwrap()).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
