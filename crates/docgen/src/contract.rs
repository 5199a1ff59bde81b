//! Contract document generation: table synthesis, substitution, fallback

use std::path::Path;

use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use docx_core::{Align, DocxDocument, Paragraph, Run, Table, TableCell, TableRow, VAlign};
use ru_text::{amount_in_words, format_amount, format_amount_whole, format_date_compact};

use crate::model::{Agreement, LineItem, PartyKind};
use crate::replacements::build_replacements;
use crate::{Executor, Result};

/// Sentinel token marking the line-item row of the template's services table
pub const SERVICES_MARKER: &str = "{{services}}";

/// Services table column widths in twips: 1cm, 8cm, 8cm
pub(crate) const SERVICE_COL_WIDTHS: [u32; 3] = [567, 4536, 4536];

/// Locate the services table by its sentinel row, remove the sentinel, and
/// append one styled row per line item. Returns the exact running total, or
/// `None` when no table carries the sentinel (the template is then left
/// untouched and the caller falls back to a synthesized document).
pub fn fill_services_table(doc: &mut DocxDocument, items: &[LineItem]) -> Option<Decimal> {
    let (table, marker_row) = doc
        .tables_mut()
        .find_map(|table| table.find_row(SERVICES_MARKER).map(|row| (table, row)))?;

    table.rows.remove(marker_row);

    let mut total = Decimal::ZERO;
    for (index, item) in items.iter().enumerate() {
        table.rows.push(service_row(index + 1, item));
        total += item.price;
    }

    debug!(items = items.len(), %total, "services table synthesized");
    Some(total)
}

/// One generated services row: right-aligned number, name, and a
/// multi-paragraph cost cell. The cost cell uses genuine paragraph breaks
/// so every consuming office application renders the line structure.
fn service_row(number: usize, item: &LineItem) -> TableRow {
    let cost_cell = TableCell::new()
        .width(SERVICE_COL_WIDTHS[2])
        .valign(VAlign::Center)
        .add_paragraph(
            Paragraph::with_text(format!(
                "Стоимость: {} руб. ({}).",
                format_amount_whole(item.price),
                amount_in_words(item.price)
            ))
            .space_before(120)
            .space_after(120),
        )
        .add_paragraph(Paragraph::with_text("Порядок оплаты:"))
        .add_paragraph(Paragraph::with_text(item.payment_terms.clone()));

    TableRow::new(vec![
        TableCell::new()
            .width(SERVICE_COL_WIDTHS[0])
            .valign(VAlign::Center)
            .add_paragraph(Paragraph::with_text(format!("{number}.")).align(Align::Right)),
        TableCell::new()
            .width(SERVICE_COL_WIDTHS[1])
            .valign(VAlign::Center)
            .add_paragraph(Paragraph::with_text(item.name.clone())),
        cost_cell,
    ])
}

/// Generate the contract document from template bytes.
///
/// A template without the services sentinel degrades to the minimal
/// fallback document; it is never an error.
pub fn generate_contract(
    agreement: &Agreement,
    template: &[u8],
    executor: &Executor,
) -> Result<Vec<u8>> {
    let mut doc = DocxDocument::open(template)?;

    match fill_services_table(&mut doc, &agreement.items) {
        Some(total) => {
            let replacements = build_replacements(agreement, total, executor);
            doc.replace_placeholders(replacements.pairs());
            Ok(doc.save()?)
        }
        None => {
            warn!(
                number = %agreement.number,
                "services sentinel absent from template, producing fallback document"
            );
            generate_fallback(agreement)
        }
    }
}

/// Generate the contract from the configured template path. A missing asset
/// degrades to the fallback document, matching the templated path's totals.
pub fn generate_contract_from_path(
    agreement: &Agreement,
    template_path: &Path,
    executor: &Executor,
) -> Result<Vec<u8>> {
    if !template_path.exists() {
        warn!(
            path = %template_path.display(),
            "contract template missing, producing fallback document"
        );
        return generate_fallback(agreement);
    }
    let template = std::fs::read(template_path)?;
    generate_contract(agreement, &template, executor)
}

/// Minimal synthesized contract: heading, client block, services grid.
/// The degraded mode when no usable template is available.
pub fn generate_fallback(agreement: &Agreement) -> Result<Vec<u8>> {
    info!(number = %agreement.number, "generating fallback contract document");

    let client = &agreement.client;
    let mut doc = DocxDocument::new();

    doc.add_paragraph(
        Paragraph::new()
            .add_run(Run::new(format!("Договор № {}", agreement.number)).bold().size(32))
            .space_after(120),
    );
    doc.add_paragraph(Paragraph::with_text(format!(
        "Дата: {}",
        format_date_compact(agreement.date)
    )));
    doc.add_paragraph(Paragraph::new());

    doc.add_paragraph(heading("Клиент"));
    doc.add_paragraph(Paragraph::with_text(format!("Тип: {}", client.kind.label())));
    doc.add_paragraph(Paragraph::with_text(format!(
        "Наименование: {}",
        client.name
    )));
    doc.add_paragraph(Paragraph::with_text(format!(
        "ФИО: {}",
        client.representative.full()
    )));
    if let Some(ref inn) = client.inn {
        doc.add_paragraph(Paragraph::with_text(format!("ИНН: {inn}")));
    }
    if let Some(ref ogrn) = client.ogrn {
        let label = match client.kind {
            PartyKind::SoleProprietor => "ОГРНИП",
            _ => "ОГРН",
        };
        doc.add_paragraph(Paragraph::with_text(format!("{label}: {ogrn}")));
    }
    if let Some(ref kpp) = client.kpp {
        doc.add_paragraph(Paragraph::with_text(format!("КПП: {kpp}")));
    }
    if !client.address.is_empty() {
        doc.add_paragraph(Paragraph::with_text(format!("Адрес: {}", client.address)));
    }
    if let Some(ref phone) = client.phone {
        doc.add_paragraph(Paragraph::with_text(format!("Телефон: {phone}")));
    }
    if let Some(ref email) = client.email {
        doc.add_paragraph(Paragraph::with_text(format!("Email: {email}")));
    }
    if let Some(ref account) = client.settlement_account {
        doc.add_paragraph(Paragraph::with_text(format!("Расчётный счёт: {account}")));
    }
    if let Some(ref bank) = client.bank {
        doc.add_paragraph(Paragraph::with_text(format!("Банк: {}", bank.name)));
        doc.add_paragraph(Paragraph::with_text(format!("БИК: {}", bank.bik)));
        doc.add_paragraph(Paragraph::with_text(format!(
            "Кор. счёт: {}",
            bank.correspondent_account
        )));
    }

    doc.add_paragraph(Paragraph::new());
    doc.add_paragraph(heading("Услуги"));

    let mut table = Table::new(vec![567, 3600, 2300, 2888])
        .bordered()
        .add_row(TableRow::new(vec![
            TableCell::with_text("№"),
            TableCell::with_text("Наименование"),
            TableCell::with_text("Стоимость"),
            TableCell::with_text("Порядок оплаты"),
        ]));

    let mut total = Decimal::ZERO;
    for (index, item) in agreement.items.iter().enumerate() {
        table = table.add_row(TableRow::new(vec![
            TableCell::with_text(format!("{}", index + 1)),
            TableCell::with_text(item.name.clone()),
            TableCell::with_text(format!("{} руб.", format_amount(item.price))),
            TableCell::with_text(item.payment_terms.clone()),
        ]));
        total += item.price;
    }
    doc.add_table(table);

    doc.add_paragraph(
        Paragraph::with_text(format!(
            "Итого: {} руб. ({})",
            format_amount_whole(total),
            amount_in_words(total)
        ))
        .space_before(120),
    );

    Ok(doc.save()?)
}

fn heading(text: &str) -> Paragraph {
    Paragraph::new()
        .add_run(Run::new(text).bold().size(26))
        .space_before(120)
        .space_after(60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FullName, Party};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn items(prices: &[i64]) -> Vec<LineItem> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &kopecks)| LineItem {
                id: i as u32 + 1,
                name: format!("Услуга {}", i + 1),
                price: Decimal::new(kopecks, 2),
                payment_terms: "Предоплата 100%".to_string(),
            })
            .collect()
    }

    fn agreement(item_prices: &[i64]) -> Agreement {
        Agreement {
            number: "3-Т".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
            client: Party {
                kind: PartyKind::SoleProprietor,
                name: "ИП Смирнов".to_string(),
                short_name: None,
                ogrn: Some("315774600000123".to_string()),
                inn: Some("771234567890".to_string()),
                kpp: None,
                address: "г. Казань".to_string(),
                email: None,
                phone: None,
                settlement_account: None,
                representative: FullName::new("Смирнов", "Олег", None),
                bank: None,
            },
            items: items(item_prices),
        }
    }

    fn template_with_marker() -> DocxDocument {
        let mut doc = DocxDocument::new();
        doc.add_table(
            Table::new(SERVICE_COL_WIDTHS.to_vec())
                .bordered()
                .add_row(TableRow::new(vec![
                    TableCell::with_text(""),
                    TableCell::with_text("Наименование услуги"),
                    TableCell::with_text("Стоимость (руб.) и порядок оплаты"),
                ]))
                .add_row(TableRow::new(vec![
                    TableCell::with_text(SERVICES_MARKER),
                    TableCell::new(),
                    TableCell::new(),
                ])),
        );
        doc
    }

    #[test]
    fn test_fill_services_table_total_and_rows() {
        let mut doc = template_with_marker();
        let total = fill_services_table(&mut doc, &items(&[1000000, 2550050])).unwrap();
        assert_eq!(total, Decimal::new(3550050, 2));

        let table = doc.tables().next().unwrap();
        // Header plus two generated rows, marker removed
        assert_eq!(table.rows.len(), 3);
        assert!(!doc.body_text().contains(SERVICES_MARKER));
        assert_eq!(table.rows[1].cells[0].text(), "1.");
        assert_eq!(table.rows[2].cells[1].text(), "Услуга 2");
        // Three genuine paragraphs in the cost cell
        assert_eq!(table.rows[1].cells[2].paragraphs.len(), 3);
        assert!(table.rows[1].cells[2].text().contains("10 000 руб."));
    }

    #[test]
    fn test_fill_services_table_empty_items() {
        let mut doc = template_with_marker();
        let total = fill_services_table(&mut doc, &[]).unwrap();
        assert_eq!(total, Decimal::ZERO);
        assert_eq!(doc.tables().next().unwrap().rows.len(), 1);
    }

    #[test]
    fn test_missing_sentinel_leaves_template_untouched() {
        let mut doc = DocxDocument::new();
        doc.add_paragraph(Paragraph::with_text("Без таблицы"));
        assert!(fill_services_table(&mut doc, &items(&[100])).is_none());
        assert_eq!(doc.body_text(), "Без таблицы");
    }

    #[test]
    fn test_generate_contract_substitutes_everything() {
        let mut template = template_with_marker();
        template.add_paragraph(Paragraph::with_text(
            "Договор № {{contract_number}} от {{contract_date}}г., {{client_header}}",
        ));
        let bytes = template.save().unwrap();

        let generated =
            generate_contract(&agreement(&[2000000]), &bytes, &Executor::default()).unwrap();
        let doc = DocxDocument::open(&generated).unwrap();
        let text = doc.body_text();
        assert!(!text.contains("{{"));
        assert!(text.contains("Договор № 3-Т от 01.02.2026г."));
        assert!(text.contains("Индивидуальный предприниматель Смирнов Олег"));
    }

    #[test]
    fn test_sentinel_less_template_falls_back() {
        let mut template = DocxDocument::new();
        template.add_paragraph(Paragraph::with_text("Шаблон без таблицы услуг"));
        let bytes = template.save().unwrap();

        let contract = agreement(&[1000000, 500000, 250000]);
        let generated = generate_contract(&contract, &bytes, &Executor::default()).unwrap();
        let doc = DocxDocument::open(&generated).unwrap();

        // Same item count in the fallback grid (plus the header row)
        let table = doc.tables().next().unwrap();
        assert_eq!(table.rows.len(), contract.items.len() + 1);
        // Identical computed total: 17500.00
        assert!(doc.body_text().contains("Итого: 17 500 руб."));
    }
}
