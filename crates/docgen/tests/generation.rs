//! End-to-end generation tests over builder-produced and synthesized
//! templates

use std::io::Write;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use docgen::contract::{fill_services_table, generate_contract, generate_contract_from_path};
use docgen::invoice::{fill_line_items, generate_invoice, InvoiceLayout};
use docgen::{
    Agreement, BankDetails, ContractTemplateBuilder, DocgenError, DocumentEngine, EngineConfig,
    Executor, FullName, LineItem, Party, PartyKind,
};
use docx_core::DocxDocument;
use xlsx_core::XlsxEditor;

fn items(prices_kopecks: &[i64]) -> Vec<LineItem> {
    prices_kopecks
        .iter()
        .enumerate()
        .map(|(i, &kopecks)| LineItem {
            id: i as u32 + 1,
            name: format!("Сопровождение этапа {}", i + 1),
            price: Decimal::new(kopecks, 2),
            payment_terms: "100% предоплата в течение 3 рабочих дней".to_string(),
        })
        .collect()
}

fn agreement(prices_kopecks: &[i64]) -> Agreement {
    Agreement {
        number: "12-У".to_string(),
        date: NaiveDate::from_ymd_opt(2026, 8, 7).unwrap(),
        client: Party {
            kind: PartyKind::SoleProprietor,
            name: "ИП Петров Сидор Павлович".to_string(),
            short_name: None,
            ogrn: Some("315774600000123".to_string()),
            inn: Some("771234567890".to_string()),
            kpp: None,
            address: "г. Тверь, ул. Советская, д. 5".to_string(),
            email: Some("petrov@example.ru".to_string()),
            phone: Some("+7 (900) 123-45-67".to_string()),
            settlement_account: Some("40802810900000000001".to_string()),
            representative: FullName::new("Петров", "Сидор", Some("Павлович")),
            bank: Some(BankDetails {
                name: "ПАО «Банк»".to_string(),
                bik: "044525225".to_string(),
                correspondent_account: "30101810400000000225".to_string(),
            }),
        },
        items: items(prices_kopecks),
    }
}

/// Minimal invoice template honoring the default fixed layout: header
/// cells, a styled base item row at 25, summary rows below it
fn invoice_template() -> Vec<u8> {
    let sheet = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        r#"<dimension ref="A1:BF52"/>"#,
        r#"<sheetData>"#,
        r#"<row r="10"><c r="B10" s="1" t="inlineStr"><is>"#,
        r#"<t>Счет на оплату № {{contract_number}} от {{invoice_date}}</t></is></c></row>"#,
        r#"<row r="17"><c r="F17" t="inlineStr"><is><t>{{client_invoice_line}}</t></is></c></row>"#,
        r#"<row r="20"><c r="F20" t="inlineStr"><is>"#,
        r#"<t>Оплата по договору № {{contract_number}} от {{contract_date}}</t></is></c></row>"#,
        r#"<row r="24"><c r="B24" t="inlineStr"><is><t>№</t></is></c></row>"#,
        r#"<row r="25" ht="24" customHeight="1">"#,
        r#"<c r="B25" s="2"/><c r="D25" s="3"/><c r="Y25" s="3"/><c r="AJ25" s="2"/>"#,
        r#"<c r="AP25" s="2"/><c r="AS25" s="4"/><c r="BC25" s="4"/></row>"#,
        r#"<row r="26"><c r="AJ26" s="2"/><c r="BF26" s="4"/></row>"#,
        r#"<row r="28"><c r="AX28" t="inlineStr"><is><t>Итого:</t></is></c><c r="BC28" s="4"/></row>"#,
        r#"<row r="30"><c r="AX30" t="inlineStr"><is><t>Всего к оплате:</t></is></c><c r="BC30" s="4"/></row>"#,
        r#"<row r="32"><c r="B32" s="5"/></row>"#,
        r#"<row r="33"><c r="B33" s="5"/></row>"#,
        r#"<row r="45"><c r="B45" t="inlineStr"><is><t>М.П.</t></is></c></row>"#,
        r#"</sheetData>"#,
        r#"<mergeCells count="2"><mergeCell ref="B10:BF10"/><mergeCell ref="B32:BF32"/></mergeCells>"#,
        r#"</worksheet>"#
    );
    build_xlsx(sheet)
}

fn build_xlsx(sheet_xml: &str) -> Vec<u8> {
    let content_types = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
        r#"<Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#,
        r#"</Types>"#
    );
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
        r#"<sheets><sheet name="Счет" sheetId="1" r:id="rId1"/></sheets></workbook>"#
    );
    let workbook_rels = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>"#,
        r#"</Relationships>"#
    );

    let mut cursor = std::io::Cursor::new(Vec::new());
    let mut archive = zip::ZipWriter::new(&mut cursor);
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for (name, data) in [
        ("[Content_Types].xml", content_types),
        ("_rels/.rels", package_rels),
        ("xl/workbook.xml", workbook),
        ("xl/_rels/workbook.xml.rels", workbook_rels),
        ("xl/worksheets/sheet1.xml", sheet_xml),
    ] {
        archive.start_file(name, options).unwrap();
        archive.write_all(data.as_bytes()).unwrap();
    }
    archive.finish().unwrap();
    cursor.into_inner()
}

#[test]
fn test_contract_generation_resolves_every_placeholder() {
    let template = ContractTemplateBuilder::new(&Executor::default())
        .to_bytes()
        .unwrap();
    let contract = agreement(&[1000000, 2000000]);

    let generated = generate_contract(&contract, &template, &Executor::default()).unwrap();
    let doc = DocxDocument::open(&generated).unwrap();
    let text = doc.body_text();

    assert!(!text.contains("{{"), "unresolved placeholder in: {text}");
    assert!(text.contains("№ 12-У от 07.08.2026г."));
    assert!(text.contains("«7» августа 2026 г."));
    assert!(text.contains("Индивидуальный предприниматель Петров Сидор Павлович"));
    assert!(text.contains("30 000 руб. (тридцать тысяч рублей)"));
    assert!(text.contains("Сопровождение этапа 2"));

    // The services table carries its header plus one row per item
    let services_table = doc
        .tables()
        .find(|t| {
            t.rows
                .first()
                .map(|r| r.cells.iter().any(|c| c.text().contains("Наименование услуги")))
                .unwrap_or(false)
        })
        .unwrap();
    assert_eq!(services_table.rows.len(), 3);
}

#[test]
fn test_contract_generation_is_deterministic() {
    let template = ContractTemplateBuilder::new(&Executor::default())
        .to_bytes()
        .unwrap();
    let contract = agreement(&[1500000]);

    let first = generate_contract(&contract, &template, &Executor::default()).unwrap();
    let second = generate_contract(&contract, &template, &Executor::default()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_missing_template_path_degrades_to_fallback() {
    let contract = agreement(&[1000000, 500000, 250000]);
    let generated = generate_contract_from_path(
        &contract,
        std::path::Path::new("/nonexistent/template.docx"),
        &Executor::default(),
    )
    .unwrap();

    let doc = DocxDocument::open(&generated).unwrap();
    let table = doc.tables().next().unwrap();
    assert_eq!(table.rows.len(), contract.items.len() + 1);
    assert!(doc.body_text().contains("Итого: 17 500 руб."));
}

#[test]
fn test_word_and_invoice_totals_agree() {
    let layout = InvoiceLayout::default();

    for prices in [&[][..], &[2000000][..], &[100000, 200000, 300000, 400000, 500000][..]] {
        let line_items = items(prices);

        let template = ContractTemplateBuilder::new(&Executor::default())
            .to_bytes()
            .unwrap();
        let mut doc = DocxDocument::open(&template).unwrap();
        let word_total = fill_services_table(&mut doc, &line_items).unwrap();

        let mut editor = XlsxEditor::open(&invoice_template()).unwrap();
        if line_items.len() > 1 {
            editor
                .insert_rows(
                    layout.base_item_row + 1,
                    line_items.len() as u32 - 1,
                    layout.base_item_row,
                )
                .unwrap();
        }
        let invoice_total = fill_line_items(&mut editor, &line_items, &layout).unwrap();

        assert_eq!(word_total, invoice_total);
        let expected: Decimal = line_items.iter().map(|i| i.price).sum();
        assert_eq!(word_total, expected);
    }
}

#[test]
fn test_invoice_five_items_relocates_downstream_cells() {
    let contract = agreement(&[100000, 200000, 300000, 400000, 500000]);
    let generated =
        generate_invoice(&contract, &invoice_template(), &Executor::default()).unwrap();
    let editor = XlsxEditor::open(&generated).unwrap();

    // Header substitution happened as whole cell values
    assert_eq!(
        editor.cell_text("B10").unwrap(),
        "Счет на оплату № 12-У от 7 августа 2026 г."
    );
    assert_eq!(
        editor.cell_text("F17").unwrap(),
        "ИП Петров С.П., ИНН 771234567890, ОГРНИП 315774600000123"
    );

    // Items at rows 25..29 with the generated service code
    assert_eq!(editor.cell_text("D25").unwrap(), "Сопровождение этапа 1");
    assert_eq!(editor.cell_text("D29").unwrap(), "Сопровождение этапа 5");
    assert_eq!(editor.cell_text("Y25").unwrap(), "00-00000001");
    assert_eq!(editor.cell_text("B27").unwrap(), "3");
    assert_eq!(editor.cell_text("AS28").unwrap(), "4000.00");

    // Inserted rows cloned the base row styling
    assert!(editor.sheet_xml().contains(r#"<c r="BC27" s="4"/>"#)
        || editor.sheet_xml().contains(r#"<c r="BC27" s="4"><v>"#));

    // Summary cells moved down by four rows: 15000.00 total
    assert_eq!(editor.cell_text("AJ30").unwrap(), "5");
    assert_eq!(editor.cell_text("BF30").unwrap(), "15000.00");
    assert_eq!(editor.cell_text("BC32").unwrap(), "15000.00");
    assert_eq!(editor.cell_text("BC34").unwrap(), "15000.00");
    assert_eq!(
        editor.cell_text("B36").unwrap(),
        "Всего наименований 5, на сумму 15 000,00 руб."
    );
    assert_eq!(
        editor.cell_text("B37").unwrap(),
        "Пятнадцать тысяч рублей 00 копеек"
    );

    // Merged ranges: the header merge stays, the summary merge shifted
    assert!(editor.sheet_xml().contains(r#"<mergeCell ref="B10:BF10"/>"#));
    assert!(editor.sheet_xml().contains(r#"<mergeCell ref="B36:BF36"/>"#));

    // The payment QR is anchored four rows below its base position
    assert!(editor.part("xl/media/image1.png").is_some());
    let drawing =
        String::from_utf8(editor.part("xl/drawings/drawing1.xml").unwrap().to_vec()).unwrap();
    assert!(drawing.contains("<xdr:row>53</xdr:row>"));
}

#[test]
fn test_invoice_single_item_keeps_base_addresses() {
    let contract = agreement(&[2000000]);
    let generated =
        generate_invoice(&contract, &invoice_template(), &Executor::default()).unwrap();
    let editor = XlsxEditor::open(&generated).unwrap();

    assert_eq!(editor.cell_text("D25").unwrap(), "Сопровождение этапа 1");
    assert_eq!(editor.cell_text("BC30").unwrap(), "20000.00");
    assert_eq!(
        editor.cell_text("B33").unwrap(),
        "Двадцать тысяч рублей 00 копеек"
    );
    assert!(editor.sheet_xml().contains(r#"<mergeCell ref="B32:BF32"/>"#));

    let drawing =
        String::from_utf8(editor.part("xl/drawings/drawing1.xml").unwrap().to_vec()).unwrap();
    assert!(drawing.contains("<xdr:row>49</xdr:row>"));
}

#[test]
fn test_invoice_grand_total_relocation_property() {
    let layout = InvoiceLayout::default();
    let one = layout.payable_cell(1);
    let five = layout.payable_cell(5);
    assert_eq!(one, "BC30");
    assert_eq!(five, "BC34");

    for (count, cell) in [(1usize, one), (5usize, five)] {
        let prices: Vec<i64> = (0..count).map(|_| 100000).collect();
        let contract = agreement(&prices);
        let generated =
            generate_invoice(&contract, &invoice_template(), &Executor::default()).unwrap();
        let editor = XlsxEditor::open(&generated).unwrap();
        let expected: Decimal = contract.items.iter().map(|i| i.price).sum();
        assert_eq!(editor.cell_text(&cell).unwrap(), expected.to_string());
    }
}

#[test]
fn test_invoice_without_base_row_is_structure_mismatch() {
    let sheet = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
        r#"<sheetData><row r="1"><c r="A1"><v>1</v></c></row></sheetData>"#,
        r#"</worksheet>"#
    );
    let result = generate_invoice(&agreement(&[100000]), &build_xlsx(sheet), &Executor::default());
    match result {
        Err(DocgenError::TemplateStructureMismatch(what)) => {
            assert!(what.contains("base row 25"));
        }
        other => panic!("expected TemplateStructureMismatch, got {other:?}"),
    }
}

#[test]
fn test_engine_paths_and_missing_invoice_template() {
    let dir = tempfile::tempdir().unwrap();
    let contract_path = dir.path().join("contract_template.docx");
    ContractTemplateBuilder::new(&Executor::default())
        .save(&contract_path)
        .unwrap();

    let mut config = EngineConfig::default();
    config.contract_template = contract_path;
    config.invoice_template = dir.path().join("missing_invoice.xlsx");
    let engine = DocumentEngine::new(config);

    let contract = agreement(&[2000000]);
    let docx = engine.contract_docx(&contract).unwrap();
    assert!(DocxDocument::open(&docx).unwrap().body_text().contains("12-У"));

    match engine.invoice_xlsx(&contract) {
        Err(DocgenError::TemplateMissing(path)) => {
            assert!(path.ends_with("missing_invoice.xlsx"));
        }
        other => panic!("expected TemplateMissing, got {other:?}"),
    }
}
