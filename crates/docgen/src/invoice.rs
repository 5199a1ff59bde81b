//! Invoice generation: styled row insertion into the fixed-layout template

use rust_decimal::Decimal;
use tracing::{debug, info};

use ru_text::{amount_in_words_with_kopecks, format_amount, format_date_compact, format_date_long};
use xlsx_core::{coord, XlsxEditor};

use crate::model::{Agreement, Executor, LineItem};
use crate::qr::{render_qr_png, PaymentOrder};
use crate::replacements::build_client_invoice_line;
use crate::{DocgenError, Result};

/// QR image edge in pixels (~2.5 cm)
const QR_SIZE_PX: u32 = 95;

/// The invoice template's fixed addressing scheme. All rows and columns are
/// 1-based; downstream relocation is a pure function of this layout and the
/// item count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLayout {
    /// First (and only pre-authored) line-item row
    pub base_item_row: u32,
    /// Sequence number column (B)
    pub col_number: u32,
    /// Item name column (D)
    pub col_name: u32,
    /// Generated service code column (Y)
    pub col_code: u32,
    /// Quantity column (AJ)
    pub col_quantity: u32,
    /// Unit column (AP)
    pub col_unit: u32,
    /// Unit price column (AS)
    pub col_price: u32,
    /// Line total column (BC)
    pub col_line_total: u32,
    /// Item-count summary row and its columns
    pub count_row: u32,
    pub count_col: u32,
    pub count_total_col: u32,
    /// Subtotal and grand-total rows, sharing one amount column
    pub subtotal_row: u32,
    pub payable_row: u32,
    pub totals_col: u32,
    /// Text summary rows ("Всего наименований…" and the words line)
    pub names_summary_row: u32,
    pub words_row: u32,
    pub text_col: u32,
    /// Payment QR anchor
    pub qr_row: u32,
    pub qr_col: u32,
    /// Header cells substituted as whole values
    pub header_cell: &'static str,
    pub client_cell: &'static str,
    pub basis_cell: &'static str,
}

impl Default for InvoiceLayout {
    fn default() -> Self {
        Self {
            base_item_row: 25,
            col_number: 2,      // B
            col_name: 4,        // D
            col_code: 25,       // Y
            col_quantity: 36,   // AJ
            col_unit: 42,       // AP
            col_price: 45,      // AS
            col_line_total: 55, // BC
            count_row: 26,
            count_col: 36,       // AJ
            count_total_col: 58, // BF
            subtotal_row: 28,
            payable_row: 30,
            totals_col: 55, // BC
            names_summary_row: 32,
            words_row: 33,
            text_col: 2, // B
            qr_row: 50,
            qr_col: 2, // B
            header_cell: "B10",
            client_cell: "F17",
            basis_cell: "F20",
        }
    }
}

impl InvoiceLayout {
    /// Rows every downstream fixed-position cell shifts by
    pub fn row_offset(&self, item_count: usize) -> u32 {
        item_count.saturating_sub(1) as u32
    }

    /// Relocated grand-total cell address for an item count
    pub fn payable_cell(&self, item_count: usize) -> String {
        coord(self.payable_row + self.row_offset(item_count), self.totals_col)
    }
}

/// Generate the payment invoice with the default template layout
pub fn generate_invoice(
    agreement: &Agreement,
    template: &[u8],
    executor: &Executor,
) -> Result<Vec<u8>> {
    generate_invoice_with_layout(agreement, template, executor, &InvoiceLayout::default())
}

/// Generate the payment invoice. Unlike the contract path there is no
/// fallback layout: a template without the line-item base row is fatal.
pub fn generate_invoice_with_layout(
    agreement: &Agreement,
    template: &[u8],
    executor: &Executor,
    layout: &InvoiceLayout,
) -> Result<Vec<u8>> {
    info!(number = %agreement.number, items = agreement.items.len(), "generating invoice");

    let mut editor = XlsxEditor::open(template)?;
    if !editor
        .sheet_xml()
        .contains(&format!(r#"<row r="{}""#, layout.base_item_row))
    {
        return Err(DocgenError::TemplateStructureMismatch(format!(
            "line-item base row {} absent from invoice template",
            layout.base_item_row
        )));
    }

    let header_replacements = vec![
        ("{{contract_number}}".to_string(), agreement.number.clone()),
        (
            "{{contract_date}}".to_string(),
            format_date_compact(agreement.date),
        ),
        (
            "{{invoice_date}}".to_string(),
            format_date_long(agreement.date),
        ),
        (
            "{{client_invoice_line}}".to_string(),
            build_client_invoice_line(&agreement.client),
        ),
    ];
    for cell in [layout.header_cell, layout.client_cell, layout.basis_cell] {
        editor.replace_in_cell(cell, &header_replacements)?;
    }

    if agreement.items.len() > 1 {
        editor.insert_rows(
            layout.base_item_row + 1,
            agreement.items.len() as u32 - 1,
            layout.base_item_row,
        )?;
    }

    let total = fill_line_items(&mut editor, &agreement.items, layout)?;
    update_totals(&mut editor, layout, total, agreement.items.len())?;

    let order = PaymentOrder::for_invoice(executor, &agreement.number, agreement.date, total);
    let qr_png = render_qr_png(&order.encode()?)?;
    let offset = layout.row_offset(agreement.items.len());
    editor.add_png_image(
        &qr_png,
        layout.qr_row + offset,
        layout.qr_col,
        QR_SIZE_PX,
        QR_SIZE_PX,
    )?;

    Ok(editor.save()?)
}

/// Write per-item values at the layout's fixed column offsets. Returns the
/// exact running total, computed independently of the contract path.
pub fn fill_line_items(
    editor: &mut XlsxEditor,
    items: &[LineItem],
    layout: &InvoiceLayout,
) -> Result<Decimal> {
    let mut total = Decimal::ZERO;

    for (index, item) in items.iter().enumerate() {
        let row = layout.base_item_row + index as u32;

        editor.set_cell_number(&coord(row, layout.col_number), &(index + 1).to_string())?;
        editor.set_cell_text(&coord(row, layout.col_name), &item.name)?;
        editor.set_cell_text(&coord(row, layout.col_code), &format!("00-{:08}", item.id))?;
        editor.set_cell_number(&coord(row, layout.col_quantity), "1")?;
        editor.set_cell_text(&coord(row, layout.col_unit), "шт")?;
        editor.set_cell_number(&coord(row, layout.col_price), &item.price.to_string())?;
        editor.set_cell_number(&coord(row, layout.col_line_total), &item.price.to_string())?;

        total += item.price;
    }

    debug!(items = items.len(), %total, "invoice line items written");
    Ok(total)
}

/// Relocate and fill the summary cells below the expanded table
fn update_totals(
    editor: &mut XlsxEditor,
    layout: &InvoiceLayout,
    total: Decimal,
    item_count: usize,
) -> Result<()> {
    let offset = layout.row_offset(item_count);

    editor.set_cell_number(
        &coord(layout.count_row + offset, layout.count_col),
        &item_count.to_string(),
    )?;
    editor.set_cell_number(
        &coord(layout.count_row + offset, layout.count_total_col),
        &total.to_string(),
    )?;
    editor.set_cell_number(
        &coord(layout.subtotal_row + offset, layout.totals_col),
        &total.to_string(),
    )?;
    editor.set_cell_number(
        &coord(layout.payable_row + offset, layout.totals_col),
        &total.to_string(),
    )?;
    editor.set_cell_text(
        &coord(layout.names_summary_row + offset, layout.text_col),
        &format!(
            "Всего наименований {item_count}, на сумму {} руб.",
            format_amount(total)
        ),
    )?;
    editor.set_cell_text(
        &coord(layout.words_row + offset, layout.text_col),
        &amount_in_words_with_kopecks(total),
    )?;

    Ok(())
}
