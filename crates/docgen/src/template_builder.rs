//! Offline builder of the base contract template.
//!
//! Reproduces the template asset from the source-controlled section list
//! instead of a binary blob; no request-time role.

use std::path::Path;

use docx_core::{
    cm_to_twips, pt_to_twips, Align, DocxDocument, Paragraph, Run, Table, TableCell, TableRow,
    VAlign,
};

use crate::contract::{SERVICES_MARKER, SERVICE_COL_WIDTHS};
use crate::model::Executor;
use crate::replacements::executor_preamble;
use crate::sections::{Section, CONTRACT_SECTIONS};
use crate::Result;

/// Title font size in half-points (11pt, bold)
const TITLE_SIZE: u32 = 22;
/// 0.30 inch first-line indent
const FIRST_LINE_INDENT: u32 = 432;
const LINE_SPACING: f64 = 1.15;

/// Builds the base contract .docx from declarative content
pub struct ContractTemplateBuilder {
    doc: DocxDocument,
    executor: Executor,
}

impl ContractTemplateBuilder {
    pub fn new(executor: &Executor) -> Self {
        Self {
            doc: DocxDocument::new(),
            executor: executor.clone(),
        }
    }

    /// Three centered bold title lines
    fn add_header(&mut self) {
        for (text, space_after) in [
            ("Договор", 0),
            ("возмездного оказания услуг", 0),
            ("№ {{contract_number}} от {{contract_date}}г.", 240),
        ] {
            self.doc.add_paragraph(
                Paragraph::new()
                    .align(Align::Center)
                    .space_after(space_after)
                    .add_run(Run::new(text).bold().size(TITLE_SIZE)),
            );
        }
    }

    /// Borderless two-column city / date line
    fn add_city_and_date(&mut self) {
        let half = cm_to_twips(8.25);
        self.doc.add_table(
            Table::new(vec![half, half]).add_row(TableRow::new(vec![
                TableCell::new()
                    .width(half)
                    .add_paragraph(Paragraph::with_text(self.executor.city.clone())),
                TableCell::new().width(half).add_paragraph(
                    Paragraph::with_text("«{{day}}» {{date_text}} г.").align(Align::Right),
                ),
            ])),
        );
        self.doc.add_paragraph(Paragraph::new());
    }

    fn add_preamble(&mut self) {
        let text = format!(
            "{}, и {{{{client_header}}}}, именуемый в дальнейшем «Заказчик», вместе \
             именуемые «Стороны», а по отдельности «Сторона», заключили настоящий договор \
             о нижеследующем:",
            executor_preamble(&self.executor)
        );
        self.doc.add_paragraph(body_paragraph(text, true));
    }

    fn add_section(&mut self, section: &Section) {
        self.doc.add_paragraph(
            Paragraph::new()
                .align(Align::Left)
                .left_indent(cm_to_twips(1.25))
                .space_before(0)
                .space_after(0)
                .add_run(
                    Run::new(format!("{}. {}", section.number, section.title))
                        .bold()
                        .size(TITLE_SIZE),
                ),
        );
        for paragraph in section.paragraphs {
            self.doc.add_paragraph(body_paragraph(*paragraph, true));
        }
    }

    /// Bordered 5x2 requisites grid with the signature line
    fn add_requisites_table(&mut self, with_heading: bool, lead_with_empty: bool) {
        if lead_with_empty {
            self.doc.add_paragraph(Paragraph::new());
        }
        if with_heading {
            self.doc.add_paragraph(
                Paragraph::new()
                    .align(Align::Left)
                    .space_before(240)
                    .space_after(0)
                    .add_run(
                        Run::new(format!("{}. Реквизиты Сторон:", CONTRACT_SECTIONS.len() + 1))
                            .bold()
                            .size(TITLE_SIZE),
                    ),
            );
        }

        let half = cm_to_twips(8.25);
        let header_cell = |text: &str| {
            TableCell::new().width(half).valign(VAlign::Center).add_paragraph(
                Paragraph::new()
                    .align(Align::Center)
                    .space_before(240)
                    .space_after(240)
                    .add_run(Run::new(text).bold()),
            )
        };
        let block_cell = |placeholder: &str| {
            TableCell::new().width(half).add_paragraph(
                Paragraph::with_text(placeholder).space_before(pt_to_twips(6.0)),
            )
        };
        let label_cell = || {
            TableCell::new().width(half).add_paragraph(
                Paragraph::with_text("Банковские реквизиты:").space_after(pt_to_twips(6.0)),
            )
        };
        let signature_cell = |line: String| {
            TableCell::new().width(half).add_paragraph(
                Paragraph::with_text(line)
                    .space_before(pt_to_twips(24.0))
                    .space_after(pt_to_twips(6.0)),
            )
        };

        self.doc.add_table(
            Table::new(vec![half, half])
                .bordered()
                .add_row(TableRow::new(vec![
                    header_cell("Исполнитель"),
                    header_cell("Заказчик"),
                ]))
                .add_row(TableRow::new(vec![
                    block_cell("{{executor_main}}"),
                    block_cell("{{requisites_main}}"),
                ]))
                .add_row(TableRow::new(vec![label_cell(), label_cell()]))
                .add_row(TableRow::new(vec![
                    block_cell("{{executor_bank}}"),
                    block_cell("{{requisites_bank}}"),
                ]))
                .add_row(TableRow::new(vec![
                    signature_cell(format!(
                        "_________________/{} /",
                        self.executor.signature()
                    )),
                    signature_cell("_________________/{{signatory}} /".to_string()),
                ])),
        );
    }

    /// The task page: title lines, intro, and the 3-column services table
    /// carrying the sentinel row consumed at generation time
    fn add_task_page(&mut self) {
        for (text, space_after) in [
            ("Задание Заказчика № 1", 0),
            ("возмездного оказания услуг", 0),
            ("{{contract_number}} от {{contract_date}}г.", 240),
        ] {
            self.doc.add_paragraph(
                Paragraph::new()
                    .align(Align::Center)
                    .space_after(space_after)
                    .add_run(Run::new(text).bold().size(TITLE_SIZE)),
            );
        }

        self.doc.add_paragraph(body_paragraph(
            "На основании Договора возмездного оказания услуг от «{{day}}» {{date_text}} г. \
             Исполнитель обязуется:",
            false,
        ));

        let header_cell = |text: &str, width: u32| {
            let mut paragraph = Paragraph::new()
                .align(Align::Center)
                .space_before(pt_to_twips(6.0))
                .space_after(pt_to_twips(6.0));
            if !text.is_empty() {
                paragraph = paragraph.add_run(Run::new(text));
            }
            TableCell::new()
                .width(width)
                .valign(VAlign::Center)
                .add_paragraph(paragraph)
        };

        self.doc.add_table(
            Table::new(SERVICE_COL_WIDTHS.to_vec())
                .bordered()
                .fixed_layout()
                .add_row(TableRow::new(vec![
                    header_cell("", SERVICE_COL_WIDTHS[0]),
                    header_cell("Наименование услуги", SERVICE_COL_WIDTHS[1]),
                    header_cell("Стоимость (руб.) и порядок оплаты", SERVICE_COL_WIDTHS[2]),
                ]))
                .add_row(TableRow::new(vec![
                    TableCell::with_text(SERVICES_MARKER).width(SERVICE_COL_WIDTHS[0]),
                    TableCell::new().width(SERVICE_COL_WIDTHS[1]),
                    TableCell::new().width(SERVICE_COL_WIDTHS[2]),
                ])),
        );
    }

    /// Assemble the full template
    pub fn build(mut self) -> DocxDocument {
        self.add_header();
        self.add_city_and_date();
        self.add_preamble();
        for section in CONTRACT_SECTIONS {
            self.add_section(section);
        }
        self.add_requisites_table(true, false);
        self.doc.add_page_break();
        self.add_task_page();
        self.add_requisites_table(false, true);
        self.doc
    }

    pub fn to_bytes(self) -> Result<Vec<u8>> {
        Ok(self.build().save()?)
    }

    pub fn save(self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

fn body_paragraph(text: impl Into<String>, first_line_indent: bool) -> Paragraph {
    let mut paragraph = Paragraph::with_text(text)
        .align(Align::Justify)
        .space_after(0)
        .line_spacing(LINE_SPACING);
    if first_line_indent {
        paragraph = paragraph.first_line_indent(FIRST_LINE_INDENT);
    }
    paragraph
}
