use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};
use rust_decimal::Decimal;

use crate::models::invoice::{Invoice, InvoiceLineItem};
use crate::models::settings::{InvoiceSettings, UserConfig};

/// Company fields printed on the invoice header and footer.
///
/// All amounts on the document are pre-computed by the invoice builder and
/// pass through verbatim; the renderer does no business math.
#[derive(Debug, Clone)]
pub struct CompanyProfile {
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub payment_terms: String,
    pub notes: String,
    pub currency: String,
}

impl CompanyProfile {
    /// Builds a profile from stored configuration, falling back to
    /// placeholder text for anything not yet set up.
    pub fn from_config(
        config: Option<&UserConfig>,
        settings: Option<&InvoiceSettings>,
    ) -> Self {
        let field = |v: Option<&Option<String>>, fallback: &str| {
            v.and_then(|o| o.clone())
                .unwrap_or_else(|| fallback.to_string())
        };

        Self {
            name: field(config.map(|c| &c.company_name), "Your Company Name"),
            address: field(config.map(|c| &c.company_address), "Your Company Address"),
            email: field(config.map(|c| &c.company_email), "your@email.com"),
            phone: field(config.map(|c| &c.company_phone), "+1 234 567 890"),
            payment_terms: field(
                settings.map(|s| &s.payment_terms),
                "Please include the invoice number with your payment.",
            ),
            notes: field(settings.map(|s| &s.default_notes), ""),
            currency: settings
                .map(|s| s.currency.clone())
                .unwrap_or_else(|| "USD".to_string()),
        }
    }
}

/// Formats an amount with two decimals: `$` prefix for USD, code suffix
/// otherwise.
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    if currency == "USD" {
        format!("${:.2}", amount)
    } else {
        format!("{:.2} {}", amount, currency)
    }
}

const PAGE_W: f32 = 595.0;
const PAGE_H: f32 = 842.0;
const MARGIN: f32 = 50.0;
const ROW_H: f32 = 18.0;
const BODY_SIZE: f32 = 9.0;
const HEADER_SIZE: f32 = 10.0;
const TITLE_SIZE: f32 = 18.0;

const COL_WIDTHS: [f32; 4] = [265.0, 70.0, 80.0, 80.0];
const COL_HEADERS: [&str; 4] = ["Description", "Hours", "Rate", "Amount"];

/// Paginated invoice document writer.
struct InvoiceDoc {
    pdf: Pdf,
    catalog_id: Ref,
    pages_id: Ref,
    font_id: Ref,
    bold_id: Ref,
    page_refs: Vec<Ref>,
    next_id: i32,
    current_content_id: Option<Ref>,
}

impl InvoiceDoc {
    fn new() -> Self {
        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let pages_id = Ref::new(2);
        let font_id = Ref::new(3);
        let bold_id = Ref::new(4);

        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));
        pdf.type1_font(bold_id).base_font(Name(b"Helvetica-Bold"));

        Self {
            pdf,
            catalog_id,
            pages_id,
            font_id,
            bold_id,
            page_refs: Vec::new(),
            next_id: 5,
            current_content_id: None,
        }
    }

    fn fresh_ref(&mut self) -> Ref {
        let id = self.next_id;
        self.next_id += 1;
        Ref::new(id)
    }

    fn new_page(&mut self) -> Content {
        let page_id = self.fresh_ref();
        let content_id = self.fresh_ref();

        self.page_refs.push(page_id);

        let mut page = self.pdf.page(page_id);
        page.parent(self.pages_id)
            .media_box(Rect::new(0.0, 0.0, PAGE_W, PAGE_H))
            .contents(content_id);

        let mut resources = page.resources();
        let mut fonts = resources.fonts();
        fonts.pair(Name(b"F1"), self.font_id);
        fonts.pair(Name(b"F2"), self.bold_id);
        drop(fonts);
        drop(resources);
        drop(page);

        self.current_content_id = Some(content_id);

        Content::new()
    }

    fn finalize_page(&mut self, content: Content) {
        if let Some(id) = self.current_content_id.take() {
            self.pdf.stream(id, &content.finish());
        }
    }

    fn finish(mut self) -> Vec<u8> {
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        let mut pages = self.pdf.pages(self.pages_id);
        pages.count(self.page_refs.len() as i32);
        pages.kids(self.page_refs.clone());
        drop(pages);
        self.pdf.finish()
    }
}

fn draw_text(content: &mut Content, x: f32, y: f32, size: f32, text: &str) {
    content.begin_text();
    content.set_font(Name(b"F1"), size);
    content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
    content.show(Str(text.as_bytes()));
    content.end_text();
}

fn draw_bold(content: &mut Content, x: f32, y: f32, size: f32, text: &str) {
    content.begin_text();
    content.set_font(Name(b"F2"), size);
    content.set_text_matrix([1.0, 0.0, 0.0, 1.0, x, y]);
    content.show(Str(text.as_bytes()));
    content.end_text();
}

fn draw_table_row(content: &mut Content, y: f32, cells: &[String], bold: bool) {
    let mut x = MARGIN;
    for (i, cell) in cells.iter().enumerate() {
        if bold {
            draw_bold(content, x + 4.0, y + 5.0, HEADER_SIZE, cell);
        } else {
            draw_text(content, x + 4.0, y + 5.0, BODY_SIZE, cell);
        }
        x += COL_WIDTHS[i];
    }
}

fn draw_table_header(content: &mut Content, y: f32) {
    content.save_state();
    content.set_fill_rgb(0.17, 0.24, 0.31);
    content.rect(MARGIN, y, COL_WIDTHS.iter().sum(), ROW_H);
    content.fill_nonzero();
    content.restore_state();

    // White header text on the dark band.
    content.save_state();
    content.set_fill_rgb(1.0, 1.0, 1.0);
    let headers: Vec<String> = COL_HEADERS.iter().map(|s| s.to_string()).collect();
    draw_table_row(content, y, &headers, true);
    content.restore_state();
}

fn draw_footer(content: &mut Content) {
    content.save_state();
    content.set_fill_rgb(0.97, 0.98, 0.99);
    content.rect(0.0, 0.0, PAGE_W, 25.0);
    content.fill_nonzero();
    content.restore_state();
    draw_text(content, MARGIN, 10.0, 8.0, "Thank you for your business!");
}

fn draw_first_page_header(content: &mut Content, invoice: &Invoice, profile: &CompanyProfile) {
    let top = PAGE_H - MARGIN;

    draw_bold(content, MARGIN, top, TITLE_SIZE, &profile.name);

    let mut y = top - 18.0;
    for line in profile.address.lines() {
        draw_text(content, MARGIN, y, BODY_SIZE, line);
        y -= 11.0;
    }
    draw_text(content, MARGIN, y, BODY_SIZE, &profile.email);
    y -= 11.0;
    draw_text(content, MARGIN, y, BODY_SIZE, &profile.phone);

    // Invoice meta box, top right.
    let box_x = PAGE_W - MARGIN - 170.0;
    content.save_state();
    content.set_fill_rgb(0.97, 0.98, 0.99);
    content.rect(box_x, top - 40.0, 170.0, 48.0);
    content.fill_nonzero();
    content.restore_state();

    draw_bold(
        content,
        box_x + 6.0,
        top - 4.0,
        HEADER_SIZE,
        &format!("Invoice #: {}", invoice.invoice_number),
    );
    draw_text(
        content,
        box_x + 6.0,
        top - 18.0,
        BODY_SIZE,
        &format!("Date: {}", invoice.created_at.format("%Y-%m-%d")),
    );
    draw_text(
        content,
        box_x + 6.0,
        top - 32.0,
        BODY_SIZE,
        &format!("Due: {}", invoice.due_date.format("%Y-%m-%d")),
    );

    // Billing period banner.
    draw_bold(content, MARGIN, top - 80.0, HEADER_SIZE, "Billing Period:");
    draw_text(
        content,
        MARGIN + 80.0,
        top - 80.0,
        HEADER_SIZE,
        &format!(
            "{} - {}",
            invoice.start_date.format("%Y-%m-%d"),
            invoice.end_date.format("%Y-%m-%d")
        ),
    );
}

/// Renders an invoice and its line items into PDF bytes.
///
/// Line items flow across as many pages as needed; the totals block, payment
/// terms and notes follow the final row.
pub fn render_invoice(
    invoice: &Invoice,
    line_items: &[InvoiceLineItem],
    profile: &CompanyProfile,
) -> Vec<u8> {
    let mut doc = InvoiceDoc::new();
    let currency = profile.currency.as_str();

    let rows: Vec<[String; 4]> = line_items
        .iter()
        .map(|item| {
            [
                item.description.clone(),
                format!("{:.2}", item.quantity),
                format_currency(item.rate, currency),
                format_currency(item.amount, currency),
            ]
        })
        .collect();

    let mut content = doc.new_page();
    draw_first_page_header(&mut content, invoice, profile);
    draw_footer(&mut content);

    let mut y = PAGE_H - MARGIN - 100.0;
    draw_table_header(&mut content, y);
    y -= ROW_H;

    for (i, row) in rows.iter().enumerate() {
        if y - ROW_H < MARGIN {
            doc.finalize_page(content);
            content = doc.new_page();
            draw_footer(&mut content);
            y = PAGE_H - MARGIN - ROW_H;
            draw_table_header(&mut content, y);
            y -= ROW_H;
        }

        if i % 2 == 0 {
            content.save_state();
            content.set_fill_rgb(0.97, 0.98, 0.99);
            content.rect(MARGIN, y, COL_WIDTHS.iter().sum(), ROW_H);
            content.fill_nonzero();
            content.restore_state();
        }

        draw_table_row(&mut content, y, &row[..], false);
        y -= ROW_H;
    }

    // Totals plus terms need roughly a third of a page.
    if y - 140.0 < MARGIN {
        doc.finalize_page(content);
        content = doc.new_page();
        draw_footer(&mut content);
        y = PAGE_H - MARGIN;
    }

    let totals_x = PAGE_W - MARGIN - 180.0;
    y -= 16.0;
    draw_text(&mut content, totals_x, y, BODY_SIZE, "Subtotal:");
    draw_text(
        &mut content,
        totals_x + 100.0,
        y,
        BODY_SIZE,
        &format_currency(invoice.subtotal, currency),
    );

    if let Some(tax_rate) = invoice.tax_rate {
        y -= 14.0;
        draw_text(
            &mut content,
            totals_x,
            y,
            BODY_SIZE,
            &format!("Tax ({}%):", tax_rate),
        );
        draw_text(
            &mut content,
            totals_x + 100.0,
            y,
            BODY_SIZE,
            &format_currency(invoice.tax_amount.unwrap_or_default(), currency),
        );
    }

    y -= 18.0;
    draw_bold(&mut content, totals_x, y, HEADER_SIZE, "Total:");
    draw_bold(
        &mut content,
        totals_x + 100.0,
        y,
        HEADER_SIZE,
        &format_currency(invoice.total, currency),
    );

    y -= 30.0;
    draw_bold(&mut content, MARGIN, y, HEADER_SIZE, "Payment Instructions:");
    y -= 13.0;
    draw_text(&mut content, MARGIN, y, BODY_SIZE, &profile.payment_terms);

    if !profile.notes.is_empty() {
        y -= 20.0;
        draw_bold(&mut content, MARGIN, y, HEADER_SIZE, "Notes:");
        for line in profile.notes.lines() {
            y -= 13.0;
            draw_text(&mut content, MARGIN, y, BODY_SIZE, line);
        }
    }

    doc.finalize_page(content);
    doc.finish()
}
