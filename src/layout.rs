//! Composition of the invoice page from `genpdf` elements.
//!
//! All distances are given in PDF points and converted with [`pt`].  The pay button is the only
//! element whose page position has to be known after rendering (for its background and link
//! overlays), which is why it always sits in the first row of the first element on the page.

use genpdf::elements::{LinearLayout, PaddedElement, Paragraph, TableLayout};
use genpdf::style::{Style, StyledString};
use genpdf::{Alignment, Element, Margins, Size};

use crate::annotations::{LinkAnnotation, PageFill, PageOverlays, PdfRect};
use crate::config::{pt, Labels, PageGeometry, RendererConfig};
use crate::elements::{
    decode_image, sized_image, HorizontalRule, PayButton, RuledCellDecorator, SignatureTotal,
};
use crate::error::RenderError;
use crate::format::{format_amount, group_thousands};
use crate::model::Invoice;
use crate::styles::{
    self, BLACK, BOLD_FONT_SIZE, LIGHT_BLACK, LIGHT_FONT_SIZE, LIGHT_GRAY, PAY_BLUE, RULE_GRAY,
    TITLE_FONT_SIZE, WHITE,
};

/// Horizontal inset of every section relative to the page margins.
pub const SECTION_INSET_PT: f64 = 15.0;
/// Gap above the parties and products sections.
pub const SECTION_MARGIN_TOP_PT: f64 = 50.0;
pub const SEPARATOR_MARGIN_TOP_PT: f64 = 20.0;
pub const SEPARATOR_THICKNESS_PT: f64 = 1.0;
/// Vertical padding of product cells and of the grand total row.
pub const CELL_PADDING_PT: f64 = 20.0;
pub const PRODUCT_RULE_THICKNESS_PT: f64 = 1.0;
pub const TOTAL_RULE_THICKNESS_PT: f64 = 2.0;
pub const TOTAL_PADDING_TOP_PT: f64 = 10.0;
pub const SIGNATURE_SIZE_PT: f64 = 50.0;
pub const PAY_BUTTON_WIDTH_PT: f64 = 100.0;
pub const PAY_BUTTON_PADDING_PT: f64 = 12.0;

/// Page number (1-based) the pay button is drawn on.
const PAY_BUTTON_PAGE: usize = 1;

/// Height of the pay button: padding above and below one line of label text.
pub fn pay_button_height_pt() -> f64 {
    2.0 * PAY_BUTTON_PADDING_PT + 1.5 * f64::from(LIGHT_FONT_SIZE)
}

/// Width of the pay button, shrunk to the header column on narrow pages.
fn pay_button_width_pt(page: &PageGeometry) -> f64 {
    let column = (page.content_width_pt() - 2.0 * SECTION_INSET_PT) / 2.0;
    PAY_BUTTON_WIDTH_PT.min(column.max(0.0))
}

/// Page rectangle covered by the pay button, in PDF user space (origin bottom left).
pub fn pay_button_rect(page: &PageGeometry) -> PdfRect {
    let right = page.width_pt - page.margin_right_pt - SECTION_INSET_PT;
    let top = page.height_pt - page.margin_top_pt;
    PdfRect {
        left: right - pay_button_width_pt(page),
        bottom: top - pay_button_height_pt(),
        right,
        top,
    }
}

/// The element tree for one invoice together with the overlays to add after rendering.
pub struct InvoiceLayout {
    pub body: LinearLayout,
    pub overlays: PageOverlays,
}

fn inset(top_pt: f64) -> Margins {
    Margins::trbl(pt(top_pt), pt(SECTION_INSET_PT), 0, pt(SECTION_INSET_PT))
}

fn empty_cell() -> Paragraph {
    Paragraph::new("")
}

/// Pads a table cell vertically, leaving room for the row rule below the bottom padding.
fn ruled_cell<E: Element>(element: E, rule_pt: f64) -> PaddedElement<E> {
    element.padded(Margins::trbl(
        pt(CELL_PADDING_PT),
        0,
        pt(CELL_PADDING_PT + rule_pt),
        0,
    ))
}

fn header(
    invoice: &Invoice,
    labels: &Labels,
    page: &PageGeometry,
) -> Result<TableLayout, RenderError> {
    let title_style = Style::new()
        .bold()
        .with_font_size(TITLE_FONT_SIZE)
        .with_color(BLACK);
    let title = Paragraph::new(StyledString::new(
        format!("Invoice #{}", invoice.number),
        title_style,
    ));

    let button_style = Style::new()
        .with_font_size(LIGHT_FONT_SIZE)
        .with_color(WHITE);
    let button = PayButton::new(
        labels.pay_button.clone(),
        button_style,
        pt(pay_button_width_pt(page)),
        pt(pay_button_height_pt()),
    );

    let mut table = TableLayout::new(vec![1, 1]);
    table
        .row()
        .element(title)
        .element(button)
        .push()
        .map_err(RenderError::Layout)?;
    table
        .row()
        .element(styles::light_text(invoice.date.clone(), Alignment::Left))
        .element(empty_cell())
        .push()
        .map_err(RenderError::Layout)?;
    Ok(table)
}

fn parties(invoice: &Invoice, labels: &Labels) -> Result<TableLayout, RenderError> {
    let mut table = TableLayout::new(vec![1, 1]);
    table
        .row()
        .element(styles::light_text(labels.from.clone(), Alignment::Left))
        .element(styles::light_text(labels.to.clone(), Alignment::Right))
        .push()
        .map_err(RenderError::Layout)?;
    table
        .row()
        .element(styles::bold_text(invoice.from.name.clone(), BLACK, Alignment::Left))
        .element(styles::bold_text(invoice.to.name.clone(), BLACK, Alignment::Right))
        .push()
        .map_err(RenderError::Layout)?;
    table
        .row()
        .element(styles::light_text(invoice.from.address.clone(), Alignment::Left))
        .element(styles::light_text(invoice.to.address.clone(), Alignment::Right))
        .push()
        .map_err(RenderError::Layout)?;
    Ok(table)
}

fn products(invoice: &Invoice, labels: &Labels) -> Result<TableLayout, RenderError> {
    let mut table = TableLayout::new(vec![1, 1, 1, 1]);
    table.set_cell_decorator(RuledCellDecorator::new(LIGHT_GRAY, pt(PRODUCT_RULE_THICKNESS_PT)));
    let cell = |text: String, color| {
        ruled_cell(
            styles::bold_text(text, color, Alignment::Center),
            PRODUCT_RULE_THICKNESS_PT,
        )
    };

    let mut titles = table.row();
    for title in [
        &labels.description,
        &labels.rate,
        &labels.quantity,
        &labels.subtotal,
    ] {
        titles.push_element(cell(title.clone(), BLACK));
    }
    titles.push().map_err(RenderError::Layout)?;

    for product in &invoice.products {
        let subtotal = product.subtotal()?;
        table
            .row()
            .element(cell(product.description.clone(), LIGHT_BLACK))
            .element(cell(format_amount(product.rate, labels), LIGHT_BLACK))
            .element(cell(group_thousands(product.quantity), LIGHT_BLACK))
            .element(cell(format_amount(subtotal, labels), LIGHT_BLACK))
            .push()
            .map_err(RenderError::Layout)?;
    }
    Ok(table)
}

fn grand_total_label(labels: &Labels) -> Result<TableLayout, RenderError> {
    let mut table = TableLayout::new(vec![1]);
    table.set_cell_decorator(RuledCellDecorator::new(RULE_GRAY, pt(TOTAL_RULE_THICKNESS_PT)));
    let style = styles::light().with_font_size(BOLD_FONT_SIZE);
    let label = Paragraph::new(StyledString::new(labels.grand_total.clone(), style))
        .aligned(Alignment::Right);
    table
        .row()
        .element(ruled_cell(label, TOTAL_RULE_THICKNESS_PT))
        .push()
        .map_err(RenderError::Layout)?;
    Ok(table)
}

fn signature_total(invoice: &Invoice, labels: &Labels) -> Result<SignatureTotal, RenderError> {
    let total = invoice.total()?;
    let signature = invoice
        .signature
        .as_ref()
        .map(|source| {
            let size = Size::new(pt(SIGNATURE_SIZE_PT), pt(SIGNATURE_SIZE_PT));
            decode_image(source).and_then(|image| sized_image(image, size, Alignment::Left))
        })
        .transpose()
        .map_err(RenderError::Image)?;

    let mut row = SignatureTotal::new(format_amount(total, labels), styles::bold(BLACK))
        .with_padding_top(pt(TOTAL_PADDING_TOP_PT));
    if let Some(image) = signature {
        row = row.with_signature(image, pt(SIGNATURE_SIZE_PT));
    }
    Ok(row)
}

/// Builds the invoice page for `invoice`.
pub fn build(invoice: &Invoice, config: &RendererConfig) -> Result<InvoiceLayout, RenderError> {
    let labels = &config.labels;

    let mut body = LinearLayout::vertical();
    body.push(header(invoice, labels, &config.page)?.padded(inset(0.0)));
    body.push(
        HorizontalRule::new(RULE_GRAY, pt(SEPARATOR_THICKNESS_PT))
            .with_margin_top(pt(SEPARATOR_MARGIN_TOP_PT)),
    );
    body.push(parties(invoice, labels)?.padded(inset(SECTION_MARGIN_TOP_PT)));
    body.push(products(invoice, labels)?.padded(inset(SECTION_MARGIN_TOP_PT)));
    body.push(grand_total_label(labels)?.padded(inset(0.0)));
    body.push(signature_total(invoice, labels)?.padded(inset(0.0)));

    let button = pay_button_rect(&config.page);
    let overlays = PageOverlays {
        fills: vec![PageFill::new(PAY_BUTTON_PAGE, button, PAY_BLUE)],
        links: vec![LinkAnnotation::new(PAY_BUTTON_PAGE, button, invoice.link.clone())],
    };

    Ok(InvoiceLayout { body, overlays })
}
