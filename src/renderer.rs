//! The invoice-to-PDF conversion entry point.

use std::fs;
use std::io::Write;
use std::path::Path;

use log::{debug, info};

use crate::annotations;
use crate::builder::DocumentBuilder;
use crate::config::RendererConfig;
use crate::error::RenderError;
use crate::fonts;
use crate::layout;
use crate::model::Invoice;
use crate::styles::LIGHT_FONT_SIZE;

const LINE_SPACING: f64 = 1.0;

/// A finished PDF document.
#[derive(Clone, Debug)]
pub struct RenderedPdf {
    /// The complete PDF byte stream.
    pub bytes: Vec<u8>,
    /// Number of pages in the document; one unless the products overflow the page.
    pub page_count: usize,
}

/// Renders [`Invoice`] values into PDF documents.
#[derive(Clone, Debug, Default)]
pub struct InvoiceRenderer {
    config: RendererConfig,
}

impl InvoiceRenderer {
    /// Creates a renderer with the given configuration.
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Lays out and renders `invoice`, returning the PDF bytes with the pay button overlays.
    pub fn render(&self, invoice: &Invoice) -> Result<RenderedPdf, RenderError> {
        invoice.validate()?;

        let layout = layout::build(invoice, &self.config)?;
        let font_family =
            fonts::load_font_family(&self.config.fonts).map_err(RenderError::FontLoad)?;

        let page = &self.config.page;
        let mut document = DocumentBuilder::new()
            .with_paper_size(page.paper_size())
            .with_margins(page.margins())
            .with_title(format!("Invoice #{}", invoice.number))
            .with_line_spacing(LINE_SPACING)
            .with_font_size(LIGHT_FONT_SIZE)
            .build(font_family);
        document.push(layout.body);

        let mut raw = Vec::new();
        document.render(&mut raw).map_err(RenderError::Layout)?;
        debug!(
            "Rendered invoice #{} layout ({} bytes before annotations)",
            invoice.number,
            raw.len()
        );

        let annotated = annotations::apply_page_overlays(&raw, &layout.overlays)?;
        info!(
            "Rendered invoice #{}: {} page(s), {} fill(s), {} link(s), {} bytes",
            invoice.number,
            annotated.page_count,
            layout.overlays.fills.len(),
            layout.overlays.links.len(),
            annotated.bytes.len()
        );

        Ok(RenderedPdf {
            bytes: annotated.bytes,
            page_count: annotated.page_count,
        })
    }

    /// Renders `invoice` and writes the complete document to `writer`.
    pub fn render_to_writer<W: Write>(
        &self,
        invoice: &Invoice,
        writer: &mut W,
    ) -> Result<RenderedPdf, RenderError> {
        let pdf = self.render(invoice)?;
        writer.write_all(&pdf.bytes)?;
        writer.flush()?;
        Ok(pdf)
    }

    /// Renders `invoice` into the file at `path`, replacing any existing file.
    pub fn render_to_file(
        &self,
        invoice: &Invoice,
        path: impl AsRef<Path>,
    ) -> Result<RenderedPdf, RenderError> {
        let path = path.as_ref();
        let pdf = self.render(invoice)?;
        fs::write(path, &pdf.bytes)?;
        debug!("Wrote {} ({} bytes)", path.display(), pdf.bytes.len());
        Ok(pdf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_invoice_fails_before_fonts_are_loaded() {
        let mut invoice = Invoice::sample();
        invoice.link.clear();
        let renderer = InvoiceRenderer::new(
            RendererConfig::new().with_fonts(fonts::FontSource::file("/__invoice_pdf_missing__.ttf")),
        );
        assert!(matches!(
            renderer.render(&invoice),
            Err(RenderError::InvalidInvoice(_))
        ));
    }

    #[test]
    fn missing_font_file_is_a_font_error() {
        let renderer = InvoiceRenderer::new(
            RendererConfig::new().with_fonts(fonts::FontSource::file("/__invoice_pdf_missing__.ttf")),
        );
        assert!(matches!(
            renderer.render(&Invoice::sample()),
            Err(RenderError::FontLoad(_))
        ));
    }

    #[test]
    fn failed_render_leaves_writer_untouched() {
        let renderer = InvoiceRenderer::new(
            RendererConfig::new().with_fonts(fonts::FontSource::file("/__invoice_pdf_missing__.ttf")),
        );
        let mut sink = Vec::new();
        assert!(renderer.render_to_writer(&Invoice::sample(), &mut sink).is_err());
        assert!(sink.is_empty());
    }
}
