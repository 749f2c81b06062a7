use std::io::Cursor;

use image::{DynamicImage, ImageBuffer, ImageOutputFormat, Rgba};
use std::path::PathBuf;

use invoice_pdf::fonts::{self, FontSource};
use invoice_pdf::{ImageSource, Invoice, InvoiceRenderer, Product, RendererConfig};
use lopdf::content::Operation;
use lopdf::{Document, Object};
use sha2::{Digest, Sha256};

const SKIP_MESSAGE: &str =
    "no usable font. Set INVOICE_PDF_FONT_FILE or INVOICE_PDF_FONTS_DIR to run it.";

/// Fonts used when the invoice fonts are not installed.  They lack Hangul glyphs, which only
/// affects the look of the output, not its layout.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
    "C:\\Windows\\Fonts\\malgun.ttf",
];

fn renderer_config() -> Option<RendererConfig> {
    if fonts::default_fonts_available() {
        return Some(RendererConfig::default());
    }
    SYSTEM_FONTS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
        .map(|path| RendererConfig::new().with_fonts(FontSource::file(path)))
}

fn render(invoice: &Invoice) -> Option<invoice_pdf::RenderedPdf> {
    let config = renderer_config()?;
    let pdf = InvoiceRenderer::new(config)
        .render(invoice)
        .expect("render invoice pdf");
    Some(pdf)
}

/// A transparent signature-like stroke, encoded as PNG.
fn signature_png() -> Vec<u8> {
    let buffer = ImageBuffer::from_fn(120, 60, |x, y| {
        let curve = 30.0 + 18.0 * ((x as f32) / 12.0).sin();
        if ((y as f32) - curve).abs() < 3.0 {
            Rgba([20, 20, 60, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });

    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(buffer)
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .expect("encode signature png");
    bytes
}

fn scrub_pdf(bytes: &[u8]) -> Vec<u8> {
    fn scrub_segment(data: &mut [u8], tag: &[u8], terminator: u8) {
        let mut index = 0;
        while index + tag.len() < data.len() {
            if data[index..].starts_with(tag) {
                let mut cursor = index + tag.len();
                while cursor < data.len() {
                    let byte = data[cursor];
                    if byte == terminator {
                        break;
                    }
                    if terminator == b')' {
                        data[cursor] = b'0';
                    } else if !matches!(byte, b'<' | b'>' | b' ' | b'\n' | b'\r' | b'\t') {
                        data[cursor] = b'0';
                    }
                    cursor += 1;
                }
                index = cursor;
            } else {
                index += 1;
            }
        }
    }

    fn scrub_xml(data: &mut [u8], start: &[u8], end: &[u8]) {
        let mut offset = 0;
        while offset + start.len() < data.len() {
            let Some(start_pos) = data[offset..]
                .windows(start.len())
                .position(|window| window == start)
            else {
                break;
            };
            let start_index = offset + start_pos + start.len();
            let Some(end_pos) = data[start_index..]
                .windows(end.len())
                .position(|window| window == end)
            else {
                break;
            };
            for byte in &mut data[start_index..start_index + end_pos] {
                if !matches!(*byte, b'<' | b'>' | b'/' | b' ' | b'\n' | b'\r' | b'\t') {
                    *byte = b'0';
                }
            }
            offset = start_index + end_pos + end.len();
        }
    }

    let mut normalized = bytes.to_vec();
    scrub_segment(&mut normalized, b"/CreationDate(", b')');
    scrub_segment(&mut normalized, b"/ModDate(", b')');
    scrub_segment(&mut normalized, b"/ID[", b']');
    scrub_segment(&mut normalized, b"/Producer(", b')');
    for tag in [
        "xmp:CreateDate",
        "xmp:ModifyDate",
        "xmp:MetadataDate",
        "xmpMM:DocumentID",
        "xmpMM:InstanceID",
        "xmpMM:VersionID",
    ] {
        let start = format!("<{}>", tag);
        let end = format!("</{}>", tag);
        scrub_xml(&mut normalized, start.as_bytes(), end.as_bytes());
    }
    normalized
}

fn normalized_hash(bytes: &[u8]) -> [u8; 32] {
    let normalized = scrub_pdf(bytes);
    let digest = Sha256::digest(&normalized);
    digest.into()
}

fn link_uris(bytes: &[u8]) -> Vec<Vec<u8>> {
    let document = Document::load_mem(bytes).expect("rendered pdf parses");
    let page_id = document.get_pages()[&1];
    let page = document
        .get_object(page_id)
        .and_then(Object::as_dict)
        .expect("first page dictionary");
    let Ok(annotations) = page.get(b"Annots").and_then(Object::as_array) else {
        return Vec::new();
    };

    annotations
        .iter()
        .filter_map(|reference| {
            let id = reference.as_reference().ok()?;
            let annotation = document.get_object(id).and_then(Object::as_dict).ok()?;
            let action = annotation.get(b"A").and_then(Object::as_dict).ok()?;
            action.get(b"URI").and_then(Object::as_str).ok().map(<[u8]>::to_vec)
        })
        .collect()
}

fn first_page_streams(bytes: &[u8]) -> Vec<Vec<Operation>> {
    let document = Document::load_mem(bytes).expect("rendered pdf parses");
    let page_id = document.get_pages()[&1];
    document
        .get_page_contents(page_id)
        .into_iter()
        .map(|id| {
            document
                .get_object(id)
                .and_then(Object::as_stream)
                .and_then(|stream| stream.decode_content())
                .expect("content stream decodes")
                .operations
        })
        .collect()
}

fn operands(operation: &Operation) -> Vec<f32> {
    operation
        .operands
        .iter()
        .map(|value| value.as_float().expect("numeric operand"))
        .collect()
}

#[test]
fn renders_sample_invoice_on_one_page() {
    let Some(pdf) = render(&Invoice::sample()) else {
        eprintln!("Skipping renders_sample_invoice_on_one_page: {}", SKIP_MESSAGE);
        return;
    };
    assert!(pdf.bytes.starts_with(b"%PDF"), "output should be a PDF");
    assert_eq!(pdf.page_count, 1);
}

#[test]
fn pay_button_links_to_invoice_link() {
    let mut invoice = Invoice::sample();
    invoice.link = "https://pay.example.com/invoices/7877859".to_owned();
    let Some(pdf) = render(&invoice) else {
        eprintln!("Skipping pay_button_links_to_invoice_link: {}", SKIP_MESSAGE);
        return;
    };
    assert_eq!(
        link_uris(&pdf.bytes),
        vec![b"https://pay.example.com/invoices/7877859".to_vec()]
    );
}

#[test]
fn pay_button_background_is_painted_first() {
    let Some(pdf) = render(&Invoice::sample()) else {
        eprintln!("Skipping pay_button_background_is_painted_first: {}", SKIP_MESSAGE);
        return;
    };
    let streams = first_page_streams(&pdf.bytes);
    assert_eq!(streams.len(), 2, "background stream plus the page content");

    let background = &streams[0];
    let operators: Vec<&str> = background.iter().map(|op| op.operator.as_str()).collect();
    assert_eq!(operators, vec!["q", "rg", "re", "f", "Q"]);
    assert_eq!(operands(&background[2]), vec![522.0, 608.0, 100.0, 42.0]);
}

#[test]
fn rules_are_stroked_at_their_thickness() {
    let Some(pdf) = render(&Invoice::sample()) else {
        eprintln!("Skipping rules_are_stroked_at_their_thickness: {}", SKIP_MESSAGE);
        return;
    };
    let streams = first_page_streams(&pdf.bytes);
    let content = &streams[1];
    let strokes = content.iter().filter(|op| op.operator == "S").count();
    // Separator, four cells in each of four product rows, two strokes under the total label.
    assert_eq!(strokes, 1 + 4 * 4 + 2);
    assert!(content.iter().all(|op| op.operator != "w"));
}

#[test]
fn rendering_is_deterministic() {
    let invoice = Invoice::sample();
    let (Some(pdf_a), Some(pdf_b)) = (render(&invoice), render(&invoice)) else {
        eprintln!("Skipping rendering_is_deterministic: {}", SKIP_MESSAGE);
        return;
    };

    assert_eq!(pdf_a.bytes.len(), pdf_b.bytes.len(), "PDF sizes should match");
    assert_eq!(
        normalized_hash(&pdf_a.bytes),
        normalized_hash(&pdf_b.bytes),
        "PDF renders must be deterministic after metadata normalization"
    );
}

#[test]
fn renders_transparent_signature() {
    let invoice = Invoice::sample().with_signature(ImageSource::from_bytes(signature_png()));
    let Some(with_signature) = render(&invoice) else {
        eprintln!("Skipping renders_transparent_signature: {}", SKIP_MESSAGE);
        return;
    };
    let Some(without_signature) = render(&Invoice::sample()) else {
        return;
    };
    assert_eq!(with_signature.page_count, 1);
    assert!(
        with_signature.bytes.len() > without_signature.bytes.len(),
        "the embedded signature image should add to the document size"
    );
}

#[test]
fn renders_invoice_without_products() {
    let mut invoice = Invoice::sample();
    invoice.products.clear();
    let Some(pdf) = render(&invoice) else {
        eprintln!("Skipping renders_invoice_without_products: {}", SKIP_MESSAGE);
        return;
    };
    assert_eq!(pdf.page_count, 1);
}

#[test]
fn long_product_lists_continue_on_next_page() {
    let mut invoice = Invoice::sample();
    invoice.products = (1..=20)
        .map(|index| Product::new(format!("서비스 {}", index), 10_000 * index, index))
        .collect();
    let Some(pdf) = render(&invoice) else {
        eprintln!("Skipping long_product_lists_continue_on_next_page: {}", SKIP_MESSAGE);
        return;
    };
    assert!(pdf.page_count > 1, "20 product rows do not fit on one page");
    assert_eq!(link_uris(&pdf.bytes).len(), 1);
}

#[test]
fn writer_receives_complete_document() {
    let Some(config) = renderer_config() else {
        eprintln!("Skipping writer_receives_complete_document: {}", SKIP_MESSAGE);
        return;
    };
    let renderer = InvoiceRenderer::new(config);
    let mut sink = Vec::new();
    let pdf = renderer
        .render_to_writer(&Invoice::sample(), &mut sink)
        .expect("render into writer");
    assert_eq!(sink, pdf.bytes);
}
