//! Invoice-specific element implementations built on top of `genpdf` primitives.
//!
//! `genpdf` has no column spans, per-row rules or line widths, so the pieces of the invoice that
//! need them are implemented here: the pay button label, the separator line, the ruled table
//! decorator and the signature/total row.

use std::path::Path;

use image::{GenericImageView, ImageBuffer, Rgb, Rgba};

use genpdf::elements::{CellDecorator, Image, Paragraph};
use genpdf::error::{Context as _, Error};
use genpdf::style::{Color, Style, StyledString};
use genpdf::{render, Alignment, Element, Mm, Position, RenderResult, Scale, Size};

use crate::config::{mm_from_f64, mm_to_f64, pt, to_pt};
use crate::model::ImageSource;

const DEFAULT_IMAGE_DPI: f64 = 300.0;
const MM_PER_INCH: f64 = 25.4;

fn estimated_image_size(image: &image::DynamicImage, dpi: f64) -> Size {
    let (px_width, px_height) = image.dimensions();
    let width_mm = MM_PER_INCH * (px_width as f64) / dpi;
    let height_mm = MM_PER_INCH * (px_height as f64) / dpi;
    Size::new(mm_from_f64(width_mm), mm_from_f64(height_mm))
}

/// Loads an image from in-memory bytes using the [`image`] crate with descriptive errors.
pub fn decode_image_from_bytes(bytes: impl AsRef<[u8]>) -> Result<image::DynamicImage, Error> {
    image::load_from_memory(bytes.as_ref()).context("Failed to decode image from provided bytes")
}

/// Loads an image from the given path using the [`image`] crate with descriptive errors.
pub fn decode_image_from_path(path: impl AsRef<Path>) -> Result<image::DynamicImage, Error> {
    let path = path.as_ref();
    let reader = image::io::Reader::open(path)
        .with_context(|| format!("Failed to open image file {}", path.display()))?;
    reader
        .with_guessed_format()
        .context("Unable to determine image format")?
        .decode()
        .with_context(|| format!("Failed to decode image file {}", path.display()))
}

/// Decodes an [`ImageSource`] from the invoice model.
pub fn decode_image(source: &ImageSource) -> Result<image::DynamicImage, Error> {
    match source {
        ImageSource::Bytes(bytes) => decode_image_from_bytes(bytes),
        ImageSource::Path(path) => decode_image_from_path(path),
    }
}

/// Composites transparent pixels onto white; `genpdf` rejects images with an alpha channel.
fn flatten_alpha(image: image::DynamicImage) -> image::DynamicImage {
    if !image.color().has_alpha() {
        return image;
    }

    let rgba = image.to_rgba8();
    let flattened = ImageBuffer::from_fn(rgba.width(), rgba.height(), |x, y| {
        let Rgba([r, g, b, a]) = *rgba.get_pixel(x, y);
        let blend = |channel: u8| {
            let alpha = a as u16;
            ((channel as u16 * alpha + 255 * (255 - alpha)) / 255) as u8
        };
        Rgb([blend(r), blend(g), blend(b)])
    });
    image::DynamicImage::ImageRgb8(flattened)
}

/// Returns the `(x, y)` scale factors that stretch `natural` to `target`.
fn scale_to_fit(natural: Size, target: Size) -> (f64, f64) {
    let factor = |natural: Mm, target: Mm| {
        let natural = mm_to_f64(natural);
        if natural > f64::EPSILON {
            mm_to_f64(target) / natural
        } else {
            1.0
        }
    };
    (
        factor(natural.width, target.width),
        factor(natural.height, target.height),
    )
}

/// Converts `image` into a `genpdf` image that renders at exactly `size`.
pub fn sized_image(
    image: image::DynamicImage,
    size: Size,
    alignment: Alignment,
) -> Result<Image, Error> {
    let image = flatten_alpha(image);
    let natural = estimated_image_size(&image, DEFAULT_IMAGE_DPI);
    let (scale_x, scale_y) = scale_to_fit(natural, size);
    let mut element = Image::from_dynamic_image(image)?;
    element.set_scale(Scale::new(scale_x, scale_y));
    element.set_alignment(alignment);
    Ok(element)
}

/// Width of every line `genpdf` strokes: the PDF default of one point.
const STROKE_WIDTH_PT: f64 = 1.0;

/// Number of adjacent strokes that make up a rule of the given thickness.
fn stroke_count(thickness: Mm) -> usize {
    (to_pt(thickness) / STROKE_WIDTH_PT).round().max(1.0) as usize
}

/// Draws a full-width horizontal rule whose lower edge lies `bottom` below the top of `area`.
///
/// `genpdf` has no control over the line width, so rules thicker than one point are stacked
/// from one-point strokes.
fn draw_rule(area: &render::Area<'_>, bottom: Mm, thickness: Mm, color: Color) {
    let width = area.size().width;
    let style = Style::new().with_color(color);
    for stroke in 0..stroke_count(thickness) {
        let y = bottom - pt(STROKE_WIDTH_PT * (stroke as f64 + 0.5));
        area.draw_line(vec![Position::new(0, y), Position::new(width, y)], style);
    }
}

/// The label of the pay button, centered in a right-aligned box of fixed size.
///
/// `genpdf` cannot fill shapes: the background is painted underneath the page content after
/// rendering (see [`crate::annotations::PageFill`]), together with the clickable region.  Both
/// use the rectangle computed by the layout, so the box size here has to match it.
pub struct PayButton {
    label: Paragraph,
    label_style: Style,
    width: Mm,
    height: Mm,
}

impl PayButton {
    /// Creates a button of the given outer size.
    pub fn new(label: impl Into<String>, label_style: Style, width: Mm, height: Mm) -> Self {
        let label = Paragraph::new(StyledString::new(label.into(), label_style))
            .aligned(Alignment::Center);
        Self {
            label,
            label_style,
            width,
            height,
        }
    }
}

impl Element for PayButton {
    fn render(
        &mut self,
        context: &genpdf::Context,
        area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let available = area.size();
        if self.height > available.height {
            result.has_more = true;
            return Ok(result);
        }

        let width = if self.width > available.width {
            available.width
        } else {
            self.width
        };
        let left = available.width - width;

        let line_height = style.and(self.label_style).line_height(&context.font_cache);
        let top = if line_height < self.height {
            (self.height - line_height) / 2.0
        } else {
            Mm::default()
        };

        let mut label_area = area.clone();
        label_area.add_offset(Position::new(left, top));
        label_area.set_width(width);
        self.label.render(context, label_area, style)?;

        result.size = Size::new(available.width, self.height);
        Ok(result)
    }
}

/// A full-width horizontal line preceded by a blank gap.
pub struct HorizontalRule {
    color: Color,
    thickness: Mm,
    margin_top: Mm,
}

impl HorizontalRule {
    /// Creates a rule with the given color and thickness.
    pub fn new(color: Color, thickness: Mm) -> Self {
        Self {
            color,
            thickness,
            margin_top: Mm::default(),
        }
    }

    /// Sets the gap above the line and returns the updated rule.
    pub fn with_margin_top(mut self, margin_top: Mm) -> Self {
        self.margin_top = margin_top;
        self
    }
}

impl Element for HorizontalRule {
    fn render(
        &mut self,
        _context: &genpdf::Context,
        area: render::Area<'_>,
        _style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let height = self.margin_top + self.thickness;
        if height > area.size().height {
            result.has_more = true;
            return Ok(result);
        }

        draw_rule(&area, height, self.thickness, self.color);

        result.size = Size::new(area.size().width, height);
        Ok(result)
    }
}

/// Cell decorator that underlines each completed table row.
///
/// The rule is drawn inside the bottom edge of the row, so cells have to reserve room for it in
/// their bottom padding.  All cells of a row share the row height, which keeps the rules of
/// neighbouring cells on one line when a description wraps.
#[derive(Clone, Debug)]
pub struct RuledCellDecorator {
    rule_color: Color,
    rule_thickness: Mm,
}

impl RuledCellDecorator {
    /// Creates a decorator drawing bottom rules of the given color and thickness.
    pub fn new(rule_color: Color, rule_thickness: Mm) -> Self {
        Self {
            rule_color,
            rule_thickness,
        }
    }
}

impl CellDecorator for RuledCellDecorator {
    fn decorate_cell(
        &mut self,
        _column: usize,
        _row: usize,
        has_more: bool,
        area: render::Area<'_>,
        _style: Style,
    ) {
        // Rows continued on the next page are only underlined where they end.
        if has_more {
            return;
        }
        draw_rule(&area, area.size().height, self.rule_thickness, self.rule_color);
    }
}

/// The last invoice row: an optional signature on the left and the grand total on the right.
///
/// Without a signature the total takes the full width.  With one, the total is vertically
/// centered against the image.
pub struct SignatureTotal {
    signature: Option<(Image, Mm)>,
    total: Paragraph,
    total_style: Style,
    padding_top: Mm,
}

impl SignatureTotal {
    /// Creates the row from the formatted total and its style.
    pub fn new(total: impl Into<String>, total_style: Style) -> Self {
        let total = Paragraph::new(StyledString::new(total.into(), total_style))
            .aligned(Alignment::Right);
        Self {
            signature: None,
            total,
            total_style,
            padding_top: Mm::default(),
        }
    }

    /// Places a signature image of the given rendered height in the left half and returns the
    /// updated row.
    pub fn with_signature(mut self, signature: Image, height: Mm) -> Self {
        self.signature = Some((signature, height));
        self
    }

    /// Sets the gap above the row and returns the updated row.
    pub fn with_padding_top(mut self, padding_top: Mm) -> Self {
        self.padding_top = padding_top;
        self
    }
}

impl Element for SignatureTotal {
    fn render(
        &mut self,
        context: &genpdf::Context,
        mut area: render::Area<'_>,
        style: Style,
    ) -> Result<RenderResult, Error> {
        let mut result = RenderResult::default();
        let width = area.size().width;

        // The row is never split: move it to the next page as a whole.
        let line_height = style.and(self.total_style).line_height(&context.font_cache);
        let needed = match &self.signature {
            Some((_, height)) => (*height).max(line_height),
            None => line_height,
        };
        if self.padding_top + needed > area.size().height {
            result.has_more = true;
            return Ok(result);
        }

        area.add_offset(Position::new(0, self.padding_top));

        let content_height = match &mut self.signature {
            Some((signature, _)) => {
                let columns = area.split_horizontally(&[1, 1]);
                let image_result = signature.render(context, columns[0].clone(), style)?;
                result.has_more |= image_result.has_more;

                let image_height = image_result.size.height;
                let offset = if image_height > line_height {
                    (image_height - line_height) / 2.0
                } else {
                    Mm::default()
                };

                let mut total_area = columns[1].clone();
                total_area.add_offset(Position::new(0, offset));
                let total_result = self.total.render(context, total_area, style)?;
                result.has_more |= total_result.has_more;
                image_height.max(offset + total_result.size.height)
            }
            None => {
                let total_result = self.total.render(context, area, style)?;
                result.has_more |= total_result.has_more;
                total_result.size.height
            }
        };

        result.size = Size::new(width, self.padding_top + content_height);
        Ok(result)
    }
}
