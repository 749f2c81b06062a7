//! Renderer configuration: page geometry, static labels and font selection.

use std::io;
use std::path::Path;

use genpdf::{Margins, Mm, Size};
use serde::{Deserialize, Serialize};

use crate::fonts::FontSource;

const MM_PER_INCH: f64 = 25.4;
const POINTS_PER_INCH: f64 = 72.0;

/// Converts a millimetre value into the `genpdf` unit type.
pub fn mm_from_f64(value: f64) -> Mm {
    Mm::from(printpdf::Mm(value))
}

/// Converts a `genpdf` length into plain millimetres.
pub fn mm_to_f64(value: Mm) -> f64 {
    let mm: printpdf::Mm = value.into();
    mm.0
}

/// Converts a length given in PDF points into millimetres.
pub fn pt(value: f64) -> Mm {
    mm_from_f64(value * MM_PER_INCH / POINTS_PER_INCH)
}

/// Converts a `genpdf` length into PDF points.
pub fn to_pt(value: Mm) -> f64 {
    mm_to_f64(value) * POINTS_PER_INCH / MM_PER_INCH
}

/// Page size and margins, in PDF points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub width_pt: f64,
    pub height_pt: f64,
    pub margin_top_pt: f64,
    pub margin_right_pt: f64,
    pub margin_bottom_pt: f64,
    pub margin_left_pt: f64,
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self {
            width_pt: 650.0,
            height_pt: 700.0,
            margin_top_pt: 50.0,
            margin_right_pt: 13.0,
            margin_bottom_pt: 13.0,
            margin_left_pt: 13.0,
        }
    }
}

impl PageGeometry {
    /// Paper size handed to `genpdf`.
    pub fn paper_size(&self) -> Size {
        Size::new(pt(self.width_pt), pt(self.height_pt))
    }

    /// Page margins handed to the page decorator.
    pub fn margins(&self) -> Margins {
        Margins::trbl(
            pt(self.margin_top_pt),
            pt(self.margin_right_pt),
            pt(self.margin_bottom_pt),
            pt(self.margin_left_pt),
        )
    }

    /// Width available between the left and right margins.
    pub fn content_width_pt(&self) -> f64 {
        self.width_pt - self.margin_left_pt - self.margin_right_pt
    }
}

/// Every static string printed on the invoice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub pay_button: String,
    pub from: String,
    pub to: String,
    pub description: String,
    pub rate: String,
    pub quantity: String,
    pub subtotal: String,
    pub grand_total: String,
    pub currency_suffix: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            pay_button: "결제 하기".to_owned(),
            from: "From".to_owned(),
            to: "To".to_owned(),
            description: "상품명".to_owned(),
            rate: "단가".to_owned(),
            quantity: "수량".to_owned(),
            subtotal: "소계".to_owned(),
            grand_total: "총 합계".to_owned(),
            currency_suffix: "원".to_owned(),
        }
    }
}

impl Labels {
    /// English labels for fonts without Hangul coverage.
    pub fn english() -> Self {
        Self {
            pay_button: "Pay now".to_owned(),
            from: "From".to_owned(),
            to: "To".to_owned(),
            description: "Description".to_owned(),
            rate: "Rate".to_owned(),
            quantity: "Qty".to_owned(),
            subtotal: "Subtotal".to_owned(),
            grand_total: "Grand total".to_owned(),
            currency_suffix: " KRW".to_owned(),
        }
    }

    /// Reads labels from a JSON file; missing keys keep their default value.
    pub fn from_json_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let data = std::fs::read(path)?;
        serde_json::from_slice(&data).map_err(io::Error::from)
    }
}

/// Complete configuration of an [`InvoiceRenderer`](crate::renderer::InvoiceRenderer).
#[derive(Clone, Debug, Default)]
pub struct RendererConfig {
    pub fonts: FontSource,
    pub labels: Labels,
    pub page: PageGeometry,
}

impl RendererConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the font source and returns the updated configuration.
    pub fn with_fonts(mut self, fonts: FontSource) -> Self {
        self.fonts = fonts;
        self
    }

    /// Replaces the labels and returns the updated configuration.
    pub fn with_labels(mut self, labels: Labels) -> Self {
        self.labels = labels;
        self
    }

    /// Replaces the page geometry and returns the updated configuration.
    pub fn with_page(mut self, page: PageGeometry) -> Self {
        self.page = page;
        self
    }
}
