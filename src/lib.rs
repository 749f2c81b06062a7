//! Core entry point for the invoice_pdf crate.
//!
//! [`InvoiceRenderer`] turns an [`Invoice`] into a single-page PDF with a header, the two
//! parties, a line-item table, the grand total and an optional signature.

pub mod annotations;
pub mod builder;
pub mod config;
pub mod elements;
pub mod error;
pub mod fonts;
pub mod format;
pub mod layout;
pub mod model;
pub mod renderer;
pub mod styles;

pub use config::{Labels, PageGeometry, RendererConfig};
pub use error::RenderError;
pub use fonts::FontSource;
pub use model::{ImageSource, Invoice, PartyInfo, Product};
pub use renderer::{InvoiceRenderer, RenderedPdf};
