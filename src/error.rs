//! Error types returned while rendering invoices.

use std::fmt;
use std::io;

use crate::annotations::AnnotationError;

/// Errors that can occur while turning an [`Invoice`](crate::model::Invoice) into PDF bytes.
#[derive(Debug)]
pub enum RenderError {
    /// No usable font family could be loaded.
    FontLoad(genpdf::error::Error),
    /// `genpdf` failed while laying out or writing the document.
    Layout(genpdf::error::Error),
    /// The signature image could not be read or decoded.
    Image(genpdf::error::Error),
    /// The rendered document could not be post-processed with the pay button overlays.
    Annotation(AnnotationError),
    /// Writing the finished document to its destination failed.
    Io(io::Error),
    /// A line item subtotal or the grand total does not fit into 64 bits.
    AmountOverflow {
        /// Line item description, or `grand total` for the sum.
        description: String,
    },
    /// The invoice is missing data the layout needs.
    InvalidInvoice(String),
}

impl From<AnnotationError> for RenderError {
    fn from(err: AnnotationError) -> Self {
        Self::Annotation(err)
    }
}

impl From<io::Error> for RenderError {
    fn from(err: io::Error) -> Self {
        Self::Io(err)
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FontLoad(err) => write!(f, "Failed to load fonts: {err}"),
            Self::Layout(err) => write!(f, "Failed to render invoice layout: {err}"),
            Self::Image(err) => write!(f, "Failed to load signature image: {err}"),
            Self::Annotation(err) => write!(f, "Failed to apply page overlays: {err}"),
            Self::Io(err) => write!(f, "Failed to write PDF output: {err}"),
            Self::AmountOverflow { description } => {
                write!(f, "Amount for '{description}' exceeds the supported range")
            }
            Self::InvalidInvoice(reason) => write!(f, "Invalid invoice: {reason}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::FontLoad(err) | Self::Layout(err) | Self::Image(err) => Some(err),
            Self::Annotation(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::AmountOverflow { .. } | Self::InvalidInvoice(_) => None,
        }
    }
}
