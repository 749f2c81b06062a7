//! Data structures describing the invoice rendered by [`crate::renderer`].
//!
//! The types in this module are plain values that do not reference the rendering crate, so they
//! can be produced by frontends, read from JSON, or built in code without pulling in `genpdf`.

use serde::{Deserialize, Serialize};

use crate::error::RenderError;

/// A party taking part in the transaction, shown in the "From" and "To" columns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyInfo {
    /// Display name of the party.
    pub name: String,
    /// Postal address printed below the name.
    pub address: String,
}

impl PartyInfo {
    /// Creates a party from a name and an address.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// A single line item of the invoice.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Description shown in the first column.
    pub description: String,
    /// Unit price in whole currency units.
    pub rate: u64,
    /// Number of units sold.
    pub quantity: u64,
}

impl Product {
    /// Creates a new line item.
    pub fn new(description: impl Into<String>, rate: u64, quantity: u64) -> Self {
        Self {
            description: description.into(),
            rate,
            quantity,
        }
    }

    /// Returns `rate * quantity`, failing instead of wrapping on overflow.
    pub fn subtotal(&self) -> Result<u64, RenderError> {
        self.rate
            .checked_mul(self.quantity)
            .ok_or_else(|| RenderError::AmountOverflow {
                description: self.description.clone(),
            })
    }
}

/// Representation of image sources supported by the invoice model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// Image loaded from raw bytes.
    Bytes(Vec<u8>),
    /// Image referenced by a file path.
    Path(String),
}

impl ImageSource {
    /// Creates a new in-memory image from raw bytes.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Creates an image sourced from a file path.
    pub fn from_path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }
}

/// The invoice record consumed by [`InvoiceRenderer`](crate::renderer::InvoiceRenderer).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Invoice number printed as `Invoice #<number>`.
    pub number: u64,
    /// Free-form date line shown below the invoice number.
    pub date: String,
    /// Payment URL the pay button links to.
    pub link: String,
    /// Issuing party.
    pub from: PartyInfo,
    /// Billed party.
    pub to: PartyInfo,
    /// Line items in display order.
    #[serde(default)]
    pub products: Vec<Product>,
    /// Optional signature image placed next to the grand total.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<ImageSource>,
}

impl Invoice {
    /// Sums the subtotals of all line items.
    pub fn total(&self) -> Result<u64, RenderError> {
        self.products.iter().try_fold(0u64, |total, product| {
            let subtotal = product.subtotal()?;
            total
                .checked_add(subtotal)
                .ok_or_else(|| RenderError::AmountOverflow {
                    description: "grand total".to_owned(),
                })
        })
    }

    /// Checks the fields the layout cannot render without.
    pub fn validate(&self) -> Result<(), RenderError> {
        if self.link.trim().is_empty() {
            return Err(RenderError::InvalidInvoice(
                "payment link must not be empty".to_owned(),
            ));
        }
        Ok(())
    }

    /// Sets the signature image and returns the updated invoice.
    pub fn with_signature(mut self, signature: impl Into<Option<ImageSource>>) -> Self {
        self.signature = signature.into();
        self
    }

    /// The demo invoice used by the command line `sample` command.
    pub fn sample() -> Self {
        Self {
            number: 7_877_859,
            date: "2024-07-17 수요일".to_owned(),
            link: "https://www.google.com".to_owned(),
            from: PartyInfo::new("박인협", "서울시 강동구 강일동 599-10"),
            to: PartyInfo::new("개발스토어", "서울시 강동구 강일동 599-10"),
            products: vec![
                Product::new("대시보드 디자인", 900_000, 5),
                Product::new("로고 디자인", 180_000, 2),
                Product::new("썸네일 디자인", 250_000, 1),
            ],
            signature: None,
        }
    }
}
