//! Page overlays applied with `lopdf` after `genpdf` has written the document: filled
//! rectangles painted underneath the page content and clickable URI links.

use genpdf::style::Color;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// Errors that can occur while applying overlays to a rendered PDF document.
#[derive(Debug)]
pub enum AnnotationError {
    /// The PDF bytes could not be parsed or written by `lopdf`.
    Parse(lopdf::Error),
    /// An overlay refers to a page the rendered document does not have.
    MissingPage(usize),
    /// A page object of the rendered document is not a dictionary.
    InvalidPage,
}

impl From<lopdf::Error> for AnnotationError {
    fn from(err: lopdf::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<std::io::Error> for AnnotationError {
    fn from(err: std::io::Error) -> Self {
        Self::Parse(err.into())
    }
}

impl std::fmt::Display for AnnotationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "Failed to parse PDF bytes: {err}"),
            Self::MissingPage(page) => write!(f, "Overlay refers to missing page {page}"),
            Self::InvalidPage => write!(f, "Page object is not a dictionary"),
        }
    }
}

impl std::error::Error for AnnotationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::MissingPage(_) | Self::InvalidPage => None,
        }
    }
}

/// A rectangle in PDF user space, measured in points from the bottom left page corner.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PdfRect {
    pub left: f64,
    pub bottom: f64,
    pub right: f64,
    pub top: f64,
}

/// A clickable page region that opens a URI.
#[derive(Clone, Debug, PartialEq)]
pub struct LinkAnnotation {
    page: usize,
    rect: PdfRect,
    uri: String,
}

impl LinkAnnotation {
    /// Creates a link on the given (1-indexed) page.
    pub fn new(page: usize, rect: PdfRect, uri: impl Into<String>) -> Self {
        Self {
            page,
            rect,
            uri: uri.into(),
        }
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    fn to_object(&self) -> Object {
        let rect = [self.rect.left, self.rect.bottom, self.rect.right, self.rect.top];
        let mut action = Dictionary::new();
        action.set("S", Object::Name("URI".into()));
        action.set("URI", Object::string_literal(self.uri.as_str()));

        let mut dictionary = Dictionary::new();
        dictionary.set("Type", Object::Name("Annot".into()));
        dictionary.set("Subtype", Object::Name("Link".into()));
        dictionary.set(
            "Rect",
            Object::Array(
                rect.iter()
                    .map(|value| Object::Real((*value as f32).into()))
                    .collect(),
            ),
        );
        dictionary.set(
            "Border",
            Object::Array(vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(0),
            ]),
        );
        dictionary.set("A", Object::Dictionary(action));
        Object::Dictionary(dictionary)
    }
}

/// A solid rectangle painted underneath the content of a page.
#[derive(Clone, Debug, PartialEq)]
pub struct PageFill {
    page: usize,
    rect: PdfRect,
    color: Color,
}

impl PageFill {
    /// Creates a fill on the given (1-indexed) page.
    pub fn new(page: usize, rect: PdfRect, color: Color) -> Self {
        Self { page, rect, color }
    }

    fn to_content(&self) -> Result<Vec<u8>, AnnotationError> {
        let channel = |value: u8| Object::Real(f32::from(value) / 255.0);
        let color = match self.color {
            Color::Rgb(r, g, b) => Operation::new("rg", vec![channel(r), channel(g), channel(b)]),
            Color::Cmyk(c, m, y, k) => Operation::new(
                "k",
                vec![channel(c), channel(m), channel(y), channel(k)],
            ),
            Color::Greyscale(level) => Operation::new("g", vec![channel(level)]),
        };
        let rect = &self.rect;
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                color,
                Operation::new(
                    "re",
                    vec![
                        Object::Real(rect.left as f32),
                        Object::Real(rect.bottom as f32),
                        Object::Real((rect.right - rect.left) as f32),
                        Object::Real((rect.top - rect.bottom) as f32),
                    ],
                ),
                Operation::new("f", vec![]),
                Operation::new("Q", vec![]),
            ],
        };
        Ok(content.encode()?)
    }
}

/// Everything added to the pages of a rendered document.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PageOverlays {
    pub fills: Vec<PageFill>,
    pub links: Vec<LinkAnnotation>,
}

impl PageOverlays {
    pub fn is_empty(&self) -> bool {
        self.fills.is_empty() && self.links.is_empty()
    }
}

/// The post-processed document.
#[derive(Clone, Debug)]
pub struct AnnotatedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Applies `overlays` to the pages of the PDF in `pdf_bytes`.
///
/// Fills are drawn before the existing page content, links are appended to the page `/Annots`
/// arrays.  Without overlays the input is returned unchanged.
pub fn apply_page_overlays(
    pdf_bytes: &[u8],
    overlays: &PageOverlays,
) -> Result<AnnotatedPdf, AnnotationError> {
    let mut document = Document::load_mem(pdf_bytes)?;
    let pages = document.get_pages();
    let page_count = pages.len();

    if overlays.is_empty() {
        return Ok(AnnotatedPdf {
            bytes: pdf_bytes.to_vec(),
            page_count,
        });
    }

    let lookup = |page: usize| {
        pages
            .get(&(page as u32))
            .copied()
            .ok_or(AnnotationError::MissingPage(page))
    };

    for fill in &overlays.fills {
        let page_id = lookup(fill.page)?;
        let stream = Stream::new(Dictionary::new(), fill.to_content()?);
        let stream_id = document.add_object(stream);
        prepend_content(&mut document, page_id, stream_id)?;
    }

    for link in &overlays.links {
        let page_id = lookup(link.page)?;
        let annotation_id = document.add_object(link.to_object());
        attach_annotation(&mut document, page_id, annotation_id)?;
    }

    let mut buffer = Vec::new();
    document.save_to(&mut buffer)?;
    Ok(AnnotatedPdf {
        bytes: buffer,
        page_count,
    })
}

fn page_dictionary(
    document: &mut Document,
    page_id: ObjectId,
) -> Result<&mut Dictionary, AnnotationError> {
    document
        .get_object_mut(page_id)
        .and_then(Object::as_dict_mut)
        .map_err(|_| AnnotationError::InvalidPage)
}

fn prepend_content(
    document: &mut Document,
    page_id: ObjectId,
    stream_id: ObjectId,
) -> Result<(), AnnotationError> {
    let page = page_dictionary(document, page_id)?;
    let mut contents = vec![Object::Reference(stream_id)];
    match page.get(b"Contents") {
        Ok(Object::Array(existing)) => contents.extend(existing.iter().cloned()),
        Ok(existing @ Object::Reference(_)) => contents.push(existing.clone()),
        _ => {}
    }
    page.set("Contents", Object::Array(contents));
    Ok(())
}

fn attach_annotation(
    document: &mut Document,
    page_id: ObjectId,
    annotation_id: ObjectId,
) -> Result<(), AnnotationError> {
    let page = page_dictionary(document, page_id)?;
    let has_array = matches!(page.get(b"Annots"), Ok(Object::Array(_)));
    if has_array {
        if let Ok(Object::Array(annotations)) = page.get_mut(b"Annots") {
            annotations.push(Object::Reference(annotation_id));
        }
    } else {
        page.set("Annots", Object::Array(vec![Object::Reference(annotation_id)]));
    }
    Ok(())
}
