//! Text styles and colors shared by the invoice layout.

use genpdf::elements::Paragraph;
use genpdf::style::{Color, Style, StyledString};
use genpdf::Alignment;

/// Secondary text and thin rules.
pub const LIGHT_GRAY: Color = Color::Rgb(166, 166, 166);
/// Separator lines and the grand total rule.
pub const RULE_GRAY: Color = Color::Rgb(204, 204, 204);
/// Product row text.
pub const LIGHT_BLACK: Color = Color::Rgb(64, 64, 64);
pub const BLACK: Color = Color::Rgb(0, 0, 0);
pub const WHITE: Color = Color::Rgb(255, 255, 255);
/// Pay button background.
pub const PAY_BLUE: Color = Color::Rgb(0, 92, 230);

pub const LIGHT_FONT_SIZE: u8 = 12;
pub const BOLD_FONT_SIZE: u8 = 16;
pub const TITLE_FONT_SIZE: u8 = 32;

/// Small gray text used for dates, addresses and captions.
pub fn light() -> Style {
    Style::new()
        .with_font_size(LIGHT_FONT_SIZE)
        .with_color(LIGHT_GRAY)
}

/// Bold 16pt text in the given color.
pub fn bold(color: Color) -> Style {
    Style::new()
        .bold()
        .with_font_size(BOLD_FONT_SIZE)
        .with_color(color)
}

/// Builds a paragraph rendered with [`light`].
pub fn light_text(text: impl Into<String>, alignment: Alignment) -> Paragraph {
    Paragraph::new(StyledString::new(text.into(), light())).aligned(alignment)
}

/// Builds a paragraph rendered with [`bold`].
pub fn bold_text(text: impl Into<String>, color: Color, alignment: Alignment) -> Paragraph {
    Paragraph::new(StyledString::new(text.into(), bold(color))).aligned(alignment)
}
