use ratatui::style::{Color, Modifier, Style};

use crate::state::ThemeColor;

pub fn accent(color: ThemeColor) -> Color {
    match color {
        ThemeColor::Green => Color::Rgb(76, 175, 80),
        ThemeColor::Blue => Color::Rgb(66, 133, 244),
        ThemeColor::Purple => Color::Rgb(156, 39, 176),
        ThemeColor::Orange => Color::Rgb(255, 152, 0),
        ThemeColor::Pink => Color::Rgb(233, 30, 99),
        ThemeColor::Teal => Color::Rgb(0, 150, 136),
    }
}

/// Terminals cannot switch typefaces, so each font choice maps to a text
/// style instead.
pub fn font_style(font: u8) -> Style {
    match font {
        2 => Style::default().add_modifier(Modifier::BOLD),
        3 => Style::default().add_modifier(Modifier::ITALIC),
        _ => Style::default(),
    }
}

pub fn font_label(font: u8) -> &'static str {
    match font {
        2 => "Bold",
        3 => "Italic",
        _ => "Plain",
    }
}
