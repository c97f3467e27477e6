use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::state::AppState;

pub const FONT_CHOICES: RangeInclusive<u8> = 1..=3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub font: u8,
    pub time_format: TimeFormat,
    pub date_format: DateFormat,
    pub theme_color: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            font: 1,
            time_format: TimeFormat::default(),
            date_format: DateFormat::default(),
            theme_color: ThemeColor::default().to_string(),
        }
    }
}

impl Settings {
    /// Palette entry for the stored key; unknown keys render as the default.
    pub fn theme(&self) -> ThemeColor {
        ThemeColor::from_str(&self.theme_color).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeFormat {
    #[default]
    #[serde(rename = "12h")]
    TwelveHour,
    #[serde(rename = "24h")]
    TwentyFourHour,
}

impl TimeFormat {
    pub fn next(self) -> Self {
        match self {
            TimeFormat::TwelveHour => TimeFormat::TwentyFourHour,
            TimeFormat::TwentyFourHour => TimeFormat::TwelveHour,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeFormat::TwelveHour => "12h",
            TimeFormat::TwentyFourHour => "24h",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFormat {
    #[default]
    Month,
    #[serde(rename = "MM/DD")]
    MonthDay,
    #[serde(rename = "DD/MM")]
    DayMonth,
}

impl DateFormat {
    pub fn next(self) -> Self {
        match self {
            DateFormat::Month => DateFormat::MonthDay,
            DateFormat::MonthDay => DateFormat::DayMonth,
            DateFormat::DayMonth => DateFormat::Month,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DateFormat::Month => "Month",
            DateFormat::MonthDay => "MM/DD",
            DateFormat::DayMonth => "DD/MM",
        }
    }
}

/// Fixed accent palette; the stored setting is the lowercase key.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ThemeColor {
    #[default]
    Green,
    Blue,
    Purple,
    Orange,
    Pink,
    Teal,
}

impl ThemeColor {
    pub fn next(self) -> Self {
        let all: Vec<ThemeColor> = ThemeColor::iter().collect();
        let pos = all.iter().position(|color| *color == self).unwrap_or(0);
        all[(pos + 1) % all.len()]
    }
}

pub fn cycle_time_format(state: &mut AppState) -> TimeFormat {
    state.settings.time_format = state.settings.time_format.next();
    state.settings.time_format
}

pub fn cycle_date_format(state: &mut AppState) -> DateFormat {
    state.settings.date_format = state.settings.date_format.next();
    state.settings.date_format
}

pub fn set_font(state: &mut AppState, font: u8) -> bool {
    if !FONT_CHOICES.contains(&font) || state.settings.font == font {
        return false;
    }
    state.settings.font = font;
    true
}

/// Steps to the next font, wrapping back to the first.
pub fn cycle_font(state: &mut AppState) -> u8 {
    let font = state.settings.font;
    let next = if FONT_CHOICES.contains(&font) && font < *FONT_CHOICES.end() {
        font + 1
    } else {
        *FONT_CHOICES.start()
    };
    state.settings.font = next;
    next
}

pub fn set_theme_color(state: &mut AppState, key: &str) -> bool {
    let Ok(color) = ThemeColor::from_str(key.trim()) else {
        tracing::warn!(key, "unknown theme color, keeping current setting");
        return false;
    };
    let key = color.to_string();
    if state.settings.theme_color == key {
        return false;
    }
    state.settings.theme_color = key;
    true
}

pub fn cycle_theme_color(state: &mut AppState) -> ThemeColor {
    let next = state.settings.theme().next();
    state.settings.theme_color = next.to_string();
    next
}
