//! src/view/theme.rs
//! ============================================================================
//! # Catppuccin Mocha Theme Color Palette
//!
//! Colors are from the official Catppuccin theme specification:
//! https://github.com/catppuccin/catppuccin

use ratatui::style::{Color, Modifier, Style};

use crate::model::session::NotificationLevel;

pub const BACKGROUND: Color = Color::Rgb(30, 30, 46); // Base
pub const CURRENT_LINE: Color = Color::Rgb(69, 71, 90); // Surface1
pub const FOREGROUND: Color = Color::Rgb(205, 214, 244); // Text
pub const COMMENT: Color = Color::Rgb(127, 132, 156); // Overlay1
pub const BLUE: Color = Color::Rgb(137, 180, 250); // Blue
pub const CYAN: Color = Color::Rgb(137, 220, 235); // Sky
pub const GREEN: Color = Color::Rgb(166, 227, 161); // Green
pub const PINK: Color = Color::Rgb(245, 194, 231); // Pink
pub const PURPLE: Color = Color::Rgb(203, 166, 247); // Mauve
pub const RED: Color = Color::Rgb(243, 139, 168); // Red
pub const YELLOW: Color = Color::Rgb(249, 226, 175); // Yellow

pub fn base_style() -> Style {
    Style::default().bg(BACKGROUND).fg(FOREGROUND)
}

pub fn border_style() -> Style {
    Style::default().fg(PURPLE)
}

pub fn active_name_style() -> Style {
    Style::default().fg(GREEN).add_modifier(Modifier::BOLD)
}

/// Key names in the instruction table (ENTER, TAB...).
pub fn key_style() -> Style {
    Style::default().fg(BLUE)
}

/// Query keywords in the instruction table (recent, favorites).
pub fn keyword_style() -> Style {
    Style::default().fg(CYAN)
}

pub fn edit_keyword_style() -> Style {
    Style::default().fg(PINK)
}

pub fn hint_style() -> Style {
    Style::default().fg(COMMENT)
}

pub fn highlight_style() -> Style {
    Style::default()
        .bg(CURRENT_LINE)
        .fg(RED)
        .add_modifier(Modifier::BOLD)
}

pub fn notification_style(level: NotificationLevel) -> Style {
    let fg = match level {
        NotificationLevel::Info => CYAN,
        NotificationLevel::Success => GREEN,
        NotificationLevel::Warning => YELLOW,
        NotificationLevel::Error => RED,
    };
    Style::default().fg(fg)
}
