//! Theme system for the TUI.
//!
//! Provides both the docchat brand theme and a terminal-adaptive theme
//! that respects the user's terminal color scheme.

use ratatui::style::Color;
use std::env;

/// Check if the terminal supports true color (24-bit RGB).
fn supports_true_color() -> bool {
    if let Ok(colorterm) = env::var("COLORTERM") {
        let ct = colorterm.to_lowercase();
        if ct == "truecolor" || ct == "24bit" {
            return true;
        }
    }

    if let Ok(term) = env::var("TERM") {
        let t = term.to_lowercase();
        if t.contains("truecolor") || t.contains("24bit") || t.contains("direct") {
            return true;
        }
    }

    false
}

/// Theme mode selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThemeMode {
    /// docchat brand theme (dark mode)
    #[default]
    Docchat,
    /// Terminal-adaptive theme using ANSI colors
    Terminal,
}

/// Color palette for the TUI.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    // Backgrounds
    pub bg: Color,
    pub bg_panel: Color,
    pub bg_selection: Color,
    pub bg_user_message: Color,

    // Borders
    pub border: Color,
    pub border_active: Color,

    // Text
    pub text: Color,
    pub text_secondary: Color,
    pub text_muted: Color,

    // Accent (brand color)
    pub accent: Color,

    // Semantic colors
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,

    // Message colors
    pub user_message: Color,
    pub assistant_message: Color,
    pub system_message: Color,

    // Spinner/loading
    pub spinner: Color,
}

impl Theme {
    /// Create the docchat brand theme (dark mode).
    /// Uses RGB colors when true color is supported, falling back to the
    /// 256-color palette otherwise.
    pub fn docchat() -> Self {
        if supports_true_color() {
            Self::docchat_rgb()
        } else {
            Self::docchat_256()
        }
    }

    /// docchat theme using true color (24-bit RGB).
    fn docchat_rgb() -> Self {
        Self {
            // Backgrounds - deep slate
            bg: Color::Rgb(0x0B, 0x12, 0x20),
            bg_panel: Color::Rgb(0x13, 0x1C, 0x2E),
            bg_selection: Color::Rgb(0x24, 0x33, 0x4D),
            bg_user_message: Color::Rgb(0x1D, 0x3A, 0x6E), // dim brand blue

            // Borders
            border: Color::Rgb(0x3A, 0x4A, 0x66),
            border_active: Color::Rgb(0x60, 0xA5, 0xFA), // brand blue

            // Text
            text: Color::Rgb(0xF1, 0xF5, 0xF9),
            text_secondary: Color::Rgb(0xCB, 0xD5, 0xE1),
            text_muted: Color::Rgb(0x94, 0xA3, 0xB8),

            // Accent (brand blue)
            accent: Color::Rgb(0x60, 0xA5, 0xFA),

            // Semantic colors
            success: Color::Rgb(0x6E, 0xE7, 0xB7),
            warning: Color::Rgb(0xFC, 0xD3, 0x4D),
            error: Color::Rgb(0xFC, 0xA5, 0xA5),
            info: Color::Rgb(0x93, 0xC5, 0xFD),

            // Message colors
            user_message: Color::Rgb(0x93, 0xC5, 0xFD),
            assistant_message: Color::Rgb(0x6E, 0xE7, 0xB7),
            system_message: Color::Rgb(0xFC, 0xD3, 0x4D),

            // Spinner
            spinner: Color::Rgb(0xC4, 0xB5, 0xFD),
        }
    }

    /// docchat theme using the 256-color palette, for terminals without
    /// true color support.
    fn docchat_256() -> Self {
        Self {
            // Backgrounds - grayscale dark tones
            bg: Color::Indexed(233),
            bg_panel: Color::Indexed(235),
            bg_selection: Color::Indexed(238),
            bg_user_message: Color::Indexed(24), // dim blue

            // Borders
            border: Color::Indexed(241),
            border_active: Color::Indexed(75), // blue

            // Text
            text: Color::Indexed(255),
            text_secondary: Color::Indexed(252),
            text_muted: Color::Indexed(245),

            // Accent (brand blue)
            accent: Color::Indexed(75),

            // Semantic colors
            success: Color::Indexed(121),
            warning: Color::Indexed(221),
            error: Color::Indexed(210),
            info: Color::Indexed(111),

            // Message colors
            user_message: Color::Indexed(111),
            assistant_message: Color::Indexed(121),
            system_message: Color::Indexed(221),

            // Spinner
            spinner: Color::Indexed(183),
        }
    }

    /// Create a terminal-adaptive theme using ANSI colors.
    /// This respects the user's terminal color scheme.
    pub fn terminal() -> Self {
        Self {
            bg: Color::Reset,
            bg_panel: Color::Reset,
            bg_selection: Color::DarkGray,
            bg_user_message: Color::DarkGray,

            border: Color::DarkGray,
            border_active: Color::Blue,

            text: Color::Reset,
            text_secondary: Color::Gray,
            text_muted: Color::DarkGray,

            accent: Color::Blue,

            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            info: Color::Blue,

            user_message: Color::Cyan,
            assistant_message: Color::Green,
            system_message: Color::Yellow,

            spinner: Color::Magenta,
        }
    }

    /// Get theme based on mode.
    pub fn from_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Docchat => Self::docchat(),
            ThemeMode::Terminal => Self::terminal(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::docchat()
    }
}
