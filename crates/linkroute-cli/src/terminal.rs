//! Terminal styling for route listings.
//!
//! Route headers are highlighted when stdout is a color-capable terminal,
//! with fallback routes standing out in yellow. JSON and compact output are
//! never styled.

/// ANSI escape codes used by the text output.
pub mod colors {
    /// Reset all styling.
    pub const RESET: &str = "\x1b[0m";
    /// Bright bold white for route headers.
    pub const WHITE_BOLD: &str = "\x1b[1;97m";
    /// Yellow for the header of a fallback route.
    pub const YELLOW: &str = "\x1b[33m";
}

/// Escape codes applied to route listings; every field is empty when color
/// is disabled, so rendering code never branches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPalette {
    pub reset: &'static str,
    pub white_bold: &'static str,
    pub yellow: &'static str,
}

impl ColorPalette {
    #[must_use]
    pub const fn colored() -> Self {
        Self {
            reset: colors::RESET,
            white_bold: colors::WHITE_BOLD,
            yellow: colors::YELLOW,
        }
    }

    #[must_use]
    pub const fn plain() -> Self {
        Self {
            reset: "",
            white_bold: "",
            yellow: "",
        }
    }

    /// Palette for the current process environment, see [`supports_color`].
    #[must_use]
    pub fn detect() -> Self {
        if supports_color() {
            Self::colored()
        } else {
            Self::plain()
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::detect()
    }
}

/// Whether route listings may be styled.
///
/// Styling is off when `NO_COLOR` is set (any value) or `TERM` is `dumb`.
#[must_use]
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if let Ok(term) = std::env::var("TERM") {
        if term.eq_ignore_ascii_case("dumb") {
            return false;
        }
    }
    true
}
