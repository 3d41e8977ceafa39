//! Light/dark palettes and the dark-mode switch
//!
//! The system preference is read once at startup (`color_scheme` in
//! [`crate::config::Config`]); after that the user toggle wins until the
//! platform reports a new system scheme.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Config values are matched case-insensitively (`ECHO_COLOR_SCHEME=Dark`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum ColorScheme {
    Light,
    Dark,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown color scheme: {0}")]
pub struct UnknownColorScheme(pub String);

impl FromStr for ColorScheme {
    type Err = UnknownColorScheme;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "light" => Ok(ColorScheme::Light),
            "dark" => Ok(ColorScheme::Dark),
            _ => Err(UnknownColorScheme(s.to_string())),
        }
    }
}

impl TryFrom<String> for ColorScheme {
    type Error = UnknownColorScheme;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for ColorScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorScheme::Light => f.write_str("light"),
            ColorScheme::Dark => f.write_str("dark"),
        }
    }
}

/// Hex colors used by every screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub card: &'static str,
    pub text: &'static str,
    pub accent: &'static str,
    pub secondary: &'static str,
    pub input: &'static str,
    pub border: &'static str,
}

pub const LIGHT: Palette = Palette {
    background: "#F5F5F5",
    card: "#FFFFFF",
    text: "#333333",
    accent: "#4CAF50",
    secondary: "#757575",
    input: "#E0E0E0",
    border: "#BDBDBD",
};

pub const DARK: Palette = Palette {
    background: "#121212",
    card: "#1E1E1E",
    text: "#FFFFFF",
    accent: "#81C784",
    secondary: "#BDBDBD",
    input: "#424242",
    border: "#616161",
};

#[derive(Debug, Clone)]
pub struct ThemeSettings {
    system: ColorScheme,
    is_dark: bool,
}

impl ThemeSettings {
    pub fn from_system(system: ColorScheme) -> Self {
        Self {
            system,
            is_dark: system == ColorScheme::Dark,
        }
    }

    /// User toggle
    pub fn set_dark_mode(&mut self, dark: bool) {
        self.is_dark = dark;
    }

    /// Platform reported a different system scheme; it overrides the toggle
    pub fn system_changed(&mut self, system: ColorScheme) {
        if system != self.system {
            self.system = system;
            self.is_dark = system == ColorScheme::Dark;
        }
    }

    pub fn is_dark(&self) -> bool {
        self.is_dark
    }

    pub fn system(&self) -> ColorScheme {
        self.system
    }

    pub fn palette(&self) -> &'static Palette {
        if self.is_dark {
            &DARK
        } else {
            &LIGHT
        }
    }

    /// Header glyph next to the toggle
    pub fn mode_icon(&self) -> &'static str {
        if self.is_dark {
            "\u{1F319}"
        } else {
            "\u{2600}\u{FE0F}"
        }
    }
}
