use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use crate::render::RenderOptions;
use crate::style::Color;

const MIN_FONT_SIZE: u8 = 11;
const MAX_FONT_SIZE: u8 = 16;

/// Resolved colors of the vault's theme. Defaults follow the dark theme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub background_primary: Color,
    pub background_secondary: Color,
    pub border_color: Color,
    pub text_normal: Color,
    pub text_muted: Color,
    pub text_faint: Color,
    pub accent: Color,
    pub accent_hover: Color,
    pub text_on_accent: Color,
    pub base_font_size: u8,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background_primary: Color(0x1E1E1EFF),
            background_secondary: Color(0x252525FF),
            border_color: Color(0x3D3D3DFF),
            text_normal: Color(0xDCDDDEFF),
            text_muted: Color(0x999999FF),
            text_faint: Color(0x666666FF),
            accent: Color(0x7C3AEDFF),
            accent_hover: Color(0x6D28D9FF),
            text_on_accent: Color(0xFFFFFFFF),
            base_font_size: 13,
        }
    }
}

impl Theme {
    /// Base font size, clamped to what fits a widget
    pub fn font_size(&self) -> u8 {
        self.base_font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
    }

    /// Options for rendering with this theme and the given budget
    pub fn render_options(&self, budget: Budget) -> RenderOptions {
        RenderOptions {
            base_text_color: self.text_normal,
            accent_color: self.accent,
            muted_text_color: self.text_muted,
            background_color: self.background_secondary,
            max_lines: budget.max_lines,
            truncate_length: budget.truncate_length,
        }
    }

    /// Options for one of the built-in profiles
    pub fn profile_options(&self, profile: RenderProfile) -> RenderOptions {
        self.render_options(profile.budget())
    }
}

/// Line and length limits for a render call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub max_lines: usize,
    pub truncate_length: usize,
}

/// The two ways notes are displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RenderProfile {
    /// Small home-screen widget
    Compact,
    /// Full-screen overlay
    Full,
}

impl RenderProfile {
    pub fn budget(self) -> Budget {
        match self {
            RenderProfile::Compact => Budget {
                max_lines: 50,
                truncate_length: 2000,
            },
            RenderProfile::Full => Budget {
                max_lines: 2000,
                truncate_length: 50000,
            },
        }
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.alpha() == 0xFF {
            serializer.serialize_str(&format!("#{:06x}", self.0 >> 8))
        } else {
            serializer.serialize_str(&self.to_string())
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Color::parse_hex(&value).ok_or_else(|| {
            de::Error::custom(format!("invalid color '{}', expected #rrggbb", value))
        })
    }
}
