use clap::ValueEnum;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb16 {
    pub red: u16,
    pub green: u16,
    pub blue: u16,
}

impl Rgb16 {
    pub const fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        // 0xff * 257 == 0xffff
        Self {
            red: r as u16 * 257,
            green: g as u16 * 257,
            blue: b as u16 * 257,
        }
    }
}

/// A border color as typed by the user, classified without touching the display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorSpec {
    Hex(Rgb16),
    Rgb(Rgb16),
    /// Looked up in the server's color database once connected.
    Named(String),
    Invalid(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StyleError {
    #[error("invalid color \"{input}\" - {reason}")]
    InvalidColor { input: String, reason: String },
    #[error("unknown color \"{0}\"")]
    UnknownColor(String),
}

impl ColorSpec {
    pub fn parse(input: &str) -> Self {
        let s = input.trim();
        if let Some(hex) = s.strip_prefix('#') {
            return parse_hex(hex);
        }
        if s.contains(',') {
            return parse_rgb(s);
        }
        if s.is_empty() {
            return Self::Invalid("empty color".to_string());
        }
        Self::Named(s.to_string())
    }

    /// The color, unless it still needs a server lookup.
    pub fn literal(&self, input: &str) -> Result<Option<Rgb16>, StyleError> {
        match self {
            Self::Hex(color) | Self::Rgb(color) => Ok(Some(*color)),
            Self::Named(_) => Ok(None),
            Self::Invalid(reason) => Err(StyleError::InvalidColor {
                input: input.to_string(),
                reason: reason.clone(),
            }),
        }
    }
}

fn parse_hex(hex: &str) -> ColorSpec {
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return ColorSpec::Invalid("expected #RRGGBB".to_string());
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16);
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Ok(r), Ok(g), Ok(b)) => ColorSpec::Hex(Rgb16::from_rgb8(r, g, b)),
        _ => ColorSpec::Invalid("expected #RRGGBB".to_string()),
    }
}

fn parse_rgb(s: &str) -> ColorSpec {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return ColorSpec::Invalid(format!(
            "expected three components, got {}",
            parts.len()
        ));
    }
    let mut channels = [0u8; 3];
    for (slot, part) in channels.iter_mut().zip(&parts) {
        match part.parse::<u8>() {
            Ok(value) => *slot = value,
            Err(_) => {
                return ColorSpec::Invalid(format!(
                    "invalid rgb component \"{part}\" - must be 0..255"
                ))
            }
        }
    }
    let [r, g, b] = channels;
    ColorSpec::Rgb(Rgb16::from_rgb8(r, g, b))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LineStyle {
    #[default]
    Solid,
    /// Alternating drawn and skipped segments.
    Dash,
    /// Alternating foreground and background segments.
    DoubleDash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderStyle {
    pub color: Rgb16,
    pub width: u16,
    pub line: LineStyle,
}
