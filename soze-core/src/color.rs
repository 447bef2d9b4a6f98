use std::fmt;
use std::ops::{Add, Mul, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::palette;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColorError {
    #[error("channel value must be in [0, 255], but was {0}")]
    OutOfRange(f64),
    #[error("channel value must be an integer, but was {0}")]
    NotIntegral(f64),
    #[error("packed color must be in [0, 0xffffff], but was {0}")]
    PackedOutOfRange(i64),
    #[error("blend bias must be in [0, 1], but was {0}")]
    BiasOutOfRange(f64),
    #[error("invalid format for color data: {0:?}")]
    InvalidFormat(String),
    #[error("expected 3 channel bytes, got {0}")]
    TooFewBytes(usize),
}

/// An RGB color with 8 bits per channel.
///
/// Arithmetic clamps every channel to [0, 255] instead of wrapping.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "[u8; 3]", try_from = "ColorData")]
pub struct Color {
    red: u8,
    green: u8,
    blue: u8,
}

pub const BLACK: Color = Color::new(0, 0, 0);
pub const RED: Color = Color::new(255, 0, 0);
pub const GREEN: Color = Color::new(0, 255, 0);
pub const BLUE: Color = Color::new(0, 0, 255);
pub const WHITE: Color = Color::new(255, 255, 255);

/// Loosely typed color input, as it arrives from settings or JSON.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ColorData {
    /// `#RRGGBB`, `0xRRGGBB` or bare `RRGGBB`
    Hex(String),
    /// `0xRRGGBB` as an integer
    Packed(i64),
    /// `[red, green, blue]`
    Channels(Vec<f64>),
}

impl Color {
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Build a color from untrusted channel values.
    pub fn from_channels(red: f64, green: f64, blue: f64) -> Result<Self, ColorError> {
        Ok(Self::new(check(red)?, check(green)?, check(blue)?))
    }

    /// Unpack a `0xRRGGBB` integer. Bits above the low 24 are ignored.
    pub const fn from_hex(packed: u32) -> Self {
        Self::new(
            ((packed >> 16) & 0xff) as u8,
            ((packed >> 8) & 0xff) as u8,
            (packed & 0xff) as u8,
        )
    }

    /// Read the first three bytes as red, green, blue.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ColorError> {
        match bytes {
            [r, g, b, ..] => Ok(Self::new(*r, *g, *b)),
            _ => Err(ColorError::TooFewBytes(bytes.len())),
        }
    }

    pub fn unpack(data: ColorData) -> Result<Self, ColorError> {
        match data {
            ColorData::Hex(s) => s.parse(),
            ColorData::Packed(v) => {
                if !(0..=0xff_ffff).contains(&v) {
                    return Err(ColorError::PackedOutOfRange(v));
                }
                Ok(Self::from_hex(v as u32))
            }
            ColorData::Channels(c) => match c[..] {
                [r, g, b] => Self::from_channels(r, g, b),
                _ => Err(ColorError::InvalidFormat(format!("{c:?}"))),
            },
        }
    }

    pub fn red(&self) -> u8 {
        self.red
    }

    pub fn green(&self) -> u8 {
        self.green
    }

    pub fn blue(&self) -> u8 {
        self.blue
    }

    pub fn to_hex(&self) -> u32 {
        (self.red as u32) << 16 | (self.green as u32) << 8 | self.blue as u32
    }

    /// `0x`-prefixed, lowercase, always six digits.
    pub fn to_hex_string(&self) -> String {
        format!("0x{:06x}", self.to_hex())
    }

    pub fn to_bytes(&self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }

    /// Mix with `other`, weighting this color by `bias`.
    ///
    /// `bias = 1` returns `self`, `bias = 0` returns `other`.
    pub fn blend(&self, other: &Color, bias: f64) -> Result<Color, ColorError> {
        if !(0.0..=1.0).contains(&bias) {
            return Err(ColorError::BiasOutOfRange(bias));
        }
        let mix = |this: u8, that: u8| (this as f64 * bias + that as f64 * (1.0 - bias)).round() as u8;
        Ok(Color::new(
            mix(self.red, other.red),
            mix(self.green, other.green),
            mix(self.blue, other.blue),
        ))
    }

    /// Index of the closest xterm-256 palette entry.
    pub fn to_terminal_index(&self) -> u8 {
        palette::nearest_index(self.to_hex())
    }
}

fn check(value: f64) -> Result<u8, ColorError> {
    if value.fract() != 0.0 {
        return Err(ColorError::NotIntegral(value));
    }
    if !(0.0..=255.0).contains(&value) {
        return Err(ColorError::OutOfRange(value));
    }
    Ok(value as u8)
}

fn coerce(value: f64) -> u8 {
    value.clamp(0.0, 255.0) as u8
}

impl Add for Color {
    type Output = Color;

    fn add(self, rhs: Color) -> Color {
        Color::new(
            self.red.saturating_add(rhs.red),
            self.green.saturating_add(rhs.green),
            self.blue.saturating_add(rhs.blue),
        )
    }
}

impl Sub for Color {
    type Output = Color;

    fn sub(self, rhs: Color) -> Color {
        Color::new(
            self.red.saturating_sub(rhs.red),
            self.green.saturating_sub(rhs.green),
            self.blue.saturating_sub(rhs.blue),
        )
    }
}

impl Mul<f64> for Color {
    type Output = Color;

    fn mul(self, k: f64) -> Color {
        Color::new(
            coerce(self.red as f64 * k),
            coerce(self.green as f64 * k),
            coerce(self.blue as f64 * k),
        )
    }
}

impl FromStr for Color {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix('#')
            .or_else(|| s.strip_prefix("0x"))
            .unwrap_or(s);
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidFormat(s.to_string()));
        }
        u32::from_str_radix(digits, 16)
            .map(Color::from_hex)
            .map_err(|_| ColorError::InvalidFormat(s.to_string()))
    }
}

impl TryFrom<ColorData> for Color {
    type Error = ColorError;

    fn try_from(data: ColorData) -> Result<Self, Self::Error> {
        Color::unpack(data)
    }
}

impl From<Color> for [u8; 3] {
    fn from(c: Color) -> Self {
        c.to_bytes()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.red, self.green, self.blue)
    }
}
