// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RGB color type with hex parsing and packed integer conversion.
//!
//! Home automation hosts usually store colors as a packed `0xRRGGBB` integer
//! (16750848 is `#FF9900`). [`RgbColor`] converts between that form, hex strings
//! and individual channels.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// RGB color with 8-bit channels (0-255).
///
/// # Examples
///
/// ```
/// use sleeplight::types::RgbColor;
///
/// let color = RgbColor::new(255, 153, 0);
/// assert_eq!(color.to_packed(), 16_750_848);
///
/// let parsed = RgbColor::from_hex("#FF9900").unwrap();
/// assert_eq!(parsed, color);
/// assert_eq!(parsed.to_hex(), "FF9900");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "ColorRepr", into = "String")]
pub struct RgbColor {
    red: u8,
    green: u8,
    blue: u8,
}

/// Accepted serialized forms: `"#RRGGBB"` strings or packed integers.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum ColorRepr {
    Packed(u32),
    Hex(String),
}

impl RgbColor {
    /// Largest packed value (`0xFFFFFF`).
    pub const MAX_PACKED: u32 = 0x00FF_FFFF;

    /// Warm orange, the default sleep light color.
    pub const WARM_ORANGE: Self = Self::new(0xFF, 0x99, 0x00);

    /// Creates a new RGB color.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Creates a color from a packed `0xRRGGBB` integer.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if any bit above the lower 24 is set.
    ///
    /// # Examples
    ///
    /// ```
    /// use sleeplight::types::RgbColor;
    ///
    /// let color = RgbColor::from_packed(0x00FF00).unwrap();
    /// assert_eq!(color.green(), 255);
    /// assert!(RgbColor::from_packed(0x1000000).is_err());
    /// ```
    pub fn from_packed(value: u32) -> Result<Self, ValueError> {
        if value > Self::MAX_PACKED {
            return Err(ValueError::OutOfRange {
                min: 0,
                max: Self::MAX_PACKED,
                actual: value,
            });
        }
        let [_, red, green, blue] = value.to_be_bytes();
        Ok(Self::new(red, green, blue))
    }

    /// Parses an RGB color from a hex string.
    ///
    /// Accepts formats: `#RRGGBB`, `RRGGBB`, `#RGB`, `RGB`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidHexColor` if the hex string is invalid.
    pub fn from_hex(hex: &str) -> Result<Self, ValueError> {
        let hex = hex.trim_start_matches('#');

        if !hex.is_ascii() {
            return Err(ValueError::InvalidHexColor(hex.to_string()));
        }

        match hex.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (slot, c) in channels.iter_mut().zip(hex.chars()) {
                    // Expand 0-F to 0-255
                    *slot = parse_hex_char(c)? * 17;
                }
                Ok(Self::new(channels[0], channels[1], channels[2]))
            }
            6 => {
                let r = parse_hex_pair(&hex[0..2])?;
                let g = parse_hex_pair(&hex[2..4])?;
                let b = parse_hex_pair(&hex[4..6])?;
                Ok(Self::new(r, g, b))
            }
            _ => Err(ValueError::InvalidHexColor(hex.to_string())),
        }
    }

    /// Returns the red component.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Returns the green component.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Returns the blue component.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Returns the packed `0xRRGGBB` integer.
    #[must_use]
    pub const fn to_packed(&self) -> u32 {
        u32::from_be_bytes([0, self.red, self.green, self.blue])
    }

    /// Returns the color as a hex string without the hash prefix.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }

    /// Returns the color as a hex string with the hash prefix.
    #[must_use]
    pub fn to_hex_with_hash(&self) -> String {
        format!("#{}", self.to_hex())
    }
}

impl Default for RgbColor {
    fn default() -> Self {
        Self::WARM_ORANGE
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex_with_hash())
    }
}

impl FromStr for RgbColor {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<ColorRepr> for RgbColor {
    type Error = ValueError;

    fn try_from(value: ColorRepr) -> Result<Self, Self::Error> {
        match value {
            ColorRepr::Packed(packed) => Self::from_packed(packed),
            ColorRepr::Hex(hex) => Self::from_hex(&hex),
        }
    }
}

impl From<RgbColor> for String {
    fn from(value: RgbColor) -> Self {
        value.to_hex_with_hash()
    }
}

fn parse_hex_char(c: char) -> Result<u8, ValueError> {
    c.to_digit(16)
        .and_then(|d| u8::try_from(d).ok())
        .ok_or_else(|| ValueError::InvalidHexColor(c.to_string()))
}

fn parse_hex_pair(s: &str) -> Result<u8, ValueError> {
    u8::from_str_radix(s, 16).map_err(|_| ValueError::InvalidHexColor(s.to_string()))
}
