//! Base material types

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// An sRGB color with alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Default for Rgba {
    fn default() -> Self {
        Self::new(0, 0, 0, 255)
    }
}

impl Rgba {
    /// Create a new color
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

impl FromStr for Rgba {
    type Err = Error;

    /// Parse `#RRGGBB` or `#RRGGBBAA`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidFormat(format!("Invalid sRGB color '{}'", s));
        let hex = s.strip_prefix('#').ok_or_else(invalid)?;
        if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != 255 {
            write!(f, "{:02X}", self.a)?;
        }
        Ok(())
    }
}

/// A single base material
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Base {
    /// Material name
    pub name: String,
    /// Display color
    pub color: Rgba,
}

impl Base {
    /// Create a new base material
    pub fn new(name: impl Into<String>, color: Rgba) -> Self {
        Self {
            name: name.into(),
            color,
        }
    }
}

/// A `<basematerials>` resource
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BaseMaterials {
    /// Resource id
    pub id: u32,
    /// Materials addressed by property index
    pub bases: Vec<Base>,
}

impl BaseMaterials {
    /// Create an empty group
    pub fn new(id: u32) -> Self {
        Self {
            id,
            bases: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse() {
        assert_eq!("#FF8000".parse::<Rgba>().unwrap(), Rgba::new(255, 128, 0, 255));
        assert_eq!("#ff800080".parse::<Rgba>().unwrap(), Rgba::new(255, 128, 0, 128));
        assert!("FF8000".parse::<Rgba>().is_err());
        assert!("#FF80".parse::<Rgba>().is_err());
        assert!("#GG8000".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Rgba::new(255, 128, 0, 255).to_string(), "#FF8000");
        assert_eq!(Rgba::new(1, 2, 3, 4).to_string(), "#01020304");
    }
}
