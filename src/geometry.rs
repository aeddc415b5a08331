//! Lengths and the page box.
//!
//! Lengths are written as `<number>mm` or `<number>cm` and stored in PDF
//! points (1 in = 72 pt = 25.4 mm).

use std::str::FromStr;

use crate::error::{PdfError, Result};

/// A length resolved to PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Length {
    points: f64,
}

impl Length {
    /// A zero length.
    pub fn zero() -> Self {
        Length { points: 0.0 }
    }

    /// Construct from a value already in points.
    pub fn from_points(points: f64) -> Self {
        Length { points }
    }

    /// Construct from millimeters.
    pub fn from_mm(mm: f64) -> Self {
        Length {
            points: mm * 72.0 / 25.4,
        }
    }

    /// Parse `"<number>mm"` or `"<number>cm"`.
    pub fn parse(s: &str) -> Result<Length> {
        let s = s.trim();
        let split = s
            .char_indices()
            .find(|&(_, c)| c != '.' && !c.is_ascii_digit())
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        let value: f64 = s[..split]
            .parse()
            .map_err(|_| PdfError::InvalidFormat(format!("invalid length {s:?}")))?;
        match s[split..].trim() {
            "mm" => Ok(Length::from_mm(value)),
            "cm" => Ok(Length::from_mm(value * 10.0)),
            _ => Err(PdfError::InvalidFormat(format!("invalid length {s:?}"))),
        }
    }

    /// The value in points.
    pub fn points(&self) -> f64 {
        self.points
    }
}

impl FromStr for Length {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Length> {
        Length::parse(s)
    }
}

/// The type area of the single page: its size plus the surrounding padding.
#[derive(Debug, Clone, Copy, Default)]
pub struct PageBox {
    pub width: Length,
    pub height: Length,
    pub padding_top: Length,
    pub padding_right: Length,
    pub padding_bottom: Length,
    pub padding_left: Length,
}

impl PageBox {
    /// Page width including padding, in points.
    pub fn total_width(&self) -> f64 {
        self.padding_left.points() + self.width.points() + self.padding_right.points()
    }

    /// Page height including padding, in points.
    pub fn total_height(&self) -> f64 {
        self.padding_top.points() + self.height.points() + self.padding_bottom.points()
    }
}
