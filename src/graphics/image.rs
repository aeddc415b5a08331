//! JPEG images for embedding.
//!
//! The JPEG payload is passed through unchanged (`/Filter /DCTDecode`); only
//! the SOF header is scanned for the pixel dimensions and color space the
//! XObject dictionary needs.

use crate::error::{PdfError, Result};

/// Color spaces for images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorSpace {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
}

impl ColorSpace {
    pub(crate) fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceGray => "DeviceGray",
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceCMYK => "DeviceCMYK",
        }
    }
}

/// A JPEG image ready for embedding as an image XObject.
#[derive(Debug, Clone)]
pub struct Image {
    data: Vec<u8>,
    width: u32,
    height: u32,
    color_space: ColorSpace,
    bits_per_component: u8,
}

impl Image {
    /// Create an image from raw JPEG bytes.
    pub fn from_jpeg_data(data: Vec<u8>) -> Result<Self> {
        let (width, height, color_space, bits_per_component) = parse_jpeg_header(&data)?;
        Ok(Image {
            data,
            width,
            height,
            color_space,
            bits_per_component,
        })
    }

    /// Load a JPEG image from a file.
    pub fn from_jpeg_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        Self::from_jpeg_data(std::fs::read(path)?)
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw JPEG bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn color_space(&self) -> ColorSpace {
        self.color_space
    }

    pub(crate) fn bits_per_component(&self) -> u8 {
        self.bits_per_component
    }
}

/// Scan the JPEG marker stream for the first SOF segment.
fn parse_jpeg_header(data: &[u8]) -> Result<(u32, u32, ColorSpace, u8)> {
    if data.len() < 2 || data[0] != 0xFF || data[1] != 0xD8 {
        return Err(PdfError::InvalidImage("not a JPEG stream".to_string()));
    }

    let mut pos = 2;
    while pos + 1 < data.len() {
        if data[pos] != 0xFF {
            return Err(PdfError::InvalidImage("invalid JPEG marker".to_string()));
        }
        let marker = data[pos + 1];
        pos += 2;

        if marker == 0xFF {
            // Fill byte.
            continue;
        }
        if (0xC0..=0xCF).contains(&marker) && marker != 0xC4 && marker != 0xC8 && marker != 0xCC {
            // SOFn: length(2) precision(1) height(2) width(2) components(1).
            if pos + 8 > data.len() {
                return Err(PdfError::InvalidImage("truncated JPEG frame".to_string()));
            }
            let precision = data[pos + 2];
            let height = ((data[pos + 3] as u32) << 8) | data[pos + 4] as u32;
            let width = ((data[pos + 5] as u32) << 8) | data[pos + 6] as u32;
            let components = data[pos + 7];
            if width == 0 || height == 0 {
                return Err(PdfError::InvalidImage("zero-sized JPEG".to_string()));
            }
            let color_space = match components {
                1 => ColorSpace::DeviceGray,
                3 => ColorSpace::DeviceRGB,
                4 => ColorSpace::DeviceCMYK,
                _ => {
                    return Err(PdfError::InvalidImage(format!(
                        "unsupported number of components: {components}"
                    )))
                }
            };
            return Ok((width, height, color_space, precision));
        }
        if marker == 0xD9 {
            break;
        }
        if marker == 0xD8 || (0xD0..=0xD7).contains(&marker) {
            // Standalone markers without a length field.
            continue;
        }
        if pos + 2 > data.len() {
            return Err(PdfError::InvalidImage("truncated JPEG segment".to_string()));
        }
        let length = ((data[pos] as usize) << 8) | data[pos + 1] as usize;
        pos += length;
    }
    Err(PdfError::InvalidImage(
        "no frame header found in JPEG".to_string(),
    ))
}

#[cfg(test)]
pub(crate) fn minimal_jpeg(width: u16, height: u16) -> Vec<u8> {
    let mut jpeg = vec![0xFF, 0xD8]; // SOI
    jpeg.extend(&[0xFF, 0xC0]); // SOF0
    jpeg.extend(&[0x00, 0x0B]); // segment length
    jpeg.push(0x08); // precision
    jpeg.extend(&height.to_be_bytes());
    jpeg.extend(&width.to_be_bytes());
    jpeg.push(0x03); // RGB
    jpeg.extend(&[0x01, 0x11, 0x00]); // component parameters
    jpeg.extend(&[0xFF, 0xD9]); // EOI
    jpeg
}
