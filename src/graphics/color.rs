/// A CMYK fill color for text, matching the `k` content-stream operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub cyan: f64,
    pub magenta: f64,
    pub yellow: f64,
    pub key: f64,
}

impl Color {
    /// Creates a CMYK color with components clamped to 0.0-1.0.
    pub fn cmyk(cyan: f64, magenta: f64, yellow: f64, key: f64) -> Self {
        Color {
            cyan: cyan.clamp(0.0, 1.0),
            magenta: magenta.clamp(0.0, 1.0),
            yellow: yellow.clamp(0.0, 1.0),
            key: key.clamp(0.0, 1.0),
        }
    }

    /// Black (CMYK 0,0,0,1).
    pub fn black() -> Self {
        Color::cmyk(0.0, 0.0, 0.0, 1.0)
    }

    /// Blue (CMYK 0.88,0.66,0,0).
    pub fn blue() -> Self {
        Color::cmyk(0.88, 0.66, 0.0, 0.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::black()
    }
}
