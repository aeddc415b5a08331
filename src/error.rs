use thiserror::Error;

/// Errors reported by the OpenType/TrueType parser.
///
/// Optional tables (kern, GSUB, GPOS) that are absent simply disable the
/// corresponding feature; these errors are only raised for tables that are
/// present but malformed, or for required tables that are missing.
#[derive(Error, Debug)]
pub enum FontError {
    #[error("{0} is too short")]
    TruncatedTable(&'static str),

    #[error("unsupported cmap encoding")]
    UnsupportedEncoding,

    #[error("unsupported {what}: {value}")]
    UnsupportedFormat { what: &'static str, value: u32 },

    #[error("invalid font structure: {0}")]
    InvalidStructure(String),

    #[error("missing required table: {0}")]
    MissingRequiredTable(&'static str),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("font error: {0}")]
    Font(#[from] FontError),

    #[error("invalid image: {0}")]
    InvalidImage(String),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("invalid document structure: {0}")]
    InvalidStructure(String),
}

pub type Result<T> = std::result::Result<T, PdfError>;
