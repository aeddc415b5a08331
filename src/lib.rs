//! # galley
//!
//! A small typesetting engine in pure Rust: it parses OpenType/TrueType
//! fonts, breaks a lightly marked-up token stream into justified lines, and
//! writes the result as a PDF 1.4 document with embedded fonts.
//!
//! ## Features
//!
//! - **Font parsing**: SFNT directory, metrics, format 4 character maps,
//!   GSUB ligatures and small caps, GPOS pair and class kerning with the
//!   classic `kern` table as fallback, raw CFF/TrueType payloads for
//!   embedding
//! - **Line breaking**: greedy breaking with discretionary hyphenation
//!   points, font and size changes mid-paragraph, and column support
//! - **PDF output**: Identity-H Type 0 fonts with full width arrays and a
//!   ToUnicode CMap, `TJ` text showing with kerning and justification
//!   adjustments, JPEG pass-through images
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use galley::{Document, Font, FontStyle, Length, PageBox, Token};
//! use galley::{normalize_tokens, NoHyphenation};
//!
//! # fn main() -> galley::Result<()> {
//! let font = Font::from_file("Garamond.otf")?;
//!
//! let page = PageBox {
//!     width: Length::parse("160mm")?,
//!     height: Length::parse("252mm")?,
//!     padding_top: Length::parse("25mm")?,
//!     padding_right: Length::parse("25mm")?,
//!     padding_bottom: Length::parse("20mm")?,
//!     padding_left: Length::parse("25mm")?,
//! };
//!
//! let mut tokens = vec![
//!     Token::Text("Hello".to_string()),
//!     Token::Space { raw: " ".to_string() },
//!     Token::Text("world".to_string()),
//! ];
//! normalize_tokens(&mut tokens, &NoHyphenation);
//!
//! let mut doc = Document::new(page);
//! doc.set_title("Hello");
//! doc.add_font(FontStyle::Normal, font);
//! doc.save(tokens, "hello.pdf")?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`fonts`] - OpenType/TrueType parsing and the shaping primitives
//! - [`text`] - tokens, typesetting state, and the line breaker
//! - [`document`] - page assembly and font embedding
//! - [`writer`] - low-level PDF objects, streams, and the xref table
//! - [`geometry`] - lengths and the page box
//! - [`graphics`] - text color and JPEG images

pub mod document;
pub mod error;
pub mod fonts;
pub mod geometry;
pub mod graphics;
pub mod text;
pub mod writer;

pub use document::Document;
pub use error::{FontError, PdfError, Result};
pub use fonts::{Font, HMetric};
pub use geometry::{Length, PageBox};
pub use graphics::{Color, Image};
pub use text::{
    break_lines, normalize_tokens, FontBook, FontStyle, Hyphenator, NoHyphenation, State,
    StateAction, Token,
};
pub use writer::PdfWriter;
