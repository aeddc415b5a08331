//! Document assembly: breaks the token stream into lines and drives the
//! [`PdfWriter`] to produce the finished file.
//!
//! The output is a single-page PDF 1.4 document: Catalog, Pages node, Page,
//! one content stream, one embedded Type 0 font per registered face, and an
//! optional JPEG XObject. Text is shown with `TJ` arrays carrying
//! inter-glyph kerning and the inter-word adjustments that justify each
//! line.

use std::fmt::Write as _;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{PdfError, Result};
use crate::fonts::embedding::write_embedded_font;
use crate::fonts::Font;
use crate::geometry::PageBox;
use crate::graphics::Image;
use crate::text::breaker::{
    apply_token, break_lines, shape_run, token_width, State,
};
use crate::text::{FontBook, FontStyle, Token};
use crate::writer::{pdf_string, PdfWriter};

/// Builder for a one-page typeset document.
pub struct Document {
    page: PageBox,
    title: Option<String>,
    fonts: FontBook,
    image: Option<Image>,
    frame: bool,
    base_size: f64,
}

impl Document {
    pub fn new(page: PageBox) -> Self {
        Document {
            page,
            title: None,
            fonts: FontBook::new(),
            image: None,
            frame: false,
            base_size: 12.0,
        }
    }

    /// Document title for the Info dictionary.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    /// Stroke a hairline frame around the type area.
    pub fn set_frame(&mut self, frame: bool) {
        self.frame = frame;
    }

    /// Image drawn below the last line of text, scaled to the type-area
    /// width.
    pub fn set_image(&mut self, image: Image) {
        self.image = Some(image);
    }

    /// Register a font face for a style slot.
    pub fn add_font(&mut self, style: FontStyle, font: Font) {
        self.fonts.insert(style, font);
    }

    /// Initial font size in points (12 by default).
    pub fn set_font_size(&mut self, size: f64) {
        self.base_size = size;
    }

    /// The registered faces.
    pub fn fonts(&self) -> &FontBook {
        &self.fonts
    }

    /// Typeset `tokens` and write the complete PDF to `out`.
    pub fn render<W: Write>(&self, tokens: Vec<Token>, out: W) -> Result<()> {
        if self.fonts.is_empty() {
            return Err(PdfError::InvalidStructure(
                "no fonts registered".to_string(),
            ));
        }
        let mut tokens = tokens;

        let mut state = State::new(self.page.width.points());
        state.size = self.base_size;
        let initial = state;
        break_lines(&mut tokens, &mut state, &self.fonts);

        let mut w = PdfWriter::new(out);
        w.write_header()?;

        let info = w.next_id();
        let root = w.next_id();
        let pages = w.next_id();
        let page = w.next_id();
        let contents = w.next_id();
        let font_ids: Vec<u32> = (0..self.fonts.len()).map(|_| w.next_id()).collect();
        let image_id = self.image.as_ref().map(|_| w.next_id());

        // Info dictionary.
        let mut info_body = String::from("<<");
        if let Some(title) = &self.title {
            let _ = write!(info_body, " /Title {}", pdf_string(title));
        }
        let now = chrono::Local::now();
        let _ = write!(
            info_body,
            " /Producer (galley) /CreationDate (D:{}) >>",
            now.format("%Y%m%d%H%M%S%z")
        );
        w.write_object(info, &info_body)?;

        w.write_object(root, &format!("<< /Type /Catalog /Pages {pages} 0 R >>"))?;

        // Pages node carrying the shared resources.
        let mut font_dict = String::new();
        for (i, id) in font_ids.iter().enumerate() {
            let _ = write!(font_dict, "/F{} {} 0 R ", i + 1, id);
        }
        let mut resources = format!(
            "  <<\n    /Font << {}>>\n    /ProcSet [/PDF /Text /ImageB /ImageC /ImageI]\n",
            font_dict
        );
        if let Some(id) = image_id {
            let _ = write!(resources, "    /XObject << /I1 {id} 0 R >>\n");
        }
        resources.push_str("  >>");
        w.write_object(
            pages,
            &format!(
                "<<\n  /Type /Pages\n  /MediaBox [0 0 {:.4} {:.4}]\n\n  /Resources\n{}\n  /Kids [{} 0 R]\n  /Count 1\n>>",
                self.page.total_width(),
                self.page.total_height(),
                resources,
                page
            ),
        )?;
        w.write_object(
            page,
            &format!("<<\n  /Type /Page\n  /Parent {pages} 0 R\n  /Contents {contents} 0 R\n>>"),
        )?;

        // Content stream.
        let content = self.build_content(&tokens, initial);
        w.write_object_start(contents)?;
        w.write_stream_plain(content.as_bytes())?;
        w.write_object_end()?;

        for (i, (_, font)) in self.fonts.iter().enumerate() {
            write_embedded_font(&mut w, font_ids[i], font)?;
        }
        if let (Some(id), Some(image)) = (image_id, &self.image) {
            write_image(&mut w, id, image)?;
        }

        w.write_footer(root, info)
    }

    /// Typeset `tokens` and write the PDF to a file.
    pub fn save(&self, tokens: Vec<Token>, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        self.render(tokens, BufWriter::new(file))
    }

    /// Emit the content-stream operators for the broken token stream.
    fn build_content(&self, tokens: &[Token], mut st: State) -> String {
        let book = &self.fonts;
        let page = &self.page;
        let mut buf = String::new();

        if self.frame {
            let _ = writeln!(
                buf,
                ".5 w .9 G {:.4} {:.4} {:.4} {:.4} re S",
                page.padding_left.points(),
                page.padding_bottom.points(),
                page.width.points(),
                page.height.points(),
            );
        }

        // First baseline: top of the type area minus the tallest ascender
        // on the first line.
        st.y = page.padding_bottom.points() + page.height.points()
            - first_line_ascent(book, &st, tokens);
        st.col_start = st.y;

        buf.push_str("BT\n");
        let _ = writeln!(
            buf,
            "/F{} {:.4} Tf",
            book.resource_number(st.font).unwrap_or(1),
            st.size
        );
        let _ = writeln!(buf, "{:.4} {:.4} Td", page.padding_left.points(), st.y);

        let mut in_tj = false;
        let mut word_spacing = 0.0;
        let mut line_start = true;
        for (i, token) in tokens.iter().enumerate() {
            if line_start {
                word_spacing = line_word_spacing(book, &st, &tokens[i..]);
                line_start = false;
            }
            self.emit_token(&mut buf, &mut in_tj, &mut st, token, word_spacing);
            if matches!(
                token,
                Token::LineBreak | Token::ParagraphBreak | Token::ColumnBreak
            ) {
                line_start = true;
            }
        }
        close_tj(&mut buf, &mut in_tj);
        buf.push_str("ET\n");

        if let Some(image) = &self.image {
            let width = page.width.points();
            let height = image.height() as f64 * width / image.width() as f64;
            let y = 0.5 * (st.y - page.padding_bottom.points() - height)
                + page.padding_bottom.points();
            let _ = write!(
                buf,
                "q\n1 0 0 1 {:.4} {:.4} cm\n{:.4} 0 0 {:.4} 0 0 cm\n/I1 Do\nQ\n",
                page.padding_left.points(),
                y,
                width,
                height,
            );
        }
        buf
    }

    fn emit_token(
        &self,
        buf: &mut String,
        in_tj: &mut bool,
        st: &mut State,
        token: &Token,
        word_spacing: f64,
    ) {
        let book = &self.fonts;
        match token {
            Token::Text(text) => {
                if let Some(font) = book.face(st.font) {
                    show_text(buf, in_tj, font, st, text);
                }
            }
            Token::Space { .. } => {
                if let Some(font) = book.face(st.font) {
                    show_space(buf, in_tj, font, st, word_spacing);
                }
            }
            Token::CanBreak { no_break, .. } => {
                // Only reachable for the untouched tail after a graceful
                // overflow; render the unbroken form.
                if let Some(inner) = no_break.as_deref() {
                    self.emit_token(buf, in_tj, st, inner, word_spacing);
                }
            }
            Token::LineBreak => {
                close_tj(buf, in_tj);
                let leading = st.line_height * st.size;
                let _ = writeln!(buf, "0 {:.4} Td", -leading);
                st.y -= leading;
            }
            Token::ParagraphBreak => {
                close_tj(buf, in_tj);
                let skip = st.line_height * st.size * st.par_skip;
                let _ = writeln!(buf, "0 {:.4} Td", -skip);
                st.y -= skip;
            }
            Token::ColumnBreak => {
                close_tj(buf, in_tj);
                // Jump back to the column top, one column width plus the
                // gutter to the right.
                let dx = self.page.width.points() - st.max_width;
                let dy = st.col_start - st.y;
                let _ = writeln!(buf, "{:.4} {:.4} Td", dx, dy);
                st.y = st.col_start;
            }
            Token::SetFont { .. } => {
                close_tj(buf, in_tj);
                apply_token(st, token);
                let _ = writeln!(
                    buf,
                    "/F{} {:.4} Tf",
                    book.resource_number(st.font).unwrap_or(1),
                    st.size
                );
            }
            Token::SetTextColor(color) => {
                close_tj(buf, in_tj);
                let _ = writeln!(
                    buf,
                    "{:.4} {:.4} {:.4} {:.4} k",
                    color.cyan, color.magenta, color.yellow, color.key
                );
            }
            Token::Action(_) => apply_token(st, token),
            Token::Macro(_) => {}
        }
    }
}

fn close_tj(buf: &mut String, in_tj: &mut bool) {
    if *in_tj {
        buf.push_str("] TJ\n");
        *in_tj = false;
    }
}

/// Append one element to an open `TJ` array.
fn push_element(buf: &mut String, in_tj: &mut bool, element: &str) {
    if !*in_tj {
        buf.push('[');
        *in_tj = true;
    } else if !buf.ends_with('[') {
        buf.push(' ');
    }
    buf.push_str(element);
}

/// Show a shaped text run, interleaving kerning adjustments. `TJ` numbers
/// are subtracted from the displacement, so a kern value flips sign.
fn show_text(buf: &mut String, in_tj: &mut bool, font: &Font, st: &State, text: &str) {
    let glyphs = shape_run(font, st, text);
    for (i, &glyph) in glyphs.iter().enumerate() {
        if i > 0 {
            let kern = font.scale(font.kerning(glyphs[i - 1], glyph), 1000);
            if kern != 0 {
                push_element(buf, in_tj, &format!("{}", -kern));
            }
        }
        push_element(buf, in_tj, &format!("<{glyph:04x}>"));
    }
}

/// Show a space glyph; a justified line follows each space with the negative
/// word-spacing adjustment.
fn show_space(buf: &mut String, in_tj: &mut bool, font: &Font, st: &State, word_spacing: f64) {
    let glyph = font.glyph_index(' ');
    push_element(buf, in_tj, &format!("<{glyph:04x}>"));
    if word_spacing > 0.0 {
        let adjustment = (word_spacing / st.size * 1000.0).round() as i64;
        push_element(buf, in_tj, &format!("{}", -adjustment));
    }
}

/// Extra width per inter-word gap for the line starting at `rest[0]`. Only
/// lines closed by an explicit [`Token::LineBreak`] are justified.
fn line_word_spacing(book: &FontBook, st: &State, rest: &[Token]) -> f64 {
    let mut probe = *st;
    let mut width = 0.0;
    let mut spaces = 0usize;
    for token in rest {
        match token {
            Token::LineBreak => {
                if spaces == 0 {
                    return 0.0;
                }
                let extra = (probe.max_width - width) / spaces as f64;
                return extra.max(0.0);
            }
            Token::ParagraphBreak | Token::ColumnBreak => return 0.0,
            token => {
                if matches!(token, Token::Space { .. }) {
                    spaces += 1;
                }
                width += token_width(book, &probe, token);
                apply_token(&mut probe, token);
            }
        }
    }
    0.0
}

/// Largest scaled ascender on the first line, following font changes.
fn first_line_ascent(book: &FontBook, st: &State, tokens: &[Token]) -> f64 {
    let mut probe = *st;
    let mut ascent: f64 = 0.0;
    let measure = |probe: &State| -> f64 {
        match book.face(probe.font) {
            Some(font) => {
                font.scale(font.ascender() as i32, 1000) as f64 / 1000.0 * probe.size
            }
            None => 0.0,
        }
    };
    ascent = ascent.max(measure(&probe));
    for token in tokens {
        if matches!(
            token,
            Token::LineBreak | Token::ParagraphBreak | Token::ColumnBreak
        ) {
            break;
        }
        apply_token(&mut probe, token);
        ascent = ascent.max(measure(&probe));
    }
    ascent
}

/// Write a JPEG image XObject; the payload passes through with
/// `/Filter [/DCTDecode]`.
fn write_image<W: Write>(w: &mut PdfWriter<W>, id: u32, image: &Image) -> Result<()> {
    w.write_object_start(id)?;
    w.write_str(&format!(
        "<<\n  /Type /XObject\n  /Subtype /Image\n  /Width {}\n  /Height {}\n  \
         /ColorSpace /{}\n  /BitsPerComponent {}\n  /Interpolate true\n  \
         /Filter [/DCTDecode]\n  /Length {}\n>>\nstream\n",
        image.width(),
        image.height(),
        image.color_space().pdf_name(),
        image.bits_per_component(),
        image.data().len(),
    ))?;
    w.write_bytes(image.data())?;
    w.write_str("\nendstream\n")?;
    w.write_object_end()
}
