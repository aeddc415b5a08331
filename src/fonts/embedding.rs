//! Font embedding: the five indirect objects a Type 0 font needs in the
//! PDF, plus the reverse CID→Unicode CMap for text extraction.
//!
//! Per font this emits the base `/Type0` dictionary with Identity-H
//! encoding, the CIDFont descendant carrying the full width array, the
//! font descriptor, the font program stream (`FontFile3` with an
//! ASCII85-encoded CFF blob, or `FontFile2` with the raw SFNT), and the
//! ToUnicode CMap stream.

use std::fmt::Write as _;
use std::io::Write;

use crate::error::Result;
use crate::fonts::Font;
use crate::writer::{encode_name, PdfWriter};

/// Write the five objects for `font`, starting with the reserved `id` for
/// the base font dictionary.
pub(crate) fn write_embedded_font<W: Write>(
    w: &mut PdfWriter<W>,
    id: u32,
    font: &Font,
) -> Result<()> {
    let descendant = w.next_id();
    let descriptor = w.next_id();
    let font_file = w.next_id();
    let to_unicode = w.next_id();
    let name = encode_name(font.pdf_name());

    w.write_object(
        id,
        &format!(
            "<<\n  /Type /Font\n  /Subtype /Type0\n  /BaseFont {name}\n  \
             /Encoding /Identity-H\n  /ToUnicode {to_unicode} 0 R\n  \
             /DescendantFonts [{descendant} 0 R]\n>>"
        ),
    )?;

    // Descendant CIDFont with one width per glyph, in thousandths of an em.
    let widths: Vec<String> = (0..font.num_glyphs())
        .map(|g| font.scale(font.h_metric(g).advance as i32, 1000).to_string())
        .collect();
    let default_width = widths.first().cloned().unwrap_or_else(|| "0".into());
    let cid_type = if font.is_cff() { 0 } else { 2 };
    w.write_object(
        descendant,
        &format!(
            "<<\n  /Type /Font\n  /Subtype /CIDFontType{cid_type}\n  /BaseFont {name}\n  \
             /CIDSystemInfo\n  <<\n    /Registry (Adobe)\n    /Ordering (Identity)\n    \
             /Supplement 0\n  >>\n  /DW {default_width}\n  /W [0 [{}]]\n  \
             /FontDescriptor {descriptor} 0 R\n>>",
            widths.join(" ")
        ),
    )?;

    let mut flags = 0x20; // nonsymbolic
    if font.italic_angle() != 0.0 {
        flags |= 0x40;
    }
    let (x_min, y_min, x_max, y_max) = font.bounding_box();
    let font_file_key = if font.is_cff() { 3 } else { 2 };
    w.write_object(
        descriptor,
        &format!(
            "<<\n  /Type /FontDescriptor\n  /FontName {name}\n  /Flags {flags}\n  \
             /FontBBox [{} {} {} {}]\n  /ItalicAngle {:.4}\n  /Ascent {}\n  \
             /Descent {}\n  /CapHeight {}\n  /StemV 0\n  \
             /FontFile{font_file_key} {font_file} 0 R\n>>",
            font.scale(x_min as i32, 1000),
            font.scale(y_min as i32, 1000),
            font.scale(x_max as i32, 1000),
            font.scale(y_max as i32, 1000),
            font.italic_angle(),
            font.scale(font.ascender() as i32, 1000),
            font.scale(font.descender() as i32, 1000),
            font.scale(font.cap_height() as i32, 1000),
        ),
    )?;

    // Font program.
    w.write_object_start(font_file)?;
    if let Some(cff) = font.cff() {
        let encoded = ascii85_encode(cff);
        w.write_str(&format!(
            "<< /Length {} /Subtype /CIDFontType0C /Filter /ASCII85Decode >>\nstream\n",
            encoded.len()
        ))?;
        w.write_str(&encoded)?;
        w.write_str("\nendstream\n")?;
    } else {
        let sfnt = font.sfnt();
        w.write_str(&format!(
            "<< /Length {} /Length1 {} >>\nstream\n",
            sfnt.len(),
            sfnt.len()
        ))?;
        w.write_bytes(sfnt)?;
        w.write_str("\nendstream\n")?;
    }
    w.write_object_end()?;

    w.write_object_start(to_unicode)?;
    w.write_stream_plain(to_unicode_cmap(font).as_bytes())?;
    w.write_object_end()?;
    Ok(())
}

/// Build the ToUnicode CMap: a single `<0000> <FFFF>` code space and
/// `bfchar` entries in groups of at most 100, mapping each glyph back to the
/// highest code point that produces it.
pub(crate) fn to_unicode_cmap(font: &Font) -> String {
    let name = encode_name(font.pdf_name());
    let ordering = &name[1..];

    let mut reverse = vec![0u32; font.num_glyphs() as usize];
    for c in 0..=0xFFFFu32 {
        if let Some(ch) = char::from_u32(c) {
            reverse[font.glyph_index(ch) as usize] = c;
        }
    }
    // .notdef soaks up every unmapped code point; it carries no text.
    reverse[0] = 0;

    let mut cmap = String::new();
    let _ = write!(
        cmap,
        "/CIDInit /ProcSet findresource begin\n\
         12 dict begin\n\
         begincmap\n\
         /CIDSystemInfo << /Registry (FontSpecific) /Ordering ({ordering}) /Supplement 0 >> def\n\
         /CMapName /FontSpecific-{ordering} def\n\
         /CMapType 2 def\n\
         1 begincodespacerange\n\
         <0000> <FFFF>\n\
         endcodespacerange\n"
    );

    let mut remaining = reverse.iter().filter(|&&c| c != 0).count();
    let mut section = 0usize;
    let mut inside = false;
    for (glyph, &code) in reverse.iter().enumerate() {
        if code == 0 {
            continue;
        }
        if section == 0 {
            if inside {
                cmap.push_str("endbfchar\n");
            }
            section = remaining.min(100);
            remaining -= section;
            let _ = writeln!(cmap, "{section} beginbfchar");
            inside = true;
        }
        let _ = writeln!(cmap, "<{glyph:04x}> <{code:04x}>");
        section -= 1;
    }
    if inside {
        cmap.push_str("endbfchar\n");
    }
    cmap.push_str("endcmap\nCMapName currentdict /CMap defineresource pop\nend\nend");
    cmap
}

/// ASCII85-encode a byte string, `z`-folding zero groups and closing with
/// the `~>` marker. Lines are wrapped well below the PDF 255-byte limit.
pub(crate) fn ascii85_encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 5 / 4 + 8);
    let mut column = 0usize;
    let push = |out: &mut String, c: char, column: &mut usize| {
        out.push(c);
        *column += 1;
        if *column >= 75 {
            out.push('\n');
            *column = 0;
        }
    };

    for chunk in data.chunks(4) {
        let mut group = [0u8; 4];
        group[..chunk.len()].copy_from_slice(chunk);
        let mut n = u32::from_be_bytes(group);

        if chunk.len() == 4 && n == 0 {
            push(&mut out, 'z', &mut column);
            continue;
        }
        let mut digits = [0u8; 5];
        for d in digits.iter_mut().rev() {
            *d = (n % 85) as u8;
            n /= 85;
        }
        for &d in digits.iter().take(chunk.len() + 1) {
            push(&mut out, (d + b'!') as char, &mut column);
        }
    }
    out.push_str("~>");
    out
}
