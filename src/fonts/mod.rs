//! TrueType and OpenType font parsing.
//!
//! [`Font::parse`] consumes a raw SFNT buffer (TTF `0x00010000` or OTF
//! `OTTO`) and extracts everything the typesetter and the PDF embedder need:
//! names, vertical metrics, the character map, horizontal metrics, ligature
//! and small-caps substitutions, kerning (GPOS pair and class data with the
//! classic `kern` table as fallback), and the raw outline payload (`CFF ` or
//! the whole SFNT) for embedding.
//!
//! The `Font` owns its backing buffer; parsed tables that need raw byte
//! access (the cmap `glyphIdArray`, the classic kern pair block, the CFF
//! blob) are stored as ranges into that buffer instead of copies.
//!
//! Format references: <https://learn.microsoft.com/en-us/typography/opentype/spec/>
//! and <https://developer.apple.com/fonts/TrueType-Reference-Manual/>.

use std::collections::HashMap;
use std::ops::Range;
use std::path::Path;

use crate::error::FontError;

mod cmap;
mod gpos;
mod gsub;
mod kern;
mod otl;
mod reader;

pub(crate) mod embedding;
#[cfg(test)]
pub(crate) mod test_font;

pub use gpos::{ClassKern, KernPair};
pub use gsub::{Ligature, SmallCaps};

use cmap::Cmap;
use gpos::GposKerning;
use kern::KernTable;
use reader::{read_i16, read_tag, read_u16, read_u32};

const SIG_TRUETYPE: u32 = 0x0001_0000;
const SIG_OTTO: u32 = 0x4F54_544F;

/// Horizontal metrics of a single glyph, in design units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HMetric {
    /// Advance width.
    pub advance: u16,
    /// Left side bearing.
    pub left: i16,
}

/// A parsed font, immutable once built.
#[derive(Debug, Clone)]
pub struct Font {
    data: Vec<u8>,

    full_name: String,
    postscript_name: String,
    pdf_name: String,

    units_per_em: u16,
    x_min: i16,
    y_min: i16,
    x_max: i16,
    y_max: i16,
    ascender: i16,
    descender: i16,
    cap_height: i16,
    italic_angle: f32,

    num_glyphs: u16,
    cmap: Cmap,
    hmetrics: Vec<HMetric>,

    ligatures: Vec<Ligature>,
    small_caps: Option<SmallCaps>,
    pair_kerning: Vec<KernPair>,
    class_kerning: Option<ClassKern>,
    kern_table: Option<KernTable>,

    cff: Option<Range<usize>>,
}

impl Font {
    /// Read and parse a font file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Font, FontError> {
        Self::parse(std::fs::read(path)?)
    }

    /// Parse an SFNT container from raw bytes.
    pub fn parse(data: Vec<u8>) -> Result<Font, FontError> {
        const DIR: &str = "font directory";

        if data.len() < 12 {
            return Err(FontError::TruncatedTable(DIR));
        }
        let version = read_u32(&data, 0, DIR)?;
        if version != SIG_TRUETYPE && version != SIG_OTTO {
            return Err(FontError::InvalidStructure(format!(
                "bad SFNT version 0x{version:08x}"
            )));
        }
        let n = read_u16(&data, 4, DIR)? as usize;
        if data.len() < 16 * n + 12 {
            return Err(FontError::TruncatedTable(DIR));
        }

        let mut tables: HashMap<[u8; 4], Range<usize>> = HashMap::new();
        for i in 0..n {
            let x = 12 + 16 * i;
            let tag = read_tag(&data, x, DIR)?;
            let offset = read_u32(&data, x + 8, DIR)? as usize;
            let length = read_u32(&data, x + 12, DIR)? as usize;
            let end = offset
                .checked_add(length)
                .filter(|&end| end <= data.len())
                .ok_or_else(|| {
                    FontError::InvalidStructure(format!(
                        "table {} extends beyond the file",
                        String::from_utf8_lossy(&tag)
                    ))
                })?;
            tables.insert(tag, offset..end);
        }

        // head
        let head = required(&data, &tables, b"head", "head")?;
        if head.len() < 54 {
            return Err(FontError::TruncatedTable("head"));
        }
        let head_version = read_u32(head, 0, "head")?;
        if head_version != SIG_TRUETYPE {
            return Err(FontError::InvalidStructure(format!(
                "bad head version 0x{head_version:08x}"
            )));
        }
        let units_per_em = read_u16(head, 18, "head")?;
        if units_per_em == 0 {
            return Err(FontError::InvalidStructure("unitsPerEm is zero".into()));
        }
        let x_min = read_i16(head, 36, "head")?;
        let y_min = read_i16(head, 38, "head")?;
        let x_max = read_i16(head, 40, "head")?;
        let y_max = read_i16(head, 42, "head")?;

        // name
        let name = required(&data, &tables, b"name", "name")?;
        let full_name = lookup_name(name, 4)?;
        let postscript_name = lookup_name(name, 6)?;
        let pdf_name = if postscript_name.is_empty() {
            &full_name
        } else {
            &postscript_name
        }
        .replace(' ', "");

        // maxp before hmtx: the glyph count bounds the metric count.
        let maxp = required(&data, &tables, b"maxp", "maxp")?;
        if maxp.len() < 6 {
            return Err(FontError::TruncatedTable("maxp"));
        }
        let num_glyphs = read_u16(maxp, 4, "maxp")?;

        // cmap
        let cmap_range = tables
            .get(b"cmap")
            .ok_or(FontError::MissingRequiredTable("cmap"))?
            .clone();
        let cmap = Cmap::parse(&data, cmap_range)?;

        // OS/2
        let os2 = required(&data, &tables, b"OS/2", "OS/2")?;
        if os2.len() < 72 {
            return Err(FontError::TruncatedTable("OS/2"));
        }
        let os2_version = read_u16(os2, 0, "OS/2")?;
        let ascender = read_i16(os2, 68, "OS/2")?;
        let descender = read_i16(os2, 70, "OS/2")?;
        let cap_height = if os2_version >= 2 && os2.len() >= 90 {
            read_i16(os2, 88, "OS/2")?
        } else {
            ascender
        };

        // hhea + hmtx
        let hhea = required(&data, &tables, b"hhea", "hhea")?;
        if hhea.len() < 36 {
            return Err(FontError::TruncatedTable("hhea"));
        }
        let n_hmetric = read_u16(hhea, 34, "hhea")? as usize;
        if n_hmetric == 0 {
            return Err(FontError::InvalidStructure(
                "hhea declares zero horizontal metrics".into(),
            ));
        }
        if n_hmetric > num_glyphs as usize {
            return Err(FontError::InvalidStructure(format!(
                "{n_hmetric} horizontal metrics for {num_glyphs} glyphs"
            )));
        }
        let hmtx = required(&data, &tables, b"hmtx", "hmtx")?;
        if hmtx.len() < 4 * n_hmetric {
            return Err(FontError::TruncatedTable("hmtx"));
        }
        let mut hmetrics = Vec::with_capacity(n_hmetric);
        for i in 0..n_hmetric {
            hmetrics.push(HMetric {
                advance: read_u16(hmtx, 4 * i, "hmtx")?,
                left: read_i16(hmtx, 4 * i + 2, "hmtx")?,
            });
        }

        // post
        let post = required(&data, &tables, b"post", "post")?;
        if post.len() < 16 {
            return Err(FontError::TruncatedTable("post"));
        }
        let italic_angle =
            read_i16(post, 4, "post")? as f32 + read_u16(post, 6, "post")? as f32 / 65535.0;

        // Optional feature tables.
        let (ligatures, small_caps) = match tables.get(b"GSUB") {
            Some(r) => {
                let gsub = &data[r.clone()];
                (gsub::parse_ligatures(gsub)?, gsub::parse_small_caps(gsub)?)
            }
            None => (Vec::new(), None),
        };
        let GposKerning { pairs, classes } = match tables.get(b"GPOS") {
            Some(r) => gpos::parse_kerning(&data[r.clone()], num_glyphs)?,
            None => GposKerning::default(),
        };
        let kern_table = match tables.get(b"kern") {
            Some(r) => Some(KernTable::parse(&data, r.clone())?),
            None => None,
        };

        let cff = tables.get(b"CFF ").cloned();

        Ok(Font {
            data,
            full_name,
            postscript_name,
            pdf_name,
            units_per_em,
            x_min,
            y_min,
            x_max,
            y_max,
            ascender,
            descender,
            cap_height,
            italic_angle,
            num_glyphs,
            cmap,
            hmetrics,
            ligatures,
            small_caps,
            pair_kerning: pairs,
            class_kerning: classes,
            kern_table,
            cff,
        })
    }

    /// Full font name (name ID 4).
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// PostScript name (name ID 6).
    pub fn postscript_name(&self) -> &str {
        &self.postscript_name
    }

    /// Name used as the PDF base font name: the PostScript name (full name
    /// when absent) with spaces stripped.
    pub fn pdf_name(&self) -> &str {
        &self.pdf_name
    }

    pub fn units_per_em(&self) -> u16 {
        self.units_per_em
    }

    /// Glyph bounding box `(x_min, y_min, x_max, y_max)` in design units.
    pub fn bounding_box(&self) -> (i16, i16, i16, i16) {
        (self.x_min, self.y_min, self.x_max, self.y_max)
    }

    pub fn ascender(&self) -> i16 {
        self.ascender
    }

    pub fn descender(&self) -> i16 {
        self.descender
    }

    pub fn cap_height(&self) -> i16 {
        self.cap_height
    }

    pub fn italic_angle(&self) -> f32 {
        self.italic_angle
    }

    pub fn num_glyphs(&self) -> u16 {
        self.num_glyphs
    }

    /// Horizontal metrics for a glyph. Glyphs past the metric array share the
    /// last entry; glyphs past the glyph count get zero metrics.
    pub fn h_metric(&self, glyph: u16) -> HMetric {
        if glyph >= self.num_glyphs {
            return HMetric::default();
        }
        match self.hmetrics.get(glyph as usize) {
            Some(&m) => m,
            None => self.hmetrics.last().copied().unwrap_or_default(),
        }
    }

    /// Glyph index for a code point; 0 (.notdef) when unmapped.
    pub fn glyph_index(&self, c: char) -> u16 {
        self.cmap.glyph_index(&self.data, c, self.num_glyphs)
    }

    /// Map a string to glyph indices, one per code point.
    pub fn glyphs(&self, text: &str) -> Vec<u16> {
        text.chars().map(|c| self.glyph_index(c)).collect()
    }

    /// Replace component sequences with their ligature glyphs, in place.
    /// At each position the first matching rule wins, in font order.
    pub fn apply_ligatures(&self, glyphs: &mut Vec<u16>) {
        if self.ligatures.is_empty() {
            return;
        }
        let mut i = 0;
        while i < glyphs.len() {
            for rule in &self.ligatures {
                let k = rule.components.len();
                if i + k > glyphs.len() {
                    continue;
                }
                if glyphs[i..i + k] == rule.components[..] {
                    glyphs[i] = rule.glyph;
                    glyphs.drain(i + 1..i + k);
                    break;
                }
            }
            i += 1;
        }
    }

    /// Substitute small-capital forms, in place. Glyphs without an `smcp`
    /// rule pass through.
    pub fn apply_small_caps(&self, glyphs: &mut [u16]) {
        let Some(sc) = &self.small_caps else { return };
        for g in glyphs.iter_mut() {
            if let Some(pos) = sc.before.iter().position(|&b| b == *g) {
                *g = sc.after[pos];
            }
        }
    }

    /// Kerning adjustment between two glyphs in design units.
    ///
    /// GPOS data (pair plus class lookups) is authoritative; the classic
    /// `kern` table is consulted only when the font carries no GPOS kerning
    /// at all.
    pub fn kerning(&self, a: u16, b: u16) -> i32 {
        if !self.pair_kerning.is_empty() || self.class_kerning.is_some() {
            let key = (a as u32) << 16 | b as u32;
            let mut kern = match self
                .pair_kerning
                .binary_search_by_key(&key, |p| (p.first as u32) << 16 | p.second as u32)
            {
                Ok(i) => self.pair_kerning[i].value as i32,
                Err(_) => 0,
            };
            if let Some(classes) = &self.class_kerning {
                kern += classes.kerning(a, b);
            }
            kern
        } else if let Some(kern) = &self.kern_table {
            kern.kerning(&self.data, a, b)
        } else {
            0
        }
    }

    /// Scale a design-unit value to `target` units per em, with truncating
    /// integer division. `scale(x, units_per_em) == x`.
    pub fn scale(&self, value: i32, target: i32) -> i32 {
        value * target / self.units_per_em as i32
    }

    /// True when the outlines are PostScript (CFF) flavored.
    pub fn is_cff(&self) -> bool {
        self.cff.is_some()
    }

    /// The raw `CFF ` table, when present.
    pub fn cff(&self) -> Option<&[u8]> {
        self.cff.clone().map(|r| &self.data[r])
    }

    /// The complete SFNT file as read.
    pub fn sfnt(&self) -> &[u8] {
        &self.data
    }
}

fn required<'a>(
    data: &'a [u8],
    tables: &HashMap<[u8; 4], Range<usize>>,
    tag: &[u8; 4],
    name: &'static str,
) -> Result<&'a [u8], FontError> {
    tables
        .get(tag)
        .map(|r| &data[r.clone()])
        .ok_or(FontError::MissingRequiredTable(name))
}

/// Find a `name` table entry, accepting Unicode (platform 0, language 0)
/// or Windows UCS-2 English (platform 3, encoding 1, language 0x0409)
/// records, and decode it from UTF-16BE. Missing entries are empty, not
/// errors.
fn lookup_name(name: &[u8], name_id: u16) -> Result<String, FontError> {
    if name.len() < 6 {
        return Err(FontError::TruncatedTable("name"));
    }
    let format = read_u16(name, 0, "name")?;
    if format != 0 && format != 1 {
        return Err(FontError::UnsupportedFormat {
            what: "name table format",
            value: format as u32,
        });
    }
    let count = read_u16(name, 2, "name")? as usize;
    let string_offset = read_u16(name, 4, "name")? as usize;
    if 6 + count * 12 > name.len() {
        return Err(FontError::TruncatedTable("name"));
    }

    for i in 0..count {
        let x = 6 + i * 12;
        let platform = read_u16(name, x, "name")?;
        let encoding = read_u16(name, x + 2, "name")?;
        let language = read_u16(name, x + 4, "name")?;
        let id = read_u16(name, x + 6, "name")?;
        if id != name_id {
            continue;
        }
        let unicode = platform == 0 && language == 0;
        let windows = platform == 3 && encoding == 1 && language == 0x0409;
        if !unicode && !windows {
            continue;
        }
        let length = read_u16(name, x + 8, "name")? as usize;
        let offset = read_u16(name, x + 10, "name")? as usize + string_offset;
        if offset + length > name.len() || length % 2 != 0 {
            return Err(FontError::InvalidStructure(
                "invalid name entry offset or length".into(),
            ));
        }
        let units: Vec<u16> = (0..length / 2)
            .map(|j| read_u16(name, offset + 2 * j, "name"))
            .collect::<Result<_, _>>()?;
        return Ok(String::from_utf16_lossy(&units));
    }
    Ok(String::new())
}
