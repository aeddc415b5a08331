//! Character-to-glyph mapping (the `cmap` table).
//!
//! Only format 4 subtables are supported. The parser prefers a Unicode
//! subtable (platform 0, encoding 3) and falls back to the Microsoft
//! Symbol/UCS-2/UCS-4 encodings.

use std::ops::Range;

use crate::error::FontError;
use crate::fonts::reader::{read_u16, read_u32};

const UNICODE_ENCODING: u32 = 0x0000_0003; // PID = 0 (Unicode), PSID = 3 (Unicode 2.0)
const MICROSOFT_SYMBOL_ENCODING: u32 = 0x0003_0000; // PID = 3 (Microsoft), PSID = 0 (Symbol)
const MICROSOFT_UCS2_ENCODING: u32 = 0x0003_0001; // PID = 3 (Microsoft), PSID = 1 (UCS-2)
const MICROSOFT_UCS4_ENCODING: u32 = 0x0003_000A; // PID = 3 (Microsoft), PSID = 10 (UCS-4)

/// One parsed format 4 segment covering the inclusive range `[start, end]`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Segment {
    pub start: u32,
    pub end: u32,
    pub delta: u32,
    pub offset: u32,
}

/// Parsed character map: the segment array plus the raw `glyphIdArray` tail
/// that non-zero `offset` values index into. The tail is kept as a range into
/// the font's backing buffer rather than a copy.
#[derive(Debug, Clone)]
pub(crate) struct Cmap {
    pub segments: Vec<Segment>,
    pub glyph_ids: Range<usize>,
}

impl Cmap {
    /// Parse the `cmap` table located at `table` within `data`.
    pub fn parse(data: &[u8], table: Range<usize>) -> Result<Cmap, FontError> {
        let base = table.start;
        let cmap = data
            .get(table)
            .ok_or(FontError::TruncatedTable("cmap"))?;
        if cmap.len() < 4 {
            return Err(FontError::TruncatedTable("cmap"));
        }
        let nsubtab = read_u16(cmap, 2, "cmap")? as usize;
        if cmap.len() < 8 * nsubtab + 4 {
            return Err(FontError::TruncatedTable("cmap"));
        }

        // Select a subtable. A Unicode encoding wins immediately; Microsoft
        // encodings are remembered but can still be overridden by a later
        // Unicode entry.
        let mut subtable: Option<usize> = None;
        for i in 0..nsubtab {
            let x = 4 + 8 * i;
            let pid_psid = read_u32(cmap, x, "cmap")?;
            let offset = read_u32(cmap, x + 4, "cmap")? as usize;
            if pid_psid == UNICODE_ENCODING {
                subtable = Some(offset);
                break;
            } else if pid_psid == MICROSOFT_SYMBOL_ENCODING
                || pid_psid == MICROSOFT_UCS2_ENCODING
                || pid_psid == MICROSOFT_UCS4_ENCODING
            {
                subtable = Some(offset);
            }
        }
        let mut offset = subtable.ok_or(FontError::UnsupportedEncoding)?;
        if offset == 0 || offset >= cmap.len() {
            return Err(FontError::InvalidStructure(format!(
                "bad cmap subtable offset {offset}"
            )));
        }

        let format = read_u16(cmap, offset, "cmap")?;
        if format != 4 {
            return Err(FontError::UnsupportedFormat {
                what: "cmap format",
                value: format as u32,
            });
        }
        let language = read_u16(cmap, offset + 4, "cmap")?;
        if language != 0 {
            return Err(FontError::UnsupportedFormat {
                what: "cmap language",
                value: language as u32,
            });
        }
        let seg_count_x2 = read_u16(cmap, offset + 6, "cmap")? as usize;
        if seg_count_x2 % 2 == 1 {
            return Err(FontError::InvalidStructure(format!(
                "bad segCountX2: {seg_count_x2}"
            )));
        }
        let seg_count = seg_count_x2 / 2;
        offset += 14;

        // Four parallel arrays: endCode[], pad, startCode[], idDelta[],
        // idRangeOffset[].
        if offset + 4 * seg_count_x2 + 2 > cmap.len() {
            return Err(FontError::TruncatedTable("cmap"));
        }
        let mut segments = vec![
            Segment {
                start: 0,
                end: 0,
                delta: 0,
                offset: 0,
            };
            seg_count
        ];
        for seg in segments.iter_mut() {
            seg.end = read_u16(cmap, offset, "cmap")? as u32;
            offset += 2;
        }
        offset += 2; // reservedPad
        for seg in segments.iter_mut() {
            seg.start = read_u16(cmap, offset, "cmap")? as u32;
            offset += 2;
        }
        for seg in segments.iter_mut() {
            seg.delta = read_u16(cmap, offset, "cmap")? as u32;
            offset += 2;
        }
        for seg in segments.iter_mut() {
            seg.offset = read_u16(cmap, offset, "cmap")? as u32;
            offset += 2;
        }

        // Segments must be disjoint, ascending, and closed by the 0xFFFF
        // sentinel.
        for (i, seg) in segments.iter().enumerate() {
            if seg.start > seg.end {
                return Err(FontError::InvalidStructure(format!(
                    "cmap segment {i} starts after it ends"
                )));
            }
            if i > 0 && segments[i - 1].end >= seg.start {
                return Err(FontError::InvalidStructure(format!(
                    "cmap segments {} and {i} overlap",
                    i - 1
                )));
            }
        }
        match segments.last() {
            Some(last) if last.end == 0xFFFF => {}
            _ => {
                return Err(FontError::InvalidStructure(
                    "cmap is missing the 0xFFFF sentinel segment".into(),
                ))
            }
        }

        Ok(Cmap {
            segments,
            glyph_ids: base + offset..base + cmap.len(),
        })
    }

    /// Look up the glyph index for a code point. Unmapped code points, out of
    /// range `glyphIdArray` references, and indices at or beyond the glyph
    /// count all degrade to glyph 0 (.notdef); lookup never fails.
    pub fn glyph_index(&self, data: &[u8], c: char, num_glyphs: u16) -> u16 {
        let c = c as u32;
        let n = self.segments.len();
        let (mut i, mut j) = (0usize, n);
        while i < j {
            let h = i + (j - i) / 2;
            let seg = &self.segments[h];
            if c < seg.start {
                j = h;
            } else if seg.end < c {
                i = h + 1;
            } else if seg.offset == 0 {
                let glyph = (c.wrapping_add(seg.delta) & 0xFFFF) as u16;
                return if glyph < num_glyphs { glyph } else { 0 };
            } else {
                // idRangeOffset is relative to its own position inside the
                // idRangeOffset array, which ends where glyph_ids begins.
                let rel = seg.offset as i64 + 2 * (h as i64 - n as i64 + (c - seg.start) as i64);
                let ids = &data[self.glyph_ids.clone()];
                if rel < 0 || rel as usize + 2 > ids.len() {
                    return 0;
                }
                let at = rel as usize;
                let glyph = ((ids[at] as u16) << 8) | ids[at + 1] as u16;
                return if glyph < num_glyphs { glyph } else { 0 };
            }
        }
        0
    }
}
