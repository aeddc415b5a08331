//! Glyph positioning (`GPOS`): horizontal kerning from the `kern` feature,
//! lookup type 2 (pair adjustment), subtable formats 1 (per-pair) and 2
//! (class-based). Only X-advance adjustments (value format 4/0) are
//! supported.

use crate::error::FontError;
use crate::fonts::otl;
use crate::fonts::reader::{read_i16, read_u16};

const TABLE: &str = "GPOS";

/// A single pair-kerning record in design units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernPair {
    pub first: u16,
    pub second: u16,
    pub value: i16,
}

/// Class-based kerning: per-glyph class arrays sized to the glyph count and
/// the 2-D adjustment matrix.
#[derive(Debug, Clone)]
pub struct ClassKern {
    class_a: Vec<u16>,
    class_b: Vec<u16>,
    table: Vec<i16>,
    count_a: usize,
    count_b: usize,
}

impl ClassKern {
    /// Adjustment for the pair `(a, b)`; 0 when either glyph is outside the
    /// class arrays.
    pub fn kerning(&self, a: u16, b: u16) -> i32 {
        let (a, b) = (a as usize, b as usize);
        if a >= self.class_a.len() || b >= self.class_b.len() {
            return 0;
        }
        debug_assert_eq!(self.table.len(), self.count_a * self.count_b);
        self.table[self.class_a[a] as usize + self.class_b[b] as usize * self.count_a] as i32
    }
}

/// Parsed `kern` feature data.
#[derive(Debug, Default)]
pub(crate) struct GposKerning {
    /// Sorted by `(first << 16) | second`.
    pub pairs: Vec<KernPair>,
    pub classes: Option<ClassKern>,
}

/// Parse the `kern` feature of the default script. An absent script or
/// feature yields empty kerning.
pub(crate) fn parse_kerning(gpos: &[u8], num_glyphs: u16) -> Result<GposKerning, FontError> {
    let lists = otl::parse_header(gpos, TABLE)?;
    let feature_ids = match otl::default_feature_indices(gpos, lists.script, TABLE)? {
        Some(ids) => ids,
        None => return Ok(GposKerning::default()),
    };
    let lookups =
        match otl::feature_lookup_indices(gpos, lists.feature, &feature_ids, b"kern", TABLE)? {
            Some(lookups) => lookups,
            None => return Ok(GposKerning::default()),
        };

    let mut kerning = GposKerning::default();
    for index in lookups {
        let lookup = otl::parse_lookup(gpos, lists.lookup, index, TABLE)?;
        if lookup.kind != 2 {
            return Err(FontError::UnsupportedFormat {
                what: "GPOS kern lookup type",
                value: lookup.kind as u32,
            });
        }
        for subtable in lookup.subtables {
            let format = read_u16(gpos, subtable, TABLE)?;
            match format {
                1 => parse_pairs(gpos, subtable, &mut kerning.pairs)?,
                2 => kerning.classes = Some(parse_class_kerning(gpos, subtable, num_glyphs)?),
                _ => {
                    return Err(FontError::UnsupportedFormat {
                        what: "GPOS pair subtable format",
                        value: format as u32,
                    })
                }
            }
        }
    }
    kerning
        .pairs
        .sort_by_key(|p| (p.first as u32) << 16 | p.second as u32);
    Ok(kerning)
}

fn parse_pairs(gpos: &[u8], subtable: usize, pairs: &mut Vec<KernPair>) -> Result<(), FontError> {
    let coverage_offset = subtable + read_u16(gpos, subtable + 2, TABLE)? as usize;
    let value_format1 = read_u16(gpos, subtable + 4, TABLE)?;
    let value_format2 = read_u16(gpos, subtable + 6, TABLE)?;
    let pair_set_count = read_u16(gpos, subtable + 8, TABLE)? as usize;
    if value_format1 != 4 || value_format2 != 0 {
        return Err(FontError::UnsupportedFormat {
            what: "GPOS pair value format",
            value: (value_format1 as u32) << 16 | value_format2 as u32,
        });
    }

    let coverage_format = read_u16(gpos, coverage_offset, TABLE)?;
    if coverage_format != 1 {
        return Err(FontError::UnsupportedFormat {
            what: "GPOS coverage format",
            value: coverage_format as u32,
        });
    }
    let coverage_count = read_u16(gpos, coverage_offset + 2, TABLE)? as usize;
    if coverage_count != pair_set_count {
        return Err(FontError::InvalidStructure(
            "GPOS coverage length does not match pair set count".into(),
        ));
    }
    if coverage_offset + 4 + 2 * coverage_count > gpos.len() {
        return Err(FontError::TruncatedTable(TABLE));
    }
    if subtable + 10 + pair_set_count * 2 > gpos.len() {
        return Err(FontError::TruncatedTable(TABLE));
    }

    for k in 0..pair_set_count {
        let first = read_u16(gpos, coverage_offset + 4 + 2 * k, TABLE)?;
        let set = subtable + read_u16(gpos, subtable + 10 + k * 2, TABLE)? as usize;
        let pair_count = read_u16(gpos, set, TABLE)? as usize;
        if set + 2 + 4 * pair_count > gpos.len() {
            return Err(FontError::TruncatedTable(TABLE));
        }
        for l in 0..pair_count {
            let second = read_u16(gpos, set + 2 + 4 * l, TABLE)?;
            let value = read_i16(gpos, set + 2 + 4 * l + 2, TABLE)?;
            pairs.push(KernPair {
                first,
                second,
                value,
            });
        }
    }
    Ok(())
}

fn parse_class_kerning(
    gpos: &[u8],
    subtable: usize,
    num_glyphs: u16,
) -> Result<ClassKern, FontError> {
    let value_format1 = read_u16(gpos, subtable + 4, TABLE)?;
    let value_format2 = read_u16(gpos, subtable + 6, TABLE)?;
    if value_format1 != 4 || value_format2 != 0 {
        return Err(FontError::UnsupportedFormat {
            what: "GPOS pair value format",
            value: (value_format1 as u32) << 16 | value_format2 as u32,
        });
    }
    let class_offset1 = subtable + read_u16(gpos, subtable + 8, TABLE)? as usize;
    let class_offset2 = subtable + read_u16(gpos, subtable + 10, TABLE)? as usize;
    let count_a = read_u16(gpos, subtable + 12, TABLE)? as usize;
    let count_b = read_u16(gpos, subtable + 14, TABLE)? as usize;

    let class_a = parse_class_def(gpos, class_offset1, count_a, num_glyphs)?;
    let class_b = parse_class_def(gpos, class_offset2, count_b, num_glyphs)?;

    if subtable + 16 + count_a * count_b * 2 > gpos.len() {
        return Err(FontError::TruncatedTable(TABLE));
    }
    let mut table = Vec::with_capacity(count_a * count_b);
    for k in 0..count_a * count_b {
        table.push(read_i16(gpos, subtable + 16 + k * 2, TABLE)?);
    }
    Ok(ClassKern {
        class_a,
        class_b,
        table,
        count_a,
        count_b,
    })
}

/// Expand a format 2 class definition into a per-glyph class array.
fn parse_class_def(
    gpos: &[u8],
    offset: usize,
    class_count: usize,
    num_glyphs: u16,
) -> Result<Vec<u16>, FontError> {
    let format = read_u16(gpos, offset, TABLE)?;
    if format != 2 {
        return Err(FontError::UnsupportedFormat {
            what: "class definition format",
            value: format as u32,
        });
    }
    let range_count = read_u16(gpos, offset + 2, TABLE)? as usize;
    if offset + 4 + range_count * 6 > gpos.len() {
        return Err(FontError::TruncatedTable(TABLE));
    }
    let mut classes = vec![0u16; num_glyphs as usize];
    for k in 0..range_count {
        let start = read_u16(gpos, offset + 4 + k * 6, TABLE)?;
        let end = read_u16(gpos, offset + 4 + k * 6 + 2, TABLE)?;
        let class = read_u16(gpos, offset + 4 + k * 6 + 4, TABLE)?;
        if end as usize >= classes.len() || start > end {
            return Err(FontError::InvalidStructure(format!(
                "invalid glyph range {start}..{end} in class definition"
            )));
        }
        if class as usize >= class_count {
            return Err(FontError::InvalidStructure(format!(
                "class {class} outside the declared {class_count} classes"
            )));
        }
        for g in start..=end {
            classes[g as usize] = class;
        }
    }
    Ok(classes)
}
