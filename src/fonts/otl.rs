//! Common OpenType layout plumbing shared by the `GSUB` and `GPOS` parsers:
//! the ScriptList → LangSys → FeatureList → LookupList walk and the two
//! coverage formats.
//!
//! A missing script, language system, or feature simply means the caller's
//! feature is absent from the font and is reported as `None`; only a
//! structurally broken table is an error.

use crate::error::FontError;
use crate::fonts::reader::{read_tag, read_u16};

/// Offsets of the three top-level lists of a GSUB/GPOS table, relative to the
/// table start.
#[derive(Debug, Clone, Copy)]
pub(crate) struct LayoutLists {
    pub script: usize,
    pub feature: usize,
    pub lookup: usize,
}

/// Read the GSUB/GPOS header.
pub(crate) fn parse_header(data: &[u8], table: &'static str) -> Result<LayoutLists, FontError> {
    if data.len() < 10 {
        return Err(FontError::TruncatedTable(table));
    }
    Ok(LayoutLists {
        script: read_u16(data, 4, table)? as usize,
        feature: read_u16(data, 6, table)? as usize,
        lookup: read_u16(data, 8, table)? as usize,
    })
}

/// Walk the ScriptList and the default ("DFLT"/"dflt") language system,
/// returning the feature indices it references. `None` when the font has no
/// usable default script.
pub(crate) fn default_feature_indices(
    data: &[u8],
    script_list: usize,
    table: &'static str,
) -> Result<Option<Vec<usize>>, FontError> {
    let script_count = read_u16(data, script_list, table)? as usize;
    if script_list + 2 + script_count * 6 > data.len() {
        return Err(FontError::TruncatedTable(table));
    }
    let mut script_offset = 0usize;
    for i in 0..script_count {
        let x = script_list + 2 + i * 6;
        if read_tag(data, x, table)? == *b"DFLT" {
            script_offset = read_u16(data, x + 4, table)? as usize;
        }
    }
    if script_offset == 0 {
        return Ok(None);
    }
    let script_offset = script_list + script_offset;

    // Script table: default LangSys offset, then tagged LangSys records;
    // an explicit "dflt" record overrides the default slot.
    let mut lang_sys = read_u16(data, script_offset, table)? as usize;
    let lang_count = read_u16(data, script_offset + 2, table)? as usize;
    if script_offset + 4 + 6 * lang_count > data.len() {
        return Err(FontError::TruncatedTable(table));
    }
    for i in 0..lang_count {
        let x = script_offset + 4 + 6 * i;
        if read_tag(data, x, table)? == *b"dflt" {
            lang_sys = read_u16(data, x + 4, table)? as usize;
        }
    }
    if lang_sys == 0 {
        return Ok(None);
    }
    let lang_sys = script_offset + lang_sys;

    let mut feature_ids = Vec::new();
    let required = read_u16(data, lang_sys + 2, table)?;
    if required != 0xFFFF {
        feature_ids.push(required as usize);
    }
    let feature_count = read_u16(data, lang_sys + 4, table)? as usize;
    if lang_sys + 6 + feature_count * 2 > data.len() {
        return Err(FontError::TruncatedTable(table));
    }
    for i in 0..feature_count {
        feature_ids.push(read_u16(data, lang_sys + 6 + i * 2, table)? as usize);
    }
    Ok(Some(feature_ids))
}

/// Resolve the lookup indices of the feature tagged `tag` among
/// `feature_ids`. `None` when the tag is not present.
pub(crate) fn feature_lookup_indices(
    data: &[u8],
    feature_list: usize,
    feature_ids: &[usize],
    tag: &[u8; 4],
    table: &'static str,
) -> Result<Option<Vec<usize>>, FontError> {
    let feature_count = read_u16(data, feature_list, table)? as usize;
    if feature_list + 2 + feature_count * 6 > data.len() {
        return Err(FontError::TruncatedTable(table));
    }
    let mut feature_offset = None;
    for &id in feature_ids {
        if id >= feature_count {
            return Err(FontError::InvalidStructure(format!(
                "feature index {id} out of range ({feature_count} features)"
            )));
        }
        let x = feature_list + 2 + id * 6;
        if read_tag(data, x, table)? == *tag {
            feature_offset = Some(read_u16(data, x + 4, table)? as usize);
        }
    }
    let feature_offset = match feature_offset {
        Some(off) => feature_list + off,
        None => return Ok(None),
    };

    let lookup_count = read_u16(data, feature_offset + 2, table)? as usize;
    if feature_offset + 4 + 2 * lookup_count > data.len() {
        return Err(FontError::TruncatedTable(table));
    }
    let mut lookups = Vec::with_capacity(lookup_count);
    for i in 0..lookup_count {
        lookups.push(read_u16(data, feature_offset + 4 + 2 * i, table)? as usize);
    }
    Ok(Some(lookups))
}

/// A lookup table: its type plus the absolute offsets of its subtables
/// within the GSUB/GPOS data.
#[derive(Debug)]
pub(crate) struct Lookup {
    pub kind: u16,
    pub subtables: Vec<usize>,
}

/// Read lookup `index` out of the LookupList.
pub(crate) fn parse_lookup(
    data: &[u8],
    lookup_list: usize,
    index: usize,
    table: &'static str,
) -> Result<Lookup, FontError> {
    let lookup_count = read_u16(data, lookup_list, table)? as usize;
    if index >= lookup_count {
        return Err(FontError::InvalidStructure(format!(
            "lookup index {index} out of range ({lookup_count} lookups)"
        )));
    }
    let offset = lookup_list + read_u16(data, lookup_list + 2 + index * 2, table)? as usize;
    let kind = read_u16(data, offset, table)?;
    let subtable_count = read_u16(data, offset + 4, table)? as usize;
    if offset + 6 + subtable_count * 2 > data.len() {
        return Err(FontError::TruncatedTable(table));
    }
    let mut subtables = Vec::with_capacity(subtable_count);
    for j in 0..subtable_count {
        subtables.push(offset + read_u16(data, offset + 6 + j * 2, table)? as usize);
    }
    Ok(Lookup { kind, subtables })
}

/// Expand a coverage table into the explicit glyph list. Format 1 lists the
/// glyphs; format 2 stores inclusive ranges.
pub(crate) fn parse_coverage(
    data: &[u8],
    offset: usize,
    table: &'static str,
) -> Result<Vec<u16>, FontError> {
    let format = read_u16(data, offset, table)?;
    let count = read_u16(data, offset + 2, table)? as usize;
    match format {
        1 => {
            if offset + 4 + count * 2 > data.len() {
                return Err(FontError::TruncatedTable(table));
            }
            let mut glyphs = Vec::with_capacity(count);
            for i in 0..count {
                glyphs.push(read_u16(data, offset + 4 + 2 * i, table)?);
            }
            Ok(glyphs)
        }
        2 => {
            if offset + 4 + count * 6 > data.len() {
                return Err(FontError::TruncatedTable(table));
            }
            let mut glyphs = Vec::new();
            for i in 0..count {
                let first = read_u16(data, offset + 4 + 6 * i, table)?;
                let last = read_u16(data, offset + 4 + 6 * i + 2, table)?;
                for g in first..=last {
                    glyphs.push(g);
                }
            }
            Ok(glyphs)
        }
        _ => Err(FontError::UnsupportedFormat {
            what: "coverage format",
            value: format as u32,
        }),
    }
}
