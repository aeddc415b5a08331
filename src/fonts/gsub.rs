//! Glyph substitution (`GSUB`): ligatures (feature `liga`, lookup type 4)
//! and small capitals (feature `smcp`, lookup type 1).

use crate::error::FontError;
use crate::fonts::otl;
use crate::fonts::reader::read_u16;

const TABLE: &str = "GSUB";

/// A ligature rule: the full component sequence (first component included)
/// and the replacement glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct Ligature {
    pub components: Vec<u16>,
    pub glyph: u16,
}

/// Small-caps substitution as parallel `before`/`after` arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct SmallCaps {
    pub before: Vec<u16>,
    pub after: Vec<u16>,
}

/// Collect the ligature rules of the default script. Rule order within the
/// font is preserved; an absent script or `liga` feature yields no rules.
pub(crate) fn parse_ligatures(gsub: &[u8]) -> Result<Vec<Ligature>, FontError> {
    let lists = otl::parse_header(gsub, TABLE)?;
    let feature_ids = match otl::default_feature_indices(gsub, lists.script, TABLE)? {
        Some(ids) => ids,
        None => return Ok(Vec::new()),
    };
    let lookups =
        match otl::feature_lookup_indices(gsub, lists.feature, &feature_ids, b"liga", TABLE)? {
            Some(lookups) => lookups,
            None => return Ok(Vec::new()),
        };

    let mut rules = Vec::new();
    for index in lookups {
        let lookup = otl::parse_lookup(gsub, lists.lookup, index, TABLE)?;
        if lookup.kind != 4 {
            return Err(FontError::UnsupportedFormat {
                what: "GSUB ligature lookup type",
                value: lookup.kind as u32,
            });
        }
        for subtable in lookup.subtables {
            let format = read_u16(gsub, subtable, TABLE)?;
            if format != 1 {
                return Err(FontError::UnsupportedFormat {
                    what: "GSUB ligature subtable format",
                    value: format as u32,
                });
            }
            let coverage_offset = subtable + read_u16(gsub, subtable + 2, TABLE)? as usize;
            let set_count = read_u16(gsub, subtable + 4, TABLE)? as usize;
            let coverage = otl::parse_coverage(gsub, coverage_offset, TABLE)?;
            if coverage.len() != set_count {
                return Err(FontError::InvalidStructure(
                    "GSUB coverage length does not match ligature set count".into(),
                ));
            }
            if subtable + 6 + set_count * 2 > gsub.len() {
                return Err(FontError::TruncatedTable(TABLE));
            }
            for (k, &first) in coverage.iter().enumerate() {
                let set = subtable + read_u16(gsub, subtable + 6 + k * 2, TABLE)? as usize;
                let liga_count = read_u16(gsub, set, TABLE)? as usize;
                if set + 2 + 2 * liga_count > gsub.len() {
                    return Err(FontError::TruncatedTable(TABLE));
                }
                for l in 0..liga_count {
                    let liga = set + read_u16(gsub, set + 2 + 2 * l, TABLE)? as usize;
                    let glyph = read_u16(gsub, liga, TABLE)?;
                    let comp_count = read_u16(gsub, liga + 2, TABLE)? as usize;
                    if comp_count < 2 {
                        return Err(FontError::InvalidStructure(format!(
                            "ligature with {comp_count} components"
                        )));
                    }
                    if liga + 4 + (comp_count - 1) * 2 > gsub.len() {
                        return Err(FontError::TruncatedTable(TABLE));
                    }
                    let mut components = Vec::with_capacity(comp_count);
                    components.push(first);
                    for m in 1..comp_count {
                        components.push(read_u16(gsub, liga + 4 + (m - 1) * 2, TABLE)?);
                    }
                    rules.push(Ligature { components, glyph });
                }
            }
        }
    }
    Ok(rules)
}

/// Collect the small-caps substitution of the default script. `None` when the
/// font carries no `smcp` feature.
pub(crate) fn parse_small_caps(gsub: &[u8]) -> Result<Option<SmallCaps>, FontError> {
    let lists = otl::parse_header(gsub, TABLE)?;
    let feature_ids = match otl::default_feature_indices(gsub, lists.script, TABLE)? {
        Some(ids) => ids,
        None => return Ok(None),
    };
    let lookups =
        match otl::feature_lookup_indices(gsub, lists.feature, &feature_ids, b"smcp", TABLE)? {
            Some(lookups) => lookups,
            None => return Ok(None),
        };

    let mut before = Vec::new();
    let mut after = Vec::new();
    for index in lookups {
        let lookup = otl::parse_lookup(gsub, lists.lookup, index, TABLE)?;
        if lookup.kind != 1 {
            return Err(FontError::UnsupportedFormat {
                what: "GSUB small-caps lookup type",
                value: lookup.kind as u32,
            });
        }
        for subtable in lookup.subtables {
            let format = read_u16(gsub, subtable, TABLE)?;
            if format != 2 {
                return Err(FontError::UnsupportedFormat {
                    what: "GSUB small-caps subtable format",
                    value: format as u32,
                });
            }
            let coverage_offset = subtable + read_u16(gsub, subtable + 2, TABLE)? as usize;
            let count = read_u16(gsub, subtable + 4, TABLE)? as usize;
            let coverage = otl::parse_coverage(gsub, coverage_offset, TABLE)?;
            if coverage.len() != count {
                return Err(FontError::InvalidStructure(
                    "GSUB coverage length does not match substitute count".into(),
                ));
            }
            if subtable + 6 + count * 2 > gsub.len() {
                return Err(FontError::TruncatedTable(TABLE));
            }
            for (k, &glyph) in coverage.iter().enumerate() {
                before.push(glyph);
                after.push(read_u16(gsub, subtable + 6 + 2 * k, TABLE)?);
            }
        }
    }
    if before.is_empty() {
        return Ok(None);
    }

    // The source side must be duplicate-free for the substitution to be a
    // mapping.
    let mut seen = before.clone();
    seen.sort_unstable();
    if seen.windows(2).any(|w| w[0] == w[1]) {
        return Err(FontError::InvalidStructure(
            "duplicate glyph in small-caps coverage".into(),
        ));
    }

    Ok(Some(SmallCaps { before, after }))
}
