//! A synthetic fixture font for the integration tests, assembled
//! byte-by-byte.
//!
//! Glyph repertoire: 0 = .notdef, 1 = space, 2..27 = 'A'..'Z',
//! 28..53 = 'a'..'z', 54 = '-'. Units per em 1000. Advances: 500, 250 and
//! 600 for glyphs 0..2; every later glyph shares the final explicit
//! advance of 550.

#![allow(dead_code)]

use galley::Font;

pub const UNITS_PER_EM: u16 = 1000;
pub const NUM_GLYPHS: u16 = 64;

/// Glyph index the fixture cmap assigns to a character, 0 when unmapped.
pub fn glyph(c: char) -> u16 {
    match c {
        ' ' => 1,
        'A'..='Z' => 2 + (c as u16 - 'A' as u16),
        'a'..='z' => 28 + (c as u16 - 'a' as u16),
        '-' => 54,
        _ => 0,
    }
}

/// Advance width of a glyph in design units.
pub fn advance(g: u16) -> u16 {
    match g {
        0 => 500,
        1 => 250,
        2 => 600,
        _ => 550,
    }
}

pub fn build_sfnt(tables: &[([u8; 4], Vec<u8>)]) -> Vec<u8> {
    build_sfnt_with_magic(0x0001_0000, tables)
}

pub fn build_sfnt_with_magic(magic: u32, tables: &[([u8; 4], Vec<u8>)]) -> Vec<u8> {
    let mut font = Vec::new();
    font.extend(&magic.to_be_bytes());
    font.extend(&(tables.len() as u16).to_be_bytes());
    font.extend(&[0u8; 6]); // searchRange, entrySelector, rangeShift

    let mut offset = 12 + 16 * tables.len();
    for (tag, payload) in tables {
        font.extend(tag);
        font.extend(&[0u8; 4]); // checksum
        font.extend(&(offset as u32).to_be_bytes());
        font.extend(&(payload.len() as u32).to_be_bytes());
        offset += payload.len();
    }
    for (_, payload) in tables {
        font.extend(payload);
    }
    font
}

pub fn head_table() -> Vec<u8> {
    let mut head = Vec::new();
    head.extend(&0x0001_0000u32.to_be_bytes()); // version
    head.extend(&[0u8; 8]); // fontRevision, checkSumAdjustment
    head.extend(&0x5F0F_3CF5u32.to_be_bytes()); // magicNumber
    head.extend(&0u16.to_be_bytes()); // flags
    head.extend(&UNITS_PER_EM.to_be_bytes());
    head.extend(&[0u8; 16]); // created, modified
    head.extend(&(-100i16).to_be_bytes()); // xMin
    head.extend(&(-200i16).to_be_bytes()); // yMin
    head.extend(&1100i16.to_be_bytes()); // xMax
    head.extend(&900i16.to_be_bytes()); // yMax
    head.extend(&[0u8; 6]); // macStyle, lowestRecPPEM, fontDirectionHint
    head.extend(&0i16.to_be_bytes()); // indexToLocFormat
    head.extend(&0i16.to_be_bytes()); // glyphDataFormat
    head
}

pub fn name_table() -> Vec<u8> {
    let full: Vec<u8> = "Test Family"
        .encode_utf16()
        .flat_map(|u| u.to_be_bytes())
        .collect();
    let ps: Vec<u8> = "TestFamily-Regular"
        .encode_utf16()
        .flat_map(|u| u.to_be_bytes())
        .collect();

    let mut name = Vec::new();
    name.extend(&0u16.to_be_bytes()); // format
    name.extend(&2u16.to_be_bytes()); // count
    name.extend(&(6 + 2 * 12u16).to_be_bytes()); // string heap offset
    for (id, payload, offset) in [(4u16, &full, 0u16), (6, &ps, full.len() as u16)] {
        name.extend(&0u16.to_be_bytes()); // platform 0 (Unicode)
        name.extend(&3u16.to_be_bytes()); // encoding
        name.extend(&0u16.to_be_bytes()); // language
        name.extend(&id.to_be_bytes());
        name.extend(&(payload.len() as u16).to_be_bytes());
        name.extend(&offset.to_be_bytes());
    }
    name.extend(&full);
    name.extend(&ps);
    name
}

pub fn cmap_table() -> Vec<u8> {
    let segments: [(u16, u16, u16); 5] = [
        (0x20, 0x20, 1u16.wrapping_sub(0x20)),
        (0x2D, 0x2D, 54u16.wrapping_sub(0x2D)),
        (0x41, 0x5A, 2u16.wrapping_sub(0x41)),
        (0x61, 0x7A, 28u16.wrapping_sub(0x61)),
        (0xFFFF, 0xFFFF, 1),
    ];
    let mut cmap = Vec::new();
    cmap.extend(&0u16.to_be_bytes());
    cmap.extend(&1u16.to_be_bytes());
    cmap.extend(&0u16.to_be_bytes()); // platform 0
    cmap.extend(&3u16.to_be_bytes()); // encoding 3
    cmap.extend(&12u32.to_be_bytes());

    cmap.extend(&4u16.to_be_bytes()); // format
    cmap.extend(&((16 + 8 * segments.len()) as u16).to_be_bytes());
    cmap.extend(&0u16.to_be_bytes()); // language
    cmap.extend(&((segments.len() * 2) as u16).to_be_bytes());
    cmap.extend(&[0u8; 6]);
    for &(_, end, _) in &segments {
        cmap.extend(&end.to_be_bytes());
    }
    cmap.extend(&0u16.to_be_bytes());
    for &(start, _, _) in &segments {
        cmap.extend(&start.to_be_bytes());
    }
    for &(_, _, delta) in &segments {
        cmap.extend(&delta.to_be_bytes());
    }
    for _ in &segments {
        cmap.extend(&0u16.to_be_bytes());
    }
    cmap
}

pub fn hhea_table(n_hmetric: u16) -> Vec<u8> {
    let mut hhea = vec![0u8; 34];
    hhea.extend(&n_hmetric.to_be_bytes());
    hhea
}

pub fn hmtx_table(metrics: &[(u16, i16)]) -> Vec<u8> {
    let mut hmtx = Vec::new();
    for &(advance, left) in metrics {
        hmtx.extend(&advance.to_be_bytes());
        hmtx.extend(&left.to_be_bytes());
    }
    hmtx
}

pub fn maxp_table(num_glyphs: u16) -> Vec<u8> {
    let mut maxp = Vec::new();
    maxp.extend(&0x0001_0000u32.to_be_bytes());
    maxp.extend(&num_glyphs.to_be_bytes());
    maxp
}

pub fn os2_table() -> Vec<u8> {
    let mut os2 = vec![0u8; 90];
    os2[0..2].copy_from_slice(&2u16.to_be_bytes()); // version
    os2[68..70].copy_from_slice(&800i16.to_be_bytes()); // ascender
    os2[70..72].copy_from_slice(&(-200i16).to_be_bytes()); // descender
    os2[88..90].copy_from_slice(&700i16.to_be_bytes()); // cap height
    os2
}

pub fn post_table() -> Vec<u8> {
    vec![0u8; 16]
}

/// A classic `kern` table with pre-sorted `(left, right, value)` pairs.
pub fn kern_table(pairs: &[(u16, u16, i16)]) -> Vec<u8> {
    let mut kern = Vec::new();
    kern.extend(&0u16.to_be_bytes()); // version
    kern.extend(&1u16.to_be_bytes()); // one subtable
    kern.extend(&0u16.to_be_bytes()); // subtable version
    kern.extend(&((14 + 6 * pairs.len()) as u16).to_be_bytes());
    kern.extend(&0x0001u16.to_be_bytes()); // horizontal coverage
    kern.extend(&(pairs.len() as u16).to_be_bytes());
    kern.extend(&[0u8; 6]); // searchRange, entrySelector, rangeShift
    for &(left, right, value) in pairs {
        kern.extend(&left.to_be_bytes());
        kern.extend(&right.to_be_bytes());
        kern.extend(&value.to_be_bytes());
    }
    kern
}

/// Shared ScriptList/FeatureList/LookupList skeleton around one subtable.
fn layout_table(feature_tag: &[u8; 4], lookup_type: u16, subtable: &[u8]) -> Vec<u8> {
    let mut t = Vec::new();
    t.extend(&0x0001_0000u32.to_be_bytes()); // version
    t.extend(&10u16.to_be_bytes()); // ScriptList offset
    t.extend(&30u16.to_be_bytes()); // FeatureList offset
    t.extend(&44u16.to_be_bytes()); // LookupList offset

    // ScriptList: one "DFLT" script, default LangSys, feature 0.
    t.extend(&1u16.to_be_bytes());
    t.extend(b"DFLT");
    t.extend(&8u16.to_be_bytes());
    t.extend(&4u16.to_be_bytes());
    t.extend(&0u16.to_be_bytes());
    t.extend(&0u16.to_be_bytes());
    t.extend(&0xFFFFu16.to_be_bytes());
    t.extend(&1u16.to_be_bytes());
    t.extend(&0u16.to_be_bytes());

    // FeatureList: one feature referencing lookup 0.
    t.extend(&1u16.to_be_bytes());
    t.extend(feature_tag);
    t.extend(&8u16.to_be_bytes());
    t.extend(&0u16.to_be_bytes());
    t.extend(&1u16.to_be_bytes());
    t.extend(&0u16.to_be_bytes());

    // LookupList: one lookup with one subtable.
    t.extend(&1u16.to_be_bytes());
    t.extend(&4u16.to_be_bytes());
    t.extend(&lookup_type.to_be_bytes());
    t.extend(&0u16.to_be_bytes());
    t.extend(&1u16.to_be_bytes());
    t.extend(&8u16.to_be_bytes());

    t.extend(subtable);
    t
}

fn coverage_format1(glyphs: &[u16]) -> Vec<u8> {
    let mut c = Vec::new();
    c.extend(&1u16.to_be_bytes());
    c.extend(&(glyphs.len() as u16).to_be_bytes());
    for &g in glyphs {
        c.extend(&g.to_be_bytes());
    }
    c
}

/// A GSUB with a `liga` feature. Rules must share distinct first components
/// given in ascending order; each rule is the full component sequence and
/// the replacement glyph.
pub fn gsub_liga_table(rules: &[(&[u16], u16)]) -> Vec<u8> {
    let mut firsts: Vec<u16> = rules.iter().map(|(c, _)| c[0]).collect();
    firsts.sort_unstable();
    firsts.dedup();

    let g = firsts.len();
    let mut sub = Vec::new();
    sub.extend(&1u16.to_be_bytes()); // format
    sub.extend(&((6 + 2 * g) as u16).to_be_bytes()); // coverage offset
    sub.extend(&(g as u16).to_be_bytes());
    let set_offsets_at = sub.len();
    sub.extend(std::iter::repeat(0u8).take(2 * g));
    sub.extend(&coverage_format1(&firsts));

    for (k, &first) in firsts.iter().enumerate() {
        let set_offset = sub.len() as u16;
        sub[set_offsets_at + 2 * k..set_offsets_at + 2 * k + 2]
            .copy_from_slice(&set_offset.to_be_bytes());

        let group: Vec<&(&[u16], u16)> = rules.iter().filter(|(c, _)| c[0] == first).collect();
        let set_start = sub.len();
        sub.extend(&(group.len() as u16).to_be_bytes());
        let liga_offsets_at = sub.len();
        sub.extend(std::iter::repeat(0u8).take(2 * group.len()));
        for (l, (components, glyph)) in group.iter().enumerate() {
            let liga_offset = (sub.len() - set_start) as u16;
            sub[liga_offsets_at + 2 * l..liga_offsets_at + 2 * l + 2]
                .copy_from_slice(&liga_offset.to_be_bytes());
            sub.extend(&glyph.to_be_bytes());
            sub.extend(&(components.len() as u16).to_be_bytes());
            for &c in &components[1..] {
                sub.extend(&c.to_be_bytes());
            }
        }
    }
    layout_table(b"liga", 4, &sub)
}

/// A GSUB with an `smcp` feature substituting each `(before, after)` pair,
/// given in ascending `before` order.
pub fn gsub_smcp_table(pairs: &[(u16, u16)]) -> Vec<u8> {
    let n = pairs.len();
    let mut sub = Vec::new();
    sub.extend(&2u16.to_be_bytes()); // format
    sub.extend(&((6 + 2 * n) as u16).to_be_bytes()); // coverage offset
    sub.extend(&(n as u16).to_be_bytes());
    for &(_, after) in pairs {
        sub.extend(&after.to_be_bytes());
    }
    let before: Vec<u16> = pairs.iter().map(|&(b, _)| b).collect();
    sub.extend(&coverage_format1(&before));
    layout_table(b"smcp", 1, &sub)
}

/// A GPOS with a `kern` feature as per-pair records, sorted by
/// `(first, second)`.
pub fn gpos_kern_table(pairs: &[(u16, u16, i16)]) -> Vec<u8> {
    let mut firsts: Vec<u16> = pairs.iter().map(|&(f, _, _)| f).collect();
    firsts.sort_unstable();
    firsts.dedup();

    let g = firsts.len();
    let mut sub = Vec::new();
    sub.extend(&1u16.to_be_bytes()); // format
    sub.extend(&((10 + 2 * g) as u16).to_be_bytes()); // coverage offset
    sub.extend(&4u16.to_be_bytes()); // valueFormat1 = XAdvance
    sub.extend(&0u16.to_be_bytes()); // valueFormat2
    sub.extend(&(g as u16).to_be_bytes());
    let set_offsets_at = sub.len();
    sub.extend(std::iter::repeat(0u8).take(2 * g));
    sub.extend(&coverage_format1(&firsts));

    for (k, &first) in firsts.iter().enumerate() {
        let set_offset = sub.len() as u16;
        sub[set_offsets_at + 2 * k..set_offsets_at + 2 * k + 2]
            .copy_from_slice(&set_offset.to_be_bytes());
        let group: Vec<&(u16, u16, i16)> = pairs.iter().filter(|(f, _, _)| *f == first).collect();
        sub.extend(&(group.len() as u16).to_be_bytes());
        for (_, second, value) in group {
            sub.extend(&second.to_be_bytes());
            sub.extend(&value.to_be_bytes());
        }
    }
    layout_table(b"kern", 2, &sub)
}

pub fn base_tables() -> Vec<([u8; 4], Vec<u8>)> {
    vec![
        (*b"head", head_table()),
        (*b"name", name_table()),
        (*b"cmap", cmap_table()),
        (*b"hhea", hhea_table(4)),
        (
            *b"hmtx",
            hmtx_table(&[(500, 0), (250, 0), (600, 10), (550, 5)]),
        ),
        (*b"maxp", maxp_table(NUM_GLYPHS)),
        (*b"OS/2", os2_table()),
        (*b"post", post_table()),
    ]
}

/// The plain fixture font.
pub fn fixture_font() -> Font {
    Font::parse(build_sfnt(&base_tables())).expect("fixture font must parse")
}

/// The fixture font with extra tables appended.
pub fn fixture_font_with(extra: Vec<([u8; 4], Vec<u8>)>) -> Font {
    let mut tables = base_tables();
    tables.extend(extra);
    Font::parse(build_sfnt(&tables)).expect("fixture font must parse")
}
