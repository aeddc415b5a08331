//! A synthetic fixture font assembled byte-by-byte for tests.
//!
//! Glyph repertoire: 0 = .notdef, 1 = space, 2..27 = 'A'..'Z',
//! 28..53 = 'a'..'z'. Units per em 1000; advances 500/250/600 for glyphs
//! 0/1/2, every later glyph shares the last explicit advance of 550.

use crate::fonts::Font;

/// Assemble an SFNT container from finished table payloads.
pub fn build_sfnt(tables: &[([u8; 4], Vec<u8>)]) -> Vec<u8> {
    let mut font = Vec::new();
    font.extend(&0x0001_0000u32.to_be_bytes());
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
    head.extend(&1000u16.to_be_bytes()); // unitsPerEm
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

/// cmap with ' ' -> 1, 'A'..'Z' -> 2..27, 'a'..'z' -> 28..53.
pub fn cmap_table() -> Vec<u8> {
    let segments: [(u16, u16, u16); 4] = [
        (0x20, 0x20, 1u16.wrapping_sub(0x20)),
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

pub fn post_table(int_part: i16, frac: u16) -> Vec<u8> {
    let mut post = vec![0u8; 16];
    post[4..6].copy_from_slice(&int_part.to_be_bytes());
    post[6..8].copy_from_slice(&frac.to_be_bytes());
    post
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
        (*b"maxp", maxp_table(64)),
        (*b"OS/2", os2_table()),
        (*b"post", post_table(0, 0)),
    ]
}

/// The plain fixture font: no GSUB, no GPOS, no kern.
pub fn sample_font() -> Font {
    Font::parse(build_sfnt(&base_tables())).unwrap()
}
