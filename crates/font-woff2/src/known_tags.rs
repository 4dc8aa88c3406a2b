use fontverter_sfnt::Tag;

/// Flag value meaning an explicit 4-byte tag follows the flags byte.
pub const ARBITRARY_TAG_INDEX: u8 = 63;

/// Tags a WOFF2 directory entry can name by index, in index order.
pub const KNOWN_TAGS: [Tag; 63] = [
    Tag::new(b"cmap"),
    Tag::new(b"head"),
    Tag::new(b"hhea"),
    Tag::new(b"hmtx"),
    Tag::new(b"maxp"),
    Tag::new(b"name"),
    Tag::new(b"OS/2"),
    Tag::new(b"post"),
    Tag::new(b"cvt "),
    Tag::new(b"fpgm"),
    Tag::new(b"glyf"),
    Tag::new(b"loca"),
    Tag::new(b"prep"),
    Tag::new(b"CFF "),
    Tag::new(b"VORG"),
    Tag::new(b"EBDT"),
    Tag::new(b"EBLC"),
    Tag::new(b"gasp"),
    Tag::new(b"hdmx"),
    Tag::new(b"kern"),
    Tag::new(b"LTSH"),
    Tag::new(b"PCLT"),
    Tag::new(b"VDMX"),
    Tag::new(b"vhea"),
    Tag::new(b"vmtx"),
    Tag::new(b"BASE"),
    Tag::new(b"GDEF"),
    Tag::new(b"GPOS"),
    Tag::new(b"GSUB"),
    Tag::new(b"EBSC"),
    Tag::new(b"JSTF"),
    Tag::new(b"MATH"),
    Tag::new(b"CBDT"),
    Tag::new(b"CBLC"),
    Tag::new(b"COLR"),
    Tag::new(b"CPAL"),
    Tag::new(b"SVG "),
    Tag::new(b"sbix"),
    Tag::new(b"acnt"),
    Tag::new(b"avar"),
    Tag::new(b"bdat"),
    Tag::new(b"bloc"),
    Tag::new(b"bsln"),
    Tag::new(b"cvar"),
    Tag::new(b"fdsc"),
    Tag::new(b"feat"),
    Tag::new(b"fmtx"),
    Tag::new(b"fvar"),
    Tag::new(b"gvar"),
    Tag::new(b"hsty"),
    Tag::new(b"just"),
    Tag::new(b"lcar"),
    Tag::new(b"mort"),
    Tag::new(b"morx"),
    Tag::new(b"opbd"),
    Tag::new(b"prop"),
    Tag::new(b"trak"),
    Tag::new(b"Zapf"),
    Tag::new(b"Silf"),
    Tag::new(b"Glat"),
    Tag::new(b"Gloc"),
    Tag::new(b"Feat"),
    Tag::new(b"Sill"),
];

/// Directory index for `tag`, or [`ARBITRARY_TAG_INDEX`] if it has none.
pub fn tag_index(tag: Tag) -> u8 {
    KNOWN_TAGS.iter().position(|&known| known == tag).map_or(ARBITRARY_TAG_INDEX, |i| i as u8)
}
