use fontverter_font_woff2::{TableDirectoryEntry, Woff2Header, Woff2Options, decode, encode};
use fontverter_sfnt::{CancelToken, DecodedFont, Reader, SfntImage, Tag, WebFontExtras};
use fontverter_test_fonts::{METADATA, PRIVATE_DATA, TestFont, cff, truetype};
use read_fonts::{FontRef, TableProvider};

fn round_trip(source: &[u8], options: &Woff2Options) -> (Vec<u8>, Vec<u8>) {
    let image = SfntImage::from_bytes(source).unwrap();
    let woff2 = encode(&DecodedFont::new(image), options).unwrap();
    let decoded = decode(&woff2, options).unwrap();
    (woff2, decoded.image.to_bytes())
}

fn glyf_entry(woff2: &[u8]) -> Option<TableDirectoryEntry> {
    let mut reader = Reader::new(woff2);
    let header = Woff2Header::read(&mut reader).unwrap();
    (0..header.num_tables)
        .map(|_| TableDirectoryEntry::read(&mut reader).unwrap())
        .find(|entry| entry.tag == Tag::new(b"glyf"))
}

#[test]
fn test_sfnt_bytes_survive_round_trip() {
    let sources = [
        truetype().unwrap(),
        TestFont::sample().with_long_loca().build().unwrap(),
        cff().unwrap(),
    ];
    for source in sources {
        let (woff2, rebuilt) = round_trip(&source, &Woff2Options::default());
        assert_eq!(rebuilt, source);
        assert!(woff2.len() < source.len());
    }
}

#[test]
fn test_glyf_is_transformed_and_rebuilt() {
    let source = truetype().unwrap();
    let (woff2, rebuilt) = round_trip(&source, &Woff2Options::default());
    let glyf = glyf_entry(&woff2).unwrap();
    assert!(glyf.is_transformed());

    let font = FontRef::new(&rebuilt).unwrap();
    assert!(font.loca(None).is_ok());
    assert_eq!(usize::from(font.maxp().unwrap().num_glyphs()), TestFont::sample().num_glyphs());
    assert_eq!(font.hmtx().unwrap().h_metrics().len(), 6);
}

#[test]
fn test_non_canonical_glyf_still_round_trips() {
    let source = TestFont::non_canonical().build().unwrap();
    let (woff2, rebuilt) = round_trip(&source, &Woff2Options::default());
    assert!(!glyf_entry(&woff2).unwrap().is_transformed());
    assert_eq!(rebuilt, source);
}

#[test]
fn test_shifted_side_bearings_round_trip() {
    let source = TestFont::sample().with_lsb_shift(7).build().unwrap();
    let (woff2, rebuilt) = round_trip(&source, &Woff2Options::default());
    assert!(glyf_entry(&woff2).unwrap().is_transformed());
    assert_eq!(rebuilt, source);
}

#[test]
fn test_untransformed_round_trip() {
    let source = truetype().unwrap();
    let options = Woff2Options { transform_glyf: false, brotli_quality: 4, ..Woff2Options::default() };
    let (woff2, rebuilt) = round_trip(&source, &options);
    assert_eq!(glyf_entry(&woff2).unwrap().transform_version, 3);
    assert_eq!(rebuilt, source);
}

#[test]
fn test_font_builder_source_round_trips() {
    let source = TestFont::sample().build_with_font_builder().unwrap();
    let image = SfntImage::from_bytes(&source).unwrap();
    let woff2 = encode(&DecodedFont::new(image.clone()), &Woff2Options::default()).unwrap();
    let decoded = decode(&woff2, &Woff2Options::default()).unwrap();

    let payloads = |image: &SfntImage| {
        let mut tables: Vec<_> = image.tables().iter().map(|t| (t.tag, t.data.clone())).collect();
        tables.sort();
        tables
    };
    assert_eq!(payloads(&decoded.image), payloads(&image));
}

#[test]
fn test_extras_round_trip() {
    let font = DecodedFont {
        image: TestFont::sample().image().unwrap(),
        extras: WebFontExtras {
            metadata: Some(METADATA.to_vec()),
            private_data: Some(PRIVATE_DATA.to_vec()),
            version: Some((2, 1)),
        },
    };
    let woff2 = encode(&font, &Woff2Options::default()).unwrap();
    assert_eq!(decode(&woff2, &Woff2Options::default()).unwrap(), font);
}

#[test]
fn test_truncation_never_panics() {
    let image = TestFont::sample().image().unwrap();
    let woff2 = encode(&DecodedFont::new(image), &Woff2Options::default()).unwrap();
    // Stop short of the last four bytes so some compressed data is always cut.
    for len in (0..woff2.len() - 4).step_by(7) {
        let mut truncated = woff2[..len].to_vec();
        if truncated.len() >= 12 {
            truncated[8..12].copy_from_slice(&(len as u32).to_be_bytes());
        }
        assert!(decode(&truncated, &Woff2Options::default()).is_err(), "length {len}");
    }
}

#[test]
fn test_cancelled_decode() {
    let image = TestFont::sample().image().unwrap();
    let woff2 = encode(&DecodedFont::new(image), &Woff2Options::default()).unwrap();
    let cancel = CancelToken::new();
    cancel.cancel();
    let options = Woff2Options { cancel: Some(cancel), ..Woff2Options::default() };
    assert!(decode(&woff2, &options).is_err());
}
