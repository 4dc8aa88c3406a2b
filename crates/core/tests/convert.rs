use std::borrow::Cow;

use fontverter_core::{
    CancelToken, ContainerFormat, ConvertOptions, Converter, DecodedFont, Error, SfntImage, WebFontExtras,
    convert, convert_with, detect_format,
};
use fontverter_font_woff::WoffOptions;
use fontverter_font_woff2::{HEADER_SIZE as WOFF2_HEADER_SIZE, TableDirectoryEntry};
use fontverter_sfnt::{Reader, tags::HMTX};
use fontverter_test_fonts::{METADATA, PRIVATE_DATA, TestFont, cff, truetype};
use read_fonts::{FontRef, TableProvider};

/// The sample font in each of the three containers.
fn sample_in(format: ContainerFormat) -> Vec<u8> {
    let sfnt = truetype().unwrap();
    convert(&sfnt, format.name(), None).unwrap().into_owned()
}

#[test]
fn test_every_pair_produces_the_target_format() {
    for from in ContainerFormat::ALL {
        let source = sample_in(from);
        assert_eq!(detect_format(&source).unwrap(), from);
        for to in ContainerFormat::ALL {
            let output = convert(&source, to.name(), None).unwrap();
            assert_eq!(detect_format(&output).unwrap(), to, "{from} -> {to}");
            let output = convert(&source, to.name(), Some(from.name())).unwrap();
            assert_eq!(detect_format(&output).unwrap(), to, "{from} -> {to} (declared)");
        }
    }
}

#[test]
fn test_identity_returns_the_input() {
    for format in ContainerFormat::ALL {
        let source = sample_in(format);
        let output = convert(&source, format.name(), None).unwrap();
        assert!(matches!(output, Cow::Borrowed(_)));
        assert_eq!(output.as_ptr(), source.as_ptr());
        assert_eq!(output.len(), source.len());
    }
}

#[test]
fn test_truetype_alias_matches_sfnt() {
    let woff2 = sample_in(ContainerFormat::Woff2);
    let sfnt = convert(&woff2, "sfnt", None).unwrap();
    let aliased = convert(&woff2, "truetype", Some("woff2")).unwrap();
    assert_eq!(sfnt, aliased);

    let source = truetype().unwrap();
    let woff = convert(&source, "woff", Some("truetype")).unwrap();
    assert_eq!(detect_format(&woff).unwrap(), ContainerFormat::Woff);
}

#[test]
fn test_unrecognized_signature() {
    let err = convert(b"abcd and more", "woff", None).unwrap_err();
    assert!(matches!(&err, Error::UnrecognizedFormat { signature } if signature == b"abcd"));
    assert_eq!(err.to_string(), "Unrecognized font signature: abcd");
}

#[test]
fn test_unsupported_names() {
    let source = truetype().unwrap();
    assert!(matches!(convert(&source, "footype", None), Err(Error::UnsupportedTarget { .. })));
    assert!(matches!(convert(&source, "woff", Some("footype")), Err(Error::UnsupportedSource { .. })));
    assert!(matches!(convert(&source, "WOFF2", None), Err(Error::UnsupportedTarget { .. })));
}

#[test]
fn test_table_payloads_survive_every_path() {
    for source in [truetype().unwrap(), TestFont::non_canonical().build().unwrap(), cff().unwrap()] {
        let woff2 = convert(&source, "woff2", None).unwrap();
        assert_eq!(convert(&woff2, "sfnt", None).unwrap(), source);

        let woff = convert(&source, "woff", None).unwrap();
        let woff2 = convert(&woff, "woff2", None).unwrap();
        assert_eq!(convert(&woff2, "sfnt", None).unwrap(), source);

        let back_to_woff = convert(&woff2, "woff", None).unwrap();
        assert_eq!(convert(&back_to_woff, "sfnt", None).unwrap(), source);
    }
}

#[test]
fn test_output_parses_with_read_fonts() {
    let woff2 = sample_in(ContainerFormat::Woff2);
    let sfnt = convert(&woff2, "sfnt", None).unwrap();
    let font = FontRef::new(&sfnt).unwrap();
    assert_eq!(font.maxp().unwrap().num_glyphs() as usize, TestFont::sample().num_glyphs());
    assert!(font.glyf().is_ok());
    assert_eq!(font.head().unwrap().font_revision().to_bits(), 0x0001_8000);
}

#[test]
fn test_extras_survive_woff_to_woff2_and_back() {
    let font = DecodedFont {
        image: TestFont::sample().image().unwrap(),
        extras: WebFontExtras {
            metadata: Some(METADATA.to_vec()),
            private_data: Some(PRIVATE_DATA.to_vec()),
            version: Some((4, 2)),
        },
    };
    let woff = fontverter_font_woff::encode(&font, &WoffOptions::default()).unwrap();

    let woff2 = convert(&woff, "woff2", None).unwrap();
    let back = convert(&woff2, "woff", None).unwrap();
    let decoded = fontverter_font_woff::decode(&back, &WoffOptions::default()).unwrap();
    assert_eq!(decoded.extras, font.extras);

    // SFNT has nowhere to keep them.
    let sfnt = convert(&woff2, "sfnt", None).unwrap();
    assert_eq!(sfnt, font.image.to_bytes());
    assert_eq!(SfntImage::from_bytes(&sfnt).unwrap().len(), font.image.len());
}

#[test]
fn test_damaged_input_is_malformed() {
    for format in [ContainerFormat::Woff, ContainerFormat::Woff2] {
        let source = sample_in(format);
        for len in [4, 20, source.len() / 2, source.len() - 1] {
            let err = convert(&source[..len], "sfnt", None).unwrap_err();
            assert!(
                matches!(err, Error::MalformedContainer { format: f, .. } if f == format),
                "{format} truncated to {len}: {err}"
            );
        }
    }

    let sfnt = truetype().unwrap();
    let err = convert(&sfnt[..40], "woff", None).unwrap_err();
    assert!(matches!(err, Error::MalformedContainer { format: ContainerFormat::Sfnt, .. }));
}

#[test]
fn test_unknown_hmtx_transform_version_is_malformed() {
    let mut woff2 = sample_in(ContainerFormat::Woff2);
    let num_tables = u16::from_be_bytes([woff2[12], woff2[13]]);

    let mut reader = Reader::new(&woff2[WOFF2_HEADER_SIZE..]);
    let mut hmtx_flags = None;
    for _ in 0..num_tables {
        let position = WOFF2_HEADER_SIZE + reader.position();
        let entry = TableDirectoryEntry::read(&mut reader).unwrap();
        if entry.tag == HMTX {
            assert_eq!(entry.transform_version, 1);
            hmtx_flags = Some(position);
        }
    }
    let hmtx_flags = hmtx_flags.unwrap();
    // keep the known-tag index, set the version bits to 2
    woff2[hmtx_flags] = (woff2[hmtx_flags] & 0x3F) | (2 << 6);

    let err = convert(&woff2, "sfnt", None).unwrap_err();
    assert!(
        matches!(err, Error::MalformedContainer { format: ContainerFormat::Woff2, .. }),
        "{err}"
    );
}

#[test]
fn test_options_change_output_not_content() {
    let source = truetype().unwrap();
    let options = ConvertOptions::default().with_transforms(false).with_brotli_quality(1);
    let plain = convert_with(&source, ContainerFormat::Woff2, None, &options).unwrap();
    let transformed = convert(&source, "woff2", None).unwrap();
    assert_ne!(plain, transformed);
    assert_eq!(convert(&plain, "sfnt", None).unwrap(), source);

    let options = ConvertOptions::default().with_zlib_level(0).with_parallel(false);
    let stored = convert_with(&source, ContainerFormat::Woff, None, &options).unwrap();
    assert_eq!(convert(&stored, "sfnt", None).unwrap(), source);
}

#[test]
fn test_transforms_skip_non_canonical_glyf() {
    let source = TestFont::non_canonical().build().unwrap();
    let enabled = convert_with(&source, ContainerFormat::Woff2, None, &ConvertOptions::default()).unwrap();
    let disabled =
        convert_with(&source, ContainerFormat::Woff2, None, &ConvertOptions::default().with_transforms(false))
            .unwrap();
    assert_eq!(enabled, disabled);
    assert_eq!(convert(&enabled, "sfnt", None).unwrap(), source);
}

#[test]
fn test_cancellation() {
    let source = truetype().unwrap();
    let cancel = CancelToken::new();
    let converter = Converter::new(ConvertOptions::default().with_cancel(cancel.clone()));
    assert!(converter.convert(&source, ContainerFormat::Woff, None).is_ok());

    cancel.cancel();
    for to in ContainerFormat::ALL {
        assert!(matches!(converter.convert(&source, to, None), Err(Error::Cancelled)));
    }
}
