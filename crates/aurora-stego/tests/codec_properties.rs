mod common;

use aurora_stego::media::image::{check_capacity, LsbRegion};
use aurora_stego::media::payload::{EnvelopeCodec, EnvelopeMeta, META_KEY};
use aurora_stego::{AuroraError, CodecOptions, CorruptionReason, Record, StegoCodec};
use serde_json::json;
use tempfile::TempDir;

use common::*;

fn fixed_meta() -> EnvelopeMeta {
    EnvelopeMeta {
        version: "1.0".to_string(),
        embedded_at: "2025-11-07T19:32:00.000000".to_string(),
        last_modified: None,
        edit_count: 0,
    }
}

#[test]
fn round_trip_preserves_the_record_and_hides_metadata() {
    init_logger();
    let out_dir = TempDir::new().unwrap();
    let card = prepare_carrier(out_dir.path(), "card.png", 300, 420);
    let codec = StegoCodec::new();
    let record = member_record();

    let written = codec.embed(&card, &record, false).unwrap();
    assert_eq!(written, card);

    let extracted = codec.extract(&card).unwrap();
    assert_eq!(extracted, record);
    assert!(!extracted.contains_key(META_KEY));
    let keys: Vec<&String> = extracted.keys().collect();
    let expected: Vec<&String> = record.keys().collect();
    assert_eq!(keys, expected);

    let meta = codec.get_metadata(&card).unwrap().unwrap();
    assert_eq!(meta.version, "1.0");
    assert_eq!(meta.edit_count, 0);
    assert!(meta.last_modified.is_none());
    assert!(codec.has_embedded(&card));
}

fn record_from(value: serde_json::Value) -> Record {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("not an object: {other}"),
    }
}

fn nested_lists(depth: usize) -> serde_json::Value {
    (0..depth).fold(json!("core"), |inner, level| json!([level, inner]))
}

#[test]
fn varied_records_survive_a_trip_through_the_file() {
    let out_dir = TempDir::new().unwrap();
    let cases = vec![
        ("empty", Record::new()),
        ("null", record_from(json!({"note": null, "": ""}))),
        (
            "numbers",
            record_from(json!({
                "zero": 0,
                "negative": -42,
                "smallest": i64::MIN,
                "largest": u64::MAX,
                "half": 0.5,
                "tenth": 0.1,
                "below_zero": -2.25,
                "whole_float": 1024.0,
            })),
        ),
        (
            "booleans",
            record_from(json!({"active": true, "revoked": false, "flags": [true, false]})),
        ),
        (
            "unicode",
            record_from(json!({
                "name": "Crème brûlée",
                "sigil": "\u{1f702}\u{2728}",
                "名前": "オーロラ",
                "escapes": "tab\tquote\"back\\slash\u{7f}",
            })),
        ),
        (
            "nested",
            record_from(json!({
                "lists": nested_lists(40),
                "maps": {"a": {"b": {"c": {"d": {"e": {"depth": 5, "empty": {}}}}}}},
                "mixed": [{"k": [1, {"v": [null, "x"]}]}, [], [[[]]]],
            })),
        ),
    ];

    for (name, record) in cases {
        let card = prepare_carrier(out_dir.path(), &format!("{name}.png"), 100, 100);
        StegoCodec::new().embed(&card, &record, false).unwrap();

        let extracted = StegoCodec::new().extract(&card).unwrap();
        assert_eq!(extracted, record, "record {name} changed on the way");
        let keys: Vec<&String> = extracted.keys().collect();
        assert_eq!(keys, record.keys().collect::<Vec<_>>(), "key order of {name}");
    }
}

#[test]
fn overwriting_with_a_shorter_record_leaves_no_residue() {
    let out_dir = TempDir::new().unwrap();
    let card = prepare_carrier(out_dir.path(), "card.png", 100, 100);
    let codec = StegoCodec::new();

    let mut long = member_record();
    long.insert("biography".to_string(), json!("x".repeat(2_000)));
    codec.embed(&card, &long, false).unwrap();

    let mut short = Record::new();
    short.insert("tier".to_string(), json!("Basic"));
    codec.embed(&card, &short, true).unwrap();

    let image = image::open(&card).unwrap().to_rgb8();
    let bits = LsbRegion::for_image(&image, 100).extract(&image);
    let used = 32 + (12 + 8 + declared_length(&bits)) * 8;

    assert_eq!(codec.extract(&card).unwrap(), short);
    assert!(
        bits[used..].iter().all(|bit| !bit),
        "residue of the longer record found after bit {used}"
    );
}

#[test]
fn capacity_boundary_is_exact() {
    let envelope = EnvelopeCodec::default();
    let meta = fixed_meta();

    // pad until the envelope fills whole pixels
    let mut record = member_record();
    let mut pad = String::new();
    let required = loop {
        record.insert("pad".to_string(), json!(pad));
        let bits = envelope.encode(&record, &meta).unwrap().len();
        if bits % 3 == 0 {
            break bits;
        }
        pad.push('.');
    };
    let width = (required / 3) as u32;
    let codec = StegoCodec::with_options(CodecOptions::default().with_region_size(u32::MAX));

    let mut exact = carrier_image(width, 1);
    codec.embed_image(&mut exact, &record, &meta).unwrap();
    assert_eq!(codec.extract_image(&exact).unwrap().record, record);

    let mut short = carrier_image(width - 1, 1);
    let untouched = short.clone();
    match codec.embed_image(&mut short, &record, &meta) {
        Err(AuroraError::CapacityExceeded { needed, available }) => {
            assert_eq!(needed, required);
            assert_eq!(available, required - 3);
        }
        other => panic!("expected a capacity error, got {other:?}"),
    }
    assert_eq!(short, untouched);

    assert!(check_capacity(required, required).is_ok());
    assert!(check_capacity(required, required - 1).is_err());
}

#[test]
fn any_single_bit_flip_in_checksum_or_payload_is_detected() {
    let envelope = EnvelopeCodec::default();
    let bits = envelope.encode(&member_record(), &fixed_meta()).unwrap();
    let checksum_start = 32 + 12 * 8;

    for i in checksum_start..bits.len() {
        let mut flipped = bits.clone();
        flipped[i] = !flipped[i];

        match envelope.decode(&flipped) {
            Err(AuroraError::CorruptedOrAbsentData(CorruptionReason::ChecksumMismatch {
                ..
            })) => {}
            other => panic!("flip of bit {i} was not detected: {other:?}"),
        }
    }
}

#[test]
fn disabled_checksum_verification_reads_damaged_checksums() {
    let strict = EnvelopeCodec::default();
    let lenient = EnvelopeCodec::default().with_verify_checksum(false);
    let record = member_record();
    let mut bits = strict.encode(&record, &fixed_meta()).unwrap();
    bits[32 + 12 * 8 + 5] ^= true;

    assert!(strict.decode(&bits).is_err());
    assert_eq!(lenient.decode(&bits).unwrap().record, record);
}

#[test]
fn plain_images_are_not_cards() {
    let out_dir = TempDir::new().unwrap();
    let card = prepare_carrier(out_dir.path(), "plain.png", 100, 100);
    let codec = StegoCodec::new();

    assert!(!codec.has_embedded(&card));
    let err = codec.extract(&card).unwrap_err();
    assert!(err.corruption_reason().is_some(), "unexpected error {err:?}");
}

#[test]
fn embedding_twice_requires_an_overwrite() {
    let out_dir = TempDir::new().unwrap();
    let card = prepare_carrier(out_dir.path(), "card.png", 100, 100);
    let codec = StegoCodec::new();

    codec.embed(&card, &member_record(), false).unwrap();
    let before = std::fs::read(&card).unwrap();

    match codec.embed(&card, &Record::new(), false) {
        Err(AuroraError::AlreadyEmbedded(path)) => assert_eq!(path, card),
        other => panic!("expected an already embedded error, got {other:?}"),
    }
    assert_eq!(std::fs::read(&card).unwrap(), before);
}

#[test]
fn outputs_are_always_png() {
    let out_dir = TempDir::new().unwrap();
    let source = prepare_carrier(out_dir.path(), "card.png", 100, 100);
    let codec = StegoCodec::new();

    let written = codec
        .embed_to(&source, out_dir.path().join("card.bmp"), &member_record(), false)
        .unwrap();
    assert_eq!(written, out_dir.path().join("card.bmp.png"));
    assert_eq!(codec.extract(&written).unwrap(), member_record());

    assert!(matches!(
        codec.embed_to(&source, out_dir.path().join("card.jpeg"), &member_record(), false),
        Err(AuroraError::LossyOutputFormat(_))
    ));
}

#[test]
fn capacity_reports_the_usable_space() {
    let out_dir = TempDir::new().unwrap();
    let card = prepare_carrier(out_dir.path(), "card.png", 40, 300);

    let capacity = StegoCodec::new().capacity(&card).unwrap();

    assert_eq!((capacity.region_width, capacity.region_height), (40, 100));
    assert_eq!(capacity.total_bits, 12_000);
    assert_eq!(capacity.usable_bytes, (12_000 - 32) / 8);
}
