mod common;

use amll_core::{LyricDocument, LyricLine, LyricWord};
use amlx_codec::{AmlxError, AmlxErrorKind, FieldPath, Scope, decode, encode, inspect};
use common::sample_document;

/// 手工拼出的最小负载：一个字符串 "x"，一行一个单词。
fn one_word_payload(line_flags: u8, word_flags: u8, text_id: u8) -> Vec<u8> {
    let mut bytes = b"AMLX\x01\x00".to_vec();
    bytes.extend_from_slice(&[1, 0]); // header_size, metadata_count
    bytes.extend_from_slice(&[1, 1, b'x']); // string pool
    bytes.extend_from_slice(&[1, 10, 20, line_flags, 1]); // line
    bytes.extend_from_slice(&[0, 5, text_id, word_flags]); // word
    bytes
}

#[test]
fn test_minimal_payload_is_valid() {
    let document = decode(&one_word_payload(0, 0, 0)).unwrap();
    assert_eq!(document.lines[0].words[0].text, "x");
    assert_eq!(document.lines[0].words[0].end_time_ms, 15.0);
}

#[test]
fn test_wrong_magic() {
    let mut bytes = encode(&sample_document()).unwrap();
    bytes[..4].copy_from_slice(b"BMLX");
    assert_eq!(
        decode(&bytes).unwrap_err(),
        AmlxError::InvalidMagic { found: *b"BMLX" }
    );
}

#[test]
fn test_string_id_equal_to_pool_size() {
    let err = decode(&one_word_payload(0, 0, 1)).unwrap_err();
    assert_eq!(
        err,
        AmlxError::StringIndexOutOfBounds {
            at: FieldPath::new(Scope::Word(0, 0), "text_string_id"),
            index: 1,
            pool_size: 1
        }
    );
    assert_eq!(
        err.to_string().split(':').next(),
        Some("line[0].word[0].text_string_id")
    );
}

#[test]
fn test_reserved_line_flag() {
    let err = decode(&one_word_payload(0x20, 0, 0)).unwrap_err();
    assert_eq!(err.kind(), AmlxErrorKind::UnsupportedReservedFlag);
    assert_eq!(err.field_path(), Some(FieldPath::new(Scope::Line(0), "line_flags")));
}

#[test]
fn test_reserved_word_flag() {
    let err = decode(&one_word_payload(0, 0x10, 0)).unwrap_err();
    assert_eq!(
        err,
        AmlxError::UnsupportedReservedFlag {
            at: FieldPath::new(Scope::Word(0, 0), "word_flags"),
            reserved: 0x10
        }
    );
}

#[test]
fn test_line_end_before_start() {
    let mut bytes = one_word_payload(0, 0, 0);
    // 行的开始与结束时间紧跟在字符串池之后
    bytes[12] = 30;
    let err = decode(&bytes).unwrap_err();
    assert_eq!(
        err,
        AmlxError::LineTimingRegression {
            at: FieldPath::new(Scope::Line(0), "end_time"),
            start: 30,
            end: 20
        }
    );
}

#[test]
fn test_every_strict_prefix_fails() {
    let bytes = encode(&sample_document()).unwrap();
    for len in 0..bytes.len() {
        let err = decode(&bytes[..len]).unwrap_err();
        assert!(
            matches!(
                err.kind(),
                AmlxErrorKind::TruncatedInput | AmlxErrorKind::TrailingBytes
            ),
            "prefix {len}: {err}"
        );
    }
}

#[test]
fn test_header_trailing_bytes() {
    let mut bytes = b"AMLX\x01\x00".to_vec();
    bytes.extend_from_slice(&[2, 0, 0xee]); // 头部声明 2 字节，但只用了 1 字节
    bytes.extend_from_slice(&[0, 0]);
    assert_eq!(
        decode(&bytes).unwrap_err(),
        AmlxError::TrailingBytes {
            at: FieldPath::root("header"),
            remaining: 1
        }
    );
}

#[test]
fn test_varint_overflow() {
    let mut bytes = b"AMLX\x01\x00".to_vec();
    bytes.extend_from_slice(&[0xff; 10]);
    let err = decode(&bytes).unwrap_err();
    assert_eq!(err.kind(), AmlxErrorKind::VarintOverflow);
    assert_eq!(err.field_path(), Some(FieldPath::root("header_size")));
}

#[test]
fn test_word_end_overflow() {
    let mut bytes = b"AMLX\x01\x00".to_vec();
    bytes.extend_from_slice(&[1, 0]);
    bytes.extend_from_slice(&[1, 1, b'x']);
    bytes.push(1);
    bytes.extend_from_slice(&[0, 0, 0, 1]); // start 0, end 0, flags 0, 1 word
    bytes.push(0);
    // duration = u64::MAX >> 1 + 1
    bytes.extend_from_slice(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01]);
    bytes.extend_from_slice(&[0, 0]);
    let err = decode(&bytes).unwrap_err();
    assert_eq!(
        err,
        AmlxError::TimingOverflow {
            at: FieldPath::new(Scope::Word(0, 0), "end_time")
        }
    );
}

#[test]
fn test_invalid_timing_on_encode() {
    for bad in [f64::NAN, f64::INFINITY, -1.0] {
        let document = LyricDocument::new(vec![], vec![LyricLine::new(bad, 10.0, vec![])]);
        let err = encode(&document).unwrap_err();
        assert_eq!(err.kind(), AmlxErrorKind::InvalidTiming);
        assert_eq!(err.field_path(), Some(FieldPath::new(Scope::Line(0), "start_time")));
    }

    let document = LyricDocument::new(
        vec![],
        vec![LyricLine::new(0.0, 10.0, vec![LyricWord::new("x", 0.0, 1e300)])],
    );
    assert_eq!(
        encode(&document).unwrap_err(),
        AmlxError::TimingOverflow {
            at: FieldPath::new(Scope::Word(0, 0), "end_time")
        }
    );
}

#[test]
fn test_inspect_rejects_same_payloads() {
    assert!(inspect(&one_word_payload(0x20, 0, 0)).is_err());
    assert!(inspect(&one_word_payload(0, 0, 1)).is_err());
    assert!(inspect(&one_word_payload(0, 0, 0)).is_ok());
}
