use amll_core::{ConvertError, LyricMarkup};
use amlx_codec::{BridgeError, binary_to_markup, decode, encode, markup_to_binary};
use ttml_processor::TtmlMarkup;

const WORD_TIMED: &str = include_str!("../../ttml_processor/tests/test_data/word_timed.ttml");
const LINE_TIMED: &str = include_str!("../../ttml_processor/tests/test_data/line_timed.ttml");

fn assert_bridge_equivalence(text: &str) {
    let markup = TtmlMarkup::default();
    let bytes = markup_to_binary(&markup, text).unwrap();
    let decoded = decode(&bytes).unwrap();

    for pretty in [false, true] {
        let regenerated = binary_to_markup(&markup, &bytes, pretty).unwrap();
        let reparsed = markup.to_document(&regenerated).unwrap();
        assert!(
            decoded.content_eq(&reparsed),
            "pretty={pretty}\n{regenerated}"
        );
    }
}

#[test]
fn test_word_timed_bridge_equivalence() {
    assert_bridge_equivalence(WORD_TIMED);
}

#[test]
fn test_line_timed_bridge_equivalence() {
    assert_bridge_equivalence(LINE_TIMED);
}

#[test]
fn test_bridge_matches_direct_encode() {
    let markup = TtmlMarkup::default();
    let document = markup.to_document(WORD_TIMED).unwrap();
    assert_eq!(
        markup_to_binary(&markup, WORD_TIMED).unwrap(),
        encode(&document).unwrap()
    );
}

#[test]
fn test_reencode_of_bridged_document_is_stable() {
    let markup = TtmlMarkup::default();
    let bytes = markup_to_binary(&markup, WORD_TIMED).unwrap();
    let regenerated = binary_to_markup(&markup, &bytes, false).unwrap();
    assert_eq!(markup_to_binary(&markup, &regenerated).unwrap(), bytes);
}

#[test]
fn test_invalid_markup_is_a_markup_error() {
    let err = markup_to_binary(&TtmlMarkup::default(), "<tt><body><p begin=\"0\" end=\"1\">a</div>")
        .unwrap_err();
    assert!(matches!(err, BridgeError::Markup(ConvertError::Xml(_))));
}
