//! 标记文本与 AMLX 字节之间的桥接函数。

use amll_core::LyricMarkup;

use crate::{container, error::BridgeError};

/// 解析标记文本并编码为 AMLX。
pub fn markup_to_binary<M>(markup: &M, text: &str) -> Result<Vec<u8>, BridgeError>
where
    M: LyricMarkup + ?Sized,
{
    let document = markup.to_document(text)?;
    Ok(container::encode(&document)?)
}

/// 解码 AMLX 并序列化为标记文本。
pub fn binary_to_markup<M>(markup: &M, bytes: &[u8], pretty: bool) -> Result<String, BridgeError>
where
    M: LyricMarkup + ?Sized,
{
    let document = container::decode(bytes)?;
    Ok(markup.from_document(&document, pretty)?)
}

#[cfg(test)]
mod tests {
    use amll_core::{ConvertError, LyricDocument, LyricLine, LyricWord};

    use super::*;

    /// 每行一个单词，格式为 `start end text`。
    struct PlainMarkup;

    impl LyricMarkup for PlainMarkup {
        fn to_document(&self, text: &str) -> Result<LyricDocument, ConvertError> {
            let lines = text
                .lines()
                .map(|row| {
                    let mut parts = row.splitn(3, ' ');
                    let mut time = || {
                        parts
                            .next()
                            .and_then(|p| p.parse::<f64>().ok())
                            .ok_or_else(|| ConvertError::InvalidTime(row.to_string()))
                    };
                    let start = time()?;
                    let end = time()?;
                    let text = parts.next().unwrap_or_default();
                    Ok(LyricLine::new(start, end, vec![LyricWord::new(text, start, end)]))
                })
                .collect::<Result<_, ConvertError>>()?;
            Ok(LyricDocument::new(vec![], lines))
        }

        fn from_document(
            &self,
            document: &LyricDocument,
            _pretty: bool,
        ) -> Result<String, ConvertError> {
            Ok(document
                .lines
                .iter()
                .map(|line| {
                    let text: String = line.words.iter().map(|w| w.text.as_str()).collect();
                    format!("{} {} {text}", line.start_time_ms, line.end_time_ms)
                })
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }

    #[test]
    fn test_round_trip_through_markup() {
        let text = "0 500 Hello\n500 900 world";
        let bytes = markup_to_binary(&PlainMarkup, text).unwrap();
        assert_eq!(binary_to_markup(&PlainMarkup, &bytes, false).unwrap(), text);
    }

    #[test]
    fn test_errors_are_attributed() {
        let err = markup_to_binary(&PlainMarkup, "zero 5 x").unwrap_err();
        assert!(matches!(err, BridgeError::Markup(ConvertError::InvalidTime(_))));

        let err = binary_to_markup(&PlainMarkup, b"BMLX\x01\x00\x00", false).unwrap_err();
        assert!(matches!(err, BridgeError::Codec(_)));
    }

    #[test]
    fn test_negative_time_fails_in_codec() {
        let err = markup_to_binary(&PlainMarkup, "-5 10 x").unwrap_err();
        assert!(matches!(err, BridgeError::Codec(_)));
    }
}
