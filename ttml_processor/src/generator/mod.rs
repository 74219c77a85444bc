//! AMLL 风格 TTML 歌词的生成器。
//!
//! 输出的结构与 AMLL 编辑器导出的文件一致，不面向通用字幕。

mod body;
mod head;
mod track;
mod utils;

pub use utils::format_ttml_time;

use amll_core::{ConvertError, LyricDocument, LyricLine, TtmlGenerationOptions};
use quick_xml::Writer;
use tracing::debug;

const TTML_NAMESPACE: &str = "http://www.w3.org/ns/ttml";
const TTM_NAMESPACE: &str = "http://www.w3.org/ns/ttml#metadata";
const AMLL_NAMESPACE: &str = "http://www.example.com/ns/amll";
const ITUNES_NAMESPACE: &str = "http://music.apple.com/lyric-ttml-internal";

/// `itunes:timing` 的取值。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimingMode {
    /// 没有任何有效时间。
    None,
    /// 每行只有一个非空白单词。
    Line,
    /// 至少有一行包含多个非空白单词。
    Word,
}

impl TimingMode {
    fn detect(lines: &[LyricLine]) -> Self {
        let mut has_words = false;
        let mut has_timing = false;
        for word in lines.iter().flat_map(|line| &line.words) {
            if !word.is_blank() {
                has_words = true;
                has_timing |= word.end_time_ms > word.start_time_ms;
            }
        }

        if !has_words || !has_timing {
            Self::None
        } else if is_word_timed(lines) {
            Self::Word
        } else {
            Self::Line
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Line => "Line",
            Self::Word => "Word",
        }
    }
}

/// 任意一行含有多于一个非空白单词时，按逐字方式输出。
fn is_word_timed(lines: &[LyricLine]) -> bool {
    lines.iter().any(|line| line.non_blank_word_count() > 1)
}

/// 把歌词文档写成 TTML 文本。
///
/// `options.format` 为真时输出两空格缩进的文本，`<p>` 内部始终保持紧凑。
///
/// # Errors
///
/// 写出 XML 失败或结果不是合法 UTF-8 时返回 `ConvertError`。
pub fn generate_ttml(
    document: &LyricDocument,
    options: &TtmlGenerationOptions,
) -> Result<String, ConvertError> {
    let mut buffer = Vec::new();

    if options.format {
        let mut writer = Writer::new_with_indent(&mut buffer, b' ', 2);
        generate_ttml_inner(&mut writer, document, options)?;
    } else {
        let mut writer = Writer::new(&mut buffer);
        generate_ttml_inner(&mut writer, document, options)?;
    }

    let output = String::from_utf8(buffer)?;
    debug!(
        "TTML 生成完成：{} 行，{} 字节",
        document.lines.len(),
        output.len()
    );
    Ok(output)
}

/// 写出 `<tt>` 根元素。
fn generate_ttml_inner<W: std::io::Write>(
    writer: &mut Writer<W>,
    document: &LyricDocument,
    options: &TtmlGenerationOptions,
) -> Result<(), ConvertError> {
    let timing_mode = TimingMode::detect(&document.lines);
    let word_timed = is_word_timed(&document.lines);
    let divs = body::plan_divs(&document.lines);

    writer
        .create_element("tt")
        .with_attribute(("xmlns", TTML_NAMESPACE))
        .new_line()
        .with_attribute(("xmlns:ttm", TTM_NAMESPACE))
        .new_line()
        .with_attribute(("xmlns:amll", AMLL_NAMESPACE))
        .new_line()
        .with_attribute(("xmlns:itunes", ITUNES_NAMESPACE))
        .new_line()
        .with_attribute(("itunes:timing", timing_mode.as_str()))
        .write_inner_content(|writer| {
            head::write_ttml_head(writer, document, &divs).map_err(std::io::Error::other)?;
            body::write_ttml_body(writer, &document.lines, &divs, word_timed, options)
                .map_err(std::io::Error::other)?;
            Ok(())
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use amll_core::LyricWord;

    use super::*;

    #[test]
    fn test_timing_mode_detection() {
        let single = LyricLine::new(0.0, 10.0, vec![LyricWord::new("a", 0.0, 10.0)]);
        let multi = LyricLine::new(
            0.0,
            10.0,
            vec![LyricWord::new("a", 0.0, 5.0), LyricWord::new("b", 5.0, 10.0)],
        );
        let untimed = LyricLine::new(0.0, 0.0, vec![LyricWord::new("a", 0.0, 0.0)]);

        assert_eq!(TimingMode::detect(&[]), TimingMode::None);
        assert_eq!(TimingMode::detect(&[untimed]), TimingMode::None);
        assert_eq!(TimingMode::detect(std::slice::from_ref(&single)), TimingMode::Line);
        assert_eq!(TimingMode::detect(&[single, multi]), TimingMode::Word);
    }

    #[test]
    fn test_empty_document() {
        let output =
            generate_ttml(&LyricDocument::default(), &TtmlGenerationOptions::default()).unwrap();
        assert!(output.contains(r#"itunes:timing="None""#));
        assert!(output.contains(r#"<body dur="00:00.000"/>"#));
        assert!(output.contains(r#"<ttm:agent type="person" xml:id="v1"/>"#));
    }
}
