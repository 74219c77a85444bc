//! # TTML 生成器 - Span 渲染模块
//!
//! 该模块负责将单词、背景人声行、翻译和罗马音渲染为具体的 `<span>` 元素。

use amll_core::{ConvertError, LyricLine, LyricWord};
use quick_xml::{
    Writer,
    events::{BytesText, Event},
};

use super::utils::format_ttml_time;

/// 写入单个单词的 span。`text` 可以覆盖单词本身的文本（例如加上括号）。
pub(super) fn write_word_span<W: std::io::Write>(
    writer: &mut Writer<W>,
    word: &LyricWord,
    text: &str,
) -> Result<(), ConvertError> {
    let mut element = writer
        .create_element("span")
        .with_attribute(("begin", format_ttml_time(word.start_time_ms).as_str()))
        .with_attribute(("end", format_ttml_time(word.end_time_ms).as_str()));

    if word.obscene {
        element = element.with_attribute(("amll:obscene", "true"));
    }
    if let Some(empty_beat) = word.effective_empty_beat_ms() {
        element = element.with_attribute(("amll:empty-beat", empty_beat.to_string().as_str()));
    }

    element.write_text_content(BytesText::new(text))?;
    Ok(())
}

/// 写入单词序列：空白单词作为文本，其余单词作为带时间的 span。
///
/// `parenthesize` 为真时，在首尾两个非空白单词上加括号。
pub(super) fn write_words<W: std::io::Write>(
    writer: &mut Writer<W>,
    words: &[LyricWord],
    parenthesize: bool,
) -> Result<(), ConvertError> {
    let first = words.iter().position(|word| !word.is_blank());
    let last = words.iter().rposition(|word| !word.is_blank());

    for (index, word) in words.iter().enumerate() {
        if word.is_blank() {
            writer.write_event(Event::Text(BytesText::new(&word.text)))?;
            continue;
        }
        if !parenthesize {
            write_word_span(writer, word, &word.text)?;
            continue;
        }

        let mut text = String::with_capacity(word.text.len() + 2);
        if Some(index) == first {
            text.push('(');
        }
        text.push_str(&word.text);
        if Some(index) == last {
            text.push(')');
        }
        write_word_span(writer, word, &text)?;
    }
    Ok(())
}

/// 将翻译或罗马音作为内联的 `<span ttm:role="...">` 写入。空文本不输出。
pub(super) fn write_inline_auxiliary<W: std::io::Write>(
    writer: &mut Writer<W>,
    role: &str,
    lang: Option<&str>,
    text: Option<&str>,
) -> Result<(), ConvertError> {
    let Some(text) = text.filter(|text| !text.is_empty()) else {
        return Ok(());
    };

    let mut element = writer
        .create_element("span")
        .with_attribute(("ttm:role", role));
    if let Some(lang) = lang.filter(|lang| !lang.is_empty()) {
        element = element.with_attribute(("xml:lang", lang));
    }
    element.write_text_content(BytesText::new(text))?;
    Ok(())
}

/// 将背景人声行写为 `x-bg` 角色的 span，翻译与罗马音嵌套在其中。
pub(super) fn write_background_line<W: std::io::Write>(
    writer: &mut Writer<W>,
    background: &LyricLine,
    word_timed: bool,
    translation_lang: &str,
) -> Result<(), ConvertError> {
    let (start_ms, end_ms) = if word_timed {
        let mut timed = background.words.iter().filter(|word| !word.is_blank());
        timed.next().map_or((0.0, 0.0), |first| {
            timed.fold((first.start_time_ms, first.end_time_ms), |(start, end), word| {
                (start.min(word.start_time_ms), end.max(word.end_time_ms))
            })
        })
    } else {
        background
            .words
            .first()
            .map_or((0.0, 0.0), |word| (word.start_time_ms, word.end_time_ms))
    };

    writer
        .create_element("span")
        .with_attribute(("ttm:role", "x-bg"))
        .with_attribute(("begin", format_ttml_time(start_ms).as_str()))
        .with_attribute(("end", format_ttml_time(end_ms).as_str()))
        .write_inner_content(|writer| {
            write_background_content(writer, background, word_timed, translation_lang)
                .map_err(std::io::Error::other)
        })?;
    Ok(())
}

fn write_background_content<W: std::io::Write>(
    writer: &mut Writer<W>,
    background: &LyricLine,
    word_timed: bool,
    translation_lang: &str,
) -> Result<(), ConvertError> {
    if word_timed {
        write_words(writer, &background.words, true)?;
    } else if let Some(word) = background.words.first() {
        let text = format!("({})", word.text);
        writer.write_event(Event::Text(BytesText::new(&text)))?;
    }

    write_inline_auxiliary(
        writer,
        "x-translation",
        Some(translation_lang),
        background.translated_lyric.as_deref(),
    )?;
    write_inline_auxiliary(writer, "x-roman", None, background.roman_lyric.as_deref())?;
    Ok(())
}
