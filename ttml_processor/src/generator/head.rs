//! `<head>` 的写出：代理、词作者、`amll:meta` 与逐字音译。
//!
//! 该模块负责生成 TTML 文件的 `<head>` 部分，包括演唱者、元数据，
//! 以及 Apple 格式特有的 `<iTunesMetadata>` 词作者与逐字音译块。

use amll_core::{ConvertError, LyricDocument, LyricWord, MetadataEntry};
use quick_xml::{
    Writer,
    events::{BytesText, Event},
};

use super::{
    ITUNES_NAMESPACE,
    body::Paragraph,
    utils::{format_ttml_time, render_compact, write_raw_fragment},
};

const SONGWRITER_KEY: &str = "songwriter";

pub(super) fn write_ttml_head<W: std::io::Write>(
    writer: &mut Writer<W>,
    document: &LyricDocument,
    divs: &[Vec<Paragraph<'_>>],
) -> Result<(), ConvertError> {
    writer
        .create_element("head")
        .write_inner_content(|writer| {
            writer
                .create_element("metadata")
                .write_inner_content(|writer| {
                    write_metadata_content(writer, document, divs).map_err(std::io::Error::other)
                })?;
            Ok(())
        })?;
    Ok(())
}

fn write_metadata_content<W: std::io::Write>(
    writer: &mut Writer<W>,
    document: &LyricDocument,
    divs: &[Vec<Paragraph<'_>>],
) -> Result<(), ConvertError> {
    let has_duet = document.lines.iter().any(|line| line.is_duet);
    write_agents(writer, has_duet)?;
    write_songwriters(writer, &document.metadata)?;
    write_amll_metadata(writer, &document.metadata)?;
    write_transliterations(writer, divs)?;
    Ok(())
}

/// 写入 `<ttm:agent>` 元素：`v1` 为主演唱者，存在对唱行时追加 `v2`。
fn write_agents<W: std::io::Write>(
    writer: &mut Writer<W>,
    has_duet: bool,
) -> Result<(), ConvertError> {
    writer
        .create_element("ttm:agent")
        .with_attribute(("type", "person"))
        .with_attribute(("xml:id", "v1"))
        .write_empty()?;

    if has_duet {
        writer
            .create_element("ttm:agent")
            .with_attribute(("type", "other"))
            .with_attribute(("xml:id", "v2"))
            .write_empty()?;
    }
    Ok(())
}

/// 将第一条 `songwriter` 元数据写为 `<iTunesMetadata><songwriters>`。
fn write_songwriters<W: std::io::Write>(
    writer: &mut Writer<W>,
    metadata: &[MetadataEntry],
) -> Result<(), ConvertError> {
    let songwriters: Vec<&str> = metadata
        .iter()
        .find(|entry| entry.key == SONGWRITER_KEY)
        .map(|entry| {
            entry
                .values
                .iter()
                .map(|name| name.trim())
                .filter(|name| !name.is_empty())
                .collect()
        })
        .unwrap_or_default();

    if songwriters.is_empty() {
        return Ok(());
    }

    writer
        .create_element("iTunesMetadata")
        .with_attribute(("xmlns", ITUNES_NAMESPACE))
        .write_inner_content(|writer| {
            writer
                .create_element("songwriters")
                .write_inner_content(|writer| {
                    for name in &songwriters {
                        writer
                            .create_element("songwriter")
                            .write_text_content(BytesText::new(name))?;
                    }
                    Ok(())
                })?;
            Ok(())
        })?;
    Ok(())
}

/// 其余元数据的每个值写为一个 `<amll:meta>`。
fn write_amll_metadata<W: std::io::Write>(
    writer: &mut Writer<W>,
    metadata: &[MetadataEntry],
) -> Result<(), ConvertError> {
    for entry in metadata.iter().filter(|entry| entry.key != SONGWRITER_KEY) {
        for value in &entry.values {
            writer
                .create_element("amll:meta")
                .with_attribute(("key", entry.key.as_str()))
                .with_attribute(("value", value.as_str()))
                .write_empty()?;
        }
    }
    Ok(())
}

fn has_roman_word(word: &LyricWord) -> bool {
    word.roman_word
        .as_deref()
        .is_some_and(|roman| !roman.trim().is_empty())
}

/// 写入逐字音译块，每个含有罗马音单词的段落对应一个 `<text for="...">`。
fn write_transliterations<W: std::io::Write>(
    writer: &mut Writer<W>,
    divs: &[Vec<Paragraph<'_>>],
) -> Result<(), ConvertError> {
    let paragraphs: Vec<&Paragraph<'_>> = divs
        .iter()
        .flatten()
        .filter(|paragraph| {
            paragraph.line.words.iter().any(has_roman_word)
                || paragraph
                    .background
                    .is_some_and(|background| background.words.iter().any(has_roman_word))
        })
        .collect();

    if paragraphs.is_empty() {
        return Ok(());
    }

    writer
        .create_element("iTunesMetadata")
        .with_attribute(("xmlns", ITUNES_NAMESPACE))
        .write_inner_content(|writer| {
            writer
                .create_element("transliterations")
                .write_inner_content(|writer| {
                    writer
                        .create_element("transliteration")
                        .write_inner_content(|writer| {
                            for paragraph in &paragraphs {
                                write_transliteration_text(writer, paragraph)
                                    .map_err(std::io::Error::other)?;
                            }
                            Ok(())
                        })?;
                    Ok(())
                })?;
            Ok(())
        })?;
    Ok(())
}

fn write_transliteration_text<W: std::io::Write>(
    writer: &mut Writer<W>,
    paragraph: &Paragraph<'_>,
) -> Result<(), ConvertError> {
    let content = render_compact(|writer| write_roman_words(writer, paragraph))?;
    writer
        .create_element("text")
        .with_attribute(("for", paragraph.key.as_str()))
        .write_inner_content(|writer| write_raw_fragment(writer, &content))?;
    Ok(())
}

fn write_roman_span<W: std::io::Write>(
    writer: &mut Writer<W>,
    word: &LyricWord,
    text: &str,
) -> Result<(), ConvertError> {
    writer
        .create_element("span")
        .with_attribute(("begin", format_ttml_time(word.start_time_ms).as_str()))
        .with_attribute(("end", format_ttml_time(word.end_time_ms).as_str()))
        .write_text_content(BytesText::new(text))?;
    Ok(())
}

fn write_roman_words<W: std::io::Write>(
    writer: &mut Writer<W>,
    paragraph: &Paragraph<'_>,
) -> Result<(), ConvertError> {
    let mut has_children = false;
    for word in &paragraph.line.words {
        if let Some(roman) = word.roman_word.as_deref().filter(|_| has_roman_word(word)) {
            write_roman_span(writer, word, roman)?;
            has_children = true;
        } else if word.is_blank() && has_children {
            writer.write_event(Event::Text(BytesText::new(&word.text)))?;
        }
    }

    let Some(background) = paragraph.background else {
        return Ok(());
    };
    let roman_indices: Vec<usize> = background
        .words
        .iter()
        .enumerate()
        .filter(|(_, word)| has_roman_word(word))
        .map(|(index, _)| index)
        .collect();
    if roman_indices.is_empty() {
        return Ok(());
    }

    writer
        .create_element("span")
        .with_attribute(("ttm:role", "x-bg"))
        .write_inner_content(|writer| {
            write_background_roman_words(writer, &background.words, &roman_indices)
                .map_err(std::io::Error::other)
        })?;
    Ok(())
}

fn write_background_roman_words<W: std::io::Write>(
    writer: &mut Writer<W>,
    words: &[LyricWord],
    roman_indices: &[usize],
) -> Result<(), ConvertError> {
    let last = roman_indices.len() - 1;
    for (position, &index) in roman_indices.iter().enumerate() {
        let word = &words[index];
        let roman = word.roman_word.as_deref().unwrap_or_default();

        let mut text = String::with_capacity(roman.len() + 2);
        if position == 0 {
            text.push('(');
        }
        text.push_str(roman);
        if position == last {
            text.push(')');
        }
        write_roman_span(writer, word, &text)?;

        if let Some(next) = words.get(index + 1).filter(|next| next.is_blank()) {
            writer.write_event(Event::Text(BytesText::new(&next.text)))?;
        }
    }
    Ok(())
}
