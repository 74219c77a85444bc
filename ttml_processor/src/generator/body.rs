//! `<body>` 的写出：按空行分段，每段一个 `<div>`，每行一个 `<p>`。

use amll_core::{ConvertError, LyricLine, TtmlGenerationOptions};
use quick_xml::{
    Writer,
    events::{BytesText, Event},
};

use super::{
    track::{write_background_line, write_inline_auxiliary, write_words},
    utils::{format_ttml_time, render_compact, write_raw_fragment},
};

/// 一个 `<p>` 元素：主歌词行，以及紧随其后的背景人声行。
#[derive(Debug)]
pub(super) struct Paragraph<'a> {
    /// `itunes:key`，形如 `L1`。
    pub key: String,
    pub line: &'a LyricLine,
    pub background: Option<&'a LyricLine>,
}

/// 将歌词行划分为若干 `<div>`。
///
/// 没有单词的行作为分隔符，本身不输出。
/// 背景人声行紧跟在其主歌词行之后时会被并入同一个段落。
pub(super) fn plan_divs(lines: &[LyricLine]) -> Vec<Vec<Paragraph<'_>>> {
    let mut divs: Vec<Vec<Paragraph<'_>>> = Vec::new();
    let mut current: Vec<Paragraph<'_>> = Vec::new();
    let mut key_counter = 0usize;

    let mut iter = lines.iter().peekable();
    while let Some(line) = iter.next() {
        if line.words.is_empty() {
            if !current.is_empty() {
                divs.push(std::mem::take(&mut current));
            }
            continue;
        }

        let background = iter.next_if(|next| next.is_background && !next.words.is_empty());
        key_counter += 1;
        current.push(Paragraph {
            key: format!("L{key_counter}"),
            line,
            background,
        });
    }
    if !current.is_empty() {
        divs.push(current);
    }
    divs
}

/// 写入 TTML 的 `<body>` 部分。
pub(super) fn write_ttml_body<W: std::io::Write>(
    writer: &mut Writer<W>,
    lines: &[LyricLine],
    divs: &[Vec<Paragraph<'_>>],
    word_timed: bool,
    options: &TtmlGenerationOptions,
) -> Result<(), ConvertError> {
    let body_dur_ms = lines.last().map_or(0.0, |line| line.end_time_ms);
    let body_builder = writer
        .create_element("body")
        .with_attribute(("dur", format_ttml_time(body_dur_ms).as_str()));

    if divs.is_empty() {
        body_builder.write_empty()?;
        return Ok(());
    }

    body_builder.write_inner_content(|writer| {
        for div in divs {
            write_div(writer, div, word_timed, options).map_err(std::io::Error::other)?;
        }
        Ok(())
    })?;
    Ok(())
}

/// 将一组段落写入一个 div 块
fn write_div<W: std::io::Write>(
    writer: &mut Writer<W>,
    paragraphs: &[Paragraph<'_>],
    word_timed: bool,
    options: &TtmlGenerationOptions,
) -> Result<(), ConvertError> {
    let (Some(first), Some(last)) = (paragraphs.first(), paragraphs.last()) else {
        return Ok(());
    };
    let div_end_ms = last
        .background
        .map_or(last.line.end_time_ms, |background| background.end_time_ms);

    writer
        .create_element("div")
        .with_attribute(("begin", format_ttml_time(first.line.start_time_ms).as_str()))
        .with_attribute(("end", format_ttml_time(div_end_ms).as_str()))
        .write_inner_content(|writer| {
            for paragraph in paragraphs {
                write_paragraph(writer, paragraph, word_timed, options)
                    .map_err(std::io::Error::other)?;
            }
            Ok(())
        })?;
    Ok(())
}

fn write_paragraph<W: std::io::Write>(
    writer: &mut Writer<W>,
    paragraph: &Paragraph<'_>,
    word_timed: bool,
    options: &TtmlGenerationOptions,
) -> Result<(), ConvertError> {
    let line = paragraph.line;
    let (start_ms, end_ms) = if word_timed {
        (line.start_time_ms, line.end_time_ms)
    } else {
        line.words
            .first()
            .map_or((line.start_time_ms, line.end_time_ms), |word| {
                (word.start_time_ms, word.end_time_ms)
            })
    };
    let agent = if line.is_duet { "v2" } else { "v1" };

    // <p> 的内容为混合内容，始终紧凑输出，避免缩进改变歌词文本
    let content = render_compact(|writer| write_p_content(writer, paragraph, word_timed, options))?;

    writer
        .create_element("p")
        .with_attribute(("begin", format_ttml_time(start_ms).as_str()))
        .with_attribute(("end", format_ttml_time(end_ms).as_str()))
        .with_attribute(("ttm:agent", agent))
        .with_attribute(("itunes:key", paragraph.key.as_str()))
        .write_inner_content(|writer| write_raw_fragment(writer, &content))?;
    Ok(())
}

/// 写入 `<p>` 标签的具体内容：主歌词、背景人声、翻译和罗马音。
fn write_p_content<W: std::io::Write>(
    writer: &mut Writer<W>,
    paragraph: &Paragraph<'_>,
    word_timed: bool,
    options: &TtmlGenerationOptions,
) -> Result<(), ConvertError> {
    let line = paragraph.line;

    if word_timed {
        write_words(writer, &line.words, false)?;
    } else if let Some(word) = line.words.first() {
        writer.write_event(Event::Text(BytesText::new(&word.text)))?;
    }

    if let Some(background) = paragraph.background {
        write_background_line(
            writer,
            background,
            word_timed,
            &options.translation_language,
        )?;
    }

    write_inline_auxiliary(
        writer,
        "x-translation",
        Some(&options.translation_language),
        line.translated_lyric.as_deref(),
    )?;
    write_inline_auxiliary(writer, "x-roman", None, line.roman_lyric.as_deref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use amll_core::LyricWord;

    use super::*;

    fn line(text: &str, start: f64, end: f64) -> LyricLine {
        LyricLine::new(start, end, vec![LyricWord::new(text, start, end)])
    }

    #[test]
    fn test_plan_divs_splits_on_empty_lines() {
        let mut bg = line("ooh", 500.0, 900.0);
        bg.is_background = true;
        let lines = vec![
            line("a", 0.0, 1000.0),
            bg,
            LyricLine::new(1000.0, 1000.0, vec![]),
            line("b", 2000.0, 3000.0),
            LyricLine::new(3000.0, 3000.0, vec![]),
        ];

        let divs = plan_divs(&lines);
        assert_eq!(divs.len(), 2);
        assert_eq!(divs[0].len(), 1);
        assert_eq!(divs[0][0].key, "L1");
        assert_eq!(
            divs[0][0].background.map(|l| l.words[0].text.as_str()),
            Some("ooh")
        );
        assert_eq!(divs[1][0].key, "L2");
    }

    #[test]
    fn test_leading_empty_line_does_not_create_div() {
        let lines = vec![LyricLine::new(0.0, 0.0, vec![]), line("a", 0.0, 10.0)];
        let divs = plan_divs(&lines);
        assert_eq!(divs.len(), 1);
        assert_eq!(divs[0][0].key, "L1");
    }

    #[test]
    fn test_orphan_background_line_is_its_own_paragraph() {
        let mut bg = line("ooh", 0.0, 10.0);
        bg.is_background = true;
        let lines = vec![bg];
        let divs = plan_divs(&lines);
        assert_eq!(divs[0].len(), 1);
        assert!(divs[0][0].background.is_none());
    }
}
