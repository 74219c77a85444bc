//! `<p>` 内部的解析：音节、背景人声与内联的翻译和罗马音。

use amll_core::{ConvertError, LyricLine, LyricWord};
use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use super::{
    constants::{
        ATTR_AGENT, ATTR_AGENT_ALIAS, ATTR_EMPTY_BEAT, ATTR_EMPTY_BEAT_ALIAS, ATTR_ITUNES_KEY,
        ATTR_OBSCENE, ATTR_OBSCENE_ALIAS, TAG_P, TAG_SPAN,
    },
    state::{LineBuilder, MetadataParseState, SpanContext, SpanRole, TtmlParserState},
    utils::{
        TimingAttributes, decode_entity, get_non_empty_attribute, get_span_role,
        get_string_attribute, get_timing_attributes, parse_empty_beat,
    },
};

/// 处理 `<p>` 的开始标签。
pub(super) fn process_p_start(
    e: &BytesStart,
    reader: &Reader<&[u8]>,
    state: &mut TtmlParserState,
) -> Result<(), ConvertError> {
    let timing = get_timing_attributes(e, reader)?;
    let agent = get_non_empty_attribute(e, reader, &[ATTR_AGENT, ATTR_AGENT_ALIAS])?;
    let itunes_key = get_non_empty_attribute(e, reader, &[ATTR_ITUNES_KEY])?;

    let mut builder = new_line_builder(&state.metadata_state, itunes_key, false, timing.valid());
    builder.discard = timing == TimingAttributes::Missing;
    builder.line.is_duet = agent.is_some_and(|agent| agent != state.main_agent);

    state.body_state.line_stack.push(builder);
    Ok(())
}

/// 创建一行，并从 `<head>` 中取出该行对应的翻译与罗马音。
fn new_line_builder(
    meta_state: &MetadataParseState,
    itunes_key: Option<String>,
    is_background: bool,
    timing: Option<(f64, f64)>,
) -> LineBuilder {
    let mut line = LyricLine {
        is_background,
        ..Default::default()
    };
    if let Some((start_ms, end_ms)) = timing {
        line.start_time_ms = start_ms;
        line.end_time_ms = end_ms;
    }

    let mut pending_roman_words = Vec::new();
    if let Some(key) = &itunes_key {
        line.translated_lyric = meta_state
            .translations
            .get(key)
            .and_then(|text| text.for_line(is_background));
        line.roman_lyric = meta_state
            .line_romanizations
            .get(key)
            .and_then(|text| text.for_line(is_background));
        if let Some(words) = meta_state.word_romanizations.get(key) {
            pending_roman_words = if is_background {
                words.background.clone()
            } else {
                words.main.clone()
            };
        }
    }

    LineBuilder {
        line,
        has_explicit_timing: timing.is_some(),
        itunes_key,
        pending_roman_words,
        ..Default::default()
    }
}

/// 分发 `<p>` 内的一个事件。
pub(super) fn handle_p_event(
    event: &Event<'_>,
    state: &mut TtmlParserState,
    reader: &Reader<&[u8]>,
    lines: &mut Vec<LyricLine>,
) -> Result<(), ConvertError> {
    match event {
        Event::Start(e) if e.local_name().as_ref() == TAG_SPAN => {
            process_span_start(e, state, reader)?;
        }
        Event::Text(e) => {
            let text = e.xml_content().map_err(ConvertError::new_parse)?;
            push_text(state, &text);
        }
        Event::GeneralRef(e) => {
            if let Some(c) = decode_entity(e)? {
                push_text(state, c.encode_utf8(&mut [0; 4]));
            }
        }
        Event::End(e) => match e.local_name().as_ref() {
            TAG_SPAN => process_span_end(state),
            TAG_P => handle_p_end(state, lines),
            _ => {}
        },
        _ => {}
    }
    Ok(())
}

/// 文本属于最内层打开的 span；不在任何 span 内时，属于行本身。
fn push_text(state: &mut TtmlParserState, text: &str) {
    if let Some(builder) = state.body_state.line_stack.last_mut() {
        match builder.span_stack.last_mut() {
            Some(span) => span.text.push_str(text),
            None => builder.text_buffer.push_str(text),
        }
    }
}

/// 进入一个 `<span>`，按角色压栈。
fn process_span_start(
    e: &BytesStart,
    state: &mut TtmlParserState,
    reader: &Reader<&[u8]>,
) -> Result<(), ConvertError> {
    let role = get_span_role(e, reader)?;
    let timing = get_timing_attributes(e, reader)?;
    let empty_beat_ms = get_string_attribute(e, reader, &[ATTR_EMPTY_BEAT, ATTR_EMPTY_BEAT_ALIAS])?
        .as_deref()
        .and_then(parse_empty_beat);
    let obscene = get_string_attribute(e, reader, &[ATTR_OBSCENE, ATTR_OBSCENE_ALIAS])?.as_deref()
        == Some("true");

    let Some(builder) = state.body_state.line_stack.last_mut() else {
        return Ok(());
    };
    if builder.span_stack.is_empty() {
        flush_text_word(builder);
    }

    if role == SpanRole::Background {
        let itunes_key = builder.itunes_key.clone();
        let is_duet = builder.line.is_duet;
        let mut background =
            new_line_builder(&state.metadata_state, itunes_key, true, timing.valid());
        background.line.is_duet = is_duet;
        state.body_state.line_stack.push(background);
        return Ok(());
    }

    let mut ctx = SpanContext::new(role, timing.or_zero());
    ctx.empty_beat_ms = empty_beat_ms;
    ctx.obscene = obscene;
    builder.span_stack.push(ctx);
    Ok(())
}

/// 处理 `</span>`：结束一个 span，或者结束一个背景人声行。
fn process_span_end(state: &mut TtmlParserState) {
    let line_stack = &mut state.body_state.line_stack;
    let Some(builder) = line_stack.last_mut() else {
        return;
    };

    if let Some(ctx) = builder.span_stack.pop() {
        finish_span(builder, ctx);
        return;
    }

    // 栈底是 <p> 本身，不会被 </span> 关闭
    if line_stack.len() > 1
        && let Some(background) = line_stack.pop()
    {
        let finished = finalize_line(background);
        if let Some(parent) = line_stack.last_mut() {
            parent.backgrounds.extend(finished);
        }
    }
}

fn finish_span(builder: &mut LineBuilder, ctx: SpanContext) {
    if let Some(parent) = builder.span_stack.last_mut() {
        parent.text.push_str(&ctx.text);
        return;
    }

    match ctx.role {
        SpanRole::Translation => {
            if builder.line.translated_lyric.is_none() {
                builder.line.translated_lyric = Some(ctx.text);
            }
        }
        SpanRole::Romanization => {
            if builder.line.roman_lyric.is_none() {
                builder.line.roman_lyric = Some(ctx.text);
            }
        }
        SpanRole::Generic => {
            if let Some((start_ms, end_ms)) = ctx.timing {
                let mut word = LyricWord::new(ctx.text, start_ms, end_ms);
                word.empty_beat_ms = ctx.empty_beat_ms;
                word.obscene = ctx.obscene;
                word.roman_word = take_roman_word(builder, start_ms, end_ms);
                builder.line.words.push(word);
            }
        }
        SpanRole::Background => {}
    }
}

/// 取出起止时间与单词完全相同的逐字罗马音。
#[allow(clippy::float_cmp)]
fn take_roman_word(builder: &mut LineBuilder, start_ms: f64, end_ms: f64) -> Option<String> {
    let index = builder
        .pending_roman_words
        .iter()
        .position(|roman| roman.start_ms == start_ms && roman.end_ms == end_ms)?;
    Some(builder.pending_roman_words.remove(index).text)
}

/// 把直接位于行内的文本变成一个单词。
///
/// 非空白文本使用整行的时间；纯空白文本占据上一个单词结束处的零长度位置。
fn flush_text_word(builder: &mut LineBuilder) {
    if builder.text_buffer.is_empty() {
        return;
    }
    let text = std::mem::take(&mut builder.text_buffer);
    let (start_ms, end_ms) = if text.trim().is_empty() {
        let at = builder
            .line
            .words
            .last()
            .map_or(builder.line.start_time_ms, |word| word.end_time_ms);
        (at, at)
    } else {
        (builder.line.start_time_ms, builder.line.end_time_ms)
    };
    builder
        .line
        .words
        .push(LyricWord::new(text, start_ms, end_ms));
}

/// 结束当前行，把它与其背景人声行写入输出。
pub(super) fn handle_p_end(state: &mut TtmlParserState, lines: &mut Vec<LyricLine>) {
    while let Some(builder) = state.body_state.line_stack.pop() {
        let discard = builder.discard;
        let finished = finalize_line(builder);
        match state.body_state.line_stack.last_mut() {
            Some(parent) => parent.backgrounds.extend(finished),
            None if !discard => lines.extend(finished),
            None => {}
        }
    }
}

/// 终结一行，返回这一行以及紧跟其后的背景人声行。
fn finalize_line(mut builder: LineBuilder) -> Vec<LyricLine> {
    flush_text_word(&mut builder);
    let mut line = builder.line;

    if !builder.has_explicit_timing {
        let mut timed = line.words.iter().filter(|word| !word.is_blank());
        let (start_ms, end_ms) = timed.next().map_or((0.0, 0.0), |first| {
            timed.fold((first.start_time_ms, first.end_time_ms), |(start, end), word| {
                (start.min(word.start_time_ms), end.max(word.end_time_ms))
            })
        });
        line.start_time_ms = start_ms;
        line.end_time_ms = end_ms;
    }

    if line.is_background {
        trim_background_parentheses(&mut line.words);
    }

    let mut finished = Vec::with_capacity(1 + builder.backgrounds.len());
    finished.push(line);
    finished.extend(builder.backgrounds);
    finished
}

/// 去掉背景人声首尾两个非空白单词上的括号。括号去掉后为空的单词会被移除。
fn trim_background_parentheses(words: &mut Vec<LyricWord>) {
    if let Some(first) = words.iter().position(|word| !word.is_blank())
        && let Some(rest) = words[first].text.strip_prefix(['(', '（'])
    {
        if rest.is_empty() {
            words.remove(first);
        } else {
            words[first].text = rest.to_string();
        }
    }

    if let Some(last) = words.iter().rposition(|word| !word.is_blank())
        && let Some(rest) = words[last].text.strip_suffix([')', '）'])
    {
        if rest.is_empty() {
            words.remove(last);
        } else {
            words[last].text = rest.to_string();
        }
    }
}
