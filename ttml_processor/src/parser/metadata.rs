//! `<head>/<metadata>` 的解析：代理、歌曲元数据、词作者与辅助轨道。
//!
//! 该模块包含了所有用于解析 TTML 文件中 `<metadata>` 块的函数：
//! 演唱者代理、`amll:meta` 元数据以及 `<iTunesMetadata>` 中的
//! 词作者、逐行翻译和罗马音。

use amll_core::{ConvertError, MetadataEntry};
use quick_xml::{
    Reader,
    events::{BytesEnd, BytesStart, Event},
};

use super::{
    constants::{
        AGENT_TYPE_PERSON, ATTR_FOR, ATTR_KEY, ATTR_TYPE, ATTR_VALUE, ATTR_XML_ID,
        SONGWRITER_KEY, TAG_AGENT, TAG_AGENT_TTM, TAG_ITUNES_METADATA, TAG_META, TAG_META_AMLL,
        TAG_METADATA, TAG_SONGWRITER, TAG_SPAN, TAG_TEXT, TAG_TRANSLATION, TAG_TRANSLATIONS,
        TAG_TRANSLITERATION, TAG_TRANSLITERATIONS,
    },
    state::{
        AuxTextData, AuxTrackType, LineText, MetadataContext, MetadataParseState, RomanWord,
        SpanContext, SpanRole, TtmlParserState, WordRomanization,
    },
    utils::{
        decode_entity, get_non_empty_attribute, get_span_role, get_string_attribute,
        get_timing_attributes, trim_parentheses,
    },
};

/// 分发 `<metadata>` 内的一个事件。
pub(super) fn handle_metadata_event(
    event: &Event,
    reader: &Reader<&[u8]>,
    state: &mut TtmlParserState,
) -> Result<(), ConvertError> {
    match event {
        Event::Start(e) => handle_metadata_start_tag(e, reader, state),
        Event::Text(e) => {
            let text = e.xml_content().map_err(ConvertError::new_parse)?;
            handle_metadata_text(&text, &mut state.metadata_state);
            Ok(())
        }
        Event::GeneralRef(e) => {
            if let Some(c) = decode_entity(e)? {
                handle_metadata_text(c.encode_utf8(&mut [0; 4]), &mut state.metadata_state);
            }
            Ok(())
        }
        Event::End(e) => {
            handle_metadata_end_tag(e, state);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// `<metadata>` 内的开始标签。
fn handle_metadata_start_tag(
    e: &BytesStart,
    reader: &Reader<&[u8]>,
    state: &mut TtmlParserState,
) -> Result<(), ConvertError> {
    match e.name().as_ref() {
        TAG_AGENT | TAG_AGENT_TTM => process_agent_start(e, reader, state)?,
        TAG_META | TAG_META_AMLL => process_meta_start(e, reader, &mut state.metadata_state)?,
        name => {
            let meta_state = &mut state.metadata_state;
            match (name, &meta_state.context) {
                (TAG_ITUNES_METADATA, _) => meta_state.context = MetadataContext::InITunesMetadata,
                (TAG_SONGWRITER, MetadataContext::InITunesMetadata) => {
                    meta_state.text_buffer.clear();
                    meta_state.context = MetadataContext::InSongwriter;
                }
                (TAG_TRANSLATIONS, MetadataContext::InITunesMetadata) => {
                    meta_state.context = MetadataContext::InAuxiliaryContainer {
                        aux_type: AuxTrackType::Translation,
                    };
                }
                (TAG_TRANSLITERATIONS, MetadataContext::InITunesMetadata) => {
                    meta_state.context = MetadataContext::InAuxiliaryContainer {
                        aux_type: AuxTrackType::Romanization,
                    };
                }
                (
                    TAG_TRANSLATION | TAG_TRANSLITERATION,
                    &MetadataContext::InAuxiliaryContainer { aux_type },
                ) => {
                    meta_state.context = MetadataContext::InAuxiliaryEntry { aux_type };
                }
                (TAG_TEXT, &MetadataContext::InAuxiliaryEntry { aux_type }) => {
                    let key = get_non_empty_attribute(e, reader, &[ATTR_FOR])?;
                    meta_state.context = MetadataContext::InAuxiliaryText { aux_type, key };
                    meta_state.aux_text = Some(AuxTextData::default());
                }
                (TAG_SPAN, MetadataContext::InAuxiliaryText { .. }) => {
                    let role = get_span_role(e, reader)?;
                    let timing = get_timing_attributes(e, reader)?.or_zero();
                    if let Some(aux) = meta_state.aux_text.as_mut() {
                        aux.span_stack.push(SpanContext::new(role, timing));
                    }
                }
                _ => {}
            }
        }
    }
    Ok(())
}

/// 处理 `<metadata>` 块内部的文本。
fn handle_metadata_text(text: &str, meta_state: &mut MetadataParseState) {
    match meta_state.context {
        MetadataContext::InSongwriter => meta_state.text_buffer.push_str(text),
        MetadataContext::InAuxiliaryText { .. } => {
            if let Some(aux) = meta_state.aux_text.as_mut() {
                match aux.span_stack.last_mut() {
                    Some(span) => span.text.push_str(text),
                    None => aux.main_text.push_str(text),
                }
            }
        }
        _ => {}
    }
}

/// `<metadata>` 内的结束标签。
fn handle_metadata_end_tag(e: &BytesEnd, state: &mut TtmlParserState) {
    let meta_state = &mut state.metadata_state;
    let context = std::mem::take(&mut meta_state.context);

    meta_state.context = match (e.name().as_ref(), context) {
        (TAG_METADATA, _) => {
            state.in_metadata = false;
            meta_state.aux_text = None;
            MetadataContext::None
        }
        (TAG_SONGWRITER, MetadataContext::InSongwriter) => {
            let name = meta_state.text_buffer.trim();
            if !name.is_empty() {
                meta_state.songwriters.push(name.to_string());
            }
            meta_state.text_buffer.clear();
            MetadataContext::InITunesMetadata
        }
        (TAG_SPAN, MetadataContext::InAuxiliaryText { aux_type, key }) => {
            if let Some(aux) = meta_state.aux_text.as_mut() {
                finish_aux_span(aux, aux_type);
            }
            MetadataContext::InAuxiliaryText { aux_type, key }
        }
        (TAG_TEXT, MetadataContext::InAuxiliaryText { aux_type, key }) => {
            finish_aux_text(meta_state, aux_type, key);
            MetadataContext::InAuxiliaryEntry { aux_type }
        }
        (TAG_TRANSLATION | TAG_TRANSLITERATION, MetadataContext::InAuxiliaryEntry { aux_type }) => {
            MetadataContext::InAuxiliaryContainer { aux_type }
        }
        (TAG_TRANSLATIONS | TAG_TRANSLITERATIONS, MetadataContext::InAuxiliaryContainer { .. }) => {
            MetadataContext::InITunesMetadata
        }
        (TAG_ITUNES_METADATA, _) => MetadataContext::None,
        (_, context) => context,
    };
}

/// 处理 `<ttm:agent>`：第一个带 `xml:id` 的 `type="person"` 代理即为主演唱者。
pub(super) fn process_agent_start(
    e: &BytesStart,
    reader: &Reader<&[u8]>,
    state: &mut TtmlParserState,
) -> Result<(), ConvertError> {
    if state.main_agent_declared {
        return Ok(());
    }
    let agent_type = get_string_attribute(e, reader, &[ATTR_TYPE])?;
    if agent_type.as_deref() != Some(AGENT_TYPE_PERSON) {
        return Ok(());
    }
    if let Some(id) = get_non_empty_attribute(e, reader, &[ATTR_XML_ID])? {
        state.main_agent = id;
        state.main_agent_declared = true;
    }
    Ok(())
}

/// 处理 `<amll:meta key="..." value="...">`，按键首次出现的顺序分组。
pub(super) fn process_meta_start(
    e: &BytesStart,
    reader: &Reader<&[u8]>,
    meta_state: &mut MetadataParseState,
) -> Result<(), ConvertError> {
    let (Some(key), Some(value)) = (
        get_non_empty_attribute(e, reader, &[ATTR_KEY])?,
        get_non_empty_attribute(e, reader, &[ATTR_VALUE])?,
    ) else {
        return Ok(());
    };

    match meta_state.entries.iter_mut().find(|entry| entry.key == key) {
        Some(entry) => entry.values.push(value),
        None => meta_state.entries.push(MetadataEntry::new(key, [value])),
    }
    Ok(())
}

/// `<text>` 内的一个 `<span>` 结束。
fn finish_aux_span(aux: &mut AuxTextData, aux_type: AuxTrackType) {
    let Some(ctx) = aux.span_stack.pop() else {
        return;
    };
    let in_background = aux
        .span_stack
        .iter()
        .any(|span| span.role == SpanRole::Background);

    if let Some(parent) = aux.span_stack.last_mut() {
        parent.text.push_str(&ctx.text);
    }

    if aux_type == AuxTrackType::Romanization
        && ctx.role != SpanRole::Background
        && let Some((start_ms, end_ms)) = ctx.timing
    {
        if in_background {
            aux.background_words.push(RomanWord {
                start_ms,
                end_ms,
                text: trim_parentheses(&ctx.text),
            });
            if let Some(background) = aux
                .span_stack
                .iter_mut()
                .rev()
                .find(|span| span.role == SpanRole::Background)
            {
                background.has_timed_child = true;
            }
            aux.is_word_by_word = true;
        } else if aux.span_stack.is_empty() {
            aux.main_words.push(RomanWord {
                start_ms,
                end_ms,
                text: ctx.text.clone(),
            });
            aux.is_word_by_word = true;
        }
    }

    // 逐字的背景罗马音不再计入逐行罗马音
    if ctx.role == SpanRole::Background
        && aux.span_stack.is_empty()
        && (aux_type == AuxTrackType::Translation || !ctx.has_timed_child)
    {
        aux.background_text.push_str(&ctx.text);
    }
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

/// `<text for="...">` 结束，将累积的内容登记到对应的表中。
fn finish_aux_text(
    meta_state: &mut MetadataParseState,
    aux_type: AuxTrackType,
    key: Option<String>,
) {
    let (Some(aux), Some(key)) = (meta_state.aux_text.take(), key) else {
        return;
    };

    let line_text = LineText {
        main: non_empty(aux.main_text.trim().to_string()),
        background: non_empty(trim_parentheses(&aux.background_text)),
    };
    let has_line_text = line_text != LineText::default();

    match aux_type {
        AuxTrackType::Translation => {
            if has_line_text {
                meta_state.translations.insert(key, line_text);
            }
        }
        AuxTrackType::Romanization => {
            if aux.is_word_by_word {
                meta_state.word_romanizations.insert(
                    key.clone(),
                    WordRomanization {
                        main: aux.main_words,
                        background: aux.background_words,
                    },
                );
            }
            if has_line_text {
                meta_state.line_romanizations.insert(key, line_text);
            }
        }
    }
}

/// 汇总最终的元数据列表，词作者排在最后。
pub(super) fn take_metadata(meta_state: &mut MetadataParseState) -> Vec<MetadataEntry> {
    let mut entries = std::mem::take(&mut meta_state.entries);
    if !meta_state.songwriters.is_empty() {
        entries.push(MetadataEntry::new(
            SONGWRITER_KEY,
            std::mem::take(&mut meta_state.songwriters),
        ));
    }
    entries
}
