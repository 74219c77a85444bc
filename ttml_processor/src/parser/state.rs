//! 解析过程中跨事件保留的状态。

use std::collections::HashMap;

use amll_core::{DEFAULT_MAIN_AGENT, LyricLine, MetadataEntry};

/// 一次解析的全部可变状态。
#[derive(Debug)]
pub(super) struct TtmlParserState {
    /// 主演唱者的代理 ID。`<p>` 的 `ttm:agent` 与之不同时即为对唱行。
    pub(super) main_agent: String,
    /// 是否已经从 `<ttm:agent type="person">` 中确定了主代理。
    pub(super) main_agent_declared: bool,
    pub(super) in_metadata: bool,
    pub(super) metadata_state: MetadataParseState,
    pub(super) body_state: BodyParseState,
}

impl Default for TtmlParserState {
    fn default() -> Self {
        Self {
            main_agent: DEFAULT_MAIN_AGENT.to_string(),
            main_agent_declared: false,
            in_metadata: false,
            metadata_state: MetadataParseState::default(),
            body_state: BodyParseState::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum AuxTrackType {
    Translation,
    Romanization,
}

/// 当前位于 `<metadata>` 的哪一层。
#[derive(Debug, Default)]
pub(super) enum MetadataContext {
    #[default]
    None,
    InITunesMetadata,
    InSongwriter,
    /// `<translations>` / `<transliterations>`
    InAuxiliaryContainer { aux_type: AuxTrackType },
    /// `<translation>` / `<transliteration>`
    InAuxiliaryEntry { aux_type: AuxTrackType },
    InAuxiliaryText {
        aux_type: AuxTrackType,
        /// `for` 属性指向的 `itunes:key`
        key: Option<String>,
    },
}

/// 一行的主歌词与背景人声对应的文本。
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub(super) struct LineText {
    pub(super) main: Option<String>,
    pub(super) background: Option<String>,
}

impl LineText {
    pub(super) fn for_line(&self, is_background: bool) -> Option<String> {
        if is_background {
            self.background.clone()
        } else {
            self.main.clone()
        }
    }
}

/// 带时间戳的逐字罗马音，按起止时间与正文单词匹配。
#[derive(Debug, Clone, PartialEq)]
pub(super) struct RomanWord {
    pub(super) start_ms: f64,
    pub(super) end_ms: f64,
    pub(super) text: String,
}

#[derive(Debug, Default, Clone)]
pub(super) struct WordRomanization {
    pub(super) main: Vec<RomanWord>,
    pub(super) background: Vec<RomanWord>,
}

/// 正在解析的 `<text for="...">` 的累积内容。
#[derive(Debug, Default)]
pub(super) struct AuxTextData {
    pub(super) main_text: String,
    pub(super) background_text: String,
    pub(super) span_stack: Vec<SpanContext>,
    pub(super) main_words: Vec<RomanWord>,
    pub(super) background_words: Vec<RomanWord>,
    pub(super) is_word_by_word: bool,
}

/// `<metadata>` 中收集到的内容。
#[derive(Debug, Default)]
pub(super) struct MetadataParseState {
    /// 按键首次出现的顺序分组的 `amll:meta`。
    pub(super) entries: Vec<MetadataEntry>,
    pub(super) songwriters: Vec<String>,
    pub(super) translations: HashMap<String, LineText>,
    pub(super) line_romanizations: HashMap<String, LineText>,
    pub(super) word_romanizations: HashMap<String, WordRomanization>,

    pub(super) context: MetadataContext,
    pub(super) aux_text: Option<AuxTextData>,
    pub(super) text_buffer: String,
}

#[derive(Debug, Default)]
pub(super) struct BodyParseState {
    pub(super) in_body: bool,
    /// 当前 `<p>` 及其内部嵌套的背景人声行。栈底是 `<p>` 本身。
    pub(super) line_stack: Vec<LineBuilder>,
}

impl BodyParseState {
    pub(super) const fn in_p(&self) -> bool {
        !self.line_stack.is_empty()
    }
}

/// 正在构建的一行歌词。
#[derive(Debug, Default)]
pub(super) struct LineBuilder {
    pub(super) line: LyricLine,
    /// `<p>` 缺少 `begin` 或 `end` 属性，整行会被丢弃。
    pub(super) discard: bool,
    /// 行的起止时间是否来自属性。否则由单词的时间推算。
    pub(super) has_explicit_timing: bool,
    pub(super) itunes_key: Option<String>,
    /// 尚未被匹配的逐字罗马音。
    pub(super) pending_roman_words: Vec<RomanWord>,
    pub(super) span_stack: Vec<SpanContext>,
    /// 直接位于行内、尚未形成单词的文本。
    pub(super) text_buffer: String,
    /// 已经完成的背景人声行，会紧跟在本行之后输出。
    pub(super) backgrounds: Vec<LyricLine>,
}

/// 一个尚未闭合的 `<span>`。
#[derive(Debug, Clone)]
pub(super) struct SpanContext {
    pub(super) role: SpanRole,
    /// `begin` 与 `end` 同时存在时的起止时间。
    pub(super) timing: Option<(f64, f64)>,
    pub(super) empty_beat_ms: Option<f64>,
    pub(super) obscene: bool,
    /// span 内的全部文本，包括嵌套 span 的文本。
    pub(super) text: String,
    pub(super) has_timed_child: bool,
}

impl SpanContext {
    pub(super) const fn new(role: SpanRole, timing: Option<(f64, f64)>) -> Self {
        Self {
            role,
            timing,
            empty_beat_ms: None,
            obscene: false,
            text: String::new(),
            has_timed_child: false,
        }
    }
}

/// 由 `ttm:role` 决定的 span 类别。没有角色的 span 是音节。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SpanRole {
    Generic,
    /// `x-translation`
    Translation,
    /// `x-roman`
    Romanization,
    /// `x-bg`
    Background,
}
