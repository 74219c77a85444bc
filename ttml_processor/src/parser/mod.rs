//! AMLL 风格 TTML 歌词的解析器。
//!
//! 只理解 AMLL 与 Apple Music 歌词所用的 TTML 子集，不处理通用字幕文件。

mod body;
mod constants;
mod handlers;
mod metadata;
mod state;
mod utils;

use amll_core::{ConvertError, IdGenerator, LyricDocument, LyricLine, TtmlParsingOptions};
use quick_xml::{Reader, events::Event};
use tracing::{debug, error};

use self::state::TtmlParserState;

/// 把 TTML 文本解析为 [`LyricDocument`]。
///
/// # 参数
///
/// * `content` - 完整的 TTML 文本。
/// * `options` - TTML 解析选项。
///
/// # 返回
///
/// * `Ok(LyricDocument)` - 成功解析后的歌词文档。行与单词的 ID 按文档顺序从 1 开始分配。
/// * `Err(ConvertError)` - 输入无法作为 XML 读取。
///
/// # Errors
///
/// * `ConvertError::Xml` - XML 结构错误
/// * `ConvertError::Attribute` - 当标签属性无法解析时
///
/// 无法解析的时间戳不会导致失败，只会记录一条警告。
pub fn parse_ttml(
    content: &str,
    options: &TtmlParsingOptions,
) -> Result<LyricDocument, ConvertError> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);
    reader.config_mut().expand_empty_elements = true;

    let mut lines: Vec<LyricLine> = Vec::with_capacity(content.matches("<p").count());

    let mut state = TtmlParserState {
        main_agent: options.default_main_agent.clone(),
        ..Default::default()
    };
    let mut buf = Vec::new();

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(Event::Eof) => break,
            Ok(event) => event,
            Err(e) => {
                error!(
                    "TTML 解析错误，位置 {}: {}。无法继续解析",
                    reader.error_position(),
                    e
                );
                return Err(ConvertError::Xml(e));
            }
        };

        if state.in_metadata {
            metadata::handle_metadata_event(&event, &reader, &mut state)?;
        } else if state.body_state.in_p() {
            body::handle_p_event(&event, &mut state, &reader, &mut lines)?;
        } else {
            handlers::handle_global_event(&event, &mut state, &reader)?;
        }

        buf.clear();
    }

    let mut ids = IdGenerator::new();
    for line in &mut lines {
        line.id = ids.next_id();
        for word in &mut line.words {
            word.id = ids.next_id();
        }
    }

    let document = LyricDocument::new(metadata::take_metadata(&mut state.metadata_state), lines);
    debug!(
        "TTML 解析完成：{} 条元数据，{} 行，{} 个单词，主演唱者 {}",
        document.metadata.len(),
        document.lines.len(),
        document.word_count(),
        state.main_agent
    );
    Ok(document)
}
