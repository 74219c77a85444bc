//! `<metadata>` 与 `<p>` 之外的事件。
//!
//! 该模块负责 `<p>` 与 `<metadata>` 之外的顶层事件分发。

use amll_core::ConvertError;
use quick_xml::{Reader, events::Event};

use super::{
    body,
    constants::{TAG_AGENT_TTM, TAG_BODY, TAG_META_AMLL, TAG_METADATA, TAG_P},
    metadata,
    state::TtmlParserState,
};

/// 处理不在行内也不在元数据内的事件。
/// 主要负责识别 metadata、body 和 p 的开始，并相应地更新状态。
pub(super) fn handle_global_event(
    event: &Event<'_>,
    state: &mut TtmlParserState,
    reader: &Reader<&[u8]>,
) -> Result<(), ConvertError> {
    match event {
        Event::Start(e) => match e.local_name().as_ref() {
            TAG_METADATA => state.in_metadata = true,
            TAG_BODY => state.body_state.in_body = true,
            TAG_P if state.body_state.in_body => body::process_p_start(e, reader, state)?,
            // 不在 <metadata> 中的代理与元数据同样有效
            _ => match e.name().as_ref() {
                TAG_AGENT_TTM => metadata::process_agent_start(e, reader, state)?,
                TAG_META_AMLL => {
                    metadata::process_meta_start(e, reader, &mut state.metadata_state)?;
                }
                _ => {}
            },
        },
        Event::End(e) if e.local_name().as_ref() == TAG_BODY => {
            state.body_state.in_body = false;
        }
        _ => {}
    }
    Ok(())
}
