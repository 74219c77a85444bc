//! 时间格式化与原样写入片段的辅助。

use amll_core::ConvertError;
use quick_xml::{
    Writer,
    events::{BytesText, Event},
};

/// 将毫秒时间戳格式化为 TTML 时间字符串。
///
/// 不足一小时输出 `mm:ss.mmm`，否则输出 `hh:mm:ss.mmm`。
/// 非有限值与负数输出为零。
/// 例如：123456ms -> "02:03.456"
#[must_use]
pub fn format_ttml_time(ms: f64) -> String {
    let ms = if ms.is_finite() && ms > 0.0 {
        ms.round() as u64
    } else {
        0
    };
    let hours = ms / 3_600_000;
    let minutes = (ms % 3_600_000) / 60_000;
    let seconds = (ms % 60_000) / 1000;
    let millis = ms % 1000;

    if hours > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
    } else {
        format!("{minutes:02}:{seconds:02}.{millis:03}")
    }
}

/// 在不缩进的写入器中渲染一段内容，返回 XML 片段。
///
/// `<p>` 等混合内容元素的内容总是经由这里紧凑输出。
pub(super) fn render_compact<F>(render: F) -> Result<String, ConvertError>
where
    F: FnOnce(&mut Writer<Vec<u8>>) -> Result<(), ConvertError>,
{
    let mut writer = Writer::new(Vec::new());
    render(&mut writer)?;
    Ok(String::from_utf8(writer.into_inner())?)
}

/// 将已经转义过的 XML 片段原样写入。
///
/// 以文本事件写入，缩进写入器不会在片段前后插入换行，空片段同样如此。
pub(super) fn write_raw_fragment<W: std::io::Write>(
    writer: &mut Writer<W>,
    fragment: &str,
) -> std::io::Result<()> {
    writer.write_event(Event::Text(BytesText::from_escaped(fragment)))
}
