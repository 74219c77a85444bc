//! 时间、属性与实体的解析辅助。

use std::str;

use amll_core::ConvertError;
use quick_xml::{
    Reader,
    escape::resolve_predefined_entity,
    events::{BytesRef, BytesStart},
};
use tracing::warn;

use super::{
    constants::{
        ATTR_BEGIN, ATTR_END, ATTR_ROLE, ATTR_ROLE_ALIAS, ROLE_BACKGROUND, ROLE_ROMANIZATION,
        ROLE_TRANSLATION,
    },
    state::SpanRole,
};

/// 把 TTML 时间值换算成毫秒。
///
/// 接受偏移形式 `12.345s` 与时钟形式 `[[HH:]MM:]SS[.f]`，小数部分最多三位。
/// 只有秒字段时秒数不受 60 的限制。
pub(super) fn parse_ttml_time_to_ms(time_str: &str) -> Result<u64, ConvertError> {
    let invalid = |reason: &str| ConvertError::InvalidTime(format!("{reason}: '{time_str}'"));

    if time_str.starts_with('-') {
        return Err(invalid("时间不能为负"));
    }

    if let Some(offset) = time_str.strip_suffix('s') {
        let (seconds, millis) =
            split_seconds(offset).ok_or_else(|| invalid("偏移时间格式无效"))?;
        return total_ms(0, 0, seconds, millis).ok_or_else(|| invalid("时间超出范围"));
    }

    let mut fields = time_str.rsplit(':');
    let (seconds, millis) = fields
        .next()
        .and_then(split_seconds)
        .ok_or_else(|| invalid("秒字段无效"))?;
    let minutes = match fields.next() {
        Some(field) => parse_digits(field)
            .filter(|minutes| *minutes < 60)
            .ok_or_else(|| invalid("分钟字段无效"))?,
        None => 0,
    };
    let hours = match fields.next() {
        Some(field) => parse_digits(field).ok_or_else(|| invalid("小时字段无效"))?,
        None => 0,
    };
    if fields.next().is_some() {
        return Err(invalid("时间字段过多"));
    }
    if time_str.contains(':') && seconds >= 60 {
        return Err(invalid("秒字段应小于 60"));
    }

    total_ms(hours, minutes, seconds, millis).ok_or_else(|| invalid("时间超出范围"))
}

fn total_ms(hours: u64, minutes: u64, seconds: u64, millis: u64) -> Option<u64> {
    hours
        .checked_mul(3_600_000)?
        .checked_add(minutes.checked_mul(60_000)?)?
        .checked_add(seconds.checked_mul(1000)?)?
        .checked_add(millis)
}

/// 纯数字字段，拒绝空串与符号。
fn parse_digits(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// 拆分 `SS` 或 `SS.f`，返回秒与毫秒。
fn split_seconds(field: &str) -> Option<(u64, u64)> {
    let (whole, fraction) = match field.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (field, None),
    };
    let seconds = parse_digits(whole)?;
    let millis = match fraction {
        None => 0,
        Some(fraction) if fraction.len() <= 3 => {
            // ".1" 是 100 毫秒
            let scale = u32::try_from(3 - fraction.len()).ok()?;
            parse_digits(fraction)? * 10u64.pow(scale)
        }
        Some(_) => return None,
    };
    Some((seconds, millis))
}

/// 去掉文本两端各一个括号（半角或全角），并去除首尾空白。
pub(super) fn trim_parentheses(text: &str) -> String {
    let trimmed = text.trim();
    let trimmed = trimmed
        .strip_prefix(['(', '（'])
        .unwrap_or(trimmed);
    let trimmed = trimmed.strip_suffix([')', '）']).unwrap_or(trimmed);
    trimmed.trim().to_string()
}

/// 依次尝试 `attr_names` 中的属性名（含别名），用 `processor` 转换第一个存在的值。
pub(super) fn get_attribute_with_aliases<T, F>(
    e: &BytesStart,
    reader: &Reader<&[u8]>,
    attr_names: &[&[u8]],
    processor: F,
) -> Result<Option<T>, ConvertError>
where
    F: Fn(&str) -> Result<T, ConvertError>,
{
    for &name in attr_names {
        if let Some(attr) = e.try_get_attribute(name)? {
            let value = attr.decode_and_unescape_value(reader.decoder())?;
            return processor(&value).map(Some);
        }
    }
    Ok(None)
}

/// 属性的原始字符串值。
pub(super) fn get_string_attribute(
    e: &BytesStart,
    reader: &Reader<&[u8]>,
    attr_names: &[&[u8]],
) -> Result<Option<String>, ConvertError> {
    get_attribute_with_aliases(e, reader, attr_names, |s| Ok(s.to_owned()))
}

/// 获取非空的字符串属性值。
pub(super) fn get_non_empty_attribute(
    e: &BytesStart,
    reader: &Reader<&[u8]>,
    attr_names: &[&[u8]],
) -> Result<Option<String>, ConvertError> {
    Ok(get_string_attribute(e, reader, attr_names)?.filter(|s| !s.is_empty()))
}

/// 根据 `ttm:role` 确定 `<span>` 的角色。
pub(super) fn get_span_role(
    e: &BytesStart,
    reader: &Reader<&[u8]>,
) -> Result<SpanRole, ConvertError> {
    Ok(
        get_attribute_with_aliases(e, reader, &[ATTR_ROLE, ATTR_ROLE_ALIAS], |s| {
            Ok(match s.as_bytes() {
                ROLE_TRANSLATION => SpanRole::Translation,
                ROLE_ROMANIZATION => SpanRole::Romanization,
                ROLE_BACKGROUND => SpanRole::Background,
                _ => SpanRole::Generic,
            })
        })?
        .unwrap_or(SpanRole::Generic),
    )
}

/// 元素上 `begin` / `end` 属性的状态。
#[derive(Debug, Clone, Copy, PartialEq)]
pub(super) enum TimingAttributes {
    /// 至少缺少其中一个属性。
    Missing,
    /// 两个属性都在，但至少有一个为空或无法解析。
    Invalid,
    Valid { start_ms: f64, end_ms: f64 },
}

impl TimingAttributes {
    /// 属性齐全时的起止时间。无法解析时记为 0。
    pub(super) const fn or_zero(self) -> Option<(f64, f64)> {
        match self {
            Self::Missing => None,
            Self::Invalid => Some((0.0, 0.0)),
            Self::Valid { start_ms, end_ms } => Some((start_ms, end_ms)),
        }
    }

    pub(super) const fn valid(self) -> Option<(f64, f64)> {
        match self {
            Self::Valid { start_ms, end_ms } => Some((start_ms, end_ms)),
            _ => None,
        }
    }
}

fn parse_time_value(value: &str) -> Option<f64> {
    if value.is_empty() {
        return None;
    }
    match parse_ttml_time_to_ms(value) {
        Ok(ms) => Some(ms as f64),
        Err(err) => {
            warn!("时间戳 '{value}' 解析失败 ({err})，该时间戳将被忽略。");
            None
        }
    }
}

/// 读取元素的 `begin` 和 `end` 属性。
pub(super) fn get_timing_attributes(
    e: &BytesStart,
    reader: &Reader<&[u8]>,
) -> Result<TimingAttributes, ConvertError> {
    let (Some(begin), Some(end)) = (
        get_string_attribute(e, reader, &[ATTR_BEGIN])?,
        get_string_attribute(e, reader, &[ATTR_END])?,
    ) else {
        return Ok(TimingAttributes::Missing);
    };

    Ok(
        match (parse_time_value(begin.trim()), parse_time_value(end.trim())) {
            (Some(start_ms), Some(end_ms)) => TimingAttributes::Valid { start_ms, end_ms },
            _ => TimingAttributes::Invalid,
        },
    )
}

/// 解析 `amll:empty-beat` 的值。无法解析的数字记为 NaN。
pub(super) fn parse_empty_beat(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some(value.parse::<f64>().unwrap_or(f64::NAN))
}

/// 解码一个 XML 实体引用。无法识别的实体返回 `None`。
pub(super) fn decode_entity(e: &BytesRef) -> Result<Option<char>, ConvertError> {
    let name = str::from_utf8(e.as_ref())
        .map_err(|err| ConvertError::Internal(format!("实体名不是有效的 UTF-8: {err}")))?;

    let decoded = match name.strip_prefix('#') {
        Some(reference) => match reference.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => reference.parse::<u32>().ok(),
        }
        .and_then(char::from_u32),
        None => resolve_predefined_entity(name).and_then(|text| text.chars().next()),
    };
    if decoded.is_none() {
        warn!("忽略无法识别的实体 '&{name};'");
    }
    Ok(decoded)
}
