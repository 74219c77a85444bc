//! AMLX 编解码过程中的错误类型。
//!
//! 每个错误都会中止整个编码或解码调用，并携带出错字段的路径，
//! 例如 `line[3].word[1].text_string_id`，以便定位具体记录。

use std::fmt;

use amll_core::ConvertError;
use strum_macros::{Display, EnumIter};
use thiserror::Error;

/// 出错字段所在的记录。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// 容器本身（前导区或段级计数）。
    Root,
    /// 第 `i` 条元数据。
    Metadata(usize),
    /// 第 `i` 条元数据的第 `j` 个值。
    MetadataValue(usize, usize),
    /// 字符串池中的第 `i` 个字符串。
    PoolString(usize),
    /// 第 `i` 行。
    Line(usize),
    /// 第 `i` 行的第 `j` 个单词。
    Word(usize, usize),
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => Ok(()),
            Self::Metadata(i) => write!(f, "metadata[{i}]"),
            Self::MetadataValue(i, j) => write!(f, "metadata[{i}].value[{j}]"),
            Self::PoolString(i) => write!(f, "string[{i}]"),
            Self::Line(i) => write!(f, "line[{i}]"),
            Self::Word(i, j) => write!(f, "line[{i}].word[{j}]"),
        }
    }
}

/// 字段路径：记录 + 字段名。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldPath {
    pub scope: Scope,
    pub field: &'static str,
}

impl FieldPath {
    #[must_use]
    pub const fn new(scope: Scope, field: &'static str) -> Self {
        Self { scope, field }
    }

    #[must_use]
    pub const fn root(field: &'static str) -> Self {
        Self::new(Scope::Root, field)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Scope::Root => f.write_str(self.field),
            scope => write!(f, "{scope}.{}", self.field),
        }
    }
}

/// AMLX 编解码错误。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmlxError {
    /// 魔数不是 `AMLX`。
    #[error("无效的魔数: {found:02X?}")]
    InvalidMagic { found: [u8; 4] },

    /// 不支持的格式版本。
    #[error("不支持的版本: {found}")]
    UnsupportedVersion { found: u8 },

    /// 字段尚未读完，输入就已结束。
    #[error("{at}: 输入在偏移 {offset} 处意外结束")]
    TruncatedInput { at: FieldPath, offset: usize },

    /// 某个段在声明的内容之后还有未消费的字节。
    #[error("{at}: 存在 {remaining} 个多余的尾随字节")]
    TrailingBytes { at: FieldPath, remaining: usize },

    /// 字符串 ID 超出字符串池范围。
    #[error("{at}: 字符串 ID {index} 越界（字符串池大小 {pool_size}）")]
    StringIndexOutOfBounds {
        at: FieldPath,
        index: u64,
        pool_size: usize,
    },

    /// 行或单词标记字节中设置了保留位。
    #[error("{at}: 设置了保留标记位 0x{reserved:02x}")]
    UnsupportedReservedFlag { at: FieldPath, reserved: u8 },

    /// 解码出的行结束时间早于开始时间。
    #[error("{at}: 结束时间 {end} 早于开始时间 {start}")]
    LineTimingRegression { at: FieldPath, start: u64, end: u64 },

    /// 时间值超过格式的时间上限，或加法溢出。
    #[error("{at}: 时间值溢出")]
    TimingOverflow { at: FieldPath },

    /// 编码时遇到非有限或负的时间值。
    #[error("{at}: 无效的时间值 {value}")]
    InvalidTiming { at: FieldPath, value: f64 },

    /// 字符串池中的字节不是合法的 UTF-8。
    #[error("{at}: 不是合法的 UTF-8 (有效长度 {valid_up_to})")]
    InvalidUtf8 { at: FieldPath, valid_up_to: usize },

    /// 变长整数超过 64 位。
    #[error("{at}: 变长整数在偏移 {offset} 处溢出")]
    VarintOverflow { at: FieldPath, offset: usize },

    /// 编码器内部不变量被破坏。
    #[error("{at}: 内部错误: {message}")]
    Internal { at: FieldPath, message: String },
}

/// 不带上下文的错误种类。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum AmlxErrorKind {
    InvalidMagic,
    UnsupportedVersion,
    TruncatedInput,
    TrailingBytes,
    StringIndexOutOfBounds,
    UnsupportedReservedFlag,
    LineTimingRegression,
    TimingOverflow,
    InvalidTiming,
    InvalidUtf8,
    VarintOverflow,
    Internal,
}

impl AmlxError {
    #[must_use]
    pub const fn kind(&self) -> AmlxErrorKind {
        match self {
            Self::InvalidMagic { .. } => AmlxErrorKind::InvalidMagic,
            Self::UnsupportedVersion { .. } => AmlxErrorKind::UnsupportedVersion,
            Self::TruncatedInput { .. } => AmlxErrorKind::TruncatedInput,
            Self::TrailingBytes { .. } => AmlxErrorKind::TrailingBytes,
            Self::StringIndexOutOfBounds { .. } => AmlxErrorKind::StringIndexOutOfBounds,
            Self::UnsupportedReservedFlag { .. } => AmlxErrorKind::UnsupportedReservedFlag,
            Self::LineTimingRegression { .. } => AmlxErrorKind::LineTimingRegression,
            Self::TimingOverflow { .. } => AmlxErrorKind::TimingOverflow,
            Self::InvalidTiming { .. } => AmlxErrorKind::InvalidTiming,
            Self::InvalidUtf8 { .. } => AmlxErrorKind::InvalidUtf8,
            Self::VarintOverflow { .. } => AmlxErrorKind::VarintOverflow,
            Self::Internal { .. } => AmlxErrorKind::Internal,
        }
    }

    /// 出错字段的路径。前导区的魔数与版本错误没有路径。
    #[must_use]
    pub const fn field_path(&self) -> Option<FieldPath> {
        match self {
            Self::InvalidMagic { .. } | Self::UnsupportedVersion { .. } => None,
            Self::TruncatedInput { at, .. }
            | Self::TrailingBytes { at, .. }
            | Self::StringIndexOutOfBounds { at, .. }
            | Self::UnsupportedReservedFlag { at, .. }
            | Self::LineTimingRegression { at, .. }
            | Self::TimingOverflow { at }
            | Self::InvalidTiming { at, .. }
            | Self::InvalidUtf8 { at, .. }
            | Self::VarintOverflow { at, .. }
            | Self::Internal { at, .. } => Some(*at),
        }
    }
}

pub type Result<T, E = AmlxError> = std::result::Result<T, E>;

/// 标记层与二进制层之间桥接函数的错误。
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("标记层错误: {0}")]
    Markup(#[from] ConvertError),
    #[error("二进制编解码错误: {0}")]
    Codec(#[from] AmlxError),
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn test_field_path_rendering() {
        assert_eq!(
            FieldPath::new(Scope::Word(3, 1), "text_string_id").to_string(),
            "line[3].word[1].text_string_id"
        );
        assert_eq!(
            FieldPath::new(Scope::MetadataValue(0, 2), "string_id").to_string(),
            "metadata[0].value[2].string_id"
        );
        assert_eq!(FieldPath::root("header_size").to_string(), "header_size");
    }

    #[test]
    fn test_error_message_carries_path() {
        let err = AmlxError::StringIndexOutOfBounds {
            at: FieldPath::new(Scope::Line(2), "translated_string_id"),
            index: 5,
            pool_size: 5,
        };
        let message = err.to_string();
        assert!(message.starts_with("line[2].translated_string_id"));
        assert_eq!(err.kind(), AmlxErrorKind::StringIndexOutOfBounds);
        assert_eq!(err.kind().to_string(), "StringIndexOutOfBounds");
    }

    #[test]
    fn test_kind_names_are_unique() {
        let names: std::collections::HashSet<String> =
            AmlxErrorKind::iter().map(|k| k.to_string()).collect();
        assert_eq!(names.len(), AmlxErrorKind::iter().count());
    }
}
