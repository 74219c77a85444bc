use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::{AmlxError, FieldPath, Result};

bitflags! {
    /// 行级标记位。第 5 到 7 位保留。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct LineFlags: u8 {
        /// 背景人声
        const BACKGROUND     = 1 << 0;
        /// 对唱
        const DUET           = 1 << 1;
        const IGNORE_SYNC    = 1 << 2;
        /// 后面跟着翻译的字符串 ID
        const HAS_TRANSLATED = 1 << 3;
        /// 后面跟着行级罗马音的字符串 ID
        const HAS_ROMAN      = 1 << 4;
    }
}

bitflags! {
    /// 单词级标记位。第 4 到 7 位保留。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct WordFlags: u8 {
        const OBSCENE        = 1 << 0;
        /// 后面跟着空拍时长
        const HAS_EMPTY_BEAT = 1 << 1;
        /// 后面跟着单词罗马音的字符串 ID
        const HAS_ROMAN_WORD = 1 << 2;
        const ROMAN_WARNING  = 1 << 3;
    }
}

impl LineFlags {
    /// 解析行标记字节。任何保留位被设置都会被拒绝。
    pub fn from_byte(byte: u8, at: FieldPath) -> Result<Self> {
        Self::from_bits(byte).ok_or(AmlxError::UnsupportedReservedFlag {
            at,
            reserved: byte & !Self::all().bits(),
        })
    }
}

impl WordFlags {
    /// 解析单词标记字节。任何保留位被设置都会被拒绝。
    pub fn from_byte(byte: u8, at: FieldPath) -> Result<Self> {
        Self::from_bits(byte).ok_or(AmlxError::UnsupportedReservedFlag {
            at,
            reserved: byte & !Self::all().bits(),
        })
    }
}
