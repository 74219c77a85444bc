use std::{fmt, path::Path};

use serde::{Deserialize, Serialize};
use strum_macros::{EnumIter, EnumString};

/// 支持的文档格式。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, EnumIter, Serialize, Deserialize, Default,
)]
#[strum(ascii_case_insensitive)]
pub enum DocumentFormat {
    /// AMLL 风格的 TTML 歌词。
    #[default]
    Ttml,
    /// AMLX 二进制格式。
    Amlx,
    /// 歌词文档模型的 JSON 转储，仅用于输出。
    Json,
}

impl DocumentFormat {
    /// 该格式的默认扩展名。
    #[must_use]
    pub const fn to_extension_str(self) -> &'static str {
        match self {
            Self::Ttml => "ttml",
            Self::Amlx => "amlx",
            Self::Json => "json",
        }
    }

    /// 由扩展名或用户输入识别格式，忽略大小写、空格与点。
    #[must_use]
    pub fn from_string(s: &str) -> Option<Self> {
        let normalized_s = s.to_uppercase().replace([' ', '.'], "");
        match normalized_s.as_str() {
            "TTML" | "XML" => Some(Self::Ttml),
            "AMLX" | "BIN" => Some(Self::Amlx),
            "JSON" => Some(Self::Json),
            _ => None,
        }
    }

    /// 根据文件扩展名推断格式。
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_string)
    }

    /// 是否能作为输入被读取。
    #[must_use]
    pub const fn is_readable(self) -> bool {
        matches!(self, Self::Ttml | Self::Amlx)
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ttml => write!(f, "TTML"),
            Self::Amlx => write!(f, "AMLX"),
            Self::Json => write!(f, "JSON"),
        }
    }
}
