use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// 未指定时使用的翻译语言。
pub const DEFAULT_TRANSLATION_LANGUAGE: &str = "zh-CN";
/// 文档未声明人声代理时使用的主代理 ID。
pub const DEFAULT_MAIN_AGENT: &str = "v1";

/// TTML 解析选项
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TtmlParsingOptions {
    /// 文档中没有 `type="person"` 的 `ttm:agent` 时，视为主演唱者的代理 ID。
    #[serde(default = "default_main_agent")]
    pub default_main_agent: String,
}

fn default_main_agent() -> String {
    DEFAULT_MAIN_AGENT.to_string()
}

impl Default for TtmlParsingOptions {
    fn default() -> Self {
        Self {
            default_main_agent: default_main_agent(),
        }
    }
}

/// TTML 生成选项
#[derive(Debug, Clone, Serialize, Deserialize, Builder)]
#[builder(setter(into), default)]
pub struct TtmlGenerationOptions {
    /// 是否输出格式化（缩进）的 TTML 文件。
    pub format: bool,
    /// 内联翻译 `<span>` 的 `xml:lang`。
    pub translation_language: String,
}

impl Default for TtmlGenerationOptions {
    fn default() -> Self {
        Self {
            format: false,
            translation_language: DEFAULT_TRANSLATION_LANGUAGE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_builder_defaults() {
        let options = TtmlGenerationOptionsBuilder::default()
            .format(true)
            .build()
            .unwrap();
        assert!(options.format);
        assert_eq!(options.translation_language, "zh-CN");
    }

    #[test]
    fn test_parsing_options_missing_field_uses_default() {
        let options: TtmlParsingOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options.default_main_agent, "v1");
    }
}
