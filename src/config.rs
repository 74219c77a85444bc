//! 工具的持久化配置。

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use amll_core::{DEFAULT_TRANSLATION_LANGUAGE, TtmlGenerationOptions};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

const CONFIG_FILE_NAME: &str = "config.toml";

/// 默认的单个输入文件大小上限：64 MiB。
pub const DEFAULT_MAX_INPUT_BYTES: u64 = 64 * 1024 * 1024;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("无法读取配置文件 {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("配置文件 {path} 格式错误: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    /// 未设置 `RUST_LOG` 时使用的日志过滤规则。
    pub log_level: String,
    /// 默认输出带缩进的 TTML 或 JSON。
    pub pretty: bool,
    /// 超过该大小的输入文件会在解码前被拒绝。
    pub max_input_bytes: u64,
    /// 生成 TTML 时内联翻译使用的 `xml:lang`。
    pub translation_language: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            pretty: false,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            translation_language: DEFAULT_TRANSLATION_LANGUAGE.to_string(),
        }
    }
}

impl ToolConfig {
    /// 用户配置目录下的默认配置文件路径。
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "AMLL", "amlx-tool")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// 加载配置：优先使用显式路径，否则使用默认路径。
    ///
    /// 默认路径下的文件不存在时返回默认配置；显式指定的文件必须存在。
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::load_from(&path),
                Some(path) => {
                    info!("未找到配置文件 {}，使用默认配置。", path.display());
                    Ok(Self::default())
                }
                None => {
                    info!("无法获取用户配置目录，使用默认配置。");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 由配置与命令行参数得到 TTML 生成选项。
    pub fn generation_options(&self, pretty: bool) -> TtmlGenerationOptions {
        TtmlGenerationOptions {
            format: pretty || self.pretty,
            translation_language: self.translation_language.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool.toml");
        fs::write(&path, "pretty = true\ntranslation_language = \"ja\"\n").unwrap();

        let config = ToolConfig::load(Some(&path)).unwrap();
        assert!(config.pretty);
        assert_eq!(config.translation_language, "ja");
        assert_eq!(config.log_level, "info");
        assert_eq!(config.max_input_bytes, DEFAULT_MAX_INPUT_BYTES);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ToolConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tool.toml");
        fs::write(&path, "max_input_bytes = \"lots\"").unwrap();
        assert!(matches!(
            ToolConfig::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_generation_options_merge_pretty_flag() {
        let config = ToolConfig::default();
        assert!(!config.generation_options(false).format);
        assert!(config.generation_options(true).format);
        assert_eq!(config.generation_options(false).translation_language, "zh-CN");
    }
}
