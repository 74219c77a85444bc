//! 命令行参数定义。

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use amll_core::DocumentFormat;

#[derive(Parser, Debug)]
#[command(name = "amlx-tool")]
#[command(about = "在 AMLL TTML 与 AMLX 二进制歌词之间转换", long_about = None)]
#[command(version)]
pub struct Cli {
    /// 配置文件路径，默认使用用户配置目录下的 config.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// 日志级别，覆盖配置文件中的设置（RUST_LOG 优先）
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 转换歌词文件，输入格式由扩展名判断
    Convert {
        /// 输入文件（.ttml / .xml / .amlx）
        input: PathBuf,

        /// 目标格式，默认转换为另一种格式
        #[arg(long, value_enum)]
        to: Option<TargetFormat>,

        /// 输出文件，默认与输入同名、使用目标格式的扩展名
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 输出带缩进的 TTML 或 JSON
        #[arg(long)]
        pretty: bool,
    },

    /// 打印歌词文件的结构，或 AMLX 负载的字节分布
    Inspect {
        /// 输入文件（.ttml / .xml / .amlx）
        input: PathBuf,

        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TargetFormat {
    Ttml,
    Amlx,
    Json,
}

impl From<TargetFormat> for DocumentFormat {
    fn from(format: TargetFormat) -> Self {
        match format {
            TargetFormat::Ttml => Self::Ttml,
            TargetFormat::Amlx => Self::Amlx,
            TargetFormat::Json => Self::Json,
        }
    }
}
