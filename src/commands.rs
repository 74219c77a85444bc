//! 子命令的实现。

use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
};

use amll_core::{DocumentFormat, LyricDocument, LyricMarkup};
use amlx_codec::{binary_to_markup, decode, inspect, markup_to_binary};
use anyhow::{Context, Result, bail};
use tracing::{info, warn};
use ttml_processor::{TtmlMarkup, format_ttml_time};

use crate::{
    cli::{Command, TargetFormat},
    config::ToolConfig,
};

/// 执行一个子命令，返回需要打印到标准输出的内容。
pub fn run(command: Command, config: &ToolConfig) -> Result<Option<String>> {
    match command {
        Command::Convert {
            input,
            to,
            output,
            pretty,
        } => {
            convert(&input, to, output.as_deref(), pretty, config)?;
            Ok(None)
        }
        Command::Inspect { input, json } => inspect_file(&input, json, config).map(Some),
    }
}

fn markup_for(config: &ToolConfig, pretty: bool) -> TtmlMarkup {
    TtmlMarkup {
        generation: config.generation_options(pretty),
        ..TtmlMarkup::default()
    }
}

/// 根据扩展名判断输入格式。
fn detect_input_format(path: &Path) -> Result<DocumentFormat> {
    match DocumentFormat::from_path(path) {
        Some(format) if format.is_readable() => Ok(format),
        Some(format) => bail!("不支持读取 {format} 格式的文件: {}", path.display()),
        None => bail!("无法根据扩展名判断文件格式: {}", path.display()),
    }
}

/// 读取输入文件。超过配置上限的文件在交给解码器之前就会被拒绝。
fn read_input(path: &Path, config: &ToolConfig) -> Result<Vec<u8>> {
    let size = fs::metadata(path)
        .with_context(|| format!("无法访问输入文件 {}", path.display()))?
        .len();
    if size > config.max_input_bytes {
        bail!(
            "输入文件 {} 大小为 {size} 字节，超过上限 {} 字节",
            path.display(),
            config.max_input_bytes
        );
    }
    fs::read(path).with_context(|| format!("无法读取输入文件 {}", path.display()))
}

fn load_document(
    format: DocumentFormat,
    bytes: &[u8],
    markup: &TtmlMarkup,
) -> Result<LyricDocument> {
    match format {
        DocumentFormat::Ttml => {
            let text = std::str::from_utf8(bytes).context("TTML 文件不是有效的 UTF-8")?;
            markup.to_document(text).context("解析 TTML 失败")
        }
        DocumentFormat::Amlx => decode(bytes).context("解码 AMLX 失败"),
        DocumentFormat::Json => bail!("JSON 只能作为输出格式"),
    }
}

/// 转换一个文件。返回写入的输出路径；源格式与目标格式相同时跳过并返回 `None`。
pub fn convert(
    input: &Path,
    to: Option<TargetFormat>,
    output: Option<&Path>,
    pretty: bool,
    config: &ToolConfig,
) -> Result<Option<PathBuf>> {
    let source = detect_input_format(input)?;
    let target = to.map_or(
        match source {
            DocumentFormat::Amlx => DocumentFormat::Ttml,
            DocumentFormat::Ttml | DocumentFormat::Json => DocumentFormat::Amlx,
        },
        DocumentFormat::from,
    );

    if source == target {
        warn!("输入已经是 {target} 格式，跳过转换: {}", input.display());
        return Ok(None);
    }

    let bytes = read_input(input, config)?;
    let markup = markup_for(config, pretty);

    let payload = match (source, target) {
        (DocumentFormat::Ttml, DocumentFormat::Amlx) => {
            let text = std::str::from_utf8(&bytes).context("TTML 文件不是有效的 UTF-8")?;
            markup_to_binary(&markup, text).context("TTML 转换为 AMLX 失败")?
        }
        (DocumentFormat::Amlx, DocumentFormat::Ttml) => {
            binary_to_markup(&markup, &bytes, markup.generation.format)
                .context("AMLX 转换为 TTML 失败")?
                .into_bytes()
        }
        (_, DocumentFormat::Json) => {
            let document = load_document(source, &bytes, &markup)?;
            if pretty || config.pretty {
                serde_json::to_vec_pretty(&document)?
            } else {
                serde_json::to_vec(&document)?
            }
        }
        (source, target) => bail!("不支持从 {source} 转换为 {target}"),
    };

    let output = output.map_or_else(
        || input.with_extension(target.to_extension_str()),
        Path::to_path_buf,
    );
    fs::write(&output, &payload)
        .with_context(|| format!("无法写入输出文件 {}", output.display()))?;
    info!(
        "已将 {} ({source}, {} 字节) 转换为 {} ({target}, {} 字节)",
        input.display(),
        bytes.len(),
        output.display(),
        payload.len()
    );
    Ok(Some(output))
}

/// 检查一个文件：TTML 打印文档结构，AMLX 打印负载的字节分布。
pub fn inspect_file(input: &Path, json: bool, config: &ToolConfig) -> Result<String> {
    let format = detect_input_format(input)?;
    let bytes = read_input(input, config)?;

    match format {
        DocumentFormat::Amlx => {
            let layout = inspect(&bytes).context("检查 AMLX 负载失败")?;
            if json {
                Ok(serde_json::to_string_pretty(&layout)?)
            } else {
                Ok(layout.to_string())
            }
        }
        _ => {
            let document = load_document(format, &bytes, &markup_for(config, false))?;
            if json {
                Ok(serde_json::to_string_pretty(&document)?)
            } else {
                Ok(render_document(&document))
            }
        }
    }
}

/// 以缩进列表的形式列出元数据、行与单词。
pub fn render_document(document: &LyricDocument) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "元数据 ({}):", document.metadata.len());
    for entry in &document.metadata {
        let error = if entry.error { " [error]" } else { "" };
        let _ = writeln!(out, "  {} = {}{error}", entry.key, entry.values.join("; "));
    }

    let _ = writeln!(
        out,
        "歌词行 ({} 行, {} 个单词):",
        document.lines.len(),
        document.word_count()
    );
    for (index, line) in document.lines.iter().enumerate() {
        let mut tags = Vec::new();
        if line.is_background {
            tags.push("背景");
        }
        if line.is_duet {
            tags.push("对唱");
        }
        if line.ignore_sync {
            tags.push("忽略同步");
        }
        let tags = if tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", tags.join(", "))
        };

        let _ = writeln!(
            out,
            "  #{} {} - {}{tags}",
            index + 1,
            format_ttml_time(line.start_time_ms),
            format_ttml_time(line.end_time_ms)
        );
        for word in &line.words {
            let mut extra = String::new();
            if let Some(roman) = &word.roman_word {
                let _ = write!(extra, " roman={roman:?}");
            }
            if let Some(empty_beat) = word.effective_empty_beat_ms() {
                let _ = write!(extra, " empty-beat={empty_beat}");
            }
            if word.obscene {
                extra.push_str(" obscene");
            }
            let _ = writeln!(
                out,
                "      {} - {} {:?}{extra}",
                format_ttml_time(word.start_time_ms),
                format_ttml_time(word.end_time_ms),
                word.text
            );
        }
        if let Some(translation) = &line.translated_lyric {
            let _ = writeln!(out, "      翻译: {translation}");
        }
        if let Some(roman) = &line.roman_lyric {
            let _ = writeln!(out, "      音译: {roman}");
        }
    }
    out
}
