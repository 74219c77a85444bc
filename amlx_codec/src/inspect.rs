//! 负载的字节占用分析。
//!
//! [`inspect`] 与 [`decode`](crate::decode) 执行相同的校验，但返回的是各段、各记录所占的字节数，
//! 用于调试与体积分析。

use std::fmt;

use amll_core::IdGenerator;
use serde::Serialize;

use crate::{
    container::read_preamble,
    error::{AmlxError, FieldPath, Result},
    flags::LineFlags,
    header::read_entry,
    lyric_data::read_line,
    pool::StringPool,
    reader::ByteReader,
};

/// 整个负载的布局。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadLayout {
    pub total_bytes: usize,
    pub preamble: PreambleLayout,
    pub header: HeaderLayout,
    pub string_pool: StringPoolLayout,
    pub lyric_data: LyricDataLayout,
    /// 歌词数据段之后被忽略的字节。
    pub trailing_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreambleLayout {
    pub bytes: usize,
    pub version: u8,
    pub global_flags: u8,
    /// `header_size` 变长整数本身占用的字节。
    pub header_size_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HeaderLayout {
    pub offset: usize,
    pub bytes: usize,
    pub count_bytes: usize,
    pub entries: Vec<MetadataLayout>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataLayout {
    pub key: String,
    pub value_count: usize,
    pub error: bool,
    pub bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringPoolLayout {
    pub offset: usize,
    pub bytes: usize,
    pub count: usize,
    pub count_bytes: usize,
    pub length_prefix_bytes: usize,
    pub payload_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LyricDataLayout {
    pub offset: usize,
    pub bytes: usize,
    pub count_bytes: usize,
    pub lines: Vec<LineLayout>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineLayout {
    pub start_ms: u64,
    pub end_ms: u64,
    pub word_count: usize,
    pub flags: LineFlags,
    pub bytes: usize,
}

/// 校验负载并统计其字节占用。
pub fn inspect(bytes: &[u8]) -> Result<PayloadLayout> {
    let mut reader = ByteReader::new(bytes);
    let preamble = read_preamble(&mut reader)?;
    let preamble_bytes = reader.offset();

    let header_offset = reader.offset();
    let header = reader.read_bytes(preamble.header_size, FieldPath::root("header"))?;

    let pool_offset = reader.offset();
    let count_bytes = varint_width(&reader, FieldPath::root("string_count"))?;
    let pool = StringPool::read_section(&mut reader)?;
    let pool_bytes = reader.offset() - pool_offset;
    let payload_bytes = pool.strings().iter().map(String::len).sum::<usize>();
    let string_pool = StringPoolLayout {
        offset: pool_offset,
        bytes: pool_bytes,
        count: pool.len(),
        count_bytes,
        length_prefix_bytes: pool_bytes - count_bytes - payload_bytes,
        payload_bytes,
    };

    let header = inspect_header(header, header_offset, &pool)?;
    let lyric_data = inspect_lyric_data(&mut reader, &pool)?;

    Ok(PayloadLayout {
        total_bytes: bytes.len(),
        preamble: PreambleLayout {
            bytes: preamble_bytes,
            version: preamble.version,
            global_flags: preamble.global_flags,
            header_size_bytes: preamble_bytes - 6,
        },
        header,
        string_pool,
        lyric_data,
        trailing_bytes: reader.remaining(),
    })
}

fn varint_width(reader: &ByteReader<'_>, at: FieldPath) -> Result<usize> {
    let mut probe = reader.clone();
    let start = probe.offset();
    probe.read_varint(at)?;
    Ok(probe.offset() - start)
}

fn inspect_header(header: &[u8], offset: usize, pool: &StringPool) -> Result<HeaderLayout> {
    let mut reader = ByteReader::with_base(header, offset);
    let (count, capacity) = reader.read_count(3, FieldPath::root("metadata_count"))?;
    let count_bytes = reader.offset() - offset;

    let mut entries = Vec::with_capacity(capacity);
    for i in 0..count as usize {
        let start = reader.offset();
        let entry = read_entry(&mut reader, i, pool)?;
        entries.push(MetadataLayout {
            value_count: entry.values.len(),
            key: entry.key,
            error: entry.error,
            bytes: reader.offset() - start,
        });
    }

    if !reader.is_empty() {
        return Err(AmlxError::TrailingBytes {
            at: FieldPath::root("header"),
            remaining: reader.remaining(),
        });
    }

    Ok(HeaderLayout {
        offset,
        bytes: header.len(),
        count_bytes,
        entries,
    })
}

fn inspect_lyric_data(reader: &mut ByteReader<'_>, pool: &StringPool) -> Result<LyricDataLayout> {
    let offset = reader.offset();
    let (count, capacity) = reader.read_count(4, FieldPath::root("line_count"))?;
    let count_bytes = reader.offset() - offset;

    let mut ids = IdGenerator::new();
    let mut lines = Vec::with_capacity(capacity);
    for i in 0..count as usize {
        let start = reader.offset();
        let record = read_line(reader, i, pool, &mut ids)?;
        lines.push(LineLayout {
            start_ms: record.start_ms,
            end_ms: record.end_ms,
            word_count: record.line.words.len(),
            flags: record.flags,
            bytes: reader.offset() - start,
        });
    }

    Ok(LyricDataLayout {
        offset,
        bytes: reader.offset() - offset,
        count_bytes,
        lines,
    })
}

impl fmt::Display for PayloadLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "AMLX v{}，共 {} 字节",
            self.preamble.version, self.total_bytes
        )?;
        writeln!(
            f,
            "  前导区    {:>8} 字节 (全局标记 0x{:02x})",
            self.preamble.bytes, self.preamble.global_flags
        )?;

        writeln!(
            f,
            "  头部      {:>8} 字节 @{}，{} 条元数据",
            self.header.bytes,
            self.header.offset,
            self.header.entries.len()
        )?;
        for (i, entry) in self.header.entries.iter().enumerate() {
            writeln!(
                f,
                "    metadata[{i}] {}: {} 字节，{} 个值{}",
                entry.key,
                entry.bytes,
                entry.value_count,
                if entry.error { "，已标记错误" } else { "" }
            )?;
        }

        let pool = &self.string_pool;
        writeln!(
            f,
            "  字符串池  {:>8} 字节 @{}，{} 个字符串 (数量 {} + 长度前缀 {} + 内容 {})",
            pool.bytes,
            pool.offset,
            pool.count,
            pool.count_bytes,
            pool.length_prefix_bytes,
            pool.payload_bytes
        )?;

        writeln!(
            f,
            "  歌词数据  {:>8} 字节 @{}，{} 行",
            self.lyric_data.bytes,
            self.lyric_data.offset,
            self.lyric_data.lines.len()
        )?;
        for (i, line) in self.lyric_data.lines.iter().enumerate() {
            write!(
                f,
                "    line[{i}] {}..{} ms: {} 字节，{} 个单词",
                line.start_ms, line.end_ms, line.bytes, line.word_count
            )?;
            if !line.flags.is_empty() {
                f.write_str("，")?;
                bitflags::parser::to_writer(&line.flags, &mut *f)?;
            }
            writeln!(f)?;
        }

        write!(f, "  尾随      {:>8} 字节", self.trailing_bytes)
    }
}

#[cfg(test)]
mod tests {
    use amll_core::{LyricDocument, LyricLine, LyricWord, MetadataEntry};

    use super::*;
    use crate::{container::encode, error::AmlxErrorKind};

    fn sample() -> LyricDocument {
        let mut background = LyricLine::new(
            1500.0,
            1900.0,
            vec![LyricWord::new("ooh", 1500.0, 1900.0)],
        );
        background.is_background = true;
        LyricDocument::new(
            vec![MetadataEntry::new("album", ["1989", "Deluxe"])],
            vec![
                LyricLine::new(
                    1000.0,
                    2000.0,
                    vec![
                        LyricWord::new("Hello", 1000.0, 1400.0),
                        LyricWord::new(" ", 1400.0, 1400.0),
                        LyricWord::new("world", 1400.0, 2000.0),
                    ],
                ),
                background,
            ],
        )
    }

    #[test]
    fn test_sections_add_up() {
        let bytes = encode(&sample()).unwrap();
        let layout = inspect(&bytes).unwrap();

        assert_eq!(layout.total_bytes, bytes.len());
        assert_eq!(
            layout.preamble.bytes
                + layout.header.bytes
                + layout.string_pool.bytes
                + layout.lyric_data.bytes,
            bytes.len()
        );
        assert_eq!(layout.header.offset, layout.preamble.bytes);
        assert_eq!(layout.string_pool.offset, layout.header.offset + layout.header.bytes);
        assert_eq!(layout.trailing_bytes, 0);

        let line_bytes: usize = layout.lyric_data.lines.iter().map(|l| l.bytes).sum();
        assert_eq!(line_bytes + layout.lyric_data.count_bytes, layout.lyric_data.bytes);

        let entry_bytes: usize = layout.header.entries.iter().map(|e| e.bytes).sum();
        assert_eq!(entry_bytes + layout.header.count_bytes, layout.header.bytes);
    }

    #[test]
    fn test_string_pool_breakdown() {
        let bytes = encode(&sample()).unwrap();
        let pool = inspect(&bytes).unwrap().string_pool;
        // album 1989 Deluxe Hello " " world ooh
        assert_eq!(pool.count, 7);
        assert_eq!(pool.count_bytes, 1);
        assert_eq!(pool.length_prefix_bytes, 7);
        assert_eq!(pool.payload_bytes, 5 + 4 + 6 + 5 + 1 + 5 + 3);
    }

    #[test]
    fn test_line_details() {
        let bytes = encode(&sample()).unwrap();
        let layout = inspect(&bytes).unwrap();
        let lines = &layout.lyric_data.lines;
        assert_eq!(lines[0].word_count, 3);
        assert_eq!(lines[1].flags, LineFlags::BACKGROUND);
        assert_eq!(lines[1].start_ms, 1500);
    }

    #[test]
    fn test_trailing_reported() {
        let mut bytes = encode(&sample()).unwrap();
        bytes.extend_from_slice(&[9, 9, 9]);
        assert_eq!(inspect(&bytes).unwrap().trailing_bytes, 3);
    }

    #[test]
    fn test_rejects_like_decode() {
        let mut bytes = encode(&sample()).unwrap();
        bytes[0] = b'X';
        assert_eq!(inspect(&bytes).unwrap_err().kind(), AmlxErrorKind::InvalidMagic);
    }

    #[test]
    fn test_display_and_json() {
        let bytes = encode(&sample()).unwrap();
        let layout = inspect(&bytes).unwrap();

        let text = layout.to_string();
        assert!(text.starts_with("AMLX v1"));
        assert!(text.contains("metadata[0] album"));
        assert!(text.contains("BACKGROUND"));

        let json = serde_json::to_value(&layout).unwrap();
        assert_eq!(json["lyric_data"]["lines"][1]["flags"], "BACKGROUND");
        assert_eq!(json["string_pool"]["count"], 7);
    }
}
