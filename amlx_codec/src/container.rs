//! 容器框架：前导区与各段的固定顺序。

use amll_core::{IdGenerator, LyricDocument};
use tracing::debug;

use crate::{
    error::{AmlxError, FieldPath, Result},
    header::{read_header, write_header},
    lyric_data::{read_lyric_data, write_lyric_data},
    pool::{StringPool, StringPoolBuilder},
    reader::ByteReader,
    varint::write_varint,
};

/// 格式魔数。
pub const MAGIC: [u8; 4] = *b"AMLX";
/// 当前格式版本。
pub const VERSION: u8 = 0x01;

/// 前导区：魔数、版本、全局标记与头部长度。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Preamble {
    pub version: u8,
    /// 保留给未来的全局特性，未知位被忽略。
    pub global_flags: u8,
    pub header_size: u64,
}

/// 读取并校验前导区。
pub fn read_preamble(reader: &mut ByteReader<'_>) -> Result<Preamble> {
    let magic = reader.read_array::<4>(FieldPath::root("magic"))?;
    if magic != MAGIC {
        return Err(AmlxError::InvalidMagic { found: magic });
    }

    let version = reader.read_u8(FieldPath::root("version"))?;
    if version != VERSION {
        return Err(AmlxError::UnsupportedVersion { found: version });
    }

    let global_flags = reader.read_u8(FieldPath::root("global_flags"))?;
    if global_flags != 0 {
        debug!("忽略未知的全局标记位 0x{global_flags:02x}");
    }

    let header_size = reader.read_varint(FieldPath::root("header_size"))?;

    Ok(Preamble {
        version,
        global_flags,
        header_size,
    })
}

/// 将歌词文档编码为 AMLX 字节。
///
/// 文档中的 ID 被忽略。行时间会被扩展以覆盖其所有单词。
pub fn encode(document: &LyricDocument) -> Result<Vec<u8>> {
    let pool = StringPoolBuilder::from_document(document);

    let mut header = Vec::new();
    write_header(&document.metadata, &pool, &mut header)?;

    let mut pool_section = Vec::new();
    pool.write_section(&mut pool_section);

    let mut lyric_data = Vec::new();
    write_lyric_data(&document.lines, &pool, &mut lyric_data)?;

    let mut out =
        Vec::with_capacity(MAGIC.len() + 12 + header.len() + pool_section.len() + lyric_data.len());
    out.extend_from_slice(&MAGIC);
    out.push(VERSION);
    out.push(0);
    write_varint(&mut out, header.len() as u64);
    out.extend_from_slice(&header);
    out.extend_from_slice(&pool_section);
    out.extend_from_slice(&lyric_data);

    debug!(
        lines = document.lines.len(),
        strings = pool.len(),
        bytes = out.len(),
        "AMLX 编码完成"
    );

    Ok(out)
}

/// 将 AMLX 字节解码为歌词文档。
///
/// 每行和每个单词都会按解码顺序获得新的 ID。歌词数据段之后的字节被视为未来的扩展段而忽略。
pub fn decode(bytes: &[u8]) -> Result<LyricDocument> {
    let mut reader = ByteReader::new(bytes);
    let preamble = read_preamble(&mut reader)?;

    let header_offset = reader.offset();
    let header = reader.read_bytes(preamble.header_size, FieldPath::root("header"))?;

    let pool = StringPool::read_section(&mut reader)?;
    let metadata = read_header(header, header_offset, &pool)?;

    let mut ids = IdGenerator::new();
    let lines = read_lyric_data(&mut reader, &pool, &mut ids)?;

    if !reader.is_empty() {
        debug!(
            "歌词数据段之后有 {} 个字节的未知扩展段，已忽略",
            reader.remaining()
        );
    }

    debug!(
        lines = lines.len(),
        strings = pool.len(),
        bytes = bytes.len(),
        "AMLX 解码完成"
    );

    Ok(LyricDocument { metadata, lines })
}

#[cfg(test)]
mod tests {
    use amll_core::{LyricLine, LyricWord, MetadataEntry};

    use super::*;
    use crate::error::{AmlxErrorKind, Scope};

    fn sample() -> LyricDocument {
        LyricDocument::new(
            vec![MetadataEntry::new("album", ["1989", "Deluxe"])],
            vec![LyricLine::new(
                1000.0,
                2000.0,
                vec![LyricWord::new("Hello", 1000.0, 2000.0)],
            )],
        )
    }

    #[test]
    fn test_preamble() {
        let bytes = encode(&sample()).unwrap();
        assert_eq!(&bytes[..6], b"AMLX\x01\x00");

        let preamble = read_preamble(&mut ByteReader::new(&bytes)).unwrap();
        assert_eq!(preamble.version, VERSION);
        assert_eq!(preamble.header_size, 6);
    }

    #[test]
    fn test_wrong_magic_and_version() {
        let mut bytes = encode(&sample()).unwrap();
        bytes[0] = b'B';
        assert_eq!(
            decode(&bytes).unwrap_err(),
            AmlxError::InvalidMagic { found: *b"BMLX" }
        );

        let mut bytes = encode(&sample()).unwrap();
        bytes[4] = 2;
        assert_eq!(
            decode(&bytes).unwrap_err(),
            AmlxError::UnsupportedVersion { found: 2 }
        );
    }

    #[test]
    fn test_short_input_is_truncated() {
        let err = decode(b"AML").unwrap_err();
        assert_eq!(err.kind(), AmlxErrorKind::TruncatedInput);
        assert_eq!(err.field_path(), Some(FieldPath::root("magic")));
    }

    #[test]
    fn test_global_flags_ignored() {
        let mut bytes = encode(&sample()).unwrap();
        bytes[5] = 0xff;
        assert!(decode(&bytes).unwrap().content_eq(&sample()));
    }

    #[test]
    fn test_trailing_section_ignored() {
        let mut bytes = encode(&sample()).unwrap();
        bytes.extend_from_slice(&[0x42, 0x00, 0x17]);
        assert!(decode(&bytes).unwrap().content_eq(&sample()));
    }

    #[test]
    fn test_header_size_larger_than_header() {
        let mut bytes = encode(&sample()).unwrap();
        bytes[6] += 1;
        let err = decode(&bytes).unwrap_err();
        assert!(matches!(
            err,
            AmlxError::TrailingBytes { .. } | AmlxError::TruncatedInput { .. }
        ));
    }

    #[test]
    fn test_header_size_beyond_input() {
        let mut bytes = b"AMLX\x01\x00".to_vec();
        write_varint(&mut bytes, 1 << 40);
        let err = decode(&bytes).unwrap_err();
        assert_eq!(
            err,
            AmlxError::TruncatedInput {
                at: FieldPath::root("header"),
                offset: 12
            }
        );
    }

    #[test]
    fn test_out_of_bounds_text_id() {
        let document = sample();
        let mut bytes = encode(&document).unwrap();
        // 最后一个字节是单词标记，前一个是文本 ID
        let text_id_pos = bytes.len() - 2;
        bytes[text_id_pos] = 4;
        let err = decode(&bytes).unwrap_err();
        assert_eq!(
            err,
            AmlxError::StringIndexOutOfBounds {
                at: FieldPath::new(Scope::Word(0, 0), "text_string_id"),
                index: 4,
                pool_size: 4
            }
        );
    }
}
