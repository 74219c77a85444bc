//! 头部（元数据）段。

use amll_core::MetadataEntry;

use crate::{
    error::{AmlxError, FieldPath, Result, Scope},
    pool::{StringPool, StringPoolBuilder},
    reader::ByteReader,
    varint::write_varint,
};

/// 写出头部段：数量，然后每条元数据的键 ID、值数量、值 ID 与错误标记字节。
pub fn write_header(
    metadata: &[MetadataEntry],
    pool: &StringPoolBuilder<'_>,
    out: &mut Vec<u8>,
) -> Result<()> {
    write_varint(out, metadata.len() as u64);

    for (i, entry) in metadata.iter().enumerate() {
        let key_id = pool.require(&entry.key, FieldPath::new(Scope::Metadata(i), "key_string_id"))?;
        write_varint(out, key_id);

        write_varint(out, entry.values.len() as u64);
        for (j, value) in entry.values.iter().enumerate() {
            let at = FieldPath::new(Scope::MetadataValue(i, j), "string_id");
            let value_id = pool.require(value, at)?;
            write_varint(out, value_id);
        }

        out.push(u8::from(entry.error));
    }

    Ok(())
}

/// 按字符串池解释已切出的头部字节。
///
/// `base` 是头部在整个负载中的起始偏移。头部必须被完整消费。
pub fn read_header(header: &[u8], base: usize, pool: &StringPool) -> Result<Vec<MetadataEntry>> {
    let mut reader = ByteReader::with_base(header, base);

    // 每条至少包含键 ID、值数量和错误标记
    let (count, capacity) = reader.read_count(3, FieldPath::root("metadata_count"))?;
    let mut metadata = Vec::with_capacity(capacity);

    for i in 0..count as usize {
        metadata.push(read_entry(&mut reader, i, pool)?);
    }

    if !reader.is_empty() {
        return Err(AmlxError::TrailingBytes {
            at: FieldPath::root("header"),
            remaining: reader.remaining(),
        });
    }

    Ok(metadata)
}

/// 读取单条元数据。
pub(crate) fn read_entry(
    reader: &mut ByteReader<'_>,
    index: usize,
    pool: &StringPool,
) -> Result<MetadataEntry> {
    let scope = Scope::Metadata(index);

    let at = FieldPath::new(scope, "key_string_id");
    let key_id = reader.read_varint(at)?;
    let key = pool.resolve(key_id, at)?.to_owned();

    let (value_count, capacity) = reader.read_count(1, FieldPath::new(scope, "value_count"))?;
    let mut values = Vec::with_capacity(capacity);
    for j in 0..value_count as usize {
        let at = FieldPath::new(Scope::MetadataValue(index, j), "string_id");
        let value_id = reader.read_varint(at)?;
        values.push(pool.resolve(value_id, at)?.to_owned());
    }

    let error = reader.read_u8(FieldPath::new(scope, "error_flag"))? != 0;

    Ok(MetadataEntry { key, values, error })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AmlxErrorKind;

    fn pool_of(values: &[&str]) -> StringPool {
        let mut builder = StringPoolBuilder::new();
        for value in values {
            builder.add(value);
        }
        let mut bytes = Vec::new();
        builder.write_section(&mut bytes);
        StringPool::read_section(&mut ByteReader::new(&bytes)).unwrap()
    }

    #[test]
    fn test_layout() {
        let metadata = vec![
            MetadataEntry::new("album", ["1989", "Deluxe"]),
            MetadataEntry {
                key: "isrc".to_string(),
                values: vec![],
                error: true,
            },
        ];
        let mut builder = StringPoolBuilder::new();
        for value in ["album", "1989", "Deluxe", "isrc"] {
            builder.add(value);
        }

        let mut out = Vec::new();
        write_header(&metadata, &builder, &mut out).unwrap();
        assert_eq!(out, [2, 0, 2, 1, 2, 0, 3, 0, 1]);

        let pool = pool_of(&["album", "1989", "Deluxe", "isrc"]);
        assert_eq!(read_header(&out, 0, &pool).unwrap(), metadata);
    }

    #[test]
    fn test_trailing_bytes() {
        let pool = pool_of(&["k"]);
        let err = read_header(&[1, 0, 0, 0, 9], 0, &pool).unwrap_err();
        assert_eq!(
            err,
            AmlxError::TrailingBytes {
                at: FieldPath::root("header"),
                remaining: 1
            }
        );
    }

    #[test]
    fn test_value_out_of_bounds() {
        let pool = pool_of(&["k"]);
        let err = read_header(&[1, 0, 1, 1, 0], 0, &pool).unwrap_err();
        assert_eq!(err.kind(), AmlxErrorKind::StringIndexOutOfBounds);
        assert_eq!(
            err.field_path().map(|p| p.to_string()).as_deref(),
            Some("metadata[0].value[0].string_id")
        );
    }

    #[test]
    fn test_truncated_header() {
        let pool = pool_of(&["k"]);
        let err = read_header(&[1, 0, 0], 7, &pool).unwrap_err();
        assert_eq!(
            err,
            AmlxError::TruncatedInput {
                at: FieldPath::new(Scope::Metadata(0), "error_flag"),
                offset: 10
            }
        );
    }
}
