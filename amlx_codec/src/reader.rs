use crate::{
    error::{AmlxError, FieldPath, Result},
    varint::{VarintError, read_varint},
};

/// 在不可信字节上前进的只读游标。
///
/// 所有读取都带有字段路径，失败时报告的偏移是相对于整个负载的绝对偏移。
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> ByteReader<'a> {
    #[must_use]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self::with_base(bytes, 0)
    }

    /// 为一个子切片创建游标，`base` 是该切片在整个负载中的起始偏移。
    #[must_use]
    pub const fn with_base(bytes: &'a [u8], base: usize) -> Self {
        Self {
            bytes,
            pos: 0,
            base,
        }
    }

    /// 当前的绝对偏移。
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.base + self.pos
    }

    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_u8(&mut self, at: FieldPath) -> Result<u8> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| self.truncated(at))?;
        self.pos += 1;
        Ok(byte)
    }

    pub fn read_array<const N: usize>(&mut self, at: FieldPath) -> Result<[u8; N]> {
        let slice = self.read_bytes(N as u64, at)?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    pub fn read_varint(&mut self, at: FieldPath) -> Result<u64> {
        match read_varint(&self.bytes[self.pos..]) {
            Ok((value, consumed)) => {
                self.pos += consumed;
                Ok(value)
            }
            Err(VarintError::Truncated) => Err(self.truncated(at)),
            Err(VarintError::Overflow) => Err(AmlxError::VarintOverflow {
                at,
                offset: self.offset(),
            }),
        }
    }

    /// 读取 `len` 个字节。`len` 超过剩余字节数时报告截断。
    pub fn read_bytes(&mut self, len: u64, at: FieldPath) -> Result<&'a [u8]> {
        let len = usize::try_from(len)
            .ok()
            .filter(|len| *len <= self.remaining())
            .ok_or_else(|| self.truncated(at))?;
        let slice = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    /// 读取一个记录数量。
    ///
    /// 返回值本身不做限制，但第二个返回值是可安全预分配的容量：
    /// 每条记录至少占 `min_record_len` 个字节，因此容量不会超过剩余字节所能容纳的记录数。
    pub fn read_count(&mut self, min_record_len: usize, at: FieldPath) -> Result<(u64, usize)> {
        let count = self.read_varint(at)?;
        let fit = self.remaining() / min_record_len.max(1);
        let capacity = usize::try_from(count).map_or(fit, |count| count.min(fit));
        Ok((count, capacity))
    }

    /// 剩余未读的字节。
    #[must_use]
    pub fn rest(&self) -> &'a [u8] {
        &self.bytes[self.pos..]
    }

    const fn truncated(&self, at: FieldPath) -> AmlxError {
        AmlxError::TruncatedInput {
            at,
            offset: self.offset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AmlxErrorKind;

    const AT: FieldPath = FieldPath::root("test");

    #[test]
    fn test_sequential_reads() {
        let data = [b'A', 0xac, 0x02, 1, 2, 3];
        let mut reader = ByteReader::new(&data);
        assert_eq!(reader.read_u8(AT), Ok(b'A'));
        assert_eq!(reader.read_varint(AT), Ok(300));
        assert_eq!(reader.read_bytes(2, AT), Ok(&[1u8, 2][..]));
        assert_eq!(reader.remaining(), 1);
        assert_eq!(reader.rest(), &[3]);
    }

    #[test]
    fn test_truncation_reports_absolute_offset() {
        let data = [0x80];
        let mut reader = ByteReader::with_base(&data, 10);
        let err = reader.read_varint(AT).unwrap_err();
        assert_eq!(err, AmlxError::TruncatedInput { at: AT, offset: 10 });

        let mut reader = ByteReader::with_base(&data, 10);
        reader.read_u8(AT).unwrap();
        assert_eq!(
            reader.read_u8(AT).unwrap_err(),
            AmlxError::TruncatedInput { at: AT, offset: 11 }
        );
    }

    #[test]
    fn test_read_bytes_beyond_remaining() {
        let data = [1, 2, 3];
        let mut reader = ByteReader::new(&data);
        let err = reader.read_bytes(4, AT).unwrap_err();
        assert_eq!(err.kind(), AmlxErrorKind::TruncatedInput);
        assert_eq!(reader.remaining(), 3);
        assert!(reader.read_bytes(u64::MAX, AT).is_err());
    }

    #[test]
    fn test_read_count_caps_capacity() {
        let mut data = Vec::new();
        crate::varint::write_varint(&mut data, 1_000_000);
        data.extend_from_slice(&[0; 8]);
        let mut reader = ByteReader::new(&data);
        let (count, capacity) = reader.read_count(2, AT).unwrap();
        assert_eq!(count, 1_000_000);
        assert_eq!(capacity, 4);
    }
}
