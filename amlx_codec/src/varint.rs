//! 无符号 LEB128 变长整数。

/// 64 位整数编码后的最大字节数。
pub const MAX_VARINT_LEN: usize = 10;

/// 读取变长整数失败的原因。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarintError {
    /// 在遇到终止字节之前输入就结束了。
    Truncated,
    /// 编码超过 10 个字节，或第 10 个字节超出 64 位范围。
    Overflow,
}

/// 将 `value` 以 LEB128 追加到 `buf`。
pub fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buf.push((value as u8) | 0x80);
        value >>= 7;
    }
    buf.push(value as u8);
}

/// `value` 编码后占用的字节数。
#[must_use]
pub const fn varint_len(value: u64) -> usize {
    let bits = 64 - (value | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// 从 `bytes` 开头读取一个变长整数，返回值与消耗的字节数。
pub fn read_varint(bytes: &[u8]) -> Result<(u64, usize), VarintError> {
    let mut value = 0u64;
    let mut shift = 0u32;

    for (i, &byte) in bytes.iter().enumerate().take(MAX_VARINT_LEN) {
        if byte < 0x80 {
            if i == MAX_VARINT_LEN - 1 && byte > 1 {
                return Err(VarintError::Overflow);
            }
            return Ok((value | (u64::from(byte) << shift), i + 1));
        }
        value |= u64::from(byte & 0x7f) << shift;
        shift += 7;
    }

    if bytes.len() >= MAX_VARINT_LEN {
        Err(VarintError::Overflow)
    } else {
        Err(VarintError::Truncated)
    }
}
