//! 毫秒时间的规整与溢出安全运算。

use crate::error::{AmlxError, FieldPath, Result};

/// 格式允许的最大时间值（毫秒），即有符号 64 位整数的最大值。
pub const MAX_TIME_MS: u64 = u64::MAX >> 1;

/// `MAX_TIME_MS + 1`，以浮点数精确表示。
const TIME_CEILING_EXCLUSIVE: f64 = 9_223_372_036_854_775_808.0;

/// 将浮点毫秒值四舍五入（远离零）为整数毫秒。
pub fn to_millis(value: f64, at: FieldPath) -> Result<u64> {
    if !value.is_finite() || value < 0.0 {
        return Err(AmlxError::InvalidTiming { at, value });
    }
    let rounded = value.round();
    if rounded >= TIME_CEILING_EXCLUSIVE {
        return Err(AmlxError::TimingOverflow { at });
    }
    Ok(rounded as u64)
}

/// 带上限检查的时间加法。
pub fn safe_add(base: u64, delta: u64, at: FieldPath) -> Result<u64> {
    base.checked_add(delta)
        .filter(|sum| *sum <= MAX_TIME_MS)
        .ok_or(AmlxError::TimingOverflow { at })
}

/// 检查解码出的时间值没有超过上限。
pub const fn check_ceiling(value: u64, at: FieldPath) -> Result<u64> {
    if value > MAX_TIME_MS {
        Err(AmlxError::TimingOverflow { at })
    } else {
        Ok(value)
    }
}
