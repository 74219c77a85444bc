use std::fmt;

use serde::{Deserialize, Serialize};

/// 歌词行或单词的不透明标识符。
///
/// ID 从不写入二进制格式，仅在一次解析/解码过程中保证唯一。
/// `ElementId::UNASSIGNED`（即 `0`）表示尚未分配。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct ElementId(pub u64);

impl ElementId {
    /// 未分配的 ID。
    pub const UNASSIGNED: Self = Self(0);

    #[must_use]
    pub const fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 由单次解析或解码调用持有的 ID 生成器。
///
/// 生成顺序即调用顺序：第一次调用返回 `ElementId(1)`，之后依次递增。
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    #[must_use]
    pub const fn new() -> Self {
        Self { last: 0 }
    }

    /// 生成下一个 ID。
    pub const fn next_id(&mut self) -> ElementId {
        self.last += 1;
        ElementId(self.last)
    }

    /// 已生成的 ID 数量。
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_is_sequential() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.next_id(), ElementId(1));
        assert_eq!(ids.next_id(), ElementId(2));
        assert_eq!(ids.issued(), 2);
        assert!(ElementId(2).is_assigned());
        assert!(!ElementId::UNASSIGNED.is_assigned());
    }

    #[test]
    fn test_generators_are_independent() {
        let mut first = IdGenerator::new();
        let mut second = IdGenerator::new();
        first.next_id();
        first.next_id();
        assert_eq!(second.next_id(), ElementId(1));
    }
}
