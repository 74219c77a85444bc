use crate::{ConvertError, LyricDocument};

/// 文本标记层的协作接口。
///
/// 二进制编解码器只通过此 trait 与具体的标记格式交互，
/// 因此“标记 → 二进制”与“二进制 → 标记”两个桥接函数可以复用任何实现。
pub trait LyricMarkup {
    /// 将标记文本解析为歌词文档。
    fn to_document(&self, text: &str) -> Result<LyricDocument, ConvertError>;

    /// 将歌词文档序列化为标记文本。
    fn from_document(&self, document: &LyricDocument, pretty: bool)
    -> Result<String, ConvertError>;
}
