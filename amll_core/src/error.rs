use std::io;

use quick_xml::{
    Error as QuickXmlErrorMain, encoding::EncodingError,
    events::attributes::AttrError as QuickXmlAttrError,
};
use thiserror::Error;

/// 读写 TTML 标记时的错误。
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("XML 错误: {0}")]
    Xml(#[from] QuickXmlErrorMain),
    /// 属性值无法读取。
    #[error("XML 属性错误: {0}")]
    Attribute(#[from] QuickXmlAttrError),
    /// 时间值不符合 TTML 时间语法。
    #[error("无效的时间格式: {0}")]
    InvalidTime(String),
    /// 其余无法归类的错误。
    #[error("错误: {0}")]
    Internal(String),
    #[error("IO 错误: {0}")]
    Io(#[from] io::Error),
    /// 生成结果不是合法 UTF-8。
    #[error("UTF-8 转换错误: {0}")]
    FromUtf8(#[from] std::string::FromUtf8Error),
    /// 文本解码失败。
    #[error("文本编码或解码错误: {0}")]
    Encoding(#[from] EncodingError),
}

impl From<ConvertError> for std::io::Error {
    fn from(err: ConvertError) -> Self {
        Self::other(err)
    }
}

impl ConvertError {
    /// 包装读取文本节点时产生的 `quick-xml` 错误。
    #[must_use]
    pub fn new_parse(err: impl Into<QuickXmlErrorMain>) -> Self {
        Self::Xml(err.into())
    }
}
