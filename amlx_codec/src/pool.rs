//! 字符串池：编码侧的去重构建器与解码侧的索引表。

use std::collections::HashMap;

use amll_core::LyricDocument;

use crate::{
    error::{AmlxError, FieldPath, Result, Scope},
    reader::ByteReader,
    varint::write_varint,
};

/// 编码侧的字符串池构建器。
///
/// 按首次插入顺序为每个不同的字符串分配从 0 开始的连续 ID，重复插入返回已有 ID。
#[derive(Debug, Default)]
pub struct StringPoolBuilder<'a> {
    index: HashMap<&'a str, u64>,
    strings: Vec<&'a str>,
}

impl<'a> StringPoolBuilder<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 按固定顺序收集文档中所有字符串：
    /// 元数据的键与值，然后逐行收集翻译、罗马音，再逐词收集文本与单词罗马音。
    #[must_use]
    pub fn from_document(document: &'a LyricDocument) -> Self {
        let mut pool = Self::new();

        for entry in &document.metadata {
            pool.add(&entry.key);
            for value in &entry.values {
                pool.add(value);
            }
        }

        for line in &document.lines {
            if let Some(translated) = &line.translated_lyric {
                pool.add(translated);
            }
            if let Some(roman) = &line.roman_lyric {
                pool.add(roman);
            }
            for word in &line.words {
                pool.add(&word.text);
                if let Some(roman_word) = &word.roman_word {
                    pool.add(roman_word);
                }
            }
        }

        pool
    }

    /// 插入字符串并返回其 ID。
    pub fn add(&mut self, value: &'a str) -> u64 {
        if let Some(&id) = self.index.get(value) {
            return id;
        }
        let id = self.strings.len() as u64;
        self.strings.push(value);
        self.index.insert(value, id);
        id
    }

    #[must_use]
    pub fn get(&self, value: &str) -> Option<u64> {
        self.index.get(value).copied()
    }

    /// 查找字符串的 ID。字符串不在池中说明池与文档不一致，属于内部错误。
    pub fn require(&self, value: &str, at: FieldPath) -> Result<u64> {
        self.get(value).ok_or_else(|| AmlxError::Internal {
            at,
            message: "字符串不在字符串池中".to_string(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// 写出字符串池段：数量，然后逐条写出字节长度与 UTF-8 字节。
    pub fn write_section(&self, out: &mut Vec<u8>) {
        write_varint(out, self.strings.len() as u64);
        for value in &self.strings {
            write_varint(out, value.len() as u64);
            out.extend_from_slice(value.as_bytes());
        }
    }
}

/// 解码侧的字符串池。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringPool {
    strings: Vec<String>,
}

impl StringPool {
    /// 读取字符串池段。
    pub fn read_section(reader: &mut ByteReader<'_>) -> Result<Self> {
        let (count, capacity) = reader.read_count(1, FieldPath::root("string_count"))?;
        let mut strings = Vec::with_capacity(capacity);

        for i in 0..count as usize {
            let scope = Scope::PoolString(i);
            let len = reader.read_varint(FieldPath::new(scope, "length"))?;
            let at = FieldPath::new(scope, "bytes");
            let raw = reader.read_bytes(len, at)?;
            let value = std::str::from_utf8(raw).map_err(|e| AmlxError::InvalidUtf8 {
                at,
                valid_up_to: e.valid_up_to(),
            })?;
            strings.push(value.to_owned());
        }

        Ok(Self { strings })
    }

    /// 按 ID 取出字符串，带越界检查。
    pub fn resolve(&self, id: u64, at: FieldPath) -> Result<&str> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.strings.get(i))
            .map(String::as_str)
            .ok_or(AmlxError::StringIndexOutOfBounds {
                at,
                index: id,
                pool_size: self.strings.len(),
            })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    #[must_use]
    pub fn strings(&self) -> &[String] {
        &self.strings
    }
}
