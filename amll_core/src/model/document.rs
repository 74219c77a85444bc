//! 歌词文档的数据模型。
//!
//! 标记层（TTML）解析器产出这些类型，二进制编解码器消费并重新产出它们。
//! 所有时间均为毫秒，以浮点数保存，直到编码时才被规整为整数。

use serde::{Deserialize, Serialize};

use super::id::ElementId;

/// 一条元数据。同一个键可以出现在多条元数据中，顺序会被保留。
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub key: String,
    #[serde(default)]
    pub values: Vec<String>,
    /// 由调用方定义含义的错误标记，例如“该元数据未通过上游校验”。
    #[serde(default)]
    pub error: bool,
}

impl MetadataEntry {
    #[must_use]
    pub fn new<K, I, V>(key: K, values: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
            error: false,
        }
    }
}

/// 一个单词，或者一个纯空白的间隔词。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LyricWord {
    #[serde(default)]
    pub id: ElementId,
    pub text: String,
    pub start_time_ms: f64,
    pub end_time_ms: f64,
    #[serde(default)]
    pub obscene: bool,
    /// 空拍时长。非有限值或非正值在语义上等同于不存在。
    #[serde(default)]
    pub empty_beat_ms: Option<f64>,
    #[serde(default)]
    pub roman_word: Option<String>,
    /// 该词的罗马音质量存疑。
    #[serde(default)]
    pub roman_warning: bool,
}

impl LyricWord {
    #[must_use]
    pub fn new(text: impl Into<String>, start_time_ms: f64, end_time_ms: f64) -> Self {
        Self {
            text: text.into(),
            start_time_ms,
            end_time_ms,
            ..Default::default()
        }
    }

    /// 是否为纯空白的间隔词。
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// 有效的空拍时长：仅当值有限且大于 0 时返回。
    #[must_use]
    pub fn effective_empty_beat_ms(&self) -> Option<f64> {
        self.empty_beat_ms.filter(|v| v.is_finite() && *v > 0.0)
    }
}

/// 一行歌词。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LyricLine {
    #[serde(default)]
    pub id: ElementId,
    #[serde(default)]
    pub words: Vec<LyricWord>,
    #[serde(default)]
    pub translated_lyric: Option<String>,
    #[serde(default)]
    pub roman_lyric: Option<String>,
    #[serde(default)]
    pub is_background: bool,
    #[serde(default)]
    pub is_duet: bool,
    #[serde(default)]
    pub ignore_sync: bool,
    pub start_time_ms: f64,
    pub end_time_ms: f64,
}

impl LyricLine {
    #[must_use]
    pub fn new(start_time_ms: f64, end_time_ms: f64, words: Vec<LyricWord>) -> Self {
        Self {
            words,
            start_time_ms,
            end_time_ms,
            ..Default::default()
        }
    }

    /// 非空白单词的数量。
    #[must_use]
    pub fn non_blank_word_count(&self) -> usize {
        self.words.iter().filter(|w| !w.is_blank()).count()
    }
}

/// 顶层歌词文档：有序的元数据与有序的歌词行。
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LyricDocument {
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
    #[serde(default)]
    pub lines: Vec<LyricLine>,
}

impl LyricDocument {
    #[must_use]
    pub const fn new(metadata: Vec<MetadataEntry>, lines: Vec<LyricLine>) -> Self {
        Self { metadata, lines }
    }

    /// 用于比较的规范化副本。
    ///
    /// 清除所有 ID，将时间四舍五入到整毫秒，并移除无效的空拍。
    #[must_use]
    pub fn normalized(&self) -> Self {
        let lines = self
            .lines
            .iter()
            .map(|line| LyricLine {
                id: ElementId::UNASSIGNED,
                words: line
                    .words
                    .iter()
                    .map(|word| LyricWord {
                        id: ElementId::UNASSIGNED,
                        start_time_ms: word.start_time_ms.round(),
                        end_time_ms: word.end_time_ms.round(),
                        empty_beat_ms: word
                            .effective_empty_beat_ms()
                            .map(f64::round)
                            .filter(|v| *v > 0.0),
                        ..word.clone()
                    })
                    .collect(),
                start_time_ms: line.start_time_ms.round(),
                end_time_ms: line.end_time_ms.round(),
                ..line.clone()
            })
            .collect();

        Self {
            metadata: self.metadata.clone(),
            lines,
        }
    }

    /// 忽略 ID、按整毫秒比较两个文档的内容。
    #[must_use]
    pub fn content_eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }

    /// 所有行中单词的总数。
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.lines.iter().map(|l| l.words.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_empty_beat() {
        let mut word = LyricWord::new("x", 0.0, 1.0);
        assert_eq!(word.effective_empty_beat_ms(), None);

        word.empty_beat_ms = Some(f64::NAN);
        assert_eq!(word.effective_empty_beat_ms(), None);
        word.empty_beat_ms = Some(f64::INFINITY);
        assert_eq!(word.effective_empty_beat_ms(), None);
        word.empty_beat_ms = Some(-3.0);
        assert_eq!(word.effective_empty_beat_ms(), None);
        word.empty_beat_ms = Some(120.0);
        assert_eq!(word.effective_empty_beat_ms(), Some(120.0));
    }

    #[test]
    fn test_content_eq_ignores_ids_and_sub_millisecond_noise() {
        let mut a = LyricDocument::new(
            vec![MetadataEntry::new("album", ["1989", "Deluxe"])],
            vec![LyricLine::new(
                1000.2,
                2000.0,
                vec![LyricWord::new("Hel", 1000.4, 1500.0)],
            )],
        );
        let mut b = a.clone();
        a.lines[0].id = ElementId(7);
        a.lines[0].words[0].id = ElementId(8);
        b.lines[0].start_time_ms = 1000.0;
        b.lines[0].words[0].start_time_ms = 999.6;

        assert!(a.content_eq(&b));

        b.lines[0].words[0].text = "Hello".to_string();
        assert!(!a.content_eq(&b));
    }

    #[test]
    fn test_content_eq_treats_invalid_empty_beat_as_absent() {
        let mut word = LyricWord::new("x", 0.0, 10.0);
        word.empty_beat_ms = Some(f64::NAN);
        let a = LyricDocument::new(vec![], vec![LyricLine::new(0.0, 10.0, vec![word])]);
        let b = LyricDocument::new(
            vec![],
            vec![LyricLine::new(0.0, 10.0, vec![LyricWord::new("x", 0.0, 10.0)])],
        );
        assert!(a.content_eq(&b));
    }

    #[test]
    fn test_serde_defaults() {
        let json = r#"{"lines":[{"start_time_ms":0.0,"end_time_ms":5.0,
            "words":[{"text":"a","start_time_ms":0.0,"end_time_ms":5.0}]}]}"#;
        let doc: LyricDocument = serde_json::from_str(json).unwrap();
        assert!(doc.metadata.is_empty());
        assert_eq!(doc.lines[0].words[0].text, "a");
        assert_eq!(doc.lines[0].words[0].empty_beat_ms, None);
        assert!(!doc.lines[0].ignore_sync);
    }
}
