//! 歌词数据段：行与单词的编码、规整与校验。

use amll_core::{IdGenerator, LyricLine, LyricWord};
use tracing::trace;

use crate::{
    error::{AmlxError, FieldPath, Result, Scope},
    flags::{LineFlags, WordFlags},
    pool::{StringPool, StringPoolBuilder},
    reader::ByteReader,
    timing::{check_ceiling, safe_add, to_millis},
    varint::write_varint,
};

/// 一个已规整、待写出的单词。
struct EncodedWord {
    start: u64,
    end: u64,
    text_id: u64,
    flags: WordFlags,
    roman_id: Option<u64>,
    empty_beat: Option<u64>,
}

/// 写出歌词数据段。
pub fn write_lyric_data(
    lines: &[LyricLine],
    pool: &StringPoolBuilder<'_>,
    out: &mut Vec<u8>,
) -> Result<()> {
    write_varint(out, lines.len() as u64);
    for (i, line) in lines.iter().enumerate() {
        write_line(i, line, pool, out)?;
    }
    Ok(())
}

fn write_line(
    line_index: usize,
    line: &LyricLine,
    pool: &StringPoolBuilder<'_>,
    out: &mut Vec<u8>,
) -> Result<()> {
    let scope = Scope::Line(line_index);
    let mut line_start = to_millis(line.start_time_ms, FieldPath::new(scope, "start_time"))?;
    let mut line_end = to_millis(line.end_time_ms, FieldPath::new(scope, "end_time"))?;

    let mut words = Vec::with_capacity(line.words.len());
    for (word_index, word) in line.words.iter().enumerate() {
        let encoded = encode_word(line_index, word_index, word, pool)?;

        if encoded.start < line_start {
            trace!(
                "line[{line_index}] 的起始时间随 word[{word_index}] 前移: {line_start} -> {}",
                encoded.start
            );
            line_start = encoded.start;
        }
        if encoded.end > line_end {
            trace!(
                "line[{line_index}] 的结束时间随 word[{word_index}] 后延: {line_end} -> {}",
                encoded.end
            );
            line_end = encoded.end;
        }

        words.push(encoded);
    }

    if line_end < line_start {
        trace!("line[{line_index}] 的结束时间被规整为起始时间 {line_start}");
        line_end = line_start;
    }

    let mut flags = LineFlags::empty();
    flags.set(LineFlags::BACKGROUND, line.is_background);
    flags.set(LineFlags::DUET, line.is_duet);
    flags.set(LineFlags::IGNORE_SYNC, line.ignore_sync);
    flags.set(LineFlags::HAS_TRANSLATED, line.translated_lyric.is_some());
    flags.set(LineFlags::HAS_ROMAN, line.roman_lyric.is_some());

    write_varint(out, line_start);
    write_varint(out, line_end);
    out.push(flags.bits());
    write_varint(out, words.len() as u64);

    if let Some(translated) = &line.translated_lyric {
        write_varint(
            out,
            pool.require(translated, FieldPath::new(scope, "translated_string_id"))?,
        );
    }
    if let Some(roman) = &line.roman_lyric {
        write_varint(
            out,
            pool.require(roman, FieldPath::new(scope, "roman_string_id"))?,
        );
    }

    for word in &words {
        write_varint(out, word.start - line_start);
        write_varint(out, word.end - word.start);
        write_varint(out, word.text_id);
        out.push(word.flags.bits());
        if let Some(roman_id) = word.roman_id {
            write_varint(out, roman_id);
        }
        if let Some(empty_beat) = word.empty_beat {
            write_varint(out, empty_beat);
        }
    }

    Ok(())
}

fn encode_word(
    line_index: usize,
    word_index: usize,
    word: &LyricWord,
    pool: &StringPoolBuilder<'_>,
) -> Result<EncodedWord> {
    let scope = Scope::Word(line_index, word_index);
    let start = to_millis(word.start_time_ms, FieldPath::new(scope, "start_time"))?;
    let mut end = to_millis(word.end_time_ms, FieldPath::new(scope, "end_time"))?;
    if end < start {
        trace!("line[{line_index}].word[{word_index}] 的结束时间被规整为起始时间 {start}");
        end = start;
    }

    let text_id = pool.require(&word.text, FieldPath::new(scope, "text_string_id"))?;
    let roman_id = word
        .roman_word
        .as_deref()
        .map(|roman| pool.require(roman, FieldPath::new(scope, "roman_string_id")))
        .transpose()?;

    let empty_beat = match word.effective_empty_beat_ms() {
        Some(value) => {
            Some(to_millis(value, FieldPath::new(scope, "empty_beat_ms"))?).filter(|ms| *ms > 0)
        }
        None => None,
    };
    if empty_beat.is_none() && word.empty_beat_ms.is_some() {
        trace!(
            "line[{line_index}].word[{word_index}] 的空拍 {:?} 不是正数，已省略",
            word.empty_beat_ms
        );
    }

    let mut flags = WordFlags::empty();
    flags.set(WordFlags::OBSCENE, word.obscene);
    flags.set(WordFlags::HAS_EMPTY_BEAT, empty_beat.is_some());
    flags.set(WordFlags::HAS_ROMAN_WORD, roman_id.is_some());
    flags.set(WordFlags::ROMAN_WARNING, word.roman_warning);

    Ok(EncodedWord {
        start,
        end,
        text_id,
        flags,
        roman_id,
        empty_beat,
    })
}

/// 读取歌词数据段。每行及其单词按解码顺序从 `ids` 获取新的 ID。
pub fn read_lyric_data(
    reader: &mut ByteReader<'_>,
    pool: &StringPool,
    ids: &mut IdGenerator,
) -> Result<Vec<LyricLine>> {
    // 每行至少包含起止时间、标记字节和单词数量
    let (count, capacity) = reader.read_count(4, FieldPath::root("line_count"))?;
    let mut lines = Vec::with_capacity(capacity);
    for i in 0..count as usize {
        lines.push(read_line(reader, i, pool, ids)?.line);
    }
    Ok(lines)
}

/// 解码出的一行，附带线路上的原始起止时间与标记。
///
/// 模型中的时间是 `f64`，接近上限的整数毫秒无法精确表示：
/// `MAX_TIME_MS` 解码后变为 2^63，再次编码会得到 `TimingOverflow`。
/// 需要精确值时使用 `start_ms` / `end_ms`。
pub(crate) struct LineRecord {
    pub(crate) line: LyricLine,
    pub(crate) flags: LineFlags,
    pub(crate) start_ms: u64,
    pub(crate) end_ms: u64,
}

/// 读取单行。
pub(crate) fn read_line(
    reader: &mut ByteReader<'_>,
    line_index: usize,
    pool: &StringPool,
    ids: &mut IdGenerator,
) -> Result<LineRecord> {
    let scope = Scope::Line(line_index);

    let at = FieldPath::new(scope, "start_time");
    let start = check_ceiling(reader.read_varint(at)?, at)?;
    let at = FieldPath::new(scope, "end_time");
    let end = check_ceiling(reader.read_varint(at)?, at)?;
    if end < start {
        return Err(AmlxError::LineTimingRegression {
            at: FieldPath::new(scope, "end_time"),
            start,
            end,
        });
    }

    let at = FieldPath::new(scope, "line_flags");
    let flags = LineFlags::from_byte(reader.read_u8(at)?, at)?;

    // 每个单词至少包含增量、时长、文本 ID 和标记字节
    let (word_count, capacity) = reader.read_count(4, FieldPath::new(scope, "word_count"))?;

    let mut line = LyricLine {
        id: ids.next_id(),
        words: Vec::with_capacity(capacity),
        is_background: flags.contains(LineFlags::BACKGROUND),
        is_duet: flags.contains(LineFlags::DUET),
        ignore_sync: flags.contains(LineFlags::IGNORE_SYNC),
        start_time_ms: start as f64,
        end_time_ms: end as f64,
        ..Default::default()
    };

    if flags.contains(LineFlags::HAS_TRANSLATED) {
        let at = FieldPath::new(scope, "translated_string_id");
        let id = reader.read_varint(at)?;
        line.translated_lyric = Some(pool.resolve(id, at)?.to_owned());
    }
    if flags.contains(LineFlags::HAS_ROMAN) {
        let at = FieldPath::new(scope, "roman_string_id");
        let id = reader.read_varint(at)?;
        line.roman_lyric = Some(pool.resolve(id, at)?.to_owned());
    }

    for word_index in 0..word_count as usize {
        let word = read_word(reader, line_index, word_index, start, pool, ids)?;
        line.words.push(word);
    }

    Ok(LineRecord {
        line,
        flags,
        start_ms: start,
        end_ms: end,
    })
}

fn read_word(
    reader: &mut ByteReader<'_>,
    line_index: usize,
    word_index: usize,
    line_start: u64,
    pool: &StringPool,
    ids: &mut IdGenerator,
) -> Result<LyricWord> {
    let scope = Scope::Word(line_index, word_index);

    let delta_start = reader.read_varint(FieldPath::new(scope, "delta_start_time"))?;
    let duration = reader.read_varint(FieldPath::new(scope, "duration"))?;
    let text_at = FieldPath::new(scope, "text_string_id");
    let text_id = reader.read_varint(text_at)?;
    let at = FieldPath::new(scope, "word_flags");
    let flags = WordFlags::from_byte(reader.read_u8(at)?, at)?;

    let start = safe_add(line_start, delta_start, FieldPath::new(scope, "start_time"))?;
    let end = safe_add(start, duration, FieldPath::new(scope, "end_time"))?;
    let text = pool.resolve(text_id, text_at)?.to_owned();

    let roman_word = if flags.contains(WordFlags::HAS_ROMAN_WORD) {
        let at = FieldPath::new(scope, "roman_string_id");
        let id = reader.read_varint(at)?;
        Some(pool.resolve(id, at)?.to_owned())
    } else {
        None
    };

    let empty_beat_ms = if flags.contains(WordFlags::HAS_EMPTY_BEAT) {
        let at = FieldPath::new(scope, "empty_beat_ms");
        let value = check_ceiling(reader.read_varint(at)?, at)?;
        Some(value as f64).filter(|v| *v > 0.0)
    } else {
        None
    };

    Ok(LyricWord {
        id: ids.next_id(),
        text,
        start_time_ms: start as f64,
        end_time_ms: end as f64,
        obscene: flags.contains(WordFlags::OBSCENE),
        empty_beat_ms,
        roman_word,
        roman_warning: flags.contains(WordFlags::ROMAN_WARNING),
    })
}
