#![allow(dead_code)]

use amll_core::{LyricDocument, LyricLine, LyricWord, MetadataEntry};
use rand::{Rng, SeedableRng, rngs::StdRng};

/// 覆盖所有可选字段与标记位的样例文档。
pub fn sample_document() -> LyricDocument {
    let mut hel = LyricWord::new("Hel", 900.0, 1100.0);
    hel.roman_word = Some("he".to_string());
    let mut lo = LyricWord::new("lo", 1100.0, 1500.0);
    lo.obscene = true;
    lo.empty_beat_ms = Some(200.0);
    lo.roman_warning = true;

    let mut main = LyricLine::new(1000.0, 1300.0, vec![hel, lo]);
    main.translated_lyric = Some("你好".to_string());

    let mut background = LyricLine::new(
        1600.0,
        1800.0,
        vec![LyricWord::new("Hel", 1600.0, 1800.0)],
    );
    background.is_background = true;
    background.is_duet = true;
    background.roman_lyric = Some("ro".to_string());

    LyricDocument::new(
        vec![MetadataEntry::new("album", ["1989", "Deluxe"])],
        vec![main, background],
    )
}

const VOCAB: &[&str] = &["la", " ", "你", "好", "the", "", "(ooh)", "ａ", "la"];

fn pick(rng: &mut StdRng) -> String {
    VOCAB[rng.random_range(0..VOCAB.len())].to_string()
}

/// 以微秒精度落在 `around` 之后两千毫秒内的时间。
fn time_after(rng: &mut StdRng, around: f64) -> f64 {
    around + f64::from(rng.random_range(0..2_000_000_u32)) / 1000.0
}

/// 由种子决定的随机文档，覆盖所有可选字段、空串与无效空拍。
pub fn random_document(seed: u64) -> LyricDocument {
    let mut rng = StdRng::seed_from_u64(seed);

    let metadata = (0..rng.random_range(0..4))
        .map(|_| MetadataEntry {
            key: pick(&mut rng),
            values: (0..rng.random_range(0..3)).map(|_| pick(&mut rng)).collect(),
            error: rng.random_bool(0.2),
        })
        .collect();

    let lines = (0..rng.random_range(0..8))
        .map(|_| {
            let base = time_after(&mut rng, 0.0);
            let words = (0..rng.random_range(0..6))
                .map(|_| {
                    let text = pick(&mut rng);
                    let start = time_after(&mut rng, base);
                    let end = time_after(&mut rng, base);
                    let mut word = LyricWord::new(text, start, end);
                    word.obscene = rng.random_bool(0.1);
                    word.roman_warning = rng.random_bool(0.1);
                    word.roman_word = rng.random_bool(0.3).then(|| pick(&mut rng));
                    word.empty_beat_ms = match rng.random_range(0..5) {
                        0 => Some(f64::NAN),
                        1 => Some(time_after(&mut rng, 0.0)),
                        2 => Some(0.2),
                        _ => None,
                    };
                    word
                })
                .collect();
            let end = time_after(&mut rng, base);
            let mut line = LyricLine::new(base, end, words);
            line.is_background = rng.random_bool(0.2);
            line.is_duet = rng.random_bool(0.2);
            line.ignore_sync = rng.random_bool(0.1);
            line.translated_lyric = rng.random_bool(0.4).then(|| pick(&mut rng));
            line.roman_lyric = rng.random_bool(0.4).then(|| pick(&mut rng));
            line
        })
        .collect();

    LyricDocument::new(metadata, lines)
}

/// 以编码器的规整规则计算解码后应得到的文档。
pub fn expected_after_round_trip(document: &LyricDocument) -> LyricDocument {
    let mut expected = document.normalized();
    for line in &mut expected.lines {
        for word in &mut line.words {
            if word.end_time_ms < word.start_time_ms {
                word.end_time_ms = word.start_time_ms;
            }
            line.start_time_ms = line.start_time_ms.min(word.start_time_ms);
            line.end_time_ms = line.end_time_ms.max(word.end_time_ms);
        }
        if line.end_time_ms < line.start_time_ms {
            line.end_time_ms = line.start_time_ms;
        }
    }
    expected
}
