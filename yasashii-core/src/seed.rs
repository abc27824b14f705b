//! Built-in content used when a pool has never been stored.

use crate::{Pool, PoolKind, PracticeItem, Prompt, SentencePrompt, VocabPrompt};

fn vocab(id: &str, jp: &str, romaji: &str, idn: &str, img: &str) -> PracticeItem {
    PracticeItem::new(
        id,
        Prompt::Vocab(VocabPrompt {
            jp: jp.into(),
            romaji: romaji.into(),
            idn: idn.into(),
            img: Some(img.into()),
            audio: None,
        }),
    )
}

fn sentence(id: &str, pattern: &str, answer: &[&str], hints: &str) -> PracticeItem {
    PracticeItem::new(
        id,
        Prompt::Sentence(SentencePrompt {
            pattern: pattern.into(),
            answer: answer.iter().map(|s| s.to_string()).collect(),
            hints: hints.into(),
            audio: None,
        }),
    )
}

pub fn default_vocab() -> Vec<PracticeItem> {
    vec![
        vocab(
            "cat",
            "ねこ",
            "neko",
            "kucing",
            "https://images.unsplash.com/photo-1518791841217-8f162f1e1131?w=300&auto=format&fit=crop&q=60",
        ),
        vocab(
            "dog",
            "いぬ",
            "inu",
            "anjing",
            "https://images.unsplash.com/photo-1517849845537-4d257902454a?w=300&auto=format&fit=crop&q=60",
        ),
        vocab(
            "book",
            "ほん",
            "hon",
            "buku",
            "https://images.unsplash.com/photo-1519681393784-d120267933ba?w=300&auto=format&fit=crop&q=60",
        ),
    ]
}

pub fn default_sentences() -> Vec<PracticeItem> {
    vec![
        sentence(
            "watashi-desu",
            "わたしは ___ です",
            &["がくせい", "せんせい", "にほんじん"],
            "Isi dengan kata benda tanpa partikel.",
        ),
        sentence(
            "kore-wa",
            "これは ___ です",
            &["ほん", "ねこ", "ペン"],
            "Gunakan bentuk kamus (kata dasar).",
        ),
    ]
}

pub fn default_pool(kind: PoolKind) -> Pool {
    let items = match kind {
        PoolKind::Vocab => default_vocab(),
        PoolKind::Sentences => default_sentences(),
    };
    // Seed ids are distinct literals.
    Pool::new(items).unwrap_or_default()
}
