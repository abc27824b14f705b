use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

pub type ItemId = String;

pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// The two practice categories. Each owns a separate pool; items are never shared.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PoolKind {
    Vocab,
    Sentences,
}

impl PoolKind {
    pub const ALL: [PoolKind; 2] = [PoolKind::Vocab, PoolKind::Sentences];

    pub fn storage_key(&self) -> &'static str {
        match self {
            PoolKind::Vocab => "vocab_queue",
            PoolKind::Sentences => "sentence_queue",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PoolKind::Vocab => "vocab",
            PoolKind::Sentences => "sentences",
        }
    }
}

/// Confidence level chosen by the caller for one answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutcomeLevel {
    Wrong,
    Ok,
    Strong,
}

impl OutcomeLevel {
    pub fn as_score(&self) -> u8 {
        match self {
            OutcomeLevel::Wrong => 0,
            OutcomeLevel::Ok => 1,
            OutcomeLevel::Strong => 2,
        }
    }

    /// The practice panels' policy: any correct answer goes straight to the
    /// strongest tier, a wrong one to the weakest.
    pub fn from_answer(correct: bool) -> Self {
        if correct {
            OutcomeLevel::Strong
        } else {
            OutcomeLevel::Wrong
        }
    }

    pub fn is_correct(&self) -> bool {
        !matches!(self, OutcomeLevel::Wrong)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DueStatus {
    New,
    Due,
    Future,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    #[serde(rename = "t", with = "chrono::serde::ts_milliseconds")]
    pub at: DateTime<Utc>,
    pub correct: bool,
    #[serde(rename = "timeMs", default, skip_serializing_if = "Option::is_none")]
    pub time_ms: Option<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VocabPrompt {
    pub jp: String,
    pub romaji: String,
    /// Indonesian meaning; the expected answer.
    pub idn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentencePrompt {
    pub pattern: String,
    pub answer: Vec<String>,
    pub hints: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Prompt {
    Vocab(VocabPrompt),
    Sentence(SentencePrompt),
}

impl Prompt {
    pub fn check(&self, answer: &str) -> bool {
        match self {
            Prompt::Vocab(v) => answer.trim() == v.idn,
            Prompt::Sentence(s) => {
                let a = answer.trim();
                s.answer.iter().any(|x| x == a)
            }
        }
    }

    /// Short display form, also used to group wrong answers in summaries.
    pub fn label(&self) -> &str {
        match self {
            Prompt::Vocab(v) => &v.jp,
            Prompt::Sentence(s) => &s.pattern,
        }
    }

    /// Text handed to speech synthesis when no recording can be played.
    pub fn spoken_text(&self) -> String {
        match self {
            Prompt::Vocab(v) => v.jp.clone(),
            Prompt::Sentence(_) => self.example(),
        }
    }

    pub fn example(&self) -> String {
        match self {
            Prompt::Vocab(v) => format!("{}（{}）= {}", v.jp, v.romaji, v.idn),
            Prompt::Sentence(s) => {
                let first = s.answer.first().map(String::as_str).unwrap_or_default();
                s.pattern.replacen("___", first, 1)
            }
        }
    }

    pub fn hint(&self) -> String {
        match self {
            Prompt::Vocab(v) => format!("{} artinya {}.", v.romaji, v.idn),
            Prompt::Sentence(s) => s.hints.clone(),
        }
    }

    /// Explicit recording URL, if the item carries one. Empty strings count as none.
    pub fn audio_url(&self) -> Option<&str> {
        let a = match self {
            Prompt::Vocab(v) => v.audio.as_deref(),
            Prompt::Sentence(s) => s.audio.as_deref(),
        };
        a.filter(|s| !s.trim().is_empty())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PracticeItem {
    pub id: ItemId,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub due: DateTime<Utc>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    #[serde(flatten)]
    pub prompt: Prompt,
}

impl PracticeItem {
    pub fn new(id: impl Into<String>, prompt: Prompt) -> Self {
        Self {
            id: id.into(),
            due: DateTime::<Utc>::UNIX_EPOCH,
            history: Vec::new(),
            prompt,
        }
    }

    pub fn is_new(&self) -> bool {
        self.history.is_empty()
    }

    pub fn due_status(&self, now: DateTime<Utc>) -> DueStatus {
        if self.is_new() {
            DueStatus::New
        } else if self.due > now {
            DueStatus::Future
        } else {
            DueStatus::Due
        }
    }

    pub fn last_entry(&self) -> Option<&HistoryEntry> {
        self.history.last()
    }
}

/// One category's items, in presentation order, with unique ids.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(try_from = "Vec<PracticeItem>", into = "Vec<PracticeItem>")]
pub struct Pool {
    items: Vec<PracticeItem>,
}

impl Pool {
    pub fn new(items: Vec<PracticeItem>) -> Result<Self, CoreError> {
        for (i, item) in items.iter().enumerate() {
            if items[..i].iter().any(|x| x.id == item.id) {
                return Err(CoreError::Conflict(format!("duplicate item id {}", item.id)));
            }
        }
        Ok(Self { items })
    }

    pub fn get(&self, id: &str) -> Option<&PracticeItem> {
        self.items.iter().find(|x| x.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut PracticeItem> {
        self.items.iter_mut().find(|x| x.id == id)
    }

    pub fn at(&self, index: usize) -> Option<&PracticeItem> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PracticeItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl TryFrom<Vec<PracticeItem>> for Pool {
    type Error = CoreError;

    fn try_from(items: Vec<PracticeItem>) -> Result<Self, Self::Error> {
        Pool::new(items)
    }
}

impl From<Pool> for Vec<PracticeItem> {
    fn from(pool: Pool) -> Self {
        pool.items
    }
}

/// One answer given during the current practice session.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionResult {
    #[serde(rename = "type")]
    pub kind: PoolKind,
    #[serde(rename = "itemId")]
    pub item_id: ItemId,
    pub label: String,
    pub correct: bool,
    #[serde(rename = "timeMs", default, skip_serializing_if = "Option::is_none")]
    pub time_ms: Option<u64>,
}
