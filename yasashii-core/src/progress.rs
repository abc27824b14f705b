use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::PoolKind;

/// Per-item "last answer was right" flags plus the derived mastery ratio.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Progress {
    #[serde(default)]
    pub letters: BTreeMap<String, bool>,
    #[serde(default)]
    pub vocab: BTreeMap<String, bool>,
    #[serde(default)]
    pub sentences: BTreeMap<String, bool>,
    #[serde(default)]
    pub mastery: f64,
    #[serde(
        rename = "lastReview",
        default,
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub last_review: Option<DateTime<Utc>>,
}

impl Progress {
    pub fn record(&mut self, kind: PoolKind, id: &str, correct: bool, now: DateTime<Utc>) {
        let map = match kind {
            PoolKind::Vocab => &mut self.vocab,
            PoolKind::Sentences => &mut self.sentences,
        };
        map.insert(id.to_string(), correct);
        self.last_review = Some(now);
        self.mastery = self.compute_mastery();
    }

    pub fn compute_mastery(&self) -> f64 {
        let flags = self
            .letters
            .values()
            .chain(self.vocab.values())
            .chain(self.sentences.values());
        let (mut total, mut known) = (0u32, 0u32);
        for &ok in flags {
            total += 1;
            if ok {
                known += 1;
            }
        }
        if total == 0 {
            0.0
        } else {
            known as f64 / total as f64
        }
    }

    pub fn mastery_percent(&self) -> u32 {
        (self.mastery * 100.0).round() as u32
    }
}
