use crate::{Pool, PracticeItem, SessionResult};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub total: u32,
    pub correct: u32,
    pub wrong: u32,
}

impl Totals {
    pub fn record(&mut self, correct: bool) {
        self.total += 1;
        if correct {
            self.correct += 1;
        } else {
            self.wrong += 1;
        }
    }

    pub fn accuracy(&self) -> f32 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f32 / self.total as f32
        }
    }
}

pub fn per_day<I>(answers: I) -> BTreeMap<NaiveDate, Totals>
where
    I: IntoIterator<Item = (DateTime<Utc>, bool)>,
{
    let mut map: BTreeMap<NaiveDate, Totals> = BTreeMap::new();
    for (at, correct) in answers {
        map.entry(at.date_naive()).or_default().record(correct);
    }
    map
}

/// Stored day-count streak after a review at `now`: unchanged when the last
/// review was already today, +1 when it was yesterday, otherwise restarts at 1.
pub fn advance_streak(streak: u32, last_review: Option<DateTime<Utc>>, now: DateTime<Utc>) -> u32 {
    let today = now.date_naive();
    match last_review.map(|t| t.date_naive()) {
        Some(day) if day == today => streak.max(1),
        Some(day) if day + Duration::days(1) == today => streak.saturating_add(1),
        _ => 1,
    }
}

pub fn pool_answers(pool: &Pool) -> impl Iterator<Item = (DateTime<Utc>, bool)> + '_ {
    pool.iter()
        .flat_map(|item: &PracticeItem| item.history.iter().map(|h| (h.at, h.correct)))
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionSummary {
    pub totals: Totals,
    pub average_time_ms: Option<u64>,
    /// Up to five labels, most often wrong first.
    pub weakest: Vec<String>,
}

impl SessionSummary {
    pub fn from_results(results: &[SessionResult]) -> Self {
        let mut totals = Totals::default();
        let mut wrong_counts: HashMap<&str, u32> = HashMap::new();
        let (mut timed, mut time_sum) = (0u64, 0u64);

        for r in results {
            totals.record(r.correct);
            if !r.correct {
                *wrong_counts.entry(r.label.as_str()).or_default() += 1;
            }
            if let Some(t) = r.time_ms {
                timed += 1;
                time_sum = time_sum.saturating_add(t);
            }
        }

        let mut ranked: Vec<(&str, u32)> = wrong_counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        let weakest = ranked.into_iter().take(5).map(|(l, _)| l.to_string()).collect();

        Self {
            totals,
            average_time_ms: (timed > 0).then(|| (time_sum as f64 / timed as f64).round() as u64),
            weakest,
        }
    }
}
