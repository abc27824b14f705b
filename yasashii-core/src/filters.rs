use crate::{DueStatus, Pool, PracticeItem};
use chrono::{DateTime, Utc};

pub fn filter_by_due(pool: &Pool, now: DateTime<Utc>, want: DueStatus) -> Vec<&PracticeItem> {
    pool.iter().filter(|c| c.due_status(now) == want).collect()
}

/// Items whose most recent answer was wrong.
pub fn filter_weak(pool: &Pool) -> Vec<&PracticeItem> {
    pool.iter()
        .filter(|c| c.last_entry().map(|h| !h.correct).unwrap_or(false))
        .collect()
}

/// Items to present this round, in stored order: the weak ones only when
/// `weak_only`, otherwise the whole pool.
pub fn practice_pool(pool: &Pool, weak_only: bool) -> Pool {
    if !weak_only {
        return pool.clone();
    }
    let items = filter_weak(pool).into_iter().cloned().collect();
    // A subset of a pool keeps its ids unique.
    Pool::new(items).unwrap_or_default()
}
