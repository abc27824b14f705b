use crate::{CoreError, HistoryEntry, OutcomeLevel, Pool};
use chrono::{DateTime, Duration, Utc};

/// Fixed three-tier interval. Streak-aware promotion is not modelled; the
/// caller picks the level.
pub fn interval_for(level: OutcomeLevel) -> Duration {
    match level {
        OutcomeLevel::Wrong => Duration::days(1),
        OutcomeLevel::Ok => Duration::days(3),
        OutcomeLevel::Strong => Duration::days(7),
    }
}

pub fn schedule_next(level: OutcomeLevel, now: DateTime<Utc>) -> DateTime<Utc> {
    now + interval_for(level)
}

/// Applies one answer to the item `id`: the due time is recomputed from
/// `level` alone and exactly one history entry is appended.
pub fn record_outcome(
    mut pool: Pool,
    id: &str,
    level: OutcomeLevel,
    latency_ms: Option<u64>,
    now: DateTime<Utc>,
) -> Result<Pool, CoreError> {
    let item = pool
        .get_mut(id)
        .ok_or_else(|| CoreError::NotFound(format!("item {id}")))?;

    item.due = schedule_next(level, now);
    item.history.push(HistoryEntry {
        at: now,
        correct: level.is_correct(),
        time_ms: latency_ms,
    });

    tracing::debug!(item = id, level = level.as_score(), due = %item.due, "recorded outcome");
    Ok(pool)
}

/// Round-robin cursor over a pool, wrapping at the end.
pub fn next_index(pool: &Pool, cursor: usize) -> usize {
    if pool.is_empty() {
        0
    } else {
        (cursor + 1) % pool.len()
    }
}
