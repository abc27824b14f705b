use chrono::{DateTime, Duration, Utc};
use yasashii_core::{
    advance_streak, filter_by_due, filter_weak, per_day, pool_answers, practice_pool,
    record_outcome, seed, DueStatus, OutcomeLevel, PoolKind, SessionResult, SessionSummary,
};

fn result(label: &str, correct: bool, time_ms: Option<u64>) -> SessionResult {
    SessionResult {
        kind: PoolKind::Vocab,
        item_id: label.into(),
        label: label.into(),
        correct,
        time_ms,
    }
}

#[test]
fn filters_due_and_weak() {
    let now = Utc::now();
    let pool = seed::default_pool(PoolKind::Vocab);
    let pool = record_outcome(pool, "cat", OutcomeLevel::Wrong, None, now - Duration::days(2)).unwrap();
    let pool = record_outcome(pool, "dog", OutcomeLevel::Strong, None, now).unwrap();

    assert_eq!(filter_by_due(&pool, now, DueStatus::New).len(), 1);
    assert_eq!(filter_by_due(&pool, now, DueStatus::Due)[0].id, "cat");
    assert_eq!(filter_by_due(&pool, now, DueStatus::Future)[0].id, "dog");

    let weak = filter_weak(&pool);
    assert_eq!(weak.len(), 1);
    assert_eq!(weak[0].id, "cat");
    let ids = |p: &yasashii_core::Pool| p.iter().map(|x| x.id.clone()).collect::<Vec<_>>();
    assert_eq!(ids(&practice_pool(&pool, true)), vec!["cat"]);
    assert_eq!(ids(&practice_pool(&pool, false)), vec!["cat", "dog", "book"]);
}

#[test]
fn summary_counts_and_weakest() {
    let results = vec![
        result("ねこ", false, Some(1000)),
        result("いぬ", true, Some(2000)),
        result("ねこ", false, None),
        result("ほん", false, None),
    ];
    let s = SessionSummary::from_results(&results);
    assert_eq!(s.totals.total, 4);
    assert_eq!(s.totals.wrong, 3);
    assert_eq!(s.average_time_ms, Some(1500));
    assert_eq!(s.weakest, vec!["ねこ".to_string(), "ほん".to_string()]);

    let empty = SessionSummary::from_results(&[]);
    assert_eq!(empty.average_time_ms, None);
    assert_eq!(empty.totals.accuracy(), 0.0);
}

#[test]
fn streak_advances_once_per_day() {
    let day1 = DateTime::parse_from_rfc3339("2026-03-01T09:00:00Z").unwrap().with_timezone(&Utc);
    assert_eq!(advance_streak(0, None, day1), 1);
    assert_eq!(advance_streak(1, Some(day1), day1 + Duration::hours(3)), 1);
    assert_eq!(advance_streak(1, Some(day1), day1 + Duration::days(1)), 2);
    assert_eq!(advance_streak(5, Some(day1), day1 + Duration::days(3)), 1);
}

#[test]
fn per_day_groups_history() {
    let now = DateTime::parse_from_rfc3339("2026-03-02T12:00:00Z").unwrap().with_timezone(&Utc);
    let pool = seed::default_pool(PoolKind::Sentences);
    let pool = record_outcome(pool, "kore-wa", OutcomeLevel::Wrong, None, now - Duration::days(1)).unwrap();
    let pool = record_outcome(pool, "kore-wa", OutcomeLevel::Ok, None, now).unwrap();
    let pool = record_outcome(pool, "watashi-desu", OutcomeLevel::Ok, None, now).unwrap();

    let days = per_day(pool_answers(&pool));
    assert_eq!(days.len(), 2);
    let today = &days[&now.date_naive()];
    assert_eq!((today.total, today.correct), (2, 2));
}

#[test]
fn streak_and_time_totals_saturate() {
    let day1 = DateTime::parse_from_rfc3339("2026-03-01T09:00:00Z").unwrap().with_timezone(&Utc);
    assert_eq!(advance_streak(u32::MAX, Some(day1), day1 + Duration::days(1)), u32::MAX);

    let results = vec![result("ねこ", true, Some(u64::MAX)), result("いぬ", true, Some(u64::MAX))];
    let s = SessionSummary::from_results(&results);
    assert_eq!(s.totals.total, 2);
    assert!(s.average_time_ms.is_some());
}
