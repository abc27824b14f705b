use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::{
    advance_streak, record_outcome, seed, CoreError, ExportDocument, ImportDocument, ItemId,
    OutcomeLevel, Pool, PoolKind, Repository, Snapshot,
};

/// What the learner sees after answering.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub correct: bool,
    pub hint: String,
    pub example: String,
    pub due: DateTime<Utc>,
}

struct Data {
    vocab: Pool,
    sentences: Pool,
    snapshot: Snapshot,
}

impl Data {
    fn pool(&self, kind: PoolKind) -> &Pool {
        match kind {
            PoolKind::Vocab => &self.vocab,
            PoolKind::Sentences => &self.sentences,
        }
    }

    fn pool_mut(&mut self, kind: PoolKind) -> &mut Pool {
        match kind {
            PoolKind::Vocab => &mut self.vocab,
            PoolKind::Sentences => &mut self.sentences,
        }
    }
}

/// Learner state for one application run: loaded from the repository at
/// start, written back after every change. Updates are serialized.
pub struct AppState {
    repo: Arc<dyn Repository>,
    data: Mutex<Data>,
}

impl AppState {
    pub async fn load(repo: Arc<dyn Repository>) -> Result<Self, CoreError> {
        let data = Data {
            vocab: repo.load_pool(PoolKind::Vocab).await?,
            sentences: repo.load_pool(PoolKind::Sentences).await?,
            snapshot: Snapshot {
                streak: repo.load_streak().await?,
                progress: repo.load_progress().await?,
                results: repo.load_results().await?,
            },
        };
        tracing::debug!(
            vocab = data.vocab.len(),
            sentences = data.sentences.len(),
            "state loaded"
        );
        Ok(Self {
            repo,
            data: Mutex::new(data),
        })
    }

    pub async fn save(&self) -> Result<(), CoreError> {
        let d = self.data.lock().await;
        self.repo.save_pool(PoolKind::Vocab, &d.vocab).await?;
        self.repo.save_pool(PoolKind::Sentences, &d.sentences).await?;
        self.save_snapshot(&d.snapshot).await
    }

    async fn save_snapshot(&self, s: &Snapshot) -> Result<(), CoreError> {
        self.repo.save_progress(&s.progress).await?;
        self.repo.save_streak(s.streak).await?;
        self.repo.save_results(&s.results).await
    }

    pub async fn pool(&self, kind: PoolKind) -> Pool {
        self.data.lock().await.pool(kind).clone()
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.data.lock().await.snapshot.clone()
    }

    /// Checks `answer` against item `id`, reschedules it and records the
    /// result. A correct answer is scheduled at `correct_level`.
    pub async fn record_answer(
        &self,
        kind: PoolKind,
        id: &str,
        answer: &str,
        correct_level: OutcomeLevel,
        latency_ms: Option<u64>,
        now: DateTime<Utc>,
    ) -> Result<AnswerFeedback, CoreError> {
        if !correct_level.is_correct() {
            return Err(CoreError::Invalid("level for a correct answer must be ok or strong"));
        }

        let mut d = self.data.lock().await;
        let (prompt, correct) = {
            let item = d
                .pool(kind)
                .get(id)
                .ok_or_else(|| CoreError::NotFound(format!("item {id}")))?;
            (item.prompt.clone(), item.prompt.check(answer))
        };
        let level = if correct { correct_level } else { OutcomeLevel::Wrong };

        // Build the next state, write it, and only then keep it in memory.
        let pool = record_outcome(d.pool(kind).clone(), id, level, latency_ms, now)?;
        let due = pool.get(id).map(|x| x.due).unwrap_or(now);

        let mut snapshot = d.snapshot.clone();
        snapshot.streak = advance_streak(snapshot.streak, snapshot.progress.last_review, now);
        snapshot.progress.record(kind, id, correct, now);
        snapshot.results.push(crate::SessionResult {
            kind,
            item_id: ItemId::from(id),
            label: prompt.label().to_string(),
            correct,
            time_ms: latency_ms,
        });

        self.repo.save_pool(kind, &pool).await?;
        self.save_snapshot(&snapshot).await?;
        *d.pool_mut(kind) = pool;
        d.snapshot = snapshot;

        tracing::info!(kind = kind.label(), item = id, correct, "answer recorded");
        Ok(AnswerFeedback {
            correct,
            hint: prompt.hint(),
            example: prompt.example(),
            due,
        })
    }

    pub async fn export(&self) -> ExportDocument {
        self.data.lock().await.snapshot.export()
    }

    /// Parses and applies an import document. A malformed document leaves
    /// state untouched.
    pub async fn import(&self, text: &str) -> Result<(), CoreError> {
        let doc = ImportDocument::parse(text)?;
        let mut d = self.data.lock().await;
        let mut snapshot = d.snapshot.clone();
        snapshot.apply(&doc);
        self.save_snapshot(&snapshot).await?;
        d.snapshot = snapshot;
        tracing::info!(
            streak = doc.streak.is_some(),
            progress = doc.progress.is_some(),
            results = doc.version.is_some() && doc.results.is_some(),
            "import applied"
        );
        Ok(())
    }

    /// Session results are kept across runs until cleared here.
    pub async fn clear_results(&self) -> Result<(), CoreError> {
        let mut d = self.data.lock().await;
        self.repo.save_results(&[]).await?;
        d.snapshot.results.clear();
        Ok(())
    }

    pub async fn reset(&self) -> Result<(), CoreError> {
        let mut d = self.data.lock().await;
        self.repo.clear().await?;
        d.vocab = seed::default_pool(PoolKind::Vocab);
        d.sentences = seed::default_pool(PoolKind::Sentences);
        d.snapshot = Snapshot::default();
        Ok(())
    }
}
