//! Multi-source audio resolution: primary URL, then mirror URL, then on-device
//! speech synthesis.
//!
//! The tier order is data ([`Strategy`] list) walked by a single loop in
//! [`MediaResolver::resolve`] that stops at the first tier that plays. Tier
//! failures are absorbed; only the final [`PlaybackOutcome`] reaches the caller.
//!
//! Touch platforms may block audio until a first user gesture. Unlocking is the
//! caller's job; the resolver assumes it already happened.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::MediaError;

pub const DEFAULT_PRIMARY_BASE: &str = "https://cdn.jsdelivr.net/gh/koe-rei/sample-ja-audio";
pub const DEFAULT_MIRROR_BASE: &str = "https://raw.githubusercontent.com/koe-rei/sample-ja-audio/main";
pub const DEFAULT_LANGUAGE_TAG: &str = "ja-JP";
pub const DEFAULT_TIER_TIMEOUT: Duration = Duration::from_secs(8);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaSource {
    pub primary_url: String,
    pub mirror_url: String,
    pub synthesized_text: String,
    pub language_tag: String,
}

impl MediaSource {
    /// `{primary_base}/{id}.mp3` and `{mirror_base}/{id}.mp3`, with `text` as the
    /// synthesis fallback.
    pub fn for_item(cfg: &MediaConfig, id: &str, text: &str) -> Self {
        Self {
            primary_url: join_url(&cfg.primary_base, id),
            mirror_url: join_url(&cfg.mirror_base, id),
            synthesized_text: text.to_string(),
            language_tag: cfg.language_tag.clone(),
        }
    }
}

fn join_url(base: &str, id: &str) -> String {
    format!("{}/{}.mp3", base.trim_end_matches('/'), id)
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MediaConfig {
    pub primary_base: String,
    pub mirror_base: String,
    pub language_tag: String,
    pub tier_timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            primary_base: DEFAULT_PRIMARY_BASE.to_string(),
            mirror_base: DEFAULT_MIRROR_BASE.to_string(),
            language_tag: DEFAULT_LANGUAGE_TAG.to_string(),
            tier_timeout_secs: DEFAULT_TIER_TIMEOUT.as_secs(),
        }
    }
}

impl MediaConfig {
    pub fn tier_timeout(&self) -> Duration {
        Duration::from_secs(self.tier_timeout_secs.max(1))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackOutcome {
    PlayedFromPrimary,
    PlayedFromMirror,
    PlayedFromSynthesis,
    Failed,
    /// A newer request on the same resolver took over before any tier played.
    Superseded,
}

impl PlaybackOutcome {
    pub fn is_played(&self) -> bool {
        matches!(
            self,
            PlaybackOutcome::PlayedFromPrimary
                | PlaybackOutcome::PlayedFromMirror
                | PlaybackOutcome::PlayedFromSynthesis
        )
    }

    pub fn status_message(&self) -> &'static str {
        match self {
            PlaybackOutcome::PlayedFromPrimary => "Playing from primary URL",
            PlaybackOutcome::PlayedFromMirror => "Playing from mirror URL",
            PlaybackOutcome::PlayedFromSynthesis => "Played with speech synthesis",
            PlaybackOutcome::Failed => {
                "Audio could not be played. Check the connection or enable media playback."
            }
            PlaybackOutcome::Superseded => "Playback replaced by a newer request",
        }
    }
}

/// Audio-element-style playback primitive.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Fetches and prepares `url`, resolving once it is ready to play.
    async fn load(&self, url: &str) -> Result<Box<dyn LoadedAudio>, MediaError>;
}

/// A prepared media handle. Dropping it releases everything it holds.
#[async_trait]
pub trait LoadedAudio: Send {
    async fn play(self: Box<Self>) -> Result<(), MediaError>;
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    fn is_supported(&self) -> bool;
    async fn speak(&self, text: &str, language_tag: &str) -> Result<(), MediaError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    Primary,
    Mirror,
    Synthesis,
}

pub const DEFAULT_STRATEGIES: [Strategy; 3] =
    [Strategy::Primary, Strategy::Mirror, Strategy::Synthesis];

#[derive(Debug, PartialEq, Eq)]
pub enum Attempt {
    Played(PlaybackOutcome),
    Failed(MediaError),
}

impl Strategy {
    pub async fn attempt(&self, resolver: &MediaResolver, source: &MediaSource) -> Attempt {
        let result = match self {
            Strategy::Primary => resolver
                .play_url(&source.primary_url)
                .await
                .map(|_| PlaybackOutcome::PlayedFromPrimary),
            Strategy::Mirror => resolver
                .play_url(&source.mirror_url)
                .await
                .map(|_| PlaybackOutcome::PlayedFromMirror),
            Strategy::Synthesis => resolver
                .synthesize(source)
                .await
                .map(|_| PlaybackOutcome::PlayedFromSynthesis),
        };
        match result {
            Ok(outcome) => Attempt::Played(outcome),
            Err(e) => Attempt::Failed(e),
        }
    }
}

pub struct MediaResolver {
    player: Arc<dyn AudioPlayer>,
    synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
    strategies: Vec<Strategy>,
    tier_timeout: Duration,
    in_flight: Mutex<InFlight>,
}

#[derive(Default)]
struct InFlight {
    generation: u64,
    token: Option<CancellationToken>,
}

impl MediaResolver {
    pub fn new(
        player: Arc<dyn AudioPlayer>,
        synthesizer: Option<Arc<dyn SpeechSynthesizer>>,
        tier_timeout: Duration,
    ) -> Self {
        Self {
            player,
            synthesizer,
            strategies: DEFAULT_STRATEGIES.to_vec(),
            tier_timeout,
            in_flight: Mutex::new(InFlight::default()),
        }
    }

    /// Tries each tier once, in order. A newer call on the same resolver
    /// cancels this one, which then returns [`PlaybackOutcome::Superseded`].
    pub async fn resolve(&self, source: &MediaSource) -> PlaybackOutcome {
        let token = CancellationToken::new();
        let generation = {
            let mut slot = self.in_flight.lock();
            if let Some(prev) = slot.token.replace(token.clone()) {
                prev.cancel();
            }
            slot.generation += 1;
            slot.generation
        };

        let outcome = self.run(source, &token).await;

        let mut slot = self.in_flight.lock();
        if slot.generation == generation {
            slot.token = None;
        }
        outcome
    }

    async fn run(&self, source: &MediaSource, token: &CancellationToken) -> PlaybackOutcome {
        for strategy in &self.strategies {
            let attempt = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(?strategy, "playback superseded");
                    return PlaybackOutcome::Superseded;
                }
                attempt = strategy.attempt(self, source) => attempt,
            };
            match attempt {
                Attempt::Played(outcome) => {
                    tracing::info!(?strategy, ?outcome, "audio playing");
                    return outcome;
                }
                Attempt::Failed(err) => {
                    tracing::debug!(?strategy, error = %err, "tier failed, advancing");
                }
            }
        }
        tracing::warn!(text = %source.synthesized_text, "all playback tiers exhausted");
        PlaybackOutcome::Failed
    }

    async fn play_url(&self, url: &str) -> Result<(), MediaError> {
        if url.trim().is_empty() {
            return Err(MediaError::Network("empty url".into()));
        }
        // The handle is dropped (released) on every error path.
        let loaded = tokio::time::timeout(self.tier_timeout, self.player.load(url))
            .await
            .map_err(|_| MediaError::Timeout)??;
        loaded.play().await
    }

    async fn synthesize(&self, source: &MediaSource) -> Result<(), MediaError> {
        let synth = self
            .synthesizer
            .as_ref()
            .filter(|s| s.is_supported())
            .ok_or(MediaError::SynthesisUnsupported)?;
        synth
            .speak(&source.synthesized_text, &source.language_tag)
            .await
    }
}
