use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use yasashii_core::{
    AudioPlayer, LoadedAudio, MediaConfig, MediaError, MediaResolver, MediaSource,
    PlaybackOutcome, SpeechSynthesizer,
};

#[derive(Clone, Copy)]
enum Behavior {
    Plays,
    LoadError,
    PlayError,
    Hangs,
}

#[derive(Default)]
struct Log {
    loads: Vec<String>,
    played: Vec<String>,
    released: Vec<String>,
    spoken: Vec<(String, String)>,
}

struct FakePlayer {
    behavior: HashMap<String, Behavior>,
    log: Arc<Mutex<Log>>,
}

struct FakeHandle {
    url: String,
    fail: bool,
    log: Arc<Mutex<Log>>,
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.log.lock().released.push(self.url.clone());
    }
}

#[async_trait]
impl LoadedAudio for FakeHandle {
    async fn play(self: Box<Self>) -> Result<(), MediaError> {
        if self.fail {
            return Err(MediaError::Decode("unsupported codec".into()));
        }
        self.log.lock().played.push(self.url.clone());
        Ok(())
    }
}

#[async_trait]
impl AudioPlayer for FakePlayer {
    async fn load(&self, url: &str) -> Result<Box<dyn LoadedAudio>, MediaError> {
        self.log.lock().loads.push(url.to_string());
        match self.behavior.get(url).copied().unwrap_or(Behavior::LoadError) {
            Behavior::Plays | Behavior::PlayError => Ok(Box::new(FakeHandle {
                url: url.to_string(),
                fail: matches!(self.behavior.get(url), Some(Behavior::PlayError)),
                log: self.log.clone(),
            })),
            Behavior::LoadError => Err(MediaError::Network("404".into())),
            Behavior::Hangs => std::future::pending().await,
        }
    }
}

struct FakeSynth {
    supported: bool,
    log: Arc<Mutex<Log>>,
}

#[async_trait]
impl SpeechSynthesizer for FakeSynth {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn speak(&self, text: &str, language_tag: &str) -> Result<(), MediaError> {
        self.log
            .lock()
            .spoken
            .push((text.to_string(), language_tag.to_string()));
        Ok(())
    }
}

const PRIMARY: &str = "https://cdn.example/ohayou.mp3";
const MIRROR: &str = "https://mirror.example/ohayou.mp3";

fn source() -> MediaSource {
    MediaSource {
        primary_url: PRIMARY.into(),
        mirror_url: MIRROR.into(),
        synthesized_text: "おはようございます".into(),
        language_tag: "ja-JP".into(),
    }
}

fn resolver(
    primary: Behavior,
    mirror: Behavior,
    synth: Option<bool>,
) -> (MediaResolver, Arc<Mutex<Log>>) {
    let log = Arc::new(Mutex::new(Log::default()));
    let player = FakePlayer {
        behavior: HashMap::from([(PRIMARY.to_string(), primary), (MIRROR.to_string(), mirror)]),
        log: log.clone(),
    };
    let synth = synth.map(|supported| {
        Arc::new(FakeSynth {
            supported,
            log: log.clone(),
        }) as Arc<dyn SpeechSynthesizer>
    });
    let r = MediaResolver::new(Arc::new(player), synth, Duration::from_secs(5));
    (r, log)
}

#[tokio::test]
async fn primary_success_stops_the_chain() {
    let (r, log) = resolver(Behavior::Plays, Behavior::Plays, Some(true));
    assert_eq!(r.resolve(&source()).await, PlaybackOutcome::PlayedFromPrimary);

    let log = log.lock();
    assert_eq!(log.loads, vec![PRIMARY.to_string()]);
    assert_eq!(log.played, vec![PRIMARY.to_string()]);
    assert!(log.spoken.is_empty());
}

#[tokio::test]
async fn mirror_used_when_primary_fails() {
    let (r, log) = resolver(Behavior::LoadError, Behavior::Plays, Some(true));
    assert_eq!(r.resolve(&source()).await, PlaybackOutcome::PlayedFromMirror);

    let log = log.lock();
    assert_eq!(log.loads, vec![PRIMARY.to_string(), MIRROR.to_string()]);
    assert_eq!(log.played, vec![MIRROR.to_string()]);
    assert!(log.spoken.is_empty());
}

#[tokio::test]
async fn synthesis_when_both_urls_fail() {
    let (r, log) = resolver(Behavior::LoadError, Behavior::PlayError, Some(true));
    assert_eq!(r.resolve(&source()).await, PlaybackOutcome::PlayedFromSynthesis);

    let log = log.lock();
    assert_eq!(log.loads.len(), 2);
    assert!(log.played.is_empty());
    assert_eq!(
        log.spoken,
        vec![("おはようございます".to_string(), "ja-JP".to_string())]
    );
    // the mirror handle that failed to play was released
    assert_eq!(log.released, vec![MIRROR.to_string()]);
}

#[tokio::test]
async fn failed_without_synthesis_support() {
    let (r, log) = resolver(Behavior::LoadError, Behavior::LoadError, Some(false));
    assert_eq!(r.resolve(&source()).await, PlaybackOutcome::Failed);
    assert!(log.lock().spoken.is_empty());

    let (r, _) = resolver(Behavior::LoadError, Behavior::LoadError, None);
    assert_eq!(r.resolve(&source()).await, PlaybackOutcome::Failed);
}

#[tokio::test(start_paused = true)]
async fn hanging_tier_times_out_and_advances() {
    let (r, log) = resolver(Behavior::Hangs, Behavior::Plays, Some(true));
    assert_eq!(r.resolve(&source()).await, PlaybackOutcome::PlayedFromMirror);
    assert_eq!(log.lock().loads.len(), 2);
}

#[tokio::test]
async fn each_tier_attempted_at_most_once() {
    let (r, log) = resolver(Behavior::LoadError, Behavior::LoadError, Some(true));
    r.resolve(&source()).await;
    let log = log.lock();
    assert_eq!(log.loads, vec![PRIMARY.to_string(), MIRROR.to_string()]);
    assert_eq!(log.spoken.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn newer_request_supersedes_in_flight_one() {
    let (r, log) = resolver(Behavior::Hangs, Behavior::Hangs, Some(true));
    let r = Arc::new(r);

    let first = {
        let r = r.clone();
        tokio::spawn(async move { r.resolve(&source()).await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;

    let mut fast = source();
    fast.primary_url = "https://cdn.example/fast.mp3".into();
    let second = r.resolve(&fast).await;

    assert_eq!(first.await.unwrap(), PlaybackOutcome::Superseded);
    // fast.mp3 is unknown to the fake, so both urls fail and synthesis plays once
    assert_eq!(second, PlaybackOutcome::PlayedFromSynthesis);
    assert_eq!(log.lock().spoken.len(), 1);
}

#[test]
fn source_for_item_builds_both_urls() {
    let cfg = MediaConfig::default();
    let s = MediaSource::for_item(&cfg, "arigatou", "ありがとう");
    assert_eq!(
        s.primary_url,
        "https://cdn.jsdelivr.net/gh/koe-rei/sample-ja-audio/arigatou.mp3"
    );
    assert_eq!(
        s.mirror_url,
        "https://raw.githubusercontent.com/koe-rei/sample-ja-audio/main/arigatou.mp3"
    );
    assert_eq!(s.language_tag, "ja-JP");
    assert!(!PlaybackOutcome::Failed.is_played());
}
