use rand::seq::SliceRandom;
use rand::Rng;
use yasashii_core::{MediaConfig, MediaSource, Pool, PracticeItem, Prompt};

/// Up to three distinct meanings from the pool, always including the right one,
/// in random order.
pub fn vocab_choices<R: Rng + ?Sized>(pool: &Pool, item: &PracticeItem, rng: &mut R) -> Vec<String> {
    let Prompt::Vocab(target) = &item.prompt else {
        return Vec::new();
    };
    let mut others: Vec<&str> = pool
        .iter()
        .filter_map(|x| match &x.prompt {
            Prompt::Vocab(v) if v.idn != target.idn => Some(v.idn.as_str()),
            _ => None,
        })
        .collect();
    others.sort_unstable();
    others.dedup();
    others.shuffle(&mut *rng);

    let mut options: Vec<String> = std::iter::once(target.idn.clone())
        .chain(others.into_iter().take(2).map(str::to_string))
        .collect();
    options.shuffle(&mut *rng);
    options
}

/// Maps "2" to the second option; anything else is taken as typed.
pub fn pick_choice(input: &str, options: &[String]) -> String {
    let input = input.trim();
    match input.parse::<usize>() {
        Ok(n) if n >= 1 && n <= options.len() => options[n - 1].clone(),
        _ => input.to_string(),
    }
}

/// Cue for an item: its own recording URL first when it has one.
pub fn media_source(cfg: &MediaConfig, item: &PracticeItem) -> MediaSource {
    let mut source = MediaSource::for_item(cfg, &item.id, &item.prompt.spoken_text());
    if let Some(url) = item.prompt.audio_url() {
        source.primary_url = url.to_string();
    }
    source
}
