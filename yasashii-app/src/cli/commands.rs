use crate::audio::{CommandSynthesizer, HttpPlayer};
use crate::cli::opts::*;
use crate::cli::practice::{media_source, pick_choice, vocab_choices};
use crate::config::AppConfig;

use anyhow::{Context, Result};
use chrono::{Duration, Utc};
use std::io::{stdin, stdout, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use yasashii_core::{
    filters::{filter_by_due, practice_pool},
    next_index, per_day, pool_answers, AppState, CoreError, DueStatus, MediaResolver,
    MediaSource, OutcomeLevel, PlaybackOutcome, PoolKind, Prompt, Repository, SessionSummary,
};
use yasashii_json::{paths, JsonStore, DEFAULT_MAX_BACKUPS};

pub async fn run_cli(args: Cli) -> Result<()> {
    let root = args.data_dir.clone().unwrap_or_else(paths::data_root);
    let config_path = args.config.clone().unwrap_or_else(|| paths::config_file(&root));
    let config = AppConfig::load(&config_path)?;

    match args.cmd.clone() {
        Command::Play(cmd) => play_cmd(&config, cmd).await,
        Command::Data(cmd) => {
            let repo = open_repo(&root).await?;
            let state = AppState::load(repo).await?;
            let out = match cmd {
                DataCmd::Review(c) => review_cmd(&state, &config, c).await,
                DataCmd::Summary { clear } => summary_cmd(&state, clear).await,
                DataCmd::Status => status_cmd(&state).await,
                DataCmd::Export { path } => export_cmd(&state, path).await,
                DataCmd::Import { path } => import_cmd(&state, path).await,
                DataCmd::Reset { yes } => reset_cmd(&state, yes).await,
            };
            state.save().await?;
            out
        }
    }
}

pub async fn open_repo(root: &std::path::Path) -> Result<Arc<dyn Repository>> {
    let (dir, backups) = paths::store_dirs(root);
    let s = JsonStore::open_with(dir, backups, DEFAULT_MAX_BACKUPS)
        .await
        .with_context(|| format!("opening store under {}", root.display()))?;
    Ok(Arc::new(s))
}

fn build_resolver(config: &AppConfig) -> MediaResolver {
    MediaResolver::new(
        Arc::new(HttpPlayer::new(config.player.clone())),
        Some(Arc::new(CommandSynthesizer::new(config.tts.clone()))),
        config.media.tier_timeout(),
    )
}

async fn play_cmd(config: &AppConfig, cmd: PlayCmd) -> Result<()> {
    let mut media = config.media.clone();
    if let Some(lang) = cmd.lang {
        media.language_tag = lang;
    }
    let mut source = match &cmd.id {
        Some(id) => MediaSource::for_item(&media, id, &cmd.text),
        None => MediaSource {
            primary_url: String::new(),
            mirror_url: String::new(),
            synthesized_text: cmd.text.clone(),
            language_tag: media.language_tag.clone(),
        },
    };
    if let Some(p) = cmd.primary {
        source.primary_url = p;
    }
    if let Some(m) = cmd.mirror {
        source.mirror_url = m;
    }

    let resolver = build_resolver(config);
    if let Some(notice) = first_tier_notice(&source) {
        println!("{notice}");
    }
    let outcome = resolver.resolve(&source).await;
    report_playback(outcome);
    Ok(())
}

/// Names the first tier that has something to try.
fn first_tier_notice(source: &MediaSource) -> Option<&'static str> {
    if !source.primary_url.is_empty() {
        Some("Trying primary URL…")
    } else if !source.mirror_url.is_empty() {
        Some("Trying mirror URL…")
    } else {
        None
    }
}

fn report_playback(outcome: PlaybackOutcome) {
    if outcome.is_played() {
        println!("{}", outcome.status_message());
    } else {
        eprintln!("{}", outcome.status_message());
    }
}

async fn review_cmd(state: &AppState, config: &AppConfig, cmd: ReviewCmd) -> Result<()> {
    let kind = match cmd.pool {
        PoolArg::Vocab => PoolKind::Vocab,
        PoolArg::Sentences => PoolKind::Sentences,
    };
    let correct_level = match cmd.level {
        Some(LevelArg::Ok) => OutcomeLevel::Ok,
        Some(LevelArg::Strong) | None => OutcomeLevel::from_answer(true),
    };

    let round = practice_pool(&state.pool(kind).await, cmd.weak);
    if round.is_empty() {
        println!("nothing to practice");
        return Ok(());
    }

    let resolver = (!cmd.mute).then(|| build_resolver(config));
    let mut rng = rand::rng();
    let mut cursor = 0usize;
    let mut count = 0usize;

    while count < cmd.max {
        // Re-read so choices and cues see the latest stored item.
        let pool = state.pool(kind).await;
        let Some(item) = round.at(cursor).and_then(|x| pool.get(&x.id)).cloned() else {
            break;
        };
        count += 1;

        println!("\n[{}/{}] {}", count, cmd.max, item.prompt.label());
        let options = match &item.prompt {
            Prompt::Vocab(v) => {
                println!("({})", v.romaji);
                let opts = vocab_choices(&pool, &item, &mut rng);
                for (i, o) in opts.iter().enumerate() {
                    println!("  {}. {}", i + 1, o);
                }
                opts
            }
            Prompt::Sentence(_) => {
                println!("Isi bagian kosong dengan kata yang tepat.");
                Vec::new()
            }
        };
        if let Some(r) = &resolver {
            report_playback(r.resolve(&media_source(&config.media, &item)).await);
        }

        println!("[p=play again, s=skip, q=quit]");
        let started = Instant::now();
        let answer = loop {
            let Some(line) = read_line("answer> ")? else {
                return Ok(());
            };
            match line.trim() {
                "q" | "quit" => return Ok(()),
                "s" | "skip" => break None,
                "p" | "play" => {
                    if let Some(r) = &resolver {
                        report_playback(r.resolve(&media_source(&config.media, &item)).await);
                    }
                }
                "" => println!("type an answer, p, s, or q"),
                other => break Some(pick_choice(other, &options)),
            }
        };
        let Some(answer) = answer else {
            cursor = next_index(&round, cursor);
            continue;
        };

        let latency = started.elapsed().as_millis() as u64;
        let fb = state
            .record_answer(kind, &item.id, &answer, correct_level, Some(latency), Utc::now())
            .await?;
        if fb.correct {
            println!("Benar! {}", fb.example);
        } else {
            println!("Kurang tepat. Petunjuk: {}", fb.hint);
            println!("Contoh: {}", fb.example);
        }
        let days = (fb.due - Utc::now()).num_hours().max(0) as f64 / 24.0;
        println!("→ next due in {:.0} day(s)", days);

        // A wrong sentence stays up for another try.
        if fb.correct || kind == PoolKind::Vocab {
            cursor = next_index(&round, cursor);
        }
    }

    println!("\nanswered {}", count);
    Ok(())
}

async fn summary_cmd(state: &AppState, clear: bool) -> Result<()> {
    let snap = state.snapshot().await;
    let s = SessionSummary::from_results(&snap.results);
    let avg = s
        .average_time_ms
        .map(|t| format!("{t} ms"))
        .unwrap_or_else(|| "-".into());
    println!(
        "total: {} • wrong: {} • average time: {}",
        s.totals.total, s.totals.wrong, avg
    );
    if !s.weakest.is_empty() {
        println!("often wrong: {}", s.weakest.join(", "));
        println!("train them again with: yasashii review <pool> --weak");
    }
    if clear {
        state.clear_results().await?;
        println!("results cleared");
    }
    Ok(())
}

async fn status_cmd(state: &AppState) -> Result<()> {
    let now = Utc::now();
    let snap = state.snapshot().await;
    let last = snap
        .progress
        .last_review
        .map(|t| t.with_timezone(&chrono::Local).format("%a %d %b").to_string())
        .unwrap_or_else(|| "—".into());
    println!("mastery: {}%", snap.progress.mastery_percent());
    println!("streak: {} day(s)", snap.streak);
    println!("last review: {}", last);

    let mut answers = Vec::new();
    for kind in PoolKind::ALL {
        let pool = state.pool(kind).await;
        println!(
            "{:<10} new={} due={} later={}",
            kind.label(),
            filter_by_due(&pool, now, DueStatus::New).len(),
            filter_by_due(&pool, now, DueStatus::Due).len(),
            filter_by_due(&pool, now, DueStatus::Future).len(),
        );
        answers.extend(pool_answers(&pool));
    }

    let since = (now - Duration::days(6)).date_naive();
    for (day, t) in per_day(answers).range(since..) {
        println!("{}  {:>3} answered  {:>3.0}% right", day, t.total, t.accuracy() * 100.0);
    }
    Ok(())
}

async fn export_cmd(state: &AppState, path: PathBuf) -> Result<()> {
    let doc = state.export().await;
    let s = serde_json::to_string_pretty(&doc)?;
    std::fs::write(&path, s).with_context(|| format!("writing {}", path.display()))?;
    println!("wrote {}", path.display());
    Ok(())
}

async fn import_cmd(state: &AppState, path: PathBuf) -> Result<()> {
    let data = std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?;
    match state.import(&data).await {
        Ok(()) => println!("imported"),
        Err(CoreError::ImportMalformed(msg)) => {
            tracing::warn!(path = %path.display(), "import rejected");
            eprintln!("import ignored, the file is not a valid export: {msg}");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn reset_cmd(state: &AppState, yes: bool) -> Result<()> {
    if !yes {
        let line = read_line("delete all progress? [y/N] ")?.unwrap_or_default();
        if !matches!(line.trim(), "y" | "Y" | "yes") {
            println!("kept");
            return Ok(());
        }
    }
    state.reset().await?;
    println!("ok");
    Ok(())
}

// ===== Helpers =====
/// `None` once stdin is closed.
fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    stdout().flush().ok();
    let mut s = String::new();
    if stdin().read_line(&mut s)? == 0 {
        return Ok(None);
    }
    Ok(Some(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(primary: &str, mirror: &str) -> MediaSource {
        MediaSource {
            primary_url: primary.into(),
            mirror_url: mirror.into(),
            synthesized_text: "ねこ".into(),
            language_tag: "ja-JP".into(),
        }
    }

    #[test]
    fn notice_skips_empty_urls() {
        assert_eq!(first_tier_notice(&source("https://a/x.mp3", "")), Some("Trying primary URL…"));
        assert_eq!(first_tier_notice(&source("", "https://b/x.mp3")), Some("Trying mirror URL…"));
        assert_eq!(first_tier_notice(&source("", "")), None);
    }
}
