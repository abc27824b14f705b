//! Concrete playback tiers: recordings fetched over HTTP and handed to an
//! external player, and speech through an external TTS command.

use async_trait::async_trait;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tokio::process::Command;
use yasashii_core::{AudioPlayer, LoadedAudio, MediaError, SpeechSynthesizer};

use crate::config::CommandSpec;

pub struct HttpPlayer {
    client: reqwest::Client,
    command: CommandSpec,
}

impl HttpPlayer {
    pub fn new(command: CommandSpec) -> Self {
        Self {
            client: reqwest::Client::new(),
            command,
        }
    }
}

fn acceptable_content_type(ct: &str) -> bool {
    let ct = ct.to_ascii_lowercase();
    ct.starts_with("audio/") || ct.starts_with("application/octet-stream")
}

#[async_trait]
impl AudioPlayer for HttpPlayer {
    async fn load(&self, url: &str) -> Result<Box<dyn LoadedAudio>, MediaError> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| MediaError::Network(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(MediaError::Network(format!("http {status}")));
        }
        if let Some(ct) = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if !acceptable_content_type(ct) {
                return Err(MediaError::Decode(format!("unexpected content type {ct}")));
            }
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| MediaError::Network(e.to_string()))?;
        if bytes.is_empty() {
            return Err(MediaError::Decode("empty body".into()));
        }

        let file = tokio::task::spawn_blocking(move || -> std::io::Result<NamedTempFile> {
            let mut f = tempfile::Builder::new()
                .prefix("yasashii-")
                .suffix(".mp3")
                .tempfile()?;
            f.write_all(&bytes)?;
            f.flush()?;
            Ok(f)
        })
        .await
        .map_err(|e| MediaError::Player(e.to_string()))?
        .map_err(|e| MediaError::Player(e.to_string()))?;

        tracing::debug!(url, path = %file.path().display(), "recording ready");
        Ok(Box::new(FileAudio {
            file,
            command: self.command.clone(),
        }))
    }
}

/// A downloaded recording. The temp file goes away with the handle.
struct FileAudio {
    file: NamedTempFile,
    command: CommandSpec,
}

#[async_trait]
impl LoadedAudio for FileAudio {
    /// Succeeds once the player is running. Its exit status is only logged:
    /// a player that already made sound must not send us on to the mirror.
    async fn play(self: Box<Self>) -> Result<(), MediaError> {
        let path = self.file.path().to_string_lossy().into_owned();
        let args = self.command.render(("file", path.as_str()), &[]);
        let mut child = Command::new(&self.command.program)
            .args(&args)
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MediaError::Player(format!("{}: {e}", self.command.program)))?;
        match child.wait().await {
            Ok(status) if !status.success() => {
                tracing::warn!(program = %self.command.program, %status, "player exited with an error");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(program = %self.command.program, error = %e, "lost track of player"),
        }
        Ok(())
    }
}

pub struct CommandSynthesizer {
    command: Option<CommandSpec>,
}

impl CommandSynthesizer {
    pub fn new(command: Option<CommandSpec>) -> Self {
        Self { command }
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    fn is_supported(&self) -> bool {
        self.command
            .as_ref()
            .map(|c| program_available(&c.program))
            .unwrap_or(false)
    }

    async fn speak(&self, text: &str, language_tag: &str) -> Result<(), MediaError> {
        let cmd = self.command.as_ref().ok_or(MediaError::SynthesisUnsupported)?;
        let args = cmd.render(("text", text), &[("lang", language_tag)]);
        let status = Command::new(&cmd.program)
            .args(&args)
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| MediaError::Synthesis(e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(MediaError::Synthesis(format!("{} exited with {status}", cmd.program)))
        }
    }
}

fn program_available(program: &str) -> bool {
    let p = Path::new(program);
    if p.components().count() > 1 {
        return p.is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| {
            std::env::split_paths(&paths).any(|dir| {
                let candidate = dir.join(program);
                candidate.is_file() || candidate.with_extension("exe").is_file()
            })
        })
        .unwrap_or(false)
}
