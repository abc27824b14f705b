use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use yasashii_core::MediaConfig;

/// External program invocation. `{file}`, `{text}` and `{lang}` in `args` are
/// substituted; when the main placeholder is absent the value is appended.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn render(&self, main: (&str, &str), extra: &[(&str, &str)]) -> Vec<String> {
        let (main_key, main_value) = main;
        let main_placeholder = format!("{{{main_key}}}");
        let mut saw_main = false;
        let mut out: Vec<String> = self
            .args
            .iter()
            .map(|a| {
                saw_main |= a.contains(&main_placeholder);
                let mut a = a.replace(&main_placeholder, main_value);
                for (k, v) in extra {
                    a = a.replace(&format!("{{{k}}}"), v);
                }
                a
            })
            .collect();
        if !saw_main {
            out.push(main_value.to_string());
        }
        out
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub media: MediaConfig,
    pub player: CommandSpec,
    pub tts: Option<CommandSpec>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            media: MediaConfig::default(),
            player: CommandSpec {
                program: "mpv".into(),
                args: vec!["--no-video".into(), "--really-quiet".into(), "{file}".into()],
            },
            tts: None,
        }
    }
}

impl AppConfig {
    /// A missing file yields the defaults; an unreadable one is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }
}
