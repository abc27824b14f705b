use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser, Clone)]
#[command(name = "yasashii", version, about = "Yasashii Nihongo: Japanese practice with resilient audio")]
pub struct Cli {
    /// Data directory (defaults to the platform app data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file (defaults to <data dir>/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Play a phrase through the primary → mirror → speech fallback chain
    Play(PlayCmd),
    #[command(flatten)]
    Data(DataCmd),
}

/// Commands that work on stored learner state.
#[derive(Debug, Subcommand, Clone)]
pub enum DataCmd {
    /// Practice loop for one pool
    Review(ReviewCmd),
    /// Summary of recorded practice results
    Summary {
        /// Forget recorded results afterwards
        #[arg(long)]
        clear: bool,
    },
    /// Mastery, streak, and due counts
    Status,
    /// Write streak, progress, and results to a JSON file
    Export { path: PathBuf },
    /// Apply an exported JSON file
    Import { path: PathBuf },
    /// Delete all stored progress (backups are kept)
    Reset {
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Args, Clone)]
pub struct PlayCmd {
    /// Text spoken by speech synthesis if no recording plays
    pub text: String,
    /// Recording id; builds both URLs from the configured bases
    #[arg(long)]
    pub id: Option<String>,
    #[arg(long)]
    pub primary: Option<String>,
    #[arg(long)]
    pub mirror: Option<String>,
    /// BCP 47 language tag for synthesis
    #[arg(long)]
    pub lang: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PoolArg {
    Vocab,
    Sentences,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LevelArg {
    Ok,
    Strong,
}

#[derive(Debug, Args, Clone)]
pub struct ReviewCmd {
    #[arg(value_enum)]
    pub pool: PoolArg,
    #[arg(long, default_value_t = 10)]
    pub max: usize,
    /// Do not play audio cues
    #[arg(long)]
    pub mute: bool,
    /// Interval tier for correct answers (default: strong)
    #[arg(long, value_enum)]
    pub level: Option<LevelArg>,
    /// Only items whose last answer was wrong
    #[arg(long)]
    pub weak: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_commands_parse_at_top_level() {
        let cli = Cli::parse_from(["yasashii", "review", "vocab", "--weak"]);
        match cli.cmd {
            Command::Data(DataCmd::Review(r)) => {
                assert!(matches!(r.pool, PoolArg::Vocab));
                assert!(r.weak);
                assert!(r.level.is_none());
            }
            other => panic!("unexpected {other:?}"),
        }

        let cli = Cli::parse_from(["yasashii", "play", "ねこ", "--id", "neko"]);
        assert!(matches!(cli.cmd, Command::Play(p) if p.id.as_deref() == Some("neko")));

        let cli = Cli::parse_from(["yasashii", "reset", "--yes"]);
        assert!(matches!(cli.cmd, Command::Data(DataCmd::Reset { yes: true })));
    }
}
