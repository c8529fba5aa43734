use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Docent: a virtual museum guide that answers and speaks.
#[derive(Parser, Debug)]
#[command(name = "docent", version, about)]
pub struct Args {
    /// Config file path override.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level override (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Run without the avatar; answers are only displayed.
    #[arg(long, global = true)]
    pub no_avatar: bool,

    /// Directory holding the key-value store.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Interactive kiosk (default).
    Kiosk,
    /// Manage the chat API key.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Inspect or clear the stored conversation.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Ask one question and print the answer.
    Ask {
        #[arg(required = true)]
        question: Vec<String>,
    },
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Use the built-in test key from the config.
    Test,
    /// Save a custom key (`<id>.<secret>`).
    Set { key: String },
    /// Remove the stored key.
    Clear,
    /// Show which key is active.
    Show,
    /// Send a test request with the stored key.
    Verify,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum HistoryAction {
    Show,
    Clear,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_kiosk() {
        let args = Args::try_parse_from(["docent"]).unwrap();
        assert_eq!(args.command, None);
        assert!(!args.no_avatar);
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args =
            Args::try_parse_from(["docent", "kiosk", "--no-avatar", "--log-level", "debug"])
                .unwrap();
        assert_eq!(args.command, Some(Command::Kiosk));
        assert!(args.no_avatar);
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn key_set_takes_value() {
        let args = Args::try_parse_from(["docent", "key", "set", "abc.def"]).unwrap();
        assert_eq!(
            args.command,
            Some(Command::Key {
                action: KeyAction::Set {
                    key: "abc.def".into()
                }
            })
        );
    }

    #[test]
    fn ask_joins_words() {
        let args = Args::try_parse_from(["docent", "ask", "介绍一下", "展馆"]).unwrap();
        match args.command {
            Some(Command::Ask { question }) => assert_eq!(question.join(" "), "介绍一下 展馆"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn ask_requires_question() {
        assert!(Args::try_parse_from(["docent", "ask"]).is_err());
    }
}
