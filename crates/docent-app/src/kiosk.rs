//! Interactive kiosk loop.
//!
//! Multiplexes stdin, avatar events and the in-flight turn, so a question
//! typed while another is being answered still reaches the orchestrator
//! and is turned away there.

use std::future::Future;
use std::pin::Pin;

use colored::Colorize;
use docent_common::Event;
use docent_config::schema::PresetQuestion;
use docent_conversation::{ConversationOrchestrator, TurnError};
use docent_platform::KeyValueStore;
use futures_util::stream::{FuturesUnordered, StreamExt};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum KioskCommand {
    Connect,
    Disconnect,
    Volume(f32),
    Debug,
    Presets,
    /// One-based preset number.
    Ask(usize),
    Clear,
    Help,
    Quit,
    Question(String),
    Empty,
    Invalid(String),
}

impl KioskCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Self::Question(line.to_string());
        };

        let mut parts = command.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();
        match (name, arg) {
            ("connect", None) => Self::Connect,
            ("disconnect", None) => Self::Disconnect,
            ("volume", Some(v)) => match v.parse::<f32>() {
                Ok(v) => Self::Volume(v),
                Err(_) => Self::Invalid(format!("not a number: {v}")),
            },
            ("debug", None) => Self::Debug,
            ("presets", None) => Self::Presets,
            ("ask", Some(n)) => match n.parse::<usize>() {
                Ok(n) if n >= 1 => Self::Ask(n),
                _ => Self::Invalid(format!("not a preset number: {n}")),
            },
            ("clear", None) => Self::Clear,
            ("help", None) => Self::Help,
            ("quit" | "exit", None) => Self::Quit,
            _ => Self::Invalid(format!("unknown command: /{command}")),
        }
    }
}

const HELP: &str = "\
/connect       bring the guide up
/disconnect    take the guide down
/volume <0-1>  set the speaking volume
/debug         toggle avatar debug info
/presets       list suggested questions
/ask <n>       ask suggested question n
/clear         forget the conversation
/quit          leave the kiosk
anything else is asked as a question";

type Task<'a> = Pin<Box<dyn Future<Output = TaskOutcome> + 'a>>;

enum TaskOutcome {
    Answer(Result<String, TurnError>),
    Greeted,
}

pub async fn run<S: KeyValueStore>(
    orch: &ConversationOrchestrator<S>,
    presets: &[PresetQuestion],
) {
    let avatar = orch.avatar();
    let mut events = avatar.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut tasks: FuturesUnordered<Task<'_>> = FuturesUnordered::new();
    let mut debug_visible = false;

    banner(presets, avatar.is_initialized());

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        warn!("stdin read failed: {e}");
                        break;
                    }
                };
                match KioskCommand::parse(&line) {
                    KioskCommand::Question(question) => {
                        tasks.push(Box::pin(async move {
                            TaskOutcome::Answer(orch.submit(&question).await)
                        }));
                    }
                    KioskCommand::Ask(n) => {
                        tasks.push(Box::pin(async move {
                            TaskOutcome::Answer(orch.ask_preset(n - 1).await)
                        }));
                    }
                    KioskCommand::Connect => connect(orch),
                    KioskCommand::Disconnect => avatar.disconnect(),
                    KioskCommand::Volume(v) => {
                        if avatar.set_volume(v) {
                            notice(&format!("🔊 音量 {}%", (v * 100.0).round()));
                        } else {
                            notice("音量值必须在0-1之间");
                        }
                    }
                    KioskCommand::Debug => {
                        debug_visible = !debug_visible;
                        if debug_visible {
                            avatar.show_debug_info();
                        } else {
                            avatar.hide_debug_info();
                        }
                    }
                    KioskCommand::Presets => list_presets(presets),
                    KioskCommand::Clear => {
                        orch.clear_history();
                        notice("✅ 对话历史已清除");
                    }
                    KioskCommand::Help => println!("{}", HELP.bright_black()),
                    KioskCommand::Quit => break,
                    KioskCommand::Empty => {}
                    KioskCommand::Invalid(reason) => notice(&format!("{reason} (try /help)")),
                }
            }
            event = events.recv() => match event {
                Ok(event) => {
                    debug!(?event, "avatar event");
                    orch.apply_avatar_event(&event);
                    match event {
                        Event::AvatarConnected => {
                            tasks.push(Box::pin(async move {
                                orch.greet().await;
                                TaskOutcome::Greeted
                            }));
                        }
                        Event::LoadProgress(percent) => {
                            notice(&format!("资源加载进度: {percent}%"));
                        }
                        _ => {}
                    }
                }
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "avatar events dropped"),
                Err(RecvError::Closed) => break,
            },
            Some(outcome) = tasks.next(), if !tasks.is_empty() => report(outcome),
        }
    }

    info!("leaving kiosk");
    avatar.disconnect();
}

fn connect<S: KeyValueStore>(orch: &ConversationOrchestrator<S>) {
    let avatar = orch.avatar();
    if avatar.is_connected() {
        notice("数字人已连接");
        return;
    }
    if !avatar.is_initialized() && avatar.initialize().is_err() {
        notice("❌ 数字人SDK初始化失败");
        return;
    }
    notice("⏳ 正在连接数字人...");
    avatar.connect(None);
}

fn report(outcome: TaskOutcome) {
    match outcome {
        TaskOutcome::Answer(Ok(_)) | TaskOutcome::Greeted => {}
        TaskOutcome::Answer(Err(TurnError::Busy)) => notice("⏳ 正在处理中，请稍候..."),
        TaskOutcome::Answer(Err(TurnError::EmptyInput)) => notice("❌ 请输入问题"),
        TaskOutcome::Answer(Err(TurnError::UnknownPreset(n))) => {
            notice(&format!("没有第 {} 个预置问题 (/presets)", n + 1))
        }
        // Already shown by the orchestrator.
        TaskOutcome::Answer(Err(TurnError::Chat(_))) => {}
    }
}

fn banner(presets: &[PresetQuestion], avatar_available: bool) {
    println!("{}", "🏛️  Docent 智能讲解员".bright_cyan().bold());
    if avatar_available {
        println!("{}", "输入 /connect 连接数字人，/help 查看命令".bright_black());
    } else {
        println!("{}", "数字人未启用，回答将只以文字显示".bright_black());
    }
    list_presets(presets);
}

fn list_presets(presets: &[PresetQuestion]) {
    for (i, preset) in presets.iter().enumerate() {
        println!("  {} {} {}", format!("[{}]", i + 1).bright_black(), preset.icon, preset.question);
    }
}

fn notice(text: &str) {
    println!("{}", text.yellow());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_lines_are_questions() {
        assert_eq!(
            KioskCommand::parse("  介绍一下展馆 "),
            KioskCommand::Question("介绍一下展馆".into())
        );
        assert_eq!(KioskCommand::parse("   "), KioskCommand::Empty);
    }

    #[test]
    fn slash_commands() {
        assert_eq!(KioskCommand::parse("/connect"), KioskCommand::Connect);
        assert_eq!(KioskCommand::parse("/disconnect"), KioskCommand::Disconnect);
        assert_eq!(KioskCommand::parse("/volume 0.5"), KioskCommand::Volume(0.5));
        assert_eq!(KioskCommand::parse("/ask 2"), KioskCommand::Ask(2));
        assert_eq!(KioskCommand::parse("/quit"), KioskCommand::Quit);
        assert_eq!(KioskCommand::parse("/exit"), KioskCommand::Quit);
    }

    #[test]
    fn malformed_commands_are_invalid() {
        assert!(matches!(KioskCommand::parse("/ask 0"), KioskCommand::Invalid(_)));
        assert!(matches!(KioskCommand::parse("/ask x"), KioskCommand::Invalid(_)));
        assert!(matches!(KioskCommand::parse("/volume"), KioskCommand::Invalid(_)));
        assert!(matches!(KioskCommand::parse("/volume loud"), KioskCommand::Invalid(_)));
        assert!(matches!(KioskCommand::parse("/dance"), KioskCommand::Invalid(_)));
    }

    #[test]
    fn out_of_range_volume_still_parses() {
        assert_eq!(KioskCommand::parse("/volume 1.5"), KioskCommand::Volume(1.5));
    }
}
