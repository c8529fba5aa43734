//! Conversation behavior: prompt, history retention, timing, presets.

use serde::{Deserialize, Serialize};

/// A canned question offered on the kiosk start screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresetQuestion {
    pub icon: String,
    pub question: String,
}

impl PresetQuestion {
    fn new(icon: &str, question: &str) -> Self {
        Self {
            icon: icon.into(),
            question: question.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversationConfig {
    pub system_prompt: String,
    /// Number of user/assistant exchanges kept after the system prompt.
    pub max_history_rounds: usize,
    /// Pause between the "listen" pose and speech.
    pub settle_delay_ms: u64,
    /// Pause between connecting and the greeting.
    pub greet_delay_ms: u64,
    /// Spoken once the avatar connects. Empty disables the greeting.
    pub greeting: String,
    pub preset_questions: Vec<PresetQuestion>,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            system_prompt: "你是纪念馆的智能讲解员。请用亲切、简洁的中文回答参观者的问题，\
                            每次回答控制在200字以内。"
                .into(),
            max_history_rounds: 5,
            settle_delay_ms: 300,
            greet_delay_ms: 1000,
            greeting: "欢迎来到纪念馆！我是您的智能讲解员，有什么可以帮助您的吗？".into(),
            preset_questions: vec![
                PresetQuestion::new("🏛️", "介绍一下展馆"),
                PresetQuestion::new("📜", "这里有哪些重要的历史事件？"),
                PresetQuestion::new("🗺️", "推荐一条参观路线"),
                PresetQuestion::new("⏰", "展馆的开放时间是什么？"),
            ],
        }
    }
}
