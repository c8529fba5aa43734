//! Conversation settings validation.

use crate::schema::DocentConfig;

use super::helpers::{validate_non_empty, validate_range};

pub(crate) fn validate_conversation(errors: &mut Vec<String>, config: &DocentConfig) {
    let conv = &config.conversation;

    validate_non_empty(errors, "conversation.system_prompt", &conv.system_prompt);
    validate_range(
        errors,
        "conversation.max_history_rounds",
        conv.max_history_rounds as u64,
        1,
        100,
    );
    validate_range(
        errors,
        "conversation.settle_delay_ms",
        conv.settle_delay_ms,
        0,
        10_000,
    );

    for (i, preset) in conv.preset_questions.iter().enumerate() {
        if preset.question.trim().is_empty() {
            errors.push(format!("conversation.preset_questions[{i}].question is empty"));
        }
    }
}
