//! Chat endpoint validation.

use crate::schema::DocentConfig;

use super::helpers::{validate_non_empty, validate_range};

pub(crate) fn validate_chat(errors: &mut Vec<String>, config: &DocentConfig) {
    let chat = &config.chat;

    if !(chat.api_url.starts_with("http://") || chat.api_url.starts_with("https://")) {
        errors.push(format!(
            "chat.api_url = {:?} must be an http(s) URL",
            chat.api_url
        ));
    }
    validate_non_empty(errors, "chat.model", &chat.model);
    validate_range(
        errors,
        "chat.connect_timeout_secs",
        chat.connect_timeout_secs,
        1,
        120,
    );
    validate_range(
        errors,
        "chat.request_timeout_secs",
        chat.request_timeout_secs,
        1,
        600,
    );
}
