//! Full configuration validation.
//!
//! Each section has its own check; this entry point runs them all and
//! collects every problem into a single `ConfigError`.

mod avatar;
mod chat;
mod conversation;
mod helpers;


use crate::schema::DocentConfig;
use docent_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &DocentConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    chat::validate_chat(&mut errors, config);
    avatar::validate_avatar(&mut errors, config);
    conversation::validate_conversation(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
