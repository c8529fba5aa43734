//! Avatar settings validation.

use crate::schema::DocentConfig;

use super::helpers::{validate_range, validate_range_f32};

pub(crate) fn validate_avatar(errors: &mut Vec<String>, config: &DocentConfig) {
    validate_range_f32(errors, "avatar.volume", config.avatar.volume, 0.0, 1.0);
    validate_range(
        errors,
        "avatar.speak_pacing_ms",
        config.avatar.speak_pacing_ms,
        0,
        5000,
    );
}
