//! Default TOML config template with inline documentation comments.

/// Generate the default TOML config content with comments.
pub(crate) fn default_config_toml() -> String {
    r##"# Docent Configuration
# Schema version 1
# Only override what you want to change -- missing fields use defaults.

[chat]
# api_url = "https://open.bigmodel.cn/api/paas/v4/chat/completions"
# model = "glm-4"
# test_api_key = ""          # installed by `docent key test`
# connect_timeout_secs = 10  # 1-120
# request_timeout_secs = 120 # 1-600

[avatar]
# enabled = true
# app_id = ""
# app_secret = ""
# gateway_server = ""
# container_id = "avatar-container"
# enable_logger = true
# volume = 0.8               # 0.0-1.0
# speak_pacing_ms = 100      # delay between streamed speech fragments

[conversation]
# system_prompt = "..."
# max_history_rounds = 5     # 1-100 user/assistant exchanges kept
# settle_delay_ms = 300      # pause between "listen" and speech
# greet_delay_ms = 1000
# greeting = "..."           # empty disables the greeting
#
# [[conversation.preset_questions]]
# icon = "🏛️"
# question = "介绍一下展馆"

[storage]
# path = "/var/lib/docent/store.json"

[logging]
# level = "info"             # trace, debug, info, warn, error
"##
    .to_string()
}
