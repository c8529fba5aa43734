//! GLM chat-completion client (OpenAI-compatible wire format).
//!
//! Implements `AiClient` against `open.bigmodel.cn` by default; the URL is
//! configurable so any compatible endpoint works.

mod api;
mod client;
mod config;


pub use client::GlmClient;
pub use config::GlmConfig;
