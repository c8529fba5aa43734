//! Stand-in avatar that "speaks" by printing to the terminal.
//!
//! It reports the same callbacks a rendering SDK would: download progress
//! during `init`, a live state once loaded, voice start/end around each
//! utterance and `offline` on teardown.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use colored::Colorize;
use docent_avatar::{
    AvatarRuntime, AvatarSdk, AvatarSdkOptions, InitMode, ProgressCallback, SdkError, SdkListener,
};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

const LOAD_STEP: Duration = Duration::from_millis(150);
const PER_CHAR: Duration = Duration::from_millis(60);
const MAX_UTTERANCE: Duration = Duration::from_secs(6);

pub struct TerminalRuntime;

impl AvatarRuntime for TerminalRuntime {
    fn create(
        &self,
        options: AvatarSdkOptions,
        listener: Arc<dyn SdkListener>,
    ) -> Result<Arc<dyn AvatarSdk>, SdkError> {
        let handle = Handle::try_current().map_err(|e| SdkError::new(e.to_string()))?;
        debug!(?options, "terminal avatar created");
        Ok(Arc::new(TerminalAvatar {
            options,
            listener,
            handle,
            alive: Arc::new(AtomicBool::new(false)),
            utterance: Mutex::new(String::new()),
            loading: Mutex::new(None),
            speech: Mutex::new(None),
        }))
    }
}

struct TerminalAvatar {
    options: AvatarSdkOptions,
    listener: Arc<dyn SdkListener>,
    handle: Handle,
    alive: Arc<AtomicBool>,
    /// Fragments of the utterance in progress.
    utterance: Mutex<String>,
    loading: Mutex<Option<JoinHandle<()>>>,
    speech: Mutex<Option<JoinHandle<()>>>,
}

impl TerminalAvatar {
    fn ensure_alive(&self) -> Result<(), SdkError> {
        if self.alive.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(SdkError::new("avatar is not loaded"))
        }
    }

    fn report(&self, state: &str) -> Result<(), SdkError> {
        self.ensure_alive()?;
        self.listener.on_state_change(state);
        Ok(())
    }

    fn speech_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.speech.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn loading_slot(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.loading.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl AvatarSdk for TerminalAvatar {
    fn init(&self, on_progress: ProgressCallback, mode: InitMode) -> Result<(), SdkError> {
        debug!(mode = mode.as_str(), "terminal avatar loading");
        let listener = Arc::clone(&self.listener);
        let alive = Arc::clone(&self.alive);
        let loading = self.handle.spawn(async move {
            for percent in (0..=100).step_by(25) {
                on_progress(percent);
                tokio::time::sleep(LOAD_STEP).await;
            }
            alive.store(true, Ordering::Release);
            listener.on_state_change("idle");
        });
        if let Some(previous) = self.loading_slot().replace(loading) {
            previous.abort();
        }
        Ok(())
    }

    fn destroy(&self) -> Result<(), SdkError> {
        if let Some(loading) = self.loading_slot().take() {
            loading.abort();
        }
        if let Some(speech) = self.speech_slot().take() {
            speech.abort();
        }
        self.alive.store(false, Ordering::Release);
        self.listener.on_state_change("offline");
        Ok(())
    }

    fn speak(&self, text: &str, is_start: bool, is_end: bool) -> Result<(), SdkError> {
        self.ensure_alive()?;

        let mut utterance = self.utterance.lock().unwrap_or_else(|e| e.into_inner());
        if is_start {
            utterance.clear();
            if let Some(previous) = self.speech_slot().take() {
                previous.abort();
            }
            self.listener.on_voice_state_change("start");
        }
        utterance.push_str(text);
        if !is_end {
            return Ok(());
        }

        let spoken = std::mem::take(&mut *utterance);
        println!("{} {}", "🗣".bright_magenta(), spoken.italic());

        let listener = Arc::clone(&self.listener);
        let duration = (PER_CHAR * spoken.chars().count() as u32).min(MAX_UTTERANCE);
        *self.speech_slot() = Some(self.handle.spawn(async move {
            tokio::time::sleep(duration).await;
            listener.on_voice_state_change("end");
        }));
        Ok(())
    }

    fn idle(&self) -> Result<(), SdkError> {
        self.report("idle")
    }

    fn listen(&self) -> Result<(), SdkError> {
        self.report("listen")
    }

    fn think(&self) -> Result<(), SdkError> {
        self.report("think")
    }

    fn set_volume(&self, volume: f32) -> Result<(), SdkError> {
        self.ensure_alive()?;
        debug!(volume, "terminal avatar volume");
        Ok(())
    }

    fn show_debug_info(&self) -> Result<(), SdkError> {
        self.ensure_alive()?;
        println!(
            "{}",
            format!(
                "[debug] container={} app_id={} gateway={}",
                self.options.container_id, self.options.app_id, self.options.gateway_server
            )
            .bright_black()
        );
        Ok(())
    }

    fn hide_debug_info(&self) -> Result<(), SdkError> {
        self.ensure_alive()
    }

    fn change_avatar_visible(&self, visible: bool) -> Result<(), SdkError> {
        self.ensure_alive()?;
        debug!(visible, "terminal avatar visibility");
        Ok(())
    }

    fn switch_invisible_mode(&self) -> Result<(), SdkError> {
        self.ensure_alive()
    }
}
