use std::sync::{Arc, Mutex};
use std::time::Duration;

use docent_common::{Event, EventBus};
use tokio::sync::broadcast;

use super::*;
use crate::sdk::SdkListener;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Init,
    Destroy,
    Speak(String, bool, bool),
    Idle,
    Listen,
    Think,
    Volume(f32),
    DebugInfo(bool),
    Visible(bool),
    InvisibleMode,
}

#[derive(Default)]
struct MockSdk {
    calls: Mutex<Vec<Call>>,
    fail_destroy: bool,
    fail_init: bool,
}

impl MockSdk {
    fn record(&self, call: Call) -> Result<(), SdkError> {
        self.calls.lock().unwrap().push(call);
        Ok(())
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

impl AvatarSdk for MockSdk {
    fn init(&self, on_progress: ProgressCallback, mode: InitMode) -> Result<(), SdkError> {
        assert_eq!(mode, InitMode::Normal);
        self.record(Call::Init)?;
        if self.fail_init {
            return Err(SdkError::new("init exploded"));
        }
        on_progress(50);
        Ok(())
    }
    fn destroy(&self) -> Result<(), SdkError> {
        self.record(Call::Destroy)?;
        if self.fail_destroy {
            return Err(SdkError::new("destroy exploded"));
        }
        Ok(())
    }
    fn speak(&self, text: &str, is_start: bool, is_end: bool) -> Result<(), SdkError> {
        self.record(Call::Speak(text.to_string(), is_start, is_end))
    }
    fn idle(&self) -> Result<(), SdkError> {
        self.record(Call::Idle)
    }
    fn listen(&self) -> Result<(), SdkError> {
        self.record(Call::Listen)
    }
    fn think(&self) -> Result<(), SdkError> {
        self.record(Call::Think)
    }
    fn set_volume(&self, volume: f32) -> Result<(), SdkError> {
        self.record(Call::Volume(volume))
    }
    fn show_debug_info(&self) -> Result<(), SdkError> {
        self.record(Call::DebugInfo(true))
    }
    fn hide_debug_info(&self) -> Result<(), SdkError> {
        self.record(Call::DebugInfo(false))
    }
    fn change_avatar_visible(&self, visible: bool) -> Result<(), SdkError> {
        self.record(Call::Visible(visible))
    }
    fn switch_invisible_mode(&self) -> Result<(), SdkError> {
        self.record(Call::InvisibleMode)
    }
}

struct MockRuntime {
    sdk: Arc<MockSdk>,
    listener: Mutex<Option<Arc<dyn SdkListener>>>,
    fail_create: bool,
}

impl MockRuntime {
    fn new(sdk: MockSdk) -> Arc<Self> {
        Arc::new(Self {
            sdk: Arc::new(sdk),
            listener: Mutex::new(None),
            fail_create: false,
        })
    }

    fn listener(&self) -> Arc<dyn SdkListener> {
        self.listener.lock().unwrap().clone().expect("listener registered")
    }
}

impl AvatarRuntime for MockRuntime {
    fn create(
        &self,
        _options: AvatarSdkOptions,
        listener: Arc<dyn SdkListener>,
    ) -> Result<Arc<dyn AvatarSdk>, SdkError> {
        if self.fail_create {
            return Err(SdkError::new("bad credentials"));
        }
        *self.listener.lock().unwrap() = Some(listener);
        Ok(self.sdk.clone())
    }
}

fn session_with(sdk: MockSdk) -> (AvatarSession, Arc<MockRuntime>) {
    let runtime = MockRuntime::new(sdk);
    let session = AvatarSession::new(
        AvatarSdkOptions::default(),
        Some(runtime.clone() as Arc<dyn AvatarRuntime>),
        Arc::new(EventBus::default()),
    )
    .with_pacing(Duration::ZERO);
    (session, runtime)
}

/// Initialized, connected session with its event receiver drained.
fn connected_session() -> (AvatarSession, Arc<MockRuntime>, broadcast::Receiver<Event>) {
    let (session, runtime) = session_with(MockSdk::default());
    session.initialize().unwrap();
    assert!(session.connect(None));
    runtime.listener().on_state_change("idle");
    let mut rx = session.subscribe();
    drain(&mut rx);
    (session, runtime, rx)
}

fn drain(rx: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn count(events: &[Event], wanted: &Event) -> usize {
    events.iter().filter(|e| *e == wanted).count()
}

#[test]
fn initialize_without_runtime_is_unavailable() {
    let session = AvatarSession::new(
        AvatarSdkOptions::default(),
        None,
        Arc::new(EventBus::default()),
    );
    let mut rx = session.subscribe();

    assert!(matches!(session.initialize(), Err(AvatarError::SdkUnavailable)));
    assert!(!session.is_initialized());
    assert!(matches!(drain(&mut rx).as_slice(), [Event::AvatarError(_)]));
}

#[test]
fn initialize_failure_is_init_error() {
    let runtime = Arc::new(MockRuntime {
        sdk: Arc::new(MockSdk::default()),
        listener: Mutex::new(None),
        fail_create: true,
    });
    let session = AvatarSession::new(
        AvatarSdkOptions::default(),
        Some(runtime as Arc<dyn AvatarRuntime>),
        Arc::new(EventBus::default()),
    );
    let mut rx = session.subscribe();

    match session.initialize() {
        Err(AvatarError::InitError(message)) => assert_eq!(message, "bad credentials"),
        other => panic!("expected InitError, got {other:?}"),
    }
    assert_eq!(drain(&mut rx).len(), 1);
}

#[test]
fn connect_before_initialize_fails() {
    let (session, _runtime) = session_with(MockSdk::default());
    let mut rx = session.subscribe();

    assert!(!session.connect(None));
    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(matches!(drain(&mut rx).as_slice(), [Event::AvatarError(_)]));
}

#[test]
fn connect_enters_connecting_and_reports_progress() {
    let (session, runtime) = session_with(MockSdk::default());
    session.initialize().unwrap();
    let mut rx = session.subscribe();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    assert!(session.connect(Some(Box::new(move |p| sink.lock().unwrap().push(p)))));

    assert_eq!(session.state(), SessionState::Connecting);
    assert!(!session.is_connected());
    assert_eq!(*seen.lock().unwrap(), vec![50]);
    assert_eq!(drain(&mut rx), vec![Event::LoadProgress(50)]);
    assert_eq!(runtime.sdk.calls(), vec![Call::Init]);
}

#[test]
fn connect_init_failure_reverts_state() {
    let (session, _runtime) = session_with(MockSdk {
        fail_init: true,
        ..MockSdk::default()
    });
    session.initialize().unwrap();

    assert!(!session.connect(None));
    assert_eq!(session.state(), SessionState::Disconnected);
}

#[test]
fn connect_when_connected_does_not_reinit() {
    let (session, runtime, _rx) = connected_session();
    assert!(session.connect(None));
    assert_eq!(runtime.sdk.calls(), vec![Call::Init]);
}

#[test]
fn state_events_fire_once_per_edge() {
    let (session, runtime) = session_with(MockSdk::default());
    session.initialize().unwrap();
    session.connect(None);
    let listener = runtime.listener();
    let mut rx = session.subscribe();

    listener.on_state_change("idle");
    listener.on_state_change("listen");
    let events = drain(&mut rx);
    assert_eq!(count(&events, &Event::AvatarConnected), 1);
    assert_eq!(
        count(&events, &Event::AvatarStateChanged("listen".into())),
        1
    );
    assert!(session.is_connected());

    listener.on_state_change("offline");
    let events = drain(&mut rx);
    assert_eq!(count(&events, &Event::AvatarDisconnected), 1);
    assert_eq!(session.state(), SessionState::Disconnected);

    listener.on_state_change("offline");
    let events = drain(&mut rx);
    assert_eq!(count(&events, &Event::AvatarDisconnected), 0);
    assert_eq!(events, vec![Event::AvatarStateChanged("offline".into())]);
}

#[test]
fn connect_event_precedes_raw_state_event() {
    let (session, runtime) = session_with(MockSdk::default());
    session.initialize().unwrap();
    session.connect(None);
    let mut rx = session.subscribe();

    runtime.listener().on_state_change("idle");
    assert_eq!(
        drain(&mut rx),
        vec![
            Event::AvatarConnected,
            Event::AvatarStateChanged("idle".into())
        ]
    );
}

#[test]
fn voice_state_toggles_speaking() {
    let (session, runtime, mut rx) = connected_session();
    let listener = runtime.listener();

    listener.on_voice_state_change("start");
    assert!(session.is_speaking());
    assert!(session.is_connected());

    listener.on_voice_state_change("end");
    assert!(!session.is_speaking());
    assert_eq!(
        drain(&mut rx),
        vec![Event::AvatarSpeaking(true), Event::AvatarSpeaking(false)]
    );
}

#[test]
fn sdk_messages_and_errors_are_republished() {
    let (_session, runtime, mut rx) = connected_session();
    let listener = runtime.listener();

    listener.on_message("hello");
    listener.on_error("network lost");
    assert_eq!(
        drain(&mut rx),
        vec![
            Event::AvatarMessage("hello".into()),
            Event::AvatarError("network lost".into())
        ]
    );
}

#[test]
fn speak_while_disconnected_fails() {
    let (session, runtime) = session_with(MockSdk::default());
    session.initialize().unwrap();
    let mut rx = session.subscribe();

    assert!(!session.speak("hi", true));
    assert!(runtime.sdk.calls().is_empty());
    assert!(matches!(drain(&mut rx).as_slice(), [Event::AvatarError(_)]));
}

#[test]
fn speak_sends_complete_utterance() {
    let (session, runtime, _rx) = connected_session();
    assert!(session.speak("欢迎", true));
    assert_eq!(
        runtime.sdk.calls().last(),
        Some(&Call::Speak("欢迎".into(), true, true))
    );
}

#[tokio::test]
async fn speak_stream_marks_first_and_last() {
    let (session, runtime, _rx) = connected_session();
    assert!(session.speak_stream(&["a", "b", "c"]).await);

    let speaks: Vec<Call> = runtime
        .sdk
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Speak(..)))
        .collect();
    assert_eq!(
        speaks,
        vec![
            Call::Speak("a".into(), true, false),
            Call::Speak("b".into(), false, false),
            Call::Speak("c".into(), false, true),
        ]
    );
}

#[tokio::test]
async fn wait_connected_resolves_on_first_live_state() {
    let (session, runtime) = session_with(MockSdk::default());
    session.initialize().unwrap();
    session.connect(None);
    let listener = runtime.listener();

    let waiter = session.wait_connected();
    listener.on_state_change("idle");
    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("session connected");
}

#[test]
fn volume_is_validated_and_applied_when_connected() {
    let (session, runtime, _rx) = connected_session();

    assert!(!session.set_volume(-0.1));
    assert!(!session.set_volume(1.5));
    assert_eq!(session.volume(), DEFAULT_VOLUME);

    assert!(session.set_volume(0.0));
    assert!(session.set_volume(1.0));
    assert_eq!(session.volume(), 1.0);

    let volumes: Vec<Call> = runtime
        .sdk
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Volume(_)))
        .collect();
    assert_eq!(volumes, vec![Call::Volume(0.0), Call::Volume(1.0)]);
}

#[test]
fn volume_is_stored_while_disconnected() {
    let (session, runtime) = session_with(MockSdk::default());
    assert!(session.set_volume(0.3));
    assert_eq!(session.volume(), 0.3);
    assert!(runtime.sdk.calls().is_empty());
}

#[test]
fn poses_are_ignored_while_disconnected() {
    let (session, runtime) = session_with(MockSdk::default());
    session.initialize().unwrap();
    session.idle();
    session.listen();
    session.think();
    assert!(runtime.sdk.calls().is_empty());
}

#[test]
fn poses_and_display_controls_forward_when_connected() {
    let (session, runtime, _rx) = connected_session();
    session.think();
    session.listen();
    session.idle();
    session.show_debug_info();
    session.hide_debug_info();
    session.set_avatar_visible(false);
    session.switch_invisible_mode();

    assert_eq!(
        runtime.sdk.calls()[1..],
        [
            Call::Think,
            Call::Listen,
            Call::Idle,
            Call::DebugInfo(true),
            Call::DebugInfo(false),
            Call::Visible(false),
            Call::InvisibleMode,
        ]
    );
}

#[test]
fn disconnect_is_idempotent() {
    let (session, runtime) = session_with(MockSdk::default());
    session.initialize().unwrap();
    let mut rx = session.subscribe();

    session.disconnect();
    assert!(drain(&mut rx).is_empty());
    assert!(runtime.sdk.calls().is_empty());
}

#[test]
fn disconnect_with_failing_teardown_still_resets() {
    let (session, runtime) = session_with(MockSdk {
        fail_destroy: true,
        ..MockSdk::default()
    });
    session.initialize().unwrap();
    session.connect(None);
    runtime.listener().on_state_change("idle");
    let mut rx = session.subscribe();

    session.disconnect();

    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(!session.is_initialized());
    let events = drain(&mut rx);
    assert_eq!(count(&events, &Event::AvatarDisconnected), 1);
    assert!(events.iter().any(|e| matches!(e, Event::AvatarError(_))));
}

#[test]
fn reconnect_requires_new_instance() {
    let (session, runtime, _rx) = connected_session();
    session.disconnect();
    assert!(!session.connect(None));

    session.initialize().unwrap();
    assert!(session.connect(None));
    assert_eq!(runtime.sdk.calls().iter().filter(|c| **c == Call::Init).count(), 2);
}

#[test]
fn late_callbacks_from_torn_down_instance_are_ignored() {
    let (session, runtime) = session_with(MockSdk::default());
    session.initialize().unwrap();
    session.connect(None);
    let stale = runtime.listener();

    session.disconnect();
    let mut rx = session.subscribe();
    stale.on_state_change("idle");
    stale.on_voice_state_change("start");
    stale.on_error("late failure");

    assert_eq!(session.state(), SessionState::Disconnected);
    assert!(!session.speak("hello", false));
    let events = drain(&mut rx);
    assert_eq!(count(&events, &Event::AvatarConnected), 0);
    assert!(!events.iter().any(|e| matches!(e, Event::AvatarSpeaking(_))));
}

#[test]
fn replaced_instance_cannot_drive_new_session() {
    let (session, runtime) = session_with(MockSdk::default());
    session.initialize().unwrap();
    session.connect(None);
    let stale = runtime.listener();
    session.disconnect();

    session.initialize().unwrap();
    session.connect(None);
    stale.on_state_change("idle");
    assert_eq!(session.state(), SessionState::Connecting);

    runtime.listener().on_state_change("idle");
    assert!(session.is_connected());
}

#[test]
fn failed_reinitialize_keeps_current_instance_live() {
    let (session, runtime, _rx) = connected_session();
    let failing = Arc::new(MockRuntime {
        sdk: Arc::new(MockSdk::default()),
        listener: Mutex::new(None),
        fail_create: true,
    });
    let session = AvatarSession {
        runtime: Some(failing as Arc<dyn AvatarRuntime>),
        ..session
    };

    assert!(session.initialize().is_err());
    runtime.listener().on_voice_state_change("start");
    assert!(session.is_speaking());
}
