use tokio::sync::broadcast;

/// Events re-emitted by the avatar session and consumed by the kiosk loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    AvatarConnected,
    AvatarDisconnected,
    /// Raw SDK state string, republished as received.
    AvatarStateChanged(String),
    AvatarSpeaking(bool),
    AvatarMessage(String),
    AvatarError(String),
    /// Resource download progress, 0-100.
    LoadProgress(u32),
}

pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: Event) -> usize {
        self.sender.send(event).unwrap_or(0)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_and_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(Event::AvatarConnected);

        let event = rx.recv().await.unwrap();
        assert_eq!(event, Event::AvatarConnected);
    }

    #[tokio::test]
    async fn multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(Event::AvatarDisconnected);

        assert_eq!(rx1.recv().await.unwrap(), Event::AvatarDisconnected);
        assert_eq!(rx2.recv().await.unwrap(), Event::AvatarDisconnected);
    }

    #[tokio::test]
    async fn events_arrive_in_publish_order() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(Event::LoadProgress(50));
        bus.publish(Event::AvatarStateChanged("idle".into()));
        bus.publish(Event::AvatarConnected);

        assert_eq!(rx.recv().await.unwrap(), Event::LoadProgress(50));
        assert_eq!(
            rx.recv().await.unwrap(),
            Event::AvatarStateChanged("idle".into())
        );
        assert_eq!(rx.recv().await.unwrap(), Event::AvatarConnected);
    }

    #[test]
    fn publish_returns_zero_with_no_subscribers() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(Event::AvatarSpeaking(true)), 0);
    }
}
