use tokio::sync::broadcast;

/// Cross-screen notifications with typed payloads. Screens that care
/// subscribe explicitly instead of hanging listeners off a global emitter.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    InvestmentAdded {
        id: Option<String>,
        investment_type: String,
        amount: f64,
    },
}

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Fire-and-forget: publishing with no live subscribers is fine.
    pub fn publish(&self, event: AppEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_typed_payload() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        bus.publish(AppEvent::InvestmentAdded {
            id: Some("inv-1".to_string()),
            investment_type: "mutual_fund".to_string(),
            amount: 5000.0,
        });
        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            AppEvent::InvestmentAdded {
                id: Some("inv-1".to_string()),
                investment_type: "mutual_fund".to_string(),
                amount: 5000.0,
            }
        );
    }

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        let bus = EventBus::default();
        bus.publish(AppEvent::InvestmentAdded {
            id: None,
            investment_type: "stock".to_string(),
            amount: 1.0,
        });
    }
}
