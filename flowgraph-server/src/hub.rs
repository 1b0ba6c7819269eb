//! Per-run event channels bridging the engine to SSE subscribers.
//!
//! One bounded queue per run, opened when the run starts so events buffer
//! for a subscriber that attaches late. At most one subscriber consumes a
//! run's stream; publishing to a missing or full queue drops the event and
//! never surfaces to the engine. The queue closes after the terminal event.

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::mpsc;

use flowgraph::{EventSink, RunEvent};

/// Events buffered per run before (or while) a subscriber drains them.
const CHANNEL_CAPACITY: usize = 128;

/// Run id → event queue. Shared as `Arc<EventHub>` between the engine (as
/// its `EventSink`) and the SSE route (as the subscriber side).
#[derive(Default)]
pub struct EventHub {
    senders: DashMap<String, mpsc::Sender<RunEvent>>,
    receivers: DashMap<String, mpsc::Receiver<RunEvent>>,
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the queue for a run. Called before the engine task starts so no
    /// event can be published ahead of the buffer.
    pub fn open(&self, run_id: &str) {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        self.senders.insert(run_id.to_string(), tx);
        self.receivers.insert(run_id.to_string(), rx);
    }

    /// Hands out the run's receiver, at most once. `None` for unknown runs
    /// and for streams already claimed by an earlier subscriber.
    pub fn subscribe(&self, run_id: &str) -> Option<mpsc::Receiver<RunEvent>> {
        self.receivers.remove(run_id).map(|(_, rx)| rx)
    }
}

#[async_trait]
impl EventSink for EventHub {
    async fn publish(&self, run_id: &str, event: RunEvent) {
        let terminal = event.is_terminal();
        if let Some(tx) = self.senders.get(run_id) {
            // Full queue or detached subscriber: drop, never block the engine.
            let _ = tx.try_send(event);
        }
        if terminal {
            self.senders.remove(run_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowgraph::StateMap;

    fn start_event(node: &str) -> RunEvent {
        RunEvent::NodeStart {
            node: node.to_string(),
            state: StateMap::new(),
        }
    }

    fn complete_event(run_id: &str) -> RunEvent {
        RunEvent::WorkflowComplete {
            run_id: run_id.to_string(),
            final_state: StateMap::new(),
        }
    }

    /// **Scenario**: Events published before a subscriber attaches are
    /// buffered; the stream ends after the terminal event.
    #[tokio::test]
    async fn buffers_until_subscribe_and_closes_on_terminal() {
        let hub = EventHub::new();
        hub.open("r1");
        hub.publish("r1", start_event("a")).await;
        hub.publish("r1", complete_event("r1")).await;

        let mut rx = hub.subscribe("r1").expect("stream available");
        assert!(matches!(rx.recv().await, Some(RunEvent::NodeStart { .. })));
        assert!(matches!(rx.recv().await, Some(RunEvent::WorkflowComplete { .. })));
        // Sender was dropped on the terminal event.
        assert!(rx.recv().await.is_none());
    }

    /// **Scenario**: Publishing to an unknown run is a silent no-op.
    #[tokio::test]
    async fn publish_without_open_is_noop() {
        let hub = EventHub::new();
        hub.publish("ghost", start_event("a")).await;
        assert!(hub.subscribe("ghost").is_none());
    }

    /// **Scenario**: A run's stream can be claimed at most once.
    #[tokio::test]
    async fn second_subscribe_returns_none() {
        let hub = EventHub::new();
        hub.open("r1");
        assert!(hub.subscribe("r1").is_some());
        assert!(hub.subscribe("r1").is_none());
    }

    /// **Scenario**: A detached subscriber does not stop publication; the
    /// engine-side publish still succeeds as a no-op.
    #[tokio::test]
    async fn detached_subscriber_drops_events() {
        let hub = EventHub::new();
        hub.open("r1");
        let rx = hub.subscribe("r1").unwrap();
        drop(rx);
        hub.publish("r1", start_event("a")).await;
        hub.publish("r1", complete_event("r1")).await;
    }
}
