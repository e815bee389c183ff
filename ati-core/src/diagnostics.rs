//! Reporting channel for the watcher thread.
//!
//! Nothing waits on the watcher, so its outcomes are published here instead
//! of being returned: one [`WatchEvent`] per processed update file. Every
//! event is logged; callers that want to react to them (or tests that need
//! to know an update has landed) subscribe.

use crate::error::UpdateError;
use crate::protocol::UpdateTarget;
use log::{debug, warn};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchEvent {
    /// The update was parsed and written to the store.
    Applied(UpdateTarget),
    /// The update was discarded. The stored record, if any, is unchanged.
    Rejected {
        file_name: String,
        error: UpdateError,
    },
}

/// Fan-out bus for [`WatchEvent`]s.
///
/// Clones share the same subscriber list, so a bus can be handed to the
/// watcher and kept by the caller. Subscribers whose receiver was dropped are
/// pruned on the next publish.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    subscribers: Arc<Mutex<Vec<Sender<WatchEvent>>>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, event: WatchEvent) {
        match &event {
            WatchEvent::Applied(target) => debug!("[Watcher] Applied {}", target),
            WatchEvent::Rejected { file_name, error } => {
                warn!("[Watcher] Discarded {}: {}", file_name, error)
            }
        }

        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    /// Receives every event published after this call.
    pub fn subscribe(&self) -> Receiver<WatchEvent> {
        let (tx, rx) = channel();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use ati::OrderId;

    #[test]
    fn test_every_subscriber_gets_every_event() {
        let bus = Diagnostics::new();
        let a = bus.subscribe();
        let b = bus.clone().subscribe();

        let event = WatchEvent::Applied(UpdateTarget::Order(OrderId::new("abc")));
        bus.publish(event.clone());

        assert_eq!(a.try_recv().unwrap(), event);
        assert_eq!(b.try_recv().unwrap(), event);
    }

    #[test]
    fn test_dropped_subscribers_are_pruned() {
        let bus = Diagnostics::new();
        let kept = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(WatchEvent::Rejected {
            file_name: "abc.txt".into(),
            error: UpdateError::Parse(ParseError::EmptyContent),
        });

        assert_eq!(bus.subscriber_count(), 1);
        assert!(matches!(kept.try_recv(), Ok(WatchEvent::Rejected { .. })));
    }

    #[test]
    fn test_publish_without_subscribers() {
        Diagnostics::new().publish(WatchEvent::Applied(UpdateTarget::Connection(
            "Sim_101".into(),
        )));
    }
}
