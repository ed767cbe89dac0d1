//! Change notifications
//!
//! Every committed mutation publishes one [`ChangeEvent`] naming the
//! collections whose read projections are now stale. Subscribers (the SSE
//! endpoint, tests) re-query the projections they care about.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

#[cfg(feature = "openapi")]
use utoipa::ToSchema;

/// Default number of buffered events per subscriber
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// A projection family that can go stale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum Collection {
    Teams,
    LabBookings,
    Tournaments,
    WatchParties,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
    Joined,
    Left,
}

/// "Operation completed" signal for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(ToSchema))]
pub struct ChangeEvent {
    pub action: ChangeAction,
    pub resource_id: i32,
    pub collections: Vec<Collection>,
}

impl ChangeEvent {
    pub fn touches(&self, collection: Collection) -> bool {
        self.collections.contains(&collection)
    }
}

/// Fan-out of change events to any number of subscribers
#[derive(Debug, Clone)]
pub struct ChangeNotifier {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeNotifier {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ChangeEvent) {
        // No subscribers is not an error
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            trace!("No subscribers for change event {:?}", event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
