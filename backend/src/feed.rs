use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;
use pollup_shared::models::EventKind;

use crate::config::MAX_FEED_CAPACITY;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum ChangeKind {
    VoteCast {
        #[serde(rename = "optionId")]
        option_id: Uuid,
    },
    EventRecorded { kind: EventKind },
    PollDeleted,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollChange {
    pub poll_id: Uuid,
    pub change: ChangeKind,
}

/// Fan-out of committed writes to live viewers. Publishing never blocks;
/// slow subscribers lose the oldest messages.
pub struct ChangeFeed {
    sender: broadcast::Sender<PollChange>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.clamp(1, MAX_FEED_CAPACITY));
        Self { sender }
    }

    pub fn publish(&self, poll_id: Uuid, change: ChangeKind) {
        // No receivers is the common case and not an error.
        if self.sender.send(PollChange { poll_id, change }).is_err() {
            debug!(%poll_id, "No live subscribers for change");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PollChange> {
        self.sender.subscribe()
    }
}
