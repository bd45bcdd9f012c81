use std::collections::HashMap;
use uuid::Uuid;
use pollup_shared::{models::*, MemoryStore, PollStore, StoreError};

use crate::queries::PgStore;

/// The store managed by the Rocket instance: Postgres in production, the
/// in-memory store for local runs and tests.
pub enum Store {
    Postgres(PgStore),
    Memory(MemoryStore),
}

macro_rules! delegate {
    ($self:ident, $store:ident => $call:expr) => {
        match $self {
            Store::Postgres($store) => $call.await,
            Store::Memory($store) => $call.await,
        }
    };
}

impl PollStore for Store {
    async fn create_poll(&self, poll: NewPoll) -> Result<(Poll, Vec<PollOption>), StoreError> {
        delegate!(self, s => s.create_poll(poll))
    }

    async fn fetch_poll(&self, poll_id: Uuid) -> Result<Option<Poll>, StoreError> {
        delegate!(self, s => s.fetch_poll(poll_id))
    }

    async fn list_polls_by_creator(&self, user: UserId) -> Result<Vec<Poll>, StoreError> {
        delegate!(self, s => s.list_polls_by_creator(user))
    }

    async fn delete_poll(&self, poll_id: Uuid) -> Result<bool, StoreError> {
        delegate!(self, s => s.delete_poll(poll_id))
    }

    async fn fetch_options(&self, poll_id: Uuid) -> Result<Vec<PollOption>, StoreError> {
        delegate!(self, s => s.fetch_options(poll_id))
    }

    async fn find_vote(&self, poll_id: Uuid, device_id: &DeviceId) -> Result<Option<Vote>, StoreError> {
        delegate!(self, s => s.find_vote(poll_id, device_id))
    }

    async fn insert_vote(&self, vote: NewVote) -> Result<Vote, StoreError> {
        delegate!(self, s => s.insert_vote(vote))
    }

    async fn count_votes(&self, poll_id: Uuid) -> Result<u64, StoreError> {
        delegate!(self, s => s.count_votes(poll_id))
    }

    async fn count_votes_by_option(&self, poll_id: Uuid) -> Result<HashMap<Uuid, u64>, StoreError> {
        delegate!(self, s => s.count_votes_by_option(poll_id))
    }

    async fn record_event(&self, event: NewEvent) -> Result<(), StoreError> {
        delegate!(self, s => s.record_event(event))
    }

    async fn fetch_events(&self, poll_id: Uuid) -> Result<Vec<AnalyticsEvent>, StoreError> {
        delegate!(self, s => s.fetch_events(poll_id))
    }
}
