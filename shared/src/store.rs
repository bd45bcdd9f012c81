use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use uuid::Uuid;

use crate::error::StoreError;
use crate::models::*;

pub const DEFAULT_BACKEND_TIMEOUT: Duration = Duration::from_secs(15);

/// The persistence backend. Implementations own the records and must
/// enforce at most one vote per (poll, device), reporting a second insert
/// as [`StoreError::UniqueViolation`].
pub trait PollStore {
    fn create_poll(&self, poll: NewPoll) -> impl Future<Output = Result<(Poll, Vec<PollOption>), StoreError>> + Send;

    fn fetch_poll(&self, poll_id: Uuid) -> impl Future<Output = Result<Option<Poll>, StoreError>> + Send;

    /// Newest first.
    fn list_polls_by_creator(&self, user: UserId) -> impl Future<Output = Result<Vec<Poll>, StoreError>> + Send;

    /// Removes the poll with its options, votes and events. Returns whether
    /// anything was deleted.
    fn delete_poll(&self, poll_id: Uuid) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// In insertion order.
    fn fetch_options(&self, poll_id: Uuid) -> impl Future<Output = Result<Vec<PollOption>, StoreError>> + Send;

    fn find_vote(&self, poll_id: Uuid, device_id: &DeviceId) -> impl Future<Output = Result<Option<Vote>, StoreError>> + Send;

    fn insert_vote(&self, vote: NewVote) -> impl Future<Output = Result<Vote, StoreError>> + Send;

    fn count_votes(&self, poll_id: Uuid) -> impl Future<Output = Result<u64, StoreError>> + Send;

    /// Options without votes may be absent from the map.
    fn count_votes_by_option(&self, poll_id: Uuid) -> impl Future<Output = Result<HashMap<Uuid, u64>, StoreError>> + Send;

    fn record_event(&self, event: NewEvent) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn fetch_events(&self, poll_id: Uuid) -> impl Future<Output = Result<Vec<AnalyticsEvent>, StoreError>> + Send;
}

/// Bounds a backend call so a hung request surfaces as [`StoreError::Timeout`].
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| StoreError::Timeout)?
}
