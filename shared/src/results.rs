use std::time::Duration;

use time::OffsetDateTime;
use uuid::Uuid;

use crate::device::DeviceIdentityStore;
use crate::error::VoteError;
use crate::models::*;
use crate::status::PollStatus;
use crate::store::{with_timeout, PollStore, DEFAULT_BACKEND_TIMEOUT};
use crate::tally::tally;

/// Derive-on-read results. Nothing is cached; every call reflects the votes
/// committed when it runs.
pub struct ResultsAggregator<'a, S, D> {
    store: &'a S,
    device: &'a D,
    timeout: Duration,
}

impl<'a, S, D> ResultsAggregator<'a, S, D>
where
    S: PollStore + Sync,
    D: DeviceIdentityStore + Sync,
{
    pub fn new(store: &'a S, device: &'a D) -> Self {
        Self { store, device, timeout: DEFAULT_BACKEND_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn get_poll_results(&self, poll_id: Uuid) -> Result<PollResults, VoteError> {
        let options = with_timeout(self.timeout, self.store.fetch_options(poll_id)).await?;
        if options.is_empty() && with_timeout(self.timeout, self.store.fetch_poll(poll_id)).await?.is_none() {
            return Err(VoteError::NotFound);
        }
        let counts = with_timeout(self.timeout, self.store.count_votes_by_option(poll_id)).await?;
        Ok(tally(poll_id, &options, &counts))
    }

    /// Everything a poll page needs: the poll, its status for this instant,
    /// whether this device voted, and the current tally.
    pub async fn poll_view(&self, poll_id: Uuid) -> Result<PollView, VoteError> {
        let poll = with_timeout(self.timeout, self.store.fetch_poll(poll_id))
            .await?
            .ok_or(VoteError::NotFound)?;
        let options = with_timeout(self.timeout, self.store.fetch_options(poll_id)).await?;
        let counts = with_timeout(self.timeout, self.store.count_votes_by_option(poll_id)).await?;

        let device_id = self.device.get();
        let has_voted = with_timeout(self.timeout, self.store.find_vote(poll_id, &device_id))
            .await?
            .is_some();

        let status = poll.status_at(OffsetDateTime::now_utc());
        let results = tally(poll_id, &options, &counts);

        Ok(PollView {
            poll,
            options,
            status,
            has_voted,
            show_results: has_voted || status == PollStatus::Ended,
            results,
        })
    }
}
