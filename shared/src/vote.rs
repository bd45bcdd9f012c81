use std::time::Duration;

use time::OffsetDateTime;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::analytics::EventTracker;
use crate::auth::AuthProvider;
use crate::device::DeviceIdentityStore;
use crate::error::{StoreError, VoteError};
use crate::models::*;
use crate::store::{with_timeout, PollStore, DEFAULT_BACKEND_TIMEOUT};

/// Records at most one vote per (poll, device).
///
/// The existing-vote lookup only produces the friendly answer early. The
/// store's uniqueness constraint decides races: a rejected insert is
/// reported as [`VoteError::AlreadyVoted`] exactly like a pre-check hit, so
/// every concurrent submission from one device ends in a single stored vote.
pub struct VoteService<'a, S, D, A> {
    store: &'a S,
    device: &'a D,
    auth: &'a A,
    timeout: Duration,
}

impl<'a, S, D, A> VoteService<'a, S, D, A>
where
    S: PollStore + Sync,
    D: DeviceIdentityStore + Sync,
    A: AuthProvider + Sync,
{
    pub fn new(store: &'a S, device: &'a D, auth: &'a A) -> Self {
        Self { store, device, auth, timeout: DEFAULT_BACKEND_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn has_voted(&self, poll_id: Uuid) -> Result<bool, VoteError> {
        let device_id = self.device.get();
        let existing = with_timeout(self.timeout, self.store.find_vote(poll_id, &device_id)).await?;
        Ok(existing.is_some())
    }

    /// The option is trusted to belong to the poll; the store's foreign key
    /// rejects it otherwise.
    #[instrument(skip(self))]
    pub async fn submit_vote(&self, poll_id: Uuid, option_id: Uuid) -> Result<Vote, VoteError> {
        let device_id = self.device.get();
        let voter = match with_timeout(self.timeout, self.auth.current_user()).await {
            Ok(user) => Voter::from(user),
            Err(e) => {
                warn!("Could not resolve current user, voting anonymously: {}", e);
                Voter::Anonymous
            }
        };

        let poll = with_timeout(self.timeout, self.store.fetch_poll(poll_id))
            .await?
            .ok_or(VoteError::NotFound)?;
        let status = poll.status_at(OffsetDateTime::now_utc());
        if !status.accepts_votes() {
            return Err(VoteError::PollNotActive(status));
        }

        if with_timeout(self.timeout, self.store.find_vote(poll_id, &device_id)).await?.is_some() {
            return Err(VoteError::AlreadyVoted);
        }

        let new_vote = NewVote { poll_id, option_id, device_id, voter };
        let vote = match with_timeout(self.timeout, self.store.insert_vote(new_vote)).await {
            Ok(vote) => vote,
            Err(StoreError::UniqueViolation) => {
                info!("Duplicate vote rejected by store constraint");
                return Err(VoteError::AlreadyVoted);
            }
            Err(e) => return Err(e.into()),
        };

        EventTracker::new(self.store, self.device)
            .with_timeout(self.timeout)
            .track(poll_id, EventKind::Vote, Some(option_id))
            .await;

        info!(vote_id = %vote.id, "Vote recorded");
        Ok(vote)
    }
}
