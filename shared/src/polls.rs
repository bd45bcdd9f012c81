use std::time::Duration;

use futures::future::try_join_all;
use time::OffsetDateTime;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::analytics::summarize;
use crate::auth::AuthProvider;
use crate::error::VoteError;
use crate::models::*;
use crate::status::PollStatus;
use crate::store::{with_timeout, PollStore, DEFAULT_BACKEND_TIMEOUT};
use crate::validation::validate_poll_request;

/// Poll management for the authenticated creator.
pub struct PollService<'a, S, A> {
    store: &'a S,
    auth: &'a A,
    timeout: Duration,
}

impl<'a, S, A> PollService<'a, S, A>
where
    S: PollStore + Sync,
    A: AuthProvider + Sync,
{
    pub fn new(store: &'a S, auth: &'a A) -> Self {
        Self { store, auth, timeout: DEFAULT_BACKEND_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn require_user(&self) -> Result<UserId, VoteError> {
        with_timeout(self.timeout, self.auth.current_user())
            .await?
            .ok_or(VoteError::Unauthenticated)
    }

    async fn owned_poll(&self, poll_id: Uuid) -> Result<Poll, VoteError> {
        let user = self.require_user().await?;
        let poll = with_timeout(self.timeout, self.store.fetch_poll(poll_id))
            .await?
            .ok_or(VoteError::NotFound)?;
        if !poll.is_owned_by(user) {
            return Err(VoteError::NotAuthorized);
        }
        Ok(poll)
    }

    #[instrument(skip(self, request), fields(title = %request.title))]
    pub async fn create_poll(&self, request: &CreatePollRequest) -> Result<(Poll, Vec<PollOption>), VoteError> {
        let user = self.require_user().await?;
        let new_poll = validate_poll_request(request, user)?;
        let (poll, options) = with_timeout(self.timeout, self.store.create_poll(new_poll)).await?;
        info!(poll_id = %poll.id, options = options.len(), "Poll created");
        Ok((poll, options))
    }

    #[instrument(skip(self))]
    pub async fn delete_poll(&self, poll_id: Uuid) -> Result<(), VoteError> {
        self.owned_poll(poll_id).await?;
        if !with_timeout(self.timeout, self.store.delete_poll(poll_id)).await? {
            return Err(VoteError::NotFound);
        }
        info!("Poll deleted");
        Ok(())
    }

    /// The creator's polls, newest first, optionally narrowed to one status
    /// and to titles containing `search` (case-insensitive).
    pub async fn list_my_polls(
        &self,
        filter: Option<PollStatus>,
        search: Option<&str>,
    ) -> Result<Vec<PollSummary>, VoteError> {
        let user = self.require_user().await?;
        let polls = with_timeout(self.timeout, self.store.list_polls_by_creator(user)).await?;
        let now = OffsetDateTime::now_utc();
        let needle = search.map(|q| q.trim().to_lowercase()).filter(|q| !q.is_empty());

        let wanted: Vec<Poll> = polls.into_iter()
            .filter(|poll| filter.map_or(true, |status| poll.status_at(now) == status))
            .filter(|poll| needle.as_ref().map_or(true, |q| poll.title.to_lowercase().contains(q.as_str())))
            .collect();

        let summaries = try_join_all(wanted.into_iter().map(|poll| async move {
            let votes = with_timeout(self.timeout, self.store.count_votes(poll.id)).await?;
            let options = with_timeout(self.timeout, self.store.fetch_options(poll.id)).await?.len() as u64;
            Ok::<_, VoteError>(PollSummary { status: poll.status_at(now), votes, options, poll })
        }))
        .await?;

        Ok(summaries)
    }

    pub async fn dashboard_stats(&self) -> Result<DashboardStats, VoteError> {
        let summaries = self.list_my_polls(None, None).await?;
        Ok(summaries.iter().fold(DashboardStats::default(), |mut stats, summary| {
            stats.total_polls += 1;
            stats.total_votes += summary.votes;
            match summary.status {
                PollStatus::Active => stats.active_polls += 1,
                PollStatus::Ended => stats.ended_polls += 1,
                PollStatus::Upcoming => {}
            }
            stats
        }))
    }

    pub async fn poll_analytics(&self, poll_id: Uuid) -> Result<PollAnalytics, VoteError> {
        self.owned_poll(poll_id).await?;
        let events = with_timeout(self.timeout, self.store.fetch_events(poll_id)).await?;
        Ok(summarize(&events))
    }
}
