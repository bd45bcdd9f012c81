use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::*;
use crate::store::PollStore;

#[derive(Debug, Default)]
struct Tables {
    polls: HashMap<Uuid, Poll>,
    options: Vec<PollOption>,
    votes: Vec<Vote>,
    voted: HashSet<(Uuid, DeviceId)>,
    events: Vec<AnalyticsEvent>,
}

/// Process-local [`PollStore`] with the same constraints as the Postgres
/// schema: unique (poll, device) votes, option membership, cascading
/// deletes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables.lock().map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}

impl PollStore for MemoryStore {
    async fn create_poll(&self, poll: NewPoll) -> Result<(Poll, Vec<PollOption>), StoreError> {
        let mut tables = self.lock()?;
        let record = Poll {
            id: Uuid::new_v4(),
            title: poll.title,
            description: poll.description,
            starts_at: poll.starts_at,
            ends_at: poll.ends_at,
            created_at: OffsetDateTime::now_utc(),
            created_by: poll.created_by,
        };
        let options: Vec<PollOption> = poll.options.into_iter()
            .enumerate()
            .map(|(position, label)| PollOption {
                id: Uuid::new_v4(),
                poll_id: record.id,
                label,
                image_url: None,
                position: position as i32,
            })
            .collect();

        tables.polls.insert(record.id, record.clone());
        tables.options.extend(options.iter().cloned());
        Ok((record, options))
    }

    async fn fetch_poll(&self, poll_id: Uuid) -> Result<Option<Poll>, StoreError> {
        Ok(self.lock()?.polls.get(&poll_id).cloned())
    }

    async fn list_polls_by_creator(&self, user: UserId) -> Result<Vec<Poll>, StoreError> {
        let tables = self.lock()?;
        let mut polls: Vec<Poll> = tables.polls.values()
            .filter(|poll| poll.created_by == user)
            .cloned()
            .collect();
        polls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(polls)
    }

    async fn delete_poll(&self, poll_id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.lock()?;
        if tables.polls.remove(&poll_id).is_none() {
            return Ok(false);
        }
        tables.options.retain(|opt| opt.poll_id != poll_id);
        tables.votes.retain(|vote| vote.poll_id != poll_id);
        tables.voted.retain(|(poll, _)| *poll != poll_id);
        tables.events.retain(|event| event.poll_id != poll_id);
        Ok(true)
    }

    async fn fetch_options(&self, poll_id: Uuid) -> Result<Vec<PollOption>, StoreError> {
        let tables = self.lock()?;
        let mut options: Vec<PollOption> = tables.options.iter()
            .filter(|opt| opt.poll_id == poll_id)
            .cloned()
            .collect();
        options.sort_by_key(|opt| opt.position);
        Ok(options)
    }

    async fn find_vote(&self, poll_id: Uuid, device_id: &DeviceId) -> Result<Option<Vote>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.votes.iter()
            .find(|vote| vote.poll_id == poll_id && &vote.device_id == device_id)
            .cloned())
    }

    async fn insert_vote(&self, vote: NewVote) -> Result<Vote, StoreError> {
        let mut tables = self.lock()?;
        let option_in_poll = tables.options.iter()
            .any(|opt| opt.id == vote.option_id && opt.poll_id == vote.poll_id);
        if !option_in_poll {
            return Err(StoreError::InvalidReference);
        }
        if !tables.voted.insert((vote.poll_id, vote.device_id.clone())) {
            return Err(StoreError::UniqueViolation);
        }

        let record = Vote {
            id: Uuid::new_v4(),
            poll_id: vote.poll_id,
            option_id: vote.option_id,
            device_id: vote.device_id,
            voter: vote.voter,
            cast_at: OffsetDateTime::now_utc(),
        };
        tables.votes.push(record.clone());
        Ok(record)
    }

    async fn count_votes(&self, poll_id: Uuid) -> Result<u64, StoreError> {
        let tables = self.lock()?;
        Ok(tables.votes.iter().filter(|vote| vote.poll_id == poll_id).count() as u64)
    }

    async fn count_votes_by_option(&self, poll_id: Uuid) -> Result<HashMap<Uuid, u64>, StoreError> {
        let tables = self.lock()?;
        let mut counts = HashMap::new();
        for vote in tables.votes.iter().filter(|vote| vote.poll_id == poll_id) {
            *counts.entry(vote.option_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn record_event(&self, event: NewEvent) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if !tables.polls.contains_key(&event.poll_id) {
            return Err(StoreError::InvalidReference);
        }
        tables.events.push(AnalyticsEvent {
            poll_id: event.poll_id,
            option_id: event.option_id,
            device_id: event.device_id,
            kind: event.kind,
            occurred_at: OffsetDateTime::now_utc(),
        });
        Ok(())
    }

    async fn fetch_events(&self, poll_id: Uuid) -> Result<Vec<AnalyticsEvent>, StoreError> {
        let tables = self.lock()?;
        Ok(tables.events.iter().filter(|event| event.poll_id == poll_id).cloned().collect())
    }
}
