use std::collections::HashMap;

use pollup_shared::{models::*, PollStore, StoreError};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

const POLL_COLUMNS: &str = "id, title, description, starts_at, ends_at, created_at, created_by";
const OPTION_COLUMNS: &str = "id, poll_id, label, image_url, position";
const VOTE_COLUMNS: &str = "id, poll_id, option_id, device_id, user_id, cast_at";

#[derive(FromRow)]
struct PollRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    starts_at: Option<OffsetDateTime>,
    ends_at: Option<OffsetDateTime>,
    created_at: OffsetDateTime,
    created_by: Uuid,
}

impl From<PollRow> for Poll {
    fn from(row: PollRow) -> Self {
        Poll {
            id: row.id,
            title: row.title,
            description: row.description,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            created_at: row.created_at,
            created_by: UserId(row.created_by),
        }
    }
}

#[derive(FromRow)]
struct OptionRow {
    id: Uuid,
    poll_id: Uuid,
    label: String,
    image_url: Option<String>,
    position: i32,
}

impl From<OptionRow> for PollOption {
    fn from(row: OptionRow) -> Self {
        PollOption {
            id: row.id,
            poll_id: row.poll_id,
            label: row.label,
            image_url: row.image_url,
            position: row.position,
        }
    }
}

#[derive(FromRow)]
struct VoteRow {
    id: Uuid,
    poll_id: Uuid,
    option_id: Uuid,
    device_id: String,
    user_id: Option<Uuid>,
    cast_at: OffsetDateTime,
}

impl From<VoteRow> for Vote {
    fn from(row: VoteRow) -> Self {
        Vote {
            id: row.id,
            poll_id: row.poll_id,
            option_id: row.option_id,
            device_id: DeviceId::new(row.device_id),
            voter: Voter::from(row.user_id.map(UserId)),
            cast_at: row.cast_at,
        }
    }
}

#[derive(FromRow)]
struct EventRow {
    poll_id: Uuid,
    option_id: Option<Uuid>,
    device_id: String,
    kind: EventKind,
    occurred_at: OffsetDateTime,
}

#[derive(FromRow)]
struct OptionCount {
    option_id: Uuid,
    votes: i64,
}

/// Translates driver errors into the store taxonomy. The
/// `poll_votes_poll_device_key` constraint surfaces as a unique violation.
fn map_db_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::UniqueViolation,
        sqlx::Error::Database(db) if db.is_foreign_key_violation() => StoreError::InvalidReference,
        _ => StoreError::Unavailable(e.to_string()),
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl PollStore for PgStore {
    async fn create_poll(&self, poll: NewPoll) -> Result<(Poll, Vec<PollOption>), StoreError> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let record: PollRow = sqlx::query_as(&format!(
            "INSERT INTO polls (id, title, description, starts_at, ends_at, created_by)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {POLL_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&poll.title)
        .bind(&poll.description)
        .bind(poll.starts_at)
        .bind(poll.ends_at)
        .bind(poll.created_by.0)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let mut options = Vec::with_capacity(poll.options.len());
        for (position, label) in poll.options.iter().enumerate() {
            let option: OptionRow = sqlx::query_as(&format!(
                "INSERT INTO poll_options (id, poll_id, label, position)
                 VALUES ($1, $2, $3, $4)
                 RETURNING {OPTION_COLUMNS}"
            ))
            .bind(Uuid::new_v4())
            .bind(record.id)
            .bind(label)
            .bind(position as i32)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_db_error)?;
            options.push(option.into());
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok((record.into(), options))
    }

    async fn fetch_poll(&self, poll_id: Uuid) -> Result<Option<Poll>, StoreError> {
        let record: Option<PollRow> = sqlx::query_as(&format!("SELECT {POLL_COLUMNS} FROM polls WHERE id = $1"))
            .bind(poll_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(record.map(Poll::from))
    }

    async fn list_polls_by_creator(&self, user: UserId) -> Result<Vec<Poll>, StoreError> {
        let records: Vec<PollRow> = sqlx::query_as(&format!(
            "SELECT {POLL_COLUMNS} FROM polls WHERE created_by = $1 ORDER BY created_at DESC"
        ))
        .bind(user.0)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records.into_iter().map(Poll::from).collect())
    }

    async fn delete_poll(&self, poll_id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM polls WHERE id = $1")
            .bind(poll_id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn fetch_options(&self, poll_id: Uuid) -> Result<Vec<PollOption>, StoreError> {
        let records: Vec<OptionRow> = sqlx::query_as(&format!(
            "SELECT {OPTION_COLUMNS} FROM poll_options WHERE poll_id = $1 ORDER BY position"
        ))
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records.into_iter().map(PollOption::from).collect())
    }

    async fn find_vote(&self, poll_id: Uuid, device_id: &DeviceId) -> Result<Option<Vote>, StoreError> {
        let record: Option<VoteRow> = sqlx::query_as(&format!(
            "SELECT {VOTE_COLUMNS} FROM poll_votes WHERE poll_id = $1 AND device_id = $2"
        ))
        .bind(poll_id)
        .bind(device_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(record.map(Vote::from))
    }

    async fn insert_vote(&self, vote: NewVote) -> Result<Vote, StoreError> {
        let record: VoteRow = sqlx::query_as(&format!(
            "INSERT INTO poll_votes (id, poll_id, option_id, device_id, user_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {VOTE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(vote.poll_id)
        .bind(vote.option_id)
        .bind(vote.device_id.as_str())
        .bind(vote.voter.user_id().map(|user| user.0))
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(record.into())
    }

    async fn count_votes(&self, poll_id: Uuid) -> Result<u64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM poll_votes WHERE poll_id = $1")
            .bind(poll_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)?;
        Ok(count.max(0) as u64)
    }

    async fn count_votes_by_option(&self, poll_id: Uuid) -> Result<HashMap<Uuid, u64>, StoreError> {
        let counts: Vec<OptionCount> = sqlx::query_as(
            "SELECT option_id, COUNT(*) AS votes FROM poll_votes WHERE poll_id = $1 GROUP BY option_id"
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(counts.into_iter().map(|c| (c.option_id, c.votes.max(0) as u64)).collect())
    }

    async fn record_event(&self, event: NewEvent) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO analytics_events (poll_id, option_id, device_id, kind) VALUES ($1, $2, $3, $4)"
        )
        .bind(event.poll_id)
        .bind(event.option_id)
        .bind(event.device_id.as_str())
        .bind(event.kind)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(())
    }

    async fn fetch_events(&self, poll_id: Uuid) -> Result<Vec<AnalyticsEvent>, StoreError> {
        let records: Vec<EventRow> = sqlx::query_as(
            "SELECT poll_id, option_id, device_id, kind, occurred_at
             FROM analytics_events WHERE poll_id = $1 ORDER BY occurred_at"
        )
        .bind(poll_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;
        Ok(records.into_iter()
            .map(|row| AnalyticsEvent {
                poll_id: row.poll_id,
                option_id: row.option_id,
                device_id: DeviceId::new(row.device_id),
                kind: row.kind,
                occurred_at: row.occurred_at,
            })
            .collect())
    }
}
