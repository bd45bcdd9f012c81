use serde::{Serialize, Deserialize};
use std::fmt;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::status::PollStatus;

/// Anonymous per-device deduplication key. Not a credential.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceId(String);

impl DeviceId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Poll {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub starts_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub ends_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub created_by: UserId,
}

impl Poll {
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.created_by == user
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollOption {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub label: String,
    pub image_url: Option<String>,
    pub position: i32,
}

/// Who cast a vote. Attribution is audit data only and never takes part
/// in deduplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "userId", rename_all = "camelCase")]
pub enum Voter {
    Anonymous,
    Attributed(UserId),
}

impl Voter {
    pub fn user_id(&self) -> Option<UserId> {
        match self {
            Voter::Anonymous => None,
            Voter::Attributed(user) => Some(*user),
        }
    }
}

impl From<Option<UserId>> for Voter {
    fn from(user: Option<UserId>) -> Self {
        user.map_or(Voter::Anonymous, Voter::Attributed)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Vote {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub option_id: Uuid,
    pub device_id: DeviceId,
    pub voter: Voter,
    #[serde(with = "time::serde::rfc3339")]
    pub cast_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewVote {
    pub poll_id: Uuid,
    pub option_id: Uuid,
    pub device_id: DeviceId,
    pub voter: Voter,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub starts_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub ends_at: Option<OffsetDateTime>,
    pub options: Vec<String>,
}

/// A validated poll ready to be persisted together with its options.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPoll {
    pub title: String,
    pub description: Option<String>,
    pub starts_at: Option<OffsetDateTime>,
    pub ends_at: Option<OffsetDateTime>,
    pub created_by: UserId,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollDetails {
    pub poll: Poll,
    pub options: Vec<PollOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CastVoteRequest {
    pub option_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollResultRow {
    pub option_id: Uuid,
    pub label: String,
    pub image_url: Option<String>,
    pub votes: u64,
    pub percentage: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollResults {
    pub poll_id: Uuid,
    pub rows: Vec<PollResultRow>,
    pub total_votes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollView {
    pub poll: Poll,
    pub options: Vec<PollOption>,
    pub status: PollStatus,
    pub has_voted: bool,
    pub show_results: bool,
    pub results: PollResults,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoteStatus {
    pub poll_id: Uuid,
    pub status: PollStatus,
    pub has_voted: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollSummary {
    pub poll: Poll,
    pub status: PollStatus,
    pub votes: u64,
    pub options: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_polls: u64,
    pub active_polls: u64,
    pub ended_polls: u64,
    pub total_votes: u64,
}

#[cfg_attr(feature = "backend", derive(sqlx::Type))]
#[cfg_attr(feature = "backend", sqlx(type_name = "analytics_event_kind", rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    View,
    Vote,
    Share,
    CopyLink,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub poll_id: Uuid,
    pub option_id: Option<Uuid>,
    pub device_id: DeviceId,
    pub kind: EventKind,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub poll_id: Uuid,
    pub option_id: Option<Uuid>,
    pub device_id: DeviceId,
    pub kind: EventKind,
    #[serde(with = "time::serde::rfc3339")]
    pub occurred_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackEventRequest {
    pub kind: EventKind,
    #[serde(default)]
    pub option_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    pub date: String,
    pub views: u64,
    pub votes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HourlyVotes {
    pub hour: String,
    pub votes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollAnalytics {
    pub total_views: u64,
    pub total_votes: u64,
    pub unique_visitors: u64,
    pub conversion_rate: f64,
    pub daily_activity: Vec<DailyActivity>,
    pub hourly_distribution: Vec<HourlyVotes>,
}
