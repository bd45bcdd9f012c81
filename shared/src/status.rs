use serde::{Serialize, Deserialize};
use std::fmt;
use std::str::FromStr;
use time::OffsetDateTime;

use crate::models::Poll;

/// Lifecycle of a poll relative to wall-clock time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Upcoming,
    Active,
    #[serde(alias = "past")]
    Ended,
}

impl PollStatus {
    /// Derives the status from a voting window. Both bounds are inclusive
    /// for the active state; a missing bound leaves that side open.
    pub fn at(
        starts_at: Option<OffsetDateTime>,
        ends_at: Option<OffsetDateTime>,
        now: OffsetDateTime,
    ) -> Self {
        match (starts_at, ends_at) {
            (Some(start), _) if now < start => PollStatus::Upcoming,
            (_, Some(end)) if now > end => PollStatus::Ended,
            _ => PollStatus::Active,
        }
    }

    pub fn accepts_votes(self) -> bool {
        self == PollStatus::Active
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            PollStatus::Upcoming => "upcoming",
            PollStatus::Active => "active",
            PollStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for PollStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PollStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "upcoming" => Ok(PollStatus::Upcoming),
            "active" => Ok(PollStatus::Active),
            "ended" | "past" => Ok(PollStatus::Ended),
            other => Err(format!("unknown poll status: {other}")),
        }
    }
}

impl Poll {
    pub fn status_at(&self, now: OffsetDateTime) -> PollStatus {
        PollStatus::at(self.starts_at, self.ends_at, now)
    }

    /// Re-evaluated on every call; the answer changes with time alone.
    pub fn status(&self) -> PollStatus {
        self.status_at(OffsetDateTime::now_utc())
    }
}
