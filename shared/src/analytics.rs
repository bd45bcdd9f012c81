use std::collections::{BTreeMap, HashSet};
use std::time::Duration;

use time::Date;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::device::DeviceIdentityStore;
use crate::models::*;
use crate::store::{with_timeout, PollStore, DEFAULT_BACKEND_TIMEOUT};

/// Best-effort recorder of view/vote/share events. Failures are logged and
/// never reach the caller.
pub struct EventTracker<'a, S, D> {
    store: &'a S,
    device: &'a D,
    timeout: Duration,
}

impl<'a, S: PollStore + Sync, D: DeviceIdentityStore + Sync> EventTracker<'a, S, D> {
    pub fn new(store: &'a S, device: &'a D) -> Self {
        Self { store, device, timeout: DEFAULT_BACKEND_TIMEOUT }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns whether the event was stored.
    pub async fn track(&self, poll_id: Uuid, kind: EventKind, option_id: Option<Uuid>) -> bool {
        let event = NewEvent {
            poll_id,
            option_id,
            device_id: self.device.get(),
            kind,
        };
        match with_timeout(self.timeout, self.store.record_event(event)).await {
            Ok(()) => {
                debug!(%poll_id, ?kind, "Recorded analytics event");
                true
            }
            Err(e) => {
                warn!(%poll_id, ?kind, "Dropping analytics event: {}", e);
                false
            }
        }
    }
}

fn date_label(date: Date) -> String {
    format!("{}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

fn hour_label(hour: u8) -> String {
    let display = if hour % 12 == 0 { 12 } else { hour % 12 };
    format!("{} {}", display, if hour >= 12 { "PM" } else { "AM" })
}

/// Aggregates raw events in UTC.
pub fn summarize(events: &[AnalyticsEvent]) -> PollAnalytics {
    let mut total_views = 0;
    let mut total_votes = 0;
    let mut visitors = HashSet::new();
    let mut daily: BTreeMap<Date, (u64, u64)> = BTreeMap::new();
    let mut hourly: BTreeMap<u8, u64> = BTreeMap::new();

    for event in events {
        visitors.insert(&event.device_id);
        let at = event.occurred_at.to_offset(time::UtcOffset::UTC);
        match event.kind {
            EventKind::View => {
                total_views += 1;
                daily.entry(at.date()).or_default().0 += 1;
            }
            EventKind::Vote => {
                total_votes += 1;
                daily.entry(at.date()).or_default().1 += 1;
                *hourly.entry(at.hour()).or_default() += 1;
            }
            EventKind::Share | EventKind::CopyLink => {}
        }
    }

    let conversion_rate = if total_views > 0 {
        (total_votes as f64 / total_views as f64 * 1000.0).round() / 10.0
    } else {
        0.0
    };

    PollAnalytics {
        total_views,
        total_votes,
        unique_visitors: visitors.len() as u64,
        conversion_rate,
        daily_activity: daily.into_iter()
            .map(|(date, (views, votes))| DailyActivity { date: date_label(date), views, votes })
            .collect(),
        hourly_distribution: hourly.into_iter()
            .map(|(hour, votes)| HourlyVotes { hour: hour_label(hour), votes })
            .collect(),
    }
}
