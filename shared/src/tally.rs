use std::collections::HashMap;
use uuid::Uuid;

use crate::models::{PollOption, PollResultRow, PollResults};

/// Nearest-integer share of `count` in `total`, halves rounded up.
/// Zero when nothing has been counted.
pub fn percentage(count: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (200 * u128::from(count) + u128::from(total)) / (2 * u128::from(total));
    rounded.min(100) as u8
}

/// Combines options with their vote counts. Rows are ordered by descending
/// votes; ties keep the order of `options`.
pub fn tally(poll_id: Uuid, options: &[PollOption], counts: &HashMap<Uuid, u64>) -> PollResults {
    let votes_for = |opt: &PollOption| counts.get(&opt.id).copied().unwrap_or(0);
    let total_votes: u64 = options.iter().map(votes_for).sum();

    let mut rows: Vec<PollResultRow> = options.iter()
        .map(|opt| {
            let votes = votes_for(opt);
            PollResultRow {
                option_id: opt.id,
                label: opt.label.clone(),
                image_url: opt.image_url.clone(),
                votes,
                percentage: percentage(votes, total_votes),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.votes.cmp(&a.votes));

    PollResults { poll_id, rows, total_votes }
}
