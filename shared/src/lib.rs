pub mod analytics;
pub mod auth;
pub mod device;
pub mod error;
pub mod memory;
pub mod models;
pub mod polls;
pub mod results;
pub mod status;
pub mod store;
pub mod tally;
pub mod validation;
pub mod vote;

pub use error::{Error, ErrorCode, Result, StoreError, VoteError};
pub use models::*;
pub use validation::*;
pub use status::PollStatus;
pub use auth::{AuthProvider, CurrentUser};
pub use device::{DeviceIdentityStore, FixedDeviceIdentity, LocalDeviceIdentity, TokenStorage};
pub use memory::MemoryStore;
pub use store::PollStore;
pub use analytics::EventTracker;
pub use polls::PollService;
pub use results::ResultsAggregator;
pub use vote::VoteService;

#[cfg(test)]
mod tests;
