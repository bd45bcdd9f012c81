use crate::error::ApiError;
use pollup_shared::PollStatus;
use uuid::Uuid;

pub fn parse_poll_id(id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::InvalidId)
}

pub fn parse_status_filter(filter: Option<&str>) -> Result<Option<PollStatus>, ApiError> {
    match filter.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(ApiError::InvalidFilter),
    }
}
