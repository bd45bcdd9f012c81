use rocket::http::Status;
use rocket::response::Responder;
use rocket::serde::json::Json;
use thiserror::Error;
use pollup_shared::{models::EventKind, Error, ErrorCode, VoteError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid poll ID")]
    InvalidId,
    #[error("Invalid status filter: {0}")]
    InvalidFilter(String),
    #[error("Event kind {0:?} cannot be reported by clients")]
    UnsupportedEvent(EventKind),
    #[error(transparent)]
    Vote(#[from] VoteError),
}

impl ApiError {
    pub fn status(&self) -> Status {
        match self {
            ApiError::InvalidId | ApiError::InvalidFilter(_) | ApiError::UnsupportedEvent(_) => {
                Status::BadRequest
            }
            ApiError::Vote(err) => match err {
                VoteError::AlreadyVoted => Status::Conflict,
                VoteError::PollNotActive(_) => Status::Forbidden,
                VoteError::Validation(_) => Status::BadRequest,
                VoteError::NotFound => Status::NotFound,
                VoteError::Unauthenticated => Status::Unauthorized,
                VoteError::NotAuthorized => Status::Forbidden,
                VoteError::BackendUnavailable(_) => Status::ServiceUnavailable,
            },
        }
    }

    fn body(self) -> Error {
        match self {
            ApiError::Vote(err) => err.into(),
            other => Error::new(ErrorCode::InvalidInput, other.to_string()),
        }
    }
}

impl<'r, 'o: 'r> Responder<'r, 'o> for ApiError {
    fn respond_to(self, req: &'r rocket::Request<'_>) -> rocket::response::Result<'o> {
        let status = self.status();
        rocket::Response::build_from(Json(self.body()).respond_to(req)?)
            .status(status)
            .ok()
    }
}
