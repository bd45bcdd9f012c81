use rocket::{Request, catch, serde::json::Json};
use pollup_shared::{Error, ErrorCode};

#[catch(400)]
pub fn bad_request(_req: &Request) -> Json<Error> {
    Json(Error::new(ErrorCode::InvalidInput, "Invalid request parameters."))
}

#[catch(401)]
pub fn unauthorized(_req: &Request) -> Json<Error> {
    Json(Error::new(ErrorCode::Unauthenticated, "Sign in to continue."))
}

#[catch(403)]
pub fn forbidden(_req: &Request) -> Json<Error> {
    Json(Error::new(ErrorCode::Unauthorized, "Access forbidden."))
}

#[catch(404)]
pub fn not_found(_req: &Request) -> Json<Error> {
    Json(Error::new(ErrorCode::NotFound, "The requested resource was not found."))
}

#[catch(422)]
pub fn unprocessable(_req: &Request) -> Json<Error> {
    Json(Error::new(ErrorCode::ValidationFailed, "The request body could not be parsed."))
}

#[catch(500)]
pub fn internal_error(_req: &Request) -> Json<Error> {
    Json(Error::new(ErrorCode::BackendUnavailable, "An internal server error occurred."))
}
