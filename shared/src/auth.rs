use std::future::Future;

use crate::error::StoreError;
use crate::models::UserId;

pub const USER_HEADER: &str = "X-User-Id";

/// Resolves the authenticated user, if any.
pub trait AuthProvider {
    fn current_user(&self) -> impl Future<Output = Result<Option<UserId>, StoreError>> + Send;
}

impl AuthProvider for Option<UserId> {
    async fn current_user(&self) -> Result<Option<UserId>, StoreError> {
        Ok(*self)
    }
}

/// The authenticated user as asserted by the upstream auth gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser(pub Option<UserId>);

impl AuthProvider for CurrentUser {
    async fn current_user(&self) -> Result<Option<UserId>, StoreError> {
        Ok(self.0)
    }
}

// Backend-specific Rocket implementation
#[cfg(feature = "backend")]
mod backend_impl {
    use super::*;
    use rocket::request::{FromRequest, Outcome};
    use rocket::Request;
    use uuid::Uuid;

    #[rocket::async_trait]
    impl<'r> FromRequest<'r> for CurrentUser {
        type Error = ();

        async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
            let user = req.headers()
                .get_one(USER_HEADER)
                .and_then(|value| Uuid::parse_str(value.trim()).ok())
                .map(UserId);

            Outcome::Success(CurrentUser(user))
        }
    }
}
