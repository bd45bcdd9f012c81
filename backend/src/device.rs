use std::convert::Infallible;

use rocket::http::{Cookie, CookieJar, SameSite};
use rocket::request::{FromRequest, Outcome};
use rocket::Request;
use pollup_shared::device::{DeviceIdentityStore, LocalDeviceIdentity, StorageError, TokenStorage};
use pollup_shared::models::DeviceId;

/// The browser's cookie jar as local token storage. Reads see cookies set
/// earlier in the same request.
pub struct CookieTokens<'r> {
    jar: &'r CookieJar<'r>,
}

impl TokenStorage for CookieTokens<'_> {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.jar.get_pending(key).map(|cookie| cookie.value().to_string()))
    }

    fn store(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let cookie = Cookie::build((key.to_string(), value.to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .permanent();
        self.jar.add(cookie);
        Ok(())
    }
}

/// Device identity of the requesting browser, persisted in the
/// `device_id` cookie.
pub struct RequestDevice<'r>(LocalDeviceIdentity<CookieTokens<'r>>);

impl DeviceIdentityStore for RequestDevice<'_> {
    fn get(&self) -> DeviceId {
        self.0.get()
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for RequestDevice<'r> {
    type Error = Infallible;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let headers = req.headers();
        let environment = ["User-Agent", "Accept-Language"]
            .iter()
            .map(|name| headers.get_one(name).unwrap_or_default().to_string())
            .collect();

        let tokens = CookieTokens { jar: req.cookies() };
        Outcome::Success(RequestDevice(LocalDeviceIdentity::new(tokens, environment)))
    }
}
