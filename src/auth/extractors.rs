use actix_web::dev::Payload;
use actix_web::{Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

use crate::error::AppError;

/// The authenticated caller's user id.
///
/// Inserted into request extensions by `AuthMiddleware` once the bearer token has been
/// verified. Extracting it on a route the middleware does not guard fails with
/// `AppError::Unauthenticated`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity(pub Uuid);

impl Identity {
    pub fn user_id(&self) -> Uuid {
        self.0
    }
}

impl FromRequest for Identity {
    type Error = ActixError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        match req.extensions().get::<Identity>().copied() {
            Some(identity) => ready(Ok(identity)),
            None => {
                let err = AppError::Unauthenticated("Missing authenticated identity".to_string());
                ready(Err(err.into()))
            }
        }
    }
}
