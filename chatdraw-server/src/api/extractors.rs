//! Custom Axum extractors.
//!
//! Provides `LenientBody<T>`: control panels post JSON or urlencoded forms,
//! sometimes with a wrong content type or an empty body. Anything that
//! cannot be read as `T` yields `T::default()` instead of a rejection, and
//! the handler sanitises the individual fields.

use axum::{
    Form,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
};
use serde::de::DeserializeOwned;
use std::convert::Infallible;

/// Largest control body that is read.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// A request body that never rejects.
pub struct LenientBody<T>(pub T);

fn is_form(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}

impl<S, T> FromRequest<S> for LenientBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default + Send,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if is_form(&req) {
            return Ok(match Form::<T>::from_request(req, state).await {
                Ok(Form(value)) => LenientBody(value),
                Err(e) => {
                    tracing::debug!(error = %e, "Unreadable form body, using defaults");
                    LenientBody(T::default())
                }
            });
        }

        let body = match axum::body::to_bytes(req.into_body(), MAX_BODY_BYTES).await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read request body, using defaults");
                return Ok(LenientBody(T::default()));
            }
        };
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(LenientBody(T::default()));
        }

        Ok(match serde_json::from_slice(&body) {
            Ok(value) => LenientBody(value),
            Err(e) => {
                tracing::debug!(error = %e, "Malformed JSON body, using defaults");
                LenientBody(T::default())
            }
        })
    }
}
