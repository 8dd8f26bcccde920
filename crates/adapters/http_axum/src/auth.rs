//! Bearer-token gate for privileged operations.
//!
//! A caller is privileged when it presents `Authorization: Bearer <jwt>` with
//! an HS256 token signed by the configured secret that has not expired. When
//! no secret is configured every privileged call is refused.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::envelope::Envelope;

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Who the token was issued to.
    pub sub: String,
    /// Expiration time (Unix timestamp).
    pub exp: u64,
    /// Issued at (Unix timestamp).
    pub iat: u64,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Verifies (and issues) access tokens. Cheap to clone.
#[derive(Clone, Default)]
pub struct AccessGate {
    keys: Option<Arc<Keys>>,
}

impl AccessGate {
    /// A gate accepting tokens signed with `secret`.
    #[must_use]
    pub fn with_secret(secret: &str) -> Self {
        Self {
            keys: Some(Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            })),
        }
    }

    /// A gate refusing every privileged call.
    #[must_use]
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Check a raw token.
    ///
    /// # Errors
    ///
    /// Returns [`Unauthorized`] if the gate is disabled or the token is
    /// malformed, wrongly signed, or expired.
    pub fn verify(&self, token: &str) -> Result<Claims, Unauthorized> {
        let keys = self.keys.as_ref().ok_or(Unauthorized::Disabled)?;
        decode::<Claims>(token, &keys.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Unauthorized::Expired,
                _ => Unauthorized::InvalidToken,
            })
    }

    /// Sign a token for `subject` valid for `ttl_secs` seconds from `now`
    /// (Unix timestamp).
    ///
    /// # Errors
    ///
    /// Returns [`Unauthorized::Disabled`] if no secret is configured, or
    /// [`Unauthorized::InvalidToken`] if signing fails.
    pub fn issue(&self, subject: &str, now: u64, ttl_secs: u64) -> Result<String, Unauthorized> {
        let keys = self.keys.as_ref().ok_or(Unauthorized::Disabled)?;
        let claims = Claims {
            sub: subject.to_string(),
            exp: now.saturating_add(ttl_secs),
            iat: now,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(|_| Unauthorized::InvalidToken)
    }
}

/// Why a privileged call was refused.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Unauthorized {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    Expired,
    #[error("privileged access is not configured")]
    Disabled,
}

impl IntoResponse for Unauthorized {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Envelope::<()>::empty(self.to_string()),
        )
            .into_response()
    }
}

/// Extract the token from an `Authorization` header value.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Proof that the request carries a valid access token. Add it as a handler
/// argument to make the endpoint privileged.
#[derive(Debug)]
pub struct Privileged(pub Claims);

impl<S> FromRequestParts<S> for Privileged
where
    AccessGate: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Unauthorized;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or(Unauthorized::MissingToken)?;
        let claims = AccessGate::from_ref(state).verify(token)?;
        tracing::debug!(subject = %claims.sub, "privileged request");
        Ok(Self(claims))
    }
}
