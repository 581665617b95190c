//! Bearer-token authentication for the student routes.
//!
//! Tokens have the form `<account_id>.<hex HMAC-SHA256(secret, account_id)>`.
//! Anything that can map a token to an `AccountId` can stand in for
//! `HmacTokenVerifier` by implementing `TokenVerifier`.

use anyhow::Context;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::warn;

use crate::domain::models::AccountId;
use crate::error::AttendanceError;
use crate::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Resolves a bearer token to the account it was issued for
pub trait TokenVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<AccountId, AttendanceError>;
}

#[derive(Clone)]
pub struct HmacTokenVerifier {
    mac: HmacSha256,
}

impl HmacTokenVerifier {
    pub fn new(secret: &str) -> anyhow::Result<Self> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .context("Token secret is not a valid HMAC key")?;
        Ok(Self { mac })
    }

    /// Token for `account_id`, as accepted by `verify`
    pub fn issue(&self, account_id: &AccountId) -> String {
        let mut mac = self.mac.clone();
        mac.update(account_id.as_str().as_bytes());
        format!(
            "{}.{}",
            account_id,
            hex::encode(mac.finalize().into_bytes())
        )
    }
}

impl TokenVerifier for HmacTokenVerifier {
    fn verify(&self, token: &str) -> Result<AccountId, AttendanceError> {
        let invalid = || AttendanceError::Unauthorized("Invalid token".to_string());

        let (account_part, signature_part) = token.rsplit_once('.').ok_or_else(invalid)?;
        let account_id = AccountId::parse(account_part).ok_or_else(invalid)?;
        let signature = hex::decode(signature_part).map_err(|_| invalid())?;

        let mut mac = self.mac.clone();
        mac.update(account_id.as_str().as_bytes());
        mac.verify_slice(&signature).map_err(|_| invalid())?;

        Ok(account_id)
    }
}

/// Middleware that rejects requests without a valid bearer token and hands
/// the resolved `AccountId` to handlers through request extensions.
pub async fn require_account(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let token = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim);

    let Some(token) = token else {
        warn!("{} {} - missing bearer token", req.method(), req.uri().path());
        return state
            .reject(AttendanceError::Unauthorized("Authentication required".to_string()))
            .into_response();
    };

    match state.token_verifier.verify(token) {
        Ok(account_id) => {
            req.extensions_mut().insert(account_id);
            next.run(req).await
        }
        Err(e) => {
            warn!("{} {} - rejected token", req.method(), req.uri().path());
            state.reject(e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier() -> HmacTokenVerifier {
        HmacTokenVerifier::new("test-secret").unwrap()
    }

    #[test]
    fn test_issued_token_verifies() {
        let account = AccountId::parse("staff-42").unwrap();
        let token = verifier().issue(&account);

        assert!(token.starts_with("staff-42."));
        assert_eq!(verifier().verify(&token).unwrap(), account);
    }

    #[test]
    fn test_token_from_other_secret_is_rejected() {
        let account = AccountId::parse("staff-42").unwrap();
        let foreign = HmacTokenVerifier::new("another-secret").unwrap().issue(&account);

        assert!(matches!(
            verifier().verify(&foreign),
            Err(AttendanceError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_tampered_and_malformed_tokens_are_rejected() {
        let token = verifier().issue(&AccountId::parse("alice").unwrap());
        let (_, signature) = token.rsplit_once('.').unwrap();
        let swapped = format!("mallory.{}", signature);

        for bad in ["", "alice", "alice.", "alice.zz", ".abcd", swapped.as_str()] {
            assert!(
                matches!(verifier().verify(bad), Err(AttendanceError::Unauthorized(_))),
                "{bad:?} should be rejected"
            );
        }
    }
}
