//! Signed, expiring tokens for email-verification links.
//!
//! Stateless: a token encodes the user id and an expiry, signed with the
//! process-wide secret, so redemption needs only the token string and the
//! current time. Rotating the secret invalidates outstanding tokens.

use std::sync::Arc;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Duration;

use crate::clock::Clock;

const VERIFY_KIND: &str = "verify";

/// Failure modes when redeeming a verification token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("verification token is invalid")]
    Invalid,
    #[error("verification token has expired")]
    Expired,
}

#[derive(Debug, Serialize, Deserialize)]
struct VerifyClaims {
    sub: String,  // user ID
    iat: i64,     // issued at (unix timestamp)
    exp: i64,     // expires at (unix timestamp)
    kind: String, // discriminates from session tokens signed with the same secret
}

#[derive(Clone)]
pub struct VerificationTokens {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl VerificationTokens {
    pub fn new(secret: &str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
            clock,
        }
    }

    pub fn issue(&self, user_id: &str) -> anyhow::Result<String> {
        let now = self.clock.now();
        let claims = VerifyClaims {
            sub: user_id.to_string(),
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
            kind: VERIFY_KIND.to_string(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Signature and shape are checked first (any failure is `Invalid`);
    /// expiry is then compared against the injected clock, so the TTL
    /// boundary is testable without sleeping.
    pub fn redeem(&self, token: &str) -> Result<String, TokenError> {
        let mut validation = Validation::default();
        validation.validate_exp = false;
        let data =
            decode::<VerifyClaims>(token, &self.decoding, &validation).map_err(|_| TokenError::Invalid)?;
        if data.claims.kind != VERIFY_KIND {
            return Err(TokenError::Invalid);
        }
        if self.clock.now().unix_timestamp() > data.claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(data.claims.sub)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::JwtKeys;
    use crate::config::AppConfig;
    use time::OffsetDateTime;

    struct FixedClock(OffsetDateTime);

    impl Clock for FixedClock {
        fn now(&self) -> OffsetDateTime {
            self.0
        }
    }

    const SECRET: &str = "test-secret";

    fn tokens_at(now: OffsetDateTime) -> VerificationTokens {
        VerificationTokens::new(SECRET, Duration::hours(1), Arc::new(FixedClock(now)))
    }

    #[test]
    fn roundtrip_within_ttl() {
        let issued_at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let token = tokens_at(issued_at).issue("64f000000000000000000001").unwrap();
        let later = tokens_at(issued_at + Duration::minutes(59));
        assert_eq!(
            later.redeem(&token).unwrap(),
            "64f000000000000000000001"
        );
    }

    #[test]
    fn redeem_at_exact_expiry_still_succeeds() {
        let issued_at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let token = tokens_at(issued_at).issue("u").unwrap();
        assert!(tokens_at(issued_at + Duration::hours(1)).redeem(&token).is_ok());
    }

    #[test]
    fn expired_past_ttl() {
        let issued_at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let token = tokens_at(issued_at).issue("u").unwrap();
        let later = tokens_at(issued_at + Duration::hours(2));
        assert_eq!(later.redeem(&token), Err(TokenError::Expired));
    }

    #[test]
    fn tampered_token_is_invalid() {
        let issued_at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let tokens = tokens_at(issued_at);
        let mut token = tokens.issue("u").unwrap();
        token.push('x');
        assert_eq!(tokens.redeem(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn garbage_is_invalid() {
        let issued_at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let tokens = tokens_at(issued_at);
        assert_eq!(tokens.redeem(""), Err(TokenError::Invalid));
        assert_eq!(tokens.redeem("not.a.jwt"), Err(TokenError::Invalid));
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let issued_at = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let token = tokens_at(issued_at).issue("u").unwrap();
        let other = VerificationTokens::new(
            "different-secret",
            Duration::hours(1),
            Arc::new(FixedClock(issued_at)),
        );
        assert_eq!(other.redeem(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn session_access_token_does_not_redeem() {
        let keys = JwtKeys::from_config(&AppConfig::for_tests().jwt);
        let access = keys.sign_access("64f000000000000000000001").unwrap();
        let tokens = tokens_at(OffsetDateTime::now_utc());
        assert_eq!(tokens.redeem(&access), Err(TokenError::Invalid));
    }
}
