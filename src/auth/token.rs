//! Signed, time-limited bearer tokens (HS256 JWT).
//!
//! Two kinds are minted per sign-in: a 24h access token accepted by the
//! middleware and a 7d refresh token accepted only by the refresh flow.
//! Validation pins the algorithm to HS256, uses zero leeway and collapses
//! every failure into [`TokenError::InvalidToken`].

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::AuthConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("failed to sign token: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    pub token_type: TokenType,
    /// Random per token, so two tokens minted in the same second differ
    pub jti: String,
}

/// Identity carried by a verified token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenIdentity {
    pub user_id: i64,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Access token expiry
    pub expires_at: DateTime<Utc>,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256];
        validation.leeway = 0;
        validation.validate_exp = true;

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(secret: &SecretString, config: &AuthConfig) -> Self {
        Self::new(
            secret.expose_secret().as_bytes(),
            Duration::hours(config.access_ttl_hours),
            Duration::days(config.refresh_ttl_days),
        )
    }

    pub fn issue(&self, user_id: i64, email: &str) -> Result<TokenPair, TokenError> {
        self.issue_at(user_id, email, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        user_id: i64,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<TokenPair, TokenError> {
        let access_exp = now + self.access_ttl;
        let access_token = self.sign(user_id, email, now, access_exp, TokenType::Access)?;
        let refresh_token = self.sign(
            user_id,
            email,
            now,
            now + self.refresh_ttl,
            TokenType::Refresh,
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_at: access_exp,
        })
    }

    fn sign(
        &self,
        user_id: i64,
        email: &str,
        iat: DateTime<Utc>,
        exp: DateTime<Utc>,
        token_type: TokenType,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            user_id,
            email: email.to_string(),
            iat: iat.timestamp(),
            exp: exp.timestamp(),
            token_type,
            jti: Uuid::new_v4().to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(TokenError::Signing)
    }

    /// Validate an access token.
    pub fn validate(&self, token: &str) -> Result<TokenIdentity, TokenError> {
        self.validate_kind(token, TokenType::Access)
    }

    /// Validate a refresh token.
    pub fn validate_refresh(&self, token: &str) -> Result<TokenIdentity, TokenError> {
        self.validate_kind(token, TokenType::Refresh)
    }

    fn validate_kind(&self, token: &str, expected: TokenType) -> Result<TokenIdentity, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "token rejected");
                TokenError::InvalidToken
            })?
            .claims;

        // jsonwebtoken accepts exp == now; require now < exp
        if claims.exp <= Utc::now().timestamp() || claims.token_type != expected {
            return Err(TokenError::InvalidToken);
        }

        Ok(TokenIdentity {
            user_id: claims.user_id,
            email: claims.email,
        })
    }
}

/// Decode the claims without checking signature, algorithm or expiry.
/// Diagnostics only; never use the result for authorization.
pub fn decode_unverified(token: &str) -> Result<Claims, TokenError> {
    let mut parts = token.split('.');
    let payload = match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(_), Some(payload), Some(_), None) => payload,
        _ => return Err(TokenError::InvalidToken),
    };
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|_| TokenError::InvalidToken)?;
    serde_json::from_slice(&bytes).map_err(|_| TokenError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::hours(24), Duration::days(7))
    }

    fn replace_char(token: &str, index: usize) -> String {
        let mut chars: Vec<char> = token.chars().collect();
        chars[index] = if chars[index] == 'A' { 'B' } else { 'A' };
        chars.into_iter().collect()
    }

    #[test]
    fn test_issue_and_validate() {
        let svc = service();
        let pair = svc.issue(42, "alice@example.com").unwrap();
        assert_eq!(pair.token_type, "Bearer");

        let identity = svc.validate(&pair.access_token).unwrap();
        assert_eq!(identity.user_id, 42);
        assert_eq!(identity.email, "alice@example.com");
    }

    #[test]
    fn test_tokens_minted_in_same_second_differ() {
        let svc = service();
        let now = Utc::now();
        let a = svc.issue_at(1, "a@example.com", now).unwrap();
        let b = svc.issue_at(1, "a@example.com", now).unwrap();
        assert_ne!(a.access_token, b.access_token);
    }

    #[test]
    fn test_expiry_windows() {
        let svc = service();
        let now = Utc::now();
        let pair = svc.issue_at(1, "a@example.com", now).unwrap();
        let access = decode_unverified(&pair.access_token).unwrap();
        let refresh = decode_unverified(&pair.refresh_token).unwrap();
        assert_eq!(access.exp - access.iat, 24 * 3600);
        assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 3600);
        assert_eq!(access.token_type, TokenType::Access);
        assert_eq!(refresh.token_type, TokenType::Refresh);
    }

    #[test]
    fn test_expired_token_rejected() {
        let svc = service();
        let pair = svc
            .issue_at(1, "a@example.com", Utc::now() - Duration::hours(25))
            .unwrap();
        assert!(matches!(
            svc.validate(&pair.access_token),
            Err(TokenError::InvalidToken)
        ));
    }

    #[test]
    fn test_token_expiring_now_rejected() {
        let svc = service();
        let pair = svc
            .issue_at(1, "a@example.com", Utc::now() - Duration::hours(24))
            .unwrap();
        assert!(svc.validate(&pair.access_token).is_err());
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let pair = service().issue(1, "a@example.com").unwrap();
        let other = TokenService::new(
            b"another-secret-another-secret-xx",
            Duration::hours(24),
            Duration::days(7),
        );
        assert!(other.validate(&pair.access_token).is_err());
    }

    #[test]
    fn test_any_signature_change_rejected() {
        let svc = service();
        let token = svc.issue(1, "a@example.com").unwrap().access_token;
        let sig_start = token.rfind('.').unwrap() + 1;
        // The final character carries padding bits, skip it
        for i in sig_start..token.len() - 1 {
            let tampered = replace_char(&token, i);
            assert!(svc.validate(&tampered).is_err(), "tampered at {}", i);
        }
    }

    #[test]
    fn test_payload_change_rejected() {
        let svc = service();
        let token = svc.issue(1, "a@example.com").unwrap().access_token;
        let payload_start = token.find('.').unwrap() + 1;
        let tampered = replace_char(&token, payload_start + 3);
        assert!(svc.validate(&tampered).is_err());
    }

    #[test]
    fn test_other_algorithms_rejected() {
        let svc = service();
        let claims = Claims {
            user_id: 1,
            email: "a@example.com".into(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::hours(1)).timestamp(),
            token_type: TokenType::Access,
            jti: Uuid::new_v4().to_string(),
        };

        for alg in [Algorithm::HS384, Algorithm::HS512] {
            let token = encode(
                &Header::new(alg),
                &claims,
                &EncodingKey::from_secret(SECRET),
            )
            .unwrap();
            assert!(svc.validate(&token).is_err(), "{:?} accepted", alg);
        }

        // Unsigned token
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let unsigned = format!("{}.{}.", header, payload);
        assert!(svc.validate(&unsigned).is_err());
    }

    #[test]
    fn test_token_kinds_not_interchangeable() {
        let svc = service();
        let pair = svc.issue(7, "a@example.com").unwrap();
        assert!(svc.validate(&pair.refresh_token).is_err());
        assert!(svc.validate_refresh(&pair.access_token).is_err());
        assert_eq!(svc.validate_refresh(&pair.refresh_token).unwrap().user_id, 7);
    }

    #[test]
    fn test_garbage_rejected() {
        let svc = service();
        for token in ["", "abc", "a.b.c", "a.b.c.d"] {
            assert!(svc.validate(token).is_err());
        }
    }

    #[test]
    fn test_decode_unverified_ignores_signature() {
        let pair = service().issue(9, "dbg@example.com").unwrap();
        let token = replace_char(&pair.access_token, pair.access_token.len() - 5);
        let claims = decode_unverified(&token).unwrap();
        assert_eq!(claims.user_id, 9);
        assert_eq!(claims.email, "dbg@example.com");
        assert!(decode_unverified("not-a-token").is_err());
    }
}
