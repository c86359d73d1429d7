//! Signed bearer tokens.
//!
//! Tokens are HS256 JWTs carrying the user id as subject. The issuer and
//! audience are fixed; validity runs from `nbf` to `exp` inclusive and is
//! checked here against an explicit clock so tests can move time.

use chrono::{DateTime, TimeDelta, Utc};
use forum_core::UserId;
use jsonwebtoken::{
  Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode,
  errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ISSUER: &str = "forum";
pub const AUDIENCE: &str = "forum";
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
  pub sub: String,
  pub iss: String,
  pub aud: Vec<String>,
  pub iat: i64,
  pub nbf: i64,
  pub exp: i64,
}

impl Claims {
  /// The subject as a user id. Only positive integers are accepted.
  pub fn user_id(&self) -> Result<UserId, TokenError> {
    match self.sub.parse::<UserId>() {
      Ok(id) if id > 0 => Ok(id),
      _ => Err(TokenError::Subject),
    }
  }
}

#[derive(Debug, Error)]
pub enum TokenError {
  #[error("unauthorized - failed hmac check")]
  Signature(#[source] jsonwebtoken::errors::Error),

  #[error("unauthorized - invalid audience")]
  Audience,

  #[error("unauthorized - invalid issuer")]
  Issuer,

  #[error("unauthorized - invalid subject")]
  Subject,

  #[error("unauthorized - token not yet valid")]
  NotYetValid,

  #[error("unauthorized - token expired")]
  Expired,

  #[error("error signing token: {0}")]
  Signing(#[source] jsonwebtoken::errors::Error),
}

/// Verifies a bearer token and yields the user it was issued to.
///
/// The access gate depends on this rather than on [`TokenService`] directly.
pub trait TokenVerifier: Send + Sync {
  fn verify_token(&self, token: &str) -> Result<UserId, TokenError>;
}

/// Issues and verifies tokens with one shared HMAC secret.
pub struct TokenService {
  encoding:   EncodingKey,
  decoding:   DecodingKey,
  validation: Validation,
}

impl TokenService {
  pub fn new(secret: &[u8]) -> Self {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.leeway = 0;
    validation.set_issuer(&[ISSUER]);
    validation.set_audience(&[AUDIENCE]);
    validation.set_required_spec_claims(&["sub", "iss", "aud", "nbf", "exp"]);

    Self {
      encoding: EncodingKey::from_secret(secret),
      decoding: DecodingKey::from_secret(secret),
      validation,
    }
  }

  pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
    self.issue_at(user_id, Utc::now())
  }

  /// Sign a token valid from `now` for [`TOKEN_LIFETIME_HOURS`].
  pub fn issue_at(&self, user_id: UserId, now: DateTime<Utc>) -> Result<String, TokenError> {
    let expires = now + TimeDelta::hours(TOKEN_LIFETIME_HOURS);
    let claims = Claims {
      sub: user_id.to_string(),
      iss: ISSUER.to_owned(),
      aud: vec![AUDIENCE.to_owned()],
      iat: now.timestamp(),
      nbf: now.timestamp(),
      exp: expires.timestamp(),
    };
    encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
      .map_err(TokenError::Signing)
  }

  pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
    self.verify_at(token, Utc::now())
  }

  pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
    let claims = decode::<Claims>(token, &self.decoding, &self.validation)
      .map_err(|e| match e.kind() {
        ErrorKind::InvalidAudience => TokenError::Audience,
        ErrorKind::InvalidIssuer => TokenError::Issuer,
        _ => TokenError::Signature(e),
      })?
      .claims;

    let now = now.timestamp();
    if now < claims.nbf {
      return Err(TokenError::NotYetValid);
    }
    if now > claims.exp {
      return Err(TokenError::Expired);
    }
    claims.user_id()?;
    Ok(claims)
  }
}

impl TokenVerifier for TokenService {
  fn verify_token(&self, token: &str) -> Result<UserId, TokenError> {
    self.verify(token)?.user_id()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn service() -> TokenService { TokenService::new(b"test-secret") }

  fn sign(claims: &Claims, secret: &[u8]) -> String {
    encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret))
      .unwrap()
  }

  fn claims_at(now: DateTime<Utc>) -> Claims {
    Claims {
      sub: "7".into(),
      iss: ISSUER.into(),
      aud: vec![AUDIENCE.into()],
      iat: now.timestamp(),
      nbf: now.timestamp(),
      exp: (now + TimeDelta::hours(1)).timestamp(),
    }
  }

  #[test]
  fn issued_token_verifies_to_its_subject() {
    let s = service();
    let token = s.issue(42).unwrap();
    let claims = s.verify(&token).unwrap();
    assert_eq!(claims.sub, "42");
    assert_eq!(claims.iss, ISSUER);
    assert_eq!(claims.aud, vec![AUDIENCE.to_string()]);
    assert_eq!(claims.exp - claims.nbf, TOKEN_LIFETIME_HOURS * 3600);
    assert_eq!(s.verify_token(&token).unwrap(), 42);
  }

  #[test]
  fn token_is_valid_for_its_whole_window() {
    let s = service();
    let now = Utc::now();
    let token = s.issue_at(3, now).unwrap();
    assert!(s.verify_at(&token, now).is_ok());
    assert!(s.verify_at(&token, now + TimeDelta::hours(TOKEN_LIFETIME_HOURS)).is_ok());
  }

  #[test]
  fn expired_token_is_rejected() {
    let s = service();
    let now = Utc::now();
    let token = s.issue_at(3, now).unwrap();
    let later = now + TimeDelta::hours(TOKEN_LIFETIME_HOURS) + TimeDelta::seconds(1);
    assert!(matches!(s.verify_at(&token, later), Err(TokenError::Expired)));
  }

  #[test]
  fn token_from_the_future_is_rejected() {
    let s = service();
    let now = Utc::now();
    let token = s.issue_at(3, now).unwrap();
    let earlier = now - TimeDelta::seconds(1);
    assert!(matches!(s.verify_at(&token, earlier), Err(TokenError::NotYetValid)));
  }

  #[test]
  fn foreign_secret_fails_signature_check() {
    let token = TokenService::new(b"other-secret").issue(3).unwrap();
    let err = service().verify(&token).unwrap_err();
    assert!(matches!(err, TokenError::Signature(_)));
    assert_eq!(err.to_string(), "unauthorized - failed hmac check");
  }

  #[test]
  fn altering_any_signature_character_is_rejected() {
    let s = service();
    let token = s.issue(3).unwrap();
    let (signed, signature) = token.rsplit_once('.').unwrap();
    assert!(!signature.is_empty());

    for i in 0..signature.len() {
      let mut altered: Vec<char> = signature.chars().collect();
      altered[i] = if altered[i] == 'A' { 'B' } else { 'A' };
      let altered: String = altered.into_iter().collect();
      let tampered = format!("{signed}.{altered}");
      assert!(
        matches!(s.verify(&tampered), Err(TokenError::Signature(_))),
        "signature altered at {i} was accepted"
      );
    }
  }

  #[test]
  fn garbage_is_rejected() {
    assert!(matches!(service().verify("not.a.jwt"), Err(TokenError::Signature(_))));
  }

  #[test]
  fn wrong_audience_is_rejected() {
    let mut claims = claims_at(Utc::now());
    claims.aud = vec!["someone-else".into()];
    let token = sign(&claims, b"test-secret");
    assert!(matches!(service().verify(&token), Err(TokenError::Audience)));
  }

  #[test]
  fn wrong_issuer_is_rejected() {
    let mut claims = claims_at(Utc::now());
    claims.iss = "someone-else".into();
    let token = sign(&claims, b"test-secret");
    assert!(matches!(service().verify(&token), Err(TokenError::Issuer)));
  }

  #[test]
  fn non_numeric_or_non_positive_subject_is_rejected() {
    for sub in ["abc", "0", "-4", ""] {
      let mut claims = claims_at(Utc::now());
      claims.sub = sub.into();
      let token = sign(&claims, b"test-secret");
      assert!(
        matches!(service().verify(&token), Err(TokenError::Subject)),
        "subject {sub:?} should be rejected"
      );
    }
  }
}
