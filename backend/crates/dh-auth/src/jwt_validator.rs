use crate::{AuthError, Claims, Result as AuthErrorResult};

use std::panic::Location;

use error_location::ErrorLocation;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};

/// Tolerated clock drift between the token issuer and this server
const LEEWAY_SECS: u64 = 30;

/// Checks the access tokens a gateway forwards with each connect callback.
///
/// Only the signature, `exp`/`nbf` and the subject are checked; the subject
/// is what gets bound to the connection.
pub struct JwtValidator {
    key: DecodingKey,
    validation: Validation,
}

impl JwtValidator {
    /// Shared-secret tokens
    pub fn with_hs256(secret: &[u8]) -> Self {
        Self::new(DecodingKey::from_secret(secret), Algorithm::HS256)
    }

    /// Tokens signed by an external issuer; `public_key_pem` is its RSA key
    #[track_caller]
    pub fn with_rs256(public_key_pem: &str) -> AuthErrorResult<Self> {
        let location = ErrorLocation::from(Location::caller());
        let key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes()).map_err(|e| {
            AuthError::InvalidToken {
                message: format!("Invalid RSA public key: {e}"),
                location,
            }
        })?;
        Ok(Self::new(key, Algorithm::RS256))
    }

    fn new(key: DecodingKey, algorithm: Algorithm) -> Self {
        let mut validation = Validation::new(algorithm);
        validation.validate_nbf = true;
        validation.leeway = LEEWAY_SECS;
        Self { key, validation }
    }

    #[track_caller]
    pub fn validate(&self, token: &str) -> AuthErrorResult<Claims> {
        let location = ErrorLocation::from(Location::caller());
        let claims = decode::<Claims>(token, &self.key, &self.validation)
            .map_err(|e| decode_error(e, location))?
            .claims;
        claims.validate()?;
        Ok(claims)
    }

    /// Algorithm name for startup logging
    pub fn algorithm(&self) -> &'static str {
        match self.validation.algorithms.first() {
            Some(Algorithm::HS256) => "HS256",
            Some(Algorithm::RS256) => "RS256",
            _ => "unknown",
        }
    }
}

fn decode_error(e: JwtError, location: ErrorLocation) -> AuthError {
    match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired { location },
        _ => AuthError::JwtDecode {
            source: e,
            location,
        },
    }
}
