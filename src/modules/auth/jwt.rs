use std::sync::Arc;

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::clock::Clock;
use crate::config::AuthConfig;
use crate::db::{Role, User};
use crate::error::{AppError, AppResult};

/// Claims carried by an access token. Validity is self-contained: signature
/// plus expiry, no persistence.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

pub struct JwtService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl JwtService {
    pub fn new(secret: &[u8], ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
            clock,
        }
    }

    pub fn from_config(config: &AuthConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            config.jwt_secret.expose_secret().as_bytes(),
            config.access_token_ttl(),
            clock,
        )
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl.whole_seconds()
    }

    pub fn issue(&self, user: &User) -> AppResult<String> {
        let now = self.clock.now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iat: now.unix_timestamp(),
            exp: (now + self.ttl).unix_timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|err| AppError::InternalServerError(format!("Failed to sign token: {err}")))
    }

    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::ExpiredToken,
                _ => AppError::InvalidToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use time::macros::datetime;
    use time::{Duration, OffsetDateTime};
    use uuid::Uuid;

    use crate::clock::test::TestClock;
    use crate::db::{Role, User};
    use crate::error::AppError;

    use super::JwtService;

    fn programmer() -> User {
        User {
            id: Uuid::new_v4(),
            email: "dev@example.com".to_string(),
            name: "Dev".to_string(),
            phone: None,
            bio: None,
            avatar_url: None,
            role: Role::Programmer,
            is_active: true,
            created_at: datetime!(2025-01-01 00:00 UTC),
            updated_at: datetime!(2025-01-01 00:00 UTC),
        }
    }

    fn service_at(now: OffsetDateTime) -> JwtService {
        JwtService::new(
            b"test-secret-key",
            Duration::hours(1),
            Arc::new(TestClock::at(now)),
        )
    }

    #[test]
    fn issued_token_verifies_and_carries_identity() {
        let user = programmer();
        let service = service_at(OffsetDateTime::now_utc());

        let token = service.issue(&user).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, Role::Programmer);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn expired_token_is_classified_as_expired() {
        // Issued far enough in the past that exp clears the default leeway.
        let service = service_at(OffsetDateTime::now_utc() - Duration::hours(3));
        let token = service.issue(&programmer()).unwrap();

        assert!(matches!(service.verify(&token), Err(AppError::ExpiredToken)));
    }

    #[test]
    fn garbage_token_is_invalid() {
        let service = service_at(OffsetDateTime::now_utc());
        assert!(matches!(
            service.verify("not-a-jwt"),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let user = programmer();
        let now = OffsetDateTime::now_utc();
        let other =
            JwtService::new(b"other-secret", Duration::hours(1), Arc::new(TestClock::at(now)));
        let token = other.issue(&user).unwrap();

        let service = service_at(now);
        assert!(matches!(service.verify(&token), Err(AppError::InvalidToken)));
    }
}
