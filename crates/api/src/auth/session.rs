//! Session tokens and the session cookie.
//!
//! A session is an HS256 JWT naming the user and their role. Login hands it
//! out twice: in the response body for API clients and as the `pmo_session`
//! cookie for the browser. Either form authenticates a request.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use pmo_core::types::DbId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "pmo_session";

/// `iss` claim written into every token and required on the way back in.
const ISSUER: &str = "pmo-api";

const DEFAULT_TTL_MINS: i64 = 480;

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    /// Role (`USER`, `ADMIN`, `PMO`) at sign-in time.
    pub role: String,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Signing secret and session lifetime.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: String,
    /// Session lifetime in minutes (default: 480, one working day).
    pub ttl_mins: i64,
}

impl SessionConfig {
    /// | Env Var             | Required | Default |
    /// |---------------------|----------|---------|
    /// | `JWT_SECRET`        | **yes**  | --      |
    /// | `SESSION_TTL_MINS`  | no       | `480`   |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty, or the TTL is not a
    /// positive number.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let ttl_mins: i64 = std::env::var("SESSION_TTL_MINS")
            .map(|v| v.parse().expect("SESSION_TTL_MINS must be a valid i64"))
            .unwrap_or(DEFAULT_TTL_MINS);
        assert!(ttl_mins > 0, "SESSION_TTL_MINS must be positive");

        Self { secret, ttl_mins }
    }

    /// Lifetime in seconds, as reported in `expiresIn` and the cookie `Max-Age`.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl_mins * 60
    }
}

/// A freshly signed session token.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: i64,
}

impl IssuedSession {
    /// `Set-Cookie` value carrying this token for its whole lifetime.
    pub fn cookie(&self) -> String {
        session_cookie(&self.token, self.expires_in)
    }
}

/// Sign a session for `user_id` with the given role.
pub fn issue_session(
    user_id: DbId,
    role: &str,
    config: &SessionConfig,
) -> Result<IssuedSession, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        iss: ISSUER.to_string(),
        iat: now,
        exp: now + config.ttl_secs(),
        jti: Uuid::new_v4().to_string(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )?;
    Ok(IssuedSession {
        token,
        expires_in: config.ttl_secs(),
    })
}

/// Check signature, expiry and issuer, and return the claims.
pub fn verify_session(
    token: &str,
    config: &SessionConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.set_required_spec_claims(&["exp", "iss"]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

fn session_cookie(token: &str, max_age: i64) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax; Max-Age={max_age}")
}

/// `Set-Cookie` value that makes the browser drop the session cookie.
pub fn cleared_session_cookie() -> String {
    session_cookie("", 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> SessionConfig {
        SessionConfig {
            secret: secret.to_string(),
            ttl_mins: 60,
        }
    }

    #[test]
    fn issued_session_verifies() {
        let config = config("test-secret-that-is-long-enough-for-hmac");
        let session = issue_session(42, "PMO", &config).unwrap();
        assert_eq!(session.expires_in, 3600);

        let claims = verify_session(&session.token, &config).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, "PMO");
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn expired_session_is_rejected() {
        let config = config("test-secret-that-is-long-enough-for-hmac");
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            role: "USER".into(),
            iss: ISSUER.into(),
            iat: now - 600,
            exp: now - 300,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(verify_session(&token, &config).is_err());
    }

    #[test]
    fn foreign_issuer_is_rejected() {
        let config = config("shared-secret");
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            role: "ADMIN".into(),
            iss: "someone-else".into(),
            iat: now,
            exp: now + 300,
            jti: Uuid::new_v4().to_string(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert!(verify_session(&token, &config).is_err());
    }

    #[test]
    fn other_secret_is_rejected() {
        let session = issue_session(1, "USER", &config("secret-alpha")).unwrap();
        assert!(verify_session(&session.token, &config("secret-bravo")).is_err());
    }

    #[test]
    fn cookies() {
        let session = IssuedSession {
            token: "abc".into(),
            expires_in: 90,
        };
        assert_eq!(
            session.cookie(),
            "pmo_session=abc; HttpOnly; Path=/; SameSite=Lax; Max-Age=90"
        );
        assert!(cleared_session_cookie().starts_with("pmo_session=;"));
        assert!(cleared_session_cookie().ends_with("Max-Age=0"));
    }
}
