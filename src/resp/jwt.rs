use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mongodb::Database;
use rocket::http::Status;
use rocket::request::{self, FromRequest, Request};
use serde::{Deserialize, Serialize};

use super::util::date_time_as_unix_seconds;
use crate::data::user::db::UserDbExt;
use crate::resp::problem::Problem;
use crate::role::Role;
use crate::security::Security;

pub static AUTH_HEADER: &'static str = "Authorization";
static BEARER_PREFIX: &'static str = "Bearer ";

/// Decoded bearer token claims.
///
/// The token is the sole session artifact: no server-side session state
/// exists. Privilege is NOT part of the claims; role guards re-read it
/// from the `users` collection on every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserToken {
    #[serde(with = "date_time_as_unix_seconds")]
    iat: DateTime<Utc>,
    #[serde(with = "date_time_as_unix_seconds")]
    exp: DateTime<Utc>,
    pub email: String,
}

impl UserToken {
    pub fn new(email: impl ToString) -> UserToken {
        let now = Utc::now();
        UserToken {
            iat: now,
            exp: now + Duration::hours(1),
            email: email.to_string(),
        }
    }

    pub fn encode_jwt(
        &self,
        secret: impl AsRef<[u8]>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(secret.as_ref());

        encode(&header, &self, &key)
    }

    pub fn decode_jwt(
        token: &str,
        secret: impl AsRef<[u8]>,
    ) -> Result<UserToken, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens are valid for exactly one hour, no expiry leeway.
        validation.leeway = 0;

        decode::<UserToken>(token, &DecodingKey::from_secret(secret.as_ref()), &validation)
            .map(|data| data.claims)
    }
}

pub fn auth_problem(detail: impl ToString) -> Problem {
    Problem::new_untyped(Status::Unauthorized, "Unable to authenticate user.")
        .detail(detail)
        .clone()
}

pub fn forbidden_problem(detail: impl ToString) -> Problem {
    Problem::new_untyped(Status::Forbidden, "Forbidden access.")
        .detail(detail)
        .clone()
}

pub fn extract_claims(
    authorization: Option<&str>,
    secret: impl AsRef<[u8]>,
) -> Result<UserToken, Problem> {
    let header = authorization.ok_or_else(|| auth_problem("No authorization header."))?;

    let token = header
        .strip_prefix(BEARER_PREFIX)
        .ok_or_else(|| auth_problem("Authorization header is not a bearer token."))?;

    let claims = UserToken::decode_jwt(token, secret).map_err(Problem::from)?;
    tracing::debug!("decoded bearer token for: {}", claims.email);

    Ok(claims)
}

/// Path- or query-embedded identities must match the authenticated one
/// before any data is read. Hard precondition, not a best-effort check.
pub fn require_identity(claims: &UserToken, email: &str) -> Result<(), Problem> {
    if claims.email != email {
        return Err(forbidden_problem(
            "Token identity does not match the requested identity.",
        ));
    }
    Ok(())
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for UserToken {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let security: &Security = req.rocket().state().unwrap();

        match extract_claims(req.headers().get_one(AUTH_HEADER), &security.token_secret) {
            Ok(claims) => request::Outcome::Success(claims),
            Err(e) => {
                tracing::debug!("unable to extract claims from request headers");
                request::Outcome::Error((Status::Unauthorized, e))
            }
        }
    }
}

/// Shared role check behind the per-role guard types. The persisted role
/// is read fresh from the database, never cached, so a role revoked
/// mid-session takes effect on the very next request.
async fn require_role(req: &Request<'_>, expected: Role) -> Result<UserToken, Problem> {
    let security: &Security = req.rocket().state().unwrap();
    let claims = extract_claims(req.headers().get_one(AUTH_HEADER), &security.token_secret)?;

    let db: &Database = req.rocket().state().unwrap();
    let role = db.role_of(&claims.email).await?;

    if role != expected {
        return Err(forbidden_problem(format!(
            "Route requires {} privileges.",
            expected
        )));
    }

    Ok(claims)
}

#[derive(Debug, Clone)]
pub struct InstructorToken(pub UserToken);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for InstructorToken {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match require_role(req, Role::Instructor).await {
            Ok(claims) => request::Outcome::Success(InstructorToken(claims)),
            Err(e) => {
                let status = e.status;
                request::Outcome::Error((status, e))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminToken(pub UserToken);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminToken {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match require_role(req, Role::Admin).await {
            Ok(claims) => request::Outcome::Success(AdminToken(claims)),
            Err(e) => {
                let status = e.status;
                request::Outcome::Error((status, e))
            }
        }
    }
}

pub mod doc {
    use utoipa::openapi::security::*;

    #[derive(Clone, Copy)]
    pub struct JWTAuth;

    impl Into<SecurityScheme> for JWTAuth {
        fn into(self) -> SecurityScheme {
            let mut http = Http::new(HttpAuthScheme::Bearer);
            http.bearer_format = Some("JWT".to_string());
            http.scheme = HttpAuthScheme::Bearer;
            SecurityScheme::Http(http)
        }
    }

    impl utoipa::Modify for JWTAuth {
        fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
            let c = openapi.components.as_mut().unwrap();
            c.add_security_scheme("jwt", *self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::SubsecRound;

    static TEST_SECRET: &[u8] = b"unit-test-token-secret";

    #[test]
    fn token_round_trips_with_hour_expiry() {
        let mut now = Utc::now();
        now = now.round_subsecs(0);

        let token = UserToken {
            iat: now,
            exp: now + Duration::hours(1),
            email: "a@x.com".to_string(),
        };

        let encoded = token
            .encode_jwt(TEST_SECRET)
            .expect("encoding should work for example");
        let decoded = UserToken::decode_jwt(&encoded, TEST_SECRET)
            .expect("decoding a freshly issued token should work");

        assert_eq!(decoded.email, "a@x.com");
        assert_eq!(decoded.iat, now);
        assert_eq!(decoded.exp, now + Duration::hours(1));
    }

    #[test]
    fn issued_tokens_expire_after_one_hour() {
        let token = UserToken::new("a@x.com");
        assert_eq!(token.exp - token.iat, Duration::hours(1));
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now();
        let token = UserToken {
            iat: now - Duration::hours(3),
            exp: now - Duration::hours(2),
            email: "a@x.com".to_string(),
        };

        let encoded = token.encode_jwt(TEST_SECRET).unwrap();
        let err = UserToken::decode_jwt(&encoded, TEST_SECRET)
            .expect_err("an expired token must not decode");

        assert!(matches!(
            err.kind(),
            jsonwebtoken::errors::ErrorKind::ExpiredSignature
        ));
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let encoded = UserToken::new("a@x.com").encode_jwt(b"some-other-secret").unwrap();
        assert!(UserToken::decode_jwt(&encoded, TEST_SECRET).is_err());
    }

    #[test]
    fn missing_and_malformed_headers_are_unauthenticated() {
        let missing = extract_claims(None, TEST_SECRET).unwrap_err();
        assert_eq!(missing.status, Status::Unauthorized);

        let not_bearer = extract_claims(Some("Token abc"), TEST_SECRET).unwrap_err();
        assert_eq!(not_bearer.status, Status::Unauthorized);

        let garbage = extract_claims(Some("Bearer not-a-jwt"), TEST_SECRET).unwrap_err();
        assert_eq!(garbage.status, Status::Unauthorized);
    }

    #[test]
    fn valid_bearer_header_yields_claims() {
        let encoded = UserToken::new("a@x.com").encode_jwt(TEST_SECRET).unwrap();
        let header = format!("Bearer {}", encoded);

        let claims = extract_claims(Some(&header), TEST_SECRET).unwrap();
        assert_eq!(claims.email, "a@x.com");
    }

    #[test]
    fn identity_mismatch_is_forbidden() {
        let claims = UserToken::new("a@x.com");

        assert!(require_identity(&claims, "a@x.com").is_ok());

        let err = require_identity(&claims, "b@x.com").unwrap_err();
        assert_eq!(err.status, Status::Forbidden);
    }
}
