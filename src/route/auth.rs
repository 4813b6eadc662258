use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::resp::jwt::UserToken;
use crate::resp::problem::{problems, Problem};
use crate::security::Security;
use crate::util;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TokenRequest {
    #[schema(format = "email")]
    pub email: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Issue a time-boxed bearer token for the supplied identity. The token
/// carries no privilege; role checks read the database on every request.
#[utoipa::path(
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Signed bearer token, valid for one hour", body = TokenResponse),
        (status = 400, description = "Malformed identity", body = Problem),
    )
)]
#[post("/jwt", format = "application/json", data = "<identity>")]
#[tracing::instrument(skip(security))]
pub async fn jwt_issue(
    identity: Json<TokenRequest>,
    security: &State<Security>,
) -> Result<Json<TokenResponse>, Problem> {
    if !util::email_valid(&identity.email) {
        return Err(problems::validation_problem("Not a valid e-mail address."));
    }

    let token = UserToken::new(&identity.email)
        .encode_jwt(&security.token_secret)
        .map_err(Problem::from)?;

    Ok(Json(TokenResponse { token }))
}
