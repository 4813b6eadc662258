use mongodb::Database;
use rocket::serde::json::Json;
use rocket::State;
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::data::user::db::UserDbExt;
use crate::data::user::{RegisterOutcome, User, UserRegisterData};
use crate::resp::jwt::{require_identity, AdminToken, UserToken};
use crate::resp::problem::Problem;
use crate::role::Role;

/// How many class listings feed the popular-instructors selection.
const POPULAR_INSTRUCTOR_LIMIT: usize = 6;

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminProbe {
    pub admin: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InstructorProbe {
    pub instructor: bool,
}

/// Register an account on first sign-in. Registering an existing e-mail
/// is a no-op reported as data, not as an error.
#[utoipa::path(
    request_body = UserRegisterData,
    responses(
        (status = 200, description = "Created id, or an already-exists notice", body = RegisterOutcome),
        (status = 400, description = "Malformed registration payload", body = Problem),
    )
)]
#[post("/users", format = "application/json", data = "<user>")]
#[tracing::instrument(skip(db))]
pub async fn user_register(
    user: Json<UserRegisterData>,
    db: &State<Database>,
) -> Result<Json<RegisterOutcome>, Problem> {
    user.validate()?;

    db.register_user(user.into_inner()).await.map(Json)
}

#[utoipa::path(
    responses(
        (status = 200, description = "All registered users", body = Vec<User>),
        (status = 403, description = "Caller is not an admin", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/users")]
#[tracing::instrument(skip(db))]
pub async fn user_list(_auth: AdminToken, db: &State<Database>) -> Result<Json<Vec<User>>, Problem> {
    db.list_users().await.map(Json)
}

#[utoipa::path(
    params(("id", description = "user ID")),
    responses(
        (status = 200, description = "User promoted to admin"),
        (status = 404, description = "Queried user doesn't exist", body = Problem),
    ),
    security(("jwt" = []))
)]
#[patch("/users/admin/<id>")]
#[tracing::instrument(skip(db))]
pub async fn user_make_admin(
    id: Uuid,
    _auth: AdminToken,
    db: &State<Database>,
) -> Result<(), Problem> {
    db.set_user_role(id, Role::Admin).await
}

#[utoipa::path(
    params(("id", description = "user ID")),
    responses(
        (status = 200, description = "User promoted to instructor"),
        (status = 404, description = "Queried user doesn't exist", body = Problem),
    ),
    security(("jwt" = []))
)]
#[patch("/users/instructor/<id>")]
#[tracing::instrument(skip(db))]
pub async fn user_make_instructor(
    id: Uuid,
    _auth: AdminToken,
    db: &State<Database>,
) -> Result<(), Problem> {
    db.set_user_role(id, Role::Instructor).await
}

/// Privilege probe used by clients to pick the dashboard to render.
/// Callers may only probe their own identity.
#[utoipa::path(
    params(("email", description = "Probed e-mail, must match the token")),
    responses(
        (status = 200, description = "Whether the e-mail belongs to an admin", body = AdminProbe),
        (status = 403, description = "Identity mismatch", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/users/admin/<email>")]
#[tracing::instrument(skip(db))]
pub async fn admin_probe(
    email: String,
    auth: UserToken,
    db: &State<Database>,
) -> Result<Json<AdminProbe>, Problem> {
    require_identity(&auth, &email)?;

    let role = db.role_of(&email).await?;
    Ok(Json(AdminProbe {
        admin: role == Role::Admin,
    }))
}

#[utoipa::path(
    params(("email", description = "Probed e-mail, must match the token")),
    responses(
        (status = 200, description = "Whether the e-mail belongs to an instructor", body = InstructorProbe),
        (status = 403, description = "Identity mismatch", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/users/instructor/<email>")]
#[tracing::instrument(skip(db))]
pub async fn instructor_probe(
    email: String,
    auth: UserToken,
    db: &State<Database>,
) -> Result<Json<InstructorProbe>, Problem> {
    require_identity(&auth, &email)?;

    let role = db.role_of(&email).await?;
    Ok(Json(InstructorProbe {
        instructor: role == Role::Instructor,
    }))
}

#[utoipa::path(
    responses((status = 200, description = "All instructors", body = Vec<User>))
)]
#[get("/allInstructors")]
#[tracing::instrument(skip(db))]
pub async fn instructor_list(db: &State<Database>) -> Result<Json<Vec<User>>, Problem> {
    db.list_instructors().await.map(Json)
}

/// Instructors of the most-enrolled classes.
#[utoipa::path(
    responses((status = 200, description = "Popular instructors", body = Vec<User>))
)]
#[get("/popular-instructors")]
#[tracing::instrument(skip(db))]
pub async fn instructor_list_popular(db: &State<Database>) -> Result<Json<Vec<User>>, Problem> {
    db.popular_instructors(POPULAR_INSTRUCTOR_LIMIT).await.map(Json)
}

///////////////////////
//       TESTS
///////////////////////

#[cfg(test)]
mod user_endpoints {
    use rocket::http::{ContentType, Header, Status};
    use rocket::local::asynchronous::Client;

    use crate::security::Security;

    fn register_body(user: impl AsRef<str>) -> String {
        format!(
            "{{\"name\": \"{}\", \"email\": \"{}@example.com\"}}",
            user.as_ref(),
            user.as_ref()
        )
    }

    async fn test_client() -> Client {
        Client::tracked(
            crate::create(None)
                .await
                .expect("invalid backend"),
        )
        .await
        .expect("invalid backend")
    }

    fn bearer_header(client: &Client, email: impl AsRef<str>) -> Header<'static> {
        let security: &Security = client.rocket().state().unwrap();
        let token = crate::resp::jwt::UserToken::new(email.as_ref())
            .encode_jwt(&security.token_secret)
            .expect("unable to encode test token");

        Header::new("Authorization", format!("Bearer {}", token))
    }

    #[rocket::async_test]
    #[ignore = "requires a running MongoDB"]
    async fn user_register_is_idempotent_by_email() {
        let client = test_client().await;

        let first = client
            .post("/users")
            .header(ContentType::JSON)
            .body(register_body("user_register_is_idempotent_by_email"))
            .dispatch()
            .await;
        assert_eq!(first.status(), Status::Ok, "an ok response");

        let second = client
            .post("/users")
            .header(ContentType::JSON)
            .body(register_body("user_register_is_idempotent_by_email"))
            .dispatch()
            .await;
        assert_eq!(second.status(), Status::Ok, "duplicates are a 200, not an error");

        let body = second.into_string().await.expect("a response body");
        assert!(
            body.contains("User already exists"),
            "duplicate registration must be flagged"
        );
    }

    #[rocket::async_test]
    #[ignore = "requires a running MongoDB"]
    async fn guarded_user_list_rejects_missing_token() {
        let client = test_client().await;

        let response = client.get("/users").dispatch().await;
        assert_eq!(
            response.status(),
            Status::Unauthorized,
            "expected unauthenticated response"
        );
    }

    #[rocket::async_test]
    #[ignore = "requires a running MongoDB"]
    async fn probe_rejects_identity_mismatch() {
        let client = test_client().await;
        let header = bearer_header(&client, "somebody@example.com");

        let response = client
            .get("/users/admin/somebody-else@example.com")
            .header(header)
            .dispatch()
            .await;

        assert_eq!(
            response.status(),
            Status::Forbidden,
            "probing another identity must be rejected before any read"
        );
    }

    #[rocket::async_test]
    #[ignore = "requires a running MongoDB"]
    async fn guarded_user_list_rejects_unprivileged_caller() {
        let client = test_client().await;
        let header = bearer_header(&client, "nobody-special@example.com");

        let response = client.get("/users").header(header).dispatch().await;
        assert_eq!(
            response.status(),
            Status::Forbidden,
            "a caller without the admin role must be rejected"
        );
    }
}
