use mongodb::Database;
use rocket::serde::json::Json;
use rocket::State;
use uuid::Uuid;

use crate::config::Config;
use crate::data::class::db::ClassDbExt;
use crate::data::class::{Class, ClassCreateData, ClassStatus, ClassUpdateData, FeedbackData};
use crate::middleware::paging::PageState;
use crate::resp::jwt::{require_identity, AdminToken, InstructorToken};
use crate::resp::problem::Problem;
use crate::route::CreatedResponse;

/// Create a class in the catalogue. It stays invisible to students until
/// an admin approves it.
#[utoipa::path(
    request_body = ClassCreateData,
    responses(
        (status = 200, description = "Identifier of the created class", body = CreatedResponse),
        (status = 400, description = "Malformed class payload", body = Problem),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 403, description = "Caller is not an instructor", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/instructor/addClass", format = "application/json", data = "<class>")]
#[tracing::instrument(skip(db))]
pub async fn class_create(
    class: Json<ClassCreateData>,
    _auth: InstructorToken,
    db: &State<Database>,
) -> Result<Json<CreatedResponse>, Problem> {
    class.validate()?;

    let id = db.create_class(class.into_inner()).await?;

    Ok(Json(CreatedResponse { id }))
}

/// Classes owned by the authenticated instructor. The query parameter
/// must match the token identity.
#[utoipa::path(
    responses(
        (status = 200, description = "Classes owned by the instructor", body = Vec<Class>),
        (status = 403, description = "Identity mismatch or not an instructor", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/instructor/myClasses?<email>")]
#[tracing::instrument(skip(db))]
pub async fn my_classes(
    email: String,
    auth: InstructorToken,
    db: &State<Database>,
) -> Result<Json<Vec<Class>>, Problem> {
    require_identity(&auth.0, &email)?;

    db.classes_by_instructor(&email).await.map(Json)
}

#[utoipa::path(
    params(("id", description = "class ID")),
    responses(
        (status = 200, description = "The requested class", body = Class),
        (status = 404, description = "Queried class doesn't exist", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/instructor/myClasses/<id>")]
#[tracing::instrument(skip(db))]
pub async fn my_class(
    id: Uuid,
    _auth: InstructorToken,
    db: &State<Database>,
) -> Result<Json<Class>, Problem> {
    db.class_by_id(id).await.map(Json)
}

/// Replace the content fields of a class. Status and feedback are not
/// touched by this route.
#[utoipa::path(
    request_body = ClassUpdateData,
    params(("id", description = "class ID")),
    responses(
        (status = 200, description = "Class content replaced"),
        (status = 404, description = "Queried class doesn't exist", body = Problem),
    ),
    security(("jwt" = []))
)]
#[patch("/instructor/updateClass/<id>", format = "application/json", data = "<update>")]
#[tracing::instrument(skip(db))]
pub async fn class_update(
    id: Uuid,
    update: Json<ClassUpdateData>,
    _auth: InstructorToken,
    db: &State<Database>,
) -> Result<(), Problem> {
    update.validate()?;

    db.update_class_content(id, update.into_inner()).await
}

#[utoipa::path(
    request_body = FeedbackData,
    params(("id", description = "class ID")),
    responses(
        (status = 200, description = "Feedback stored"),
        (status = 403, description = "Caller is not an admin", body = Problem),
        (status = 404, description = "Queried class doesn't exist", body = Problem),
    ),
    security(("jwt" = []))
)]
#[patch("/instructor/feedbackClass/<id>", format = "application/json", data = "<feedback>")]
#[tracing::instrument(skip(db))]
pub async fn class_feedback(
    id: Uuid,
    feedback: Json<FeedbackData>,
    _auth: AdminToken,
    db: &State<Database>,
) -> Result<(), Problem> {
    db.set_class_feedback(id, &feedback.admin_feedback).await
}

#[utoipa::path(
    params(("id", description = "class ID")),
    responses(
        (status = 200, description = "Class approved"),
        (status = 404, description = "Queried class doesn't exist", body = Problem),
        (status = 409, description = "Status was already decided", body = Problem),
    ),
    security(("jwt" = []))
)]
#[patch("/classes/approved/<id>")]
#[tracing::instrument(skip(db))]
pub async fn class_approve(
    id: Uuid,
    _auth: AdminToken,
    db: &State<Database>,
) -> Result<(), Problem> {
    db.set_class_status(id, ClassStatus::Approved).await
}

#[utoipa::path(
    params(("id", description = "class ID")),
    responses(
        (status = 200, description = "Class denied"),
        (status = 404, description = "Queried class doesn't exist", body = Problem),
        (status = 409, description = "Status was already decided", body = Problem),
    ),
    security(("jwt" = []))
)]
#[patch("/classes/denied/<id>")]
#[tracing::instrument(skip(db))]
pub async fn class_deny(id: Uuid, _auth: AdminToken, db: &State<Database>) -> Result<(), Problem> {
    db.set_class_status(id, ClassStatus::Denied).await
}

/// Public catalogue listing.
#[utoipa::path(
    responses((status = 200, description = "All classes", body = Vec<Class>))
)]
#[get("/allClasses")]
#[tracing::instrument(skip(db))]
pub async fn class_list(page: PageState, db: &State<Database>) -> Result<Json<Vec<Class>>, Problem> {
    db.list_classes(page).await.map(Json)
}

/// Classes whose enrollment reached the popularity threshold, most
/// enrolled first.
#[utoipa::path(
    responses((status = 200, description = "Popular classes", body = Vec<Class>))
)]
#[get("/popular-classes?<threshold>")]
#[tracing::instrument(skip(db, config))]
pub async fn class_list_popular(
    threshold: Option<u32>,
    config: &State<Config>,
    db: &State<Database>,
) -> Result<Json<Vec<Class>>, Problem> {
    db.popular_classes(threshold.unwrap_or(config.popular_enrollment))
        .await
        .map(Json)
}
