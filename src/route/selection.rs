use mongodb::Database;
use rocket::serde::json::Json;
use rocket::State;
use uuid::Uuid;

use crate::data::selection::db::SelectionDbExt;
use crate::data::selection::{SelectedClass, SelectionCreateData};
use crate::middleware::paging::PageState;
use crate::resp::problem::Problem;
use crate::route::{CreatedResponse, DeletedResponse};

/// Put a class into a student's cart.
#[utoipa::path(
    request_body = SelectionCreateData,
    responses(
        (status = 200, description = "Identifier of the cart entry", body = CreatedResponse),
        (status = 400, description = "Malformed selection payload", body = Problem),
    )
)]
#[post("/student/selectedClass", format = "application/json", data = "<selection>")]
#[tracing::instrument(skip(db))]
pub async fn selection_create(
    selection: Json<SelectionCreateData>,
    db: &State<Database>,
) -> Result<Json<CreatedResponse>, Problem> {
    selection.validate()?;

    let id = db.add_selection(selection.into_inner()).await?;

    Ok(Json(CreatedResponse { id }))
}

#[utoipa::path(
    responses((status = 200, description = "All cart entries", body = Vec<SelectedClass>))
)]
#[get("/student/selectedClasses")]
#[tracing::instrument(skip(db))]
pub async fn selection_list(
    page: PageState,
    db: &State<Database>,
) -> Result<Json<Vec<SelectedClass>>, Problem> {
    db.list_selections(page).await.map(Json)
}

#[utoipa::path(
    params(("id", description = "cart entry ID")),
    responses((status = 200, description = "Number of removed entries", body = DeletedResponse))
)]
#[delete("/student/selectedClass/<id>")]
#[tracing::instrument(skip(db))]
pub async fn selection_delete(
    id: Uuid,
    db: &State<Database>,
) -> Result<Json<DeletedResponse>, Problem> {
    let deleted = db.remove_selection(id).await?;

    Ok(Json(DeletedResponse { deleted }))
}

/// The cart entry a student is about to pay for.
#[utoipa::path(
    params(("id", description = "cart entry ID")),
    responses(
        (status = 200, description = "The priced cart entry", body = SelectedClass),
        (status = 404, description = "Queried cart entry doesn't exist", body = Problem),
    )
)]
#[get("/student/payment/<id>")]
#[tracing::instrument(skip(db))]
pub async fn selection_payment(
    id: Uuid,
    db: &State<Database>,
) -> Result<Json<SelectedClass>, Problem> {
    db.selection_by_id(id).await.map(Json)
}
