use rocket::{Build, Rocket, Route};
use serde::Serialize;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

pub mod auth;
pub mod class;
pub mod payment;
pub mod selection;
pub mod users;

use auth::*;
use class::*;
use payment::*;
use selection::*;
use users::*;

use crate::{
    data::class as cd,
    data::payment as pd,
    data::selection as sd,
    data::user as ud,
    resp::{jwt::doc::JWTAuth, problem::Problem},
    role::Role,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedResponse {
    pub deleted: u64,
}

/// Plain-text liveness probe.
#[utoipa::path(responses((status = 200, description = "Server is alive")))]
#[get("/")]
pub fn health() -> &'static str {
    "Server is up and running."
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        jwt_issue,
        class_create,
        my_classes,
        my_class,
        class_update,
        class_feedback,
        class_approve,
        class_deny,
        class_list,
        class_list_popular,
        selection_create,
        selection_list,
        selection_delete,
        selection_payment,
        user_register,
        user_list,
        user_make_admin,
        user_make_instructor,
        admin_probe,
        instructor_probe,
        instructor_list,
        instructor_list_popular,
        payment_intent,
        payment_complete
    ),
    components(schemas(
        Role,
        cd::Class,
        cd::ClassStatus,
        cd::ClassCreateData,
        cd::ClassUpdateData,
        cd::FeedbackData,
        sd::SelectedClass,
        sd::SelectionCreateData,
        ud::User,
        ud::UserRegisterData,
        ud::RegisterOutcome,
        pd::PaymentRecord,
        pd::PaymentInfoData,
        pd::PaymentOutcome,
        auth::TokenRequest,
        auth::TokenResponse,
        payment::IntentRequest,
        payment::IntentResponse,
        users::AdminProbe,
        users::InstructorProbe,
        CreatedResponse,
        DeletedResponse,
        Problem
    )),
    modifiers(&JWTAuth)
)]
pub struct ApiDoc;

pub fn api() -> Vec<Route> {
    routes![
        health,
        jwt_issue,
        class_create,
        my_classes,
        my_class,
        class_update,
        class_feedback,
        class_approve,
        class_deny,
        class_list,
        class_list_popular,
        selection_create,
        selection_list,
        selection_delete,
        selection_payment,
        user_register,
        user_list,
        user_make_admin,
        user_make_instructor,
        admin_probe,
        instructor_probe,
        instructor_list,
        instructor_list_popular,
        payment_intent,
        payment_complete
    ]
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/", api()).mount(
        "/",
        SwaggerUi::new("/swagger/<_..>").url("/openapi.json", ApiDoc::openapi()),
    )
}
