use mongodb::Database;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::payment::db::PaymentDbExt;
use crate::data::payment::{PaymentInfoData, PaymentOutcome};
use crate::payment::{amount_minor, PaymentClient};
use crate::resp::jwt::UserToken;
use crate::resp::problem::{problems, Problem};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IntentRequest {
    pub price: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct IntentResponse {
    #[serde(rename = "clientSecret")]
    pub client_secret: String,
}

/// Ask the payment processor for a charge intent over the class price.
/// The returned secret is consumed client-side to collect the card.
#[utoipa::path(
    request_body = IntentRequest,
    responses(
        (status = 200, description = "Client secret for the charge intent", body = IntentResponse),
        (status = 400, description = "Malformed amount", body = Problem),
        (status = 502, description = "Payment gateway failure", body = Problem),
    )
)]
#[post("/create-payment-intent", format = "application/json", data = "<intent>")]
#[tracing::instrument(skip(payments))]
pub async fn payment_intent(
    intent: Json<IntentRequest>,
    payments: &State<PaymentClient>,
) -> Result<Json<IntentResponse>, Problem> {
    if !intent.price.is_finite() || intent.price < 0.0 {
        return Err(problems::validation_problem(
            "Price must be a non-negative number.",
        ));
    }

    let client_secret = payments
        .create_payment_intent(amount_minor(intent.price))
        .await
        .map_err(Problem::from)?;

    Ok(Json(IntentResponse { client_secret }))
}

/// Record a completed payment: persist the payment record, drop the cart
/// entry and claim the seat, reporting each step individually.
#[utoipa::path(
    request_body = PaymentInfoData,
    responses(
        (status = 200, description = "All three completion steps applied", body = PaymentOutcome),
        (status = 401, description = "Missing/expired token", body = Problem),
        (status = 409, description = "Class had no seats left; partial outcome attached", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/payment-info", format = "application/json", data = "<info>")]
#[tracing::instrument(skip(db))]
pub async fn payment_complete(
    info: Json<PaymentInfoData>,
    _auth: UserToken,
    db: &State<Database>,
) -> Result<Json<PaymentOutcome>, Problem> {
    info.validate()?;

    db.complete_payment(info.into_inner()).await.map(Json)
}
