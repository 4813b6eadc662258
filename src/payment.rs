use rocket::http::Status;
use serde::Deserialize;
use thiserror::Error;

use crate::resp::problem::Problem;

pub static STRIPE_API_BASE: &'static str = "https://api.stripe.com";

#[derive(Debug, Error)]
pub enum PaymentError {
    #[error("payment gateway request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("payment gateway rejected the request ({status}): {message}")]
    Gateway { status: u16, message: String },
}

impl From<PaymentError> for Problem {
    fn from(e: PaymentError) -> Self {
        Problem::new_untyped(Status::BadGateway, "Payment gateway error.")
            .detail(e)
            .clone()
    }
}

/// Convert a catalogue price into the gateway's minor currency units,
/// truncating to an integer.
pub fn amount_minor(price: f64) -> i64 {
    (price * 100.0).trunc() as i64
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorBody {
    error: GatewayErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GatewayErrorDetail {
    message: String,
}

/// Thin client for the payment processor's "create payment intent" call.
/// Constructed once at startup and handed to routes as managed state.
#[derive(Debug, Clone)]
pub struct PaymentClient {
    http: reqwest::Client,
    secret_key: String,
    api_base: String,
}

impl PaymentClient {
    pub fn new(secret_key: impl ToString) -> PaymentClient {
        PaymentClient::with_api_base(secret_key, STRIPE_API_BASE)
    }

    pub fn with_api_base(secret_key: impl ToString, api_base: impl ToString) -> PaymentClient {
        PaymentClient {
            http: reqwest::Client::new(),
            secret_key: secret_key.to_string(),
            api_base: api_base.to_string(),
        }
    }

    /// Create a charge intent for `amount` minor units and return the
    /// client-usable secret.
    pub async fn create_payment_intent(&self, amount: i64) -> Result<String, PaymentError> {
        let params = [
            ("amount", amount.to_string()),
            ("currency", "usd".to_string()),
            ("payment_method_types[]", "card".to_string()),
        ];

        let response = self
            .http
            .post(format!("{}/v1/payment_intents", self.api_base))
            .basic_auth(&self.secret_key, None::<&str>)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<GatewayErrorBody>(&text)
                .map(|body| body.error.message)
                .unwrap_or(text);

            return Err(PaymentError::Gateway { status, message });
        }

        let intent: IntentResponse = response.json().await?;
        Ok(intent.client_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_units_are_truncated() {
        assert_eq!(amount_minor(20.0), 2000);
        assert_eq!(amount_minor(20.5), 2050);
        assert_eq!(amount_minor(7.25), 725);
        assert_eq!(amount_minor(0.0), 0);
    }

    #[test]
    fn gateway_failure_surfaces_as_bad_gateway() {
        let problem = Problem::from(PaymentError::Gateway {
            status: 402,
            message: "Your card was declined.".to_string(),
        });

        assert_eq!(problem.status, Status::BadGateway);
        assert!(problem.detail.unwrap().contains("card was declined"));
    }

    #[test]
    fn gateway_error_body_parses_stripe_shape() {
        let body = "{\"error\": {\"message\": \"Amount must be positive.\", \"type\": \"invalid_request_error\"}}";
        let parsed: GatewayErrorBody = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "Amount must be positive.");
    }
}
