use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::resp::problem::{problems, Problem};
use crate::util;

pub mod db;

pub static PAYMENT_COLLECTION_NAME: &str = "paymentRecords";

/// A committed transaction. Written exactly once per completed payment
/// and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PaymentRecord {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    pub price: f64,
    pub date: DateTime<Utc>,
    #[serde(rename = "className")]
    pub class_name: String,
}

/// Caller-reported completion details for a payment the gateway accepted.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PaymentInfoData {
    // Older clients post the cart entry id as plain "id".
    #[serde(rename = "selectionId", alias = "id")]
    pub selection_id: Uuid,
    #[serde(rename = "classId")]
    pub class_id: Uuid,
    pub name: String,
    pub email: String,
    pub price: f64,
    #[serde(rename = "transactionId")]
    pub transaction_id: String,
    #[serde(rename = "className")]
    pub class_name: String,
    #[serde(default = "Utc::now")]
    pub date: DateTime<Utc>,
}

impl PaymentInfoData {
    pub fn validate(&self) -> Result<(), Problem> {
        if !util::email_valid(&self.email) {
            return Err(problems::validation_problem("E-mail address is not valid."));
        }

        if self.transaction_id.is_empty() {
            return Err(problems::validation_problem(
                "Transaction id must not be empty.",
            ));
        }

        if !self.price.is_finite() || self.price < 0.0 {
            return Err(problems::validation_problem(
                "Price must be a non-negative number.",
            ));
        }

        Ok(())
    }
}

impl From<&PaymentInfoData> for PaymentRecord {
    fn from(info: &PaymentInfoData) -> PaymentRecord {
        PaymentRecord {
            id: Uuid::new_v4(),
            name: info.name.clone(),
            email: info.email.clone(),
            transaction_id: info.transaction_id.clone(),
            price: info.price,
            date: info.date,
            class_name: info.class_name.clone(),
        }
    }
}

/// Per-step result of payment completion. The three effects are separate
/// writes, so a caller must be able to see exactly which of them applied.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct PaymentOutcome {
    #[serde(rename = "recordInserted")]
    pub record_inserted: bool,
    #[serde(rename = "selectionRemoved")]
    pub selection_removed: bool,
    #[serde(rename = "seatTaken")]
    pub seat_taken: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_info() -> PaymentInfoData {
        PaymentInfoData {
            selection_id: Uuid::new_v4(),
            class_id: Uuid::new_v4(),
            name: "Student".to_string(),
            email: "student@example.com".to_string(),
            price: 20.0,
            transaction_id: "pi_123".to_string(),
            class_name: "Yoga".to_string(),
            date: Utc::now(),
        }
    }

    #[test]
    fn record_copies_completion_details() {
        let info = example_info();
        let record = PaymentRecord::from(&info);

        assert_eq!(record.transaction_id, info.transaction_id);
        assert_eq!(record.class_name, info.class_name);
        assert_eq!(record.price, info.price);
    }

    #[test]
    fn completion_details_are_validated() {
        assert!(example_info().validate().is_ok());

        let mut no_transaction = example_info();
        no_transaction.transaction_id.clear();
        assert!(no_transaction.validate().is_err());
    }
}
