use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::resp::problem::{problems, Problem};
use crate::util;

pub mod db;

pub static CLASS_COLLECTION_NAME: &str = "classes";

/// Moderation state of a class. Every class starts out `pending`; an
/// admin decision moves it to `approved` or `denied`, and there is no
/// transition back.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ClassStatus {
    Pending,
    Approved,
    Denied,
}

impl std::default::Default for ClassStatus {
    fn default() -> Self {
        ClassStatus::Pending
    }
}

impl std::fmt::Display for ClassStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassStatus::Pending => write!(f, "pending"),
            ClassStatus::Approved => write!(f, "approved"),
            ClassStatus::Denied => write!(f, "denied"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Class {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "instructorName")]
    pub instructor_name: String,
    #[serde(rename = "instructorEmail")]
    pub instructor_email: String,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub price: f64,
    pub seats: u32,
    #[serde(default)]
    pub enrolled: u32,
    #[serde(default)]
    pub status: ClassStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

fn validate_class_fields(name: &str, instructor_email: &str, price: f64) -> Result<(), Problem> {
    if name.is_empty() {
        return Err(problems::validation_problem("Class name must not be empty."));
    }

    if !util::email_valid(instructor_email) {
        return Err(problems::validation_problem(
            "Instructor e-mail address is not valid.",
        ));
    }

    if !price.is_finite() || price < 0.0 {
        return Err(problems::validation_problem(
            "Price must be a non-negative number.",
        ));
    }

    Ok(())
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClassCreateData {
    pub name: String,
    #[serde(rename = "instructorName")]
    pub instructor_name: String,
    #[serde(rename = "instructorEmail")]
    pub instructor_email: String,
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
    pub price: f64,
    pub seats: u32,
    #[serde(default)]
    pub enrolled: u32,
}

impl ClassCreateData {
    pub fn validate(&self) -> Result<(), Problem> {
        validate_class_fields(&self.name, &self.instructor_email, self.price)
    }
}

impl From<ClassCreateData> for Class {
    fn from(data: ClassCreateData) -> Class {
        Class {
            id: Uuid::new_v4(),
            name: data.name,
            instructor_name: data.instructor_name,
            instructor_email: data.instructor_email,
            photo_url: data.photo_url,
            price: data.price,
            seats: data.seats,
            enrolled: data.enrolled,
            // Moderation state is never caller-supplied.
            status: ClassStatus::Pending,
            feedback: None,
        }
    }
}

/// Content fields an instructor may replace. Status and feedback are
/// deliberately absent; those belong to the admin routes.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ClassUpdateData {
    pub name: String,
    #[serde(rename = "instructorName")]
    pub instructor_name: String,
    #[serde(rename = "instructorEmail")]
    pub instructor_email: String,
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
    pub price: f64,
    pub seats: u32,
}

impl ClassUpdateData {
    pub fn validate(&self) -> Result<(), Problem> {
        validate_class_fields(&self.name, &self.instructor_email, self.price)
    }
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FeedbackData {
    #[serde(rename = "adminFeedback")]
    pub admin_feedback: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_create_data() -> ClassCreateData {
        ClassCreateData {
            name: "Yoga".to_string(),
            instructor_name: "A".to_string(),
            instructor_email: "a@x.com".to_string(),
            photo_url: None,
            price: 20.0,
            seats: 10,
            enrolled: 0,
        }
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ClassStatus::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&ClassStatus::Approved).unwrap(),
            "\"approved\""
        );
    }

    #[test]
    fn new_classes_start_pending() {
        let class = Class::from(example_create_data());
        assert_eq!(class.status, ClassStatus::Pending);
        assert_eq!(class.feedback, None);
        assert_eq!(class.seats, 10);
    }

    #[test]
    fn create_data_rejects_bad_payloads() {
        let mut nameless = example_create_data();
        nameless.name.clear();
        assert!(nameless.validate().is_err());

        let mut bad_email = example_create_data();
        bad_email.instructor_email = "nobody".to_string();
        assert!(bad_email.validate().is_err());

        let mut negative = example_create_data();
        negative.price = -1.0;
        assert!(negative.validate().is_err());

        assert!(example_create_data().validate().is_ok());
    }

    #[test]
    fn stored_class_without_status_reads_as_pending() {
        let document = bson::doc! {
            "_id": bson::Bson::Binary(bson::Binary {
                subtype: bson::spec::BinarySubtype::Uuid,
                bytes: Uuid::new_v4().as_bytes().to_vec(),
            }),
            "name": "Yoga",
            "instructorName": "A",
            "instructorEmail": "a@x.com",
            "price": 20.0,
            "seats": 10,
        };

        let class: Class = bson::from_document(document).unwrap();
        assert_eq!(class.status, ClassStatus::Pending);
        assert_eq!(class.enrolled, 0);
    }
}
