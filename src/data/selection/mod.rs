use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::resp::problem::{problems, Problem};
use crate::util;

pub mod db;

pub static SELECTED_CLASS_COLLECTION_NAME: &str = "selectedClasses";

/// A student's pending cart entry for a class, prior to payment.
///
/// Holds a weak reference to the class: nothing cascades if the class is
/// later removed.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SelectedClass {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    #[serde(rename = "studentEmail")]
    pub student_email: String,
    #[serde(rename = "classId", with = "bson::serde_helpers::uuid_1_as_binary")]
    pub class_id: Uuid,
    #[serde(rename = "className")]
    pub class_name: String,
    pub price: f64,
    #[serde(rename = "instructorEmail")]
    pub instructor_email: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SelectionCreateData {
    #[serde(rename = "studentEmail")]
    pub student_email: String,
    #[serde(rename = "classId")]
    pub class_id: Uuid,
    #[serde(rename = "className")]
    pub class_name: String,
    pub price: f64,
    #[serde(rename = "instructorEmail")]
    pub instructor_email: String,
}

impl SelectionCreateData {
    pub fn validate(&self) -> Result<(), Problem> {
        if !util::email_valid(&self.student_email) {
            return Err(problems::validation_problem(
                "Student e-mail address is not valid.",
            ));
        }

        if self.class_name.is_empty() {
            return Err(problems::validation_problem("Class name must not be empty."));
        }

        if !self.price.is_finite() || self.price < 0.0 {
            return Err(problems::validation_problem(
                "Price must be a non-negative number.",
            ));
        }

        Ok(())
    }
}

impl From<SelectionCreateData> for SelectedClass {
    fn from(data: SelectionCreateData) -> SelectedClass {
        SelectedClass {
            id: Uuid::new_v4(),
            student_email: data.student_email,
            class_id: data.class_id,
            class_name: data.class_name,
            price: data.price,
            instructor_email: data.instructor_email,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_selection() -> SelectionCreateData {
        SelectionCreateData {
            student_email: "student@example.com".to_string(),
            class_id: Uuid::new_v4(),
            class_name: "Yoga".to_string(),
            price: 20.0,
            instructor_email: "a@x.com".to_string(),
        }
    }

    #[test]
    fn selection_keeps_the_referenced_class() {
        let data = example_selection();
        let class_id = data.class_id;

        let selection = SelectedClass::from(data);
        assert_eq!(selection.class_id, class_id);
    }

    #[test]
    fn selection_data_is_validated() {
        assert!(example_selection().validate().is_ok());

        let mut bad = example_selection();
        bad.student_email = "whoever".to_string();
        assert!(bad.validate().is_err());

        let mut nan_price = example_selection();
        nan_price.price = f64::NAN;
        assert!(nan_price.validate().is_err());
    }
}
