use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::resp::problem::{problems, Problem};
use crate::role::Role;
use crate::util;

pub mod db;

pub static USER_COLLECTION_NAME: &str = "users";

/// A signed-in account. Created on first sign-in, never deleted; `role`
/// is only ever changed through the admin management routes.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    #[serde(
        default = "Uuid::new_v4",
        rename = "_id",
        with = "bson::serde_helpers::uuid_1_as_binary"
    )]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(rename = "photoURL", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UserRegisterData {
    pub name: String,
    #[schema(format = "email")]
    pub email: String,
    #[serde(rename = "photoURL", default)]
    pub photo_url: Option<String>,
}

impl UserRegisterData {
    pub fn validate(&self) -> Result<(), Problem> {
        if self.name.is_empty() {
            return Err(problems::validation_problem("Name must not be empty."));
        }

        if !util::email_valid(&self.email) {
            return Err(problems::validation_problem("Not a valid e-mail address."));
        }

        Ok(())
    }
}

impl From<UserRegisterData> for User {
    fn from(data: UserRegisterData) -> User {
        User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            photo_url: data.photo_url,
            role: Role::None,
        }
    }
}

/// Registration reports "already exists" as data rather than an error;
/// clients sign users in repeatedly and expect a 200 either way.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(untagged)]
pub enum RegisterOutcome {
    Created { id: Uuid },
    AlreadyExists { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_user_without_role_field_has_none() {
        let document = bson::doc! {
            "_id": bson::Bson::Binary(bson::Binary {
                subtype: bson::spec::BinarySubtype::Uuid,
                bytes: Uuid::new_v4().as_bytes().to_vec(),
            }),
            "name": "Student",
            "email": "student@example.com",
        };

        let user: User = bson::from_document(document).unwrap();
        assert_eq!(user.role, Role::None);
    }

    #[test]
    fn registration_starts_without_privilege() {
        let user = User::from(UserRegisterData {
            name: "New".to_string(),
            email: "new@example.com".to_string(),
            photo_url: None,
        });
        assert_eq!(user.role, Role::None);
    }

    #[test]
    fn registration_data_requires_plausible_email() {
        let data = UserRegisterData {
            name: "New".to_string(),
            email: "not-an-email".to_string(),
            photo_url: None,
        };
        assert!(data.validate().is_err());
    }
}
