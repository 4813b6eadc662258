use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Privilege level persisted on a user record.
///
/// A user document without a `role` field deserializes to [`Role::None`],
/// which grants no booking or administration privilege.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    None,
    Instructor,
    Admin,
}

impl std::default::Default for Role {
    fn default() -> Self {
        Role::None
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::None => write!(f, "none"),
            Role::Instructor => write!(f, "instructor"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::convert::Into<String> for Role {
    fn into(self) -> String {
        self.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::to_string(&Role::Instructor).unwrap(),
            "\"instructor\""
        );
        assert_eq!(serde_json::to_string(&Role::None).unwrap(), "\"none\"");
    }

    #[test]
    fn role_deserializes_from_db_strings() {
        let role: Role = serde_json::from_str("\"instructor\"").unwrap();
        assert_eq!(role, Role::Instructor);
    }

    #[test]
    fn default_role_has_no_privilege() {
        assert_eq!(Role::default(), Role::None);
    }
}
