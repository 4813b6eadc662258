use bson::{doc, Document};
use mongodb::options::FindOptions;
use mongodb::Database;
use uuid::Uuid;

use super::{RegisterOutcome, User, UserRegisterData, USER_COLLECTION_NAME};
use crate::data::class::{Class, CLASS_COLLECTION_NAME};
use crate::data::{by_id, collect_documents};
use crate::resp::problem::Problem;
use crate::role::Role;

pub mod problem {
    use crate::resp::problem::Problem;
    use rocket::http::Status;
    use uuid::Uuid;

    #[inline]
    pub fn not_found(id: Uuid) -> Problem {
        Problem::new_untyped(Status::NotFound, "User doesn't exist.")
            .insert("id", id.to_string())
            .clone()
    }
}

#[rocket::async_trait]
pub trait UserDbExt {
    async fn register_user(&self, data: UserRegisterData) -> Result<RegisterOutcome, Problem>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Problem>;

    /// Current persisted privilege for an email. Absence of the user (or
    /// of the role field) means no privilege, not an error.
    async fn role_of(&self, email: &str) -> Result<Role, Problem>;

    async fn list_users(&self) -> Result<Vec<User>, Problem>;
    async fn list_instructors(&self) -> Result<Vec<User>, Problem>;
    async fn popular_instructors(&self, limit: usize) -> Result<Vec<User>, Problem>;

    async fn set_user_role(&self, id: Uuid, role: Role) -> Result<(), Problem>;
}

#[rocket::async_trait]
impl UserDbExt for Database {
    async fn register_user(&self, data: UserRegisterData) -> Result<RegisterOutcome, Problem> {
        if self.find_user_by_email(&data.email).await?.is_some() {
            return Ok(RegisterOutcome::AlreadyExists {
                message: "User already exists".to_string(),
            });
        }

        let user = User::from(data);

        self.collection(USER_COLLECTION_NAME)
            .insert_one(
                bson::to_document(&user).expect("User must be serializable to BSON"),
                None,
            )
            .await
            .map_err(Problem::from)?;

        Ok(RegisterOutcome::Created { id: user.id })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, Problem> {
        self.collection(USER_COLLECTION_NAME)
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(Problem::from)
    }

    async fn role_of(&self, email: &str) -> Result<Role, Problem> {
        Ok(self
            .find_user_by_email(email)
            .await?
            .map(|user| user.role)
            .unwrap_or_default())
    }

    async fn list_users(&self) -> Result<Vec<User>, Problem> {
        let cursor = self
            .collection::<Document>(USER_COLLECTION_NAME)
            .find(None, None)
            .await
            .map_err(Problem::from)?;

        Ok(collect_documents(cursor).await)
    }

    async fn list_instructors(&self) -> Result<Vec<User>, Problem> {
        let cursor = self
            .collection::<Document>(USER_COLLECTION_NAME)
            .find(doc! { "role": Role::Instructor.to_string() }, None)
            .await
            .map_err(Problem::from)?;

        Ok(collect_documents(cursor).await)
    }

    async fn popular_instructors(&self, limit: usize) -> Result<Vec<User>, Problem> {
        // Instructors of the most-enrolled classes, most popular first.
        let options = FindOptions::builder().sort(doc! { "enrolled": -1 }).build();
        let cursor = self
            .collection::<Document>(CLASS_COLLECTION_NAME)
            .find(None, options)
            .await
            .map_err(Problem::from)?;
        let classes: Vec<Class> = collect_documents(cursor).await;

        let mut seen: Vec<String> = vec![];
        let mut instructors: Vec<User> = vec![];

        for class in classes {
            if instructors.len() >= limit {
                break;
            }
            if seen.contains(&class.instructor_email) {
                continue;
            }
            seen.push(class.instructor_email.clone());

            if let Some(user) = self.find_user_by_email(&class.instructor_email).await? {
                instructors.push(user);
            }
        }

        Ok(instructors)
    }

    async fn set_user_role(&self, id: Uuid, role: Role) -> Result<(), Problem> {
        let result = self
            .collection::<Document>(USER_COLLECTION_NAME)
            .update_one(
                by_id(id),
                doc! { "$set": { "role": role.to_string() } },
                None,
            )
            .await
            .map_err(Problem::from)?;

        if result.matched_count == 0 {
            return Err(problem::not_found(id));
        }

        Ok(())
    }
}
