use bson::{doc, Document};
use mongodb::options::FindOptions;
use mongodb::Database;
use uuid::Uuid;

use super::{Class, ClassCreateData, ClassStatus, ClassUpdateData, CLASS_COLLECTION_NAME};
use crate::data::{by_id, collect_documents};
use crate::middleware::paging::PageState;
use crate::resp::problem::Problem;

pub mod problem {
    use crate::resp::problem::Problem;
    use rocket::http::Status;
    use uuid::Uuid;

    #[inline]
    pub fn not_found(id: Uuid) -> Problem {
        Problem::new_untyped(Status::NotFound, "Class doesn't exist.")
            .insert("id", id.to_string())
            .clone()
    }

    #[inline]
    pub fn already_decided(id: Uuid) -> Problem {
        Problem::new_untyped(Status::Conflict, "Class status has already been decided.")
            .insert("id", id.to_string())
            .clone()
    }

    #[inline]
    pub fn no_seats(id: Uuid) -> Problem {
        Problem::new_untyped(Status::Conflict, "No seats remaining.")
            .insert("id", id.to_string())
            .clone()
    }
}

#[rocket::async_trait]
pub trait ClassDbExt {
    async fn create_class(&self, data: ClassCreateData) -> Result<Uuid, Problem>;

    async fn class_by_id(&self, id: Uuid) -> Result<Class, Problem>;
    async fn classes_by_instructor(&self, email: &str) -> Result<Vec<Class>, Problem>;
    async fn list_classes(&self, page: PageState) -> Result<Vec<Class>, Problem>;
    async fn popular_classes(&self, threshold: u32) -> Result<Vec<Class>, Problem>;

    async fn update_class_content(&self, id: Uuid, data: ClassUpdateData) -> Result<(), Problem>;
    async fn set_class_status(&self, id: Uuid, status: ClassStatus) -> Result<(), Problem>;
    async fn set_class_feedback(&self, id: Uuid, feedback: &str) -> Result<(), Problem>;

    /// Conditionally claim one seat. Returns `false` when the class is
    /// missing or already full; seats can never go below zero because the
    /// guard sits in the update filter itself.
    async fn take_seat(&self, id: Uuid) -> Result<bool, Problem>;
}

#[rocket::async_trait]
impl ClassDbExt for Database {
    async fn create_class(&self, data: ClassCreateData) -> Result<Uuid, Problem> {
        let class = Class::from(data);

        self.collection(CLASS_COLLECTION_NAME)
            .insert_one(
                bson::to_document(&class).expect("Class must be serializable to BSON"),
                None,
            )
            .await
            .map_err(Problem::from)?;

        Ok(class.id)
    }

    async fn class_by_id(&self, id: Uuid) -> Result<Class, Problem> {
        self.collection(CLASS_COLLECTION_NAME)
            .find_one(by_id(id), None)
            .await
            .map_err(Problem::from)?
            .ok_or_else(|| problem::not_found(id))
    }

    async fn classes_by_instructor(&self, email: &str) -> Result<Vec<Class>, Problem> {
        let cursor = self
            .collection::<Document>(CLASS_COLLECTION_NAME)
            .find(doc! { "instructorEmail": email }, None)
            .await
            .map_err(Problem::from)?;

        Ok(collect_documents(cursor).await)
    }

    async fn list_classes(&self, page: PageState) -> Result<Vec<Class>, Problem> {
        let options = FindOptions::builder()
            .skip(page.skip())
            .limit(page.limit())
            .build();

        let cursor = self
            .collection::<Document>(CLASS_COLLECTION_NAME)
            .find(None, options)
            .await
            .map_err(Problem::from)?;

        Ok(collect_documents(cursor).await)
    }

    async fn popular_classes(&self, threshold: u32) -> Result<Vec<Class>, Problem> {
        let options = FindOptions::builder().sort(doc! { "enrolled": -1 }).build();

        let cursor = self
            .collection::<Document>(CLASS_COLLECTION_NAME)
            .find(doc! { "enrolled": { "$gte": threshold } }, options)
            .await
            .map_err(Problem::from)?;

        Ok(collect_documents(cursor).await)
    }

    async fn update_class_content(&self, id: Uuid, data: ClassUpdateData) -> Result<(), Problem> {
        let mut fields = doc! {
            "name": data.name.as_str(),
            "instructorName": data.instructor_name.as_str(),
            "instructorEmail": data.instructor_email.as_str(),
            "price": data.price,
            "seats": data.seats,
        };
        if let Some(photo_url) = &data.photo_url {
            fields.insert("photoURL", photo_url.as_str());
        }

        let result = self
            .collection::<Document>(CLASS_COLLECTION_NAME)
            .update_one(by_id(id), doc! { "$set": fields }, None)
            .await
            .map_err(Problem::from)?;

        if result.matched_count == 0 {
            return Err(problem::not_found(id));
        }

        Ok(())
    }

    async fn set_class_status(&self, id: Uuid, status: ClassStatus) -> Result<(), Problem> {
        // Approval is a one-way decision taken from the pending state.
        let mut filter = by_id(id);
        filter.insert("status", ClassStatus::Pending.to_string());

        let result = self
            .collection::<Document>(CLASS_COLLECTION_NAME)
            .update_one(
                filter,
                doc! { "$set": { "status": status.to_string() } },
                None,
            )
            .await
            .map_err(Problem::from)?;

        if result.matched_count == 0 {
            // Distinguish a missing class from one that was already
            // approved or denied.
            self.class_by_id(id).await?;
            return Err(problem::already_decided(id));
        }

        Ok(())
    }

    async fn set_class_feedback(&self, id: Uuid, feedback: &str) -> Result<(), Problem> {
        let result = self
            .collection::<Document>(CLASS_COLLECTION_NAME)
            .update_one(
                by_id(id),
                doc! { "$set": { "feedback": feedback } },
                None,
            )
            .await
            .map_err(Problem::from)?;

        if result.matched_count == 0 {
            return Err(problem::not_found(id));
        }

        Ok(())
    }

    async fn take_seat(&self, id: Uuid) -> Result<bool, Problem> {
        let mut filter = by_id(id);
        filter.insert("seats", doc! { "$gt": 0 });

        let result = self
            .collection::<Document>(CLASS_COLLECTION_NAME)
            .update_one(filter, doc! { "$inc": { "seats": -1 } }, None)
            .await
            .map_err(Problem::from)?;

        Ok(result.modified_count == 1)
    }
}
