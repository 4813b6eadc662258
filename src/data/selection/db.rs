use bson::Document;
use mongodb::options::FindOptions;
use mongodb::Database;
use uuid::Uuid;

use super::{SelectedClass, SelectionCreateData, SELECTED_CLASS_COLLECTION_NAME};
use crate::data::{by_id, collect_documents};
use crate::middleware::paging::PageState;
use crate::resp::problem::Problem;

pub mod problem {
    use crate::resp::problem::Problem;
    use rocket::http::Status;
    use uuid::Uuid;

    #[inline]
    pub fn not_found(id: Uuid) -> Problem {
        Problem::new_untyped(Status::NotFound, "Selected class doesn't exist.")
            .insert("id", id.to_string())
            .clone()
    }
}

#[rocket::async_trait]
pub trait SelectionDbExt {
    async fn add_selection(&self, data: SelectionCreateData) -> Result<Uuid, Problem>;

    async fn selection_by_id(&self, id: Uuid) -> Result<SelectedClass, Problem>;
    async fn list_selections(&self, page: PageState) -> Result<Vec<SelectedClass>, Problem>;

    /// Returns the number of removed documents; removing an absent
    /// selection is not an error.
    async fn remove_selection(&self, id: Uuid) -> Result<u64, Problem>;
}

#[rocket::async_trait]
impl SelectionDbExt for Database {
    async fn add_selection(&self, data: SelectionCreateData) -> Result<Uuid, Problem> {
        let selection = SelectedClass::from(data);

        self.collection(SELECTED_CLASS_COLLECTION_NAME)
            .insert_one(
                bson::to_document(&selection).expect("SelectedClass must be serializable to BSON"),
                None,
            )
            .await
            .map_err(Problem::from)?;

        Ok(selection.id)
    }

    async fn selection_by_id(&self, id: Uuid) -> Result<SelectedClass, Problem> {
        self.collection(SELECTED_CLASS_COLLECTION_NAME)
            .find_one(by_id(id), None)
            .await
            .map_err(Problem::from)?
            .ok_or_else(|| problem::not_found(id))
    }

    async fn list_selections(&self, page: PageState) -> Result<Vec<SelectedClass>, Problem> {
        let options = FindOptions::builder()
            .skip(page.skip())
            .limit(page.limit())
            .build();

        let cursor = self
            .collection::<Document>(SELECTED_CLASS_COLLECTION_NAME)
            .find(None, options)
            .await
            .map_err(Problem::from)?;

        Ok(collect_documents(cursor).await)
    }

    async fn remove_selection(&self, id: Uuid) -> Result<u64, Problem> {
        let result = self
            .collection::<Document>(SELECTED_CLASS_COLLECTION_NAME)
            .delete_one(by_id(id), None)
            .await
            .map_err(Problem::from)?;

        Ok(result.deleted_count)
    }
}
