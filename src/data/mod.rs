use bson::spec::BinarySubtype;
use bson::{doc, Bson, Document};
use mongodb::Cursor;
use rocket::futures::StreamExt;
use serde::de::DeserializeOwned;
use uuid::Uuid;

pub mod class;
pub mod payment;
pub mod selection;
pub mod user;

/// Filter matching a document by its binary-UUID `_id`.
#[inline]
pub(crate) fn by_id(id: Uuid) -> Document {
    doc! {
        "_id": Bson::Binary(bson::Binary {
            subtype: BinarySubtype::Uuid,
            bytes: id.as_bytes().to_vec(),
        })
    }
}

/// Drain a document cursor into typed records. Documents that no longer
/// match the expected shape are skipped with a warning instead of failing
/// the whole listing.
pub(crate) async fn collect_documents<T: DeserializeOwned>(mut cursor: Cursor<Document>) -> Vec<T> {
    let mut records: Vec<T> = vec![];

    while let Some(result) = cursor.next().await {
        match result {
            Ok(document) => match bson::from_bson(Bson::Document(document)) {
                Ok(record) => records.push(record),
                Err(_) => {
                    tracing::warn!("Unable to deserialize stored document.")
                }
            },
            Err(e) => {
                tracing::warn!("Cursor failed while listing documents: {}", e)
            }
        }
    }

    records
}
