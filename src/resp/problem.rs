use std::fmt::{Display, Formatter};
use std::io::Cursor;

use rocket::http::hyper::header::CONTENT_LANGUAGE;
use rocket::http::{ContentType, Status};
use rocket::response::Responder;
use rocket::{response, Request, Response};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Implements [RFC7807](https://tools.ietf.org/html/rfc7807).
///
/// Every error path in the API surfaces as one of these, so clients always
/// receive `application/problem+json` with a `status`, a `title`, and
/// whatever extra fields the failing operation attaches to `body`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Problem {
    #[serde(skip)]
    pub status: Status,
    pub title: String,
    pub detail: Option<String>,

    #[schema(value_type = Object)]
    pub body: Map<String, Value>,
}

impl Default for Problem {
    fn default() -> Self {
        Problem {
            status: Status::InternalServerError,
            title: "Problem".to_string(),
            detail: None,
            body: Map::new(),
        }
    }
}

impl Problem {
    pub fn new_untyped(status: Status, title: impl ToString) -> Problem {
        Problem {
            status,
            title: title.to_string(),
            ..Default::default()
        }
    }

    pub fn detail(&mut self, value: impl ToString) -> &mut Problem {
        self.detail = Some(value.to_string());
        self
    }

    pub fn insert<V: Serialize>(&mut self, key: impl ToString, value: V) -> &mut Problem {
        self.body.insert(
            key.to_string(),
            serde_json::to_value(value).expect("data must be JSON serializable"),
        );
        self
    }

    pub fn insert_str(&mut self, key: impl ToString, value: impl ToString) -> &mut Problem {
        self.body
            .insert(key.to_string(), Value::String(value.to_string()));
        self
    }
}

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status, self.title)
    }
}

impl std::error::Error for Problem {}

impl<'r> Responder<'r, 'static> for Problem {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let mut body = self.body.clone();

        // Members required by rfc7807; "type" stays "about:blank" since
        // problem types aren't given dedicated URIs.
        body.insert(String::from("type"), Value::from("about:blank"));
        body.insert(String::from("title"), Value::from(self.title));
        body.insert(String::from("status"), Value::from(self.status.code));
        if let Some(detail) = self.detail {
            body.insert(String::from("detail"), Value::from(detail));
        }

        let body_string = serde_json::to_string(&body)
            .expect("JSON map keys and values must be JSON serializable");

        Response::build()
            .status(self.status)
            .header(ContentType::new("application", "problem+json"))
            .raw_header(CONTENT_LANGUAGE.as_str(), "en")
            .sized_body(body_string.len(), Cursor::new(body_string))
            .ok()
    }
}

pub mod problems {
    use crate::resp::problem::Problem;
    use rocket::http::Status;

    #[inline]
    pub fn parse_problem() -> Problem {
        Problem::new_untyped(
            Status::BadRequest,
            "There was a problem parsing part of the request.",
        )
    }

    #[inline]
    pub fn validation_problem(detail: impl ToString) -> Problem {
        Problem::new_untyped(Status::BadRequest, "Request payload failed validation.")
            .detail(detail)
            .clone()
    }
}

impl From<mongodb::error::Error> for Problem {
    fn from(e: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        let title = match e.kind.as_ref() {
            ErrorKind::Authentication { .. }
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::ServerSelection { .. }
            | ErrorKind::InvalidTlsConfig { .. }
            | ErrorKind::IncompatibleServer { .. } => "Server was unable to access the database.",
            ErrorKind::InvalidArgument { .. }
            | ErrorKind::BulkWrite(_)
            | ErrorKind::Command(_) => "Database was unable to process bad server request.",
            ErrorKind::BsonDeserialization(_) | ErrorKind::BsonSerialization(_) => {
                "There was a problem with handling stored document data."
            }
            ErrorKind::Write(_) => "A write error occurred. Submitted data might not be stored.",
            _ => "Database failed while processing request.",
        };

        Problem::new_untyped(Status::InternalServerError, title)
    }
}

impl From<bson::de::Error> for Problem {
    fn from(_: bson::de::Error) -> Self {
        Problem::new_untyped(
            Status::InternalServerError,
            "An error occurred while processing BSON data.",
        )
    }
}

impl From<serde_json::Error> for Problem {
    fn from(_: serde_json::Error) -> Self {
        Problem::new_untyped(
            Status::InternalServerError,
            "An error occurred while processing JSON data.",
        )
    }
}

impl From<jsonwebtoken::errors::Error> for Problem {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match e.into_kind() {
            ErrorKind::ExpiredSignature => {
                Problem::new_untyped(Status::Unauthorized, "Expired JWT signature.")
            }
            _ => Problem::new_untyped(Status::Unauthorized, "Error while handling JWT."),
        }
    }
}

impl From<std::io::Error> for Problem {
    fn from(_: std::io::Error) -> Self {
        Problem::new_untyped(Status::InternalServerError, "Server IO error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expired_token_maps_to_unauthorized() {
        let err = jsonwebtoken::errors::Error::from(
            jsonwebtoken::errors::ErrorKind::ExpiredSignature,
        );
        let problem = Problem::from(err);
        assert_eq!(problem.status, Status::Unauthorized);
        assert_eq!(problem.title, "Expired JWT signature.");
    }

    #[test]
    fn body_fields_survive_insert() {
        let problem = Problem::new_untyped(Status::Conflict, "No seats remaining.")
            .insert("seats", 0)
            .clone();
        assert_eq!(problem.body.get("seats"), Some(&Value::from(0)));
    }
}
