use std::convert::Infallible;

use rocket::request::{FromRequest, Outcome, Request};

/// Optional paging derived from `?page=`/`?len=` (or `?p=`/`?l=`) query
/// parameters. When no page is requested the listing is returned whole,
/// which the public catalogue routes rely on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PageState {
    pub page: Option<u32>,
    pub page_length: u32,
}

impl Default for PageState {
    fn default() -> Self {
        PageState {
            page: None,
            page_length: 20,
        }
    }
}

impl PageState {
    pub fn skip(&self) -> Option<u64> {
        self.page.map(|p| p as u64 * self.page_length as u64)
    }

    pub fn limit(&self) -> Option<i64> {
        self.page.map(|_| self.page_length as i64)
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for PageState {
    type Error = Infallible;

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let length: Option<u32> = request
            .query_value("len")
            .map(|it| it.ok())
            .flatten()
            .or_else(|| request.query_value("l").map(|it| it.ok()).flatten());

        let page: Option<u32> = request
            .query_value("page")
            .map(|it| it.ok())
            .flatten()
            .or_else(|| request.query_value("p").map(|it| it.ok()).flatten());

        Outcome::Success(PageState {
            page,
            page_length: length.unwrap_or(20),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_page_means_unlimited() {
        let state = PageState::default();
        assert_eq!(state.skip(), None);
        assert_eq!(state.limit(), None);
    }

    #[test]
    fn paging_math_skips_whole_pages() {
        let state = PageState {
            page: Some(2),
            page_length: 25,
        };
        assert_eq!(state.skip(), Some(50));
        assert_eq!(state.limit(), Some(25));
    }

    #[test]
    fn first_page_starts_at_zero() {
        let state = PageState {
            page: Some(0),
            page_length: 20,
        };
        assert_eq!(state.skip(), Some(0));
        assert_eq!(state.limit(), Some(20));
    }
}
