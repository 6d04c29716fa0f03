//! Query string extractor with `validator` checks.

use crate::errors::AppError;
use axum::{
    extract::{FromRequestParts, Query},
    http::request::Parts,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use validator::Validate;

/// [`ValidatedJson`](super::ValidatedJson) for the query string, e.g.
/// pagination parameters.
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(data) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::from(e).into_response())?;

        data.validate()
            .map_err(|e| AppError::from(e).into_response())?;

        Ok(ValidatedQuery(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, body::Body, http::Request, http::StatusCode, routing::get};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Page {
        #[validate(range(min = 1))]
        limit: Option<u64>,
    }

    async fn handler(ValidatedQuery(page): ValidatedQuery<Page>) -> String {
        page.limit.unwrap_or(10).to_string()
    }

    async fn status_for(uri: &str) -> StatusCode {
        Router::new()
            .route("/", get(handler))
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_valid_and_missing_query() {
        assert_eq!(status_for("/?limit=5").await, StatusCode::OK);
        assert_eq!(status_for("/").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rule_violation_is_bad_request() {
        assert_eq!(status_for("/?limit=0").await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_unparsable_query_is_bad_request() {
        assert_eq!(status_for("/?limit=-3").await, StatusCode::BAD_REQUEST);
    }
}
