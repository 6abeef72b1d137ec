//! Request extractors shared by the business routes.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

/// Header that scopes every business request to one branch.
pub const BRANCH_HEADER: &str = "x-branch-id";

const BRANCH_MISSING: &str = "Branch ID not found. Include 'X-Branch-ID' header";

/// Branch id taken from the `X-Branch-ID` header.
///
/// A missing, unparsable or non-positive header rejects the request with
/// 400 before the handler runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchId(pub i64);

impl<S> FromRequestParts<S> for BranchId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(BRANCH_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<i64>().ok())
            .filter(|id| *id > 0)
            .map(BranchId)
            .ok_or_else(|| ApiError::bad_request(BRANCH_MISSING))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    async fn extract(header: Option<&str>) -> Result<BranchId, ApiError> {
        let mut builder = Request::builder().uri("/api/v1/orders");
        if let Some(value) = header {
            builder = builder.header("X-Branch-ID", value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        BranchId::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_reads_header() {
        assert_eq!(extract(Some("3")).await.unwrap(), BranchId(3));
    }

    #[tokio::test]
    async fn test_missing_or_zero_rejected() {
        for header in [None, Some("0"), Some("abc"), Some("-2")] {
            let err = extract(header).await.unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.message, BRANCH_MISSING);
        }
    }
}
