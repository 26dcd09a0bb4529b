//! Request extractors that report framework rejections through `ApiError`,
//! so malformed requests get the same JSON error body as everything else.

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// ApiJson
///
/// `Json<T>` whose rejections (unparsable body, wrong content type, missing or
/// mistyped fields) all become a 400.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                tracing::debug!(reason = %rejection.body_text(), "rejected request body");
                Err(ApiError::BadRequest)
            }
        }
    }
}

/// DrinkId
///
/// The `{drink_id}` path segment. Anything that is not an integer cannot name a
/// drink, so it is reported as not found.
pub struct DrinkId(pub i32);

impl<S> FromRequestParts<S> for DrinkId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<i32>::from_request_parts(parts, state)
            .await
            .map(|Path(id)| DrinkId(id))
            .map_err(|_| ApiError::NotFound)
    }
}
