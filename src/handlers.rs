use crate::{
    auth::AuthDecision,
    error::{ApiError, ErrorBody},
    extractors::{ApiJson, DrinkId},
    models::{CreateDrinkRequest, DeleteResponse, DrinkDetailList, DrinkSummaryList, UpdateDrinkRequest},
    service::DrinkService,
};
use axum::{Extension, Json, extract::State};

// Every success answers 200, including creation.

/// get_drinks
///
/// [Public Route] Lists every drink in summary projection (no `parts`).
#[utoipa::path(
    get,
    path = "/drinks",
    responses(
        (status = 200, description = "Menu", body = DrinkSummaryList),
        (status = 404, description = "No drinks yet", body = ErrorBody),
        (status = 422, description = "Unprocessable", body = ErrorBody)
    )
)]
pub async fn get_drinks(
    State(drinks): State<DrinkService>,
) -> Result<Json<DrinkSummaryList>, ApiError> {
    let summaries = drinks.list_summary().await?;
    Ok(Json(summaries.into()))
}

/// get_drinks_detail
///
/// [`get:drinks-detail`] Lists every drink with its full recipe.
#[utoipa::path(
    get,
    path = "/drinks-detail",
    responses(
        (status = 200, description = "Menu with recipes", body = DrinkDetailList),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Permission not granted", body = ErrorBody),
        (status = 404, description = "No drinks yet", body = ErrorBody)
    ),
    security(("bearer" = ["get:drinks-detail"]))
)]
pub async fn get_drinks_detail(
    Extension(_auth): Extension<AuthDecision>,
    State(drinks): State<DrinkService>,
) -> Result<Json<DrinkDetailList>, ApiError> {
    let details = drinks.list_detail().await?;
    Ok(Json(details.into()))
}

/// create_drink
///
/// [`post:drinks`] Adds a drink. Answers with the whole menu, not just the new row.
#[utoipa::path(
    post,
    path = "/drinks",
    request_body = CreateDrinkRequest,
    responses(
        (status = 200, description = "Created; full menu", body = DrinkDetailList),
        (status = 400, description = "Malformed body", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Permission not granted", body = ErrorBody),
        (status = 422, description = "Rejected drink", body = ErrorBody)
    ),
    security(("bearer" = ["post:drinks"]))
)]
pub async fn create_drink(
    Extension(auth): Extension<AuthDecision>,
    State(drinks): State<DrinkService>,
    ApiJson(payload): ApiJson<CreateDrinkRequest>,
) -> Result<Json<DrinkDetailList>, ApiError> {
    tracing::debug!(subject = ?auth.subject(), title = %payload.title, "create drink");
    let menu = drinks.create(payload).await?;
    Ok(Json(menu.into()))
}

/// update_drink
///
/// [`patch:drinks`] Replaces the supplied fields of one drink. Answers with the whole menu.
#[utoipa::path(
    patch,
    path = "/drinks/{drink_id}",
    params(("drink_id" = i32, Path, description = "Drink ID")),
    request_body = UpdateDrinkRequest,
    responses(
        (status = 200, description = "Updated; full menu", body = DrinkDetailList),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Permission not granted", body = ErrorBody),
        (status = 404, description = "Unknown drink", body = ErrorBody),
        (status = 422, description = "Rejected drink", body = ErrorBody)
    ),
    security(("bearer" = ["patch:drinks"]))
)]
pub async fn update_drink(
    Extension(auth): Extension<AuthDecision>,
    State(drinks): State<DrinkService>,
    DrinkId(id): DrinkId,
    ApiJson(payload): ApiJson<UpdateDrinkRequest>,
) -> Result<Json<DrinkDetailList>, ApiError> {
    tracing::debug!(subject = ?auth.subject(), drink_id = id, "update drink");
    let menu = drinks.update(id, payload).await?;
    Ok(Json(menu.into()))
}

/// delete_drink
///
/// [`delete:drinks`] Removes one drink for good. Answers with the removed id only.
#[utoipa::path(
    delete,
    path = "/drinks/{drink_id}",
    params(("drink_id" = i32, Path, description = "Drink ID")),
    responses(
        (status = 200, description = "Deleted", body = DeleteResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 403, description = "Permission not granted", body = ErrorBody),
        (status = 404, description = "Unknown drink", body = ErrorBody)
    ),
    security(("bearer" = ["delete:drinks"]))
)]
pub async fn delete_drink(
    Extension(auth): Extension<AuthDecision>,
    State(drinks): State<DrinkService>,
    DrinkId(id): DrinkId,
) -> Result<Json<DeleteResponse>, ApiError> {
    tracing::debug!(subject = ?auth.subject(), drink_id = id, "delete drink");
    let deleted = drinks.delete(id).await?;
    Ok(Json(DeleteResponse {
        success: true,
        delete: deleted,
    }))
}

/// Known path, unsupported verb.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Unknown path.
pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
