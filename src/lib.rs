use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

pub mod routes;

// --- Public Re-exports ---

pub use auth::{AuthDecision, AuthGuard, KeySource, RemoteKeySet, StaticKeySet};
pub use config::AppConfig;
pub use error::{ApiError, AuthError};
pub use repository::{InMemoryRepository, PostgresRepository, RepositoryState};
pub use service::DrinkService;

/// ApiDoc
///
/// OpenAPI document for the drink endpoints, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_drinks, handlers::get_drinks_detail, handlers::create_drink,
        handlers::update_drink, handlers::delete_drink
    ),
    components(
        schemas(
            models::Drink, models::DrinkSummary, models::Ingredient, models::IngredientSummary,
            models::CreateDrinkRequest, models::UpdateDrinkRequest, models::RecipeInput,
            models::DrinkSummaryList, models::DrinkDetailList, models::DeleteResponse,
            error::ErrorBody,
        )
    ),
    modifiers(&BearerSecurity),
    tags(
        (name = "coffee-shop", description = "Coffee shop menu API")
    )
)]
struct ApiDoc;

/// Registers the `bearer` scheme referenced by the protected paths.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// AppState
///
/// Everything a request may need, built once at startup and cloned per request.
/// The database handle lives inside `DrinkService`; nothing is looked up globally.
#[derive(Clone)]
pub struct AppState {
    /// Drink operations over the injected repository.
    pub drinks: DrinkService,
    /// Token verification and permission checks, shared by every permission gate.
    pub auth: AuthGuard,
}

impl AppState {
    pub fn new(repo: RepositoryState, auth: AuthGuard) -> Self {
        Self {
            drinks: DrinkService::new(repo),
            auth,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// Lets handlers take `State<DrinkService>` instead of the whole state.
impl FromRef<AppState> for DrinkService {
    fn from_ref(app_state: &AppState) -> DrinkService {
        app_state.drinks.clone()
    }
}

/// create_router
///
/// Assembles the routes, the JSON fallbacks and the observability layers.
pub fn create_router(state: AppState) -> Router {
    // The web frontend is served from another origin.
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(routes::drinks::drink_routes(&state.auth))
        // Framework-level failures use the same JSON error body as the handlers.
        .method_not_allowed_fallback(handlers::method_not_allowed)
        .fallback(handlers::not_found)
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one request, carrying method, URI and the `x-request-id` so every
/// log line of the request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
