use crate::{
    AppState,
    auth::{AuthGuard, PermissionGate, require_permission},
    handlers,
};
use axum::{
    Router,
    handler::Handler,
    middleware,
    routing::{get, patch},
};

/// Drink Router
///
/// | Method | Path | Permission |
/// |---|---|---|
/// | GET | `/drinks` | none |
/// | GET | `/drinks-detail` | `get:drinks-detail` |
/// | POST | `/drinks` | `post:drinks` |
/// | PATCH | `/drinks/{drink_id}` | `patch:drinks` |
/// | DELETE | `/drinks/{drink_id}` | `delete:drinks` |
pub fn drink_routes(guard: &AuthGuard) -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers; no auth, no database.
        .route("/health", get(|| async { "ok" }))
        .route(
            "/drinks",
            get(handlers::get_drinks).post(handlers::create_drink.layer(
                middleware::from_fn_with_state(
                    PermissionGate::new(guard.clone(), "post:drinks"),
                    require_permission,
                ),
            )),
        )
        .route(
            "/drinks-detail",
            get(handlers::get_drinks_detail.layer(middleware::from_fn_with_state(
                PermissionGate::new(guard.clone(), "get:drinks-detail"),
                require_permission,
            ))),
        )
        .route(
            "/drinks/{drink_id}",
            patch(handlers::update_drink.layer(middleware::from_fn_with_state(
                PermissionGate::new(guard.clone(), "patch:drinks"),
                require_permission,
            )))
            .delete(handlers::delete_drink.layer(middleware::from_fn_with_state(
                PermissionGate::new(guard.clone(), "delete:drinks"),
                require_permission,
            ))),
        )
}
