use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode, Uri},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full application router with global layers applied
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let body_limit = state.config.server.max_request_size_bytes;

    Router::new()
        // Public
        .route("/health", get(public::health::health))
        .merge(auth_public_routes())
        .merge(post_routes(state.clone()))
        // Protected
        .merge(user_routes(state.clone()))
        .merge(document_routes(state.clone()))
        .fallback(not_found)
        // Global middleware
        .layer(middleware::map_response(method_not_allowed))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use public::auth;

    Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
}

fn post_routes(state: AppState) -> Router<AppState> {
    // Reads are public, liking requires a token
    let liking = Router::new()
        .route("/api/posts/:id/like", post(protected::posts::like))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    Router::new()
        .route("/api/posts", get(public::posts::list))
        .route("/api/posts/:id", get(public::posts::get))
        .merge(liking)
}

fn user_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/users/profile", get(protected::users::profile))
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn document_routes(state: AppState) -> Router<AppState> {
    use protected::documents;

    // Static segments win over `:id`, so upload/list/stats/search never reach the id handlers
    Router::new()
        .route("/api/documents/upload", post(documents::upload))
        .route("/api/documents/list", get(documents::list))
        .route("/api/documents/stats", get(documents::stats))
        .route("/api/documents/search", get(documents::search))
        .route(
            "/api/documents/:id",
            get(documents::get)
                .put(documents::update)
                .delete(documents::delete),
        )
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    if config.cors_permissive() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("The requested endpoint {} does not exist", uri.path()))
}

/// Replace the router's empty 405 with the JSON error envelope, keeping `Allow`.
async fn method_not_allowed(response: Response) -> Response {
    if response.status() != StatusCode::METHOD_NOT_ALLOWED {
        return response;
    }

    let allow = response.headers().get(header::ALLOW).cloned();
    let mut json = ApiError::method_not_allowed("Method not allowed for this endpoint").into_response();
    if let Some(allow) = allow {
        json.headers_mut().insert(header::ALLOW, allow);
    }
    json
}
