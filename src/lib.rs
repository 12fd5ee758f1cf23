pub mod auth;
pub mod db;
pub mod entities;
pub mod error;
pub mod geo;
pub mod routes;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::sync::Arc;
// Conditionally import SwaggerUi only when needed (not test)
#[cfg(not(test))]
use utoipa_swagger_ui::SwaggerUi;
use utoipa::{Modify, OpenApi};
// Conditionally import CORS only when needed (not test)
#[cfg(not(test))]
use tower_http::cors::{Any, CorsLayer};
// Conditionally import Governor only when needed (not test)
#[cfg(not(test))]
use std::num::NonZeroU32;
#[cfg(not(test))]
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};

use crate::auth::{jwt_auth_middleware, JwtService};

/// Shared application state: database handle plus the JWT service.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub jwt: Arc<JwtService>,
}

/// Health check: reports whether the database answers a ping
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up; body reports database reachability")
    )
)]
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let db_status = match state.db.ping().await {
        Ok(()) => "connected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "database": db_status,
            "timestamp": Utc::now().to_rfc3339(),
            "service": "helpmap_backend",
        })),
    )
}

/// Welcome message and a map of the available endpoints
#[utoipa::path(
    get,
    path = "/api/overview",
    responses(
        (status = 200, description = "Endpoint map")
    )
)]
async fn api_overview() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to the mutual aid map API!",
        "endpoints": {
            "funds": "/api/funds",
            "help-requests": "/api/help-requests",
            "fundraisers": "/api/fundraisers",
            "register": "/api/auth/register",
            "login": "/api/auth/login",
            "profile": "/api/auth/profile",
            "my-requests": "/api/my-requests",
            "my-funds": "/api/my-funds",
            "admin-pending-funds": "/api/admin/pending-funds",
        }
    }))
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Mutual Aid Map API",
        version = "0.1.0"
    ),
    paths(
        health_check,
        api_overview,
        routes::auth::register,
        routes::auth::login,
        routes::auth::refresh_token,
        routes::auth::get_profile,
        routes::auth::update_profile,
        routes::funds::list_funds,
        routes::funds::get_fund,
        routes::funds::create_fund,
        routes::funds::update_fund,
        routes::funds::delete_fund,
        routes::funds::approve_fund,
        routes::funds::reject_fund,
        routes::funds::my_funds,
        routes::funds::pending_funds,
        routes::fundraisers::list_fundraisers,
        routes::fundraisers::get_fundraiser,
        routes::fundraisers::create_fundraiser,
        routes::fundraisers::update_fundraiser,
        routes::fundraisers::delete_fundraiser,
        routes::fundraisers::my_fundraisers,
        routes::help_requests::list_help_requests,
        routes::help_requests::nearby_help_requests,
        routes::help_requests::get_help_request,
        routes::help_requests::create_help_request,
        routes::help_requests::create_my_help_request,
        routes::help_requests::update_help_request,
        routes::help_requests::delete_help_request,
        routes::help_requests::my_requests,
    ),
    components(schemas(
        entities::UserRole,
        entities::FundStatus,
        entities::FundraiserStatus,
        entities::RequestCategory,
        entities::RequestUrgency,
        routes::auth::RegisterRequest,
        routes::auth::LoginRequest,
        routes::auth::LoginUser,
        routes::auth::LoginResponse,
        routes::auth::RefreshRequest,
        routes::auth::RefreshResponse,
        routes::auth::ProfileResponse,
        routes::auth::UpdateProfileRequest,
        routes::funds::FundResponse,
        routes::funds::CreateFundRequest,
        routes::funds::UpdateFundRequest,
        routes::funds::RejectFundRequest,
        routes::fundraisers::FundraiserResponse,
        routes::fundraisers::CreateFundraiserRequest,
        routes::fundraisers::UpdateFundraiserRequest,
        routes::help_requests::HelpRequestResponse,
        routes::help_requests::CreateHelpRequestRequest,
        routes::help_requests::UpdateHelpRequestRequest,
    )),
    modifiers(&SecurityAddon)
)]
struct ApiDoc;

/// Create the application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // Build our API documentation (needed regardless for ApiDoc::openapi())
    let api_doc = ApiDoc::openapi();

    // --- Define API routes separately ---
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/overview", get(api_overview))
        .route("/auth/register", post(routes::auth::register))
        .route("/auth/login", post(routes::auth::login))
        .route("/auth/token/refresh", post(routes::auth::refresh_token))
        .route(
            "/auth/profile",
            get(routes::auth::get_profile)
                .put(routes::auth::update_profile)
                .patch(routes::auth::update_profile),
        )
        .route(
            "/funds",
            get(routes::funds::list_funds).post(routes::funds::create_fund),
        )
        .route(
            "/funds/{id}",
            get(routes::funds::get_fund)
                .put(routes::funds::update_fund)
                .delete(routes::funds::delete_fund),
        )
        .route("/funds/{id}/approve", post(routes::funds::approve_fund))
        .route("/funds/{id}/reject", post(routes::funds::reject_fund))
        .route("/my-funds", get(routes::funds::my_funds))
        .route("/admin/pending-funds", get(routes::funds::pending_funds))
        .route(
            "/fundraisers",
            get(routes::fundraisers::list_fundraisers).post(routes::fundraisers::create_fundraiser),
        )
        .route(
            "/fundraisers/{id}",
            get(routes::fundraisers::get_fundraiser)
                .put(routes::fundraisers::update_fundraiser)
                .delete(routes::fundraisers::delete_fundraiser),
        )
        .route("/my-fundraisers", get(routes::fundraisers::my_fundraisers))
        .route(
            "/help-requests",
            get(routes::help_requests::list_help_requests)
                .post(routes::help_requests::create_help_request),
        )
        .route(
            "/help-requests/nearby",
            get(routes::help_requests::nearby_help_requests),
        )
        .route(
            "/help-requests/{id}",
            get(routes::help_requests::get_help_request)
                .put(routes::help_requests::update_help_request)
                .delete(routes::help_requests::delete_help_request),
        )
        .route(
            "/requests/create",
            post(routes::help_requests::create_my_help_request),
        )
        .route("/my-requests", get(routes::help_requests::my_requests))
        .layer(axum::middleware::from_fn_with_state(
            state.jwt.clone(),
            jwt_auth_middleware,
        ))
        .with_state(state);

    let api_routes = Router::new().nest("/api", api_routes);

    // --- Conditionally apply layers and Swagger UI only when NOT running tests ---
    #[cfg(not(test))]
    let (docs_router, rate_limited_api_routes) = {
        // Create Swagger UI router
        let docs_router = SwaggerUi::new("/docs").url("/api-doc/openapi.json", api_doc);

        // Configure Rate Limiting
        let governor_conf = Arc::new(
            GovernorConfigBuilder::default()
                .key_extractor(SmartIpKeyExtractor)
                .period(std::time::Duration::from_secs(60))
                .burst_size(NonZeroU32::new(10).unwrap().into())
                .finish()
                .unwrap(),
        );
        // Apply Governor layer ONLY to the api_routes defined above
        let rate_limited_api_routes = api_routes.layer(GovernorLayer { config: governor_conf });

        (Router::new().merge(docs_router), rate_limited_api_routes)
    };

    // For test builds, use the original api_routes and an empty router for docs
    #[cfg(test)]
    let (docs_router, rate_limited_api_routes) = {
        let _ = api_doc;
        (Router::new(), api_routes)
    };

    // --- Build the final application router ---
    #[allow(unused_mut)]
    let mut app = Router::new()
        .merge(rate_limited_api_routes)
        .merge(docs_router);

    // --- Apply CORS to the whole app (both API and docs) if needed ---
    #[cfg(not(test))]
    {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    // Return the final router
    app
}
