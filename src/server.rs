use axum::{
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post, MethodRouter},
    Router,
};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use crate::config::{self, SecurityConfig};
use crate::database::DatabaseManager;
use crate::handlers::{protected, public};
use crate::middleware::{access_token_middleware, ACCESS_TOKEN_HEADER};

/// Full application router: API routes, static fallback and global middleware
pub fn app() -> Router {
    let settings = config::config();

    let mut router = Router::new()
        .route("/health", get(health))
        .merge(public_routes())
        .merge(protected_routes())
        .fallback_service(ServeDir::new(&settings.api.static_dir))
        .layer(RequestBodyLimitLayer::new(settings.api.max_request_size_bytes));

    if settings.security.enable_cors {
        router = router.layer(cors_layer(&settings.security));
    }

    if settings.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router
}

fn public_routes() -> Router {
    Router::new()
        .route("/sign-up", post(public::sign_up))
        .route("/sign-in", post(public::sign_in))
        .route("/update-token", post(public::update_token))
}

fn protected_routes() -> Router {
    Router::new()
        .route("/log-out", authed(post(protected::log_out)))
        .route("/add-note", authed(post(protected::add_note)))
        .route("/update-note", authed(post(protected::update_note)))
        .route("/delete-note", authed(post(protected::delete_note)))
        .route("/get-all-notes", authed(get(protected::get_all_notes)))
}

/// Token check on the method handlers only; the 405 fallback stays unwrapped
fn authed(method_router: MethodRouter) -> MethodRouter {
    method_router.route_layer(axum::middleware::from_fn(access_token_middleware))
}

fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    if crate::is_development!() {
        return CorsLayer::permissive();
    }

    let origins = security
        .cors_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(ACCESS_TOKEN_HEADER),
        ])
}

async fn health() -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

/// Bind the configured port and serve until Ctrl-C
pub async fn serve() -> anyhow::Result<()> {
    let settings = config::config();
    let bind_addr = format!("0.0.0.0:{}", settings.api.port);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(|e| anyhow::anyhow!("failed to bind {}: {}", bind_addr, e))?;

    tracing::info!("Clever Notes listening on http://{}", bind_addr);

    axum::serve(listener, app())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    DatabaseManager::close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
