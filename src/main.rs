use axum::{
    middleware,
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod ai;
mod auth;
mod config;
mod db;
mod dto;
mod error;
mod handlers;
mod models;
mod pdf;

use ai::client::AiClient;
use config::Config;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
    pub ai: AiClient,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wellspring_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    // Database
    let db = db::create_pool(&config.database_url).await;

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    tracing::info!("Database migrations applied");

    let ai = AiClient::from_config(&config);
    if ai.mock_mode {
        tracing::info!("AI client running in mock mode");
    }

    let state = AppState {
        db,
        config: config.clone(),
        ai,
    };

    let public_routes = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh));

    let protected_routes = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/me", get(handlers::auth::me))
        // Goals
        .route("/api/goals", post(handlers::goals::create_goal))
        .route("/api/goals", get(handlers::goals::list_goals))
        .route("/api/goals/active", get(handlers::goals::list_active_goals))
        .route("/api/goals/count", get(handlers::goals::count_active_goals))
        .route(
            "/api/goals/streaks",
            get(handlers::goals::list_goals_with_streak),
        )
        .route(
            "/api/goals/:id/progress",
            post(handlers::goals::record_progress),
        )
        .route(
            "/api/goals/:id/status",
            patch(handlers::goals::update_goal_status),
        )
        .route("/api/goals/:id", delete(handlers::goals::delete_goal))
        // Moods
        .route("/api/moods", post(handlers::moods::create_mood_entry))
        .route("/api/moods", get(handlers::moods::list_mood_entries))
        .route(
            "/api/moods/range",
            get(handlers::moods::list_mood_entries_by_range),
        )
        .route("/api/moods/average", get(handlers::moods::get_average_mood))
        .route("/api/moods/trends", get(handlers::moods::get_mood_trends))
        .route("/api/moods/:id", delete(handlers::moods::delete_mood_entry))
        // Journals
        .route(
            "/api/journals",
            post(handlers::journals::create_journal_entry),
        )
        .route("/api/journals", get(handlers::journals::list_journal_entries))
        .route(
            "/api/journals/favorites",
            get(handlers::journals::list_favorite_journal_entries),
        )
        .route("/api/journals/:id", get(handlers::journals::get_journal_entry))
        .route(
            "/api/journals/:id",
            put(handlers::journals::update_journal_entry),
        )
        .route(
            "/api/journals/:id",
            delete(handlers::journals::delete_journal_entry),
        )
        // AI
        .route("/api/ai/chat", post(handlers::ai::chat))
        .route("/api/ai/reports", post(handlers::ai::generate_report))
        // Reports
        .route("/api/reports", get(handlers::reports::list_reports))
        .route(
            "/api/reports/type/:report_type",
            get(handlers::reports::list_reports_by_type),
        )
        .route("/api/reports/:id", get(handlers::reports::get_report))
        .route(
            "/api/reports/:id/download",
            get(handlers::reports::download_report_pdf),
        )
        .route("/api/reports/:id", delete(handlers::reports::delete_report))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::require_auth,
        ));

    let allowed_origins: Vec<axum::http::HeaderValue> = {
        let mut origins = vec![config
            .frontend_url
            .parse::<axum::http::HeaderValue>()
            .expect("FRONTEND_URL must be a valid origin")];
        // In dev, also allow LAN access (e.g. testing from another device)
        if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
            for o in extra.split(',') {
                if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                    origins.push(hv);
                }
            }
        }
        origins
    };
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::PATCH,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind listen address");
    axum::serve(listener, app)
        .await
        .expect("Server crashed");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let config = Arc::new(Config {
            database_url: String::new(),
            host: "127.0.0.1".into(),
            port: 0,
            frontend_url: "http://localhost:3000".into(),
            jwt_secret: "test-secret".into(),
            jwt_access_ttl_secs: 900,
            jwt_refresh_ttl_secs: 604800,
            ai_api_key: String::new(),
            ai_model: "gpt-4".into(),
            ai_mock_mode: true,
            ai_timeout_secs: 30,
            ai_max_retries: 3,
            ai_temperature: 0.7,
            ai_max_tokens: 1000,
        });
        // Lazy pool: no connection is made unless a handler touches the DB
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/wellspring_test")
            .expect("lazy pool");
        let ai = AiClient::from_config(&config);
        AppState { db, config, ai }
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = Router::new()
            .route("/health", get(handlers::health::health_check))
            .with_state(test_state());

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ok");
        assert_eq!(json["service"], "wellspring-api");
    }

    #[tokio::test]
    async fn test_protected_route_rejects_missing_token() {
        let state = test_state();
        let app = Router::new()
            .route("/api/goals", get(handlers::goals::list_goals))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                auth::middleware::require_auth,
            ))
            .with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/goals")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_protected_route_rejects_garbage_token() {
        let state = test_state();
        let app = Router::new()
            .route("/api/goals", get(handlers::goals::list_goals))
            .layer(middleware::from_fn_with_state(
                state.clone(),
                auth::middleware::require_auth,
            ))
            .with_state(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/goals")
                    .header("Authorization", "Bearer not-a-valid-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
