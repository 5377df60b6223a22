use std::sync::Arc;

use axum::{
    http::{header, Method},
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use walky_api::{config::Config, db, routes, services::token::TokenService, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(Config::from_env()?);

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;
    info!("Database connected and migrations applied");

    let tokens = Arc::new(TokenService::new(&config.jwt_secret, config.token_ttl));

    let state = AppState {
        db: pool,
        config: config.clone(),
        tokens: tokens.clone(),
    };

    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(Any);

    let app = Router::new()
        .route("/", get(routes::index::api_index))
        .route("/health", get(routes::health::health_check))
        // Auth
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/verify", get(routes::auth::verify_token))
        .route("/api/auth/check-session", post(routes::auth::check_session))
        .route("/api/auth/refresh-token", post(routes::auth::refresh_token))
        .route("/api/auth/logout", post(routes::auth::logout))
        // Users
        .route("/api/users", get(routes::users::list_users))
        .route("/api/users/search", get(routes::users::search_users))
        .route("/api/users/stats", get(routes::users::user_stats))
        .route(
            "/api/users/{id}",
            get(routes::users::get_user)
                .put(routes::users::update_user)
                .delete(routes::users::delete_user),
        )
        .route("/api/users/{id}/status", patch(routes::users::change_status))
        // Walker profiles
        .route("/api/walkers", get(routes::walkers::list_walkers))
        .route("/api/walkers/{id}", get(routes::walkers::get_walker))
        // Walks and walk map
        .route(
            "/api/walks",
            get(routes::walks::list_walks).post(routes::walks::create_walk),
        )
        .route("/api/walks/{id}", get(routes::walks::get_walk))
        .route("/api/walks/{id}/status", patch(routes::walks::update_status))
        .route("/api/walks/{id}/map", get(routes::walk_map::get_route))
        .route("/api/walks/{id}/map/location", post(routes::walk_map::save_location))
        .route(
            "/api/walks/{id}/map/availability",
            get(routes::walk_map::check_availability),
        )
        // Notifications
        .route("/api/notifications", get(routes::notifications::list_notifications))
        .route(
            "/api/notifications/unread-count",
            get(routes::notifications::unread_count),
        )
        .route(
            "/api/notifications/{id}/read",
            patch(routes::notifications::mark_read),
        )
        .route(
            "/api/notifications/read-all",
            post(routes::notifications::mark_all_read),
        )
        // Support tickets
        .route(
            "/api/tickets",
            get(routes::tickets::list_tickets).post(routes::tickets::create_ticket),
        )
        .route("/api/tickets/{id}", get(routes::tickets::get_ticket))
        .route("/api/tickets/{id}/status", patch(routes::tickets::update_status))
        // Banners
        .route(
            "/api/banners",
            get(routes::banners::list_active).post(routes::banners::create_banner),
        )
        .route("/api/banners/{id}", delete(routes::banners::delete_banner))
        // Reviews
        .route("/api/reviews", post(routes::reviews::create_review))
        .route("/api/reviews/walker/{id}", get(routes::reviews::list_for_walker))
        // Subscription settings
        .route(
            "/api/subscription",
            get(routes::subscription::get_settings).put(routes::subscription::update_settings),
        )
        .layer(axum::Extension(tokens))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("WalkyAPI listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
