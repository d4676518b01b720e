//! Verdant server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use tokio::signal;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use verdant_api::{middleware::AppState, router as api_router};
use verdant_common::{Config, LocalStorage};
use verdant_core::{
    ChatService, EventService, GroupService, MediaService, PostService, UserService,
};
use verdant_db::repositories::{
    ChatRepository, EventRepository, GroupRepository, MediaRepository, PostRepository,
    UserRepository,
};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verdant=debug,tower_http=debug".into()),
        )
        .init();

    info!("Starting verdant server...");

    // Load configuration
    let config = Config::load()?;

    // Connect to database
    let db = verdant_db::init(&config.database).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    verdant_db::migrate(&db).await?;
    info!("Migrations completed");

    // Local file storage for uploaded media
    tokio::fs::create_dir_all(&config.media.directory).await?;
    let storage = Arc::new(LocalStorage::new(
        config.media.directory.clone(),
        config.media.base_url.clone(),
    ));

    // Initialize repositories
    let db = Arc::new(db);
    let user_repo = UserRepository::new(Arc::clone(&db));
    let group_repo = GroupRepository::new(Arc::clone(&db));
    let event_repo = EventRepository::new(Arc::clone(&db));
    let post_repo = PostRepository::new(Arc::clone(&db));
    let media_repo = MediaRepository::new(Arc::clone(&db));
    let chat_repo = ChatRepository::new(Arc::clone(&db));

    // Initialize services
    let user_service = UserService::new(user_repo, config.session.token_max_age);
    let group_service = GroupService::new(group_repo.clone(), chat_repo.clone());
    let event_service = EventService::new(event_repo, group_repo);
    let media_service = MediaService::new(media_repo, storage);
    let post_service = PostService::new(post_repo, media_service.clone());
    let chat_service = ChatService::new(chat_repo);

    // Create app state
    let state = AppState {
        user_service,
        group_service,
        event_service,
        post_service,
        media_service,
        chat_service,
    };

    // Build router
    let mut app = Router::new()
        .nest("/api", api_router())
        .nest_service(
            &config.media.base_url,
            ServeDir::new(&config.media.directory),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            verdant_api::middleware::auth_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .with_state(state);

    if config.server.cors {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    // Start server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
