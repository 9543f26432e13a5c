//! Resonate Development Server
//!
//! This is the full HTTP server for the Resonate backend with all API
//! endpoints enabled. Backends are selected from the environment: Postgres,
//! Redis, and SMTP when configured, with in-memory and log-only stand-ins
//! otherwise, so the server runs locally with no infrastructure at all.
//!
//! For deployments with custom router configurations, use the RouterBuilder
//! in your own application.

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use dotenv::dotenv;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use resonate::{
    api::{create_routes, AppState},
    config::AppConfig,
    media::PassthroughUploader,
    service::{
        AuthService, LogNotifier, Notifier, ResetTokenStore, SessionService, SmtpNotifier,
        TrackService, VerificationCodeStore,
    },
    store::{
        ExpiringStore, MemoryExpiringStore, MemoryTrackRepository, MemoryUserRepository,
        PgTrackRepository, PgUserRepository, RedisStore, TrackRepository, UserRepository,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize structured logging for development
    env_logger::init();

    log::info!("🚀 Starting Resonate backend v{}", resonate::VERSION);

    // Load configuration from environment
    let config = AppConfig::from_env()?;
    config.validate()?;

    log::info!("✅ Configuration loaded and validated");

    // Account and track storage
    let (users, track_store): (Arc<dyn UserRepository>, Arc<dyn TrackRepository>) =
        match &config.database {
            Some(db_config) => {
                let pool = db_config.create_pool().await?;

                log::info!("🔄 Running database migrations...");
                sqlx::migrate!("./migrations").run(&pool).await?;
                log::info!("✅ Database migrations completed");

                (
                    Arc::new(PgUserRepository::new(pool.clone())),
                    Arc::new(PgTrackRepository::new(pool)),
                )
            }
            None => {
                log::warn!("⚠️  DATABASE_URL not set, using in-memory storage");
                (
                    Arc::new(MemoryUserRepository::new()),
                    Arc::new(MemoryTrackRepository::new()),
                )
            }
        };

    // Verification code storage
    let codes: Arc<dyn ExpiringStore> = match &config.redis_url {
        Some(url) => {
            let store = RedisStore::connect(url).await?;
            log::info!("✅ Redis connected");
            Arc::new(store)
        }
        None => {
            log::warn!("⚠️  REDIS_URL not set, verification codes held in memory");
            Arc::new(MemoryExpiringStore::new())
        }
    };

    // Outbound email
    let notifier: Arc<dyn Notifier> = match &config.email {
        Some(smtp) => {
            let notifier = SmtpNotifier::new(smtp.clone())?;
            log::info!("✅ SMTP notifier initialized ({})", smtp.smtp_host);
            Arc::new(notifier)
        }
        None => {
            log::warn!("⚠️  SMTP not configured, emails will be logged only");
            Arc::new(LogNotifier::new())
        }
    };

    // Core services
    let sessions = Arc::new(SessionService::new(config.auth.session_secret.clone()));

    let auth = AuthService::new(
        users.clone(),
        VerificationCodeStore::new(codes),
        ResetTokenStore::new(users),
        (*sessions).clone(),
        notifier,
    )
    .with_base_url(config.auth.base_url.clone())
    .with_bcrypt_cost(config.auth.bcrypt_cost);

    let tracks = TrackService::new(track_store, Arc::new(PassthroughUploader::new()));

    log::info!("✅ Core services initialized");

    let app_state = AppState {
        auth: Arc::new(auth),
        tracks: Arc::new(tracks),
    };

    // CORS: cookies require the frontend origin to be named explicitly
    let cors = if config.server.cors_allows_any_origin() {
        log::warn!("⚠️  CORS allows any origin; set CORS_ORIGINS to the frontend URL for cookies");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins = config
            .server
            .cors_origins
            .iter()
            .map(|origin| origin.parse::<HeaderValue>())
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
            .allow_credentials(true)
    };

    // Build the application with all routes and the identity middleware
    let router = create_routes(sessions);

    let app = router.with_state(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors)
            .into_inner(),
    );

    log::info!("📋 API Endpoints:");
    log::info!("   GET  /health - Health check");
    log::info!("   POST /auth/signup - Request a signup verification code");
    log::info!("   POST /auth/verify-email - Verify the code and create the account");
    log::info!("   POST /auth/login - Login with username or email");
    log::info!("   POST /auth/forgot-password - Request a password reset link");
    log::info!("   POST /auth/reset-password - Set a new password");
    log::info!("   GET  /auth/me - Current logged-in user");
    log::info!("   GET  /tracks/feed - Track feed, newest first");
    log::info!("   POST /tracks - Upload a track (login required)");

    // Server configuration
    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    log::info!("🌐 Starting server on {}", bind_addr);

    // Start the server
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    log::info!("✅ Server listening and ready for requests");
    axum::serve(listener, app).await?;

    Ok(())
}
