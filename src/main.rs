use std::sync::Arc;

use batchline::auth::{AppState, AuthService, TokenBlacklist, TokenService, auth_router};
use batchline::config::Config;
use batchline::store::{InMemorySessionStore, InMemoryUserStore, SessionStore, UserStore};

#[tokio::main]
async fn main() {
    // Load .env file (if exists)
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = Config::from_env();

    // Log config status (without revealing secrets)
    tracing::info!(
        "config loaded: secret_key={}, token lifetime {}ms",
        config.has_secret_key(),
        config.token.expiration_ms
    );

    let users: Arc<dyn UserStore> = Arc::new(InMemoryUserStore::new());
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let tokens = Arc::new(TokenService::new(config.token.clone()));
    let blacklist = Arc::new(TokenBlacklist::new());

    let auth = AuthService::new(users, sessions, tokens, blacklist);
    let app = auth_router(AppState { auth });

    tracing::info!("listening on http://{}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("failed to bind listen address");
    axum::serve(listener, app).await.expect("server error");
}
