//! Menu Reviews API server
//!
//! ```text
//! menu_reviews [--env dev|prod] [--port N] [--seed]
//! ```
//!
//! Uses PostgreSQL when `DATABASE_URL` (or `postgres_url`) is set,
//! otherwise in-memory repositories that vanish on exit.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use menu_reviews::auth::{PasswordHashing, TokenService};
use menu_reviews::config::AppConfig;
use menu_reviews::db::{Database, init_schema};
use menu_reviews::gateway::{run_server, state::AppState};
use menu_reviews::logging::init_logging;
use menu_reviews::repository::Repositories;
use menu_reviews::seed::seed_demo_data;
use menu_reviews::storage::{CloudinaryStorage, ObjectStorage};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

fn use_seed() -> bool {
    std::env::args().any(|a| a == "--seed")
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real deployments set variables directly
    dotenvy::dotenv().ok();

    let env = get_env();
    let mut config = AppConfig::load(&env)?;
    config.apply_env()?;
    if let Some(port) = get_port_override() {
        config.gateway.port = port;
    }

    let _guard = init_logging(&config);
    tracing::info!(env = %env, build = env!("GIT_HASH"), "starting menu_reviews");

    let jwt_secret = config.jwt_secret()?;

    let (repos, pg_db) = match &config.postgres_url {
        Some(url) => {
            let db = Database::connect(url, &config.database)
                .await
                .context("failed to connect to PostgreSQL")?;
            init_schema(db.pool()).await?;
            tracing::info!("PostgreSQL connected, schema ready");
            (Repositories::postgres(db.pool().clone()), Some(Arc::new(db)))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory repositories (data is lost on exit)");
            (Repositories::in_memory(), None)
        }
    };

    let hashing = Arc::new(
        PasswordHashing::from_config(&config.auth).context("invalid argon2 parameters")?,
    );

    if use_seed() {
        seed_demo_data(&repos, &hashing).await?;
    }

    let tokens = Arc::new(TokenService::from_config(jwt_secret, &config.auth));

    let storage = match &config.secrets.cloudinary {
        Some(credentials) => {
            let cloudinary = CloudinaryStorage::new(
                credentials,
                Duration::from_secs(config.storage.request_timeout_secs),
            )
            .context("failed to build Cloudinary client")?;
            tracing::info!(cloud = %credentials.cloud_name, "image uploads enabled");
            let storage: Arc<dyn ObjectStorage> = Arc::new(cloudinary);
            Some((storage, config.storage.folder.clone()))
        }
        None => {
            tracing::warn!("Cloudinary not configured, image uploads return 503");
            None
        }
    };

    let state = AppState::new(repos, tokens, hashing, storage, pg_db);
    run_server(&config.gateway, state).await
}
