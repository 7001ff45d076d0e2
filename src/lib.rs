pub mod actions;
pub mod analysis;
pub mod assessment;
pub mod breaks;
mod db;
pub mod models;
pub mod notify;
pub mod photos;
pub mod scoring;
pub mod settings;
mod utils;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context;
use tokio::net::TcpListener;

use analysis::{ApiState, FixedPostureAnalyzer};
use settings::{ServerSettings, SETTINGS_PATH_ENV};

/// Start the posture analysis API with settings from `ERGOWISE_SETTINGS`.
pub async fn run() -> anyhow::Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    log::info!("ErgoWise starting up...");

    let settings_path = std::env::var_os(SETTINGS_PATH_ENV).map(PathBuf::from);
    let settings = ServerSettings::load(settings_path.as_deref())?;

    let state = ApiState::new(
        Arc::new(FixedPostureAnalyzer::default()),
        settings.photo_store.build()?,
    );
    let app = analysis::router(state, settings.max_upload_bytes);

    let listener = TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", settings.bind_addr))?;

    analysis::serve(listener, app).await
}
