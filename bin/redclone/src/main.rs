//! # Redclone Binary
//!
//! Assembles the client from the configured collaborators and runs the
//! terminal shell on stdin/stdout. Logs go to stderr.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use configs::{AppConfig, LogConfig};
use rc_app::{AppContext, Shell};
use rc_core::session::SessionProvider;
use tokio::io::BufReader;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[cfg(feature = "gateway-appsync")]
use rc_gateway_appsync::AppSyncGateway;

#[cfg(feature = "storage-s3")]
use rc_storage_s3::S3ObjectStore;

#[cfg(feature = "auth-cognito")]
use rc_auth_cognito::CognitoAuth;

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let registry = tracing_subscriber::registry().with(filter);
    if log.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cfg = AppConfig::load().context("loading configuration")?;
    init_tracing(&cfg.log);

    // 1. Identity
    #[cfg(feature = "auth-cognito")]
    let auth = {
        let auth = CognitoAuth::new(cfg.auth.endpoint_url(), cfg.auth.client_id.clone());
        match &cfg.auth.token_cache {
            Some(path) => auth.with_token_cache(path),
            None => auth,
        }
    };
    let session = Arc::new(SessionProvider::new(Arc::new(auth)));
    match session.restore().await {
        Ok(Some(user)) => info!(username = %user.username, "welcome back"),
        Ok(None) => {}
        Err(e) => warn!(error = %e, "could not restore previous session"),
    }

    // 2. Data API, authorized per call from the session
    #[cfg(feature = "gateway-appsync")]
    let gateway = AppSyncGateway::new(cfg.api.endpoint, cfg.api.api_key, session.context());

    // 3. Image storage
    #[cfg(feature = "storage-s3")]
    let store = S3ObjectStore::connect(
        &cfg.storage.region,
        cfg.storage.bucket.clone(),
        cfg.storage.key_prefix.clone(),
        Duration::from_secs(cfg.storage.signed_url_ttl_secs),
    )
    .await;

    let ctx = AppContext::new(Arc::new(gateway), Arc::new(store), session);

    info!("redclone ready");
    let shell = Shell::start(ctx).await;
    shell
        .run(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
        .await
        .context("terminal i/o")?;
    info!("bye");
    Ok(())
}
