//! usersearch server
//!
//! Serves user and cross-index search over HTTP.

use clap::Parser;
use tracing::info;
use usersearch_persistence::backends::memory::MemoryEngine;
use usersearch_rest::{ServerConfig, StorageMode, create_app_with_config, init_logging};

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        port = config.port,
        host = %config.host,
        storage = %config.storage,
        users_index = %config.users_index,
        refresh = ?config.refresh,
        "Starting usersearch server"
    );

    let storage = config.storage;
    match storage {
        StorageMode::Elasticsearch => start_elasticsearch(config).await,
        StorageMode::Memory => start_memory(config).await,
    }
}

/// Starts the server over an Elasticsearch cluster.
#[cfg(feature = "elasticsearch")]
async fn start_elasticsearch(config: ServerConfig) -> anyhow::Result<()> {
    use anyhow::Context;
    use usersearch_persistence::backends::elasticsearch::{
        ElasticsearchBackend, ensure_users_index,
    };
    use usersearch_persistence::core::SearchEngine;

    let es_config = config.elasticsearch_config();
    info!(nodes = ?es_config.nodes, "Initializing Elasticsearch backend");

    let backend = ElasticsearchBackend::new(es_config)
        .context("Failed to create Elasticsearch client")?;

    if let Err(e) = backend.health_check().await {
        tracing::warn!(error = %e, "Elasticsearch is not healthy yet; requests will fail until it is");
    }

    if config.skip_index_bootstrap {
        info!("Skipping users index bootstrap");
    } else {
        ensure_users_index(&backend, &config.users_index)
            .await
            .with_context(|| format!("Failed to prepare index '{}'", config.users_index))?;
        info!(index = %config.users_index, "Users index ready");
    }

    let app = create_app_with_config(backend, config.clone());
    serve(app, &config).await
}

/// Fallback when the elasticsearch feature is not enabled.
#[cfg(not(feature = "elasticsearch"))]
async fn start_elasticsearch(_config: ServerConfig) -> anyhow::Result<()> {
    anyhow::bail!(
        "The elasticsearch engine requires the 'elasticsearch' feature. \
         Build with: cargo build -p usersearch-server --features elasticsearch, \
         or run with --storage memory"
    )
}

/// Starts the server over the in-process engine.
async fn start_memory(config: ServerConfig) -> anyhow::Result<()> {
    info!("Using in-memory engine; data is lost on restart");

    let engine = MemoryEngine::new();
    if !config.skip_index_bootstrap {
        engine.create_index(&config.users_index);
    }

    let app = create_app_with_config(engine, config.clone());
    serve(app, &config).await
}
