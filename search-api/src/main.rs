mod app_state;
mod config;
mod domain;
mod router;
mod routes;

use std::sync::Arc;

use es_client::ElasticClient;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{fmt::time::LocalTime, EnvFilter};

use crate::app_state::AppState;
use crate::domain::search::{
    cache::MokaStore, ensure_indices, index::ElasticIndex, run_synchronizer,
    source::KafkaRestSource, SearchRepository, SyncConfig, TOPICS,
};

const CACHE_CAPACITY: u64 = 10_000;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_timer(LocalTime::rfc_3339())
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = config::read_config().expect("Failed to read configuration");

    let index = ElasticIndex::new(ElasticClient::new(config.elastic.url.clone()));
    ensure_indices(&index)
        .await
        .expect("Failed to reconcile search indices");

    let repository = Arc::new(SearchRepository::new(
        Arc::new(index),
        Arc::new(MokaStore::new(CACHE_CAPACITY)),
    ));

    let topics = TOPICS.iter().map(|topic| topic.to_string()).collect();
    let source = KafkaRestSource::new(
        config.kafka.proxy_url.clone(),
        config.kafka.group.clone(),
        topics,
    );
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let synchronizer = tokio::spawn(run_synchronizer(
        repository.clone(),
        Box::new(source),
        SyncConfig::default(),
        shutdown_rx,
    ));

    let app = router::create(AppState::new(repository));
    let address = format!("{}:{}", config.application.host, config.application.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .expect("Failed to bind listen address");
    info!(%address, "Search service listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .expect("Server error");

    info!("Shutting down");
    let _ = shutdown_tx.send(true);
    let _ = synchronizer.await;
}
