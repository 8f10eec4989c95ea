use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use charger_watch::catalog::Catalog;
use charger_watch::config::ServerConfig;
use charger_watch::geocode::{CachedGeocoder, GeocodeCacheConfig, NominatimConfig, NominatimGeocoder};
use charger_watch::notify::{LogNotifier, NotifierBackend, WebhookConfig, WebhookNotifier};
use charger_watch::poll::Monitor;
use charger_watch::provider::{MockProvider, ProviderBackend, ProviderClient, ProviderConfig};
use charger_watch::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("charger_watch=info")),
        )
        .init();

    let config = ServerConfig::from_env().expect("Invalid configuration");

    let catalog = Catalog::load(&config.catalog_path).expect("Failed to load station catalog");
    info!(
        path = %config.catalog_path.display(),
        stations = catalog.len(),
        "Loaded station catalog"
    );

    // Mock data takes precedence over the live provider
    let provider = match &config.mock_dir {
        Some(dir) => {
            let mock = MockProvider::new(dir).expect("Failed to load mock provider data");
            info!(
                dir = %dir.display(),
                stations = mock.available_stations().len(),
                "Using mock provider"
            );
            ProviderBackend::Mock(mock)
        }
        None => {
            let provider_config = match &config.provider_url {
                Some(url) => ProviderConfig::new(url),
                None => ProviderConfig::default(),
            }
            .with_timeout(config.monitor.fetch_timeout.as_secs());
            info!(url = %provider_config.base_url, "Using live provider");
            ProviderBackend::Http(
                ProviderClient::new(provider_config).expect("Failed to create provider client"),
            )
        }
    };

    let notifier = match &config.webhook_url {
        Some(url) => NotifierBackend::Webhook(
            WebhookNotifier::new(WebhookConfig::new(url)).expect("Failed to create webhook notifier"),
        ),
        None => {
            warn!("CHARGER_WATCH_WEBHOOK_URL not set, notifications will only be logged");
            NotifierBackend::Log(LogNotifier)
        }
    };

    let geocoder_config = match &config.geocoder_url {
        Some(url) => NominatimConfig::new(url),
        None => NominatimConfig::default(),
    };
    let geocoder = CachedGeocoder::new(
        NominatimGeocoder::new(geocoder_config).expect("Failed to create geocoder"),
        &GeocodeCacheConfig::default(),
    );

    let monitor = Monitor::new(
        Arc::new(catalog),
        provider,
        notifier,
        geocoder,
        config.monitor.clone(),
    );
    let state = AppState::new(monitor);
    let app = create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .expect("Failed to bind listener");
    info!(addr = %config.bind, "Charger watch listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    if let Err(e) = served {
        error!(error = %e, "Server error");
    }

    if let Some(summary) = state.monitor.stop().await {
        info!(
            cycles = summary.cycles,
            transitions = summary.transitions,
            notifications = summary.notifications_sent,
            "Stopped poll session on shutdown"
        );
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
