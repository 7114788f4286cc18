use std::sync::Arc;
use std::time::Duration;

use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use trip_server::cache::{CacheConfig, CachedGeometryProvider};
use trip_server::config::{DirectoryLocation, ServerConfig};
use trip_server::directory::{
    DirectoryClient, DirectoryClientConfig, DirectorySource, FileDirectory,
};
use trip_server::geo::{
    Geocoder, GeometryProvider, NominatimClient, NominatimConfig, OsrmClient, OsrmConfig,
};
use trip_server::session::TripSession;
use trip_server::web::{AppState, create_router};

fn init_logger() {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV)
        .unwrap_or_else(|_| LevelFilter::INFO.to_string());
    let env_filter = EnvFilter::try_new(&rust_log).unwrap_or_else(|err| {
        eprintln!("invalid {rust_log:?}, falling back to level 'info' - {err}");
        EnvFilter::new(LevelFilter::INFO.to_string())
    });

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter)
        .init();
}

/// Load the directory, retrying quickly until the first success and then
/// refreshing on a slower interval. Failed refreshes keep the last good copy.
async fn keep_directory_fresh<G, P>(
    session: Arc<TripSession<G, P>>,
    source: DirectorySource,
    retry: Duration,
    refresh: Duration,
) where
    G: Geocoder,
    P: GeometryProvider,
{
    loop {
        let wait = match source.load().await {
            Ok((directory, report)) => {
                session.install_directory(directory, report).await;
                refresh
            }
            Err(e) => {
                session.mark_not_ready(format!("{source}: {e}")).await;
                if session.directory().await.is_some() {
                    refresh
                } else {
                    retry
                }
            }
        };
        tokio::time::sleep(wait).await;
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[tokio::main]
async fn main() {
    init_logger();

    let config = ServerConfig::from_env().expect("Invalid server configuration");

    let mut geocoder_config =
        NominatimConfig::new().with_country_codes(&config.geocoder_country_codes);
    if let Some(url) = &config.geocoder_url {
        geocoder_config = geocoder_config.with_base_url(url);
    }
    let geocoder = NominatimClient::new(geocoder_config).expect("Failed to create geocoder");

    let mut geometry_config = OsrmConfig::new();
    if let Some(url) = &config.geometry_url {
        geometry_config = geometry_config.with_base_url(url);
    }
    let cache_config = CacheConfig {
        ttl: config.geometry_cache_ttl,
        ..CacheConfig::default()
    };
    let geometry = CachedGeometryProvider::new(
        OsrmClient::new(geometry_config).expect("Failed to create geometry client"),
        &cache_config,
    );

    let source = match &config.directory {
        DirectoryLocation::Url(url) => DirectorySource::Http(
            DirectoryClient::new(DirectoryClientConfig::new(url))
                .expect("Failed to create directory client"),
        ),
        DirectoryLocation::File(path) => DirectorySource::File(FileDirectory::new(path)),
    };

    let session = Arc::new(TripSession::new(geocoder, geometry));

    // Serve immediately; planning answers 503 until the first load lands
    tokio::spawn(keep_directory_fresh(
        Arc::clone(&session),
        source,
        config.directory_retry,
        config.directory_refresh,
    ));

    let app = create_router(AppState::new(session));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind");
    info!(addr = %config.bind_addr, "trip planner listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}
