use std::net::SocketAddr;
use std::sync::Arc;

use skyfare_api::{app, AppState};
use skyfare_booking::ConfirmationWorkflow;
use skyfare_infra::{DuffelClient, StripeGateway};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "skyfare_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = skyfare_infra::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Skyfare API on port {}", config.server.port);

    let gateway = StripeGateway::new(&config.gateway).expect("Failed to build payment gateway client");
    let platform = DuffelClient::new(&config.platform).expect("Failed to build booking platform client");

    let workflow = ConfirmationWorkflow::new(
        Arc::new(gateway),
        Arc::new(platform),
        config.phone.clone(),
    );

    let app = app(AppState { workflow: Arc::new(workflow) });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
