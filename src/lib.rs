pub mod chatwoot;
pub mod completion;
pub mod config;
pub mod error;
pub mod mediator;
pub mod reply;
pub mod types;
pub mod webhook;

use std::sync::Arc;

use log::{debug, error, info};

use chatwoot::ChatwootClient;
use completion::CompletionClient;
use config::Config;
use error::Result;
use mediator::{DeliverySettings, Mediator, TokioExecutor};
use reply::ReplyProviders;
use webhook::{AppState, ModeClassifier};

/// Run the webhook relay until ctrl-c.
pub async fn run() -> Result<()> {
    info!("Initializing relay");
    let config = Config::from_env()?;

    // Providers are registered before the listener accepts anything.
    let providers = Arc::new(ReplyProviders::new());
    if let Some(completion) = config.completion.clone() {
        debug!("Registering completion client as reply provider");
        let client = Arc::new(CompletionClient::new(completion));
        providers.register_reply(client.clone())?;
        providers.register_stream(client)?;
    }

    debug!("Initializing Chatwoot client");
    let sink = Arc::new(ChatwootClient::new(config.chatwoot.clone())?);

    let mediator = Arc::new(Mediator::new(
        sink,
        providers,
        ModeClassifier::new(&config.support_mode_attr),
        DeliverySettings {
            stream_reply: config.stream_reply,
            stream_limits: config.stream_limits,
        },
    ));
    let app = webhook::router(AppState::new(mediator, Arc::new(TokioExecutor)));

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, shutting down...");
}
