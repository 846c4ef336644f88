#[tokio::main]
async fn main() -> chatwoot_relay::error::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("chatwoot_relay=info"),
    )
    .init();
    log::info!("Starting chatwoot-relay");

    match chatwoot_relay::run().await {
        Ok(()) => {
            log::info!("Relay shut down successfully");
            Ok(())
        }
        Err(e) => {
            log::error!("Relay encountered an error: {e}");
            Err(e)
        }
    }
}
