use cutout_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    cutout_api::telemetry::init_tracing();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (segmenter, processor, routes)
    let (_state, router) = cutout_api::setup::initialize_app(config.clone())?;

    // Start the server
    cutout_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
