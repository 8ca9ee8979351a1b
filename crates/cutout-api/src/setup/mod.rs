//! Application wiring: segmenter, batch processor, routes, server.

pub mod routes;
pub mod server;

use std::sync::Arc;

use axum::Router;
use cutout_core::Config;
use cutout_processing::{BatchConfig, BatchProcessor, HttpSegmenter, Segmenter};

use crate::state::AppState;

/// Initialize the application with the HTTP-backed segmenter from config.
pub fn initialize_app(config: Config) -> Result<(Arc<AppState>, Router), anyhow::Error> {
    let segmenter: Arc<dyn Segmenter> = Arc::new(HttpSegmenter::new(
        config.segmenter_url.clone(),
        config.segmenter_timeout_secs,
    )?);
    build_app(config, segmenter)
}

/// Build state and router around an injected segmentation capability.
/// Integration tests call this with a stub.
pub fn build_app(
    config: Config,
    segmenter: Arc<dyn Segmenter>,
) -> Result<(Arc<AppState>, Router), anyhow::Error> {
    let batch_config = BatchConfig {
        max_item_bytes: config.max_item_bytes,
        allowed_extensions: config.allowed_extensions.clone(),
    };
    let state = Arc::new(AppState {
        processor: BatchProcessor::new(batch_config, segmenter),
        config,
    });
    let router = routes::setup_routes(&state.config, state.clone())?;
    Ok((state, router))
}
