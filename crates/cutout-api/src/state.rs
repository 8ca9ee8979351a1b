//! Application state shared across handlers.

use cutout_core::Config;
use cutout_processing::BatchProcessor;

pub struct AppState {
    pub config: Config,
    pub processor: BatchProcessor,
}
