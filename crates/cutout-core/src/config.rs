//! Configuration module
//!
//! Environment-driven configuration for the API and the batch processor,
//! with typed defaults and a validation pass at startup.

use std::env;

const DEFAULT_PORT: u16 = 8080;
const MAX_FILE_SIZE_MB: usize = 10;
const MAX_REQUEST_SIZE_MB: usize = 16;
const SEGMENTER_TIMEOUT_SECS: u64 = 300;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    /// Per-item size ceiling. Items above it are skipped, not truncated.
    pub max_item_bytes: usize,
    /// Transport-level ceiling for the whole multipart body.
    pub max_request_bytes: usize,
    /// Permitted filename suffixes, lowercase, without the leading dot.
    pub allowed_extensions: Vec<String>,
    /// Inference endpoint for the background-removal model.
    pub segmenter_url: String,
    pub segmenter_timeout_secs: u64,
}

impl Config {
    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_item_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let max_request_mb = env::var("MAX_REQUEST_SIZE_MB")
            .unwrap_or_else(|_| MAX_REQUEST_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_REQUEST_SIZE_MB);

        let allowed_extensions = env::var("ALLOWED_EXTENSIONS")
            .unwrap_or_else(|_| "png,jpg,jpeg,webp,bmp,tiff".to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            max_item_bytes: max_item_mb * 1024 * 1024,
            max_request_bytes: max_request_mb * 1024 * 1024,
            allowed_extensions,
            segmenter_url: env::var("SEGMENTER_URL")
                .map_err(|_| anyhow::anyhow!("SEGMENTER_URL must be set"))?,
            segmenter_timeout_secs: env::var("SEGMENTER_TIMEOUT_SECS")
                .unwrap_or_else(|_| SEGMENTER_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(SEGMENTER_TIMEOUT_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o.trim() == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_EXTENSIONS must not be empty"));
        }

        if self.max_item_bytes == 0 || self.max_request_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_MB and MAX_REQUEST_SIZE_MB must be greater than zero"
            ));
        }

        if self.max_item_bytes > self.max_request_bytes {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_MB ({}) cannot exceed MAX_REQUEST_SIZE_MB ({})",
                self.max_item_bytes / 1024 / 1024,
                self.max_request_bytes / 1024 / 1024
            ));
        }

        if self.segmenter_url.is_empty() {
            return Err(anyhow::anyhow!("SEGMENTER_URL must not be empty"));
        }

        Ok(())
    }
}
