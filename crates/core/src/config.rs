use crate::error::{AppError, Result};
use crate::model::ModelChoice;
use dotenvy::dotenv;
use std::env;
use std::time::Duration;
use url::Url;

/// Service used when `DEPTH_LENS_API_URL` is not set.
pub const DEFAULT_API_URL: &str = "https://depth-backend.sampacker.com";

const PREDICT_PATH: &str = "predict-depth";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: Url,
    pub default_model: ModelChoice,
    /// `None` keeps the HTTP client's own timeout behaviour.
    pub timeout: Option<Duration>,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file if it exists, ignore if it doesn't
        let _ = dotenv();

        let mut builder = Self::builder();

        if let Ok(url) = env::var("DEPTH_LENS_API_URL") {
            builder = builder.with_api_url(url);
        }
        if let Ok(model) = env::var("DEPTH_LENS_MODEL") {
            builder = builder.with_model(model.parse()?);
        }
        if let Ok(secs) = env::var("DEPTH_LENS_TIMEOUT_SECS") {
            let secs: u64 = secs
                .trim()
                .parse()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| {
                    AppError::config("DEPTH_LENS_TIMEOUT_SECS must be a positive integer")
                })?;
            builder = builder.with_timeout(Duration::from_secs(secs));
        }

        builder.build()
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Full URL of the depth prediction endpoint.
    pub fn predict_url(&self) -> Result<Url> {
        let mut base = self.api_url.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(PREDICT_PATH)
            .map_err(|e| AppError::config(format!("Invalid endpoint URL: {}", e)))
    }
}

#[derive(Debug, Default)]
pub struct ConfigBuilder {
    api_url: Option<String>,
    model: Option<ModelChoice>,
    timeout: Option<Duration>,
}

impl ConfigBuilder {
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn with_model(mut self, model: ModelChoice) -> Self {
        self.model = Some(model);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<Config> {
        let raw = self.api_url.as_deref().unwrap_or(DEFAULT_API_URL);
        let api_url = Url::parse(raw.trim())
            .map_err(|e| AppError::config(format!("Invalid API URL '{}': {}", raw, e)))?;

        if !matches!(api_url.scheme(), "http" | "https") {
            return Err(AppError::config(format!(
                "API URL must use http or https, got '{}'",
                api_url.scheme()
            )));
        }

        Ok(Config {
            api_url,
            default_model: self.model.unwrap_or_default(),
            timeout: self.timeout,
        })
    }
}
