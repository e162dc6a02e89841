use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where the backend's log lines go. Console output is always on; shipping to
/// Loki needs the `loki` feature and `LOKI_ENABLED=true`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub loki_enabled: bool,
    pub loki_url: Option<String>,
    pub service_name: String,
    pub environment: String,
    /// `EnvFilter` directives, e.g. `info` or `marketpulse_backend=debug`.
    pub log_level: String,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        Self {
            loki_enabled: std::env::var("LOKI_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            loki_url: std::env::var("LOKI_URL").ok().filter(|v| !v.is_empty()),
            service_name: std::env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "marketpulse".to_string()),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            log_level: std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info".to_string()),
        }
    }

    pub fn filter(&self) -> anyhow::Result<EnvFilter> {
        EnvFilter::try_new(&self.log_level)
            .with_context(|| format!("invalid RUST_LOG directives: {}", self.log_level))
    }

    /// The Loki push endpoint, or `None` when shipping is switched off.
    pub fn loki_endpoint(&self) -> anyhow::Result<Option<url::Url>> {
        if !self.loki_enabled {
            return Ok(None);
        }
        let raw = self
            .loki_url
            .as_deref()
            .context("LOKI_ENABLED is true but LOKI_URL is not set")?;
        let url = url::Url::parse(raw).with_context(|| format!("invalid LOKI_URL: {}", raw))?;
        Ok(Some(url))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.filter()?;
        self.loki_endpoint()?;
        Ok(())
    }
}

pub fn init_logging(config: LoggingConfig) -> anyhow::Result<()> {
    let filter = config.filter()?;
    let loki_endpoint = config.loki_endpoint()?;
    let loki_requested = loki_endpoint.is_some();

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());

    #[cfg(feature = "loki")]
    {
        if let Some(url) = loki_endpoint {
            let (loki_layer, task) = tracing_loki::builder()
                .label("service", &config.service_name)?
                .label("environment", &config.environment)?
                .build_url(url.clone())?;

            // Ships buffered log lines to Loki in the background
            tokio::spawn(task);
            registry.with(loki_layer).try_init()?;

            tracing::info!(
                service = %config.service_name,
                environment = %config.environment,
                "📊 Logging to console and Loki at {}",
                url
            );
            return Ok(());
        }
    }

    registry.try_init()?;

    if loki_requested {
        tracing::warn!("LOKI_ENABLED is set but this build has no `loki` feature; console only");
    }
    tracing::info!(
        service = %config.service_name,
        environment = %config.environment,
        "📊 Console logging initialized (filter: {})",
        config.log_level
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(loki_enabled: bool, loki_url: Option<&str>) -> LoggingConfig {
        LoggingConfig {
            loki_enabled,
            loki_url: loki_url.map(str::to_string),
            service_name: "marketpulse".to_string(),
            environment: "test".to_string(),
            log_level: "debug".to_string(),
        }
    }

    #[test]
    fn test_loki_requires_url() {
        assert!(config(true, None).validate().is_err());
        assert!(config(true, Some("http://localhost:3100")).validate().is_ok());
    }

    #[test]
    fn test_loki_url_must_parse() {
        assert!(config(true, Some("not a url")).loki_endpoint().is_err());
    }

    #[test]
    fn test_disabled_loki_ignores_url() {
        let endpoint = config(false, Some("http://localhost:3100")).loki_endpoint().unwrap();
        assert!(endpoint.is_none());
    }

    #[test]
    fn test_per_crate_directives_accepted() {
        let mut cfg = config(false, None);
        cfg.log_level = "info,marketpulse_backend=debug".to_string();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_bad_level_rejected() {
        let mut cfg = config(false, None);
        cfg.log_level = "marketpulse_backend=loud".to_string();
        assert!(cfg.filter().is_err());
    }
}
