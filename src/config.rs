use log::info;
use std::env;
use url::Url;

use crate::error::ConfigError;
use crate::payload::Layout;

/// Connection parameters for the time-series store
#[derive(Debug, Clone)]
pub struct SinkConfig {
    pub endpoint: Url,
    pub token: String,
    pub org: String,
    pub bucket: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub sink: SinkConfig,
    pub layout: Layout,
    /// Report sink failures as processing errors instead of logging them
    pub strict_sink: bool,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        // Load environment variables
        dotenv::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup, environment or otherwise
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let endpoint = Url::parse(required("INFLUX_URL")?.trim())?;
        let sink = SinkConfig {
            endpoint,
            token: required("INFLUX_TOKEN")?,
            org: required("INFLUX_ORG")?,
            bucket: required("INFLUX_BUCKET")?,
        };

        let layout = match lookup("PIC_LAYOUT") {
            Some(name) => name.parse()?,
            None => Layout::default(),
        };

        let strict_sink = match lookup("PIC_SINK_STRICT") {
            Some(value) => parse_flag("PIC_SINK_STRICT", &value)?,
            None => false,
        };

        info!(
            "Sink {} org={} bucket={}, layout {}, strict sink errors: {}",
            sink.endpoint, sink.org, sink.bucket, layout, strict_sink
        );

        Ok(AppConfig {
            sink,
            layout,
            strict_sink,
        })
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name,
            value: value.to_string(),
        }),
    }
}
