use reqwest::Client;
use tokio::time::Duration;
use url::Url;

use crate::config::SinkConfig;
use crate::error::SinkError;

const WRITE_TIMEOUT_SECS: u64 = 10;

/// InfluxDB v2 writer for one bucket
///
/// Holds its own HTTP client; a writer is built per invocation and dropped
/// with it.
pub struct InfluxSink {
    pub(crate) client: Client,
    pub(crate) write_url: Url,
    pub(crate) token: String,
}

impl InfluxSink {
    pub fn new(config: &SinkConfig) -> Result<Self, SinkError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(WRITE_TIMEOUT_SECS))
            .build()?;

        Ok(InfluxSink {
            client,
            write_url: build_write_url(config)?,
            token: config.token.clone(),
        })
    }
}

/// Build `<endpoint>/api/v2/write?org=..&bucket=..&precision=ns`
///
/// Any path already on the endpoint is kept as a prefix, so reverse-proxied
/// instances work too.
pub fn build_write_url(config: &SinkConfig) -> Result<Url, SinkError> {
    let mut url = config.endpoint.clone();

    url.path_segments_mut()
        .map_err(|_| SinkError::Endpoint(format!("{} cannot be a base URL", config.endpoint)))?
        .pop_if_empty()
        .extend(["api", "v2", "write"]);

    url.query_pairs_mut()
        .clear()
        .append_pair("org", &config.org)
        .append_pair("bucket", &config.bucket)
        .append_pair("precision", "ns");

    Ok(url)
}
