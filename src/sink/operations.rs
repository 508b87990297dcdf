/// Line protocol rendering and batch writes to InfluxDB
use log::{error, info, warn};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use crate::error::SinkError;
use crate::models::TimeSeriesPoint;
use crate::sink::connection::InfluxSink;
use crate::sink::PointSink;

/// Render one point as an InfluxDB line
///
/// Format: `<series>,metric=<label> value=<float> <epoch_ns>`. The sample is
/// widened to f64 so the stored value is exactly the device's f32.
///
/// # Returns
/// None when the value is NaN or infinite, which line protocol cannot carry
pub fn render_line(point: &TimeSeriesPoint) -> Option<String> {
    if !point.value.is_finite() {
        return None;
    }

    Some(format!(
        "{},metric={} value={} {}",
        escape_measurement(&point.series),
        escape_tag(&point.metric),
        f64::from(point.value),
        point.timestamp_nanos()
    ))
}

/// Render a batch, skipping points that cannot be expressed
pub fn render_batch(points: &[TimeSeriesPoint]) -> Vec<String> {
    points
        .iter()
        .filter_map(|point| {
            let line = render_line(point);
            if line.is_none() {
                warn!(
                    "Skipping non-finite value {} for {} {} at {}",
                    point.value, point.series, point.metric, point.timestamp
                );
            }
            line
        })
        .collect()
}

/// Spaces and commas must be escaped in measurement names
fn escape_measurement(s: &str) -> String {
    escape(s, &[',', ' '])
}

/// Commas, equals signs, and spaces must be escaped in tag keys and values
fn escape_tag(s: &str) -> String {
    escape(s, &[',', '=', ' '])
}

/// Backslash and control whitespace are escaped everywhere, so a stray
/// newline cannot split a line
fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if special.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

impl PointSink for InfluxSink {
    /// Send the whole batch in a single synchronous write request
    async fn write_points(&self, points: &[TimeSeriesPoint]) -> Result<usize, SinkError> {
        let lines = render_batch(points);
        if lines.is_empty() {
            warn!("Nothing to write: batch of {} points had no finite values", points.len());
            return Ok(0);
        }

        let response = self
            .client
            .post(self.write_url.clone())
            .header(AUTHORIZATION, format!("Token {}", self.token))
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(lines.join("\n"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Write rejected with status {}: {}", status, body);
            return Err(SinkError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        info!("All data written successfully");
        Ok(lines.len())
    }
}
