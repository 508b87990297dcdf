/// Request/response boundary for a single payload invocation
use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProcessError;
use crate::models::ChannelGrouping;
use crate::payload::{block_count, decode_payload, group_channels, Layout};
use crate::sink::PointSink;
use crate::timeline::expand_points;
use crate::utils::format_datetime;

const MISSING_INPUT: &str = "Invalid input: No D field found in the event";

/// Inbound event: the device payload under `D`
#[derive(Debug, Deserialize)]
pub struct PicEvent {
    #[serde(rename = "D")]
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct Response {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: ResponseBody,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Processed {
        message: String,
        date_obj: String,
        grouped: ChannelGrouping,
    },
    Error(String),
}

impl Response {
    fn bad_request() -> Self {
        Response {
            status_code: 400,
            body: ResponseBody::Error(MISSING_INPUT.to_string()),
        }
    }

    fn server_error(e: &ProcessError) -> Self {
        Response {
            status_code: 500,
            body: ResponseBody::Error(format!("Error processing data: {}", e)),
        }
    }
}

/// Result of a successful pass through decode, expand and write
struct Processed {
    capture_time: String,
    grouping: ChannelGrouping,
    attempted: usize,
}

/// Handle an event given as JSON text; unparseable input counts as missing `D`
pub async fn handle_json<S: PointSink>(
    input: &str,
    layout: Layout,
    sink: &S,
    strict_sink: bool,
) -> Response {
    match serde_json::from_str::<Value>(input) {
        Ok(event) => handle_event(&event, layout, sink, strict_sink).await,
        Err(e) => {
            warn!("Event is not valid JSON: {}", e);
            Response::bad_request()
        }
    }
}

/// Handle one event
///
/// Missing or non-string `D` yields 400 without touching the sink. Decode
/// failures yield 500. Sink failures are only logged and the response still
/// reports the attempted batch size, unless `strict_sink` is set, in which
/// case they yield 500 too.
pub async fn handle_event<S: PointSink>(
    event: &Value,
    layout: Layout,
    sink: &S,
    strict_sink: bool,
) -> Response {
    info!("Received event: {}", event);

    let event = match PicEvent::deserialize(event) {
        Ok(event) => event,
        Err(e) => {
            warn!("Rejecting event: {}", e);
            return Response::bad_request();
        }
    };

    match process(&event.data, layout, sink, strict_sink).await {
        Ok(processed) => Response {
            status_code: 200,
            body: ResponseBody::Processed {
                message: format!(
                    "Data added! Number of points written: {}",
                    processed.attempted
                ),
                date_obj: processed.capture_time,
                grouped: processed.grouping,
            },
        },
        Err(e) => {
            error!("Error processing data: {}", e);
            Response::server_error(&e)
        }
    }
}

async fn process<S: PointSink>(
    raw: &str,
    layout: Layout,
    sink: &S,
    strict_sink: bool,
) -> Result<Processed, ProcessError> {
    info!("Starting validation and formatting ({} layout)", layout);

    let decoded = decode_payload(raw, layout.spec())?;
    let grouping = group_channels(&decoded.samples)?;
    debug!(
        "Grouped {} sample blocks into {} channels",
        block_count(&decoded.samples),
        grouping.len()
    );

    let points = expand_points(&decoded.header, &grouping);
    match sink.write_points(&points).await {
        Ok(written) => info!(
            "Number of points written: {} of {}",
            written,
            points.len()
        ),
        Err(e) if !strict_sink => error!("Failed to write points: {}", e),
        Err(e) => return Err(e.into()),
    }

    // Callers are told the size of the batch handed to the sink
    Ok(Processed {
        capture_time: format_datetime(&decoded.header.capture_time),
        grouping,
        attempted: points.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::decoder::tests::{encode_samples, scenario_payload, v1_header};
    use crate::sink::memory::RecordingSink;
    use serde_json::json;
    use time::macros::datetime;

    #[tokio::test]
    async fn test_scenario_end_to_end() {
        let sink = RecordingSink::default();
        let event = json!({ "D": scenario_payload() });

        let response = handle_event(&event, Layout::V1, &sink, false).await;
        assert_eq!(response.status_code, 200);

        let body = serde_json::to_value(&response).unwrap();
        assert_eq!(body["statusCode"], 200);
        assert_eq!(
            body["body"]["message"],
            "Data added! Number of points written: 200"
        );
        assert_eq!(body["body"]["date_obj"], "2023-06-05T14:30:00");
        let grouped = body["body"]["grouped"].as_object().unwrap();
        assert_eq!(grouped.len(), 20);
        for j in 0..20 {
            assert_eq!(grouped[&format!("v{}", j)], json!(vec![1.5; 10]));
        }

        let batches = sink.batches();
        assert_eq!(batches.len(), 1);
        let points = &batches[0];
        assert_eq!(points.len(), 200);
        assert!(points.iter().all(|p| p.series == "1A2B" && p.value == 1.5));
        assert_eq!(points[0].metric, "v0");
        assert_eq!(points[0].timestamp, datetime!(2023-06-05 09:00:00 UTC));
        assert_eq!(points[199].metric, "v19");
        assert_eq!(points[199].timestamp, datetime!(2023-06-05 09:00:00.9 UTC));
    }

    #[tokio::test]
    async fn test_missing_payload_field() {
        let sink = RecordingSink::default();

        for event in [json!({ "data": "1A2B" }), json!({ "D": 42 }), json!("D")] {
            let response = handle_event(&event, Layout::V1, &sink, false).await;
            assert_eq!(response.status_code, 400);
            assert!(matches!(response.body, ResponseBody::Error(ref m) if m == MISSING_INPUT));
        }
        assert!(sink.batches().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_json_is_bad_request() {
        let sink = RecordingSink::default();
        let response = handle_json("{\"D\": ", Layout::V1, &sink, false).await;
        assert_eq!(response.status_code, 400);
        assert!(sink.batches().is_empty());
    }

    #[tokio::test]
    async fn test_handle_json_accepts_extra_keys() {
        let sink = RecordingSink::default();
        let input = format!("{{\"D\": \"{}\", \"source\": \"gw-1\"}}", scenario_payload());
        let response = handle_json(&input, Layout::V1, &sink, false).await;
        assert_eq!(response.status_code, 200);
        assert_eq!(sink.batches().len(), 1);
    }

    #[tokio::test]
    async fn test_short_sample_block_is_server_error() {
        let sink = RecordingSink::default();
        let raw = v1_header("1A2B", 5, 6, 2023, 14, 30, 0) + &encode_samples(&[1.5; 199]);

        let response = handle_event(&json!({ "D": raw }), Layout::V1, &sink, false).await;
        assert_eq!(response.status_code, 500);
        match response.body {
            ResponseBody::Error(message) => {
                assert!(message.starts_with("Error processing data: "));
                assert!(message.contains("expected 200 float values but got 199"));
            }
            other => panic!("unexpected body: {:?}", other),
        }
        assert!(sink.batches().is_empty());
    }

    #[tokio::test]
    async fn test_wrong_layout_is_server_error() {
        let sink = RecordingSink::default();
        // Read as V2, the V1 header puts the hour byte (0x0E) in the month field
        let response =
            handle_event(&json!({ "D": scenario_payload() }), Layout::V2, &sink, false).await;
        assert_eq!(response.status_code, 500);
        assert!(sink.batches().is_empty());
    }

    #[tokio::test]
    async fn test_sink_failure_is_swallowed_by_default() {
        let sink = RecordingSink::rejecting();
        let response =
            handle_event(&json!({ "D": scenario_payload() }), Layout::V1, &sink, false).await;

        assert_eq!(response.status_code, 200);
        match response.body {
            ResponseBody::Processed { message, .. } => {
                assert_eq!(message, "Data added! Number of points written: 200")
            }
            other => panic!("unexpected body: {:?}", other),
        }
        assert_eq!(sink.batches().len(), 1);
    }

    #[tokio::test]
    async fn test_non_finite_samples_count_as_attempted() {
        let sink = RecordingSink::default();
        let mut samples = vec![1.5_f32; 200];
        samples[0] = f32::NAN;
        samples[57] = f32::INFINITY;
        let raw = v1_header("1A2B", 5, 6, 2023, 14, 30, 0) + &encode_samples(&samples);

        let response = handle_event(&json!({ "D": raw }), Layout::V1, &sink, false).await;
        assert_eq!(response.status_code, 200);
        match response.body {
            ResponseBody::Processed { message, .. } => {
                assert_eq!(message, "Data added! Number of points written: 200")
            }
            other => panic!("unexpected body: {:?}", other),
        }
        assert_eq!(sink.batches()[0].len(), 200);
    }

    #[tokio::test]
    async fn test_sink_failure_surfaces_when_strict() {
        let sink = RecordingSink::rejecting();
        let response =
            handle_event(&json!({ "D": scenario_payload() }), Layout::V1, &sink, true).await;

        assert_eq!(response.status_code, 500);
        match response.body {
            ResponseBody::Error(message) => assert!(message.contains("401")),
            other => panic!("unexpected body: {:?}", other),
        }
    }
}
