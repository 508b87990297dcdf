/// Expansion of a grouped payload into timestamped points
use time::macros::offset;
use time::{Duration, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use crate::models::{ChannelGrouping, DecodedHeader, TimeSeriesPoint, SAMPLE_COUNT};
use crate::utils::channel_label;

/// Devices report wall-clock time in IST
pub const LOCAL_OFFSET: UtcOffset = offset!(+5:30);
/// Spacing between consecutive samples of one channel
pub const SAMPLE_INTERVAL: Duration = Duration::milliseconds(100);

/// Interpret a device capture time as UTC+05:30 and convert it to UTC
pub fn capture_time_utc(capture_time: PrimitiveDateTime) -> OffsetDateTime {
    capture_time
        .assume_offset(LOCAL_OFFSET)
        .to_offset(UtcOffset::UTC)
}

/// Build one point per (channel, sample) pair
///
/// Sample `k` of every channel is stamped `capture_time_utc + k * 100ms`.
/// Points come out grouped by channel, `v0` first, each channel in
/// ascending timestamp order.
pub fn expand_points(header: &DecodedHeader, grouping: &ChannelGrouping) -> Vec<TimeSeriesPoint> {
    let base = capture_time_utc(header.capture_time);
    let mut points = Vec::with_capacity(SAMPLE_COUNT);

    for (j, values) in grouping.iter() {
        let metric = channel_label(j);
        for (k, value) in values.iter().enumerate() {
            points.push(TimeSeriesPoint {
                series: header.device_id.clone(),
                metric: metric.clone(),
                value: *value,
                timestamp: base + SAMPLE_INTERVAL * k as i32,
            });
        }
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::group_channels;
    use time::macros::datetime;

    fn scenario_header() -> DecodedHeader {
        DecodedHeader {
            device_id: "1A2B".to_string(),
            capture_time: datetime!(2023-06-05 14:30:00),
        }
    }

    #[test]
    fn test_capture_time_utc() {
        assert_eq!(
            capture_time_utc(datetime!(2023-06-05 14:30:00)),
            datetime!(2023-06-05 09:00:00 UTC)
        );
        // crosses midnight backwards
        assert_eq!(
            capture_time_utc(datetime!(2024-01-01 03:00:00)),
            datetime!(2023-12-31 21:30:00 UTC)
        );
    }

    #[test]
    fn test_expand_scenario() {
        let grouping = group_channels(&[1.5; 200]).unwrap();
        let points = expand_points(&scenario_header(), &grouping);

        assert_eq!(points.len(), 200);
        assert!(points.iter().all(|p| p.series == "1A2B" && p.value == 1.5));

        let base_ns = datetime!(2023-06-05 09:00:00 UTC).unix_timestamp_nanos();
        for (i, point) in points.iter().enumerate() {
            let (j, k) = (i / 10, i % 10);
            assert_eq!(point.metric, format!("v{}", j));
            assert_eq!(point.timestamp_nanos(), base_ns + k as i128 * 100_000_000);
        }
    }

    #[test]
    fn test_expand_carries_channel_values() {
        let samples: Vec<f32> = (0..200).map(|i| i as f32).collect();
        let grouping = group_channels(&samples).unwrap();
        let points = expand_points(&scenario_header(), &grouping);

        // v3, k=4 sits at index 3 * 10 + 4 and holds samples[4 * 20 + 3]
        let point = &points[34];
        assert_eq!(point.metric, "v3");
        assert_eq!(point.value, 83.0);
        assert_eq!(point.timestamp, datetime!(2023-06-05 09:00:00.4 UTC));
    }
}
