use serde::ser::{Serialize, SerializeMap, Serializer};
use time::{OffsetDateTime, PrimitiveDateTime};

use crate::utils::channel_label;

pub const SAMPLE_COUNT: usize = 200;
pub const CHANNEL_COUNT: usize = 20;
pub const SAMPLES_PER_CHANNEL: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedHeader {
    /// Hex characters copied verbatim from the payload, used as the series name
    pub device_id: String,
    /// Wall-clock time on the device, UTC+05:30
    pub capture_time: PrimitiveDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedPayload {
    pub header: DecodedHeader,
    pub samples: Vec<f32>,
}

/// 20 channels of 10 samples, channel `j` holding the `j`-th value of every
/// 20-sample block in block order
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelGrouping {
    channels: Vec<Vec<f32>>,
}

impl ChannelGrouping {
    pub(crate) fn from_channels(channels: Vec<Vec<f32>>) -> Self {
        Self { channels }
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    /// Iterate `(channel index, samples)` in channel order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[f32])> {
        self.channels
            .iter()
            .enumerate()
            .map(|(j, values)| (j, values.as_slice()))
    }

    /// Number of channels
    pub(crate) fn len(&self) -> usize {
        self.channels.len()
    }
}

// Serialized as {"v0": [...], "v1": [...], ...} keeping channel order
impl Serialize for ChannelGrouping {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.channels.len()))?;
        for (j, values) in self.iter() {
            map.serialize_entry(&channel_label(j), values)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeriesPoint {
    pub series: String,
    pub metric: String,
    pub value: f32,
    pub timestamp: OffsetDateTime,
}

impl TimeSeriesPoint {
    pub fn timestamp_nanos(&self) -> i128 {
        self.timestamp.unix_timestamp_nanos()
    }
}
