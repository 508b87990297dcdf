/// Regrouping of the sample block into metric channels
use crate::error::DecodeError;
use crate::models::{ChannelGrouping, CHANNEL_COUNT, SAMPLES_PER_CHANNEL, SAMPLE_COUNT};

/// Transpose 200 samples into 20 channels of 10
///
/// The block is read as 10 consecutive groups of 20; the `j`-th value of
/// each group goes to channel `j`, so `channel(j)[k] == samples[k * 20 + j]`.
pub fn group_channels(samples: &[f32]) -> Result<ChannelGrouping, DecodeError> {
    if samples.len() != SAMPLE_COUNT {
        return Err(DecodeError::SampleCountMismatch(samples.len()));
    }

    let mut channels = vec![Vec::with_capacity(SAMPLES_PER_CHANNEL); CHANNEL_COUNT];
    for block in samples.chunks(CHANNEL_COUNT) {
        for (j, value) in block.iter().enumerate() {
            channels[j].push(*value);
        }
    }

    if let Some((channel, values)) = channels
        .iter()
        .enumerate()
        .find(|(_, values)| values.len() != SAMPLES_PER_CHANNEL)
    {
        return Err(DecodeError::GroupingMismatch {
            channel,
            got: values.len(),
        });
    }

    Ok(ChannelGrouping::from_channels(channels))
}

/// Number of complete 20-sample blocks in a sample sequence
pub fn block_count(samples: &[f32]) -> usize {
    samples.len() / CHANNEL_COUNT
}
