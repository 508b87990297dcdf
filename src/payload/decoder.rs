/// PIC hex payload decoding
use log::{debug, info, warn};
use time::{Date, Month, PrimitiveDateTime, Time};

use crate::error::DecodeError;
use crate::models::{DecodedHeader, DecodedPayload, SAMPLE_COUNT};
use crate::payload::layout::LayoutSpec;
use crate::utils::parse_hex_field;

const CHUNK_HEX_LEN: usize = 8; // one little-endian f32

/// Decode a PIC payload into its header and 200 float samples
///
/// The payload is a hex string: a layout-specific header (device id, pad,
/// six date/time fields) followed by 8-hex-character little-endian IEEE-754
/// floats. Chunks that fail to decode are logged and dropped, a trailing
/// partial chunk is ignored, and the surviving sample count must be exactly
/// 200.
///
/// # Arguments
/// * `raw` - Hex string as received from the device
/// * `spec` - Offsets and validation policy of the deployed layout
///
/// # Returns
/// The decoded payload, or the first structural problem found
pub fn decode_payload(raw: &str, spec: &LayoutSpec) -> Result<DecodedPayload, DecodeError> {
    if raw.len() < spec.header_len {
        return Err(DecodeError::TooShort {
            need: spec.header_len,
            got: raw.len(),
        });
    }
    // Everything below indexes the header by byte offset
    if !raw.as_bytes()[..spec.header_len].is_ascii() {
        return Err(DecodeError::InvalidDateTime(
            "header contains non-hex characters".to_string(),
        ));
    }

    let header = decode_header(raw, spec)?;
    let samples = decode_samples(&raw[spec.header_len..]);

    if samples.len() != SAMPLE_COUNT {
        return Err(DecodeError::SampleCountMismatch(samples.len()));
    }

    Ok(DecodedPayload { header, samples })
}

fn decode_header(raw: &str, spec: &LayoutSpec) -> Result<DecodedHeader, DecodeError> {
    let device_id = raw[..spec.id_width].to_string();
    info!("PIC ID: {}", device_id);

    let field = |name: &str, range: &std::ops::Range<usize>| {
        parse_hex_field(name, raw.get(range.clone())).map_err(DecodeError::InvalidDateTime)
    };

    let day = field("day", &spec.day)?;
    let month = field("month", &spec.month)?;
    let year = field("year", &spec.year)?;
    let hour = field("hour", &spec.hour)?;
    let minute = field("minute", &spec.minute)?;
    let second = field("second", &spec.second)?;

    if spec.validate_month_range && !(1..=12).contains(&month) {
        return Err(DecodeError::InvalidDateTime(format!(
            "invalid month value: {}",
            month
        )));
    }
    let year = normalize_year(year)?;

    info!(
        "Parsed Date and Time: {}/{}/{} {}:{}:{}",
        day, month, year, hour, minute, second
    );

    let month = u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .ok_or_else(|| DecodeError::InvalidDateTime(format!("month {} out of range", month)))?;
    let date = Date::from_calendar_date(year, month, to_u8("day", day)?)
        .map_err(|e| DecodeError::InvalidDateTime(e.to_string()))?;
    let time = Time::from_hms(
        to_u8("hour", hour)?,
        to_u8("minute", minute)?,
        to_u8("second", second)?,
    )
    .map_err(|e| DecodeError::InvalidDateTime(e.to_string()))?;

    Ok(DecodedHeader {
        device_id,
        capture_time: PrimitiveDateTime::new(date, time),
    })
}

/// Apply the two-digit year rule
///
/// Years below 100 are offsets from 2000, years 100..1900 are rejected and
/// anything from 1900 up is taken as-is.
pub fn normalize_year(year: u32) -> Result<i32, DecodeError> {
    match year {
        0..=99 => Ok(2000 + year as i32),
        100..=1899 => Err(DecodeError::InvalidDateTime(format!(
            "invalid year value: {}",
            year
        ))),
        _ => i32::try_from(year)
            .map_err(|_| DecodeError::InvalidDateTime(format!("invalid year value: {}", year))),
    }
}

fn to_u8(name: &str, value: u32) -> Result<u8, DecodeError> {
    u8::try_from(value)
        .map_err(|_| DecodeError::InvalidDateTime(format!("{} value {} out of range", name, value)))
}

/// Decode the sample region into floats, dropping chunks that are not hex
///
/// Chunks are counted in characters, so a stray multi-byte character costs
/// one chunk rather than shifting every chunk after it.
fn decode_samples(body: &str) -> Vec<f32> {
    let chars: Vec<char> = body.chars().collect();
    let mut values = Vec::with_capacity(SAMPLE_COUNT);

    for (index, chunk) in chars.chunks(CHUNK_HEX_LEN).enumerate() {
        if chunk.len() < CHUNK_HEX_LEN {
            debug!("Discarding trailing partial chunk of {} chars", chunk.len());
            break;
        }

        let chunk: String = chunk.iter().collect();
        match decode_float(&chunk) {
            Some(value) => values.push(value),
            None => warn!("Invalid hex chunk {}: {}", index, chunk),
        }
    }

    values
}

/// Decode 8 hex characters as a little-endian f32
pub fn decode_float(chunk: &str) -> Option<f32> {
    let bytes: [u8; 4] = hex::decode(chunk).ok()?.try_into().ok()?;
    Some(f32::from_le_bytes(bytes))
}
