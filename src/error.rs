/// Error types for decoding, storage and configuration
use thiserror::Error;

/// Structural or semantic problems with a PIC payload
///
/// Decoding is all-or-nothing: any of these aborts the record before
/// anything is handed to the sink.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("hex string is too short to extract pic, date, and time: need {need} chars, got {got}")]
    TooShort { need: usize, got: usize },
    #[error("invalid date/time: {0}")]
    InvalidDateTime(String),
    #[error("incorrect data format: expected 200 float values but got {0}")]
    SampleCountMismatch(usize),
    #[error("incorrect data format: v{channel} has {got} values instead of 10")]
    GroupingMismatch { channel: usize, got: usize },
}

/// Failures while writing a point batch to the time-series store
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("invalid sink endpoint: {0}")]
    Endpoint(String),
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("sink rejected write with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("invalid INFLUX_URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("unknown payload layout `{0}`, expected v1 or v2")]
    UnknownLayout(String),
    #[error("invalid boolean for {name}: `{value}`")]
    InvalidFlag { name: &'static str, value: String },
}

/// Anything that stops a payload from being processed end to end
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Sink(#[from] SinkError),
}
