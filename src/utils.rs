/// Utility functions for formatting and hex field parsing
use time::macros::format_description;
use time::PrimitiveDateTime;

/// Format a capture time as ISO-8601 without offset
///
/// Produces `YYYY-MM-DDTHH:MM:SS`, the form reported back to callers.
/// Falls back to default string representation if formatting fails.
pub fn format_datetime(dt: &PrimitiveDateTime) -> String {
    let format = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    dt.format(&format).unwrap_or_else(|_| dt.to_string())
}

/// Tag value for a channel index: `v0`..`v19`
pub fn channel_label(index: usize) -> String {
    format!("v{}", index)
}

/// Parse a base-16 integer field, naming the field in the error message
pub fn parse_hex_field(name: &str, hex: Option<&str>) -> Result<u32, String> {
    let hex = hex.ok_or_else(|| format!("{} field is not addressable", name))?;
    u32::from_str_radix(hex, 16).map_err(|e| format!("{} field `{}` is not hex: {}", name, hex, e))
}
