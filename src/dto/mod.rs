use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Shared reply shapes.
pub mod common;
/// Completion submission and leaderboard payloads.
pub mod completion;
/// Result email payloads.
pub mod email;
/// Health check payloads.
pub mod health;
/// Spin payloads.
pub mod spin;
/// Sync diagnostics payloads.
pub mod sync;
/// Wheel snapshot and option payloads.
pub mod wheel;

/// Render an epoch-millisecond timestamp as RFC 3339 text.
pub(crate) fn format_epoch_ms(epoch_ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(epoch_ms) * 1_000_000)
        .ok()
        .and_then(|timestamp| timestamp.format(&Rfc3339).ok())
        .unwrap_or_else(|| "invalid-timestamp".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_milliseconds_format_as_rfc3339() {
        assert_eq!(format_epoch_ms(0), "1970-01-01T00:00:00Z");
        assert_eq!(format_epoch_ms(1_500), "1970-01-01T00:00:01.5Z");
    }
}
