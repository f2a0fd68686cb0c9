//! Text forms of scalar values

use chrono::{DateTime, Offset, TimeZone};
use std::time::Duration;

const NANOS_PER_TICK: u32 = 100;
const TICKS_PER_SECOND: u32 = 10_000_000;

/// Round-trip timestamp text: `2024-05-01T12:00:00.1234567+02:00`.
///
/// Seven fractional digits (100ns ticks) and an explicit `+hh:mm` offset,
/// including `+00:00` for UTC.
pub fn format_timestamp<Tz: TimeZone>(value: &DateTime<Tz>) -> String {
    let fixed = value.with_timezone(&value.offset().fix());
    let ticks = (fixed.timestamp_subsec_nanos() % 1_000_000_000) / NANOS_PER_TICK;
    format!(
        "{}.{:07}{}",
        fixed.format("%Y-%m-%dT%H:%M:%S"),
        ticks,
        fixed.format("%:z")
    )
}

/// Duration text: `[d.]hh:mm:ss[.fffffff]`.
///
/// The day part appears only for durations of a day or more; the fraction
/// only when there are sub-second ticks.
pub fn format_duration(value: Duration) -> String {
    let total = value.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;
    let ticks = value.subsec_nanos() / NANOS_PER_TICK;

    let mut out = String::new();
    if days > 0 {
        out.push_str(&format!("{}.", days));
    }
    out.push_str(&format!("{:02}:{:02}:{:02}", hours, minutes, seconds));
    if ticks > 0 {
        debug_assert!(ticks < TICKS_PER_SECOND);
        out.push_str(&format!(".{:07}", ticks));
    }
    out
}

/// Shortest text that reads back to the same float.
///
/// Returns `None` for NaN and infinities, which JSON cannot express.
pub fn format_float(value: f64) -> Option<String> {
    if value.is_finite() {
        Some(value.to_string())
    } else {
        None
    }
}
