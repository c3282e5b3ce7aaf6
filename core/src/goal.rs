//! Goal text parsing
//!
//! A goal is free-form text like "30min", "2 hours", or "2.5h". Goal text is
//! re-parsed on every elapsed-time computation rather than compiled once, so
//! a mid-edit value takes effect immediately. Unparseable text yields no
//! goal rather than an error.

const MS_PER_SECOND: f64 = 1_000.0;
const MS_PER_MINUTE: f64 = 60_000.0;
const MS_PER_HOUR: f64 = 3_600_000.0;

/// Parse a goal duration from free-form text, returning milliseconds.
///
/// Scans for the first decimal number (integer or fractional) followed,
/// after optional whitespace, by a unit token. Units are prefix-matched
/// case-insensitively: `h…` is hours, `m…` is minutes, `s…` is seconds.
/// Only the first match counts; trailing text is ignored. Combined units
/// ("1h30m") are not supported. Returns 0 when nothing matches.
pub fn parse_goal(text: &str) -> u64 {
    let bytes = text.as_bytes();
    for start in 0..bytes.len() {
        if bytes[start].is_ascii_digit()
            && let Some(ms) = match_at(bytes, start)
        {
            return ms;
        }
    }
    0
}

/// Try to match `number`, optional whitespace, then a unit, starting at a
/// digit. Returns `None` when no recognized unit follows the number.
fn match_at(bytes: &[u8], start: usize) -> Option<u64> {
    let mut end = start;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }

    // Fractional part requires at least one digit after the dot
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac = end + 1;
        while frac < bytes.len() && bytes[frac].is_ascii_digit() {
            frac += 1;
        }
        if frac > end + 1 {
            end = frac;
        }
    }

    let value: f64 = std::str::from_utf8(&bytes[start..end]).ok()?.parse().ok()?;

    let mut unit_pos = end;
    while unit_pos < bytes.len() && bytes[unit_pos].is_ascii_whitespace() {
        unit_pos += 1;
    }

    let scale = match bytes.get(unit_pos)?.to_ascii_lowercase() {
        b'h' => MS_PER_HOUR,
        b'm' => MS_PER_MINUTE,
        b's' => MS_PER_SECOND,
        _ => return None,
    };

    Some((value * scale).round() as u64)
}
