//! Duration parsing and formatting.

use std::time::Duration;

/// Parse a compound duration string (e.g., "1h30m", "2d", "45s").
///
/// Supported units:
/// - d: days
/// - h: hours
/// - m: minutes
/// - s: seconds
///
/// Components may be combined in any order; returns `None` for empty input
/// or input containing no valid component.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let mut total: u64 = 0;
    let mut matched = false;
    let mut number = String::new();

    for c in input.to_lowercase().chars() {
        if c.is_ascii_digit() {
            number.push(c);
        } else if !number.is_empty() {
            let value: u64 = number.parse().ok()?;
            let seconds = match c {
                'd' => value.checked_mul(86400)?,
                'h' => value.checked_mul(3600)?,
                'm' => value.checked_mul(60)?,
                's' => value,
                _ => return None,
            };
            total = total.checked_add(seconds)?;
            matched = true;
            number.clear();
        } else {
            return None;
        }
    }

    // Trailing digits without a unit are rejected
    if !number.is_empty() || !matched {
        return None;
    }

    Some(Duration::from_secs(total))
}

/// Format a duration as "1h 2m 3s", omitting leading zero components.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

/// Format a duration as "01:02:03" (or "02:03" when under an hour).
pub fn format_compact(duration: Duration) -> String {
    let secs = duration.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}
