//! Parsing and formatting of `timeout` / `expires` values.
//!
//! Values are written as a sequence of `<number><unit>` pairs, e.g. `5s`,
//! `168h`, `7d` or `1h30m`. The bare value `0` is accepted and means zero.
//! Supported units: `ms`, `s`, `m`, `h`, `d`.

use std::time::Duration;

/// Parses a duration such as `5s`, `1h30m` or `7d`.
pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("empty duration".to_string());
    }
    if input == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total = Duration::ZERO;
    let mut rest = input;
    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("missing unit in duration {:?}", input))?;
        if digits == 0 {
            return Err(format!("invalid duration {:?}", input));
        }
        let value: u64 = rest[..digits]
            .parse()
            .map_err(|_| format!("invalid number in duration {:?}", input))?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let unit = match &rest[..unit_len] {
            "ms" => Duration::from_millis(1),
            "s" => Duration::from_secs(1),
            "m" => Duration::from_secs(60),
            "h" => Duration::from_secs(3600),
            "d" => Duration::from_secs(24 * 3600),
            other => return Err(format!("unknown unit {:?} in duration {:?}", other, input)),
        };
        rest = &rest[unit_len..];

        let part = u32::try_from(value)
            .ok()
            .and_then(|v| unit.checked_mul(v))
            .ok_or_else(|| format!("duration {:?} is too large", input))?;
        total = total
            .checked_add(part)
            .ok_or_else(|| format!("duration {:?} is too large", input))?;
    }
    Ok(total)
}

/// Formats a duration as hours, minutes and seconds (`168h0m0s`, `1m30s`, `0s`).
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();
    let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);

    let seconds = if millis > 0 {
        let fraction = format!("{:03}", millis);
        format!("{}.{}s", seconds, fraction.trim_end_matches('0'))
    } else {
        format!("{}s", seconds)
    };

    if hours > 0 {
        format!("{}h{}m{}", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m{}", minutes, seconds)
    } else {
        seconds
    }
}
