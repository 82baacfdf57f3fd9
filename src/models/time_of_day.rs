/// Normalizes a preferred-time entry such as `"2pm"`, `"9:5 am"` or `"14:30"`
/// to `HH:MM`. Out-of-range parts are clamped rather than rejected, since
/// this only feeds display and scheduling hints.
pub fn parse_time_to_24h(value: &str) -> Option<String> {
    let lower = value.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }

    let (clock, period) = if let Some(rest) = lower.strip_suffix("am") {
        (rest.trim_end(), Some(false))
    } else if let Some(rest) = lower.strip_suffix("pm") {
        (rest.trim_end(), Some(true))
    } else {
        (lower.as_str(), None)
    };

    let (hour_part, minute_part) = match clock.split_once(':') {
        Some((h, m)) => (h, Some(m)),
        None => (clock, None),
    };

    if !is_short_number(hour_part) {
        return None;
    }
    let mut hour: u32 = hour_part.parse().ok()?;
    let mut minute: u32 = match minute_part {
        Some(m) if is_short_number(m) => m.parse().ok()?,
        Some(_) => return None,
        None => 0,
    };

    match period {
        Some(true) if hour < 12 => hour += 12,
        Some(false) if hour == 12 => hour = 0,
        _ => {}
    }

    hour = hour.min(23);
    minute = minute.min(59);

    Some(format!("{hour:02}:{minute:02}"))
}

/// Renders a time as `h:MM AM/PM`, returning the input untouched when it
/// cannot be read as a time.
pub fn format_time_12h(value: &str) -> String {
    if value.trim().is_empty() {
        return String::new();
    }

    let Some(normalized) = parse_time_to_24h(value) else {
        return value.to_string();
    };
    let Some((h, m)) = normalized.split_once(':') else {
        return value.to_string();
    };
    let (Ok(hour), Ok(minute)) = (h.parse::<u32>(), m.parse::<u32>()) else {
        return value.to_string();
    };

    let period = if hour >= 12 { "PM" } else { "AM" };
    let display_hour = (hour + 11) % 12 + 1;
    format!("{display_hour}:{minute:02} {period}")
}

fn is_short_number(s: &str) -> bool {
    (1..=2).contains(&s.len()) && s.chars().all(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_variants() {
        assert_eq!(parse_time_to_24h("2pm").as_deref(), Some("14:00"));
        assert_eq!(parse_time_to_24h(" 9:5 am ").as_deref(), Some("09:05"));
        assert_eq!(parse_time_to_24h("12 AM").as_deref(), Some("00:00"));
        assert_eq!(parse_time_to_24h("12:30pm").as_deref(), Some("12:30"));
        assert_eq!(parse_time_to_24h("14:30").as_deref(), Some("14:30"));
    }

    #[test]
    fn test_parse_clamps() {
        assert_eq!(parse_time_to_24h("27:75").as_deref(), Some("23:59"));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_time_to_24h(""), None);
        assert_eq!(parse_time_to_24h("morning"), None);
        assert_eq!(parse_time_to_24h("123:00"), None);
        assert_eq!(parse_time_to_24h("10:"), None);
    }

    #[test]
    fn test_format_12h() {
        assert_eq!(format_time_12h("14:05"), "2:05 PM");
        assert_eq!(format_time_12h("00:00"), "12:00 AM");
        assert_eq!(format_time_12h("12:00"), "12:00 PM");
        assert_eq!(format_time_12h("9am"), "9:00 AM");
        assert_eq!(format_time_12h("flexible"), "flexible");
        assert_eq!(format_time_12h(""), "");
    }
}
