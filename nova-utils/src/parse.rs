/// Parse a duration such as `30s`, `10m`, `2h`, `1d`, `1h30m`, or bare seconds.
///
/// A bare number is only accepted on its own; `1h30` is rejected. Zero
/// durations and overflow return `None`.
pub fn parse_duration_seconds(raw: &str) -> Option<u64> {
    let compact: String = raw.chars().filter(|ch| !ch.is_whitespace()).collect();
    if compact.is_empty() {
        return None;
    }

    if compact.bytes().all(|byte| byte.is_ascii_digit()) {
        return compact.parse::<u64>().ok().filter(|seconds| *seconds > 0);
    }

    let mut total = 0_u64;
    let mut digits = String::new();

    for ch in compact.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }

        let unit = unit_seconds(ch)?;
        let amount = digits.parse::<u64>().ok().filter(|amount| *amount > 0)?;
        total = total.checked_add(amount.checked_mul(unit)?)?;
        digits.clear();
    }

    if !digits.is_empty() || total == 0 {
        return None;
    }

    Some(total)
}

fn unit_seconds(unit: char) -> Option<u64> {
    match unit.to_ascii_lowercase() {
        's' => Some(1),
        'm' => Some(60),
        'h' => Some(3_600),
        'd' => Some(86_400),
        'w' => Some(604_800),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::parse_duration_seconds;

    #[test]
    fn parses_single_units() {
        assert_eq!(parse_duration_seconds("30s"), Some(30));
        assert_eq!(parse_duration_seconds("10m"), Some(600));
        assert_eq!(parse_duration_seconds("2H"), Some(7_200));
        assert_eq!(parse_duration_seconds("1d"), Some(86_400));
        assert_eq!(parse_duration_seconds("1w"), Some(604_800));
    }

    #[test]
    fn parses_compound_and_bare_values() {
        assert_eq!(parse_duration_seconds("1h 30m"), Some(5_400));
        assert_eq!(parse_duration_seconds("90"), Some(90));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(parse_duration_seconds(""), None);
        assert_eq!(parse_duration_seconds("0"), None);
        assert_eq!(parse_duration_seconds("0m"), None);
        assert_eq!(parse_duration_seconds("m"), None);
        assert_eq!(parse_duration_seconds("1h30"), None);
        assert_eq!(parse_duration_seconds("5y"), None);
        assert_eq!(parse_duration_seconds("99999999999999999999s"), None);
    }
}
