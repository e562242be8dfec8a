/// Format seconds compactly, largest two units first (`59s`, `1m 1s`, `1h 30m`, `2d 3h`).
pub fn format_compact_duration(total_seconds: u64) -> String {
    const UNITS: [(u64, &str); 4] = [(86_400, "d"), (3_600, "h"), (60, "m"), (1, "s")];

    let mut remaining = total_seconds;
    let parts: Vec<String> = UNITS
        .iter()
        .filter_map(|(size, suffix)| {
            let amount = remaining / size;
            remaining %= size;
            (amount > 0).then(|| format!("{amount}{suffix}"))
        })
        .take(2)
        .collect();

    if parts.is_empty() {
        "0s".to_owned()
    } else {
        parts.join(" ")
    }
}

/// Role list summary for config replies: `None set` or `<@&1>, <@&2>`.
pub fn format_role_mentions(role_ids: &[String]) -> String {
    let mentions: Vec<String> = role_ids
        .iter()
        .map(|id| id.trim())
        .filter(|id| !id.is_empty())
        .map(|id| format!("<@&{id}>"))
        .collect();

    if mentions.is_empty() {
        "None set".to_owned()
    } else {
        mentions.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::{format_compact_duration, format_role_mentions};

    #[test]
    fn compact_duration_formatting() {
        assert_eq!(format_compact_duration(0), "0s");
        assert_eq!(format_compact_duration(59), "59s");
        assert_eq!(format_compact_duration(60), "1m");
        assert_eq!(format_compact_duration(61), "1m 1s");
        assert_eq!(format_compact_duration(3_600), "1h");
        assert_eq!(format_compact_duration(5_400), "1h 30m");
        assert_eq!(format_compact_duration(3_605), "1h 5s");
        assert_eq!(format_compact_duration(90_000), "1d 1h");
        assert_eq!(format_compact_duration(604_800), "7d");
    }

    #[test]
    fn role_mentions_skip_blank_ids() {
        assert_eq!(format_role_mentions(&[]), "None set");
        assert_eq!(
            format_role_mentions(&["1".to_owned(), " ".to_owned(), "2".to_owned()]),
            "<@&1>, <@&2>"
        );
    }
}
