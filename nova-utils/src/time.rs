use poise::serenity_prelude as serenity;

/// Timestamp `duration_secs` from now, for `disable_communication_until`.
pub fn timeout_until(duration_secs: u64) -> anyhow::Result<serenity::Timestamp> {
    let duration_secs =
        i64::try_from(duration_secs).map_err(|_| anyhow::anyhow!("timeout duration out of range"))?;
    let until = serenity::Timestamp::now()
        .unix_timestamp()
        .saturating_add(duration_secs);
    Ok(serenity::Timestamp::from_unix_timestamp(until)?)
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::timeout_until;

    #[test]
    fn timeout_ends_in_the_future() {
        let now = serenity::Timestamp::now().unix_timestamp();
        let until = timeout_until(3_600).expect("valid timestamp");
        assert!(until.unix_timestamp() >= now + 3_600);
    }

    #[test]
    fn absurd_durations_are_rejected() {
        assert!(timeout_until(u64::MAX).is_err());
    }
}
