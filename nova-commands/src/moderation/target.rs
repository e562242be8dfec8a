//! Who a moderation command may act on.

use poise::serenity_prelude as serenity;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TargetAction {
    Warn,
    ClearWarnings,
    Timeout,
    Kick,
    Ban,
}

impl TargetAction {
    fn verb(self) -> &'static str {
        match self {
            TargetAction::Warn => "warn",
            TargetAction::ClearWarnings => "clear warnings for",
            TargetAction::Timeout => "timeout",
            TargetAction::Kick => "kick",
            TargetAction::Ban => "ban",
        }
    }

    fn rejects_bots(self) -> bool {
        matches!(self, TargetAction::Warn | TargetAction::Timeout)
    }
}

/// Returns the reply for a target the invoker may not act on.
///
/// Nobody may target themselves. Bot accounts cannot be warned or timed out.
pub fn check_target(
    action: TargetAction,
    invoker: serenity::UserId,
    target: serenity::UserId,
    target_is_bot: bool,
) -> Result<(), String> {
    if target == invoker {
        return Err(match action {
            TargetAction::ClearWarnings => "You cannot clear your own warnings.".to_owned(),
            other => format!("You cannot {} yourself.", other.verb()),
        });
    }

    if target_is_bot && action.rejects_bots() {
        return Err(format!("You cannot {} bots.", action.verb()));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::{TargetAction, check_target};

    const MOD: serenity::UserId = serenity::UserId::new(1);
    const MEMBER: serenity::UserId = serenity::UserId::new(2);

    #[test]
    fn self_targeting_is_rejected_for_every_action() {
        assert_eq!(
            check_target(TargetAction::Warn, MOD, MOD, false),
            Err("You cannot warn yourself.".to_owned())
        );
        assert_eq!(
            check_target(TargetAction::Ban, MOD, MOD, false),
            Err("You cannot ban yourself.".to_owned())
        );
        assert_eq!(
            check_target(TargetAction::ClearWarnings, MOD, MOD, false),
            Err("You cannot clear your own warnings.".to_owned())
        );
    }

    #[test]
    fn bots_cannot_be_warned_or_timed_out() {
        assert_eq!(
            check_target(TargetAction::Warn, MOD, MEMBER, true),
            Err("You cannot warn bots.".to_owned())
        );
        assert_eq!(
            check_target(TargetAction::Timeout, MOD, MEMBER, true),
            Err("You cannot timeout bots.".to_owned())
        );
        assert_eq!(check_target(TargetAction::Kick, MOD, MEMBER, true), Ok(()));
    }

    #[test]
    fn other_members_are_valid_targets() {
        assert_eq!(check_target(TargetAction::Timeout, MOD, MEMBER, false), Ok(()));
    }
}
