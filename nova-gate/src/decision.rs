use std::fmt;

/// Which rule rejected an invocation for lack of permission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Requirement {
    Moderator,
    Administrator,
    CommandRoles,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DenyReason {
    FeatureDisabled,
    InsufficientPermission(Requirement),
    OnCooldown { remaining_secs: f64 },
}

impl DenyReason {
    /// Text shown to the invoking user.
    pub fn user_message(&self) -> String {
        match self {
            DenyReason::FeatureDisabled => "This feature is disabled in this server.".to_owned(),
            DenyReason::InsufficientPermission(Requirement::Moderator) => {
                "You must be a moderator to use this command.".to_owned()
            }
            DenyReason::InsufficientPermission(Requirement::Administrator) => {
                "You must be an administrator to use this command.".to_owned()
            }
            DenyReason::InsufficientPermission(Requirement::CommandRoles) => {
                "You do not have permission to use this command.".to_owned()
            }
            DenyReason::OnCooldown { remaining_secs } => format!(
                "Please wait {remaining_secs:.1} seconds before using this command again."
            ),
        }
    }
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenyReason::FeatureDisabled => f.write_str("feature disabled"),
            DenyReason::InsufficientPermission(requirement) => {
                write!(f, "insufficient permission ({requirement:?})")
            }
            DenyReason::OnCooldown { remaining_secs } => {
                write!(f, "on cooldown ({remaining_secs:.1}s remaining)")
            }
        }
    }
}

/// Outcome of gating a single invocation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Decision {
    Allowed,
    Denied(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed)
    }

    pub fn denial(&self) -> Option<&DenyReason> {
        match self {
            Decision::Allowed => None,
            Decision::Denied(reason) => Some(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Decision, DenyReason, Requirement};

    #[test]
    fn cooldown_message_rounds_to_one_decimal() {
        let reason = DenyReason::OnCooldown {
            remaining_secs: 4.96,
        };
        assert_eq!(
            reason.user_message(),
            "Please wait 5.0 seconds before using this command again."
        );
    }

    #[test]
    fn permission_messages_name_the_missing_tier() {
        assert_eq!(
            DenyReason::InsufficientPermission(Requirement::Moderator).user_message(),
            "You must be a moderator to use this command."
        );
        assert_eq!(
            DenyReason::InsufficientPermission(Requirement::CommandRoles).user_message(),
            "You do not have permission to use this command."
        );
    }

    #[test]
    fn denial_accessor() {
        assert_eq!(Decision::Allowed.denial(), None);
        assert_eq!(
            Decision::Denied(DenyReason::FeatureDisabled).denial(),
            Some(&DenyReason::FeatureDisabled)
        );
    }
}
