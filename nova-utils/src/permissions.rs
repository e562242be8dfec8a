use poise::serenity_prelude as serenity;

use nova_gate::UserContext;

/// Build a gate user context from already-fetched guild data.
///
/// `roles` yields every guild role with its permission bits. The `@everyone`
/// role (id equal to the guild id) counts toward the administrator check but
/// is not listed in the context's role ids.
pub fn user_context_from_parts(
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    owner_id: serenity::UserId,
    member_roles: &[serenity::RoleId],
    roles: impl IntoIterator<Item = (serenity::RoleId, serenity::Permissions)>,
) -> UserContext {
    let everyone_role_id = serenity::RoleId::new(guild_id.get());

    let mut resolved = serenity::Permissions::empty();
    for (role_id, permissions) in roles {
        if role_id == everyone_role_id || member_roles.contains(&role_id) {
            resolved |= permissions;
        }
    }

    let role_ids = member_roles
        .iter()
        .filter(|role_id| **role_id != everyone_role_id)
        .map(|role_id| role_id.get().to_string())
        .collect();

    let mut user = UserContext::new(user_id.get(), role_ids);
    user.is_owner = owner_id == user_id;
    user.has_administrator = resolved.contains(serenity::Permissions::ADMINISTRATOR);
    user
}

/// Resolve the invoking user's role ids and elevated status over HTTP.
pub async fn resolve_user_context(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
) -> anyhow::Result<UserContext> {
    let guild = guild_id.to_partial_guild(http).await?;
    let member = guild_id.member(http, user_id).await?;

    Ok(user_context_from_parts(
        guild_id,
        user_id,
        guild.owner_id,
        &member.roles,
        guild.roles.values().map(|role| (role.id, role.permissions)),
    ))
}

#[cfg(test)]
mod tests {
    use poise::serenity_prelude as serenity;

    use super::user_context_from_parts;

    const GUILD: serenity::GuildId = serenity::GuildId::new(100);
    const USER: serenity::UserId = serenity::UserId::new(7);
    const OWNER: serenity::UserId = serenity::UserId::new(8);

    fn role(id: u64) -> serenity::RoleId {
        serenity::RoleId::new(id)
    }

    #[test]
    fn member_roles_become_string_ids() {
        let user = user_context_from_parts(
            GUILD,
            USER,
            OWNER,
            &[role(200), role(300)],
            [
                (role(100), serenity::Permissions::SEND_MESSAGES),
                (role(200), serenity::Permissions::KICK_MEMBERS),
                (role(300), serenity::Permissions::empty()),
            ],
        );

        assert_eq!(user.user_id, 7);
        assert_eq!(user.roles, vec!["200".to_owned(), "300".to_owned()]);
        assert!(!user.is_owner);
        assert!(!user.has_administrator);
    }

    #[test]
    fn administrator_from_any_held_role() {
        let user = user_context_from_parts(
            GUILD,
            USER,
            OWNER,
            &[role(200)],
            [
                (role(200), serenity::Permissions::ADMINISTRATOR),
                (role(400), serenity::Permissions::empty()),
            ],
        );
        assert!(user.has_administrator);
    }

    #[test]
    fn unheld_admin_role_is_ignored() {
        let user = user_context_from_parts(
            GUILD,
            USER,
            OWNER,
            &[],
            [(role(200), serenity::Permissions::ADMINISTRATOR)],
        );
        assert!(!user.has_administrator);
        assert!(user.roles.is_empty());
    }

    #[test]
    fn guild_owner_is_flagged() {
        let user = user_context_from_parts(GUILD, OWNER, OWNER, &[], []);
        assert!(user.is_owner);
        assert!(user.bypasses_role_checks());
    }
}
