use std::collections::HashMap;

use poise::serenity_prelude as serenity;
use tracing::{error, info};

use crate::CommandMeta;
use crate::moderation::embeds::{guild_only_message, is_missing_permissions_error, usage_message};
use nova_core::{Context, Error};
use nova_gate::{CommandCategory, CommandSpec};
use nova_utils::embed::titled_embed;

pub const META: CommandMeta = CommandMeta {
    name: "role",
    desc: "Add or remove a role for a member.",
    usage: "!role <add|remove> <user> <role>",
    spec: CommandSpec::new("role", CommandCategory::Roles).mod_only(),
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RoleChange {
    Add,
    Remove,
}

#[poise::command(
    prefix_command,
    slash_command,
    category = "Roles",
    subcommands("add", "remove")
)]
pub async fn role(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say(usage_message(META.usage)).await?;
    Ok(())
}

/// Add a role to a member.
#[poise::command(prefix_command, slash_command, category = "Roles")]
pub async fn add(
    ctx: Context<'_>,
    #[description = "The member"] user: Option<serenity::User>,
    #[description = "The role to add"] role: Option<serenity::Role>,
) -> Result<(), Error> {
    change_role(ctx, RoleChange::Add, user, role).await
}

/// Remove a role from a member.
#[poise::command(prefix_command, slash_command, category = "Roles")]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "The member"] user: Option<serenity::User>,
    #[description = "The role to remove"] role: Option<serenity::Role>,
) -> Result<(), Error> {
    change_role(ctx, RoleChange::Remove, user, role).await
}

async fn change_role(
    ctx: Context<'_>,
    change: RoleChange,
    user: Option<serenity::User>,
    role: Option<serenity::Role>,
) -> Result<(), Error> {
    let Some(guild_id) = ctx.guild_id() else {
        ctx.say(guild_only_message()).await?;
        return Ok(());
    };

    let (Some(user), Some(role)) = (user, role) else {
        ctx.say(usage_message(META.usage)).await?;
        return Ok(());
    };

    if let Err(message) = check_assignable(guild_id, &role) {
        ctx.say(message).await?;
        return Ok(());
    }

    let http = ctx.http();
    let Ok(target) = guild_id.member(http, user.id).await else {
        ctx.say("Could not find that member.").await?;
        return Ok(());
    };

    let guild = guild_id.to_partial_guild(http).await?;
    let invoker = guild_id.member(http, ctx.author().id).await?;
    let bot = guild_id.member(http, ctx.framework().bot_id).await?;

    let hierarchy = check_hierarchy(
        role.position,
        highest_position(&bot.roles, &guild.roles),
        highest_position(&invoker.roles, &guild.roles),
        guild.owner_id == invoker.user.id,
    );
    if let Err(message) = hierarchy {
        ctx.say(message).await?;
        return Ok(());
    }

    let has_role = target.roles.contains(&role.id);
    if let Err(message) = check_membership(change, has_role, &target.user.tag()) {
        ctx.say(message).await?;
        return Ok(());
    }

    let reason = match change {
        RoleChange::Add => format!("Added by {}", ctx.author().tag()),
        RoleChange::Remove => format!("Removed by {}", ctx.author().tag()),
    };
    let result = match change {
        RoleChange::Add => {
            http.add_member_role(guild_id, user.id, role.id, Some(reason.as_str()))
                .await
        }
        RoleChange::Remove => {
            http.remove_member_role(guild_id, user.id, role.id, Some(reason.as_str()))
                .await
        }
    };

    if let Err(source) = result {
        if !is_missing_permissions_error(&source) {
            error!(?source, "role update failed");
        }
        ctx.say("I couldn't update that member's roles. Check my permissions.")
            .await?;
        return Ok(());
    }

    info!(
        guild_id = %guild_id,
        user_id = %user.id,
        role_id = %role.id,
        moderator_id = %ctx.author().id,
        ?change,
        "member role updated"
    );

    let embed = match change {
        RoleChange::Add => titled_embed(
            "Role Added",
            format!("Added <@&{}> to {}", role.id, target.user.tag()),
        ),
        RoleChange::Remove => titled_embed(
            "Role Removed",
            format!("Removed <@&{}> from {}", role.id, target.user.tag()),
        ),
    };
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

fn highest_position(
    member_roles: &[serenity::RoleId],
    guild_roles: &HashMap<serenity::RoleId, serenity::Role>,
) -> u16 {
    member_roles
        .iter()
        .filter_map(|role_id| guild_roles.get(role_id))
        .map(|role| role.position)
        .max()
        .unwrap_or(0)
}

fn check_assignable(guild_id: serenity::GuildId, role: &serenity::Role) -> Result<(), &'static str> {
    if role.id.get() == guild_id.get() {
        return Err("The @everyone role cannot be assigned.");
    }
    if role.managed {
        return Err("That role is managed by an integration and cannot be assigned.");
    }
    Ok(())
}

/// The role must sit below the bot's highest role, and below the invoker's
/// unless they own the guild.
fn check_hierarchy(
    role_position: u16,
    bot_highest: u16,
    invoker_highest: u16,
    invoker_is_owner: bool,
) -> Result<(), &'static str> {
    if role_position >= bot_highest {
        return Err("I cannot manage this role. It is higher than my highest role.");
    }
    if role_position >= invoker_highest && !invoker_is_owner {
        return Err("You cannot manage this role. It is higher than your highest role.");
    }
    Ok(())
}

fn check_membership(change: RoleChange, has_role: bool, target_tag: &str) -> Result<(), String> {
    match (change, has_role) {
        (RoleChange::Add, true) => Err(format!("{target_tag} already has this role.")),
        (RoleChange::Remove, false) => Err(format!("{target_tag} does not have this role.")),
        _ => Ok(()),
    }
}
