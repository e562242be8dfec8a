//! Framework-wide pre-command check backed by [`nova_gate::CommandDispatchGate`].

use poise::serenity_prelude as serenity;
use tracing::{debug, warn};

use crate::{CommandMeta, find_meta};
use nova_core::{Context, Error};
use nova_gate::{Decision, InvocationContext, UserContext};
use nova_utils::permissions::{resolve_user_context, user_context_from_parts};

/// Runs before every command. Denied invocations get an ephemeral reply with
/// the denial reason and the command body is skipped.
pub async fn command_check(ctx: Context<'_>) -> Result<bool, Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(true);
    };

    let Some(meta) = find_meta(root_name(&ctx.command().qualified_name)) else {
        warn!(
            command = %ctx.command().qualified_name,
            "command has no gating metadata; allowing"
        );
        return Ok(true);
    };

    let user = match cached_user_context(ctx, guild_id) {
        Some(user) => user,
        None => {
            debug!(guild_id = %guild_id, "guild or member not cached; resolving over HTTP");
            resolve_user_context(ctx.http(), guild_id, ctx.author().id).await?
        }
    };
    let invocation = invocation_for(meta, guild_id.get(), user, ctx.id());

    match ctx.data().gate.evaluate(&invocation).await {
        Decision::Allowed => Ok(true),
        Decision::Denied(reason) => {
            ctx.send(
                poise::CreateReply::default()
                    .content(reason.user_message())
                    .ephemeral(true),
            )
            .await?;
            Ok(false)
        }
    }
}

/// Member roles ride along with the invoking message or interaction; guild
/// roles and the owner come from the gateway cache.
fn cached_user_context(ctx: Context<'_>, guild_id: serenity::GuildId) -> Option<UserContext> {
    let member_roles = match ctx {
        poise::Context::Application(app) => app
            .interaction
            .member
            .as_ref()
            .map(|member| member.roles.clone()),
        poise::Context::Prefix(prefix) => prefix
            .msg
            .member
            .as_ref()
            .map(|member| member.roles.clone()),
    };

    let guild = ctx.guild().map(|guild| {
        let roles = guild
            .roles
            .values()
            .map(|role| (role.id, role.permissions))
            .collect();
        (guild.owner_id, roles)
    });

    user_context_from_cache(guild_id, ctx.author().id, member_roles.as_deref(), guild)
}

fn user_context_from_cache(
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    member_roles: Option<&[serenity::RoleId]>,
    guild: Option<(serenity::UserId, Vec<(serenity::RoleId, serenity::Permissions)>)>,
) -> Option<UserContext> {
    let member_roles = member_roles?;
    let (owner_id, guild_roles) = guild?;

    Some(user_context_from_parts(
        guild_id,
        user_id,
        owner_id,
        member_roles,
        guild_roles,
    ))
}

/// Subcommands are gated under their top-level command.
fn root_name(qualified_name: &str) -> &str {
    qualified_name
        .split_whitespace()
        .next()
        .unwrap_or(qualified_name)
}

fn invocation_for(
    meta: &CommandMeta,
    guild_id: u64,
    user: UserContext,
    invocation_id: u64,
) -> InvocationContext {
    InvocationContext {
        invocation_id: Some(invocation_id),
        guild_id,
        user,
        command: meta.spec,
    }
}
