use nova_core::{Context, Error};
use nova_gate::{CommandCategory, CommandSpec};

use crate::CommandMeta;

pub const META: CommandMeta = CommandMeta {
    name: "ping",
    desc: "Replies with Pong!",
    usage: "!ping",
    spec: CommandSpec::new("ping", CommandCategory::Utility).cooldown(5),
};

#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    ctx.say("Pong!").await?;
    Ok(())
}
