mod events;

use std::env;
use std::sync::Arc;
use std::time::Duration;

use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, warn};
use tracing_subscriber::Layer;
use tracing_subscriber::filter::filter_fn;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use rustls::crypto::ring::default_provider;

use nova_core::{Data, Error};
use nova_database::{BackendClient, CacheService, Database};
use nova_gate::config_cache::DEFAULT_FETCH_TIMEOUT;
use nova_gate::{CommandDispatchGate, ConfigCache, ConfigService};

/// How often elapsed cooldown slots are dropped.
const PRUNE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer().with_filter(filter_fn(|metadata| {
        let target = metadata.target();

        let within_info_level = *metadata.level() <= tracing::Level::INFO;
        if !within_info_level {
            return false;
        }

        !(target.starts_with("serenity::gateway::bridge::shard_manager")
            || target.starts_with("serenity::gateway::bridge::shard_runner"))
    }));

    tracing_subscriber::registry().with(fmt_layer).init();

    default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("failed to install rustls ring provider"))?;

    dotenvy::dotenv().ok();

    let token = env::var("DISCORD_TOKEN")?;
    let database_url = env::var("DATABASE_URL")?;
    let guild_id = match env::var("DISCORD_GUILD_ID") {
        Ok(raw) if !raw.trim().is_empty() => Some(raw.trim().parse::<u64>()?),
        _ => None,
    };

    let redis_enabled = env_bool("REDIS_ENABLED", false);
    let redis_key_prefix = env::var("REDIS_KEY_PREFIX").unwrap_or_else(|_| "nova:prod".to_string());

    let cache = if redis_enabled {
        match env::var("REDIS_URL") {
            Ok(redis_url) => match CacheService::redis(&redis_url, redis_key_prefix.clone()) {
                Ok(cache) => {
                    info!(key_prefix = %redis_key_prefix, "Redis cache enabled.");
                    cache
                }
                Err(err) => {
                    warn!(?err, key_prefix = %redis_key_prefix, "Failed to initialize Redis cache; continuing with DB-only mode.");
                    CacheService::disabled(redis_key_prefix.clone())
                }
            },
            Err(_) => {
                warn!(key_prefix = %redis_key_prefix, "REDIS_ENABLED=true but REDIS_URL is missing; continuing with DB-only mode.");
                CacheService::disabled(redis_key_prefix.clone())
            }
        }
    } else {
        info!("Redis cache disabled (set REDIS_ENABLED=true to enable).");
        CacheService::disabled(redis_key_prefix.clone())
    };

    if cache.is_redis_enabled() {
        if let Err(err) = cache.ping().await {
            warn!(
                ?err,
                "Redis cache ping failed; cache operations will continue with fallback behavior."
            );
        } else {
            info!("Redis cache health check passed.");
        }
    }

    let db = Database::connect(&database_url, cache).await?;

    let auto_run_migrations = env_bool("AUTO_RUN_MIGRATIONS", true);
    if auto_run_migrations {
        db.run_migrations().await?;
        info!("Database migrations applied.");
    } else {
        info!("Auto migrations disabled (set AUTO_RUN_MIGRATIONS=true to run at startup).");
    }

    let backend = BackendClient::from_env_optional()?;
    let config_service: Arc<dyn ConfigService> = match &backend {
        Some(client) => {
            info!("Guild configs served by the dashboard backend.");
            Arc::new(client.clone())
        }
        None => {
            info!("Guild configs read from PostgreSQL (set BACKEND_URL to use the dashboard backend).");
            Arc::new(db.clone())
        }
    };

    let fetch_timeout_ms = env_u64(
        "CONFIG_FETCH_TIMEOUT_MS",
        u64::try_from(DEFAULT_FETCH_TIMEOUT.as_millis()).unwrap_or(5_000),
    );
    let configs = Arc::new(
        ConfigCache::new(config_service).with_fetch_timeout(Duration::from_millis(fetch_timeout_ms)),
    );
    info!(fetch_timeout_ms, "Guild config cache ready.");

    let data = Data::new(db, backend, configs)
        .with_delete_config_on_leave(env_bool("DELETE_CONFIG_ON_LEAVE", false));

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: nova_commands::commands(),
            command_check: Some(|ctx| Box::pin(nova_commands::gate::command_check(ctx))),
            event_handler: |ctx, event, framework, data| {
                Box::pin(handle_event(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(nova_utils::COMMAND_PREFIX.to_string()),
                mention_as_prefix: false,
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                info!("Nova is online.");

                match guild_id {
                    Some(guild_id) => {
                        poise::builtins::register_in_guild(
                            ctx,
                            &framework.options().commands,
                            serenity::GuildId::new(guild_id),
                        )
                        .await?;
                        info!(guild_id, "Slash commands registered in guild.");
                    }
                    None => {
                        poise::builtins::register_globally(ctx, &framework.options().commands)
                            .await?;
                        info!("Slash commands registered globally.");
                    }
                }

                spawn_prune_task(Arc::clone(&data.gate));

                Ok(data)
            })
        })
        .build();

    info!("Nova is connecting...");

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await?;

    client.start().await?;
    Ok(())
}

fn env_bool(key: &str, default: bool) -> bool {
    match env::var(key) {
        Ok(value) => matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(value) => value.trim().parse::<u64>().unwrap_or(default),
        Err(_) => default,
    }
}

fn spawn_prune_task(gate: Arc<CommandDispatchGate>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            let pruned = gate.prune_expired();
            if pruned > 0 {
                debug!(pruned, "pruned expired cooldowns");
            }
        }
    });
}

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!(?error, command = %ctx.command().qualified_name, "command error");

            let embed = serenity::CreateEmbed::new()
                .title("An error occurred")
                .description("An unexpected error occurred while executing this command.")
                .color(nova_utils::embed::DEFAULT_EMBED_COLOR);

            let _ = ctx
                .send(poise::CreateReply::default().ephemeral(true).embed(embed))
                .await;
        }
        poise::FrameworkError::CommandCheckFailed { error, ctx, .. } => match error {
            Some(error) => {
                error!(?error, command = %ctx.command().qualified_name, "command check failed");
                let _ = ctx
                    .send(
                        poise::CreateReply::default()
                            .ephemeral(true)
                            .content("Couldn't verify your permissions. Please try again."),
                    )
                    .await;
            }
            None => debug!(command = %ctx.command().qualified_name, "command invocation denied"),
        },
        poise::FrameworkError::ArgumentParse { ctx, input, .. } => {
            let usage = format!("Usage: `!{}`", ctx.command().qualified_name);
            let description = if let Some(input) = input {
                format!("Invalid argument: `{}`\n{}", input, usage)
            } else {
                format!("Missing required argument.\n{}", usage)
            };

            let _ = ctx.say(description).await;
        }
        poise::FrameworkError::UnknownCommand { .. } => {
            debug!("unknown command invocation");
        }
        other => {
            error!(?other, "framework error");
        }
    }
}

async fn handle_event(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::GuildCreate { guild, is_new } => {
            events::guild::handle_guild_create(data, guild, *is_new).await;
        }
        serenity::FullEvent::GuildDelete { incomplete, .. } => {
            events::guild::handle_guild_delete(data, incomplete).await;
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            events::member::handle_member_add(ctx, data, new_member).await;
        }
        serenity::FullEvent::GuildMemberRemoval { guild_id, user, .. } => {
            events::member::handle_member_remove(ctx, data, *guild_id, user).await;
        }
        _ => {}
    }

    Ok(())
}
