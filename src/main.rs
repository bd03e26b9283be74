// ForUS bot entry point.
//
// Reads the config, opens the database, builds `Data`, then hands control to
// poise. Gateway events are routed to handlers in `event_handler`; commands
// live under `discord/commands`.

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with half a dozen mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::config::BotConfig;
use crate::core::logging::StructureAction;
use crate::discord::commands::presence;
use crate::discord::jobs::delivery;
use crate::discord::leveling_announcements::handle_message_xp;
use crate::discord::logging::events as logging_events;
use crate::discord::members::events as member_events;
use crate::discord::moderation::automod_handler::handle_message_for_automod;
use crate::discord::moderation::spam_handler::handle_message_for_spam;
use crate::discord::{Data, Error};
use crate::infra::database;
use crate::infra::http::HttpContentSource;
use anyhow::Context as _;
use poise::serenity_prelude as serenity;

/// Event handler for non-command Discord events.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Message { new_message } => {
            if new_message.author.bot || new_message.guild_id.is_none() {
                return Ok(());
            }

            // Remember the message first so a later automod delete is still logged with content.
            logging_events::track_message(data, new_message);

            match handle_message_for_automod(ctx, new_message, data).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) => tracing::error!("Automod check failed: {:#}", e),
            }

            match handle_message_for_spam(ctx, new_message, data).await {
                Ok(true) => return Ok(()),
                Ok(false) => {}
                Err(e) => tracing::error!("Flood check failed: {:#}", e),
            }

            if let Err(e) = handle_message_xp(ctx, new_message, data).await {
                tracing::error!("Error processing XP for message: {:#}", e);
            }
        }
        serenity::FullEvent::GuildMemberAddition { new_member } => {
            if let Err(e) = member_events::handle_member_join(ctx, data, new_member).await {
                tracing::error!("Error handling member join: {:#}", e);
            }
            if let Err(e) = logging_events::handle_member_join(ctx, data, new_member).await {
                tracing::error!("Error handling member join log: {:#}", e);
            }
        }
        serenity::FullEvent::GuildMemberRemoval {
            guild_id,
            user,
            member_data_if_available,
        } => {
            let member = member_data_if_available.as_ref();
            if let Err(e) =
                member_events::handle_member_remove(ctx, data, *guild_id, user, member).await
            {
                tracing::error!("Error handling member removal: {:#}", e);
            }
            if let Err(e) =
                logging_events::handle_member_remove(ctx, data, *guild_id, user, member).await
            {
                tracing::error!("Error handling member remove log: {:#}", e);
            }
        }
        serenity::FullEvent::MessageDelete {
            channel_id,
            deleted_message_id,
            guild_id,
        } => {
            if let Err(e) = logging_events::handle_message_delete(
                ctx,
                data,
                *channel_id,
                *deleted_message_id,
                *guild_id,
            )
            .await
            {
                tracing::error!("Error handling message delete: {:#}", e);
            }
        }
        serenity::FullEvent::MessageUpdate {
            old_if_available,
            event,
            ..
        } => {
            if let Err(e) =
                logging_events::handle_message_update(ctx, data, old_if_available.as_ref(), event)
                    .await
            {
                tracing::error!("Error handling message update: {:#}", e);
            }
        }
        serenity::FullEvent::VoiceStateUpdate { old, new } => {
            if let Err(e) =
                logging_events::handle_voice_state_update(ctx, data, old.as_ref(), new).await
            {
                tracing::error!("Error handling voice state update: {:#}", e);
            }
        }
        serenity::FullEvent::ChannelCreate { channel } => {
            if let Err(e) =
                logging_events::handle_channel(ctx, data, channel, StructureAction::Created).await
            {
                tracing::error!("Error handling channel create: {:#}", e);
            }
        }
        serenity::FullEvent::ChannelDelete { channel, .. } => {
            if let Err(e) =
                logging_events::handle_channel(ctx, data, channel, StructureAction::Deleted).await
            {
                tracing::error!("Error handling channel delete: {:#}", e);
            }
        }
        serenity::FullEvent::GuildRoleCreate { new } => {
            if let Err(e) = logging_events::handle_role(
                ctx,
                data,
                new.guild_id,
                new.id,
                Some(&new.name),
                StructureAction::Created,
            )
            .await
            {
                tracing::error!("Error handling role create: {:#}", e);
            }
        }
        serenity::FullEvent::GuildRoleDelete {
            guild_id,
            removed_role_id,
            removed_role_data_if_available,
        } => {
            let name = removed_role_data_if_available
                .as_ref()
                .map(|role| role.name.as_str());
            if let Err(e) = logging_events::handle_role(
                ctx,
                data,
                *guild_id,
                *removed_role_id,
                name,
                StructureAction::Deleted,
            )
            .await
            {
                tracing::error!("Error handling role delete: {:#}", e);
            }
        }
        serenity::FullEvent::ReactionAdd { add_reaction } => {
            if let Err(e) = logging_events::handle_reaction(ctx, data, add_reaction, true).await {
                tracing::error!("Error handling reaction add: {:#}", e);
            }
        }
        serenity::FullEvent::ReactionRemove { removed_reaction } => {
            if let Err(e) =
                logging_events::handle_reaction(ctx, data, removed_reaction, false).await
            {
                tracing::error!("Error handling reaction remove: {:#}", e);
            }
        }
        _ => {}
    }

    Ok(())
}

/// Log command failures, tell the user something went wrong and mirror the
/// failure into the activity log.
async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Command { error, ctx, .. } => {
            let command = ctx.command().qualified_name.clone();
            tracing::error!(command = %command, "Command failed: {}", error);

            if let Err(e) = ctx
                .send(
                    poise::CreateReply::default()
                        .content("Terjadi kesalahan saat menjalankan perintah. Coba lagi nanti.")
                        .ephemeral(true),
                )
                .await
            {
                tracing::warn!("Failed to report command error: {}", e);
            }

            if let Err(e) = logging_events::log_command_use(
                ctx.serenity_context(),
                ctx.data(),
                ctx.guild_id(),
                ctx.channel_id(),
                ctx.author(),
                command,
                Some(error.to_string()),
            )
            .await
            {
                tracing::warn!("Failed to log command error: {:#}", e);
            }
        }
        other => {
            if let Err(e) = poise::builtins::on_error(other).await {
                tracing::error!("Error while handling error: {}", e);
            }
        }
    }
}

async fn register_commands(
    ctx: &serenity::Context,
    commands: &[poise::Command<Data, Error>],
    guild_ids: &[u64],
) -> Result<(), Error> {
    if guild_ids.is_empty() {
        poise::builtins::register_globally(ctx, commands).await?;
        tracing::info!(count = commands.len(), "Registered commands globally");
        return Ok(());
    }

    for guild_id in guild_ids {
        poise::builtins::register_in_guild(ctx, commands, serenity::GuildId::new(*guild_id))
            .await?;
        tracing::info!(guild_id, count = commands.len(), "Registered commands in guild");
    }
    // Guild registration wins; clear the global set so commands don't show up twice.
    serenity::Command::set_global_commands(ctx, Vec::new()).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    let config = BotConfig::from_env().context("Invalid bot configuration")?;

    tracing_subscriber::fmt()
        .with_max_level(config.tracing_level())
        .with_target(false)
        .init();

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // This is the "composition root" where we wire everything together.

    let pool = database::connect(&config.database_url)
        .await
        .context("Failed to open database")?;
    database::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let http = HttpContentSource::new().context("Failed to build HTTP client")?;
    let token = config.token.clone();
    let guild_ids = config.guild_ids.clone();
    let data = Data::new(config, pool.clone(), http);
    let scheduler = data.scheduler.clone();

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================

    let intents = serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS
        | serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::GUILD_VOICE_STATES
        | serenity::GatewayIntents::GUILD_MESSAGE_REACTIONS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: discord::commands::all(),
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            // Hook to run after every successful command
            post_command: |ctx| {
                Box::pin(async move {
                    if let Err(e) = logging_events::log_command_use(
                        ctx.serenity_context(),
                        ctx.data(),
                        ctx.guild_id(),
                        ctx.channel_id(),
                        ctx.author(),
                        ctx.command().qualified_name.clone(),
                        None,
                    )
                    .await
                    {
                        tracing::warn!("Failed to log command use: {:#}", e);
                    }
                })
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                tracing::info!(user = %ready.user.name, "Bot is starting up");

                let commands = &framework.options().commands;
                register_commands(ctx, commands, &guild_ids).await?;

                if let Err(e) = delivery::restore_jobs(ctx, &data).await {
                    tracing::error!("Failed to restore scheduled jobs: {:#}", e);
                }

                presence::start_rotation(
                    ctx,
                    &data,
                    framework.shard_manager().clone(),
                    commands.len(),
                );

                tracing::info!("Bot is ready");
                Ok(data)
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("Error creating client")?;

    let shard_manager = client.shard_manager.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutting down");
            scheduler.shutdown();
            shard_manager.shutdown_all().await;
        }
    });

    client.start().await.context("Error running bot")?;
    pool.close().await;
    Ok(())
}
