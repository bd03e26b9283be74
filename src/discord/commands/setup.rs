// Server configuration commands: channels, autorole, timezone and ticket category.

use crate::core::guild_settings::{GuildSettings, GuildSettingsPatch, DEFAULT_TIMEZONE};
use crate::core::timezones::{format_timezone_display, resolve_timezone};
use crate::discord::data::{guild_id, reply_embed, reply_ephemeral};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Configure the server.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    subcommands("welcome", "goodbye", "log", "autorole", "timezone", "ticket", "view")
)]
pub async fn setup(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

async fn apply(ctx: Context<'_>, patch: GuildSettingsPatch, message: String) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    ctx.data().settings.update(guild_id, patch).await?;
    // The activity log falls back to the log channel, so its cached view may be stale.
    ctx.data().activity_log.invalidate(guild_id).await;
    reply_ephemeral(ctx, message).await
}

/// Set the welcome channel.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn welcome(
    ctx: Context<'_>,
    #[description = "Channel untuk pesan sambutan"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let patch = GuildSettingsPatch {
        welcome_channel_id: Some(Some(channel.id.get())),
        ..Default::default()
    };
    apply(ctx, patch, format!("Channel sambutan diset ke <#{}>.", channel.id)).await
}

/// Set the goodbye channel.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn goodbye(
    ctx: Context<'_>,
    #[description = "Channel untuk pesan perpisahan"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let patch = GuildSettingsPatch {
        goodbye_channel_id: Some(Some(channel.id.get())),
        ..Default::default()
    };
    apply(ctx, patch, format!("Channel perpisahan diset ke <#{}>.", channel.id)).await
}

/// Set the moderation log channel.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn log(
    ctx: Context<'_>,
    #[description = "Channel untuk log moderasi"]
    #[channel_types("Text")]
    channel: serenity::GuildChannel,
) -> Result<(), Error> {
    let patch = GuildSettingsPatch {
        log_channel_id: Some(Some(channel.id.get())),
        ..Default::default()
    };
    apply(ctx, patch, format!("Channel log diset ke <#{}>.", channel.id)).await
}

/// Set the role granted to new members.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn autorole(
    ctx: Context<'_>,
    #[description = "Role yang diberikan otomatis"] role: serenity::Role,
) -> Result<(), Error> {
    let patch = GuildSettingsPatch {
        autorole_id: Some(Some(role.id.get())),
        ..Default::default()
    };
    apply(ctx, patch, format!("Role otomatis diset ke <@&{}>.", role.id)).await
}

/// Set the server's default timezone.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn timezone(
    ctx: Context<'_>,
    #[description = "Zona waktu (misal: Asia/Jakarta, WIB, UTC+7)"] zona: String,
) -> Result<(), Error> {
    let resolved = match resolve_timezone(Some(&zona), DEFAULT_TIMEZONE) {
        Ok(tz) => tz,
        Err(e) => return reply_ephemeral(ctx, format!("❌ {}", e)).await,
    };

    let patch = GuildSettingsPatch {
        timezone: Some(zona.trim().to_string()),
        ..Default::default()
    };
    apply(
        ctx,
        patch,
        format!(
            "Zona waktu default diperbarui ke {}.",
            format_timezone_display(&resolved)
        ),
    )
    .await
}

/// Set the category new ticket channels are created in.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn ticket(
    ctx: Context<'_>,
    #[description = "Kategori untuk kanal tiket"]
    #[channel_types("Category")]
    kategori: serenity::GuildChannel,
) -> Result<(), Error> {
    let patch = GuildSettingsPatch {
        ticket_category_id: Some(Some(kategori.id.get())),
        ..Default::default()
    };
    apply(ctx, patch, format!("Kategori tiket diset ke {}.", kategori.name)).await
}

fn channel_or_dash(id: Option<u64>) -> String {
    id.map(|id| format!("<#{}>", id))
        .unwrap_or_else(|| "-".to_string())
}

fn settings_embed(settings: &GuildSettings) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title("⚙️ Pengaturan Server")
        .color(0x5865F2)
        .field("Sambutan", channel_or_dash(settings.welcome_channel_id), true)
        .field("Perpisahan", channel_or_dash(settings.goodbye_channel_id), true)
        .field("Log", channel_or_dash(settings.log_channel_id), true)
        .field(
            "Autorole",
            settings
                .autorole_id
                .map(|id| format!("<@&{}>", id))
                .unwrap_or_else(|| "-".to_string()),
            true,
        )
        .field("Zona waktu", &settings.timezone, true)
        .field(
            "Kategori tiket",
            settings
                .ticket_category_id
                .map(|id| id.to_string())
                .unwrap_or_else(|| "-".to_string()),
            true,
        )
        .field(
            "Activity log",
            format!(
                "{} {}",
                if settings.activity_log_enabled {
                    "🟢"
                } else {
                    "🔴"
                },
                channel_or_dash(settings.activity_log_channel_id)
            ),
            true,
        )
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Diperbarui {}",
            settings.updated_at.format("%Y-%m-%d %H:%M UTC")
        )))
}

/// Show the current server settings.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn view(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let settings = ctx.data().settings.get_or_default(guild_id).await?;
    reply_embed(ctx, settings_embed(&settings), true).await
}
