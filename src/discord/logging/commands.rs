use crate::core::logging::{ActivityLogConfig, LogCategory};
use crate::discord::data::{guild_id, reply_embed, reply_ephemeral};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum CategoryChoice {
    #[name = "Pesan"]
    Messages,
    #[name = "Member"]
    Members,
    #[name = "Voice"]
    Voice,
    #[name = "Server"]
    Server,
    #[name = "Reaksi"]
    Reactions,
    #[name = "Perintah"]
    Commands,
}

impl From<CategoryChoice> for LogCategory {
    fn from(value: CategoryChoice) -> Self {
        match value {
            CategoryChoice::Messages => LogCategory::Messages,
            CategoryChoice::Members => LogCategory::Members,
            CategoryChoice::Voice => LogCategory::Voice,
            CategoryChoice::Server => LogCategory::Server,
            CategoryChoice::Reactions => LogCategory::Reactions,
            CategoryChoice::Commands => LogCategory::Commands,
        }
    }
}

/// Manage the activity log.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "ADMINISTRATOR",
    subcommands("status", "set_channel", "toggle", "reset", "category")
)]
pub async fn activitylog(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

fn config_embed(config: &ActivityLogConfig) -> serenity::CreateEmbed {
    let status = if config.enabled {
        "🟢 Aktif"
    } else {
        "🔴 Nonaktif"
    };
    let channel = config
        .channel_id
        .map(|id| format!("<#{}>", id))
        .unwrap_or_else(|| "Belum diatur".to_string());
    let categories = LogCategory::ALL
        .iter()
        .map(|cat| {
            let disabled = config.disabled_categories.iter().any(|c| c == cat.as_str());
            let mark = if disabled { "❌" } else { "✅" };
            format!("{} {}", mark, cat.label())
        })
        .collect::<Vec<_>>()
        .join("\n");

    serenity::CreateEmbed::default()
        .title("📜 Konfigurasi Activity Log")
        .color(serenity::Color::BLURPLE)
        .field("Status", status, true)
        .field("Channel", channel, true)
        .field("Kategori", categories, false)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Guild ID: {}",
            config.guild_id
        )))
        .timestamp(serenity::Timestamp::now())
}

/// Show the current activity log configuration.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let config = ctx.data().activity_log.get_config(guild_id).await?;
    reply_embed(ctx, config_embed(&config), true).await
}

/// Set the log channel. Leave empty to fall back to the general log channel.
#[poise::command(
    slash_command,
    guild_only,
    rename = "set-channel",
    required_permissions = "ADMINISTRATOR"
)]
pub async fn set_channel(
    ctx: Context<'_>,
    #[description = "Channel tujuan log"]
    #[channel_types("Text")]
    channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let config = ctx
        .data()
        .activity_log
        .set_channel(guild_id, channel.as_ref().map(|c| c.id.get()))
        .await?;

    let text = match config.channel_id {
        Some(id) => format!("✅ Activity log akan dikirim ke <#{}>.", id),
        None => "✅ Channel activity log dihapus. Log memakai channel log umum jika ada."
            .to_string(),
    };
    reply_ephemeral(ctx, text).await
}

/// Turn the activity log on or off.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn toggle(
    ctx: Context<'_>,
    #[description = "Aktifkan activity log?"] aktif: bool,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let config = ctx.data().activity_log.set_enabled(guild_id, aktif).await?;

    let text = if !config.enabled {
        "🛑 Activity log dinonaktifkan.".to_string()
    } else if config.channel_id.is_none() {
        "⚠️ Activity log aktif, tetapi belum ada channel. Gunakan `/activitylog set-channel`."
            .to_string()
    } else {
        "✅ Activity log diaktifkan.".to_string()
    };
    reply_ephemeral(ctx, text).await
}

/// Disable logging and restore every category.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn reset(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let config = ctx.data().activity_log.reset(guild_id).await?;
    reply_embed(ctx, config_embed(&config), true).await
}

/// Enable or disable one log category.
#[poise::command(slash_command, guild_only, required_permissions = "ADMINISTRATOR")]
pub async fn category(
    ctx: Context<'_>,
    #[description = "Kategori log"] kategori: CategoryChoice,
    #[description = "Aktifkan kategori ini?"] aktif: bool,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let category = LogCategory::from(kategori);
    ctx.data()
        .activity_log
        .set_category(guild_id, category, aktif)
        .await?;

    reply_ephemeral(
        ctx,
        format!(
            "{} Kategori **{}** {}.",
            if aktif { "✅" } else { "🚫" },
            category.label(),
            if aktif { "diaktifkan" } else { "dinonaktifkan" }
        ),
    )
    .await
}
