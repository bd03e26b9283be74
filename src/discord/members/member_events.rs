// Welcome, goodbye and autorole handling for guild members.

use crate::discord::Data;
use poise::serenity_prelude::{self as serenity, Mentionable};

pub async fn handle_member_join(
    ctx: &serenity::Context,
    data: &Data,
    member: &serenity::Member,
) -> anyhow::Result<()> {
    let Some(settings) = data.settings.get(member.guild_id.get()).await? else {
        return Ok(());
    };

    if let Some(channel_id) = settings.welcome_channel_id {
        let text = format!(
            "Selamat datang {}! Jangan lupa baca peraturan ya.",
            member.mention()
        );
        if let Err(e) = serenity::ChannelId::new(channel_id).say(&ctx.http, text).await {
            tracing::warn!("Failed to send welcome message to {}: {}", channel_id, e);
        }
    }

    if let Some(role_id) = settings.autorole_id {
        if let Err(e) = member
            .add_role(&ctx.http, serenity::RoleId::new(role_id))
            .await
        {
            tracing::warn!(
                guild_id = member.guild_id.get(),
                role_id,
                "Failed to grant autorole: {}",
                e
            );
        }
    }
    Ok(())
}

pub async fn handle_member_remove(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    user: &serenity::User,
    member: Option<&serenity::Member>,
) -> anyhow::Result<()> {
    let Some(settings) = data.settings.get(guild_id.get()).await? else {
        return Ok(());
    };
    let Some(channel_id) = settings.goodbye_channel_id else {
        return Ok(());
    };

    let name = member
        .map(|m| m.display_name().to_string())
        .unwrap_or_else(|| user.display_name().to_string());
    let text = format!("Selamat tinggal {}. Semoga kembali lagi!", name);
    if let Err(e) = serenity::ChannelId::new(channel_id).say(&ctx.http, text).await {
        tracing::warn!("Failed to send goodbye message to {}: {}", channel_id, e);
    }
    Ok(())
}
