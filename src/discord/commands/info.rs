// General information commands: latency, member and server details, bot statistics.

use crate::core::presence::humanize_duration;
use crate::discord::commands::presence::collect_snapshot;
use crate::discord::data::reply_ephemeral;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Check the bot's latency.
#[poise::command(slash_command)]
pub async fn ping(ctx: Context<'_>) -> Result<(), Error> {
    let latency = ctx.ping().await;
    reply_ephemeral(
        ctx,
        format!("Pong! Latensi gateway: {:.0} ms", latency.as_secs_f64() * 1000.0),
    )
    .await
}

/// Show information about a user.
#[poise::command(slash_command)]
pub async fn userinfo(
    ctx: Context<'_>,
    #[description = "Pengguna yang ingin dilihat"] pengguna: Option<serenity::User>,
) -> Result<(), Error> {
    let user = pengguna.as_ref().unwrap_or_else(|| ctx.author());

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("Info {}", user.display_name()))
        .color(serenity::Colour::DARK_GREEN)
        .thumbnail(user.face())
        .field("ID", user.id.to_string(), true)
        .field("Bot?", if user.bot { "Ya" } else { "Tidak" }, true)
        .field(
            "Dibuat",
            format!("<t:{}:F>", user.created_at().unix_timestamp()),
            false,
        );

    if let Some(guild_id) = ctx.guild_id() {
        if let Ok(member) = guild_id.member(ctx, user.id).await {
            if let Some(joined) = member.joined_at {
                embed = embed.field(
                    "Bergabung",
                    format!("<t:{}:F>", joined.unix_timestamp()),
                    false,
                );
            }
            let roles = member
                .roles
                .iter()
                .map(|role| format!("<@&{}>", role))
                .collect::<Vec<_>>()
                .join(", ");
            embed = embed.field(
                "Role",
                if roles.is_empty() { "Tidak ada".to_string() } else { roles },
                false,
            );
        }
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show a summary of this server.
#[poise::command(slash_command, guild_only)]
pub async fn serverinfo(ctx: Context<'_>) -> Result<(), Error> {
    // Copy what we need out of the cache before awaiting anything.
    let summary = ctx.guild().map(|guild| {
        (
            guild.id,
            guild.name.clone(),
            guild.icon_url(),
            guild.owner_id,
            guild.member_count,
            guild.channels.len(),
            guild.roles.len(),
        )
    });
    let Some((id, name, icon, owner, members, channels, roles)) = summary else {
        return reply_ephemeral(ctx, "Perintah ini hanya dapat digunakan dalam server.").await;
    };

    let mut embed = serenity::CreateEmbed::new()
        .title(name)
        .color(serenity::Colour::GOLD)
        .field("ID", id.to_string(), true)
        .field("Owner", format!("<@{}>", owner), true)
        .field("Anggota", members.to_string(), true)
        .field("Channel", channels.to_string(), true)
        .field("Role", roles.to_string(), true)
        .field(
            "Dibuat",
            format!("<t:{}:F>", id.created_at().unix_timestamp()),
            false,
        );
    if let Some(icon) = icon {
        embed = embed.thumbnail(icon);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show bot statistics and uptime.
#[poise::command(slash_command)]
pub async fn botstats(ctx: Context<'_>) -> Result<(), Error> {
    let commands_count = ctx.framework().options().commands.len();
    let latency = ctx.ping().await;
    let snapshot = collect_snapshot(
        ctx.serenity_context(),
        ctx.data(),
        commands_count,
        Some(latency),
    )
    .await;

    let mut embed = serenity::CreateEmbed::new()
        .title("Statistik Bot")
        .color(serenity::Colour::PURPLE)
        .field("Versi", snapshot.version.clone(), true)
        .field("Total Guild", snapshot.guild_count.to_string(), true)
        .field("Total Anggota", snapshot.member_count.to_string(), true)
        .field("Manusia / Bot", format!("{} / {}", snapshot.human_count, snapshot.bot_count), true)
        .field("Perintah", snapshot.commands_count.to_string(), true)
        .field("Latensi", format!("{:.0} ms", snapshot.latency_ms), true)
        .field("Uptime", humanize_duration(snapshot.uptime), true)
        .timestamp(serenity::Timestamp::now());

    // Operational internals are only shown to the configured bot owners.
    if ctx.data().config.is_owner(ctx.author().id.get()) {
        embed = embed
            .field("Shard", snapshot.shard_count.to_string(), true)
            .field("Job Terjadwal", snapshot.scheduler_jobs.to_string(), true)
            .field("Pengingat Aktif", snapshot.pending_reminders.to_string(), true)
            .field(
                "Database",
                if snapshot.database_connected { "Terhubung" } else { "Terputus" },
                true,
            )
            .field("Owner", snapshot.owner_count.to_string(), true);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
