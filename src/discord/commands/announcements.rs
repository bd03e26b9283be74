// Scheduled announcements: stored, handed to the scheduler, delivered by jobs::delivery.

use crate::core::announcements::{AnnouncementError, NewAnnouncement};
use crate::core::audit::NewAuditEntry;
use crate::core::guild_settings::DEFAULT_TIMEZONE;
use crate::core::scheduler::announcement_job_id;
use crate::core::timezones::{format_timezone_display, resolve_timezone};
use crate::discord::data::{guild_id, reply_ephemeral};
use crate::discord::jobs::delivery::schedule_announcement;
use crate::discord::{Context, Error};
use chrono::{NaiveDate, NaiveTime, Utc};
use poise::serenity_prelude as serenity;

const LIST_LIMIT: usize = 15;

/// Scheduled announcements.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    subcommands("schedule", "list", "cancel")
)]
pub async fn announce(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Schedule an announcement.
#[allow(clippy::too_many_arguments)]
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn schedule(
    ctx: Context<'_>,
    #[description = "Channel tujuan"]
    #[channel_types("Text", "News")]
    channel: serenity::GuildChannel,
    #[description = "Tanggal (YYYY-MM-DD)"] tanggal: String,
    #[description = "Jam (HH:MM 24 jam)"] jam: String,
    #[description = "Zona waktu (misal Asia/Jakarta, WIB)"] zona_waktu: Option<String>,
    #[description = "Judul embed"] judul: Option<String>,
    #[description = "Isi pesan teks"] pesan: Option<String>,
    #[description = "Isi embed"] deskripsi_embed: Option<String>,
    #[description = "Role yang akan disebut"] mention_role: Option<serenity::Role>,
    #[description = "URL gambar"] image_url: Option<String>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;

    let (Ok(date), Ok(time)) = (
        NaiveDate::parse_from_str(tanggal.trim(), "%Y-%m-%d"),
        NaiveTime::parse_from_str(jam.trim(), "%H:%M"),
    ) else {
        return reply_ephemeral(ctx, "Format tanggal atau jam tidak valid.").await;
    };

    let settings = ctx.data().settings.get_or_default(guild_id).await?;
    let fallback = if settings.timezone.trim().is_empty() {
        DEFAULT_TIMEZONE
    } else {
        settings.timezone.as_str()
    };
    let tz = match resolve_timezone(zona_waktu.as_deref(), fallback) {
        Ok(tz) => tz,
        Err(e) => return reply_ephemeral(ctx, format!("❌ {}", e)).await,
    };
    let local = match tz.localize(date.and_time(time)) {
        Ok(local) => local,
        Err(e) => return reply_ephemeral(ctx, format!("❌ {}", e)).await,
    };

    let new = NewAnnouncement {
        guild_id,
        channel_id: channel.id.get(),
        author_id: ctx.author().id.get(),
        content: pesan,
        embed_title: judul,
        embed_description: deskripsi_embed,
        mention_role_id: mention_role.map(|r| r.id.get()),
        image_url,
        scheduled_at: local.with_timezone(&Utc),
    };
    let announcement = match ctx.data().announcements.schedule(new, Utc::now()).await {
        Ok(a) => a,
        Err(AnnouncementError::StorageError(e)) => return Err(e.into()),
        Err(e) => return reply_ephemeral(ctx, format!("❌ {}", e)).await,
    };

    schedule_announcement(ctx.serenity_context(), ctx.data(), &announcement);
    ctx.data()
        .audit
        .record_quietly(
            NewAuditEntry::new(guild_id, "announcement.schedule")
                .actor(ctx.author().id.get())
                .target(channel.id.get())
                .context(announcement.id.to_string()),
        )
        .await;

    reply_ephemeral(
        ctx,
        format!(
            "Pengumuman dijadwalkan untuk <t:{}:F> ({}). ID: {}",
            announcement.scheduled_at.timestamp(),
            format_timezone_display(&tz),
            announcement.id
        ),
    )
    .await
}

/// List announcements that have not been sent yet.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let pending = ctx.data().announcements.list_pending(guild_id).await?;
    if pending.is_empty() {
        return reply_ephemeral(ctx, "Tidak ada pengumuman tertunda.").await;
    }

    let mut embed = serenity::CreateEmbed::new()
        .title("Pengumuman Tertunda")
        .color(serenity::Colour::PURPLE);
    for item in pending.iter().take(LIST_LIMIT) {
        let preview = item
            .embed_title
            .as_deref()
            .or(item.content.as_deref())
            .unwrap_or("-");
        embed = embed.field(
            format!("ID {}", item.id),
            format!(
                "Channel: <#{}>\nDijadwalkan: <t:{}:F>\nStatus: {}\n{}",
                item.channel_id,
                item.scheduled_at.timestamp(),
                item.status.as_str(),
                preview.chars().take(100).collect::<String>()
            ),
            false,
        );
    }

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Cancel a pending announcement.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn cancel(
    ctx: Context<'_>,
    #[description = "ID pengumuman"] pengumuman_id: i64,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    if !ctx
        .data()
        .announcements
        .cancel(guild_id, pengumuman_id)
        .await?
    {
        return reply_ephemeral(ctx, "Pengumuman tidak ditemukan atau sudah diproses.").await;
    }

    ctx.data()
        .scheduler
        .cancel(&announcement_job_id(pengumuman_id));
    ctx.data()
        .audit
        .record_quietly(
            NewAuditEntry::new(guild_id, "announcement.cancel")
                .actor(ctx.author().id.get())
                .context(pengumuman_id.to_string()),
        )
        .await;
    reply_ephemeral(ctx, "Pengumuman dibatalkan.").await
}
