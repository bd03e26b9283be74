// Scheduled delivery of reminders and announcements.
//
// Jobs run on the shared `Scheduler` and carry a clone of the serenity
// context plus the bot `Data`, so they survive the command that created them.

use crate::core::announcements::{AnnouncementStatus, ScheduledAnnouncement};
use crate::core::audit::NewAuditEntry;
use crate::core::reminders::Reminder;
use crate::core::scheduler::{announcement_job_id, reminder_job_id};
use crate::discord::Data;
use chrono::Utc;
use poise::serenity_prelude as serenity;

const ANNOUNCEMENT_COLOR: u32 = 0x57F287;

pub fn schedule_reminder(ctx: &serenity::Context, data: &Data, reminder: &Reminder) {
    let job_ctx = ctx.clone();
    let job_data = data.clone();
    let reminder_id = reminder.id;
    data.scheduler
        .schedule_once(reminder_job_id(reminder_id), reminder.remind_at, async move {
            if let Err(e) = deliver_reminder(&job_ctx, &job_data, reminder_id).await {
                tracing::error!(reminder_id, "Reminder delivery failed: {}", e);
            }
        });
}

async fn deliver_reminder(
    ctx: &serenity::Context,
    data: &Data,
    reminder_id: i64,
) -> anyhow::Result<()> {
    let Some(reminder) = data.reminders.get(reminder_id).await? else {
        return Ok(());
    };

    let mut delivered = false;
    if let Some(channel_id) = reminder.channel_id {
        let text = format!("<@{}> Pengingat: {}", reminder.user_id, reminder.message);
        match serenity::ChannelId::new(channel_id).say(&ctx.http, text).await {
            Ok(_) => delivered = true,
            Err(e) => tracing::warn!(reminder_id, "Reminder channel unavailable: {}", e),
        }
    }

    if !delivered {
        let guild_name = serenity::GuildId::new(reminder.guild_id)
            .name(&ctx.cache)
            .unwrap_or_else(|| "server".to_string());
        let dm = serenity::CreateMessage::new().content(format!(
            "Pengingat dari {}: {}",
            guild_name, reminder.message
        ));
        if let Err(e) = serenity::UserId::new(reminder.user_id)
            .direct_message(ctx, dm)
            .await
        {
            tracing::warn!(reminder_id, "Reminder DM failed: {}", e);
        }
    }

    data.reminders.delete(reminder_id).await?;
    tracing::info!(reminder_id, user_id = reminder.user_id, "Reminder delivered");
    Ok(())
}

pub fn schedule_announcement(
    ctx: &serenity::Context,
    data: &Data,
    announcement: &ScheduledAnnouncement,
) {
    let job_ctx = ctx.clone();
    let job_data = data.clone();
    let announcement_id = announcement.id;
    data.scheduler.schedule_once(
        announcement_job_id(announcement_id),
        announcement.scheduled_at,
        async move {
            if let Err(e) = deliver_announcement(&job_ctx, &job_data, announcement_id).await {
                tracing::error!(announcement_id, "Announcement delivery failed: {}", e);
            }
        },
    );
}

fn announcement_message(announcement: &ScheduledAnnouncement) -> serenity::CreateMessage {
    let mut message = serenity::CreateMessage::new();
    if let Some(text) = announcement.message_text() {
        message = message.content(text);
    }
    if announcement.has_embed() {
        let mut embed = serenity::CreateEmbed::new().color(ANNOUNCEMENT_COLOR);
        if let Some(title) = &announcement.embed_title {
            embed = embed.title(title);
        }
        if let Some(description) = &announcement.embed_description {
            embed = embed.description(description);
        }
        if let Some(url) = &announcement.image_url {
            embed = embed.image(url);
        }
        message = message.embed(embed);
    }

    // Only the announcement's own role may be pinged.
    let mentions = match announcement.mention_role_id {
        Some(role_id) => {
            serenity::CreateAllowedMentions::new().roles(vec![serenity::RoleId::new(role_id)])
        }
        None => serenity::CreateAllowedMentions::new(),
    };
    message.allowed_mentions(mentions)
}

fn is_gone_or_forbidden(err: &serenity::Error) -> bool {
    matches!(
        err,
        serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(resp))
            if matches!(resp.status_code.as_u16(), 403 | 404)
    )
}

async fn deliver_announcement(
    ctx: &serenity::Context,
    data: &Data,
    announcement_id: i64,
) -> anyhow::Result<()> {
    let Some(announcement) = data.announcements.get(announcement_id).await? else {
        return Ok(());
    };
    if announcement.status != AnnouncementStatus::Pending {
        return Ok(());
    }

    let channel = serenity::ChannelId::new(announcement.channel_id);
    match channel
        .send_message(&ctx.http, announcement_message(&announcement))
        .await
    {
        Ok(_) => {
            data.announcements.mark_sent(announcement_id).await?;
            data.audit
                .record_quietly(
                    NewAuditEntry::new(announcement.guild_id, "announcement.sent")
                        .actor(announcement.author_id)
                        .target(announcement.channel_id)
                        .context(announcement_id.to_string()),
                )
                .await;
            tracing::info!(announcement_id, "Announcement sent");
        }
        Err(e) if is_gone_or_forbidden(&e) => {
            data.announcements.abandon(announcement_id).await?;
            tracing::warn!(
                announcement_id,
                "Announcement cancelled, channel unavailable: {}",
                e
            );
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Re-arm every pending reminder and announcement after a restart. Anything
/// already due fires straight away.
pub async fn restore_jobs(ctx: &serenity::Context, data: &Data) -> anyhow::Result<()> {
    let reminders = data.reminders.all_pending().await?;
    let overdue = data.reminders.due(Utc::now()).await?.len();
    for reminder in &reminders {
        schedule_reminder(ctx, data, reminder);
    }

    let announcements = data.announcements.list_pending_all().await?;
    for announcement in &announcements {
        schedule_announcement(ctx, data, announcement);
    }

    tracing::info!(
        reminders = reminders.len(),
        overdue,
        announcements = announcements.len(),
        "Restored scheduled jobs"
    );
    Ok(())
}
