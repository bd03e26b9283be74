// Reminder commands. Reminders are stored first, then handed to the scheduler,
// so a restart can pick them up again.

use crate::core::logging::truncate_content;
use crate::core::reminders::{
    format_duration, parse_duration, NewReminder, Reminder, ReminderError,
};
use crate::core::scheduler::reminder_job_id;
use crate::discord::data::{guild_id, reply_ephemeral};
use crate::discord::jobs::delivery::schedule_reminder;
use crate::discord::{Context, Error};
use chrono::Utc;
use poise::serenity_prelude as serenity;

const FORMAT_HELP: &str = "Format durasi tidak dikenali. Contoh:\n\
    - `30m`, `2h`, `1d`, `1w`\n\
    - `30 menit`, `2 jam`, `1 hari`\n\
    - `30 minutes`, `2 hours`";

const LIST_LIMIT: usize = 20;
const PREVIEW_LENGTH: usize = 150;
// Embed descriptions cap at 4096; leave room for the overflow line.
const LIST_BUDGET: usize = 3900;

/// One line block per reminder, message previews shortened, total kept under
/// the embed description limit.
fn format_reminder_list(reminders: &[Reminder]) -> String {
    let mut out = String::new();
    let mut shown = 0;
    for r in reminders.iter().take(LIST_LIMIT) {
        let channel = r
            .channel_id
            .map(|id| format!(" · <#{}>", id))
            .unwrap_or_default();
        let entry = format!(
            "**#{}** <t:{}:R>{}\n{}",
            r.id,
            r.remind_at.timestamp(),
            channel,
            truncate_content(&r.message, PREVIEW_LENGTH)
        );
        let separator = if out.is_empty() { 0 } else { 2 };
        if out.chars().count() + separator + entry.chars().count() > LIST_BUDGET {
            break;
        }
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(&entry);
        shown += 1;
    }

    let hidden = reminders.len() - shown;
    if hidden > 0 {
        out.push_str(&format!("\n\n…dan {} pengingat lainnya.", hidden));
    }
    out
}

/// Reminders.
#[poise::command(
    slash_command,
    guild_only,
    subcommands("create", "list", "delete")
)]
pub async fn reminder(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Set a reminder. The bot pings you when the time is up.
///
/// **Contoh:**
/// - `/reminder create durasi:30m pesan:"Istirahat"`
/// - `/reminder create durasi:"2 jam" pesan:"Cek oven"`
#[poise::command(slash_command, guild_only)]
pub async fn create(
    ctx: Context<'_>,
    #[description = "Kapan diingatkan (misal: 30m, 2 jam, 1 hari)"] durasi: String,
    #[description = "Isi pengingat"] pesan: String,
    #[description = "Channel tujuan (default: channel ini)"]
    #[channel_types("Text")]
    channel: Option<serenity::GuildChannel>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let Some(delay) = parse_duration(&durasi) else {
        return reply_ephemeral(ctx, FORMAT_HELP).await;
    };

    let now = Utc::now();
    let remind_at = now + chrono::Duration::from_std(delay)?;
    let channel_id = channel
        .map(|c| c.id)
        .unwrap_or_else(|| ctx.channel_id())
        .get();

    let new = NewReminder {
        guild_id,
        user_id: ctx.author().id.get(),
        message: pesan,
        remind_at,
        channel_id: Some(channel_id),
    };
    let reminder = match ctx.data().reminders.create(new, now).await {
        Ok(reminder) => reminder,
        Err(ReminderError::StorageError(e)) => return Err(e.into()),
        Err(e) => return reply_ephemeral(ctx, format!("❌ {}", e)).await,
    };

    schedule_reminder(ctx.serenity_context(), ctx.data(), &reminder);

    reply_ephemeral(
        ctx,
        format!(
            "Pengingat #{} diset! Saya akan mengingatkan dalam {} (<t:{}:F>) di <#{}>.",
            reminder.id,
            format_duration(delay),
            reminder.remind_at.timestamp(),
            channel_id
        ),
    )
    .await
}

/// List your pending reminders.
#[poise::command(slash_command, guild_only)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let reminders = ctx
        .data()
        .reminders
        .list_for_user(guild_id, ctx.author().id.get())
        .await?;
    if reminders.is_empty() {
        return reply_ephemeral(ctx, "Anda tidak memiliki pengingat aktif.").await;
    }

    let lines = format_reminder_list(&reminders);

    let embed = serenity::CreateEmbed::new()
        .title("⏰ Pengingat Anda")
        .description(lines)
        .color(0x3498DB);
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Delete one of your reminders.
#[poise::command(slash_command, guild_only)]
pub async fn delete(
    ctx: Context<'_>,
    #[description = "ID pengingat"] id: i64,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let removed = ctx
        .data()
        .reminders
        .delete_owned(guild_id, ctx.author().id.get(), id)
        .await?;
    if !removed {
        return reply_ephemeral(ctx, "Pengingat tidak ditemukan atau bukan milik Anda.").await;
    }

    ctx.data().scheduler.cancel(&reminder_job_id(id));
    reply_ephemeral(ctx, format!("Pengingat #{} dihapus.", id)).await
}
