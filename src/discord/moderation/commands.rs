// Moderation and automod slash commands.
//
// Every action replies with an embed that is mirrored to the guild's log
// channel. Kick, ban, warn and timeout also leave an audit entry.

use crate::core::audit::NewAuditEntry;
use crate::core::moderation::{AutomodRule, ModerationError, RuleType};
use crate::discord::data::{describe_discord_error, guild_id, reply_ephemeral};
use crate::discord::{Context, Error};
use chrono::Utc;
use poise::serenity_prelude as serenity;
use serde_json::json;

const MUTE_MINUTES: i64 = 60;
const WARNINGS_SHOWN: usize = 10;

fn action_embed(
    title: &str,
    colour: u32,
    target: &serenity::User,
    moderator: &serenity::User,
    reason: Option<&str>,
) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(title)
        .color(colour)
        .field("Pengguna", format!("{} (`{}`)", target.tag(), target.id), true)
        .field("Moderator", format!("<@{}>", moderator.id), true)
        .timestamp(serenity::Timestamp::now());
    if let Some(reason) = reason {
        embed = embed.field("Alasan", reason, false);
    }
    embed
}

/// Reply with the action embed and copy it into the configured log channel.
async fn announce(ctx: Context<'_>, embed: serenity::CreateEmbed) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    ctx.send(poise::CreateReply::default().embed(embed.clone()))
        .await?;

    let settings = ctx.data().settings.get(guild_id).await?;
    let Some(channel_id) = settings.and_then(|s| s.log_channel_id) else {
        return Ok(());
    };
    if channel_id == ctx.channel_id().get() {
        return Ok(());
    }
    if let Err(e) = serenity::ChannelId::new(channel_id)
        .send_message(ctx, serenity::CreateMessage::new().embed(embed))
        .await
    {
        tracing::warn!("Failed to mirror moderation log to {}: {}", channel_id, e);
    }
    Ok(())
}

async fn audit(
    ctx: Context<'_>,
    action: &str,
    target: &serenity::User,
    context: impl Into<String>,
) -> Result<(), Error> {
    let entry = NewAuditEntry::new(guild_id(&ctx)?, format!("moderation.{}", action))
        .actor(ctx.author().id.get())
        .target(target.id.get())
        .context(context);
    ctx.data().audit.record_quietly(entry).await;
    Ok(())
}

fn timeout_until(minutes: i64) -> Result<serenity::Timestamp, Error> {
    let until = Utc::now().timestamp() + minutes * 60;
    Ok(serenity::Timestamp::from_unix_timestamp(until)?)
}

fn reason_or_default(reason: Option<String>) -> String {
    reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| "Tidak ada alasan.".to_string())
}

/// Moderation tools.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "KICK_MEMBERS",
    subcommands(
        "kick",
        "ban",
        "unban",
        "clear",
        "warn",
        "warnings",
        "removewarn",
        "timeout",
        "mute",
        "unmute"
    )
)]
pub async fn moderasi(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Kick a member from the server.
#[poise::command(slash_command, guild_only, required_permissions = "KICK_MEMBERS")]
pub async fn kick(
    ctx: Context<'_>,
    #[description = "Anggota yang dikeluarkan"] pengguna: serenity::User,
    #[description = "Alasan"] alasan: Option<String>,
) -> Result<(), Error> {
    let guild = ctx.guild_id().ok_or("Perintah ini hanya dapat digunakan di dalam server.")?;
    let reason = reason_or_default(alasan);

    if let Err(e) = guild.kick_with_reason(ctx, pengguna.id, &reason).await {
        return reply_ephemeral(ctx, format!("❌ {}", describe_discord_error(&e))).await;
    }

    audit(ctx, "kick", &pengguna, reason.clone()).await?;
    announce(
        ctx,
        action_embed("👢 Anggota Dikeluarkan", 0xE67E22, &pengguna, ctx.author(), Some(&reason)),
    )
    .await
}

/// Ban a member from the server.
#[poise::command(slash_command, guild_only, required_permissions = "BAN_MEMBERS")]
pub async fn ban(
    ctx: Context<'_>,
    #[description = "Anggota yang diblokir"] pengguna: serenity::User,
    #[description = "Alasan"] alasan: Option<String>,
    #[description = "Hapus pesan beberapa hari terakhir (0-7)"]
    #[min = 0]
    #[max = 7]
    hapus_pesan_hari: Option<u8>,
) -> Result<(), Error> {
    let guild = ctx.guild_id().ok_or("Perintah ini hanya dapat digunakan di dalam server.")?;
    let reason = reason_or_default(alasan);
    let days = hapus_pesan_hari.unwrap_or(0).min(7);

    if let Err(e) = guild.ban_with_reason(ctx, pengguna.id, days, &reason).await {
        return reply_ephemeral(ctx, format!("❌ {}", describe_discord_error(&e))).await;
    }

    audit(ctx, "ban", &pengguna, reason.clone()).await?;
    announce(
        ctx,
        action_embed("🔨 Anggota Diblokir", 0xC0392B, &pengguna, ctx.author(), Some(&reason)),
    )
    .await
}

/// Lift a ban.
#[poise::command(slash_command, guild_only, required_permissions = "BAN_MEMBERS")]
pub async fn unban(
    ctx: Context<'_>,
    #[description = "Pengguna yang dibuka blokirnya"] pengguna: serenity::User,
) -> Result<(), Error> {
    let guild = ctx.guild_id().ok_or("Perintah ini hanya dapat digunakan di dalam server.")?;
    if let Err(e) = guild.unban(ctx, pengguna.id).await {
        return reply_ephemeral(ctx, format!("❌ {}", describe_discord_error(&e))).await;
    }
    announce(
        ctx,
        action_embed("♻️ Blokir Dicabut", 0x2ECC71, &pengguna, ctx.author(), None),
    )
    .await
}

/// Delete recent messages in this channel.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_MESSAGES")]
pub async fn clear(
    ctx: Context<'_>,
    #[description = "Jumlah pesan (1-100)"]
    #[min = 1]
    #[max = 100]
    jumlah: u8,
) -> Result<(), Error> {
    ctx.defer_ephemeral().await?;
    let channel = ctx.channel_id();
    let messages = channel
        .messages(ctx, serenity::GetMessages::new().limit(jumlah.clamp(1, 100)))
        .await?;
    let ids: Vec<serenity::MessageId> = messages.iter().map(|m| m.id).collect();
    let count = ids.len();

    let result = match ids.as_slice() {
        [] => Ok(()),
        [single] => channel.delete_message(ctx, *single).await,
        _ => channel.delete_messages(ctx, ids.iter()).await,
    };
    if let Err(e) = result {
        return reply_ephemeral(ctx, format!("❌ {}", describe_discord_error(&e))).await;
    }

    let embed = serenity::CreateEmbed::new()
        .title("🧹 Pesan Dibersihkan")
        .description(format!("{} pesan dihapus di <#{}>.", count, channel))
        .field("Moderator", format!("<@{}>", ctx.author().id), true)
        .color(0x3498DB)
        .timestamp(serenity::Timestamp::now());
    announce(ctx, embed).await
}

/// Warn a member.
#[poise::command(slash_command, guild_only, required_permissions = "KICK_MEMBERS")]
pub async fn warn(
    ctx: Context<'_>,
    #[description = "Anggota yang diperingatkan"] pengguna: serenity::User,
    #[description = "Alasan"] alasan: String,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let warn = match ctx
        .data()
        .warns
        .add_warn(guild_id, pengguna.id.get(), ctx.author().id.get(), &alasan)
        .await
    {
        Ok(warn) => warn,
        Err(ModerationError::StorageError(e)) => return Err(e.into()),
        Err(e) => return reply_ephemeral(ctx, format!("❌ {}", e)).await,
    };

    audit(ctx, "warn", &pengguna, warn.reason.clone()).await?;
    let embed = action_embed(
        "⚠️ Peringatan Diberikan",
        0xF1C40F,
        &pengguna,
        ctx.author(),
        Some(&warn.reason),
    )
    .footer(serenity::CreateEmbedFooter::new(format!("ID peringatan: {}", warn.id)));
    announce(ctx, embed).await
}

/// Show a member's warnings.
#[poise::command(slash_command, guild_only, required_permissions = "KICK_MEMBERS")]
pub async fn warnings(
    ctx: Context<'_>,
    #[description = "Anggota yang dicek"] pengguna: serenity::User,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let warns = ctx
        .data()
        .warns
        .list_warns(guild_id, pengguna.id.get(), WARNINGS_SHOWN)
        .await?;
    if warns.is_empty() {
        return reply_ephemeral(ctx, format!("{} belum memiliki peringatan.", pengguna.tag())).await;
    }

    let mut embed = serenity::CreateEmbed::new()
        .title(format!("Peringatan untuk {}", pengguna.tag()))
        .color(0xF1C40F);
    for warn in &warns {
        embed = embed.field(
            format!("#{} · {}", warn.id, warn.created_at.format("%Y-%m-%d %H:%M UTC")),
            format!("{}\nOleh <@{}>", warn.reason, warn.moderator_id),
            false,
        );
    }

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Remove a warning by id.
#[poise::command(slash_command, guild_only, required_permissions = "KICK_MEMBERS")]
pub async fn removewarn(
    ctx: Context<'_>,
    #[description = "ID peringatan"] id: i64,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    if !ctx.data().warns.remove_warn(guild_id, id).await? {
        return reply_ephemeral(ctx, "Peringatan tidak ditemukan.").await;
    }
    let embed = serenity::CreateEmbed::new()
        .title("🗑️ Peringatan Dihapus")
        .description(format!("Peringatan #{} dihapus.", id))
        .field("Moderator", format!("<@{}>", ctx.author().id), true)
        .color(0x95A5A6);
    announce(ctx, embed).await
}

async fn apply_timeout(
    ctx: Context<'_>,
    target: &serenity::User,
    minutes: i64,
    reason: &str,
) -> Result<bool, Error> {
    let guild = ctx.guild_id().ok_or("Perintah ini hanya dapat digunakan di dalam server.")?;
    let until = timeout_until(minutes)?;
    if let Err(e) = guild
        .edit_member(
            ctx,
            target.id,
            serenity::EditMember::new()
                .disable_communication_until_datetime(until)
                .audit_log_reason(reason),
        )
        .await
    {
        reply_ephemeral(ctx, format!("❌ {}", describe_discord_error(&e))).await?;
        return Ok(false);
    }
    Ok(true)
}

/// Time out a member.
#[poise::command(slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn timeout(
    ctx: Context<'_>,
    #[description = "Anggota"] pengguna: serenity::User,
    #[description = "Durasi dalam menit (1-10080)"]
    #[min = 1]
    #[max = 10080]
    menit: i64,
    #[description = "Alasan"] alasan: Option<String>,
) -> Result<(), Error> {
    let reason = reason_or_default(alasan);
    let minutes = menit.clamp(1, 10_080);
    if !apply_timeout(ctx, &pengguna, minutes, &reason).await? {
        return Ok(());
    }

    audit(ctx, "timeout", &pengguna, format!("{} menit: {}", minutes, reason)).await?;
    let embed = action_embed("⏳ Timeout", 0xE67E22, &pengguna, ctx.author(), Some(&reason))
        .field("Durasi", format!("{} menit", minutes), true);
    announce(ctx, embed).await
}

/// Mute a member for an hour.
#[poise::command(slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn mute(
    ctx: Context<'_>,
    #[description = "Anggota"] pengguna: serenity::User,
    #[description = "Alasan"] alasan: Option<String>,
) -> Result<(), Error> {
    let reason = reason_or_default(alasan);
    if !apply_timeout(ctx, &pengguna, MUTE_MINUTES, &reason).await? {
        return Ok(());
    }
    let embed = action_embed("🔇 Dibisukan", 0x7F8C8D, &pengguna, ctx.author(), Some(&reason))
        .field("Durasi", format!("{} menit", MUTE_MINUTES), true);
    announce(ctx, embed).await
}

/// Remove a member's timeout.
#[poise::command(slash_command, guild_only, required_permissions = "MODERATE_MEMBERS")]
pub async fn unmute(
    ctx: Context<'_>,
    #[description = "Anggota"] pengguna: serenity::User,
) -> Result<(), Error> {
    let guild = ctx.guild_id().ok_or("Perintah ini hanya dapat digunakan di dalam server.")?;
    if let Err(e) = guild
        .edit_member(ctx, pengguna.id, serenity::EditMember::new().enable_communication())
        .await
    {
        return reply_ephemeral(ctx, format!("❌ {}", describe_discord_error(&e))).await;
    }
    announce(
        ctx,
        action_embed("🔊 Bisu Dicabut", 0x2ECC71, &pengguna, ctx.author(), None),
    )
    .await
}

// ============================================================================
// AUTOMOD
// ============================================================================

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum RuleChoice {
    #[name = "Filter Tautan"]
    LinkFilter,
    #[name = "Batas Mention"]
    MentionLimit,
    #[name = "Huruf Kapital"]
    Caps,
}

impl From<RuleChoice> for RuleType {
    fn from(choice: RuleChoice) -> Self {
        match choice {
            RuleChoice::LinkFilter => RuleType::LinkFilter,
            RuleChoice::MentionLimit => RuleType::MentionLimit,
            RuleChoice::Caps => RuleType::Caps,
        }
    }
}

/// "a.com, b.com" into a lowercased domain list.
fn parse_domains(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split([',', ' '])
        .map(|d| d.trim().trim_start_matches("www.").to_lowercase())
        .filter(|d| !d.is_empty())
        .collect()
}

fn describe_rule(rule: &AutomodRule) -> String {
    let state = if rule.is_active { "🟢 aktif" } else { "🔴 nonaktif" };
    let detail = match rule.rule_type {
        RuleType::LinkFilter => {
            let domains: Vec<&str> = rule
                .payload
                .get("allow_domains")
                .and_then(|v| v.as_array())
                .map(|list| list.iter().filter_map(|d| d.as_str()).collect())
                .unwrap_or_default();
            if domains.is_empty() {
                "Semua tautan diblokir".to_string()
            } else {
                format!("Diizinkan: {}", domains.join(", "))
            }
        }
        RuleType::MentionLimit => format!(
            "Maksimal {} mention",
            rule.payload
                .get("max_mentions")
                .and_then(|v| v.as_i64())
                .unwrap_or_default()
        ),
        RuleType::Caps => format!(
            "Ambang {:.0}% (min {} karakter)",
            rule.payload
                .get("threshold")
                .and_then(|v| v.as_f64())
                .unwrap_or(0.7)
                * 100.0,
            rule.payload
                .get("min_length")
                .and_then(|v| v.as_i64())
                .unwrap_or(15)
        ),
    };
    format!("{}\n{}", state, detail)
}

async fn automod_audit(ctx: Context<'_>, command: &str, context: String) -> Result<(), Error> {
    let entry = NewAuditEntry::new(guild_id(&ctx)?, format!("automod.{}", command))
        .actor(ctx.author().id.get())
        .context(context);
    ctx.data().audit.record_quietly(entry).await;
    Ok(())
}

/// Automatic message moderation.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    subcommands("automod_status", "disable", "link", "mentionlimit", "caps")
)]
pub async fn automod(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show the automod rules.
#[poise::command(
    slash_command,
    guild_only,
    rename = "status",
    required_permissions = "MANAGE_GUILD"
)]
pub async fn automod_status(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let rules = ctx.data().automod.list_rules(guild_id).await?;

    let mut embed = serenity::CreateEmbed::new()
        .title("🛡️ Status Automod")
        .color(0x5865F2);
    for rule_type in RuleType::ALL {
        let value = rules
            .iter()
            .find(|r| r.rule_type == rule_type)
            .map(describe_rule)
            .unwrap_or_else(|| "Belum dikonfigurasi".to_string());
        embed = embed.field(rule_type.label(), value, false);
    }

    automod_audit(ctx, "status", String::new()).await?;
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Switch off a rule.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn disable(
    ctx: Context<'_>,
    #[description = "Aturan yang dinonaktifkan"] aturan: RuleChoice,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let rule_type = RuleType::from(aturan);
    let changed = ctx
        .data()
        .automod
        .set_active(guild_id, rule_type, false)
        .await?;

    automod_audit(ctx, "disable", format!("rule={}", rule_type)).await?;
    let text = if changed {
        format!("Aturan {} dinonaktifkan.", rule_type.label())
    } else {
        format!("Aturan {} belum dikonfigurasi.", rule_type.label())
    };
    reply_ephemeral(ctx, text).await
}

/// Configure the link filter.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn link(
    ctx: Context<'_>,
    #[description = "Aktifkan filter tautan"] aktif: bool,
    #[description = "Domain yang diizinkan, dipisah koma"] allow_domains: Option<String>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let domains = parse_domains(allow_domains.as_deref());
    ctx.data()
        .automod
        .set_rule(
            guild_id,
            RuleType::LinkFilter,
            json!({ "allow_domains": domains }),
            aktif,
        )
        .await?;

    automod_audit(
        ctx,
        "link",
        format!("active={} allow={}", aktif, domains.join(",")),
    )
    .await?;
    let text = if aktif {
        if domains.is_empty() {
            "Filter tautan aktif. Semua tautan akan dihapus.".to_string()
        } else {
            format!("Filter tautan aktif. Domain diizinkan: {}", domains.join(", "))
        }
    } else {
        "Filter tautan dinonaktifkan.".to_string()
    };
    reply_ephemeral(ctx, text).await
}

/// Limit mentions per message.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn mentionlimit(
    ctx: Context<'_>,
    #[description = "Maksimal mention per pesan (1-20)"]
    #[min = 1]
    #[max = 20]
    batas: u32,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let limit = batas.clamp(1, 20);
    ctx.data()
        .automod
        .set_rule(
            guild_id,
            RuleType::MentionLimit,
            json!({ "max_mentions": limit }),
            true,
        )
        .await?;

    automod_audit(ctx, "mentionlimit", format!("max={}", limit)).await?;
    reply_ephemeral(ctx, format!("Batas mention diset ke {} per pesan.", limit)).await
}

/// Limit messages written mostly in capitals.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn caps(
    ctx: Context<'_>,
    #[description = "Rasio huruf kapital (0.1-1.0)"]
    #[min = 0.1]
    #[max = 1.0]
    threshold: f64,
    #[description = "Panjang minimal pesan (5-200)"]
    #[min = 5]
    #[max = 200]
    min_length: Option<u32>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let threshold = threshold.clamp(0.1, 1.0);
    let min_length = min_length.unwrap_or(15).clamp(5, 200);
    ctx.data()
        .automod
        .set_rule(
            guild_id,
            RuleType::Caps,
            json!({ "threshold": threshold, "min_length": min_length }),
            true,
        )
        .await?;

    automod_audit(
        ctx,
        "caps",
        format!("threshold={:.2} min_length={}", threshold, min_length),
    )
    .await?;
    reply_ephemeral(
        ctx,
        format!(
            "Filter kapital aktif: {:.0}% untuk pesan ≥ {} karakter.",
            threshold * 100.0,
            min_length
        ),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domains_are_normalised() {
        assert_eq!(
            parse_domains(Some("YouTube.com, www.github.com  discord.gg")),
            vec!["youtube.com", "github.com", "discord.gg"]
        );
        assert!(parse_domains(None).is_empty());
    }

    #[test]
    fn rule_description_mentions_settings() {
        let rule = AutomodRule {
            guild_id: 1,
            rule_type: RuleType::MentionLimit,
            payload: json!({ "max_mentions": 4 }),
            is_active: true,
        };
        let text = describe_rule(&rule);
        assert!(text.contains("aktif"));
        assert!(text.contains("4 mention"));
    }

    #[test]
    fn empty_reason_gets_placeholder() {
        assert_eq!(reason_or_default(Some("  ".into())), "Tidak ada alasan.");
        assert_eq!(reason_or_default(Some("spam".into())), "spam");
    }
}
