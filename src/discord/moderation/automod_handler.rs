// Enforces automod rules on incoming guild messages.

use crate::core::audit::NewAuditEntry;
use crate::core::moderation::Violation;
use crate::discord::Data;
use poise::serenity_prelude as serenity;
use std::time::Duration;

const NOTICE_LIFETIME: Duration = Duration::from_secs(5);

/// Check a message against the guild's automod rules.
///
/// Returns `true` when the message broke a rule and was removed, so callers
/// can skip XP and other processing for it.
pub async fn handle_message_for_automod(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
) -> anyhow::Result<bool> {
    if msg.author.bot {
        return Ok(false);
    }
    let Some(guild_id) = msg.guild_id.map(|id| id.get()) else {
        return Ok(false);
    };

    let mention_count = msg.mentions.len() + msg.mention_roles.len();
    let violations = data
        .automod
        .check_message(guild_id, &msg.content, mention_count)
        .await?;
    if violations.is_empty() {
        return Ok(false);
    }

    enforce(ctx, msg, data, guild_id, &violations).await;
    Ok(true)
}

async fn enforce(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    data: &Data,
    guild_id: u64,
    violations: &[Violation],
) {
    if let Err(e) = msg.delete(&ctx.http).await {
        tracing::warn!("Failed to delete automod violation: {}", e);
    }

    let reasons = violations
        .iter()
        .map(|v| v.reason)
        .collect::<Vec<_>>()
        .join(" ");
    let notice = format!("⚠️ <@{}>, pesanmu dihapus. {}", msg.author.id, reasons);

    match msg.channel_id.say(&ctx.http, notice).await {
        Ok(sent) => {
            let http = ctx.http.clone();
            tokio::spawn(async move {
                tokio::time::sleep(NOTICE_LIFETIME).await;
                if let Err(e) = sent.delete(&http).await {
                    tracing::debug!("Automod notice already gone: {}", e);
                }
            });
        }
        Err(e) => tracing::warn!("Failed to send automod notice: {}", e),
    }

    let rules = violations
        .iter()
        .map(|v| v.rule_type.as_str())
        .collect::<Vec<_>>()
        .join(",");
    let bot_id = ctx.cache.current_user().id.get();
    data.audit
        .record_quietly(
            NewAuditEntry::new(guild_id, "automod.violation")
                .actor(bot_id)
                .target(msg.author.id.get())
                .context(format!("rules={} channel={}", rules, msg.channel_id)),
        )
        .await;

    tracing::info!(
        guild_id,
        user_id = msg.author.id.get(),
        rules = %rules,
        "Automod removed a message"
    );
}
