// Flood handling - mutes a member in the channel they are flooding.

use crate::core::audit::NewAuditEntry;
use crate::discord::Data;
use chrono::Utc;
use poise::serenity_prelude as serenity;
use std::time::Duration;

const NOTICE_LIFETIME: Duration = Duration::from_secs(5);
const PRUNE_THRESHOLD: usize = 1_000;

/// Record the message and mute its author in the channel when they flood.
///
/// Returns `true` if the member was muted, so callers can skip XP for it.
pub async fn handle_message_for_spam(
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

    let now = Utc::now();
    let flooding = data
        .anti_spam
        .record_message(guild_id, msg.author.id.get(), now);
    if data.anti_spam.tracked_members() > PRUNE_THRESHOLD {
        data.anti_spam.prune(now);
    }
    if !flooding {
        return Ok(false);
    }

    mute_in_channel(ctx, msg).await;
    post_notice(ctx, msg).await;

    let bot_id = ctx.cache.current_user().id.get();
    data.audit
        .record_quietly(
            NewAuditEntry::new(guild_id, "automod.flood")
                .actor(bot_id)
                .target(msg.author.id.get())
                .context(format!("channel={}", msg.channel_id)),
        )
        .await;

    tracing::info!(
        guild_id,
        user_id = msg.author.id.get(),
        channel_id = msg.channel_id.get(),
        "Muted member for flooding"
    );
    Ok(true)
}

/// The member's overwrite with sending denied. Whatever else the existing
/// overwrite grants (a ticket channel's view access, say) is kept.
fn muted_overwrite(
    existing: Option<&serenity::PermissionOverwrite>,
    user_id: serenity::UserId,
) -> serenity::PermissionOverwrite {
    let (allow, deny) = existing
        .map(|o| (o.allow, o.deny))
        .unwrap_or((serenity::Permissions::empty(), serenity::Permissions::empty()));
    serenity::PermissionOverwrite {
        allow: allow - serenity::Permissions::SEND_MESSAGES,
        deny: deny | serenity::Permissions::SEND_MESSAGES,
        kind: serenity::PermissionOverwriteType::Member(user_id),
    }
}

async fn mute_in_channel(ctx: &serenity::Context, msg: &serenity::Message) {
    let member_kind = serenity::PermissionOverwriteType::Member(msg.author.id);
    let existing = match msg.channel_id.to_channel(ctx).await {
        Ok(channel) => channel.guild().and_then(|guild_channel| {
            guild_channel
                .permission_overwrites
                .into_iter()
                .find(|o| o.kind == member_kind)
        }),
        Err(e) => {
            tracing::debug!("Could not read channel overwrites: {}", e);
            None
        }
    };

    if let Err(e) = msg
        .channel_id
        .create_permission(ctx, muted_overwrite(existing.as_ref(), msg.author.id))
        .await
    {
        tracing::warn!("Failed to mute flooding member: {}", e);
    }
}

async fn post_notice(ctx: &serenity::Context, msg: &serenity::Message) {
    let notice = format!("<@{}> dibisukan sementara karena spam.", msg.author.id);
    match msg.channel_id.say(&ctx.http, notice).await {
        Ok(sent) => {
            let http = ctx.http.clone();
            tokio::spawn(async move {
                tokio::time::sleep(NOTICE_LIFETIME).await;
                if let Err(e) = sent.delete(&http).await {
                    tracing::debug!("Flood notice already gone: {}", e);
                }
            });
        }
        Err(e) => tracing::warn!("Failed to send flood notice: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mute_denies_sending_for_a_fresh_member() {
        let overwrite = muted_overwrite(None, serenity::UserId::new(5));
        assert!(overwrite.deny.contains(serenity::Permissions::SEND_MESSAGES));
        assert!(overwrite.allow.is_empty());
        assert_eq!(
            overwrite.kind,
            serenity::PermissionOverwriteType::Member(serenity::UserId::new(5))
        );
    }

    #[test]
    fn mute_keeps_other_grants() {
        let existing = serenity::PermissionOverwrite {
            allow: serenity::Permissions::VIEW_CHANNEL | serenity::Permissions::SEND_MESSAGES,
            deny: serenity::Permissions::ADD_REACTIONS,
            kind: serenity::PermissionOverwriteType::Member(serenity::UserId::new(5)),
        };
        let overwrite = muted_overwrite(Some(&existing), serenity::UserId::new(5));
        assert_eq!(overwrite.allow, serenity::Permissions::VIEW_CHANNEL);
        assert!(overwrite.deny.contains(serenity::Permissions::SEND_MESSAGES));
        assert!(overwrite.deny.contains(serenity::Permissions::ADD_REACTIONS));
    }
}
