use crate::core::logging::{
    AttachmentInfo, LogEvent, LoggedUser, StructureAction, TrackedMessage, VoiceChange,
};
use crate::discord::logging::formatter::format_log_event;
use crate::discord::Data;
use anyhow::Result;
use chrono::{DateTime, Utc};
use poise::serenity_prelude::{self as serenity, Context};

pub(crate) fn to_utc(ts: serenity::Timestamp) -> DateTime<Utc> {
    DateTime::from_timestamp(ts.unix_timestamp(), 0).unwrap_or_default()
}

fn logged_user(user: &serenity::User) -> LoggedUser {
    LoggedUser {
        id: user.id.get(),
        name: user.name.clone(),
        avatar_url: user.avatar_url(),
    }
}

fn attachments_of(message: &serenity::Message) -> Vec<AttachmentInfo> {
    message
        .attachments
        .iter()
        .map(|a| AttachmentInfo {
            filename: a.filename.clone(),
            url: Some(a.url.clone()),
        })
        .collect()
}

fn jump_url(guild_id: u64, channel_id: u64, message_id: u64) -> String {
    format!(
        "https://discord.com/channels/{}/{}/{}",
        guild_id, channel_id, message_id
    )
}

fn snapshot(guild_id: u64, message: &serenity::Message) -> TrackedMessage {
    TrackedMessage {
        message_id: message.id.get(),
        guild_id,
        channel_id: message.channel_id.get(),
        author_id: message.author.id.get(),
        author_name: message.author.name.clone(),
        content: message.content.clone(),
        attachments: attachments_of(message),
        avatar_url: message.author.avatar_url(),
    }
}

fn tracked_author(tracked: &TrackedMessage) -> LoggedUser {
    LoggedUser {
        id: tracked.author_id,
        name: tracked.author_name.clone(),
        avatar_url: tracked.avatar_url.clone(),
    }
}

/// Keep a copy of a guild message so later edits and deletes can show the original.
pub fn track_message(data: &Data, message: &serenity::Message) {
    if let Some(guild_id) = message.guild_id {
        if !message.author.bot {
            data.activity_log
                .remember_message(snapshot(guild_id.get(), message));
        }
    }
}

pub async fn handle_message_update(
    ctx: &Context,
    data: &Data,
    old: Option<&serenity::Message>,
    event: &serenity::MessageUpdateEvent,
) -> Result<()> {
    let Some(guild_id) = event.guild_id.map(|id| id.get()) else {
        return Ok(());
    };
    let Some(new_content) = event.content.clone() else {
        return Ok(());
    };

    // Prefer our own snapshot, then the serenity cache.
    let tracked = data
        .activity_log
        .get_tracked_message(event.id.get())
        .or_else(|| {
            old.filter(|m| !m.author.bot)
                .map(|m| snapshot(guild_id, m))
        });
    let Some(mut tracked) = tracked else {
        return Ok(());
    };
    if tracked.content == new_content {
        return Ok(());
    }

    let log = LogEvent::MessageEdited {
        author: tracked_author(&tracked),
        channel_id: tracked.channel_id,
        before: tracked.content.clone(),
        after: new_content.clone(),
        jump_url: Some(jump_url(guild_id, tracked.channel_id, tracked.message_id)),
    };

    tracked.content = new_content;
    data.activity_log.remember_message(tracked);
    send_log(ctx, data, guild_id, log).await
}

pub async fn handle_message_delete(
    ctx: &Context,
    data: &Data,
    channel_id: serenity::ChannelId,
    message_id: serenity::MessageId,
    guild_id: Option<serenity::GuildId>,
) -> Result<()> {
    let Some(guild_id) = guild_id.map(|id| id.get()) else {
        return Ok(());
    };

    let tracked = data
        .activity_log
        .take_tracked_message(message_id.get())
        .or_else(|| {
            ctx.cache
                .message(channel_id, message_id)
                .filter(|m| !m.author.bot)
                .map(|m| snapshot(guild_id, &m))
        });

    let log = match tracked {
        Some(tracked) => LogEvent::MessageDeleted {
            author: Some(tracked_author(&tracked)),
            channel_id: tracked.channel_id,
            content: tracked.content,
            attachments: tracked.attachments,
        },
        None => LogEvent::MessageDeleted {
            author: None,
            channel_id: channel_id.get(),
            content: "Pesan tidak tersimpan di cache.".to_string(),
            attachments: Vec::new(),
        },
    };
    send_log(ctx, data, guild_id, log).await
}

pub async fn handle_member_join(
    ctx: &Context,
    data: &Data,
    member: &serenity::Member,
) -> Result<()> {
    let log = LogEvent::MemberJoined {
        user: logged_user(&member.user),
        account_created: to_utc(member.user.created_at()),
        is_bot: member.user.bot,
    };
    send_log(ctx, data, member.guild_id.get(), log).await
}

pub async fn handle_member_remove(
    ctx: &Context,
    data: &Data,
    guild_id: serenity::GuildId,
    user: &serenity::User,
    member: Option<&serenity::Member>,
) -> Result<()> {
    let log = LogEvent::MemberLeft {
        user: logged_user(user),
        joined_at: member.and_then(|m| m.joined_at).map(to_utc),
    };
    send_log(ctx, data, guild_id.get(), log).await
}

pub async fn handle_voice_state_update(
    ctx: &Context,
    data: &Data,
    old: Option<&serenity::VoiceState>,
    new: &serenity::VoiceState,
) -> Result<()> {
    let Some(guild_id) = new.guild_id.map(|id| id.get()) else {
        return Ok(());
    };
    let Some(member) = new.member.as_ref() else {
        return Ok(());
    };
    if member.user.bot {
        return Ok(());
    }

    let old_channel = old.and_then(|s| s.channel_id).map(|id| id.get());
    let new_channel = new.channel_id.map(|id| id.get());
    let Some(change) = VoiceChange::between(old_channel, new_channel) else {
        return Ok(());
    };

    let log = LogEvent::Voice {
        user: logged_user(&member.user),
        change,
    };
    send_log(ctx, data, guild_id, log).await
}

pub async fn handle_channel(
    ctx: &Context,
    data: &Data,
    channel: &serenity::GuildChannel,
    action: StructureAction,
) -> Result<()> {
    let log = LogEvent::Channel {
        action,
        channel_id: channel.id.get(),
        name: channel.name.clone(),
    };
    send_log(ctx, data, channel.guild_id.get(), log).await
}

pub async fn handle_role(
    ctx: &Context,
    data: &Data,
    guild_id: serenity::GuildId,
    role_id: serenity::RoleId,
    name: Option<&str>,
    action: StructureAction,
) -> Result<()> {
    let log = LogEvent::Role {
        action,
        role_id: role_id.get(),
        name: name.unwrap_or("(tidak diketahui)").to_string(),
    };
    send_log(ctx, data, guild_id.get(), log).await
}

pub async fn handle_reaction(
    ctx: &Context,
    data: &Data,
    reaction: &serenity::Reaction,
    added: bool,
) -> Result<()> {
    let (Some(guild_id), Some(user_id)) = (reaction.guild_id, reaction.user_id) else {
        return Ok(());
    };
    let bot_id = ctx.cache.current_user().id;
    if user_id == bot_id {
        return Ok(());
    }

    let log = LogEvent::Reaction {
        user_id: user_id.get(),
        channel_id: reaction.channel_id.get(),
        emoji: reaction.emoji.to_string(),
        added,
        jump_url: jump_url(
            guild_id.get(),
            reaction.channel_id.get(),
            reaction.message_id.get(),
        ),
    };
    send_log(ctx, data, guild_id.get(), log).await
}

/// Called from the framework's post-command and error hooks.
pub async fn log_command_use(
    ctx: &Context,
    data: &Data,
    guild_id: Option<serenity::GuildId>,
    channel_id: serenity::ChannelId,
    user: &serenity::User,
    command: String,
    error: Option<String>,
) -> Result<()> {
    let Some(guild_id) = guild_id else {
        return Ok(());
    };
    let log = LogEvent::CommandUsed {
        user: logged_user(user),
        channel_id: channel_id.get(),
        command,
        error,
    };
    send_log(ctx, data, guild_id.get(), log).await
}

async fn send_log(ctx: &Context, data: &Data, guild_id: u64, event: LogEvent) -> Result<()> {
    let Some(channel_id) = data.activity_log.target_for(guild_id, &event).await? else {
        return Ok(());
    };

    let embed = format_log_event(&event);
    if let Err(e) = serenity::ChannelId::new(channel_id)
        .send_message(&ctx.http, serenity::CreateMessage::new().embed(embed))
        .await
    {
        tracing::warn!("Failed to send log to channel {}: {}", channel_id, e);
    }
    Ok(())
}
