// Support tickets: a private channel per member, closed by deleting the channel.

use crate::core::logging::truncate_content;
use crate::core::tickets::{ticket_channel_name, TicketError};
use crate::discord::data::{describe_discord_error, guild_id, reply_ephemeral};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use std::time::Duration;

const CLOSE_DELAY: Duration = Duration::from_secs(10);
// Keeps the opening message well inside Discord's 2000 character limit.
const DESCRIPTION_LIMIT: usize = 1500;

fn welcome_message(user_id: u64, ticket_id: i64, description: &str) -> String {
    format!(
        "Halo <@{}>! Jelaskan permasalahan Anda di sini. ID tiket: **{}**\nDeskripsi awal: {}",
        user_id,
        ticket_id,
        truncate_content(description, DESCRIPTION_LIMIT)
    )
}

fn member_overwrite(user_id: serenity::UserId) -> serenity::PermissionOverwrite {
    serenity::PermissionOverwrite {
        allow: serenity::Permissions::VIEW_CHANNEL | serenity::Permissions::SEND_MESSAGES,
        deny: serenity::Permissions::empty(),
        kind: serenity::PermissionOverwriteType::Member(user_id),
    }
}

/// Support tickets.
#[poise::command(
    slash_command,
    guild_only,
    subcommands("create", "close", "add", "remove")
)]
pub async fn ticket(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Open a support ticket.
#[poise::command(slash_command, guild_only)]
pub async fn create(
    ctx: Context<'_>,
    #[description = "Jelaskan permasalahan Anda"] deskripsi: String,
) -> Result<(), Error> {
    let guild = ctx.guild_id().ok_or("Perintah ini hanya dapat digunakan di dalam server.")?;
    let user = ctx.author().clone();

    if let Some(existing) = ctx
        .data()
        .tickets
        .find_open_for_user(guild.get(), user.id.get())
        .await?
    {
        return reply_ephemeral(
            ctx,
            format!("Anda sudah memiliki tiket aktif: <#{}>", existing.channel_id),
        )
        .await;
    }

    let settings = ctx.data().settings.get(guild.get()).await?;
    let bot_id = ctx.cache().current_user().id;
    let everyone = serenity::RoleId::new(guild.get());

    let permissions = vec![
        serenity::PermissionOverwrite {
            allow: serenity::Permissions::empty(),
            deny: serenity::Permissions::VIEW_CHANNEL,
            kind: serenity::PermissionOverwriteType::Role(everyone),
        },
        member_overwrite(user.id),
        serenity::PermissionOverwrite {
            allow: serenity::Permissions::VIEW_CHANNEL,
            deny: serenity::Permissions::empty(),
            kind: serenity::PermissionOverwriteType::Member(bot_id),
        },
    ];

    let mut builder = serenity::CreateChannel::new(ticket_channel_name(&user.name))
        .kind(serenity::ChannelType::Text)
        .permissions(permissions)
        .audit_log_reason("Tiket baru dibuat");
    if let Some(category) = settings.and_then(|s| s.ticket_category_id) {
        builder = builder.category(serenity::ChannelId::new(category));
    }

    let channel = match guild.create_channel(ctx, builder).await {
        Ok(channel) => channel,
        Err(e) => return reply_ephemeral(ctx, format!("❌ {}", describe_discord_error(&e))).await,
    };

    let ticket_id = match ctx
        .data()
        .tickets
        .open(guild.get(), user.id.get(), channel.id.get())
        .await
    {
        Ok(id) => id,
        Err(TicketError::AlreadyOpen(existing)) => {
            // Lost a race with a second /ticket create; drop the extra channel.
            if let Err(e) = channel.delete(ctx).await {
                tracing::warn!("Failed to delete duplicate ticket channel {}: {}", channel.id, e);
            }
            return reply_ephemeral(ctx, format!("Anda sudah memiliki tiket aktif: <#{}>", existing))
                .await;
        }
        Err(e) => return Err(e.into()),
    };

    // The ticket already exists at this point, so a failed greeting is not fatal.
    if let Err(e) = channel
        .say(ctx, welcome_message(user.id.get(), ticket_id, &deskripsi))
        .await
    {
        tracing::warn!(ticket_id, "Failed to post ticket welcome: {}", e);
    }

    reply_ephemeral(ctx, format!("Tiket dibuat: <#{}>", channel.id)).await
}

/// Close the ticket in this channel.
#[poise::command(slash_command, guild_only)]
pub async fn close(ctx: Context<'_>) -> Result<(), Error> {
    let channel_id = ctx.channel_id();
    let Some(ticket) = ctx
        .data()
        .tickets
        .get_open_by_channel(channel_id.get())
        .await?
    else {
        return reply_ephemeral(ctx, format!("❌ {}", TicketError::NotATicket)).await;
    };

    ctx.data().tickets.close(ticket.id).await?;
    channel_id
        .say(ctx, "Tiket akan ditutup dalam 10 detik. Terima kasih!")
        .await?;
    reply_ephemeral(ctx, "Tiket ditandai tutup.").await?;

    let http = ctx.serenity_context().http.clone();
    tokio::spawn(async move {
        tokio::time::sleep(CLOSE_DELAY).await;
        if let Err(e) = channel_id.delete(&http).await {
            tracing::warn!("Failed to delete ticket channel {}: {}", channel_id, e);
        }
    });
    Ok(())
}

/// Checks the command runs inside an open ticket, replying otherwise.
async fn require_ticket_channel(ctx: Context<'_>) -> Result<bool, Error> {
    let open = ctx
        .data()
        .tickets
        .get_open_by_channel(ctx.channel_id().get())
        .await?;
    if open.is_none() {
        reply_ephemeral(ctx, "Gunakan perintah ini di channel tiket.").await?;
        return Ok(false);
    }
    Ok(true)
}

/// Add a member to this ticket.
#[poise::command(slash_command, guild_only)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Anggota yang ditambahkan"] anggota: serenity::User,
) -> Result<(), Error> {
    guild_id(&ctx)?;
    if !require_ticket_channel(ctx).await? {
        return Ok(());
    }
    if let Err(e) = ctx
        .channel_id()
        .create_permission(ctx, member_overwrite(anggota.id))
        .await
    {
        return reply_ephemeral(ctx, format!("❌ {}", describe_discord_error(&e))).await;
    }
    reply_ephemeral(ctx, format!("<@{}> ditambahkan ke tiket.", anggota.id)).await
}

/// Remove a member from this ticket.
#[poise::command(slash_command, guild_only)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "Anggota yang dihapus"] anggota: serenity::User,
) -> Result<(), Error> {
    guild_id(&ctx)?;
    if !require_ticket_channel(ctx).await? {
        return Ok(());
    }
    if let Err(e) = ctx
        .channel_id()
        .delete_permission(ctx, serenity::PermissionOverwriteType::Member(anggota.id))
        .await
    {
        return reply_ephemeral(ctx, format!("❌ {}", describe_discord_error(&e))).await;
    }
    reply_ephemeral(ctx, format!("<@{}> dihapus dari tiket.", anggota.id)).await
}
