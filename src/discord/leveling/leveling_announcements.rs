use crate::core::leveling::{LevelProgress, LevelingError};
use crate::discord::Data;
use chrono::Utc;
use poise::serenity_prelude::{self as serenity, builder::CreateMessage};
use rand::seq::SliceRandom;

/// Award message XP and announce a level-up in the channel the message came from.
pub async fn handle_message_xp(
    ctx: &serenity::Context,
    message: &serenity::Message,
    data: &Data,
) -> anyhow::Result<()> {
    let Some(guild_id) = message.guild_id else {
        return Ok(());
    };

    let progress = match data
        .leveling
        .process_message(guild_id.get(), message.author.id.get(), Utc::now())
        .await
    {
        Ok(progress) => progress,
        Err(LevelingError::OnCooldown(_)) => return Ok(()),
        Err(e) => return Err(e.into()),
    };

    if !progress.leveled_up {
        return Ok(());
    }

    tracing::info!(
        guild_id = guild_id.get(),
        user_id = message.author.id.get(),
        level = progress.profile.level,
        "Member leveled up"
    );

    let granted = grant_level_rewards(ctx, data, guild_id, message.author.id, progress.profile.level)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("Failed to grant level rewards: {}", e);
            Vec::new()
        });

    if let Err(e) = send_level_up_embed(ctx, message.channel_id, &progress, &granted).await {
        tracing::warn!("Failed to send level-up embed: {}", e);
    }
    Ok(())
}

/// Give the member every reward role up to `level` they do not already hold.
pub async fn grant_level_rewards(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    level: u32,
) -> anyhow::Result<Vec<serenity::RoleId>> {
    let rewards = data.leveling.rewards_up_to(guild_id.get(), level).await?;
    if rewards.is_empty() {
        return Ok(Vec::new());
    }

    let member = guild_id.member(ctx, user_id).await?;
    let mut granted = Vec::new();
    for reward in rewards {
        let role_id = serenity::RoleId::new(reward.role_id);
        if member.roles.contains(&role_id) {
            continue;
        }
        match member.add_role(ctx, role_id).await {
            Ok(()) => granted.push(role_id),
            Err(e) => tracing::warn!(
                "Could not grant reward role {} to {}: {}",
                role_id,
                user_id,
                e
            ),
        }
    }
    Ok(granted)
}

async fn send_level_up_embed(
    ctx: &serenity::Context,
    channel_id: serenity::ChannelId,
    progress: &LevelProgress,
    granted: &[serenity::RoleId],
) -> Result<(), serenity::Error> {
    let ratio = progress.xp_into_level as f64 / progress.xp_for_next_level.max(1) as f64;

    let mut embed = serenity::CreateEmbed::new()
        .title("🎉 Level Up!")
        .description(format!(
            "<@{}> naik ke level **{}**!",
            progress.profile.user_id, progress.profile.level
        ))
        .color(level_color(progress.profile.level))
        .field("Total XP", progress.profile.xp.to_string(), true)
        .field(
            "Progress",
            format!(
                "{}/{} XP\n{}",
                progress.xp_into_level,
                progress.xp_for_next_level,
                build_progress_bar(ratio, 18)
            ),
            false,
        )
        .footer(serenity::CreateEmbedFooter::new(random_flavor_line()));

    if !granted.is_empty() {
        let roles = granted
            .iter()
            .map(|id| format!("<@&{}>", id))
            .collect::<Vec<_>>()
            .join(", ");
        embed = embed.field("Hadiah Role", roles, false);
    }

    channel_id
        .send_message(ctx, CreateMessage::new().embed(embed))
        .await
        .map(|_| ())
}

pub fn level_color(level: u32) -> serenity::Colour {
    if level >= 50 {
        serenity::Colour::DARK_PURPLE
    } else if level >= 25 {
        serenity::Colour::ORANGE
    } else if level >= 10 {
        serenity::Colour::GOLD
    } else if level >= 5 {
        serenity::Colour::BLURPLE
    } else {
        serenity::Colour::LIGHT_GREY
    }
}

pub fn build_progress_bar(progress: f64, length: usize) -> String {
    let clamped = progress.clamp(0.0, 1.0);
    let mut filled = (clamped * length as f64).round() as usize;
    if clamped > 0.0 && filled == 0 {
        filled = 1;
    }
    filled = filled.min(length);
    let bar = "▰".repeat(filled) + &"▱".repeat(length - filled);
    format!("{} ({}%)", bar, (clamped * 100.0).round() as u32)
}

fn random_flavor_line() -> &'static str {
    const FLAVOR_LINES: [&str; 4] = [
        "Terus aktif, ya!",
        "Kerja kerasmu terbayar.",
        "Satu level lagi, makin keren.",
        "Bar XP itu tidak punya kesempatan.",
    ];

    FLAVOR_LINES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FLAVOR_LINES[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_shows_at_least_one_block() {
        assert_eq!(build_progress_bar(0.001, 10), "▰▱▱▱▱▱▱▱▱▱ (0%)");
        assert_eq!(build_progress_bar(1.5, 4), "▰▰▰▰ (100%)");
        assert_eq!(build_progress_bar(0.0, 3), "▱▱▱ (0%)");
    }

    #[test]
    fn colour_tiers() {
        assert_eq!(level_color(50), serenity::Colour::DARK_PURPLE);
        assert_eq!(level_color(12), serenity::Colour::GOLD);
        assert_eq!(level_color(1), serenity::Colour::LIGHT_GREY);
    }
}
