// Discord commands for the leveling system.
//
// Same flow as every command file:
// 1. Extract primitive data from Discord types
// 2. Call the core service
// 3. Format the response

use crate::discord::data::{cached_member_name, guild_id, reply_ephemeral};
use crate::discord::leveling_announcements::{build_progress_bar, level_color};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Levels and XP.
#[poise::command(
    slash_command,
    guild_only,
    subcommands("rank", "leaderboard", "rewards")
)]
pub async fn level(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show your level and XP, or another member's.
#[poise::command(slash_command, guild_only)]
pub async fn rank(
    ctx: Context<'_>,
    #[description = "Pengguna yang ingin dilihat"] pengguna: Option<serenity::User>,
) -> Result<(), Error> {
    let target = pengguna.as_ref().unwrap_or_else(|| ctx.author());
    let guild_id = guild_id(&ctx)?;

    let progress = ctx
        .data()
        .leveling
        .get_progress(guild_id, target.id.get())
        .await?;
    let profile = &progress.profile;
    let ratio = progress.xp_into_level as f64 / progress.xp_for_next_level.max(1) as f64;

    let embed = serenity::CreateEmbed::new()
        .title(format!("Level {}", target.display_name()))
        .color(level_color(profile.level))
        .thumbnail(target.face())
        .field("Level", profile.level.to_string(), true)
        .field("Total XP", profile.xp.to_string(), true)
        .field(
            "Progress",
            format!(
                "{}/{} XP (sisa {})\n{}",
                progress.xp_into_level,
                progress.xp_for_next_level,
                progress.xp_remaining,
                build_progress_bar(ratio, 18)
            ),
            false,
        );

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Show the server's level leaderboard.
#[poise::command(slash_command, guild_only)]
pub async fn leaderboard(
    ctx: Context<'_>,
    #[description = "Jumlah anggota (3-20)"]
    #[min = 3]
    #[max = 20]
    jumlah: Option<usize>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let limit = jumlah.unwrap_or(10).clamp(3, 20);

    let profiles = ctx.data().leveling.leaderboard(guild_id, limit).await?;
    if profiles.is_empty() {
        ctx.say("Belum ada data level.").await?;
        return Ok(());
    }

    let lines = profiles
        .iter()
        .enumerate()
        .map(|(index, profile)| {
            let medal = match index {
                0 => "🥇".to_string(),
                1 => "🥈".to_string(),
                2 => "🥉".to_string(),
                n => format!("**{}.**", n + 1),
            };
            format!(
                "{} {} · Level {} ({} XP)",
                medal,
                cached_member_name(&ctx, profile.user_id),
                profile.level,
                profile.xp
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let embed = serenity::CreateEmbed::new()
        .title("🏆 Papan Level")
        .description(lines)
        .color(serenity::Colour::DARK_GREEN);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Manage level reward roles.
#[poise::command(
    slash_command,
    guild_only,
    subcommands("rewards_set", "rewards_remove", "rewards_list")
)]
pub async fn rewards(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Give a role to members who reach a level.
#[poise::command(
    slash_command,
    guild_only,
    rename = "set",
    required_permissions = "MANAGE_ROLES"
)]
pub async fn rewards_set(
    ctx: Context<'_>,
    #[description = "Level yang harus dicapai"]
    #[min = 1]
    #[max = 200]
    level: u32,
    #[description = "Role hadiah"] role: serenity::Role,
    #[description = "Berikan role ke anggota yang sudah mencapai level ini"]
    sinkronisasi: Option<bool>,
) -> Result<(), Error> {
    let guild = ctx.guild_id().ok_or("Perintah ini hanya dapat digunakan di dalam server.")?;
    ctx.defer_ephemeral().await?;

    let reward = ctx
        .data()
        .leveling
        .set_reward(guild.get(), level, role.id.get())
        .await?;

    let mut applied = 0;
    if sinkronisasi.unwrap_or(false) {
        let profiles = ctx
            .data()
            .leveling
            .profiles_with_min_level(guild.get(), reward.level)
            .await?;
        for profile in profiles {
            let user_id = serenity::UserId::new(profile.user_id);
            let Ok(member) = guild.member(ctx, user_id).await else {
                continue;
            };
            if member.roles.contains(&role.id) {
                continue;
            }
            match member.add_role(ctx, role.id).await {
                Ok(()) => applied += 1,
                Err(e) => tracing::warn!("Reward sync skipped {}: {}", user_id, e),
            }
        }
    }

    reply_ephemeral(
        ctx,
        format!(
            "Hadiah level {} diset ke <@&{}>. Role diberikan ke {} anggota.",
            reward.level, role.id, applied
        ),
    )
    .await
}

/// Remove the reward for a level.
#[poise::command(
    slash_command,
    guild_only,
    rename = "remove",
    required_permissions = "MANAGE_ROLES"
)]
pub async fn rewards_remove(
    ctx: Context<'_>,
    #[description = "Level hadiah"]
    #[min = 1]
    #[max = 200]
    level: u32,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let Some(reward) = ctx.data().leveling.get_reward_for_level(guild_id, level).await? else {
        return reply_ephemeral(ctx, "Tidak ada hadiah untuk level tersebut.").await;
    };
    ctx.data().leveling.remove_reward(guild_id, level).await?;
    reply_ephemeral(
        ctx,
        format!("Hadiah level {} (<@&{}>) dihapus.", reward.level, reward.role_id),
    )
    .await
}

/// List configured level rewards.
#[poise::command(slash_command, guild_only, rename = "list")]
pub async fn rewards_list(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let rewards = ctx.data().leveling.list_rewards(guild_id).await?;
    if rewards.is_empty() {
        return reply_ephemeral(ctx, "Belum ada hadiah level.").await;
    }

    let description = rewards
        .iter()
        .map(|r| format!("Level {} → <@&{}>", r.level, r.role_id))
        .collect::<Vec<_>>()
        .join("\n");
    let embed = serenity::CreateEmbed::new()
        .title("🎁 Hadiah Level")
        .description(description)
        .color(serenity::Colour::GOLD);

    ctx.send(
        poise::CreateReply::default()
            .embed(embed)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}
