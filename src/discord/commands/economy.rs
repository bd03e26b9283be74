// Coin commands. Cooldown and balance failures from the service become
// ephemeral replies; only storage errors reach the error handler.

use crate::core::economy::{format_cooldown, format_number, EconomyError};
use crate::discord::data::{guild_id, reply_ephemeral};
use crate::discord::{Context, Error};
use chrono::Utc;
use poise::serenity_prelude as serenity;
use rand::Rng;

/// Turn an expected economy failure into an ephemeral reply; storage errors propagate.
pub(crate) async fn economy_failure(ctx: Context<'_>, err: EconomyError) -> Result<(), Error> {
    match err {
        EconomyError::StoreError(_) => Err(err.into()),
        EconomyError::OnCooldown { remaining } => {
            reply_ephemeral(
                ctx,
                format!("⏰ Tunggu {} lagi.", format_cooldown(remaining)),
            )
            .await
        }
        other => reply_ephemeral(ctx, format!("❌ {}", other)).await,
    }
}

/// Check a coin balance.
#[poise::command(slash_command, guild_only)]
pub async fn balance(
    ctx: Context<'_>,
    #[description = "Pengguna yang ingin dicek saldonya (kosongkan untuk diri sendiri)"]
    pengguna: Option<serenity::User>,
) -> Result<(), Error> {
    let target = pengguna.as_ref().unwrap_or_else(|| ctx.author());
    let guild_id = guild_id(&ctx)?;

    if target.bot {
        return reply_ephemeral(ctx, "Bot tidak punya dompet! 🤖").await;
    }

    let balance = ctx.data().economy.balance(guild_id, target.id.get()).await?;

    let embed = serenity::CreateEmbed::new()
        .title(format!("💰 Dompet {}", target.display_name()))
        .color(0xFFD700)
        .thumbnail(target.face())
        .field("Saldo", format!("🪙 **{} koin**", format_number(balance)), true)
        .footer(serenity::CreateEmbedFooter::new(
            "Gunakan /daily untuk klaim hadiah harian!",
        ));

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Claim your daily coins.
#[poise::command(slash_command, guild_only)]
pub async fn daily(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let user_id = ctx.author().id.get();

    let claim = match ctx.data().economy.claim_daily(guild_id, user_id, Utc::now()).await {
        Ok(claim) => claim,
        Err(e) => return economy_failure(ctx, e).await,
    };

    let embed = serenity::CreateEmbed::new()
        .title("✅ Hadiah Harian Diklaim!")
        .description(format!(
            "Kamu mendapat **{} koin**!",
            format_number(claim.coins_awarded)
        ))
        .color(0x00FF00)
        .field(
            "Saldo Baru",
            format!("🪙 {}", format_number(claim.new_balance)),
            true,
        )
        .field(
            "Klaim Berikutnya",
            format!("<t:{}:R>", claim.next_claim_time.timestamp()),
            true,
        );

    ctx.send(
        poise::CreateReply::default()
            .embed(embed)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// Work for some coins.
#[poise::command(slash_command, guild_only)]
pub async fn work(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let user_id = ctx.author().id.get();

    let result = match ctx.data().economy.work(guild_id, user_id, Utc::now()).await {
        Ok(result) => result,
        Err(e) => return economy_failure(ctx, e).await,
    };

    ctx.say(format!(
        "{} +{} koin. Saldo: {}.",
        result.flavour,
        format_number(result.coins_awarded),
        format_number(result.new_balance)
    ))
    .await?;
    Ok(())
}

/// Send coins to another member.
#[poise::command(slash_command, guild_only)]
pub async fn transfer(
    ctx: Context<'_>,
    #[description = "Pengguna tujuan"] pengguna: serenity::User,
    #[description = "Jumlah yang ditransfer (1-1000000)"]
    #[min = 1]
    #[max = 1_000_000]
    jumlah: i64,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    if pengguna.bot {
        return reply_ephemeral(ctx, "Tidak dapat transfer ke bot.").await;
    }

    let result = match ctx
        .data()
        .economy
        .transfer(guild_id, ctx.author().id.get(), pengguna.id.get(), jumlah)
        .await
    {
        Ok(result) => result,
        Err(e) => return economy_failure(ctx, e).await,
    };

    reply_ephemeral(
        ctx,
        format!(
            "Berhasil transfer {} koin ke <@{}>. Saldo Anda sekarang {}.",
            format_number(result.amount),
            pengguna.id,
            format_number(result.sender_balance)
        ),
    )
    .await
}

/// Bet your coins.
#[poise::command(slash_command, guild_only)]
pub async fn gamble(
    ctx: Context<'_>,
    #[description = "Jumlah yang dijudikan (10-200000)"]
    #[min = 10]
    #[max = 200_000]
    jumlah: i64,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let roll: f64 = rand::thread_rng().gen();

    let result = match ctx
        .data()
        .economy
        .gamble(guild_id, ctx.author().id.get(), jumlah, roll)
        .await
    {
        Ok(result) => result,
        Err(e) => return economy_failure(ctx, e).await,
    };

    let text = if result.won {
        format!(
            "🎉 Anda menang {} koin! Saldo kini {}.",
            format_number(result.amount),
            format_number(result.new_balance)
        )
    } else {
        format!(
            "💸 Sayang sekali Anda kalah {} koin. Saldo kini {}.",
            format_number(result.amount),
            format_number(result.new_balance)
        )
    };
    ctx.say(text).await?;
    Ok(())
}

/// Show the richest members.
#[poise::command(slash_command, guild_only)]
pub async fn richest(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let top = ctx.data().economy.leaderboard(guild_id, 10).await?;
    if top.is_empty() {
        ctx.say("Belum ada data ekonomi.").await?;
        return Ok(());
    }

    let description = top
        .iter()
        .enumerate()
        .map(|(idx, account)| {
            format!(
                "**{}.** <@{}> · {} koin",
                idx + 1,
                account.user_id,
                format_number(account.balance)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let embed = serenity::CreateEmbed::new()
        .title("💰 Papan Peringkat Ekonomi")
        .description(description)
        .color(0x1ABC9C);

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}
