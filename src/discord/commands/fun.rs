// Fun commands. Remote content comes through FunService; everything else is local.

use crate::core::fun::{eight_ball, roll_dice, ship_hearts, ship_score};
use crate::discord::data::reply_ephemeral;
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use rand::Rng;

const UPSTREAM_FAILURE: &str = "Layanan sedang tidak tersedia. Coba lagi nanti.";

/// Show a random meme.
#[poise::command(slash_command)]
pub async fn meme(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    let meme = match ctx.data().fun.meme().await {
        Ok(meme) => meme,
        Err(e) => {
            tracing::warn!("Meme API failed: {}", e);
            return reply_ephemeral(ctx, UPSTREAM_FAILURE).await;
        }
    };

    let mut embed = serenity::CreateEmbed::new()
        .title(meme.title)
        .color(serenity::Colour::new(rand::thread_rng().gen_range(0..=0xFFFFFF)))
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Sumber: r/{}",
            meme.subreddit
        )));
    if let Some(url) = meme.image_url {
        embed = embed.image(url);
    }
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// A random motivational quote.
#[poise::command(slash_command)]
pub async fn quote(ctx: Context<'_>) -> Result<(), Error> {
    let quote = ctx.data().fun.quote().await;
    ctx.say(format!("\"{}\" - {}", quote.text, quote.author))
        .await?;
    Ok(())
}

/// A random joke.
#[poise::command(slash_command)]
pub async fn joke(ctx: Context<'_>) -> Result<(), Error> {
    match ctx.data().fun.joke().await {
        Ok(text) => {
            ctx.say(text).await?;
            Ok(())
        }
        Err(e) => {
            tracing::warn!("Joke API failed: {}", e);
            reply_ephemeral(ctx, UPSTREAM_FAILURE).await
        }
    }
}

/// Roll a die.
#[poise::command(slash_command)]
pub async fn dice(
    ctx: Context<'_>,
    #[description = "Jumlah sisi dadu (2-100)"]
    #[min = 2]
    #[max = 100]
    sisi: Option<u32>,
) -> Result<(), Error> {
    let sides = sisi.unwrap_or(6).clamp(2, 100);
    ctx.say(format!("🎲 Dadu {} menghasilkan: **{}**", sides, roll_dice(sides)))
        .await?;
    Ok(())
}

/// Ask the magic ball.
#[poise::command(slash_command, rename = "8ball")]
pub async fn eight_ball_command(
    ctx: Context<'_>,
    #[description = "Pertanyaan Anda"] pertanyaan: String,
) -> Result<(), Error> {
    ctx.say(format!("❓ {}\n🔮 {}", pertanyaan, eight_ball()))
        .await?;
    Ok(())
}

/// How compatible are two people?
#[poise::command(slash_command)]
pub async fn ship(
    ctx: Context<'_>,
    #[description = "Orang pertama"] orang1: serenity::User,
    #[description = "Orang kedua"] orang2: serenity::User,
) -> Result<(), Error> {
    let score = ship_score();
    ctx.say(format!(
        "<@{}> ❤️ <@{}> = {}% {}",
        orang1.id,
        orang2.id,
        score,
        ship_hearts(score)
    ))
    .await?;
    Ok(())
}
