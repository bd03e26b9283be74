// Shop commands: browse and buy items, and let managers stock the shop.

use crate::core::economy::{format_number, EconomyError, NewShopItem};
use crate::discord::commands::economy::economy_failure;
use crate::discord::data::{describe_discord_error, guild_id, reply_ephemeral};
use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;

/// Item names of the current guild matching what the user typed.
async fn autocomplete_item<'a>(
    ctx: Context<'_>,
    partial: &'a str,
) -> impl Iterator<Item = String> + 'a {
    let items = match ctx.guild_id() {
        Some(guild) => ctx
            .data()
            .shop
            .list_items(guild.get())
            .await
            .unwrap_or_default(),
        None => Vec::new(),
    };
    let needle = partial.to_lowercase();
    items
        .into_iter()
        .map(|item| item.item_name)
        .filter(move |name| name.to_lowercase().contains(&needle))
        .take(25)
}

/// The server shop.
#[poise::command(slash_command, guild_only, subcommands("list", "buy"))]
pub async fn shop(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show the items for sale.
#[poise::command(slash_command, guild_only)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let items = ctx.data().shop.list_items(guild_id).await?;
    if items.is_empty() {
        ctx.say("Toko masih kosong.").await?;
        return Ok(());
    }

    let mut embed = serenity::CreateEmbed::new()
        .title("🛒 Toko Server")
        .color(0xC27C0E);
    for item in items.iter().take(25) {
        let mut value = format!("Harga: {} koin", format_number(item.price));
        if let Some(description) = &item.description {
            value.push('\n');
            value.push_str(description);
        }
        if let Some(role_id) = item.role_reward_id {
            value.push_str(&format!("\nHadiah role: <@&{}>", role_id));
        }
        embed = embed.field(&item.item_name, value, false);
    }

    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// Buy an item from the shop.
#[poise::command(slash_command, guild_only)]
pub async fn buy(
    ctx: Context<'_>,
    #[description = "Nama item"]
    #[autocomplete = "autocomplete_item"]
    nama: String,
) -> Result<(), Error> {
    let guild = ctx.guild_id().ok_or("Perintah ini hanya dapat digunakan di dalam server.")?;
    let user_id = ctx.author().id;

    let purchase = match ctx
        .data()
        .shop
        .buy(ctx.data().economy.as_ref(), guild.get(), user_id.get(), &nama)
        .await
    {
        Ok(purchase) => purchase,
        Err(e) => return economy_failure(ctx, e).await,
    };

    let mut text = format!(
        "Berhasil membeli **{}** seharga {} koin. Saldo kini {}.",
        purchase.item.item_name,
        format_number(purchase.item.price),
        format_number(purchase.new_balance)
    );

    if let Some(role_id) = purchase.item.role_reward_id {
        let role_id = serenity::RoleId::new(role_id);
        match guild.member(ctx, user_id).await {
            Ok(member) => match member.add_role(ctx, role_id).await {
                Ok(()) => text.push_str(&format!("\nRole <@&{}> telah diberikan.", role_id)),
                Err(e) => {
                    tracing::warn!("Could not grant shop role {}: {}", role_id, e);
                    text.push_str(&format!(
                        "\nRole tidak dapat diberikan: {}",
                        describe_discord_error(&e)
                    ));
                }
            },
            Err(e) => tracing::warn!("Could not fetch buyer {}: {}", user_id, e),
        }
    }

    reply_ephemeral(ctx, text).await
}

/// Manage the shop.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    subcommands("add")
)]
pub async fn shopadmin(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Add an item to the shop.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn add(
    ctx: Context<'_>,
    #[description = "Nama item"] nama: String,
    #[description = "Harga dalam koin"]
    #[min = 0]
    #[max = 1_000_000]
    harga: i64,
    #[description = "Deskripsi item"] deskripsi: Option<String>,
    #[description = "Role yang diberikan saat membeli"] role_reward: Option<serenity::Role>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let item = NewShopItem {
        guild_id,
        item_name: nama,
        price: harga,
        description: deskripsi.filter(|d| !d.trim().is_empty()),
        role_reward_id: role_reward.map(|r| r.id.get()),
    };

    match ctx.data().shop.add_item(item).await {
        Ok(item) => {
            reply_ephemeral(
                ctx,
                format!(
                    "Item **{}** ditambahkan dengan harga {} koin.",
                    item.item_name,
                    format_number(item.price)
                ),
            )
            .await
        }
        Err(EconomyError::ItemNotFound(name)) if name.is_empty() => {
            reply_ephemeral(ctx, "❌ Nama item tidak boleh kosong.").await
        }
        Err(e) => economy_failure(ctx, e).await,
    }
}
