// Internal audit trail viewer.

use crate::core::audit::{truncate_context, CONTEXT_PREVIEW_LIMIT, MAX_RECENT};
use crate::discord::data::{guild_id, reply_ephemeral};
use crate::discord::{Context, Error};
use chrono::{Duration, Utc};
use poise::serenity_prelude as serenity;

async fn autocomplete_action<'a>(
    ctx: Context<'_>,
    partial: &'a str,
) -> impl Iterator<Item = String> + 'a {
    let summary = match ctx.guild_id() {
        Some(guild) => ctx
            .data()
            .audit
            .action_summary(guild.get(), 10, None)
            .await
            .unwrap_or_default(),
        None => Vec::new(),
    };
    let needle = partial.trim().to_lowercase();
    summary
        .into_iter()
        .map(|(action, _)| action)
        .filter(move |action| needle.is_empty() || action.to_lowercase().contains(&needle))
        .take(25)
}

fn mention_or(id: Option<u64>, fallback: &str) -> String {
    id.map(|id| format!("<@{}>", id))
        .unwrap_or_else(|| fallback.to_string())
}

/// Internal audit log.
#[poise::command(
    slash_command,
    guild_only,
    required_permissions = "MANAGE_GUILD",
    subcommands("recent", "stats")
)]
pub async fn audit(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Show the latest audit entries.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn recent(
    ctx: Context<'_>,
    #[description = "Jumlah catatan terbaru (1-20)"]
    #[min = 1]
    #[max = 20]
    jumlah: Option<usize>,
    #[description = "Filter prefix aksi"]
    #[autocomplete = "autocomplete_action"]
    aksi: Option<String>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let filter = aksi.as_deref().map(str::trim).filter(|a| !a.is_empty());
    let entries = ctx
        .data()
        .audit
        .recent(guild_id, jumlah.unwrap_or(10).min(MAX_RECENT), filter)
        .await?;
    if entries.is_empty() {
        return reply_ephemeral(ctx, "Belum ada log audit yang tersimpan dengan filter tersebut.")
            .await;
    }

    let mut embed = serenity::CreateEmbed::new()
        .title("Log Audit Terbaru")
        .color(serenity::Colour::DARK_GOLD)
        .footer(serenity::CreateEmbedFooter::new(
            "Data audit disimpan terpisah dari Audit Log Discord sebagai histori internal bot.",
        ));
    if let Some(filter) = filter {
        embed = embed.description(format!("Filter aksi: `{}`", filter));
    }
    for entry in &entries {
        let ts = entry.created_at.timestamp();
        embed = embed.field(
            format!("{} · <t:{}:F>", entry.action, ts),
            format!(
                "Aktor: {}\nTarget: {}\nKonteks: {}\nRelatif: <t:{}:R>",
                mention_or(entry.actor_id, "Tidak diketahui"),
                mention_or(entry.target_id, "-"),
                truncate_context(entry.context.as_deref(), CONTEXT_PREVIEW_LIMIT),
                ts
            ),
            false,
        );
    }

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Summarise audit activity over a period.
#[poise::command(slash_command, guild_only, required_permissions = "MANAGE_GUILD")]
pub async fn stats(
    ctx: Context<'_>,
    #[description = "Jumlah hari terakhir (1-30)"]
    #[min = 1]
    #[max = 30]
    hari: Option<i64>,
    #[description = "Jumlah aksi teratas (1-15)"]
    #[min = 1]
    #[max = 15]
    batas: Option<usize>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let days = hari.unwrap_or(7).clamp(1, 30);
    let limit = batas.unwrap_or(10).clamp(1, 15);
    let since = Utc::now() - Duration::days(days);

    let actions = ctx
        .data()
        .audit
        .action_summary(guild_id, limit, Some(since))
        .await?;
    if actions.is_empty() {
        return reply_ephemeral(ctx, "Belum ada aktivitas audit pada rentang waktu tersebut.")
            .await;
    }
    let actors = ctx
        .data()
        .audit
        .actor_summary(guild_id, 5, Some(since))
        .await?;
    let total: i64 = actions.iter().map(|(_, count)| count).sum();

    let mut embed = serenity::CreateEmbed::new()
        .title("Ringkasan Audit")
        .color(serenity::Colour::ORANGE)
        .description(format!(
            "Periode sejak <t:{0}:F> (<t:{0}:R>)",
            since.timestamp()
        ));
    for (action, count) in &actions {
        embed = embed.field(action, count.to_string(), true);
    }
    if !actors.is_empty() {
        let lines = actors
            .iter()
            .map(|(actor, count)| format!("{}: {}", mention_or(*actor, "Tidak diketahui"), count))
            .collect::<Vec<_>>()
            .join("\n");
        embed = embed.field("Top Aktor", lines, false);
    }
    embed = embed
        .field("Total entri", total.to_string(), true)
        .footer(serenity::CreateEmbedFooter::new(
            "Audit internal membantu melacak tindakan bot seperti automasi dan jadwal.",
        ));

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_ids_use_fallback() {
        assert_eq!(mention_or(Some(5), "-"), "<@5>");
        assert_eq!(mention_or(None, "Tidak diketahui"), "Tidak diketahui");
    }
}
