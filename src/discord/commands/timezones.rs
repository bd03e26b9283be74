use crate::core::guild_settings::DEFAULT_TIMEZONE;
use crate::core::timezones::{
    format_timezone_display, parse_datetime_input, resolve_timezone, timestamp_variants,
};
use crate::discord::data::reply_ephemeral;
use crate::discord::{Context, Error};
use chrono::Utc;
use poise::serenity_prelude as serenity;

/// Turn a local time into Discord timestamps.
///
/// **Contoh:**
/// - `/timestamp waktu:"2025-01-31 19:45"`
/// - `/timestamp waktu:20:00 zona:WITA`
#[poise::command(slash_command)]
pub async fn timestamp(
    ctx: Context<'_>,
    #[description = "Waktu, misal 2025-01-31 19:45 atau 20:00"] waktu: String,
    #[description = "Zona waktu (misal Asia/Jakarta, WIB, UTC+7)"] zona: Option<String>,
) -> Result<(), Error> {
    let fallback = match ctx.guild_id() {
        Some(guild) => ctx
            .data()
            .settings
            .get(guild.get())
            .await?
            .map(|s| s.timezone)
            .filter(|tz| !tz.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_TIMEZONE.to_string()),
        None => DEFAULT_TIMEZONE.to_string(),
    };

    let tz = match resolve_timezone(zona.as_deref(), &fallback) {
        Ok(tz) => tz,
        Err(e) => return reply_ephemeral(ctx, format!("❌ {}", e)).await,
    };
    let local = match parse_datetime_input(&waktu, &tz, Utc::now()) {
        Ok(local) => local,
        Err(e) => return reply_ephemeral(ctx, format!("❌ {}", e)).await,
    };

    let lines = timestamp_variants(&local)
        .into_iter()
        .map(|(label, code)| format!("**{}**: {} `{}`", label, code, code))
        .collect::<Vec<_>>()
        .join("\n");

    let embed = serenity::CreateEmbed::new()
        .title("🕒 Timestamp Discord")
        .description(lines)
        .color(serenity::Colour::BLURPLE)
        .field(
            "Waktu lokal",
            format!(
                "{} ({})",
                local.format("%Y-%m-%d %H:%M:%S"),
                format_timezone_display(&tz)
            ),
            false,
        )
        .footer(serenity::CreateEmbedFooter::new(
            "Salin kode di dalam tanda kutip untuk dipakai di pesan.",
        ));

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}
