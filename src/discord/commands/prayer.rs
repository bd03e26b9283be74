// Prayer schedule commands for Indonesia and Malaysia.

use crate::core::prayer::{build_target_date, Country, LocationMatch, PrayerSchedule};
use crate::discord::data::reply_ephemeral;
use crate::discord::{Context, Error};
use chrono::Utc;
use poise::serenity_prelude as serenity;

const AUTOCOMPLETE_LIMIT: usize = 25;

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum Negara {
    #[name = "Indonesia"]
    Indonesia,
    #[name = "Malaysia"]
    Malaysia,
}

impl From<Negara> for Country {
    fn from(value: Negara) -> Self {
        match value {
            Negara::Indonesia => Country::Indonesia,
            Negara::Malaysia => Country::Malaysia,
        }
    }
}

/// The country picked so far in the interaction, if any.
fn selected_country(ctx: &Context<'_>) -> Option<Country> {
    let poise::Context::Application(app) = ctx else {
        return None;
    };
    let option = app
        .interaction
        .data
        .options
        .iter()
        .find(|o| o.name == "negara")?;
    match &option.value {
        serenity::CommandDataOptionValue::Integer(0) => Some(Country::Indonesia),
        serenity::CommandDataOptionValue::Integer(1) => Some(Country::Malaysia),
        serenity::CommandDataOptionValue::String(raw) => Country::parse(raw),
        _ => None,
    }
}

async fn autocomplete_location<'a>(
    ctx: Context<'_>,
    partial: &'a str,
) -> impl Iterator<Item = serenity::AutocompleteChoice> + 'a {
    let matches = match selected_country(&ctx) {
        Some(country) => match ctx.data().prayer.search(country, partial).await {
            Ok(matches) => matches,
            Err(e) => {
                tracing::debug!("Prayer location autocomplete failed: {}", e);
                Vec::new()
            }
        },
        None => Vec::new(),
    };
    matches
        .into_iter()
        .take(AUTOCOMPLETE_LIMIT)
        .map(|m| serenity::AutocompleteChoice::new(m.choice_label(), m.code))
}

fn schedule_embed(schedule: &PrayerSchedule) -> serenity::CreateEmbed {
    let colour = match schedule.country {
        Country::Indonesia => serenity::Colour::TEAL,
        Country::Malaysia => serenity::Colour::DARK_GREEN,
    };
    let mut embed = serenity::CreateEmbed::new()
        .title(&schedule.title)
        .description(&schedule.description)
        .color(colour);
    for (name, time) in &schedule.times {
        embed = embed.field(*name, time, true);
    }
    if let Some(hijri) = &schedule.hijri {
        embed = embed.field("Tanggal Hijriah", hijri, false);
    }
    embed.footer(serenity::CreateEmbedFooter::new(&schedule.footer))
}

fn search_embed(country: Country, keyword: &str, results: &[LocationMatch]) -> serenity::CreateEmbed {
    let (title, colour, code_label) = match country {
        Country::Indonesia => (
            "Pencarian Kota Jadwal Sholat (Indonesia)",
            serenity::Colour::BLUE,
            "ID Kota",
        ),
        Country::Malaysia => (
            "Pencarian Zona JAKIM (Malaysia)",
            serenity::Colour::DARK_TEAL,
            "Zona JAKIM",
        ),
    };
    let mut embed = serenity::CreateEmbed::new()
        .title(title)
        .description(format!("Kata kunci: `{}`", keyword))
        .color(colour);
    for item in results {
        let mut value = format!("{}: `{}`", code_label, item.code);
        if let Some(detail) = &item.detail {
            value.push('\n');
            value.push_str(detail);
        }
        embed = embed.field(&item.name, value, false);
    }
    embed.footer(serenity::CreateEmbedFooter::new(format!(
        "Sumber: {}",
        country.source_host()
    )))
}

/// Show the daily prayer schedule.
#[poise::command(slash_command)]
pub async fn jadwalsholat(
    ctx: Context<'_>,
    #[description = "Pilih negara sumber jadwal"] negara: Negara,
    #[description = "ID kota (Indonesia) atau kode zona (Malaysia)"]
    #[autocomplete = "autocomplete_location"]
    lokasi: String,
    #[description = "Tahun (YYYY). Kosong berarti tahun ini."] tahun: Option<i32>,
    #[description = "Bulan (1-12). Kosong berarti bulan ini."] bulan: Option<u32>,
    #[description = "Tanggal (1-31). Kosong berarti hari ini."] tanggal: Option<u32>,
) -> Result<(), Error> {
    let country = Country::from(negara);
    let date = match build_target_date(country, tahun, bulan, tanggal, Utc::now()) {
        Ok(date) => date,
        Err(e) => return reply_ephemeral(ctx, e.to_string()).await,
    };

    ctx.defer().await?;
    match ctx.data().prayer.daily_schedule(country, &lokasi, date).await {
        Ok(schedule) => {
            ctx.send(poise::CreateReply::default().embed(schedule_embed(&schedule)))
                .await?;
            Ok(())
        }
        Err(e) => {
            tracing::warn!(location = %lokasi, "Prayer schedule lookup failed: {}", e);
            reply_ephemeral(ctx, e.to_string()).await
        }
    }
}

/// Find a city ID (Indonesia) or JAKIM zone code (Malaysia).
#[poise::command(slash_command)]
pub async fn carijadwalsholat(
    ctx: Context<'_>,
    #[description = "Pilih negara sumber data"] negara: Negara,
    #[description = "Nama kota atau zona yang dicari"] kata_kunci: String,
    #[description = "Batas jumlah hasil (1-25)"]
    #[min = 1]
    #[max = 25]
    batas: Option<usize>,
) -> Result<(), Error> {
    let keyword = kata_kunci.trim();
    if keyword.chars().count() < 2 {
        return reply_ephemeral(ctx, "Masukkan minimal 2 karakter untuk melakukan pencarian.")
            .await;
    }

    let country = Country::from(negara);
    let results = match ctx.data().prayer.search(country, keyword).await {
        Ok(results) => results,
        Err(e) => return reply_ephemeral(ctx, e.to_string()).await,
    };
    let limited: Vec<_> = results
        .into_iter()
        .take(batas.unwrap_or(10).clamp(1, 25))
        .collect();
    if limited.is_empty() {
        return reply_ephemeral(ctx, "Tidak ada hasil yang cocok. Coba kata kunci lain.").await;
    }

    ctx.send(
        poise::CreateReply::default()
            .embed(search_embed(country, keyword, &limited))
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choices_map_onto_countries() {
        assert_eq!(Country::from(Negara::Indonesia), Country::Indonesia);
        assert_eq!(Country::from(Negara::Malaysia), Country::Malaysia);
    }
}
