// Couple commands: proposals, love points, the shared profile and memories.

use crate::core::couples::{
    color_from_hex, compatibility_message, format_duration_since, format_timedelta,
    random_date_idea, CoupleError, CoupleOverview, CoupleStatus, MilestoneDef, ProfilePatch,
};
use crate::core::economy::{format_number, EconomyError};
use crate::discord::data::{guild_id, reply_ephemeral};
use crate::discord::{Context, Error};
use chrono::{DateTime, TimeZone, Utc};
use poise::serenity_prelude as serenity;

const COUPLE_PINK: u32 = 0xE91E63;
const LEADERBOARD_SIZE: usize = 10;

async fn couple_failure(ctx: Context<'_>, err: CoupleError) -> Result<(), Error> {
    match err {
        CoupleError::StorageError(_) | CoupleError::Economy(EconomyError::StoreError(_)) => {
            Err(err.into())
        }
        other => reply_ephemeral(ctx, format!("❌ {}", other)).await,
    }
}

/// Best-effort DM; members with closed DMs are skipped.
async fn notify(ctx: Context<'_>, user_id: u64, text: String) {
    let dm = serenity::CreateMessage::new().content(text);
    if let Err(e) = serenity::UserId::new(user_id).direct_message(ctx, dm).await {
        tracing::debug!(user_id, "Couple DM skipped: {}", e);
    }
}

fn milestone_lines(unlocked: &[&MilestoneDef]) -> Option<String> {
    if unlocked.is_empty() {
        return None;
    }
    Some(
        unlocked
            .iter()
            .map(|m| format!("🏆 {}\n→ {}", m.title, m.description))
            .collect::<Vec<_>>()
            .join("\n"),
    )
}

fn with_milestones(text: String, unlocked: &[&MilestoneDef]) -> String {
    match milestone_lines(unlocked) {
        Some(lines) => format!("{}\n\n{}", text, lines),
        None => text,
    }
}

fn status_embed(
    title: &str,
    viewer_id: u64,
    overview: &CoupleOverview,
    now: DateTime<Utc>,
) -> serenity::CreateEmbed {
    let record = &overview.record;
    let profile = &overview.profile;
    let partner_id = record.partner_id(viewer_id);

    let mut embed = serenity::CreateEmbed::new()
        .title(title)
        .color(color_from_hex(profile.theme_color.as_deref()).unwrap_or(COUPLE_PINK))
        .field("Pengguna", format!("<@{}>", viewer_id), true)
        .field(
            "Pasangan",
            partner_id
                .map(|id| format!("<@{}>", id))
                .unwrap_or_else(|| "-".to_string()),
            true,
        )
        .field("Status", record.status.label(), true);

    if let Some(title) = &profile.title {
        embed = embed.field("Julukan Cinta", title, true);
    }
    if let Some(mood) = &profile.current_mood {
        embed = embed.field("Mood", mood, true);
    }
    if let Some(song) = &profile.love_song {
        embed = embed.field("Lagu Favorit", song, false);
    }
    embed = embed.field("Love Points", record.love_points.to_string(), true);

    if let Some(anniversary) = record.anniversary {
        embed = embed.field("Tanggal Anniversary", anniversary.to_string(), true);
        if let Some(start) = anniversary.and_hms_opt(0, 0, 0) {
            embed = embed.field(
                "Lama Bersama",
                format_duration_since(Utc.from_utc_datetime(&start), now),
                true,
            );
        }
    }

    if let Some(last) = record.last_affection_for(viewer_id) {
        embed = embed.field("Afirmasi Terakhirmu", format_timedelta(now - last), true);
    }
    if let Some(last) = partner_id.and_then(|id| record.last_affection_for(id)) {
        embed = embed.field("Afirmasi Dari Pasangan", format_timedelta(now - last), true);
    }

    if profile.checkin_streak > 0 {
        let mut streak = format!("{} hari", profile.checkin_streak);
        if let Some(date) = profile.last_checkin_date {
            streak.push_str(&format!(" (terakhir {})", date));
        }
        embed = embed.field("Streak Check-in", streak, true);
    }

    if let Some(memory) = &overview.latest_memory {
        let text = format!(
            "**{}** · {}",
            memory.title,
            memory.description.as_deref().unwrap_or("Tanpa deskripsi")
        );
        embed = embed.field("Memori Terbaru", truncate(&text, 1024), false);
    }

    if !overview.achieved.is_empty() {
        let start = overview.achieved.len().saturating_sub(3);
        let lines = overview.achieved[start..]
            .iter()
            .map(|m| format!("✅ {}", m.title))
            .collect::<Vec<_>>()
            .join("\n");
        embed = embed.field("Milestone Tercapai", lines, false);
    }
    if let Some(next) = overview.next_milestone {
        embed = embed.field(
            "Target Berikutnya",
            format!("🎯 {} · {}", next.title, next.description),
            false,
        );
    }
    if let Some(bio) = &profile.bio {
        embed = embed.field("Bio", truncate(bio, 1024), false);
    }
    embed
}

fn truncate(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum Decision {
    #[name = "Terima"]
    Accept,
    #[name = "Tolak"]
    Reject,
}

#[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
pub enum GiftChoice {
    #[name = "💐 Bukiet Bunga (250 koin)"]
    Flowers,
    #[name = "🍫 Cokelat Artisan (420 koin)"]
    Chocolate,
    #[name = "🌟 Lampu Bintang (650 koin)"]
    Stars,
    #[name = "💍 Cincin Janji (900 koin)"]
    Ring,
    #[name = "🏖️ Staycation Romantis (1400 koin)"]
    Vacation,
}

impl GiftChoice {
    fn key(self) -> &'static str {
        match self {
            GiftChoice::Flowers => "flowers",
            GiftChoice::Chocolate => "chocolate",
            GiftChoice::Stars => "stars",
            GiftChoice::Ring => "ring",
            GiftChoice::Vacation => "vacation",
        }
    }
}

/// Couple mini-game.
#[poise::command(
    slash_command,
    guild_only,
    subcommands(
        "propose",
        "respond",
        "status",
        "anniversary",
        "profile",
        "memory",
        "affection",
        "checkin",
        "gift",
        "dateidea",
        "leaderboard",
        "breakup"
    )
)]
pub async fn couple(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Propose to someone special.
#[poise::command(slash_command, guild_only)]
pub async fn propose(
    ctx: Context<'_>,
    #[description = "Pengguna yang ingin diajak menjadi pasangan"] pasangan: serenity::User,
    #[description = "Pesan manis opsional"] pesan: Option<String>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let author = ctx.author().clone();

    let record = match ctx
        .data()
        .couples
        .propose(guild_id, author.id.get(), pasangan.id.get(), pasangan.bot, pesan, Utc::now())
        .await
    {
        Ok(record) => record,
        Err(e) => return couple_failure(ctx, e).await,
    };

    let mut embed = serenity::CreateEmbed::new()
        .title("💍 Lamaran Baru!")
        .description(format!(
            "<@{}> mengajak <@{}> menjadi pasangan!",
            author.id, pasangan.id
        ))
        .color(COUPLE_PINK)
        .footer(serenity::CreateEmbedFooter::new(
            "Gunakan /couple respond untuk menjawab lamaran.",
        ));
    if let Some(message) = &record.proposal_message {
        embed = embed.field("Pesan", message, false);
    }

    ctx.send(
        poise::CreateReply::default()
            .embed(embed)
            .allowed_mentions(
                serenity::CreateAllowedMentions::new().users(vec![author.id, pasangan.id]),
            ),
    )
    .await?;

    let guild_name = ctx
        .guild()
        .map(|g| g.name.clone())
        .unwrap_or_else(|| "server".to_string());
    notify(
        ctx,
        pasangan.id.get(),
        format!(
            "{} mengajakmu jadi pasangan di server {}! Gunakan /couple respond di server untuk menjawab.",
            author.display_name(),
            guild_name
        ),
    )
    .await;
    Ok(())
}

/// Answer a proposal addressed to you.
#[poise::command(slash_command, guild_only)]
pub async fn respond(
    ctx: Context<'_>,
    #[description = "Jawabanmu atas lamaran"] keputusan: Decision,
    #[description = "Pesan opsional untuk pasangan"] pesan: Option<String>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let author = ctx.author().clone();
    if pesan.as_deref().is_some_and(|p| p.chars().count() > 240) {
        return couple_failure(ctx, CoupleError::MessageTooLong(240)).await;
    }

    let accept = matches!(keputusan, Decision::Accept);
    let record = match ctx
        .data()
        .couples
        .respond(guild_id, author.id.get(), accept, Utc::now())
        .await
    {
        Ok(record) => record,
        Err(e) => return couple_failure(ctx, e).await,
    };
    let initiator = record.initiator_id;
    let note = pesan
        .map(|p| format!(" Pesannya: {}", p))
        .unwrap_or_default();

    if record.status == CoupleStatus::Active {
        let embed = serenity::CreateEmbed::new()
            .title("💞 Selamat!")
            .description(format!(
                "<@{}> menerima lamaran <@{}>!",
                author.id, initiator
            ))
            .color(COUPLE_PINK)
            .field(
                "Tanggal Anniversary",
                record
                    .anniversary
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "hari ini".to_string()),
                true,
            )
            .field("Love Points", record.love_points.to_string(), true)
            .footer(serenity::CreateEmbedFooter::new(
                "Kirim /couple affection setiap hari untuk menambah love points!",
            ));
        ctx.send(
            poise::CreateReply::default().embed(embed).allowed_mentions(
                serenity::CreateAllowedMentions::new()
                    .users(vec![author.id, serenity::UserId::new(initiator)]),
            ),
        )
        .await?;
        notify(
            ctx,
            initiator,
            format!("{} menerima lamaranmu!{}", author.display_name(), note),
        )
        .await;
    } else {
        reply_ephemeral(
            ctx,
            "Lamaran telah ditolak. Semoga kamu nyaman dengan keputusanmu.",
        )
        .await?;
        notify(
            ctx,
            initiator,
            format!("{} menolak lamarannya.{}", author.display_name(), note),
        )
        .await;
    }
    Ok(())
}

/// See your relationship status, or someone else's.
#[poise::command(slash_command, guild_only)]
pub async fn status(
    ctx: Context<'_>,
    #[description = "Cek status pasangan untuk pengguna tertentu"] target: Option<serenity::User>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let user = target.as_ref().unwrap_or_else(|| ctx.author());

    let record = match ctx.data().couples.status(guild_id, user.id.get()).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            return reply_ephemeral(ctx, "Belum ada data pasangan untuk pengguna tersebut.").await
        }
        Err(e) => return couple_failure(ctx, e).await,
    };
    let overview = ctx.data().couples.overview(record).await?;
    let embed = status_embed("Status Pasangan", user.id.get(), &overview, Utc::now());
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Anniversary date.
#[poise::command(slash_command, guild_only, subcommands("anniversary_set"))]
pub async fn anniversary(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Set the anniversary date (YYYY-MM-DD).
#[poise::command(slash_command, guild_only, rename = "set")]
pub async fn anniversary_set(
    ctx: Context<'_>,
    #[description = "Tanggal (YYYY-MM-DD)"] tanggal: String,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    match ctx
        .data()
        .couples
        .set_anniversary(guild_id, ctx.author().id.get(), &tanggal, Utc::now())
        .await
    {
        Ok(record) => {
            let date = record
                .anniversary
                .map(|d| d.to_string())
                .unwrap_or(tanggal);
            reply_ephemeral(ctx, format!("Tanggal anniversary diperbarui menjadi {}.", date)).await
        }
        Err(e) => couple_failure(ctx, e).await,
    }
}

/// The couple's shared profile.
#[poise::command(
    slash_command,
    guild_only,
    subcommands("profile_view", "profile_edit")
)]
pub async fn profile(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// View your couple profile.
#[poise::command(slash_command, guild_only, rename = "view")]
pub async fn profile_view(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let user_id = ctx.author().id.get();
    let record = match ctx.data().couples.active_for(guild_id, user_id).await {
        Ok(record) => record,
        Err(e) => return couple_failure(ctx, e).await,
    };
    let overview = ctx.data().couples.overview(record).await?;
    let embed = status_embed("Profil Cinta", user_id, &overview, Utc::now());
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Update your couple profile.
#[poise::command(slash_command, guild_only, rename = "edit")]
pub async fn profile_edit(
    ctx: Context<'_>,
    #[description = "Julukan romantis kalian"] title: Option<String>,
    #[description = "Warna tema (hex, contoh #FF66AA)"] theme_color: Option<String>,
    #[description = "Lagu favorit berdua"] love_song: Option<String>,
    #[description = "Deskripsi singkat hubungan (maks 500 karakter)"] bio: Option<String>,
    #[description = "Mood hari ini"] mood: Option<String>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let user_id = ctx.author().id.get();
    let patch = ProfilePatch {
        title,
        theme_color,
        love_song,
        bio,
        current_mood: mood,
    };

    if let Err(e) = ctx.data().couples.update_profile(guild_id, user_id, patch).await {
        return couple_failure(ctx, e).await;
    }
    let record = ctx.data().couples.active_for(guild_id, user_id).await?;
    let overview = ctx.data().couples.overview(record).await?;
    let embed = status_embed("Profil Cinta Terbaru", user_id, &overview, Utc::now());
    ctx.send(
        poise::CreateReply::default()
            .content("Profil cinta berhasil diperbarui!")
            .embed(embed)
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

/// The memory journal.
#[poise::command(
    slash_command,
    guild_only,
    subcommands("memory_add", "memory_list", "memory_delete")
)]
pub async fn memory(_ctx: Context<'_>) -> Result<(), Error> {
    Ok(())
}

/// Add a memory to the journal.
#[poise::command(slash_command, guild_only, rename = "add")]
pub async fn memory_add(
    ctx: Context<'_>,
    #[description = "Judul memori"] judul: String,
    #[description = "Ceritanya"] cerita: Option<String>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let author = ctx.author().clone();
    let result = match ctx
        .data()
        .couples
        .add_memory(guild_id, author.id.get(), &judul, cerita.as_deref(), Utc::now())
        .await
    {
        Ok(result) => result,
        Err(e) => return couple_failure(ctx, e).await,
    };

    reply_ephemeral(
        ctx,
        with_milestones("Memori baru tersimpan!".to_string(), &result.unlocked),
    )
    .await?;

    if let Ok(record) = ctx.data().couples.active_for(guild_id, author.id.get()).await {
        if let Some(partner) = record.partner_id(author.id.get()) {
            let preview = truncate(
                result
                    .memory
                    .description
                    .as_deref()
                    .unwrap_or("Tanpa deskripsi tambahan"),
                200,
            );
            notify(
                ctx,
                partner,
                format!(
                    "{} menambahkan memori baru: **{}**\n{}",
                    author.display_name(),
                    result.memory.title,
                    preview
                ),
            )
            .await;
        }
    }
    Ok(())
}

/// Show your latest memories.
#[poise::command(slash_command, guild_only, rename = "list")]
pub async fn memory_list(
    ctx: Context<'_>,
    #[description = "Jumlah memori (1-10)"]
    #[min = 1]
    #[max = 10]
    jumlah: Option<usize>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let memories = match ctx
        .data()
        .couples
        .list_memories(guild_id, ctx.author().id.get(), jumlah.unwrap_or(5))
        .await
    {
        Ok(memories) => memories,
        Err(CoupleError::NoActiveCouple) => {
            return reply_ephemeral(ctx, "Belum ada memori yang bisa ditampilkan.").await
        }
        Err(e) => return couple_failure(ctx, e).await,
    };
    if memories.is_empty() {
        return reply_ephemeral(ctx, "Album memori masih kosong.").await;
    }

    let mut embed = serenity::CreateEmbed::new()
        .title("Memori Romantis")
        .color(serenity::Colour::GOLD);
    for memory in &memories {
        embed = embed.field(
            format!("#{} · {}", memory.id, memory.title),
            truncate(memory.description.as_deref().unwrap_or("(Tanpa deskripsi)"), 1024),
            false,
        );
    }
    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Delete a memory by id.
#[poise::command(slash_command, guild_only, rename = "delete")]
pub async fn memory_delete(
    ctx: Context<'_>,
    #[description = "ID memori"] memori_id: i64,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    match ctx
        .data()
        .couples
        .delete_memory(guild_id, ctx.author().id.get(), memori_id)
        .await
    {
        Ok(true) => reply_ephemeral(ctx, "Memori berhasil dihapus.").await,
        Ok(false) => reply_ephemeral(ctx, "Memori tidak ditemukan.").await,
        Err(e) => couple_failure(ctx, e).await,
    }
}

/// Send your partner some love points.
#[poise::command(slash_command, guild_only)]
pub async fn affection(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let result = match ctx
        .data()
        .couples
        .send_affection(guild_id, ctx.author().id.get(), Utc::now())
        .await
    {
        Ok(result) => result,
        Err(e) => return couple_failure(ctx, e).await,
    };

    let mut text = format!("Love points bertambah **{}**", result.points);
    if result.bonus > 0 {
        text.push_str(&format!(" (bonus {})", result.bonus));
    }
    text.push_str(&format!(
        ". Total sekarang **{}**.",
        result.record.love_points
    ));
    if result.bonus > 0 {
        text.push_str(" Kamu mendapat bonus karena kompak dengan pasangan!");
    }
    reply_ephemeral(ctx, with_milestones(text, &result.unlocked)).await
}

/// Daily couple check-in.
#[poise::command(slash_command, guild_only)]
pub async fn checkin(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let result = match ctx
        .data()
        .couples
        .checkin(guild_id, ctx.author().id.get(), Utc::now())
        .await
    {
        Ok(result) => result,
        Err(e) => return couple_failure(ctx, e).await,
    };

    let text = format!(
        "✅ Check-in berhasil! +{} love points. Streak kalian: **{} hari**. Total: **{}**.",
        result.reward, result.streak, result.record.love_points
    );
    reply_ephemeral(ctx, with_milestones(text, &result.unlocked)).await
}

/// Buy your partner a gift with coins.
#[poise::command(slash_command, guild_only)]
pub async fn gift(
    ctx: Context<'_>,
    #[description = "Hadiah yang ingin dikirim"] hadiah: GiftChoice,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let author = ctx.author().clone();
    let result = match ctx
        .data()
        .couples
        .send_gift(
            ctx.data().economy.as_ref(),
            guild_id,
            author.id.get(),
            hadiah.key(),
            Utc::now(),
        )
        .await
    {
        Ok(result) => result,
        Err(e) => return couple_failure(ctx, e).await,
    };

    let partner = result.record.partner_id(author.id.get());
    let embed = serenity::CreateEmbed::new()
        .title(format!("{} {}", result.gift.emoji, result.gift.name))
        .description(result.gift.description)
        .color(COUPLE_PINK)
        .field("Love Points", format!("+{}", result.gift.love), true)
        .field("Total", result.record.love_points.to_string(), true)
        .field(
            "Saldo Koin",
            format!("🪙 {}", format_number(result.new_balance)),
            true,
        );
    let content = with_milestones(
        match partner {
            Some(id) => format!("<@{}> mengirim hadiah untuk <@{}>!", author.id, id),
            None => "Hadiah terkirim!".to_string(),
        },
        &result.unlocked,
    );
    ctx.send(poise::CreateReply::default().content(content).embed(embed))
        .await?;
    Ok(())
}

/// Get a date idea.
#[poise::command(slash_command, guild_only)]
pub async fn dateidea(ctx: Context<'_>) -> Result<(), Error> {
    let score: u8 = rand::random::<u8>() % 101;
    let embed = serenity::CreateEmbed::new()
        .title("💡 Ide Kencan")
        .description(random_date_idea())
        .color(COUPLE_PINK)
        .footer(serenity::CreateEmbedFooter::new(format!(
            "Chemistry hari ini {}% · {}",
            score,
            compatibility_message(score)
        )));
    ctx.send(poise::CreateReply::default().embed(embed)).await?;
    Ok(())
}

/// The most romantic couples on the server.
#[poise::command(slash_command, guild_only)]
pub async fn leaderboard(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let records = ctx
        .data()
        .couples
        .leaderboard(guild_id, LEADERBOARD_SIZE)
        .await?;
    if records.is_empty() {
        ctx.say("Belum ada pasangan aktif di server ini.").await?;
        return Ok(());
    }

    let lines = records
        .iter()
        .enumerate()
        .map(|(idx, r)| {
            let crown = if idx == 0 { "👑 " } else { "" };
            format!(
                "{}**{}.** <@{}> ❤️ <@{}> · {} LP",
                crown,
                idx + 1,
                r.member_one_id,
                r.member_two_id,
                r.love_points
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let embed = serenity::CreateEmbed::new()
        .title("Papan Cinta Server")
        .description(lines)
        .color(serenity::Colour::RED);
    ctx.send(
        poise::CreateReply::default()
            .embed(embed)
            .allowed_mentions(serenity::CreateAllowedMentions::new()),
    )
    .await?;
    Ok(())
}

/// End your current relationship.
#[poise::command(slash_command, guild_only)]
pub async fn breakup(
    ctx: Context<'_>,
    #[description = "Alasan opsional untuk pasanganmu"] alasan: Option<String>,
) -> Result<(), Error> {
    let guild_id = guild_id(&ctx)?;
    let author = ctx.author().clone();
    if alasan.as_deref().is_some_and(|a| a.chars().count() > 240) {
        return couple_failure(ctx, CoupleError::MessageTooLong(240)).await;
    }

    let record = match ctx
        .data()
        .couples
        .breakup(guild_id, author.id.get(), Utc::now())
        .await
    {
        Ok(record) => record,
        Err(e) => return couple_failure(ctx, e).await,
    };

    reply_ephemeral(
        ctx,
        "Hubungan telah diakhiri. Semoga keputusanmu membawa kebaikan.",
    )
    .await?;

    if let Some(partner) = record.partner_id(author.id.get()) {
        let guild_name = ctx
            .guild()
            .map(|g| g.name.clone())
            .unwrap_or_else(|| "server".to_string());
        let reason = alasan
            .map(|a| format!(" Pesan darinya: {}", a))
            .unwrap_or_default();
        notify(
            ctx,
            partner,
            format!(
                "{} mengakhiri hubungan kalian di server {}.{}",
                author.display_name(),
                guild_name,
                reason
            ),
        )
        .await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::couples::couple_catalog::MILESTONES;
    use crate::core::couples::{CoupleProfile, CoupleRecord};

    fn record() -> CoupleRecord {
        let now = Utc::now();
        CoupleRecord {
            id: 1,
            guild_id: 1,
            member_one_id: 10,
            member_two_id: 20,
            initiator_id: 10,
            pending_target_id: 20,
            status: CoupleStatus::Active,
            proposal_message: None,
            anniversary: None,
            love_points: 250,
            last_affection_one: None,
            last_affection_two: None,
            created_at: now,
            updated_at: now,
            ended_at: None,
            ended_by: None,
        }
    }

    #[test]
    fn milestones_are_appended_to_replies() {
        let unlocked = vec![&MILESTONES[0]];
        let text = with_milestones("Oke".to_string(), &unlocked);
        assert!(text.starts_with("Oke"));
        assert!(text.contains(MILESTONES[0].title));
        assert_eq!(with_milestones("Oke".to_string(), &[]), "Oke");
    }

    #[test]
    fn gift_choices_match_catalog() {
        for choice in [
            GiftChoice::Flowers,
            GiftChoice::Chocolate,
            GiftChoice::Stars,
            GiftChoice::Ring,
            GiftChoice::Vacation,
        ] {
            assert!(crate::core::couples::find_gift(choice.key()).is_some());
        }
    }

    #[test]
    fn status_embed_builds_for_fresh_couple() {
        let overview = CoupleOverview {
            record: record(),
            profile: CoupleProfile::empty(1),
            latest_memory: None,
            achieved: vec![&MILESTONES[0]],
            next_milestone: Some(&MILESTONES[1]),
        };
        // Building must not panic on missing optional fields.
        let _ = status_embed("Status Pasangan", 10, &overview, Utc::now());
    }
}
