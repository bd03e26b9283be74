use crate::discord::{Context, Error};
use poise::serenity_prelude as serenity;
use std::collections::HashMap;

// Category definitions with emojis and order
const CATEGORY_ORDER: &[&str] = &[
    "Mulai",
    "Level & Ekonomi",
    "Pasangan",
    "Hiburan",
    "Utilitas",
    "Moderasi",
    "Pengaturan",
];

fn category_emoji(category: &str) -> &'static str {
    match category {
        "Mulai" => "🚀",
        "Level & Ekonomi" => "📈",
        "Pasangan" => "💞",
        "Hiburan" => "🎉",
        "Utilitas" => "🧰",
        "Moderasi" => "🛡️",
        "Pengaturan" => "⚙️",
        _ => "•",
    }
}

struct CommandMetadata {
    category: &'static str,
    priority: i32,
    description: Option<&'static str>,
    note: Option<&'static str>,
}

impl CommandMetadata {
    const fn new(category: &'static str, priority: i32) -> Self {
        Self {
            category,
            priority,
            description: None,
            note: None,
        }
    }

    const fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    const fn note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }
}

fn command_metadata(name: &str) -> CommandMetadata {
    match name {
        "ping" => CommandMetadata::new("Mulai", 100).describe("Menampilkan latensi bot."),
        "userinfo" => CommandMetadata::new("Mulai", 90).describe("Informasi dasar pengguna."),
        "serverinfo" => CommandMetadata::new("Mulai", 85).describe("Ringkasan server."),
        "botstats" => CommandMetadata::new("Mulai", 80).describe("Statistik bot & uptime."),
        "level" => CommandMetadata::new("Level & Ekonomi", 100)
            .describe("Lihat level, papan peringkat XP, dan hadiah role.")
            .note("Subcommand: rank, leaderboard, rewards"),
        "balance" => CommandMetadata::new("Level & Ekonomi", 90),
        "daily" => CommandMetadata::new("Level & Ekonomi", 85),
        "work" => CommandMetadata::new("Level & Ekonomi", 80),
        "transfer" => CommandMetadata::new("Level & Ekonomi", 70),
        "gamble" => CommandMetadata::new("Level & Ekonomi", 60),
        "richest" => CommandMetadata::new("Level & Ekonomi", 55),
        "shop" => CommandMetadata::new("Level & Ekonomi", 50).note("Subcommand: list, buy"),
        "couple" => CommandMetadata::new("Pasangan", 100)
            .describe("Lamar, rayakan anniversary, simpan kenangan, dan kirim hadiah.")
            .note("Mulai dengan /couple propose"),
        "meme" | "quote" | "joke" => CommandMetadata::new("Hiburan", 60),
        "dice" | "8ball" | "ship" => CommandMetadata::new("Hiburan", 50),
        "reminder" => CommandMetadata::new("Utilitas", 90).note("Contoh durasi: 30m, 2 jam, 1 hari"),
        "timestamp" => CommandMetadata::new("Utilitas", 80)
            .describe("Ubah waktu lokal menjadi timestamp Discord."),
        "jadwalsholat" => CommandMetadata::new("Utilitas", 70)
            .describe("Tampilkan jadwal sholat harian untuk Indonesia atau Malaysia."),
        "carijadwalsholat" => CommandMetadata::new("Utilitas", 65)
            .describe("Cari ID kota (Indonesia) atau kode JAKIM zona (Malaysia)."),
        "ticket" => CommandMetadata::new("Utilitas", 60).note("Subcommand: create, close, add, remove"),
        "moderasi" => CommandMetadata::new("Moderasi", 100)
            .note("kick, ban, unban, clear, warn, warnings, removewarn, timeout, mute, unmute"),
        "automod" => CommandMetadata::new("Moderasi", 90),
        "audit" => CommandMetadata::new("Moderasi", 80),
        "announce" => CommandMetadata::new("Moderasi", 70),
        "shopadmin" => CommandMetadata::new("Pengaturan", 60),
        "setup" => CommandMetadata::new("Pengaturan", 100),
        "activitylog" => CommandMetadata::new("Pengaturan", 90),
        _ => CommandMetadata::new("Utilitas", 0),
    }
}

/// List the bot's commands by category.
#[poise::command(slash_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    let mut categories: HashMap<&str, Vec<(i32, String)>> = HashMap::new();

    for command in &ctx.framework().options().commands {
        if command.hide_in_help || command.name == "help" {
            continue;
        }

        let metadata = command_metadata(&command.name);
        let description = metadata
            .description
            .or(command.description.as_deref())
            .or(command.help_text.as_deref())
            .unwrap_or("Tidak ada deskripsi.");

        let mut entry = format!("• **/{}**: {}", command.name, description);
        if let Some(note) = metadata.note {
            entry.push_str(&format!("\n  ⤷ {}", note));
        }

        categories
            .entry(metadata.category)
            .or_default()
            .push((metadata.priority, entry));
    }

    let mut embed = serenity::CreateEmbed::new()
        .title("Panduan Perintah")
        .description(
            "Berikut perintah utama ForUS. Gunakan auto-complete di Discord untuk melihat semua opsi.",
        )
        .color(serenity::Colour::BLURPLE)
        .timestamp(serenity::Timestamp::now());

    if let Ok(user) = ctx.framework().bot_id.to_user(&ctx).await {
        embed = embed.thumbnail(user.face());
    }

    let mut sorted_categories: Vec<_> = categories.keys().copied().collect();
    sorted_categories.sort_by(|a, b| {
        let pos_a = CATEGORY_ORDER.iter().position(|x| x == a).unwrap_or(usize::MAX);
        let pos_b = CATEGORY_ORDER.iter().position(|x| x == b).unwrap_or(usize::MAX);
        pos_a.cmp(&pos_b).then(a.cmp(b))
    });

    for category in sorted_categories {
        let Some(entries) = categories.get_mut(category) else {
            continue;
        };
        entries.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        let title = format!("{} {}", category_emoji(category), category);
        let formatted: Vec<String> = entries.iter().map(|(_, s)| s.clone()).collect();

        for (i, chunk) in chunk_entries(&formatted).iter().enumerate() {
            let field_name = if i == 0 {
                title.clone()
            } else {
                format!("{} (lanjutan)", title)
            };
            embed = embed.field(field_name, chunk.join("\n"), false);
        }
    }

    embed = embed.footer(serenity::CreateEmbedFooter::new(
        "Butuh bantuan? Hubungi moderator.",
    ));

    ctx.send(poise::CreateReply::default().embed(embed).ephemeral(true))
        .await?;
    Ok(())
}

/// Split entries so each field stays under Discord's 1024 character limit.
fn chunk_entries(entries: &[String]) -> Vec<Vec<String>> {
    let mut chunks = Vec::new();
    let mut current = Vec::new();
    let mut length = 0;

    for entry in entries {
        let entry_len = entry.len();
        if !current.is_empty() && length + entry_len + 1 > 1000 {
            chunks.push(std::mem::take(&mut current));
            length = 0;
        }
        current.push(entry.clone());
        length += entry_len + 1;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_lists_are_split_into_fields() {
        let entries: Vec<String> = (0..30).map(|i| format!("{:0>60}", i)).collect();
        let chunks = chunk_entries(&entries);
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.join("\n").len() <= 1024);
        }
        assert_eq!(chunks.iter().map(Vec::len).sum::<usize>(), 30);
    }

    #[test]
    fn unknown_commands_fall_into_utilities() {
        let meta = command_metadata("something-new");
        assert_eq!(meta.category, "Utilitas");
        assert!(meta.description.is_none());
    }

    #[test]
    fn every_listed_category_has_an_emoji() {
        for category in CATEGORY_ORDER {
            assert_ne!(category_emoji(category), "•");
        }
    }
}
