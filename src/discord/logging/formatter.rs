use crate::core::logging::{
    format_attachments, format_user, truncate_content, LogEvent, LoggedUser, MAX_CONTENT_LENGTH,
};
use poise::serenity_prelude::{self as serenity, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter};

fn with_author(embed: CreateEmbed, user: &LoggedUser) -> CreateEmbed {
    let mut author = CreateEmbedAuthor::new(&user.name);
    if let Some(url) = &user.avatar_url {
        author = author.icon_url(url);
    }
    embed.author(author)
}

fn or_placeholder(content: &str) -> String {
    if content.trim().is_empty() {
        "*(kosong)*".to_string()
    } else {
        truncate_content(content, MAX_CONTENT_LENGTH)
    }
}

pub fn format_log_event(event: &LogEvent) -> CreateEmbed {
    let embed = match event {
        LogEvent::MessageEdited {
            author,
            channel_id,
            before,
            after,
            jump_url,
        } => {
            let mut embed = CreateEmbed::default()
                .title("✏️ Pesan Diedit")
                .color(serenity::Color::from_rgb(255, 193, 7))
                .field("Pengguna", format_user(Some(author), "Tidak diketahui"), true)
                .field("Channel", format!("<#{}>", channel_id), true)
                .field("Sebelum", or_placeholder(before), false)
                .field("Sesudah", or_placeholder(after), false);
            if let Some(url) = jump_url {
                embed = embed.field("Tautan", format!("[Lihat pesan]({})", url), false);
            }
            with_author(embed, author)
        }

        LogEvent::MessageDeleted {
            author,
            channel_id,
            content,
            attachments,
        } => {
            let mut embed = CreateEmbed::default()
                .title("🗑️ Pesan Dihapus")
                .color(serenity::Color::RED)
                .field(
                    "Pengguna",
                    format_user(author.as_ref(), "Tidak diketahui"),
                    true,
                )
                .field("Channel", format!("<#{}>", channel_id), true)
                .field("Isi", or_placeholder(content), false);
            if let Some(list) = format_attachments(attachments) {
                embed = embed.field("Lampiran", list, false);
            }
            match author {
                Some(user) => with_author(embed, user),
                None => embed,
            }
        }

        LogEvent::MemberJoined {
            user,
            account_created,
            is_bot,
        } => {
            let mut embed = CreateEmbed::default()
                .title("📥 Member Bergabung")
                .description(format!("<@{}> bergabung ke server.", user.id))
                .color(serenity::Color::from_rgb(0, 200, 83))
                .field(
                    "Akun dibuat",
                    format!("<t:{}:R>", account_created.timestamp()),
                    true,
                );
            if *is_bot {
                embed = embed.field("Tipe", "🤖 Bot", true);
            }
            if let Some(url) = &user.avatar_url {
                embed = embed.thumbnail(url);
            }
            embed
        }

        LogEvent::MemberLeft { user, joined_at } => {
            let joined = joined_at
                .map(|t| format!("<t:{}:R>", t.timestamp()))
                .unwrap_or_else(|| "Tidak diketahui".to_string());
            let mut embed = CreateEmbed::default()
                .title("📤 Member Keluar")
                .description(format!("<@{}> (`{}`) meninggalkan server.", user.id, user.name))
                .color(serenity::Color::from_rgb(255, 87, 34))
                .field("Bergabung", joined, true);
            if let Some(url) = &user.avatar_url {
                embed = embed.thumbnail(url);
            }
            embed
        }

        LogEvent::Voice { user, change } => with_author(
            CreateEmbed::default()
                .title("🔊 Aktivitas Voice")
                .description(format!("<@{}>: {}", user.id, change.describe()))
                .color(serenity::Color::BLUE),
            user,
        ),

        LogEvent::Channel {
            action,
            channel_id,
            name,
        } => CreateEmbed::default()
            .title(format!("📁 Channel {}", action.label()))
            .description(format!("**#{}** (`{}`)", name, channel_id))
            .color(serenity::Color::DARK_TEAL),

        LogEvent::Role {
            action,
            role_id,
            name,
        } => CreateEmbed::default()
            .title(format!("🎭 Role {}", action.label()))
            .description(format!("**{}** (`{}`)", name, role_id))
            .color(serenity::Color::DARK_GOLD),

        LogEvent::Reaction {
            user_id,
            channel_id,
            emoji,
            added,
            jump_url,
        } => CreateEmbed::default()
            .title(if *added {
                "😀 Reaksi Ditambahkan"
            } else {
                "🫥 Reaksi Dihapus"
            })
            .description(format!(
                "<@{}> {} {} di <#{}>\n[Lihat pesan]({})",
                user_id,
                if *added { "menambahkan" } else { "menghapus" },
                emoji,
                channel_id,
                jump_url
            ))
            .color(serenity::Color::LIGHT_GREY),

        LogEvent::CommandUsed {
            user,
            channel_id,
            command,
            error,
        } => {
            let mut embed = CreateEmbed::default()
                .title("⌨️ Perintah Digunakan")
                .description(format!("`/{}` oleh <@{}> di <#{}>", command, user.id, channel_id))
                .color(if error.is_some() {
                    serenity::Color::RED
                } else {
                    serenity::Color::BLURPLE
                });
            if let Some(err) = error {
                embed = embed.field("Error", truncate_content(err, MAX_CONTENT_LENGTH), false);
            }
            embed
        }
    };

    embed
        .footer(CreateEmbedFooter::new(format!(
            "Kategori: {}",
            event.category().label()
        )))
        .timestamp(serenity::Timestamp::now())
}
