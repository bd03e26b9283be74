// Shared state handed to every command and event handler.

use crate::core::announcements::AnnouncementService;
use crate::core::audit::AuditService;
use crate::core::config::BotConfig;
use crate::core::couples::CoupleService;
use crate::core::economy::{EconomyService, ShopService};
use crate::core::fun::FunService;
use crate::core::guild_settings::GuildSettingsService;
use crate::core::leveling::LevelingService;
use crate::core::logging::ActivityLogService;
use crate::core::moderation::{AntiSpamService, AutomodService, WarnService};
use crate::core::prayer::PrayerService;
use crate::core::presence::PresenceRotation;
use crate::core::reminders::ReminderService;
use crate::core::scheduler::Scheduler;
use crate::core::tickets::TicketService;
use crate::infra::announcements::SqliteAnnouncementStore;
use crate::infra::audit::SqliteAuditStore;
use crate::infra::couples::SqliteCoupleStore;
use crate::infra::economy::{SqliteCoinStore, SqliteShopStore};
use crate::infra::guild_settings::SqliteGuildSettingsStore;
use crate::infra::http::HttpContentSource;
use crate::infra::leveling::SqliteLevelStore;
use crate::infra::moderation::{SqliteAutomodStore, SqliteWarnStore};
use crate::infra::reminders::SqliteReminderStore;
use crate::infra::tickets::SqliteTicketStore;
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Instant;

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

pub type SharedSource = Arc<HttpContentSource>;

/// Everything is behind an `Arc` so scheduled jobs can hold their own copy.
#[derive(Clone)]
pub struct Data {
    pub config: Arc<BotConfig>,
    pub pool: SqlitePool,
    pub started_at: Instant,
    pub scheduler: Scheduler,
    pub presence: Arc<PresenceRotation>,
    pub settings: Arc<GuildSettingsService<SqliteGuildSettingsStore>>,
    pub leveling: Arc<LevelingService<SqliteLevelStore>>,
    pub economy: Arc<EconomyService<SqliteCoinStore>>,
    pub shop: Arc<ShopService<SqliteShopStore>>,
    pub warns: Arc<WarnService<SqliteWarnStore>>,
    pub automod: Arc<AutomodService<SqliteAutomodStore>>,
    pub anti_spam: Arc<AntiSpamService>,
    pub tickets: Arc<TicketService<SqliteTicketStore>>,
    pub reminders: Arc<ReminderService<SqliteReminderStore>>,
    pub couples: Arc<CoupleService<SqliteCoupleStore>>,
    pub audit: Arc<AuditService<SqliteAuditStore>>,
    pub announcements: Arc<AnnouncementService<SqliteAnnouncementStore>>,
    pub activity_log: Arc<ActivityLogService<SqliteGuildSettingsStore>>,
    pub fun: Arc<FunService<SharedSource>>,
    pub prayer: Arc<PrayerService<SharedSource>>,
}

impl Data {
    /// Wire every service onto one pool and one HTTP client.
    pub fn new(config: BotConfig, pool: SqlitePool, http: HttpContentSource) -> Self {
        let source: SharedSource = Arc::new(http);
        let settings = Arc::new(GuildSettingsService::new(SqliteGuildSettingsStore::new(
            pool.clone(),
        )));

        Self {
            presence: Arc::new(PresenceRotation::new(&config.presence)),
            config: Arc::new(config),
            started_at: Instant::now(),
            scheduler: Scheduler::new(),
            activity_log: Arc::new(ActivityLogService::new(Arc::clone(&settings))),
            settings,
            leveling: Arc::new(LevelingService::new(SqliteLevelStore::new(pool.clone()))),
            economy: Arc::new(EconomyService::new(SqliteCoinStore::new(pool.clone()))),
            shop: Arc::new(ShopService::new(SqliteShopStore::new(pool.clone()))),
            warns: Arc::new(WarnService::new(SqliteWarnStore::new(pool.clone()))),
            automod: Arc::new(AutomodService::new(SqliteAutomodStore::new(pool.clone()))),
            anti_spam: Arc::new(AntiSpamService::new()),
            tickets: Arc::new(TicketService::new(SqliteTicketStore::new(pool.clone()))),
            reminders: Arc::new(ReminderService::new(SqliteReminderStore::new(pool.clone()))),
            couples: Arc::new(CoupleService::new(SqliteCoupleStore::new(pool.clone()))),
            audit: Arc::new(AuditService::new(SqliteAuditStore::new(pool.clone()))),
            announcements: Arc::new(AnnouncementService::new(SqliteAnnouncementStore::new(
                pool.clone(),
            ))),
            fun: Arc::new(FunService::new(Arc::clone(&source))),
            prayer: Arc::new(PrayerService::new(source)),
            pool,
        }
    }
}

/// Guild id of a guild-only command as a plain integer.
pub fn guild_id(ctx: &Context<'_>) -> Result<u64, Error> {
    Ok(ctx
        .guild_id()
        .ok_or("Perintah ini hanya dapat digunakan di dalam server.")?
        .get())
}

/// Ephemeral text reply, used for validation failures and management confirmations.
pub async fn reply_ephemeral(ctx: Context<'_>, text: impl Into<String>) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .content(text.into())
            .ephemeral(true),
    )
    .await?;
    Ok(())
}

pub async fn reply_embed(
    ctx: Context<'_>,
    embed: poise::serenity_prelude::CreateEmbed,
    ephemeral: bool,
) -> Result<(), Error> {
    ctx.send(
        poise::CreateReply::default()
            .embed(embed)
            .ephemeral(ephemeral),
    )
    .await?;
    Ok(())
}

/// Text for a failed Discord call, with the usual permission hint.
pub fn describe_discord_error(err: &poise::serenity_prelude::Error) -> String {
    use poise::serenity_prelude as serenity;
    match err {
        serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(resp))
            if resp.status_code.as_u16() == 403 =>
        {
            "Saya tidak memiliki izin untuk melakukan tindakan tersebut.".to_string()
        }
        serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(resp))
            if resp.status_code.as_u16() == 404 =>
        {
            "Target tidak ditemukan.".to_string()
        }
        other => format!("Terjadi kesalahan Discord: {}", other),
    }
}

/// Pick an embed colour for `hex`, falling back to `default`.
pub fn colour(hex: Option<u32>, default: u32) -> poise::serenity_prelude::Colour {
    poise::serenity_prelude::Colour::new(hex.unwrap_or(default))
}

/// Display name from the guild cache, falling back to the raw id.
pub fn cached_member_name(ctx: &Context<'_>, user_id: u64) -> String {
    ctx.guild()
        .and_then(|guild| {
            guild
                .members
                .get(&poise::serenity_prelude::UserId::new(user_id))
                .map(|m| m.display_name().to_string())
        })
        .unwrap_or_else(|| format!("Pengguna {}", user_id))
}
