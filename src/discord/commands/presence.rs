// Bot presence: collects live statistics and rotates the configured activities.
//
// The rendering lives in core; this file only gathers numbers from the
// serenity cache and maps the result onto gateway types.

use crate::core::presence::{ActivityKind, PresenceSnapshot, PresenceStatus, RenderedPresence};
use crate::discord::Data;
use crate::infra::database;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use std::time::Duration;

const STREAM_URL: &str = "https://twitch.tv/discord";

/// Gather the statistics presence templates and `/botstats` draw from.
pub async fn collect_snapshot(
    ctx: &serenity::Context,
    data: &Data,
    commands_count: usize,
    latency: Option<Duration>,
) -> PresenceSnapshot {
    let (guild_count, member_count, human_count, bot_count) = {
        let guild_ids = ctx.cache.guilds();
        let mut members = 0u64;
        let mut humans = 0u64;
        let mut bots = 0u64;
        for guild_id in &guild_ids {
            if let Some(guild) = ctx.cache.guild(*guild_id) {
                members += guild.member_count;
                for member in guild.members.values() {
                    if member.user.bot {
                        bots += 1;
                    } else {
                        humans += 1;
                    }
                }
            }
        }
        (guild_ids.len(), members, humans, bots)
    };

    let pending_reminders = match data.reminders.all_pending().await {
        Ok(list) => list.len(),
        Err(e) => {
            tracing::warn!("Could not count reminders for presence: {}", e);
            0
        }
    };

    PresenceSnapshot {
        guild_count,
        member_count,
        human_count,
        bot_count,
        commands_count,
        latency_ms: latency.map(|d| d.as_secs_f64() * 1000.0).unwrap_or(0.0),
        shard_count: ctx.cache.shard_count(),
        scheduler_jobs: data.scheduler.job_count(),
        pending_reminders,
        owner_count: data.config.owner_ids.len(),
        uptime: data.started_at.elapsed(),
        database_connected: database::is_connected(&data.pool).await,
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

fn online_status(status: PresenceStatus) -> serenity::OnlineStatus {
    match status {
        PresenceStatus::Online => serenity::OnlineStatus::Online,
        PresenceStatus::Idle => serenity::OnlineStatus::Idle,
        PresenceStatus::DoNotDisturb => serenity::OnlineStatus::DoNotDisturb,
        PresenceStatus::Invisible => serenity::OnlineStatus::Invisible,
        PresenceStatus::Offline => serenity::OnlineStatus::Offline,
    }
}

fn activity_data(presence: &RenderedPresence) -> serenity::ActivityData {
    let text = presence.text.clone();
    match presence.kind {
        ActivityKind::Playing => serenity::ActivityData::playing(text),
        ActivityKind::Watching => serenity::ActivityData::watching(text),
        ActivityKind::Listening => serenity::ActivityData::listening(text),
        ActivityKind::Competing => serenity::ActivityData::competing(text),
        ActivityKind::Custom => serenity::ActivityData::custom(text),
        ActivityKind::Streaming => serenity::ActivityData::streaming(text.clone(), STREAM_URL)
            .unwrap_or_else(|_| serenity::ActivityData::playing(text)),
    }
}

pub(crate) async fn shard_latency(
    shard_manager: &serenity::ShardManager,
    shard_id: serenity::ShardId,
) -> Option<Duration> {
    let runners = shard_manager.runners.lock().await;
    runners.get(&shard_id).and_then(|runner| runner.latency)
}

/// Start the rotation task. With presence disabled (or no activities) only the
/// default status is applied.
pub fn start_rotation(
    ctx: &serenity::Context,
    data: &Data,
    shard_manager: Arc<serenity::ShardManager>,
    commands_count: usize,
) {
    let rotation = Arc::clone(&data.presence);
    if !data.config.presence.enabled || rotation.is_empty() {
        ctx.set_presence(None, online_status(rotation.status()));
        tracing::info!("Presence rotation disabled");
        return;
    }

    let interval = rotation.interval();
    let ctx = ctx.clone();
    let data = data.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let latency = shard_latency(&shard_manager, ctx.shard_id).await;
            let snapshot = collect_snapshot(&ctx, &data, commands_count, latency).await;
            if let Some(rendered) = rotation.next(&snapshot) {
                tracing::debug!(text = %rendered.text, "Rotating presence");
                ctx.set_presence(Some(activity_data(&rendered)), online_status(rendered.status));
            }
        }
    });
    tracing::info!(
        interval_secs = interval.as_secs(),
        "Presence rotation started"
    );
}
