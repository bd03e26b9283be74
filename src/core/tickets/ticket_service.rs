// Support tickets: one private channel per open ticket.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketStatus {
    Open,
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Closed => "closed",
        }
    }

    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("open") {
            TicketStatus::Open
        } else {
            TicketStatus::Closed
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ticket {
    pub id: i64,
    pub guild_id: u64,
    pub user_id: u64,
    pub channel_id: u64,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum TicketError {
    #[error("Anda sudah memiliki tiket terbuka di <#{0}>.")]
    AlreadyOpen(u64),

    #[error("Channel ini bukan tiket yang terbuka.")]
    NotATicket,

    #[error("Storage error: {0}")]
    StorageError(String),
}

#[async_trait]
pub trait TicketStore: Send + Sync {
    async fn insert(
        &self,
        guild_id: u64,
        user_id: u64,
        channel_id: u64,
        created_at: DateTime<Utc>,
    ) -> Result<i64, TicketError>;

    /// Close an open ticket. Returns false if it was not open.
    async fn close(&self, ticket_id: i64, closed_at: DateTime<Utc>) -> Result<bool, TicketError>;

    async fn get_open_by_channel(&self, channel_id: u64) -> Result<Option<Ticket>, TicketError>;

    async fn find_open_for_user(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<Ticket>, TicketError>;
}

pub struct TicketService<S: TicketStore> {
    store: S,
}

impl<S: TicketStore> TicketService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Fails when the member already has an open ticket, so callers should
    /// check with `find_open_for_user` before creating a channel.
    pub async fn open(
        &self,
        guild_id: u64,
        user_id: u64,
        channel_id: u64,
    ) -> Result<i64, TicketError> {
        if let Some(existing) = self.store.find_open_for_user(guild_id, user_id).await? {
            return Err(TicketError::AlreadyOpen(existing.channel_id));
        }
        let id = self
            .store
            .insert(guild_id, user_id, channel_id, Utc::now())
            .await?;
        tracing::info!(guild_id, user_id, channel_id, ticket_id = id, "Ticket opened");
        Ok(id)
    }

    pub async fn close(&self, ticket_id: i64) -> Result<bool, TicketError> {
        self.store.close(ticket_id, Utc::now()).await
    }

    pub async fn get_open_by_channel(&self, channel_id: u64) -> Result<Option<Ticket>, TicketError> {
        self.store.get_open_by_channel(channel_id).await
    }

    pub async fn find_open_for_user(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<Ticket>, TicketError> {
        self.store.find_open_for_user(guild_id, user_id).await
    }
}

/// Channel name for a member's ticket: lowercase, Discord-safe characters only.
pub fn ticket_channel_name(username: &str) -> String {
    let slug: String = username
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    let slug = slug.trim_matches('-');
    let slug = if slug.is_empty() { "anggota" } else { slug };
    let mut name = format!("ticket-{}", slug);
    name.truncate(100);
    name
}
