use chrono::{DateTime, Utc};

/// Event groups that can be switched off individually per guild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogCategory {
    Messages,
    Members,
    Voice,
    Server,
    Reactions,
    Commands,
}

impl LogCategory {
    pub const ALL: [LogCategory; 6] = [
        LogCategory::Messages,
        LogCategory::Members,
        LogCategory::Voice,
        LogCategory::Server,
        LogCategory::Reactions,
        LogCategory::Commands,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogCategory::Messages => "messages",
            LogCategory::Members => "members",
            LogCategory::Voice => "voice",
            LogCategory::Server => "server",
            LogCategory::Reactions => "reactions",
            LogCategory::Commands => "commands",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LogCategory::Messages => "Pesan & Konten",
            LogCategory::Members => "Anggota",
            LogCategory::Voice => "Voice & Stage",
            LogCategory::Server => "Struktur Server",
            LogCategory::Reactions => "Reaksi",
            LogCategory::Commands => "Perintah",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(raw))
    }
}

/// Effective activity-log settings for one guild.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActivityLogConfig {
    pub guild_id: u64,
    pub enabled: bool,
    pub channel_id: Option<u64>,
    pub disabled_categories: Vec<String>,
}

impl ActivityLogConfig {
    pub fn allows(&self, category: LogCategory) -> bool {
        self.enabled
            && !self
                .disabled_categories
                .iter()
                .any(|c| c == category.as_str())
    }

    /// Target channel when `category` may be logged.
    pub fn target_for(&self, category: LogCategory) -> Option<u64> {
        if self.allows(category) {
            self.channel_id
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentInfo {
    pub filename: String,
    pub url: Option<String>,
}

/// Minimal snapshot of a message that we keep in-memory so
/// deletions/edits can be logged even if Serenity's cache
/// has already evicted the original message.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedMessage {
    pub message_id: u64,
    pub guild_id: u64,
    pub channel_id: u64,
    pub author_id: u64,
    pub author_name: String,
    pub content: String,
    pub attachments: Vec<AttachmentInfo>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum VoiceChange {
    Joined { channel_id: u64 },
    Left { channel_id: u64 },
    Moved { from: u64, to: u64 },
}

impl VoiceChange {
    pub fn between(old: Option<u64>, new: Option<u64>) -> Option<Self> {
        match (old, new) {
            (None, Some(channel_id)) => Some(VoiceChange::Joined { channel_id }),
            (Some(channel_id), None) => Some(VoiceChange::Left { channel_id }),
            (Some(from), Some(to)) if from != to => Some(VoiceChange::Moved { from, to }),
            _ => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            VoiceChange::Joined { channel_id } => format!("Join <#{}>", channel_id),
            VoiceChange::Left { channel_id } => format!("Leave <#{}>", channel_id),
            VoiceChange::Moved { from, to } => format!("Pindah <#{}> → <#{}>", from, to),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureAction {
    Created,
    Deleted,
}

impl StructureAction {
    pub fn label(&self) -> &'static str {
        match self {
            StructureAction::Created => "Dibuat",
            StructureAction::Deleted => "Dihapus",
        }
    }
}

/// User as shown in log embeds.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedUser {
    pub id: u64,
    pub name: String,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    MessageEdited {
        author: LoggedUser,
        channel_id: u64,
        before: String,
        after: String,
        jump_url: Option<String>,
    },
    MessageDeleted {
        author: Option<LoggedUser>,
        channel_id: u64,
        content: String,
        attachments: Vec<AttachmentInfo>,
    },
    MemberJoined {
        user: LoggedUser,
        account_created: DateTime<Utc>,
        is_bot: bool,
    },
    MemberLeft {
        user: LoggedUser,
        joined_at: Option<DateTime<Utc>>,
    },
    Voice {
        user: LoggedUser,
        change: VoiceChange,
    },
    Channel {
        action: StructureAction,
        channel_id: u64,
        name: String,
    },
    Role {
        action: StructureAction,
        role_id: u64,
        name: String,
    },
    Reaction {
        user_id: u64,
        channel_id: u64,
        emoji: String,
        added: bool,
        jump_url: String,
    },
    CommandUsed {
        user: LoggedUser,
        channel_id: u64,
        command: String,
        error: Option<String>,
    },
}

impl LogEvent {
    pub fn category(&self) -> LogCategory {
        match self {
            LogEvent::MessageEdited { .. } | LogEvent::MessageDeleted { .. } => {
                LogCategory::Messages
            }
            LogEvent::MemberJoined { .. } | LogEvent::MemberLeft { .. } => LogCategory::Members,
            LogEvent::Voice { .. } => LogCategory::Voice,
            LogEvent::Channel { .. } | LogEvent::Role { .. } => LogCategory::Server,
            LogEvent::Reaction { .. } => LogCategory::Reactions,
            LogEvent::CommandUsed { .. } => LogCategory::Commands,
        }
    }
}
