// Couple domain models.
//
// A couple record moves through a small state machine:
// pending -> active -> ended, or pending -> rejected. Everything else is
// refused with `InvalidTransition`.

use crate::core::economy::EconomyError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;

use super::couple_catalog::format_timedelta;

// ============================================================================
// STATE MACHINE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoupleStatus {
    Pending,
    Active,
    Rejected,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoupleAction {
    Accept,
    Reject,
    Breakup,
}

impl CoupleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoupleStatus::Pending => "pending",
            CoupleStatus::Active => "active",
            CoupleStatus::Rejected => "rejected",
            CoupleStatus::Ended => "ended",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "pending" => Some(CoupleStatus::Pending),
            "active" => Some(CoupleStatus::Active),
            "rejected" => Some(CoupleStatus::Rejected),
            "ended" => Some(CoupleStatus::Ended),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CoupleStatus::Pending => "Menunggu jawaban",
            CoupleStatus::Active => "Aktif",
            CoupleStatus::Rejected => "Ditolak",
            CoupleStatus::Ended => "Berakhir",
        }
    }

    /// Pending and active records count as "committed".
    pub fn is_open(&self) -> bool {
        matches!(self, CoupleStatus::Pending | CoupleStatus::Active)
    }

    pub fn transition(self, action: CoupleAction) -> Result<CoupleStatus, CoupleError> {
        match (self, action) {
            (CoupleStatus::Pending, CoupleAction::Accept) => Ok(CoupleStatus::Active),
            (CoupleStatus::Pending, CoupleAction::Reject) => Ok(CoupleStatus::Rejected),
            (CoupleStatus::Active, CoupleAction::Breakup) => Ok(CoupleStatus::Ended),
            (from, action) => Err(CoupleError::InvalidTransition { from, action }),
        }
    }
}

impl std::fmt::Display for CoupleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// RECORDS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct CoupleRecord {
    pub id: i64,
    pub guild_id: u64,
    /// The pair is stored sorted so (a, b) and (b, a) are the same couple.
    pub member_one_id: u64,
    pub member_two_id: u64,
    pub initiator_id: u64,
    pub pending_target_id: u64,
    pub status: CoupleStatus,
    pub proposal_message: Option<String>,
    pub anniversary: Option<NaiveDate>,
    pub love_points: i64,
    pub last_affection_one: Option<DateTime<Utc>>,
    pub last_affection_two: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub ended_by: Option<u64>,
}

impl CoupleRecord {
    pub fn is_member(&self, user_id: u64) -> bool {
        user_id == self.member_one_id || user_id == self.member_two_id
    }

    pub fn partner_id(&self, user_id: u64) -> Option<u64> {
        if user_id == self.member_one_id {
            Some(self.member_two_id)
        } else if user_id == self.member_two_id {
            Some(self.member_one_id)
        } else {
            None
        }
    }

    pub fn last_affection_for(&self, user_id: u64) -> Option<DateTime<Utc>> {
        if user_id == self.member_one_id {
            self.last_affection_one
        } else if user_id == self.member_two_id {
            self.last_affection_two
        } else {
            None
        }
    }
}

/// Sort a pair so the smaller id comes first.
pub fn sorted_pair(a: u64, b: u64) -> (u64, u64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Clone)]
pub struct NewProposal {
    pub guild_id: u64,
    pub initiator_id: u64,
    pub target_id: u64,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Shared profile of a couple.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CoupleProfile {
    pub couple_id: i64,
    pub title: Option<String>,
    pub theme_color: Option<String>,
    pub love_song: Option<String>,
    pub bio: Option<String>,
    pub current_mood: Option<String>,
    pub checkin_streak: u32,
    pub last_checkin_date: Option<NaiveDate>,
}

impl CoupleProfile {
    pub fn empty(couple_id: i64) -> Self {
        Self {
            couple_id,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub title: Option<String>,
    pub theme_color: Option<String>,
    pub love_song: Option<String>,
    pub bio: Option<String>,
    pub current_mood: Option<String>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.theme_color.is_none()
            && self.love_song.is_none()
            && self.bio.is_none()
            && self.current_mood.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoupleMemory {
    pub id: i64,
    pub couple_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_by: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoupleMilestone {
    pub couple_id: i64,
    pub milestone_key: String,
    pub achieved_at: DateTime<Utc>,
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum CoupleError {
    #[error("Kamu tidak bisa berpasangan dengan bot.")]
    TargetIsBot,

    #[error("Cinta diri itu penting, tapi pilihlah pasangan lain.")]
    SelfProposal,

    #[error("Pesan terlalu panjang (maksimal {0} karakter).")]
    MessageTooLong(usize),

    #[error("Kamu sudah memiliki pasangan atau lamaran yang belum selesai.")]
    AlreadyCommitted,

    #[error("<@{0}> sudah memiliki pasangan atau lamaran lain.")]
    TargetCommitted(u64),

    #[error("Tidak ada lamaran yang perlu kamu jawab saat ini.")]
    NoPendingProposal,

    #[error("Kamu belum memiliki pasangan aktif.")]
    NoActiveCouple,

    #[error("Status {from} tidak bisa diubah dengan aksi {action:?}.")]
    InvalidTransition {
        from: CoupleStatus,
        action: CoupleAction,
    },

    #[error("Kamu bisa mengirim love point lagi dalam {}.", format_timedelta(*.0))]
    OnCooldown(Duration),

    #[error("Kamu sudah check-in hari ini. Kembali lagi besok ya!")]
    AlreadyCheckedIn,

    #[error("Hadiah '{0}' tidak ditemukan.")]
    UnknownGift(String),

    #[error("{0}")]
    Economy(#[from] EconomyError),

    #[error("{field} terlalu panjang (maksimal {max} karakter).")]
    FieldTooLong { field: &'static str, max: usize },

    #[error("Warna tidak valid. Gunakan format hex seperti #FF6699.")]
    InvalidColor,

    #[error("Tidak ada perubahan yang diberikan.")]
    NoChanges,

    #[error("Format tanggal tidak valid. Gunakan YYYY-MM-DD.")]
    InvalidDate,

    #[error("Tanggal anniversary tidak boleh di masa depan.")]
    FutureDate,

    #[error("Album memori penuh. Hapus memori lama sebelum menambah yang baru.")]
    MemoryAlbumFull,

    #[error("Storage error: {0}")]
    StorageError(String),
}
