// Server coins: balances, daily and work rewards, transfers and gambling.
//
// Balances never go negative; every debit goes through `spend`.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use std::fmt;

// ============================================================================
// DOMAIN MODELS
// ============================================================================

/// A member's account in a specific guild.
#[derive(Debug, Clone, PartialEq)]
pub struct EconomyAccount {
    pub guild_id: u64,
    pub user_id: u64,
    pub balance: i64,
    pub last_daily: Option<DateTime<Utc>>,
    pub last_work: Option<DateTime<Utc>>,
}

impl EconomyAccount {
    pub fn empty(guild_id: u64, user_id: u64) -> Self {
        Self {
            guild_id,
            user_id,
            balance: 0,
            last_daily: None,
            last_work: None,
        }
    }
}

/// Which timed reward a cooldown belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownKind {
    Daily,
    Work,
}

/// Result of a daily claim.
#[derive(Debug, Clone)]
pub struct DailyClaimResult {
    pub coins_awarded: i64,
    pub new_balance: i64,
    pub next_claim_time: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct WorkResult {
    pub coins_awarded: i64,
    pub new_balance: i64,
    pub flavour: &'static str,
}

#[derive(Debug, Clone)]
pub struct TransferResult {
    pub amount: i64,
    pub sender_balance: i64,
    pub receiver_balance: i64,
}

#[derive(Debug, Clone)]
pub struct GambleResult {
    pub won: bool,
    pub amount: i64,
    pub new_balance: i64,
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum EconomyError {
    InsufficientFunds { required: i64, available: i64 },
    OnCooldown { remaining: Duration },
    InvalidAmount { min: i64, max: i64 },
    SelfTransfer,
    ItemNotFound(String),
    DuplicateItem(String),
    StoreError(String),
}

impl fmt::Display for EconomyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EconomyError::InsufficientFunds { .. } => write!(f, "Saldo Anda tidak mencukupi."),
            EconomyError::OnCooldown { remaining } => {
                write!(f, "Coba lagi dalam {}.", format_cooldown(*remaining))
            }
            EconomyError::InvalidAmount { min, max } => write!(
                f,
                "Jumlah harus di antara {} dan {}.",
                format_number(*min),
                format_number(*max)
            ),
            EconomyError::SelfTransfer => write!(f, "Tidak dapat transfer ke diri sendiri."),
            EconomyError::ItemNotFound(name) => write!(f, "Item '{}' tidak ditemukan.", name),
            EconomyError::DuplicateItem(name) => {
                write!(f, "Item dengan nama '{}' sudah ada.", name)
            }
            EconomyError::StoreError(msg) => write!(f, "Store error: {}", msg),
        }
    }
}

impl std::error::Error for EconomyError {}

// ============================================================================
// STORAGE TRAIT
// ============================================================================

/// Trait for persisting economy data.
///
/// Balance changes go through atomic store operations so concurrent commands
/// can never overdraw an account.
#[async_trait]
pub trait CoinStore: Send + Sync {
    /// Get a member's account, creating it with a zero balance if missing.
    async fn get_account(&self, guild_id: u64, user_id: u64)
        -> Result<EconomyAccount, EconomyError>;

    /// Add `delta` (may be negative), clamping at 0. Returns the new balance.
    async fn adjust_balance(
        &self,
        guild_id: u64,
        user_id: u64,
        delta: i64,
    ) -> Result<i64, EconomyError>;

    /// Debit `amount` only if the balance covers it. `None` means it didn't.
    async fn try_debit(
        &self,
        guild_id: u64,
        user_id: u64,
        amount: i64,
    ) -> Result<Option<i64>, EconomyError>;

    /// Stamp `now` for `kind` unless the last stamp is younger than `cooldown`.
    /// Returns the blocking timestamp when still on cooldown.
    async fn try_start_cooldown(
        &self,
        guild_id: u64,
        user_id: u64,
        kind: CooldownKind,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<Option<DateTime<Utc>>, EconomyError>;

    /// Move coins between two members atomically. `None` if the sender is short.
    async fn transfer(
        &self,
        guild_id: u64,
        from_user: u64,
        to_user: u64,
        amount: i64,
    ) -> Result<Option<(i64, i64)>, EconomyError>;

    /// Richest accounts first.
    async fn leaderboard(
        &self,
        guild_id: u64,
        limit: usize,
    ) -> Result<Vec<EconomyAccount>, EconomyError>;
}

// ============================================================================
// CONFIGURATION
// ============================================================================

pub const WORK_FLAVOURS: [&str; 3] = [
    "Anda membantu warga dan mendapat tip.",
    "Menyelesaikan proyek freelance.",
    "Menjual kerajinan tangan di pasar.",
];

#[derive(Debug, Clone)]
pub struct EconomyConfig {
    pub daily_cooldown: Duration,
    pub daily_min: i64,
    pub daily_max: i64,
    pub work_cooldown: Duration,
    pub work_min: i64,
    pub work_max: i64,
    pub transfer_min: i64,
    pub transfer_max: i64,
    pub gamble_min: i64,
    pub gamble_max: i64,
    /// A gamble roll must be strictly above this to win.
    pub gamble_win_threshold: f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            daily_cooldown: Duration::hours(20),
            daily_min: 150,
            daily_max: 400,
            work_cooldown: Duration::hours(1),
            work_min: 50,
            work_max: 150,
            transfer_min: 1,
            transfer_max: 1_000_000,
            gamble_min: 10,
            gamble_max: 200_000,
            gamble_win_threshold: 0.55,
        }
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct EconomyService<S: CoinStore> {
    store: S,
    config: EconomyConfig,
}

impl<S: CoinStore> EconomyService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            config: EconomyConfig::default(),
        }
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// Current balance; a missing account is created with 0.
    pub async fn balance(&self, guild_id: u64, user_id: u64) -> Result<i64, EconomyError> {
        Ok(self.store.get_account(guild_id, user_id).await?.balance)
    }

    /// Add or remove coins. The balance never drops below zero.
    pub async fn adjust(
        &self,
        guild_id: u64,
        user_id: u64,
        amount: i64,
    ) -> Result<i64, EconomyError> {
        self.store.adjust_balance(guild_id, user_id, amount).await
    }

    /// Debit coins for a purchase, refusing when the balance is short.
    pub async fn spend(
        &self,
        guild_id: u64,
        user_id: u64,
        amount: i64,
    ) -> Result<i64, EconomyError> {
        if amount < 0 {
            return Err(EconomyError::InvalidAmount {
                min: 0,
                max: i64::MAX,
            });
        }
        match self.store.try_debit(guild_id, user_id, amount).await? {
            Some(balance) => Ok(balance),
            None => Err(EconomyError::InsufficientFunds {
                required: amount,
                available: self.balance(guild_id, user_id).await?,
            }),
        }
    }

    async fn start_cooldown(
        &self,
        guild_id: u64,
        user_id: u64,
        kind: CooldownKind,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<(), EconomyError> {
        if let Some(last) = self
            .store
            .try_start_cooldown(guild_id, user_id, kind, now, cooldown)
            .await?
        {
            return Err(EconomyError::OnCooldown {
                remaining: (last + cooldown) - now,
            });
        }
        Ok(())
    }

    /// Claim the daily reward.
    pub async fn claim_daily(
        &self,
        guild_id: u64,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<DailyClaimResult, EconomyError> {
        let cooldown = self.config.daily_cooldown;
        self.start_cooldown(guild_id, user_id, CooldownKind::Daily, now, cooldown)
            .await?;

        let reward = rand::thread_rng().gen_range(self.config.daily_min..=self.config.daily_max);
        let new_balance = self.store.adjust_balance(guild_id, user_id, reward).await?;

        Ok(DailyClaimResult {
            coins_awarded: reward,
            new_balance,
            next_claim_time: now + cooldown,
        })
    }

    pub async fn work(
        &self,
        guild_id: u64,
        user_id: u64,
        now: DateTime<Utc>,
    ) -> Result<WorkResult, EconomyError> {
        let cooldown = self.config.work_cooldown;
        self.start_cooldown(guild_id, user_id, CooldownKind::Work, now, cooldown)
            .await?;

        let (reward, flavour) = {
            let mut rng = rand::thread_rng();
            let reward = rng.gen_range(self.config.work_min..=self.config.work_max);
            let flavour = WORK_FLAVOURS.choose(&mut rng).copied().unwrap_or(WORK_FLAVOURS[0]);
            (reward, flavour)
        };
        let new_balance = self.store.adjust_balance(guild_id, user_id, reward).await?;

        Ok(WorkResult {
            coins_awarded: reward,
            new_balance,
            flavour,
        })
    }

    pub async fn transfer(
        &self,
        guild_id: u64,
        from_user: u64,
        to_user: u64,
        amount: i64,
    ) -> Result<TransferResult, EconomyError> {
        if from_user == to_user {
            return Err(EconomyError::SelfTransfer);
        }
        if amount < self.config.transfer_min || amount > self.config.transfer_max {
            return Err(EconomyError::InvalidAmount {
                min: self.config.transfer_min,
                max: self.config.transfer_max,
            });
        }

        match self
            .store
            .transfer(guild_id, from_user, to_user, amount)
            .await?
        {
            Some((sender_balance, receiver_balance)) => Ok(TransferResult {
                amount,
                sender_balance,
                receiver_balance,
            }),
            None => Err(EconomyError::InsufficientFunds {
                required: amount,
                available: self.balance(guild_id, from_user).await?,
            }),
        }
    }

    /// Bet `amount` on a roll in `[0, 1)`. Above the threshold wins the
    /// amount, anything else loses it.
    pub async fn gamble(
        &self,
        guild_id: u64,
        user_id: u64,
        amount: i64,
        roll: f64,
    ) -> Result<GambleResult, EconomyError> {
        if amount < self.config.gamble_min || amount > self.config.gamble_max {
            return Err(EconomyError::InvalidAmount {
                min: self.config.gamble_min,
                max: self.config.gamble_max,
            });
        }

        let available = self.balance(guild_id, user_id).await?;
        if available < amount {
            return Err(EconomyError::InsufficientFunds {
                required: amount,
                available,
            });
        }

        let won = roll > self.config.gamble_win_threshold;
        let new_balance = if won {
            self.store.adjust_balance(guild_id, user_id, amount).await?
        } else {
            self.spend(guild_id, user_id, amount).await?
        };

        Ok(GambleResult {
            won,
            amount,
            new_balance,
        })
    }

    pub async fn leaderboard(
        &self,
        guild_id: u64,
        limit: usize,
    ) -> Result<Vec<EconomyAccount>, EconomyError> {
        self.store.leaderboard(guild_id, limit).await
    }
}

// ============================================================================
// FORMATTING
// ============================================================================

/// Group thousands with dots, Indonesian style: 1250000 -> "1.250.000".
pub fn format_number(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    if n < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// "X jam Y menit", or seconds for short waits.
pub fn format_cooldown(remaining: Duration) -> String {
    let total = remaining.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours == 0 && minutes == 0 {
        return format!("{} detik", total % 60);
    }
    format!("{} jam {} menit", hours, minutes)
}

// ============================================================================
// TESTS
// ============================================================================
