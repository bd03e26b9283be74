// Couples mini-game: proposals, love points, check-ins, gifts and memories.

pub mod couple_catalog;
mod couple_models;
mod couple_service;

pub use couple_catalog::{
    color_from_hex, compatibility_message, find_gift, format_duration_since, format_timedelta,
    random_date_idea, Gift, MilestoneDef, GIFTS,
};
pub use couple_models::*;
pub use couple_service::*;
