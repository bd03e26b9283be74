// Economy module - coins, timed rewards and the guild shop

pub(crate) mod economy_service;
mod shop_service;

pub use economy_service::{
    format_cooldown, format_number, CoinStore, CooldownKind, EconomyAccount, EconomyError,
    EconomyService,
};
pub use shop_service::{NewShopItem, ShopItem, ShopService, ShopStore};
