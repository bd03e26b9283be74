// Moderation: warnings, automod rules and flood detection.

pub mod anti_spam_service;
pub mod automod_service;
pub mod moderation_models;
pub mod moderation_service;

pub use anti_spam_service::*;
pub use automod_service::*;
pub use moderation_models::*;
pub use moderation_service::*;
