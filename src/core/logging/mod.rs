// Activity log - what happened in the guild, posted to a log channel.

mod logging_models;
mod logging_service;

pub use logging_models::*;
pub use logging_service::*;
