// Core moderation module - keyword scanning and monitored investment chat.

pub mod chat_models;
pub mod chat_service;
pub mod keyword_flagger;

pub use chat_models::*;
pub use chat_service::*;
