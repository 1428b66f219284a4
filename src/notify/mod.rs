//! Periodic status message on a Discord-style webhook.
//!
//! One message is created on first contact and edited in place afterwards, so
//! repeated deliveries of the same update are harmless.

pub mod discord;
pub mod manager;
pub mod state;

pub use discord::{parse_webhook_url, DiscordWebhook, Embed, Field, Footer, Payload};
pub use manager::{Manager, NotifierConfig};
pub use state::{StateStore, StoredState};
