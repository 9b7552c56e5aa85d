//! Outbound notifications. Delivery problems are logged and swallowed; a
//! dead webhook must never sink an analysis run.

pub mod discord;

pub use discord::DiscordNotifier;
