//! Demo web server for the Telegram phone login flow.
//!
//! Serves a phone-entry page and a small JSON API over `telegram-auth`.

pub mod config;
pub mod server;

pub use config::Config;
