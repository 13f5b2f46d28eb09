//! Minimal Slack Web API client: just enough to post a text message.

pub mod client;
pub mod error;

pub use client::{PostedMessage, SlackClient};
pub use error::NotifyError;
