//! 具体渠道实现

pub mod slack;
pub mod webhook;

pub use slack::{SlackChannel, SlackConfig};
pub use webhook::{WebhookChannel, WebhookConfig};
