//! Presence status
//!
//! The presence server only says hello and announces other players joining.
//! The transport lives in the host page; this tracks what the status badge
//! should show.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PresenceStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected,
    Error,
}

impl PresenceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PresenceStatus::Connecting => "Connecting...",
            PresenceStatus::Connected => "Connected to server",
            PresenceStatus::Disconnected => "Disconnected from server",
            PresenceStatus::Error => "Connection error",
        }
    }

    /// Badge background color
    pub fn color(&self) -> &'static str {
        match self {
            PresenceStatus::Connecting => "#F2CC8F",
            PresenceStatus::Connected => "#81B29A",
            PresenceStatus::Disconnected | PresenceStatus::Error => "#E07A5F",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Presence {
    status: PresenceStatus,
    last_message: Option<String>,
}

impl Presence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_connect(&mut self) {
        log::info!("Presence connected");
        self.status = PresenceStatus::Connected;
    }

    pub fn on_disconnect(&mut self) {
        log::info!("Presence disconnected");
        self.status = PresenceStatus::Disconnected;
    }

    /// The transport retries on its own; the badge just shows the error
    pub fn on_error(&mut self, reason: &str) {
        log::warn!("Presence connection error: {reason}");
        self.status = PresenceStatus::Error;
    }

    pub fn on_message(&mut self, message: &str) {
        log::info!("Server message: {message}");
        self.last_message = Some(message.to_owned());
    }

    pub fn status(&self) -> PresenceStatus {
        self.status
    }

    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_transitions() {
        let mut presence = Presence::new();
        assert_eq!(presence.status(), PresenceStatus::Connecting);
        presence.on_connect();
        assert_eq!(presence.status().label(), "Connected to server");
        presence.on_error("timeout");
        assert_eq!(presence.status(), PresenceStatus::Error);
        presence.on_connect();
        presence.on_disconnect();
        assert_eq!(presence.status(), PresenceStatus::Disconnected);
    }

    #[test]
    fn test_keeps_last_message() {
        let mut presence = Presence::new();
        assert_eq!(presence.last_message(), None);
        presence.on_message("Welcome!");
        presence.on_message("A new player has joined the arena!");
        assert_eq!(
            presence.last_message(),
            Some("A new player has joined the arena!")
        );
    }
}
