//! The transient message shown in the bottom row.
//!
//! A message is visible for a fixed lifetime after it is set, then the
//! message bar goes blank until the next one. Time is passed in explicitly
//! so expiry is testable without sleeping.

use std::time::{Duration, Instant};

/// One status message and when it was set.
#[derive(Debug, Clone)]
pub struct StatusMessage {
    text: String,
    set_at: Instant,
    timeout: Duration,
}

impl StatusMessage {
    /// An empty message that never shows.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            text: String::new(),
            set_at: Instant::now(),
            timeout,
        }
    }

    /// Replace the message, stamped with `now`.
    pub fn set_at(&mut self, text: impl Into<String>, now: Instant) {
        self.text = text.into();
        self.set_at = now;
    }

    /// Replace the message, stamped with the current time.
    pub fn set(&mut self, text: impl Into<String>) {
        self.set_at(text, Instant::now());
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The text to draw at `now`, or `None` once the message has expired.
    #[must_use]
    pub fn visible_at(&self, now: Instant) -> Option<&str> {
        let fresh = now.saturating_duration_since(self.set_at) < self.timeout;
        (fresh && !self.text.is_empty()).then_some(self.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_message_is_blank() {
        let msg = StatusMessage::new(Duration::from_secs(5));
        assert_eq!(msg.visible_at(Instant::now()), None);
    }

    #[test]
    fn visible_until_timeout() {
        let mut msg = StatusMessage::new(Duration::from_secs(5));
        let t0 = Instant::now();
        msg.set_at("saved", t0);
        assert_eq!(msg.visible_at(t0), Some("saved"));
        assert_eq!(msg.visible_at(t0 + Duration::from_millis(4999)), Some("saved"));
        assert_eq!(msg.visible_at(t0 + Duration::from_secs(5)), None);
        assert_eq!(msg.text(), "saved");
    }

    #[test]
    fn setting_again_restarts_the_clock() {
        let mut msg = StatusMessage::new(Duration::from_secs(1));
        let t0 = Instant::now();
        msg.set_at("a", t0);
        msg.set_at("b", t0 + Duration::from_secs(2));
        assert_eq!(msg.visible_at(t0 + Duration::from_secs(2)), Some("b"));
    }
}
