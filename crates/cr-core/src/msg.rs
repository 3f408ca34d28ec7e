//! User-visible messaging.
//!
//! The engine never prints; it records messages on a channelled log that
//! the surrounding application drains and renders.

use serde::{Deserialize, Serialize};
use strum::Display;

/// Message category, used upstream for colouring and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum Channel {
    /// Ordinary gameplay text
    Plain,
    /// Status effect started/ended
    Duration,
    /// Urgent, needs player attention
    Danger,
    /// Non-urgent caution
    Warn,
    /// A malady wore off or a stat recovered
    Recovery,
    /// Audible events
    Sound,
    /// Debug diagnostics, hidden in release builds
    Diagnostics,
}

/// One recorded message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub channel: Channel,
    pub text: String,
}

/// Per-turn message accumulator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageLog {
    entries: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message on the given channel.
    pub fn msg(&mut self, channel: Channel, text: impl Into<String>) {
        self.entries.push(Message {
            channel,
            text: text.into(),
        });
    }

    /// Record a message on the plain channel.
    pub fn plain(&mut self, text: impl Into<String>) {
        self.msg(Channel::Plain, text);
    }

    pub fn entries(&self) -> &[Message] {
        &self.entries
    }

    /// Hand all accumulated messages to the caller.
    pub fn drain(&mut self) -> Vec<Message> {
        std::mem::take(&mut self.entries)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of recorded messages whose text contains `needle`.
    pub fn count_containing(&self, needle: &str) -> usize {
        self.entries
            .iter()
            .filter(|m| m.text.contains(needle))
            .count()
    }

    /// Whether any recorded message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.count_containing(needle) > 0
    }
}
