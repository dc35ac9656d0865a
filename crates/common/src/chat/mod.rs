//! Chat-with-paper stub
//!
//! The assistant greets the reader with the paper title and answers every
//! question with the same canned text after a short delay. There is no
//! model behind it.

use crate::errors::Result;
use crate::metrics;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

/// Reply sent for every user message
pub const CANNED_REPLY: &str = "I'm analyzing the paper and will provide a response shortly...";

/// Time the assistant "types" before replying
pub const DEFAULT_REPLY_DELAY: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub content: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            sender,
            timestamp: Utc::now(),
        }
    }
}

/// Opening message of every conversation
pub fn greeting(paper_title: &str) -> String {
    format!(
        "Hi! I'm your research assistant. Ask me anything about \"{}\"",
        paper_title
    )
}

/// One conversation about one paper
#[derive(Debug, Clone)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
    reply_delay: Duration,
    canned_reply: String,
}

impl ChatSession {
    pub fn new(paper_title: &str, reply_delay: Duration, canned_reply: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::new(Sender::Bot, greeting(paper_title))],
            reply_delay,
            canned_reply: canned_reply.into(),
        }
    }

    /// Continue a transcript held by the caller.
    ///
    /// An empty history is treated like a fresh session.
    pub fn resume(
        paper_title: &str,
        history: Vec<ChatMessage>,
        reply_delay: Duration,
        canned_reply: impl Into<String>,
    ) -> Self {
        if history.is_empty() {
            return Self::new(paper_title, reply_delay, canned_reply);
        }
        Self {
            messages: history,
            reply_delay,
            canned_reply: canned_reply.into(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn into_messages(self) -> Vec<ChatMessage> {
        self.messages
    }

    /// Post a user message and wait for the assistant's reply.
    ///
    /// Blank input is ignored and yields `None`.
    pub async fn send(&mut self, text: &str) -> Result<Option<ChatMessage>> {
        if text.trim().is_empty() {
            return Ok(None);
        }

        self.messages.push(ChatMessage::new(Sender::User, text));
        metrics::record_chat_message(Sender::User.as_str());

        tokio::time::sleep(self.reply_delay).await;

        let reply = ChatMessage::new(Sender::Bot, self.canned_reply.clone());
        self.messages.push(reply.clone());
        metrics::record_chat_message(Sender::Bot.as_str());
        tracing::debug!(messages = self.messages.len(), "Chat reply sent");

        Ok(Some(reply))
    }
}
