//! Chat surface: the command dispatcher and the polling loop that feeds it.
//!
//! The transport is abstracted behind [`ChatTransport`] so the loop can be
//! driven by Telegram in production and by a scripted fake in tests.

pub mod commands;
pub mod telegram;

use std::time::{Duration, Instant};

use thiserror::Error;

pub use commands::{Command, Dispatcher, Schedule};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http error: {0}")]
    Http(String),
    #[error("telegram api error {code}: {description}")]
    Api { code: i64, description: String },
    #[error("parse error: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingMessage {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub chat_id: i64,
    pub text: String,
    pub reply_to: Option<i64>,
    /// Reply keyboard, one button per entry.
    pub keyboard: Option<Vec<String>>,
}

impl OutgoingMessage {
    pub fn text(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            reply_to: None,
            keyboard: None,
        }
    }
}

pub trait ChatTransport {
    /// Next batch of incoming messages; `None` once the transport is closed.
    fn poll(&mut self) -> Result<Option<Vec<IncomingMessage>>, TransportError>;
    fn send(&self, message: &OutgoingMessage) -> Result<(), TransportError>;
}

/// Answers commands until the transport closes or polling fails.
///
/// With `refresh_every` set, `rebuild` replaces the snapshot between polls
/// once the interval has elapsed.
pub fn serve<T, F>(
    transport: &mut T,
    dispatcher: &mut Dispatcher,
    refresh_every: Option<Duration>,
    mut rebuild: F,
) -> Result<(), TransportError>
where
    T: ChatTransport + ?Sized,
    F: FnMut() -> Schedule,
{
    let mut refreshed_at = Instant::now();
    loop {
        if let Some(interval) = refresh_every {
            if refreshed_at.elapsed() >= interval {
                tracing::info!("refreshing week schedule");
                dispatcher.replace_schedule(rebuild());
                refreshed_at = Instant::now();
            }
        }

        let Some(batch) = transport.poll()? else {
            tracing::info!("chat transport closed");
            return Ok(());
        };

        for incoming in &batch {
            let reply = dispatcher.handle(incoming);
            if let Err(err) = transport.send(&reply) {
                tracing::warn!(chat_id = incoming.chat_id, error = %err, "failed to send reply");
            }
        }
    }
}
