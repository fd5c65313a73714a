use std::time::Duration;

use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{ChatTransport, IncomingMessage, OutgoingMessage, TransportError};

const API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    error_code: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Update {
    update_id: i64,
    #[serde(default)]
    message: Option<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    message_id: i64,
    chat: Chat,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Chat {
    id: i64,
}

/// Bot API client using `getUpdates` long polling.
pub struct TelegramBot {
    client: Client,
    token: String,
    offset: Option<i64>,
    poll_timeout: Duration,
    http_timeout: Duration,
}

impl TelegramBot {
    pub fn new(
        token: &str,
        http_timeout: Duration,
        poll_timeout: Duration,
    ) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(http_timeout)
            .build()
            .map_err(|err| TransportError::Http(err.to_string()))?;
        Ok(Self {
            client,
            token: token.trim().to_string(),
            offset: None,
            poll_timeout,
            http_timeout,
        })
    }

    fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<T, TransportError> {
        let url = format!("{API_BASE}/bot{}/{method}", self.token);
        // Errors are stripped of the URL, it embeds the bot token.
        let response = self
            .client
            .post(url)
            .timeout(timeout)
            .json(payload)
            .send()
            .map_err(|err| TransportError::Http(format!("{method}: {}", err.without_url())))?;
        let body = response
            .text()
            .map_err(|err| TransportError::Http(format!("{method}: {}", err.without_url())))?;
        decode_response(&body)
    }
}

impl ChatTransport for TelegramBot {
    fn poll(&mut self) -> Result<Option<Vec<IncomingMessage>>, TransportError> {
        let mut payload = json!({
            "timeout": self.poll_timeout.as_secs(),
            "allowed_updates": ["message"],
        });
        if let Some(offset) = self.offset {
            payload["offset"] = json!(offset);
        }

        // The request must outlive the server-side long-poll wait.
        let updates: Vec<Update> =
            self.call("getUpdates", &payload, self.poll_timeout + self.http_timeout)?;
        let (messages, next_offset) = collect_messages(updates);
        if next_offset.is_some() {
            self.offset = next_offset;
        }
        Ok(Some(messages))
    }

    fn send(&self, message: &OutgoingMessage) -> Result<(), TransportError> {
        if message.text.is_empty() {
            tracing::debug!(chat_id = message.chat_id, "skipping empty message");
            return Ok(());
        }
        let _: Value = self.call("sendMessage", &send_payload(message), self.http_timeout)?;
        Ok(())
    }
}

fn decode_response<T: DeserializeOwned>(body: &str) -> Result<T, TransportError> {
    let response: ApiResponse<T> =
        serde_json::from_str(body).map_err(|err| TransportError::Parse(err.to_string()))?;
    if !response.ok {
        return Err(TransportError::Api {
            code: response.error_code.unwrap_or_default(),
            description: response.description.unwrap_or_default(),
        });
    }
    response
        .result
        .ok_or_else(|| TransportError::Parse("result field missing".into()))
}

/// Text messages from `updates` and the offset acknowledging all of them.
fn collect_messages(updates: Vec<Update>) -> (Vec<IncomingMessage>, Option<i64>) {
    let next_offset = updates.iter().map(|update| update.update_id + 1).max();
    let messages = updates
        .into_iter()
        .filter_map(|update| update.message)
        .filter_map(|message| {
            let text = message.text?;
            Some(IncomingMessage {
                chat_id: message.chat.id,
                message_id: message.message_id,
                text,
            })
        })
        .collect();
    (messages, next_offset)
}

fn send_payload(message: &OutgoingMessage) -> Value {
    let mut payload = json!({
        "chat_id": message.chat_id,
        "text": message.text,
    });
    if let Some(reply_to) = message.reply_to {
        payload["reply_to_message_id"] = json!(reply_to);
    }
    if let Some(buttons) = &message.keyboard {
        let rows = buttons
            .iter()
            .map(|label| json!([{ "text": label }]))
            .collect::<Vec<_>>();
        payload["reply_markup"] = json!({
            "keyboard": rows,
            "resize_keyboard": true,
        });
    }
    payload
}
