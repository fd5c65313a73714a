use crate::models::{Event, WeekSchedule};

use super::{IncomingMessage, OutgoingMessage};

pub const GREETING: &str = "Hello! I am your bot. Press /events to see events.";
pub const NOT_UNDERSTOOD: &str = "Sorry, I didn't understand that command.";
pub const UNAVAILABLE: &str = "Events are unavailable right now. Please try again later.";
pub const EVENTS_BUTTON: &str = "/events";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Events,
    Unknown,
}

impl Command {
    /// Recognizes `/start` and `/events`, also in the `/cmd@botname` form and
    /// with trailing arguments.
    pub fn parse(text: &str) -> Self {
        let Some(token) = text.split_whitespace().next() else {
            return Self::Unknown;
        };
        let name = token.split('@').next().unwrap_or(token);
        match name {
            "/start" => Self::Start,
            "/events" => Self::Events,
            _ => Self::Unknown,
        }
    }
}

/// What `/events` serves: the week snapshot, or a marker that the last
/// fetch cycle failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schedule {
    Ready(WeekSchedule),
    Unavailable,
}

pub struct Dispatcher {
    schedule: Schedule,
}

impl Dispatcher {
    pub fn new(schedule: Schedule) -> Self {
        Self { schedule }
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn replace_schedule(&mut self, schedule: Schedule) {
        self.schedule = schedule;
    }

    pub fn handle(&self, incoming: &IncomingMessage) -> OutgoingMessage {
        let command = Command::parse(&incoming.text);
        tracing::debug!(chat_id = incoming.chat_id, ?command, "handling message");
        match command {
            Command::Start => OutgoingMessage {
                keyboard: Some(vec![EVENTS_BUTTON.to_string()]),
                ..OutgoingMessage::text(incoming.chat_id, GREETING)
            },
            Command::Events => {
                let text = match &self.schedule {
                    Schedule::Ready(week) => format_events(&week.events),
                    Schedule::Unavailable => UNAVAILABLE.to_string(),
                };
                OutgoingMessage::text(incoming.chat_id, text)
            }
            Command::Unknown => OutgoingMessage {
                reply_to: Some(incoming.message_id),
                ..OutgoingMessage::text(incoming.chat_id, NOT_UNDERSTOOD)
            },
        }
    }
}

/// `"<date> <name>\nLink: <url>\n\n"` per event; empty for no events.
pub fn format_events(events: &[Event]) -> String {
    events
        .iter()
        .map(|event| format!("{} {}\nLink: {}\n\n", event.date, event.name, event.url))
        .collect()
}
