use crate::backend::{BackendError, ChatPayload, ChatReply, ChatRequest};
use crate::chat::safety::{is_sql_safe, sanitize_string};
use crate::chat::store::MessageStore;
use crate::chat::NewMessage;
use std::fmt;

pub const UNSAFE_INPUT_WARNING: &str =
    "Your message contains characters that are not allowed. Please rephrase and try again.";
pub const SERVER_ERROR_REPLY: &str = "Error contacting server.";

/// Identifies one send. `epoch` is the conversation epoch at submit time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendTicket {
    pub epoch: u64,
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Validating,
    Rejected,
    Sending(SendTicket),
    Settled,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendRejection {
    Empty,
    Busy,
    Unsafe,
}

impl fmt::Display for SendRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "message is empty"),
            Self::Busy => write!(f, "a reply is still outstanding"),
            Self::Unsafe => write!(f, "message failed the input safety check"),
        }
    }
}

#[derive(Debug)]
pub struct SendPipeline {
    state: SendState,
    next_seq: u64,
}

impl Default for SendPipeline {
    fn default() -> Self {
        Self {
            state: SendState::Idle,
            next_seq: 0,
        }
    }
}

impl SendPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn state(&self) -> SendState {
        self.state
    }

    pub fn is_outstanding(&self) -> bool {
        matches!(self.state, SendState::Sending(_))
    }

    /// Validates and stages a send. On success the raw text and a pending
    /// placeholder are in the store and the returned request carries the
    /// sanitized copies.
    pub fn submit(
        &mut self,
        store: &mut MessageStore,
        text: &str,
        user_id: &str,
        epoch: u64,
    ) -> Result<ChatRequest, SendRejection> {
        if text.trim().is_empty() {
            return Err(SendRejection::Empty);
        }
        if self.is_outstanding() {
            return Err(SendRejection::Busy);
        }

        self.state = SendState::Validating;
        if !is_sql_safe(text) || !is_sql_safe(user_id) {
            tracing::warn!("outgoing message rejected by input safety check");
            store.append(NewMessage::assistant(UNSAFE_INPUT_WARNING));
            self.state = SendState::Rejected;
            return Err(SendRejection::Unsafe);
        }

        store.append(NewMessage::user(text));
        if store.begin_pending().is_none() {
            // Only reachable if something outside the pipeline left a placeholder.
            tracing::warn!("placeholder already present while idle");
        }

        let ticket = SendTicket {
            epoch,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.state = SendState::Sending(ticket);

        Ok(ChatRequest {
            ticket,
            payload: ChatPayload {
                message: sanitize_string(text),
                user_id: sanitize_string(user_id),
            },
        })
    }

    /// Merges a backend result. Returns false for a ticket that is no longer
    /// the outstanding one.
    pub fn settle(
        &mut self,
        store: &mut MessageStore,
        ticket: SendTicket,
        result: Result<ChatReply, BackendError>,
    ) -> bool {
        if self.state != SendState::Sending(ticket) {
            tracing::debug!(seq = ticket.seq, epoch = ticket.epoch, "dropping stale chat reply");
            return false;
        }

        match result {
            Ok(reply) => {
                let canvas = reply.canvas();
                store.replace_pending(NewMessage::assistant(reply.text).with_canvas(canvas));
                self.state = SendState::Settled;
            }
            Err(err) => {
                tracing::warn!(error = %err, "chat reply failed");
                store.replace_pending(NewMessage::assistant(SERVER_ERROR_REPLY));
                self.state = SendState::Failed;
            }
        }
        true
    }

    pub fn reset(&mut self) {
        self.state = SendState::Idle;
    }
}
