use crate::canvas::payload::Canvas;
use std::fmt;

pub mod history;
pub mod safety;
pub mod send;
pub mod store;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: MessageId,
    /// Display text, kept exactly as typed or received.
    pub text: String,
    pub origin: Origin,
    pub canvas: Canvas,
    pub is_pending: bool,
    pub is_historical: bool,
}

impl Message {
    pub fn has_canvas(&self) -> bool {
        self.canvas.has_content()
    }

    pub fn is_assistant_with_canvas(&self) -> bool {
        self.origin == Origin::Assistant && self.has_canvas()
    }

    pub fn display_text(&self) -> &str {
        if self.is_pending {
            "Thinking..."
        } else {
            self.text.as_str()
        }
    }
}

/// A message before the store has given it an identity.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub text: String,
    pub origin: Origin,
    pub canvas: Canvas,
    pub is_historical: bool,
}

impl NewMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::User,
            canvas: Canvas::none(),
            is_historical: false,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            origin: Origin::Assistant,
            canvas: Canvas::none(),
            is_historical: false,
        }
    }

    pub fn with_canvas(mut self, canvas: Canvas) -> Self {
        self.canvas = canvas;
        self
    }

    pub fn historical(mut self) -> Self {
        self.is_historical = true;
        self
    }
}
