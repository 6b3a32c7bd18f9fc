use crate::backend::{BackendError, ChatReply, ConversationRecord};
use crate::chat::send::SendTicket;

/// Results handed back from the runtime to the UI thread.
#[derive(Debug)]
pub enum AppEvent {
    ChatSettled {
        ticket: SendTicket,
        result: Result<ChatReply, BackendError>,
    },
    HistoryLoaded {
        epoch: u64,
        result: Result<Vec<ConversationRecord>, BackendError>,
    },
}
