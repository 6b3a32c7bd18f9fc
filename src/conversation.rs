use crate::backend::{BackendError, ChatReply, ChatRequest, ConversationRecord, HistoryRequest};
use crate::canvas::selection::{CanvasPhase, CanvasSelection, CommitTicket};
use crate::chat::history::flatten_history;
use crate::chat::safety::{is_sql_safe, sanitize_string};
use crate::chat::send::{SendPipeline, SendRejection, SendTicket};
use crate::chat::store::{MessageStore, StoreVersion};
use crate::chat::MessageId;
use crate::view::{OpeningPanel, ViewDispatcher, ViewKey, ViewPlan};

/// Network work the frame loop must start on the conversation's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    SendChat(ChatRequest),
    LoadHistory(HistoryRequest),
}

/// Owns the message store and canvas selection for one session. Every
/// mutation goes through here and runs on the UI thread; network results come
/// back stamped with the epoch they were issued under.
#[derive(Debug)]
pub struct Conversation {
    store: MessageStore,
    selection: CanvasSelection,
    send: SendPipeline,
    dispatcher: ViewDispatcher,
    active_view: ViewKey,
    epoch: u64,
    user_id: String,
    history_loading: bool,
    observed: StoreVersion,
}

impl Conversation {
    pub fn new(user_id: impl Into<String>) -> Self {
        let store = MessageStore::new();
        let observed = store.version();
        Self {
            store,
            selection: CanvasSelection::new(),
            send: SendPipeline::new(),
            dispatcher: ViewDispatcher::new(),
            active_view: ViewKey::Unset,
            epoch: 0,
            user_id: user_id.into(),
            history_loading: false,
            observed,
        }
    }

    pub fn store(&self) -> &MessageStore {
        &self.store
    }

    pub fn selection(&self) -> &CanvasSelection {
        &self.selection
    }

    pub fn active_view(&self) -> ViewKey {
        self.active_view
    }

    #[cfg(test)]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_loading_history(&self) -> bool {
        self.history_loading
    }

    pub fn can_send(&self) -> bool {
        !self.send.is_outstanding()
    }

    /// Applies a view request. Re-delivering the view already in place does
    /// nothing.
    pub fn apply_view(&mut self, view: ViewKey) -> Option<Effect> {
        let plan = self.dispatcher.dispatch(view)?;

        self.epoch += 1;
        self.active_view = view;
        self.send.reset();
        self.selection.reset();
        self.history_loading = false;

        match plan {
            ViewPlan::Seed { message, panel } => {
                self.store.reset(vec![message]);
                self.observed = self.store.version();
                if panel == OpeningPanel::Open {
                    if let Some(id) = self.store.last_settled().map(|message| message.id) {
                        self.selection.begin_commit(id);
                    }
                }
                None
            }
            ViewPlan::LoadHistory => {
                self.store.reset(Vec::new());
                self.observed = self.store.version();
                self.request_history()
            }
        }
    }

    fn request_history(&mut self) -> Option<Effect> {
        if self.user_id.is_empty() {
            tracing::info!("no user id configured, skipping history load");
            return None;
        }
        if !is_sql_safe(&self.user_id) {
            tracing::warn!("user id failed the input safety check, skipping history load");
            return None;
        }
        self.history_loading = true;
        Some(Effect::LoadHistory(HistoryRequest {
            epoch: self.epoch,
            user_id: sanitize_string(&self.user_id),
        }))
    }

    /// Merges a history response. Earlier turns go in front of anything the
    /// user already sent this session.
    pub fn apply_history(
        &mut self,
        epoch: u64,
        result: Result<Vec<ConversationRecord>, BackendError>,
    ) -> bool {
        if epoch != self.epoch {
            tracing::debug!(epoch, current = self.epoch, "dropping history for a previous view");
            return false;
        }
        self.history_loading = false;

        match result {
            Ok(records) => {
                let messages = flatten_history(records);
                tracing::info!(count = messages.len(), "conversation history loaded");
                if !messages.is_empty() {
                    self.store.prepend(messages);
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to load conversation history");
            }
        }
        self.sync_selection();
        true
    }

    pub fn submit(&mut self, text: &str) -> Result<Effect, SendRejection> {
        let result = self
            .send
            .submit(&mut self.store, text, &self.user_id, self.epoch)
            .map(Effect::SendChat);
        self.sync_selection();
        result
    }

    pub fn settle_chat(
        &mut self,
        ticket: SendTicket,
        result: Result<ChatReply, BackendError>,
    ) -> bool {
        if ticket.epoch != self.epoch {
            tracing::debug!(seq = ticket.seq, "dropping chat reply for a previous view");
            return false;
        }
        let applied = self.send.settle(&mut self.store, ticket, result);
        self.sync_selection();
        applied
    }

    pub fn select_message(&mut self, id: MessageId) -> Option<CommitTicket> {
        self.selection.select(&self.store, id)
    }

    pub fn toggle_canvas(&mut self) -> Option<CommitTicket> {
        self.selection.toggle()
    }

    pub fn clear_selected_message(&mut self) {
        self.selection.clear_selected();
    }

    pub fn pending_commit(&self) -> Option<CommitTicket> {
        self.selection.pending_commit()
    }

    pub fn acknowledge(&mut self, ticket: CommitTicket) -> bool {
        self.selection.acknowledge(&self.store, ticket)
    }

    /// Follows new assistant content into the canvas. Runs once per store
    /// version so settled state is not re-triggered.
    fn sync_selection(&mut self) {
        let version = self.store.version();
        if version == self.observed {
            return;
        }
        self.observed = version;

        let Some(last) = self.store.last_settled() else {
            return;
        };
        if !last.is_assistant_with_canvas() || self.selection.selected() == Some(last.id) {
            return;
        }

        let id = last.id;
        if self.active_view == ViewKey::Events && self.selection.phase() == CanvasPhase::Closed {
            self.selection.select_closed(id);
        } else {
            self.selection.begin_commit(id);
        }
    }
}
