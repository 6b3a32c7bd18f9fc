//! Which message the canvas shows, and whether it is mounted.
//!
//! The panel moves through `Closed -> Committing(target) -> Open(target)`.
//! Entering `Committing` unmounts whatever was shown and hands out a
//! [`CommitTicket`]; the frame loop returns the ticket once it has painted a
//! frame with the panel empty, and only then does the target mount. Every new
//! sequence, close or reset advances `generation`, so a ticket from a
//! superseded sequence is refused instead of mounting the wrong message.

use crate::chat::store::MessageStore;
use crate::chat::MessageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasPhase {
    Closed,
    Committing(MessageId),
    Open(MessageId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitTicket {
    pub generation: u64,
    pub target: MessageId,
}

#[derive(Debug)]
pub struct CanvasSelection {
    phase: CanvasPhase,
    selected: Option<MessageId>,
    generation: u64,
}

impl Default for CanvasSelection {
    fn default() -> Self {
        Self {
            phase: CanvasPhase::Closed,
            selected: None,
            generation: 0,
        }
    }
}

impl CanvasSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> CanvasPhase {
        self.phase
    }

    pub fn selected(&self) -> Option<MessageId> {
        self.selected
    }

    #[cfg(test)]
    pub fn is_open(&self) -> bool {
        matches!(self.phase, CanvasPhase::Open(_))
    }

    /// The message the renderer may paint. `None` unless fully open.
    pub fn mounted(&self) -> Option<MessageId> {
        match self.phase {
            CanvasPhase::Open(target) => Some(target),
            _ => None,
        }
    }

    pub fn pending_commit(&self) -> Option<CommitTicket> {
        match self.phase {
            CanvasPhase::Committing(target) => Some(CommitTicket {
                generation: self.generation,
                target,
            }),
            _ => None,
        }
    }

    pub(crate) fn begin_commit(&mut self, target: MessageId) -> CommitTicket {
        self.generation += 1;
        self.selected = Some(target);
        self.phase = CanvasPhase::Committing(target);
        tracing::debug!(message_id = %target, generation = self.generation, "canvas commit started");
        CommitTicket {
            generation: self.generation,
            target,
        }
    }

    /// User picked a message. Messages without canvas content are ignored, as
    /// is re-picking the message that is already open.
    pub fn select(&mut self, store: &MessageStore, id: MessageId) -> Option<CommitTicket> {
        let Some(message) = store.get(id) else {
            tracing::debug!(message_id = %id, "ignoring selection of unknown message");
            return None;
        };
        if !message.has_canvas() {
            tracing::debug!(message_id = %id, "ignoring selection of message without canvas");
            return None;
        }
        if self.phase == CanvasPhase::Open(id) {
            return None;
        }
        Some(self.begin_commit(id))
    }

    /// Records a selection without mounting anything. Any commit in flight is
    /// superseded and the panel ends closed.
    pub fn select_closed(&mut self, id: MessageId) {
        self.generation += 1;
        self.selected = Some(id);
        self.phase = CanvasPhase::Closed;
    }

    /// Completes a commit once the empty panel has been painted.
    pub fn acknowledge(&mut self, store: &MessageStore, ticket: CommitTicket) -> bool {
        if ticket.generation != self.generation {
            tracing::debug!(
                message_id = %ticket.target,
                stale = ticket.generation,
                current = self.generation,
                "dropping superseded canvas commit"
            );
            return false;
        }
        if self.phase != CanvasPhase::Committing(ticket.target) {
            return false;
        }
        if !store.get(ticket.target).is_some_and(|message| message.has_canvas()) {
            tracing::warn!(message_id = %ticket.target, "commit target lost its canvas");
            self.close();
            return false;
        }
        self.phase = CanvasPhase::Open(ticket.target);
        true
    }

    /// Open closes and forgets the selection; closed reopens the current
    /// selection if there is one.
    pub fn toggle(&mut self) -> Option<CommitTicket> {
        match self.phase {
            CanvasPhase::Open(_) | CanvasPhase::Committing(_) => {
                self.close();
                None
            }
            CanvasPhase::Closed => {
                let target = self.selected?;
                Some(self.begin_commit(target))
            }
        }
    }

    /// Dismiss from inside the panel. An open panel has nothing left to show,
    /// so it ends up closed as well.
    pub fn clear_selected(&mut self) {
        self.close();
    }

    pub fn reset(&mut self) {
        self.close();
    }

    fn close(&mut self) {
        self.generation += 1;
        self.selected = None;
        self.phase = CanvasPhase::Closed;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::payload::{Canvas, CanvasKind};
    use crate::chat::NewMessage;
    use serde_json::json;

    fn store_with_canvases() -> (MessageStore, MessageId, MessageId, MessageId) {
        let mut store = MessageStore::new();
        store.append(NewMessage::assistant("jobs").with_canvas(Canvas::new(
            CanvasKind::JobSearch,
            Some(json!({ "job_link": "https://jobs.test" })),
        )));
        store.append(NewMessage::assistant("plan").with_canvas(Canvas::new(
            CanvasKind::Roadmap,
            Some(json!({ "roadmap": [] })),
        )));
        store.append(NewMessage::user("thanks"));
        let ids: Vec<MessageId> = store.messages().iter().map(|message| message.id).collect();
        (store, ids[0], ids[1], ids[2])
    }

    fn settle(selection: &mut CanvasSelection, store: &MessageStore) {
        while let Some(ticket) = selection.pending_commit() {
            selection.acknowledge(store, ticket);
        }
    }

    fn assert_invariant(selection: &CanvasSelection, store: &MessageStore) {
        if let Some(target) = selection.mounted() {
            assert_eq!(selection.selected(), Some(target));
            assert!(store.get(target).is_some_and(|message| message.has_canvas()));
        }
    }

    #[test]
    fn select_commits_then_opens_after_ack() {
        let (store, jobs, _, _) = store_with_canvases();
        let mut selection = CanvasSelection::new();

        let ticket = selection.select(&store, jobs).expect("jobs should be selectable");
        assert_eq!(selection.phase(), CanvasPhase::Committing(jobs));
        assert!(selection.mounted().is_none());

        assert!(selection.acknowledge(&store, ticket));
        assert_eq!(selection.phase(), CanvasPhase::Open(jobs));
        assert_invariant(&selection, &store);
    }

    #[test]
    fn selecting_plain_message_is_ignored() {
        let (store, _, _, plain) = store_with_canvases();
        let mut selection = CanvasSelection::new();

        assert!(selection.select(&store, plain).is_none());
        assert_eq!(selection.phase(), CanvasPhase::Closed);
        assert!(selection.selected().is_none());
    }

    #[test]
    fn later_selection_supersedes_earlier_ticket() {
        let (store, jobs, plan, _) = store_with_canvases();
        let mut selection = CanvasSelection::new();

        let first = selection.select(&store, jobs).expect("jobs should be selectable");
        let second = selection.select(&store, plan).expect("plan should be selectable");

        assert!(!selection.acknowledge(&store, first));
        assert!(selection.mounted().is_none());
        assert!(selection.acknowledge(&store, second));
        assert_eq!(selection.mounted(), Some(plan));
    }

    #[test]
    fn reselecting_from_open_unmounts_first() {
        let (store, jobs, plan, _) = store_with_canvases();
        let mut selection = CanvasSelection::new();
        selection.select(&store, jobs);
        settle(&mut selection, &store);

        selection.select(&store, plan);

        assert!(selection.mounted().is_none());
        settle(&mut selection, &store);
        assert_eq!(selection.mounted(), Some(plan));
    }

    #[test]
    fn reset_invalidates_outstanding_ticket() {
        let (store, jobs, _, _) = store_with_canvases();
        let mut selection = CanvasSelection::new();
        let ticket = selection.select(&store, jobs).expect("jobs should be selectable");

        selection.reset();

        assert!(!selection.acknowledge(&store, ticket));
        assert_eq!(selection.phase(), CanvasPhase::Closed);
        assert!(selection.selected().is_none());
    }

    #[test]
    fn toggle_closes_and_clears_selection() {
        let (store, jobs, _, _) = store_with_canvases();
        let mut selection = CanvasSelection::new();
        selection.select(&store, jobs);
        settle(&mut selection, &store);

        assert!(selection.toggle().is_none());
        assert!(!selection.is_open());
        assert!(selection.selected().is_none());
        assert!(selection.toggle().is_none());
        assert!(!selection.is_open());
    }

    #[test]
    fn toggle_reopens_closed_selection() {
        let (store, jobs, _, _) = store_with_canvases();
        let mut selection = CanvasSelection::new();
        selection.select_closed(jobs);

        let ticket = selection.toggle().expect("closed selection should reopen");
        assert!(selection.acknowledge(&store, ticket));
        assert_eq!(selection.mounted(), Some(jobs));
    }

    #[test]
    fn clear_selected_leaves_nothing_mounted() {
        let (store, jobs, _, _) = store_with_canvases();
        let mut selection = CanvasSelection::new();
        selection.select(&store, jobs);
        settle(&mut selection, &store);

        selection.clear_selected();

        assert!(selection.selected().is_none());
        assert!(selection.mounted().is_none());
    }

    #[test]
    fn acknowledging_target_removed_by_reset_closes() {
        let (mut store, jobs, _, _) = store_with_canvases();
        let mut selection = CanvasSelection::new();
        let ticket = selection.select(&store, jobs).expect("jobs should be selectable");

        store.reset(Vec::new());

        assert!(!selection.acknowledge(&store, ticket));
        assert_eq!(selection.phase(), CanvasPhase::Closed);
    }

    #[test]
    fn any_selection_sequence_keeps_invariant() {
        let (store, jobs, plan, plain) = store_with_canvases();
        let sequences = [
            vec![jobs, plan, jobs],
            vec![plain, jobs],
            vec![plan, plain, plan, jobs],
            vec![jobs, jobs],
        ];

        for sequence in sequences {
            let mut selection = CanvasSelection::new();
            let mut tickets = Vec::new();
            for id in &sequence {
                if let Some(ticket) = selection.select(&store, *id) {
                    tickets.push(ticket);
                }
                assert_invariant(&selection, &store);
            }
            for ticket in tickets {
                selection.acknowledge(&store, ticket);
                assert_invariant(&selection, &store);
            }
            let expected = sequence
                .iter()
                .rev()
                .find(|id| **id != plain)
                .copied();
            assert_eq!(selection.mounted(), expected);
        }
    }
}
