use crate::chat::{Message, MessageId, NewMessage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct StoreVersion(u64);

/// Ordered conversation turns. At most one pending placeholder exists and it
/// is always the last entry.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
    next_id: u64,
    version: u64,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn version(&self) -> StoreVersion {
        StoreVersion(self.version)
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    #[cfg(test)]
    pub fn position(&self, id: MessageId) -> Option<usize> {
        self.messages.iter().position(|message| message.id == id)
    }

    pub fn pending(&self) -> Option<&Message> {
        self.messages.last().filter(|message| message.is_pending)
    }

    pub fn last_settled(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|message| !message.is_pending)
    }

    fn allocate(&mut self, draft: NewMessage, is_pending: bool) -> Message {
        let id = MessageId(self.next_id);
        self.next_id += 1;
        Message {
            id,
            text: draft.text,
            origin: draft.origin,
            canvas: draft.canvas,
            is_pending,
            is_historical: draft.is_historical,
        }
    }

    fn bump(&mut self) -> StoreVersion {
        self.version += 1;
        StoreVersion(self.version)
    }

    /// Adds a settled message. If a placeholder is waiting, the message goes in
    /// front of it so the placeholder stays last.
    pub fn append(&mut self, draft: NewMessage) -> StoreVersion {
        let message = self.allocate(draft, false);
        if self.pending().is_some() {
            let at = self.messages.len() - 1;
            self.messages.insert(at, message);
        } else {
            self.messages.push(message);
        }
        self.bump()
    }

    /// Pushes the empty assistant placeholder. Returns `None` when one is
    /// already outstanding.
    pub fn begin_pending(&mut self) -> Option<MessageId> {
        if self.pending().is_some() {
            return None;
        }
        let message = self.allocate(NewMessage::assistant(String::new()), true);
        let id = message.id;
        self.messages.push(message);
        self.bump();
        Some(id)
    }

    /// Swaps the trailing placeholder for the final message in place, keeping
    /// its id. A no-op when nothing is pending.
    pub fn replace_pending(&mut self, draft: NewMessage) -> Option<MessageId> {
        let slot = self.messages.last_mut().filter(|message| message.is_pending)?;
        slot.text = draft.text;
        slot.origin = draft.origin;
        slot.canvas = draft.canvas;
        slot.is_historical = draft.is_historical;
        slot.is_pending = false;
        let id = slot.id;
        self.bump();
        Some(id)
    }

    /// Replaces the whole list. Ids keep counting up, so an id taken from the
    /// previous list never resolves against the new one.
    pub fn reset(&mut self, initial: Vec<NewMessage>) -> StoreVersion {
        let messages = initial
            .into_iter()
            .map(|draft| self.allocate(draft, false))
            .collect();
        self.messages = messages;
        self.bump()
    }

    /// Puts earlier turns in front of the current ones. Existing ids are
    /// untouched.
    pub fn prepend(&mut self, earlier: Vec<NewMessage>) -> StoreVersion {
        let mut messages: Vec<Message> = earlier
            .into_iter()
            .map(|draft| self.allocate(draft, false))
            .collect();
        messages.append(&mut self.messages);
        self.messages = messages;
        self.bump()
    }
}
