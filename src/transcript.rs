//! Append-only transcript storage with immutable snapshots.
//!
//! A [`Transcript`] has exactly one writer (the conversation driver) and many
//! readers (guard predicates, agents). Readers never see the live buffer;
//! they are handed a [`TranscriptSnapshot`], a cheap-to-clone immutable view
//! taken at a well-defined point between appends.

use std::sync::Arc;

use crate::message::Message;

/// The ordered message history of one conversation run.
///
/// Mutation is limited to [`append`](Self::append); messages are never
/// removed or reordered. The version counter increments on every append so
/// snapshots can be compared for staleness.
///
/// # Examples
///
/// ```
/// use colloquy::message::Message;
/// use colloquy::transcript::Transcript;
///
/// let mut transcript = Transcript::new();
/// transcript.append(Message::new("user", "please convert this procedure"));
/// transcript.append(Message::new("admin", "coder, write the program"));
///
/// let snapshot = transcript.snapshot();
/// assert_eq!(snapshot.len(), 2);
/// assert_eq!(snapshot.last_sender(), Some("admin"));
///
/// // Appending after the snapshot does not change the snapshot.
/// transcript.append(Message::new("coder", "on it"));
/// assert_eq!(snapshot.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
    version: u32,
}

impl Transcript {
    /// Creates an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an accepted message and bumps the version counter.
    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
        self.version = self.version.saturating_add(1);
    }

    /// Number of messages accepted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Current version; increments once per append.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Borrow the accepted messages in order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Consume the transcript, yielding the owned message sequence.
    #[must_use]
    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }

    /// Takes an immutable snapshot of the current contents.
    ///
    /// Guards and agents must only ever observe snapshots, never the live
    /// transcript, so that a step's routing decision is made against a
    /// consistent view.
    #[must_use]
    pub fn snapshot(&self) -> TranscriptSnapshot {
        TranscriptSnapshot {
            messages: Arc::from(self.messages.as_slice()),
            version: self.version,
        }
    }
}

/// Immutable view of a transcript at a specific point in time.
///
/// Snapshots are cheap to clone (the message sequence is shared) and safe to
/// hand to concurrent readers. All guard predicates receive the full
/// snapshot and re-derive whatever they need from it on every evaluation.
#[derive(Clone, Debug)]
pub struct TranscriptSnapshot {
    messages: Arc<[Message]>,
    version: u32,
}

impl TranscriptSnapshot {
    /// An empty snapshot, useful for the very first routing decision.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            messages: Arc::from(Vec::new().as_slice()),
            version: 0,
        }
    }

    /// All messages in transcript order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The most recent message, if any.
    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Sender name of the most recent message, if any.
    #[must_use]
    pub fn last_sender(&self) -> Option<&str> {
        self.messages.last().map(|m| m.sender.as_str())
    }

    /// Returns true if any message in the snapshot was sent by `name`.
    #[must_use]
    pub fn has_sender(&self, name: &str) -> bool {
        self.messages.iter().any(|m| m.is_from(name))
    }

    /// The most recent message sent by `name`, if any.
    #[must_use]
    pub fn last_from(&self, name: &str) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.is_from(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Version of the transcript at the time the snapshot was taken.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

impl<'a> IntoIterator for &'a TranscriptSnapshot {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}
