use serde::{Deserialize, Serialize};

/// A single message in a conversation transcript.
///
/// Every message records who produced it (`sender`, a participant name),
/// the text it carries, and an opaque JSON metadata blob that the router
/// never inspects. Messages are immutable once appended to a transcript;
/// ordering is carried by the transcript itself.
///
/// # Examples
///
/// ```
/// use colloquy::message::Message;
///
/// let msg = Message::new("coder", "```csharp\nConsole.WriteLine(42);\n```");
/// assert_eq!(msg.sender, "coder");
/// assert!(msg.is_from("coder"));
///
/// // System-level messages use the reserved sender name.
/// let note = Message::system("reply generation failed for 'coder': timeout");
/// assert!(note.is_from(Message::SYSTEM));
/// ```
///
/// # Serialization
///
/// Messages round-trip through serde; null metadata is omitted:
///
/// ```
/// use colloquy::message::Message;
///
/// let msg = Message::new("user", "hello");
/// let json = serde_json::to_string(&msg).unwrap();
/// let parsed: Message = serde_json::from_str(&json).unwrap();
/// assert_eq!(msg, parsed);
/// ```
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Message {
    /// Name of the participant that produced this message.
    pub sender: String,
    /// The text content of the message.
    pub content: String,
    /// Opaque metadata attached by the producer. Never interpreted by the
    /// router or the driver.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub metadata: serde_json::Value,
}

impl Message {
    /// Reserved sender name used by the driver for injected messages
    /// (e.g. a turn that failed after all retries).
    pub const SYSTEM: &'static str = "system";

    /// Creates a new message from the given sender.
    ///
    /// # Examples
    /// ```
    /// use colloquy::message::Message;
    ///
    /// let msg = Message::new("admin", "coder, write the program");
    /// assert_eq!(msg.sender, "admin");
    /// ```
    #[must_use]
    pub fn new(sender: &str, content: &str) -> Self {
        Self {
            sender: sender.to_string(),
            content: content.to_string(),
            metadata: serde_json::Value::Null,
        }
    }

    /// Creates a system-level message (driver-injected diagnostics).
    #[must_use]
    pub fn system(content: &str) -> Self {
        Self::new(Self::SYSTEM, content)
    }

    /// Attach metadata to this message.
    #[must_use]
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns true if this message was produced by the named participant.
    #[must_use]
    pub fn is_from(&self, sender: &str) -> bool {
        self.sender == sender
    }
}
