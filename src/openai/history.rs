use std::fmt;

/// Who authored a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        f.write_str(name)
    }
}

/// One role-tagged message sent to the generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// The main game conversation.
///
/// Invariant: the first message is the system rules message and it is never removed.
/// Messages are only ever appended (push order == send order).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    /// Start a conversation with the fixed system message.
    pub fn new<S: Into<String>>(system: S) -> Self {
        Self { messages: vec![ChatMessage::system(system)] }
    }

    /// Current length, system message included.
    pub fn len(&self) -> usize { self.messages.len() }

    /// Always false: the system message is always present.
    pub fn is_empty(&self) -> bool { self.messages.is_empty() }

    /// Slice view for passing into a generation call.
    pub fn as_slice(&self) -> &[ChatMessage] { &self.messages }

    /// The rules message the conversation was created with.
    pub fn system(&self) -> &ChatMessage { &self.messages[0] }

    pub fn last(&self) -> Option<&ChatMessage> { self.messages.last() }

    /// Add user message.
    pub fn add_user<S: Into<String>>(&mut self, content: S) -> &mut Self {
        self.messages.push(ChatMessage::user(content));
        self
    }

    /// Add assistant message.
    pub fn add_assistant<S: Into<String>>(&mut self, content: S) -> &mut Self {
        self.messages.push(ChatMessage::assistant(content));
        self
    }
}
