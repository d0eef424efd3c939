//! Process-wide assistant state

use std::sync::atomic::{AtomicBool, Ordering};

use crate::conversation::ConversationLog;

/// Shared state owned for the lifetime of the process
///
/// Created once at startup and handed (behind an `Arc`) to the dialogue
/// coordinator, speech input and API server.
#[derive(Debug, Default)]
pub struct AssistantState {
    log: ConversationLog,
    listening: AtomicBool,
}

impl AssistantState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The conversation log
    #[must_use]
    pub const fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// Whether a microphone capture is in progress
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Acquire)
    }

    /// Mark a capture as in progress until the returned guard is dropped
    #[must_use]
    pub fn begin_listening(&self) -> ListeningGuard<'_> {
        self.listening.store(true, Ordering::Release);
        ListeningGuard { flag: &self.listening }
    }
}

/// Clears the listening flag on drop
#[derive(Debug)]
pub struct ListeningGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ListeningGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
