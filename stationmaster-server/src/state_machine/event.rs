//! Events that trigger state transitions.
//!
//! Events represent things that happened: inbound chat messages or an
//! authorized admin operation fanned out to every session. They are inputs
//! to the pure transition function.

/// All events that can trigger state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    // =========================================================================
    // Player events (scoped to one chat)
    // =========================================================================
    /// The player opened a conversation with /start.
    ConversationStarted,

    /// A free-text message arrived: a team number while registering, a
    /// completion code while awaiting one.
    MessageReceived { text: String },

    // =========================================================================
    // Admin events (fanned out to every known session)
    // =========================================================================
    /// The administrator cut phase one short; park at the break.
    BreakForced,

    /// The administrator started phase two; move past the break.
    PhaseTwoResumed,

    /// The administrator reset the game to the first station.
    GameReset,
}

impl Event {
    /// Returns a summary of the event suitable for logging.
    ///
    /// Completion-code attempts are player input, so the text is logged but
    /// its length is capped to keep log lines bounded.
    pub fn log_summary(&self) -> String {
        match self {
            Event::ConversationStarted => "ConversationStarted".to_string(),
            Event::MessageReceived { text } => {
                let mut shown = text.as_str();
                if shown.len() > 64 {
                    let mut end = 64;
                    while !shown.is_char_boundary(end) {
                        end -= 1;
                    }
                    shown = &shown[..end];
                }
                format!("MessageReceived {{ text: {:?} }}", shown)
            }
            Event::BreakForced => "BreakForced".to_string(),
            Event::PhaseTwoResumed => "PhaseTwoResumed".to_string(),
            Event::GameReset => "GameReset".to_string(),
        }
    }
}
