//! Command parsing for slash commands in chat messages.

use std::fmt;

use crate::gateway::ChatId;

/// A parsed bot command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotCommand {
    /// Open (or reopen) a conversation.
    Start,
    /// Leave the hunt; the session is cleared.
    Cancel,
    /// Support contact plus the session's current position.
    Help,
    /// Re-send the route map.
    Map,
    /// Admin: cut phase one short and park everyone at the break.
    ForceBreak,
    /// Admin: start phase two for everyone.
    ResumePartTwo,
    /// Admin: reset every session to the first station.
    Reset,
    /// Admin: send arbitrary text to every known session.
    Broadcast { message: String },
}

impl fmt::Display for BotCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Cancel => write!(f, "cancel"),
            Self::Help => write!(f, "help"),
            Self::Map => write!(f, "map"),
            Self::ForceBreak => write!(f, "force_break"),
            Self::ResumePartTwo => write!(f, "resume"),
            Self::Reset => write!(f, "reset"),
            Self::Broadcast { .. } => write!(f, "broadcast"),
        }
    }
}

/// Result of parsing a message for commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseResult {
    /// Plain text, not a command: routed to the state machine.
    NotACommand,
    /// Starts with `/` but is not a command we know.
    UnrecognizedCommand { attempted: String },
    /// A valid command was found.
    Command(BotCommand),
}

/// Parse a message for a slash command.
///
/// Commands are a single `/name` token at the start of the (trimmed)
/// message; `/broadcast` takes the rest of the line as its payload.
/// Anything not starting with `/` is plain text for the state machine.
pub fn parse_message(text: &str) -> ParseResult {
    let trimmed = text.trim();
    if !trimmed.starts_with('/') {
        return ParseResult::NotACommand;
    }

    let (name, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (trimmed, ""),
    };

    match name {
        "/start" => ParseResult::Command(BotCommand::Start),
        "/cancel" => ParseResult::Command(BotCommand::Cancel),
        "/help" => ParseResult::Command(BotCommand::Help),
        "/map" => ParseResult::Command(BotCommand::Map),
        "/force_break" => ParseResult::Command(BotCommand::ForceBreak),
        "/resume" => ParseResult::Command(BotCommand::ResumePartTwo),
        "/reset" => ParseResult::Command(BotCommand::Reset),
        "/broadcast" => {
            if rest.is_empty() {
                // A broadcast with nothing to say is a mistake, not a no-op.
                ParseResult::UnrecognizedCommand {
                    attempted: name.to_string(),
                }
            } else {
                ParseResult::Command(BotCommand::Broadcast {
                    message: rest.to_string(),
                })
            }
        }
        _ => ParseResult::UnrecognizedCommand {
            attempted: name.to_string(),
        },
    }
}

/// An admin operation that has been verified to come from the administrator.
///
/// This type can only be constructed via [`try_authorize_admin_action`],
/// which requires the sending chat id to match the configured administrator
/// id. Admin operations take this type by value, so a missing authorization
/// check is a compile error, not a runtime oversight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizedAdminAction {
    ForceBreak,
    ResumePartTwo,
    Reset,
    Broadcast { message: String },
}

/// Try to extract an authorized admin action from a command.
///
/// Returns `Some` only if the command is an admin operation *and* the sender
/// is the configured administrator chat. There are no roles and no
/// multi-admin support: one identifier, compared for equality.
pub fn try_authorize_admin_action(
    command: &BotCommand,
    sender: ChatId,
    admin: ChatId,
) -> Option<AuthorizedAdminAction> {
    if sender != admin {
        return None;
    }

    match command {
        BotCommand::ForceBreak => Some(AuthorizedAdminAction::ForceBreak),
        BotCommand::ResumePartTwo => Some(AuthorizedAdminAction::ResumePartTwo),
        BotCommand::Reset => Some(AuthorizedAdminAction::Reset),
        BotCommand::Broadcast { message } => Some(AuthorizedAdminAction::Broadcast {
            message: message.clone(),
        }),
        _ => None,
    }
}
