//! Registering state transitions.
//!
//! The registration prompt is a validation loop: bad input re-prompts in the
//! same state and is never an error. Once a valid team number arrives the
//! session enters station 0 - or, if phase two has already begun, the first
//! station past the break, so latecomers skip phase one entirely.

use stationmaster_core::{ContentError, ContentTables};

use super::{goto_station, TransitionResult, MAP_ASSET};
use crate::state_machine::effect::{Effect, LogLevel, Notice};
use crate::state_machine::event::Event;
use crate::state_machine::state::HuntMachineState;

/// Handle transitions from the Registering state.
pub fn handle(
    tables: &ContentTables,
    phase_two_started: bool,
    state: HuntMachineState,
    event: Event,
) -> Result<TransitionResult, ContentError> {
    match event {
        Event::ConversationStarted => Ok(TransitionResult::new(
            HuntMachineState::Registering,
            vec![
                Effect::SendNotice {
                    notice: Notice::Welcome,
                },
                Effect::SendImage {
                    asset: MAP_ASSET.to_string(),
                },
                Effect::SendNotice {
                    notice: Notice::PromptTeamNumber,
                },
            ],
        )),

        Event::MessageReceived { text } => match tables.parse_team_number(&text) {
            // Keep asking until a valid team number arrives.
            None => Ok(TransitionResult::new(
                state,
                vec![Effect::SendNotice {
                    notice: Notice::InvalidTeamNumber {
                        team_count: tables.team_count(),
                    },
                }],
            )),
            Some(team) => {
                let entry_index = if phase_two_started {
                    tables.post_break_index(team)?
                } else {
                    0
                };
                Ok(goto_station(tables, team, entry_index)?
                    .with_leading_notice(Notice::TeamConfirmed { team }))
            }
        },

        // Broadcasts skip chats that have not registered a team yet.
        Event::BreakForced | Event::PhaseTwoResumed | Event::GameReset => {
            Ok(TransitionResult::new(
                state,
                vec![Effect::Log {
                    level: LogLevel::Info,
                    message: "Skipping broadcast for session with no registered team".to_string(),
                }],
            ))
        }
    }
}
