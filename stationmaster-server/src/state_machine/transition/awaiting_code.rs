//! AwaitingCode state transitions.
//!
//! The session has a clue in hand and is waiting for that station's
//! completion code. Codes are compared by exact, case-sensitive, untrimmed
//! string equality; retries are unlimited and free. Advancing is atomic:
//! either the code matched and both the station index and expected code move
//! together with the next clue sent, or nothing changes.

use stationmaster_core::{ContentError, ContentTables};

use super::{goto_station, TransitionResult};
use crate::state_machine::effect::{Effect, LogLevel, Notice};
use crate::state_machine::event::Event;
use crate::state_machine::state::HuntMachineState;

/// Handle transitions from the AwaitingCode state.
pub fn handle(
    tables: &ContentTables,
    state: HuntMachineState,
    event: Event,
) -> Result<TransitionResult, ContentError> {
    match (&state, event) {
        (
            HuntMachineState::AwaitingCode {
                team,
                station_index,
                expected_code,
            },
            Event::MessageReceived { text },
        ) => {
            if text != *expected_code {
                return Ok(TransitionResult::new(
                    state.clone(),
                    vec![Effect::SendNotice {
                        notice: Notice::IncorrectCode,
                    }],
                ));
            }

            if station_index + 1 == tables.station_count(*team)? {
                return Ok(TransitionResult::new(
                    HuntMachineState::Finished { team: *team },
                    vec![Effect::SendNotice {
                        notice: Notice::HuntComplete,
                    }],
                ));
            }

            goto_station(tables, *team, station_index + 1)
        }

        // /start does not restart a live session.
        (HuntMachineState::AwaitingCode { team, .. }, Event::ConversationStarted) => {
            Ok(TransitionResult::new(
                state.clone(),
                vec![Effect::Log {
                    level: LogLevel::Info,
                    message: format!("Ignoring /start for team {} mid-hunt", team),
                }],
            ))
        }

        (HuntMachineState::AwaitingCode { team, .. }, Event::BreakForced) => {
            let break_position = tables.break_position(*team)?;
            Ok(goto_station(tables, *team, break_position)?
                .with_leading_notice(Notice::PartOneCutShort))
        }

        (HuntMachineState::AwaitingCode { team, .. }, Event::PhaseTwoResumed) => {
            let resume_index = tables.post_break_index(*team)?;
            Ok(goto_station(tables, *team, resume_index)?
                .with_leading_notice(Notice::PhaseTwoStarting))
        }

        (HuntMachineState::AwaitingCode { team, .. }, Event::GameReset) => {
            Ok(goto_station(tables, *team, 0)?.with_leading_notice(Notice::GameReset))
        }

        (_, event) => Ok(TransitionResult::new(
            state.clone(),
            vec![Effect::Log {
                level: LogLevel::Warn,
                message: format!("Unhandled event {:?} in state {:?}", event, state),
            }],
        )),
    }
}
