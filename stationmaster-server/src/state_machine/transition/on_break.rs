//! OnBreak state transitions.
//!
//! The session is parked at the phase boundary. Player input is rejected
//! with a wait notice until the administrator resumes phase two; the global
//! phase flag is deliberately not consulted here, so the only way out of the
//! break is the explicit admin event.

use stationmaster_core::{ContentError, ContentTables};

use super::{goto_station, TransitionResult};
use crate::state_machine::effect::{Effect, LogLevel, Notice};
use crate::state_machine::event::Event;
use crate::state_machine::state::HuntMachineState;

/// Handle transitions from the OnBreak state.
pub fn handle(
    tables: &ContentTables,
    state: HuntMachineState,
    event: Event,
) -> Result<TransitionResult, ContentError> {
    match (&state, event) {
        (HuntMachineState::OnBreak { .. }, Event::MessageReceived { .. }) => {
            Ok(TransitionResult::new(
                state.clone(),
                vec![Effect::SendNotice {
                    notice: Notice::PleaseWait,
                }],
            ))
        }

        (
            HuntMachineState::OnBreak {
                team,
                station_index,
            },
            Event::PhaseTwoResumed,
        ) => Ok(goto_station(tables, *team, station_index + 1)?
            .with_leading_notice(Notice::PhaseTwoStarting)),

        // Already parked; re-announce so a repeated force-break is harmless.
        (
            HuntMachineState::OnBreak {
                team,
                station_index,
            },
            Event::BreakForced,
        ) => Ok(goto_station(tables, *team, *station_index)?
            .with_leading_notice(Notice::PartOneCutShort)),

        (HuntMachineState::OnBreak { team, .. }, Event::GameReset) => {
            Ok(goto_station(tables, *team, 0)?.with_leading_notice(Notice::GameReset))
        }

        (HuntMachineState::OnBreak { team, .. }, Event::ConversationStarted) => {
            Ok(TransitionResult::new(
                state.clone(),
                vec![Effect::Log {
                    level: LogLevel::Info,
                    message: format!("Ignoring /start for team {} during the break", team),
                }],
            ))
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
