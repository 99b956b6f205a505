//! Finished state transitions.
//!
//! The terminal state. Player input gets the idempotent completion notice.
//! Admin broadcasts still apply to every registered session, so force-break,
//! resume and reset pull a finished team back into the hunt.

use stationmaster_core::{ContentError, ContentTables};

use super::{goto_station, TransitionResult};
use crate::state_machine::effect::{Effect, LogLevel, Notice};
use crate::state_machine::event::Event;
use crate::state_machine::state::HuntMachineState;

/// Handle transitions from the Finished state.
pub fn handle(
    tables: &ContentTables,
    state: HuntMachineState,
    event: Event,
) -> Result<TransitionResult, ContentError> {
    match (&state, event) {
        (
            HuntMachineState::Finished { .. },
            Event::MessageReceived { .. } | Event::ConversationStarted,
        ) => Ok(TransitionResult::new(
            state.clone(),
            vec![Effect::SendNotice {
                notice: Notice::AllStationsComplete,
            }],
        )),

        (HuntMachineState::Finished { team }, Event::BreakForced) => {
            let break_position = tables.break_position(*team)?;
            Ok(goto_station(tables, *team, break_position)?
                .with_leading_notice(Notice::PartOneCutShort))
        }

        (HuntMachineState::Finished { team }, Event::PhaseTwoResumed) => {
            let resume_index = tables.post_break_index(*team)?;
            Ok(goto_station(tables, *team, resume_index)?
                .with_leading_notice(Notice::PhaseTwoStarting))
        }

        (HuntMachineState::Finished { team }, Event::GameReset) => {
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
