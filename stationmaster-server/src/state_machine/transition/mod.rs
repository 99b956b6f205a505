//! Pure state transition function.
//!
//! The transition function is the core of the state machine. It takes the
//! content tables, the global phase flag, the current state and an event, and
//! returns the new state and a list of effects. It performs no I/O; the only
//! way it can fail is a content-table lookup going out of bounds, which is an
//! invariant violation surfaced as a loud error rather than a silent index.
//!
//! Each state has its own handler module with co-located tests:
//! - `registering`: team-number validation loop
//! - `awaiting_code`: code checking and advancement
//! - `on_break`: parked at the phase boundary
//! - `finished`: terminal state

mod awaiting_code;
mod finished;
mod on_break;
mod registering;

use stationmaster_core::{ContentError, ContentTables, Station, TeamNumber};

use super::effect::{Effect, Notice};
use super::event::Event;
use super::state::HuntMachineState;

/// Where teams assemble during the break (latitude, longitude).
pub const ASSEMBLY_POINT: (f64, f64) = (1.264494, 103.803222);

/// Image asset with the park map, sent on /start and /map.
pub const MAP_ASSET: &str = "ParkMap.jpg";

/// Result of a state transition.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionResult {
    /// The new state after the transition.
    pub state: HuntMachineState,
    /// Effects to execute.
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: HuntMachineState, effects: Vec<Effect>) -> Self {
        Self { state, effects }
    }

    pub fn no_change(state: HuntMachineState) -> Self {
        Self {
            state,
            effects: vec![],
        }
    }

    /// Prepend a notice ahead of the effects already queued.
    fn with_leading_notice(mut self, notice: Notice) -> Self {
        self.effects.insert(0, Effect::SendNotice { notice });
        self
    }
}

/// Pure state transition function.
///
/// `phase_two_started` is the process-wide phase flag; only registration
/// reads it (to fast-forward latecomers past the break).
pub fn transition(
    tables: &ContentTables,
    phase_two_started: bool,
    state: HuntMachineState,
    event: Event,
) -> Result<TransitionResult, ContentError> {
    match &state {
        HuntMachineState::Registering => {
            registering::handle(tables, phase_two_started, state, event)
        }
        HuntMachineState::AwaitingCode { .. } => awaiting_code::handle(tables, state, event),
        HuntMachineState::OnBreak { .. } => on_break::handle(tables, state, event),
        HuntMachineState::Finished { .. } => finished::handle(tables, state, event),
    }
}

/// Enter the station at `index` for `team`: the clue-dispatch policy.
///
/// - One past the last station: the session is finished (idempotent notice).
/// - The break sentinel: park the session and announce the assembly point.
/// - A photo clue: header plus image, then await the station's code.
/// - A text clue: the labeled clue text, then await the station's code.
pub(crate) fn goto_station(
    tables: &ContentTables,
    team: TeamNumber,
    index: usize,
) -> Result<TransitionResult, ContentError> {
    if index == tables.station_count(team)? {
        return Ok(TransitionResult::new(
            HuntMachineState::Finished { team },
            vec![Effect::SendNotice {
                notice: Notice::AllStationsComplete,
            }],
        ));
    }

    match tables.station(team, index)? {
        Station::Break => Ok(TransitionResult::new(
            HuntMachineState::OnBreak {
                team,
                station_index: index,
            },
            vec![
                Effect::SendNotice {
                    notice: Notice::BreakStarted,
                },
                Effect::SendLocation {
                    latitude: ASSEMBLY_POINT.0,
                    longitude: ASSEMBLY_POINT.1,
                },
            ],
        )),
        Station::PhotoClue { asset } => {
            let expected_code = tables.code(team, index)?.to_string();
            let station = tables.display_number(team, index)?;
            Ok(TransitionResult::new(
                HuntMachineState::AwaitingCode {
                    team,
                    station_index: index,
                    expected_code,
                },
                vec![
                    Effect::SendNotice {
                        notice: Notice::PhotoClueHeader { station },
                    },
                    Effect::SendImage {
                        asset: asset.clone(),
                    },
                ],
            ))
        }
        Station::Clue(body) => {
            let expected_code = tables.code(team, index)?.to_string();
            let station = tables.display_number(team, index)?;
            Ok(TransitionResult::new(
                HuntMachineState::AwaitingCode {
                    team,
                    station_index: index,
                    expected_code,
                },
                vec![Effect::SendNotice {
                    notice: Notice::Clue {
                        station,
                        body: body.clone(),
                    },
                }],
            ))
        }
    }
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use stationmaster_core::ContentTables;

    /// Three teams, eight slots each, break at index 5 (so phase one shows
    /// stations 1-5 and phase two shows 6-7). Team 1's third station is a
    /// photo clue.
    pub(crate) const CLUES: &str = "\
team|s1|s2|s3|s4|s5|s6|s7|s8
Team 1|Gate|Bridge|*photo*Clue3.jpeg|Well|Grove|BREAK|Lighthouse|Bench
Team 2|Kiosk|Postbox|Fountain|Fig tree|Pond|BREAK|Boat shed|Summit
Team 3|Arch|Mural|Steps|Jetty|Lawn|BREAK|Tunnel|Obelisk
";

    pub(crate) const CODES: &str = "\
team|s1|s2|s3|s4|s5|s6|s7|s8
Team 1|T1S0|T1S1|T1S2|T1S3|T1S4|BREAK|T1S6|T1S7
Team 2|T2S0|T2S1|T2S2|T2S3|T2S4|BREAK|T2S6|T2S7
Team 3|T3S0|T3S1|T3S2|T3S3|T3S4|BREAK|T3S6|T3S7
";

    pub(crate) fn tables() -> ContentTables {
        ContentTables::parse(CLUES, CODES).expect("fixture tables must parse")
    }
}

#[cfg(test)]
mod tests {
    use super::test_fixtures::tables;
    use super::*;
    use proptest::prelude::*;

    fn awaiting(team: u32, index: usize, code: &str) -> HuntMachineState {
        HuntMachineState::AwaitingCode {
            team: TeamNumber(team),
            station_index: index,
            expected_code: code.to_string(),
        }
    }

    #[test]
    fn test_fresh_registration_yields_station_zero_for_every_team() {
        let tables = tables();
        for team in tables.team_numbers() {
            let result = transition(
                &tables,
                false,
                HuntMachineState::Registering,
                Event::MessageReceived {
                    text: team.to_string(),
                },
            )
            .unwrap();

            assert_eq!(
                result.state,
                awaiting(team.0, 0, &format!("T{}S0", team.0)),
                "team {} should start at station 0",
                team
            );
            assert!(result.effects.iter().any(|e| matches!(
                e,
                Effect::SendNotice {
                    notice: Notice::TeamConfirmed { .. }
                }
            )));
        }
    }

    #[test]
    fn test_registration_after_phase_two_lands_past_break() {
        let tables = tables();
        let result = transition(
            &tables,
            true,
            HuntMachineState::Registering,
            Event::MessageReceived {
                text: "2".to_string(),
            },
        )
        .unwrap();

        // Break is at index 5; latecomers land at 6, skipping phase one.
        assert_eq!(result.state, awaiting(2, 6, "T2S6"));
        assert!(result.effects.iter().any(|e| matches!(
            e,
            Effect::SendNotice {
                notice: Notice::Clue { station: 6, .. }
            }
        )));
    }

    #[test]
    fn test_correct_code_advances_exactly_one_station() {
        let tables = tables();
        let result = transition(
            &tables,
            false,
            awaiting(2, 0, "T2S0"),
            Event::MessageReceived {
                text: "T2S0".to_string(),
            },
        )
        .unwrap();

        assert_eq!(result.state, awaiting(2, 1, "T2S1"));
        assert!(result.effects.iter().any(|e| matches!(
            e,
            Effect::SendNotice {
                notice: Notice::Clue { station: 2, .. }
            }
        )));
    }

    #[test]
    fn test_code_comparison_is_exact_and_untrimmed() {
        let tables = tables();
        for wrong in ["t2s0", " T2S0", "T2S0 ", "T2S1", ""] {
            let result = transition(
                &tables,
                false,
                awaiting(2, 0, "T2S0"),
                Event::MessageReceived {
                    text: wrong.to_string(),
                },
            )
            .unwrap();

            assert_eq!(
                result.state,
                awaiting(2, 0, "T2S0"),
                "input {:?} must not advance",
                wrong
            );
            assert!(result.effects.iter().any(|e| matches!(
                e,
                Effect::SendNotice {
                    notice: Notice::IncorrectCode
                }
            )));
        }
    }

    #[test]
    fn test_advancing_into_break_parks_the_session() {
        let tables = tables();
        let result = transition(
            &tables,
            false,
            awaiting(3, 4, "T3S4"),
            Event::MessageReceived {
                text: "T3S4".to_string(),
            },
        )
        .unwrap();

        assert_eq!(
            result.state,
            HuntMachineState::OnBreak {
                team: TeamNumber(3),
                station_index: 5,
            }
        );
        assert!(result.effects.iter().any(|e| matches!(
            e,
            Effect::SendNotice {
                notice: Notice::BreakStarted
            }
        )));
        assert!(result
            .effects
            .iter()
            .any(|e| matches!(e, Effect::SendLocation { .. })));
    }

    #[test]
    fn test_last_code_finishes_the_hunt() {
        let tables = tables();
        let result = transition(
            &tables,
            false,
            awaiting(1, 7, "T1S7"),
            Event::MessageReceived {
                text: "T1S7".to_string(),
            },
        )
        .unwrap();

        assert_eq!(
            result.state,
            HuntMachineState::Finished {
                team: TeamNumber(1)
            }
        );
        assert!(result.effects.iter().any(|e| matches!(
            e,
            Effect::SendNotice {
                notice: Notice::HuntComplete
            }
        )));
    }

    #[test]
    fn test_on_break_rejects_messages_until_resume() {
        let tables = tables();
        let parked = HuntMachineState::OnBreak {
            team: TeamNumber(1),
            station_index: 5,
        };

        let result = transition(
            &tables,
            false,
            parked.clone(),
            Event::MessageReceived {
                text: "T1S6".to_string(),
            },
        )
        .unwrap();
        assert_eq!(result.state, parked);
        assert!(result.effects.iter().any(|e| matches!(
            e,
            Effect::SendNotice {
                notice: Notice::PleaseWait
            }
        )));

        // Even with the global flag set, a message does not resume: only the
        // explicit admin event moves the session.
        let result = transition(
            &tables,
            true,
            parked.clone(),
            Event::MessageReceived {
                text: "T1S6".to_string(),
            },
        )
        .unwrap();
        assert_eq!(result.state, parked);
    }

    #[test]
    fn test_resume_moves_past_break_and_sends_next_clue() {
        let tables = tables();
        let result = transition(
            &tables,
            true,
            HuntMachineState::OnBreak {
                team: TeamNumber(1),
                station_index: 5,
            },
            Event::PhaseTwoResumed,
        )
        .unwrap();

        assert_eq!(result.state, awaiting(1, 6, "T1S6"));
        assert_eq!(
            result.effects[0],
            Effect::SendNotice {
                notice: Notice::PhaseTwoStarting
            }
        );
        // First phase-two station displays its raw index.
        assert!(result.effects.iter().any(|e| matches!(
            e,
            Effect::SendNotice {
                notice: Notice::Clue { station: 6, .. }
            }
        )));
    }

    #[test]
    fn test_display_numbers_across_the_break() {
        let tables = tables();

        // Station index 3 (before the break) displays as 4.
        let result = transition(
            &tables,
            false,
            awaiting(2, 2, "T2S2"),
            Event::MessageReceived {
                text: "T2S2".to_string(),
            },
        )
        .unwrap();
        assert!(result.effects.iter().any(|e| matches!(
            e,
            Effect::SendNotice {
                notice: Notice::Clue { station: 4, .. }
            }
        )));

        // Station index 7 (after the break) displays as 7.
        let result = transition(
            &tables,
            false,
            awaiting(2, 6, "T2S6"),
            Event::MessageReceived {
                text: "T2S6".to_string(),
            },
        )
        .unwrap();
        assert!(result.effects.iter().any(|e| matches!(
            e,
            Effect::SendNotice {
                notice: Notice::Clue { station: 7, .. }
            }
        )));
    }

    #[test]
    fn test_photo_station_sends_header_and_image() {
        let tables = tables();
        let result = transition(
            &tables,
            false,
            awaiting(1, 1, "T1S1"),
            Event::MessageReceived {
                text: "T1S1".to_string(),
            },
        )
        .unwrap();

        assert_eq!(result.state, awaiting(1, 2, "T1S2"));
        assert_eq!(
            result.effects,
            vec![
                Effect::SendNotice {
                    notice: Notice::PhotoClueHeader { station: 3 }
                },
                Effect::SendImage {
                    asset: "Clue3.jpeg".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_forced_break_parks_mid_hunt_session() {
        let tables = tables();
        let result = transition(&tables, false, awaiting(1, 1, "T1S1"), Event::BreakForced).unwrap();

        assert_eq!(
            result.state,
            HuntMachineState::OnBreak {
                team: TeamNumber(1),
                station_index: 5,
            }
        );
        assert_eq!(
            result.effects[0],
            Effect::SendNotice {
                notice: Notice::PartOneCutShort
            }
        );
    }

    #[test]
    fn test_reset_returns_to_first_station_from_anywhere() {
        let tables = tables();
        let states = [
            awaiting(1, 6, "T1S6"),
            HuntMachineState::OnBreak {
                team: TeamNumber(1),
                station_index: 5,
            },
            HuntMachineState::Finished {
                team: TeamNumber(1),
            },
        ];

        for state in states {
            let result = transition(&tables, false, state.clone(), Event::GameReset).unwrap();
            assert_eq!(
                result.state,
                awaiting(1, 0, "T1S0"),
                "reset from {:?} should land on station 0",
                state
            );
            assert_eq!(
                result.effects[0],
                Effect::SendNotice {
                    notice: Notice::GameReset
                }
            );
        }
    }

    #[test]
    fn test_admin_events_skip_unregistered_sessions() {
        let tables = tables();
        for event in [Event::BreakForced, Event::PhaseTwoResumed, Event::GameReset] {
            let result =
                transition(&tables, false, HuntMachineState::Registering, event).unwrap();
            assert_eq!(result.state, HuntMachineState::Registering);
            assert!(
                !result
                    .effects
                    .iter()
                    .any(|e| matches!(e, Effect::SendNotice { .. })),
                "unregistered sessions must not be messaged by broadcasts"
            );
        }
    }

    #[test]
    fn test_finished_session_notice_is_idempotent() {
        let tables = tables();
        let finished = HuntMachineState::Finished {
            team: TeamNumber(2),
        };

        for _ in 0..3 {
            let result = transition(
                &tables,
                true,
                finished.clone(),
                Event::MessageReceived {
                    text: "anything".to_string(),
                },
            )
            .unwrap();
            assert_eq!(result.state, finished);
            assert_eq!(
                result.effects,
                vec![Effect::SendNotice {
                    notice: Notice::AllStationsComplete
                }]
            );
        }
    }

    #[test]
    fn test_goto_station_past_end_is_invariant_violation() {
        let tables = tables();
        let err = goto_station(&tables, TeamNumber(1), 9).unwrap_err();
        assert!(matches!(err, ContentError::StationOutOfBounds { .. }));
    }

    proptest! {
        /// Property: no sequence of incorrect codes ever mutates the session.
        #[test]
        fn incorrect_codes_never_change_state(inputs in proptest::collection::vec(".*", 1..20)) {
            let tables = tables();
            let start = awaiting(1, 3, "T1S3");

            let mut state = start.clone();
            for input in inputs {
                if input == "T1S3" {
                    continue;
                }
                let result = transition(
                    &tables,
                    false,
                    state,
                    Event::MessageReceived { text: input },
                )
                .unwrap();
                state = result.state;
            }
            prop_assert_eq!(state, start);
        }

        /// Property: correct codes advance the station index by exactly one
        /// per submission until the hunt ends.
        #[test]
        fn correct_codes_advance_strictly(team_raw in 1u32..=3) {
            let tables = tables();
            let team = TeamNumber(team_raw);
            let mut state = goto_station(&tables, team, 0).unwrap().state;

            let mut previous = 0usize;
            loop {
                let code = match &state {
                    HuntMachineState::AwaitingCode { expected_code, station_index, .. } => {
                        prop_assert!(*station_index == previous || *station_index == previous + 1);
                        previous = *station_index;
                        expected_code.clone()
                    }
                    // The fixture break sits mid-table; skip past it the way
                    // the admin resume would.
                    HuntMachineState::OnBreak { station_index, .. } => {
                        let index = *station_index;
                        state = goto_station(&tables, team, index + 1).unwrap().state;
                        previous = index;
                        continue;
                    }
                    HuntMachineState::Finished { .. } => break,
                    HuntMachineState::Registering => unreachable!("hunt never returns to registration"),
                };
                let result = transition(
                    &tables,
                    false,
                    state,
                    Event::MessageReceived { text: code },
                )
                .unwrap();
                state = result.state;
            }
        }
    }
}
