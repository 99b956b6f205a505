//! End-to-end hunt flow driven through the HTTP update endpoint.
//!
//! These tests stand in for the real chat gateway: each inbound message is
//! POSTed to `/update` exactly as the gateway would, and outbound traffic is
//! captured by a recording messenger.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use stationmaster_core::ContentTables;
use stationmaster_server::gateway::SentMessage;
use stationmaster_server::webhook::{gateway_router, GATEWAY_SECRET_HEADER};
use stationmaster_server::{
    AppState, ChatId, HuntMachineState, Messenger, RecordingMessenger, TextFormat,
};

const SECRET: &str = "hunt-secret";
const ADMIN: i64 = 9000;
const TEAM_THREE_CHAT: i64 = 33;

const CLUES: &str = "\
team|s1|s2|s3|s4|s5|s6|s7|s8
Team 1|Gate|Bridge|*photo*Clue3.jpeg|Well|Grove|BREAK|Lighthouse|Bench
Team 2|Kiosk|Postbox|Fountain|Fig tree|Pond|BREAK|Boat shed|Summit
Team 3|Arch|Mural|Steps|Jetty|Lawn|BREAK|Tunnel|Obelisk
";

const CODES: &str = "\
team|s1|s2|s3|s4|s5|s6|s7|s8
Team 1|T1S0|T1S1|T1S2|T1S3|T1S4|BREAK|T1S6|T1S7
Team 2|T2S0|T2S1|T2S2|T2S3|T2S4|BREAK|T2S6|T2S7
Team 3|T3S0|T3S1|T3S2|T3S3|T3S4|BREAK|T3S6|T3S7
";

struct Harness {
    app: Arc<AppState>,
    recorder: Arc<RecordingMessenger>,
}

impl Harness {
    fn new() -> Self {
        let tables = ContentTables::parse(CLUES, CODES).expect("fixture tables must parse");
        let recorder = Arc::new(RecordingMessenger::new());
        let messenger: Arc<dyn Messenger> = recorder.clone();
        let app = Arc::new(AppState::new(
            Arc::new(tables),
            messenger,
            ChatId(ADMIN),
            SECRET.to_string(),
        ));
        Self { app, recorder }
    }

    async fn update(&self, chat: i64, text: &str) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri("/update")
            .header(CONTENT_TYPE, "application/json")
            .header(GATEWAY_SECRET_HEADER, SECRET)
            .body(Body::from(
                json!({ "chat_id": chat, "text": text }).to_string(),
            ))
            .expect("request must build");

        let response = gateway_router(self.app.clone())
            .oneshot(request)
            .await
            .expect("router must respond");
        response.status()
    }

    async fn state(&self, chat: i64) -> Option<HuntMachineState> {
        self.app.store.get(ChatId(chat)).await
    }

    fn station_index(&self, state: &Option<HuntMachineState>) -> Option<usize> {
        state.as_ref().and_then(|s| s.station_index())
    }

    /// Texts sent to one chat since the last clear, in order.
    fn texts_to(&self, chat: i64) -> Vec<String> {
        self.recorder
            .sent()
            .into_iter()
            .filter_map(|message| match message {
                SentMessage::Text { chat: c, text, .. } if c == ChatId(chat) => Some(text),
                _ => None,
            })
            .collect()
    }
}

#[tokio::test]
async fn test_full_hunt_scenario_for_team_three() {
    let harness = Harness::new();
    let chat = TEAM_THREE_CHAT;

    // Registration: /start then the team number.
    harness.update(chat, "/start").await;
    assert_eq!(harness.state(chat).await, Some(HuntMachineState::Registering));

    harness.update(chat, "3").await;
    let state = harness.state(chat).await;
    assert_eq!(harness.station_index(&state), Some(0));
    assert!(harness
        .texts_to(chat)
        .iter()
        .any(|t| t.contains("Clue for Station 1:") && t.contains("Arch")));

    // Correct code for station 0 advances to station 1.
    harness.recorder.clear();
    harness.update(chat, "T3S0").await;
    let state = harness.state(chat).await;
    assert_eq!(harness.station_index(&state), Some(1));
    assert!(harness
        .texts_to(chat)
        .iter()
        .any(|t| t.contains("Clue for Station 2:") && t.contains("Mural")));

    // Wrong code changes nothing, however often it is retried.
    harness.recorder.clear();
    harness.update(chat, "WRONG").await;
    harness.update(chat, "t3s1").await;
    let state = harness.state(chat).await;
    assert_eq!(harness.station_index(&state), Some(1));
    assert_eq!(
        harness
            .texts_to(chat)
            .iter()
            .filter(|t| t.contains("Incorrect completion code"))
            .count(),
        2
    );

    // Walk the rest of phase one up to the break.
    for code in ["T3S1", "T3S2", "T3S3", "T3S4"] {
        harness.update(chat, code).await;
    }
    assert_eq!(
        harness.state(chat).await,
        Some(HuntMachineState::OnBreak {
            team: stationmaster_core::TeamNumber(3),
            station_index: 5,
        })
    );
    assert!(harness
        .texts_to(chat)
        .iter()
        .any(|t| t.contains("Part one is over")));

    // Input during the break is rejected and changes nothing.
    harness.recorder.clear();
    harness.update(chat, "T3S6").await;
    assert!(matches!(
        harness.state(chat).await,
        Some(HuntMachineState::OnBreak { .. })
    ));
    assert!(harness
        .texts_to(chat)
        .iter()
        .any(|t| t.contains("Please wait")));

    // Admin resumes phase two: the session jumps past the break and the
    // global flag is set for future registrations.
    harness.recorder.clear();
    harness.update(ADMIN, "/resume").await;
    let state = harness.state(chat).await;
    assert_eq!(harness.station_index(&state), Some(6));
    assert!(harness.app.store.phase_two_started());
    // First phase-two station keeps the raw index as its display number.
    assert!(harness
        .texts_to(chat)
        .iter()
        .any(|t| t.contains("Clue for Station 6:") && t.contains("Tunnel")));

    // Finish the hunt.
    harness.recorder.clear();
    harness.update(chat, "T3S6").await;
    harness.update(chat, "T3S7").await;
    assert_eq!(
        harness.state(chat).await,
        Some(HuntMachineState::Finished {
            team: stationmaster_core::TeamNumber(3),
        })
    );
    assert!(harness
        .texts_to(chat)
        .iter()
        .any(|t| t.contains("Congratulations")));

    // Further messages just repeat the completion notice.
    harness.recorder.clear();
    harness.update(chat, "hello?").await;
    assert!(harness
        .texts_to(chat)
        .iter()
        .any(|t| t.contains("completed all the stations")));
}

#[tokio::test]
async fn test_latecomer_after_resume_starts_in_phase_two() {
    let harness = Harness::new();

    harness.update(ADMIN, "/resume").await;

    harness.update(55, "/start").await;
    harness.update(55, "2").await;

    let state = harness.state(55).await;
    assert_eq!(harness.station_index(&state), Some(6));
    assert!(harness
        .texts_to(55)
        .iter()
        .any(|t| t.contains("Clue for Station 6:") && t.contains("Boat shed")));
}

#[tokio::test]
async fn test_player_cannot_run_admin_operations() {
    let harness = Harness::new();
    harness.update(1, "/start").await;
    harness.update(1, "1").await;
    harness.update(2, "/start").await;
    harness.update(2, "2").await;
    harness.recorder.clear();

    harness.update(1, "/reset").await;

    assert!(harness
        .texts_to(1)
        .iter()
        .any(|t| t.contains("not authorized")));
    // The other session is untouched.
    let state = harness.state(2).await;
    assert_eq!(harness.station_index(&state), Some(0));
}

#[tokio::test]
async fn test_clues_are_sent_html_formatted() {
    let harness = Harness::new();
    harness.update(8, "/start").await;
    harness.update(8, "1").await;

    let clue = harness
        .recorder
        .sent()
        .into_iter()
        .find_map(|message| match message {
            SentMessage::Text { text, format, .. } if text.contains("Clue for Station") => {
                Some(format)
            }
            _ => None,
        });
    assert_eq!(clue, Some(TextFormat::Html));
}

#[tokio::test]
async fn test_photo_station_sends_header_then_image() {
    let harness = Harness::new();
    harness.update(12, "/start").await;
    harness.update(12, "1").await;
    harness.update(12, "T1S0").await;
    harness.recorder.clear();

    // Station index 2 for team 1 is the photo clue.
    harness.update(12, "T1S1").await;

    let sent = harness.recorder.sent();
    assert!(matches!(
        &sent[0],
        SentMessage::Text { text, .. } if text.contains("Clue for Station 3:")
    ));
    assert!(matches!(
        &sent[1],
        SentMessage::Image { asset, .. } if asset == "Clue3.jpeg"
    ));
}
