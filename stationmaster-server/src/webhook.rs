//! Inbound update receiver.
//!
//! The chat gateway POSTs each inbound event (message or command, scoped to a
//! chat id) to `/update`, authenticated by a shared-secret header. Plain text
//! is routed into the state machine; commands are parsed here, with admin
//! operations gated by the authorization check in `command`.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::post,
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};

use stationmaster_core::Station;

use crate::command::{parse_message, try_authorize_admin_action, BotCommand, ParseResult};
use crate::gateway::{ChatId, TextFormat};
use crate::state_machine::transition::MAP_ASSET;
use crate::state_machine::{send_notice, Event, HuntMachineState, Notice};
use crate::{admin, AppState};

/// Header carrying the shared secret the gateway attaches to every update.
pub const GATEWAY_SECRET_HEADER: &str = "x-gateway-secret";

/// One inbound event from the gateway.
#[derive(Debug, Deserialize)]
pub struct InboundUpdate {
    pub chat_id: i64,
    pub text: String,
}

#[derive(Serialize)]
pub struct UpdateResponse {
    pub message: String,
}

/// Router for gateway-facing endpoints.
pub fn gateway_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/update", post(handle_update))
        .with_state(state)
}

async fn handle_update(
    State(app): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(update): Json<InboundUpdate>,
) -> (StatusCode, Json<UpdateResponse>) {
    let provided = headers
        .get(GATEWAY_SECRET_HEADER)
        .and_then(|value| value.to_str().ok());
    if provided != Some(app.gateway_webhook_secret.as_str()) {
        warn!("Rejected update with missing or wrong gateway secret");
        return (
            StatusCode::UNAUTHORIZED,
            Json(UpdateResponse {
                message: "unauthorized".to_string(),
            }),
        );
    }

    let chat = ChatId(update.chat_id);
    match parse_message(&update.text) {
        ParseResult::NotACommand => {
            // A chat only has a session after /start; stray messages from
            // strangers are ignored.
            if app.store.get(chat).await.is_some() {
                app.store
                    .process_event(chat, Event::MessageReceived { text: update.text }, &app.messenger)
                    .await;
            } else {
                info!("Ignoring message from chat {} with no session", chat);
            }
        }

        ParseResult::UnrecognizedCommand { attempted } => {
            send_notice(
                &app.messenger,
                chat,
                Notice::UnrecognizedCommand { attempted },
            )
            .await;
        }

        ParseResult::Command(command) => handle_command(&app, chat, command).await,
    }

    (
        StatusCode::OK,
        Json(UpdateResponse {
            message: "ok".to_string(),
        }),
    )
}

async fn handle_command(app: &AppState, chat: ChatId, command: BotCommand) {
    match command {
        BotCommand::Start => {
            app.store
                .process_event(chat, Event::ConversationStarted, &app.messenger)
                .await;
        }

        BotCommand::Cancel => {
            if app.store.remove(chat).await.is_some() {
                info!("Chat {} cancelled their session", chat);
            }
            send_notice(&app.messenger, chat, Notice::Farewell).await;
        }

        BotCommand::Help => {
            let notice = build_help(app, chat).await;
            send_notice(&app.messenger, chat, notice).await;
        }

        BotCommand::Map => {
            send_notice(&app.messenger, chat, Notice::MapCaption).await;
            if let Err(err) = app.messenger.send_image(chat, MAP_ASSET).await {
                error!("Failed to send map to chat {}: {:#}", chat, err);
            }
        }

        admin_command @ (BotCommand::ForceBreak
        | BotCommand::ResumePartTwo
        | BotCommand::Reset
        | BotCommand::Broadcast { .. }) => {
            match try_authorize_admin_action(&admin_command, chat, app.admin_chat) {
                Some(action) => {
                    let summary = admin::run(action, &app.store, &app.messenger).await;
                    if let Err(err) = app
                        .messenger
                        .send_text(chat, &summary, TextFormat::Plain)
                        .await
                    {
                        error!("Failed to confirm admin action to {}: {:#}", chat, err);
                    }
                }
                None => {
                    warn!(
                        "Chat {} attempted admin command /{} without authorization",
                        chat, admin_command
                    );
                    send_notice(&app.messenger, chat, Notice::Unauthorized).await;
                }
            }
        }
    }
}

/// Assemble the /help notice: support contact plus, for a registered
/// session, the team, current station number and current clue.
async fn build_help(app: &AppState, chat: ChatId) -> Notice {
    let state = app.store.get(chat).await;

    let (team, station_index) = match &state {
        Some(HuntMachineState::AwaitingCode {
            team,
            station_index,
            ..
        }) => (Some(*team), Some(*station_index)),
        Some(HuntMachineState::OnBreak { team, .. }) => (Some(*team), None),
        Some(HuntMachineState::Finished { team }) => (Some(*team), None),
        Some(HuntMachineState::Registering) | None => (None, None),
    };

    let tables = app.store.tables();
    let station = team
        .zip(station_index)
        .and_then(|(team, index)| tables.display_number(team, index).ok());

    let clue = match (&state, team) {
        (Some(HuntMachineState::AwaitingCode { station_index, .. }), Some(team)) => {
            match tables.station(team, *station_index) {
                Ok(Station::Clue(body)) => Some(body.clone()),
                Ok(Station::PhotoClue { asset }) => Some(format!("photo clue ({})", asset)),
                Ok(Station::Break) | Err(_) => None,
            }
        }
        (Some(HuntMachineState::OnBreak { .. }), _) => {
            Some("On break - waiting for part two.".to_string())
        }
        (Some(HuntMachineState::Finished { .. }), _) => {
            Some("All stations complete!".to_string())
        }
        _ => None,
    };

    Notice::Help {
        team,
        station,
        clue,
    }
}
