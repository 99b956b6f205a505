//! Admin broadcast operations.
//!
//! Each operation fans out over every known session through the same
//! `process_event` pipeline as player messages, so per-session skipping and
//! messaging reuse the transition logic. A chat that has not registered a
//! team is skipped by its own transition handler, never a failure. The
//! administrator gets back a short confirmation summarizing the reach.

use std::sync::Arc;

use tracing::info;

use crate::command::AuthorizedAdminAction;
use crate::gateway::{ChatId, Messenger};
use crate::state_machine::{send_notice, Event, Notice, SessionStore};

/// Run an authorized admin action and return the confirmation text for the
/// administrator's chat.
///
/// Taking [`AuthorizedAdminAction`] by value means this can only be reached
/// through the authorization check in `command::try_authorize_admin_action`.
pub async fn run(
    action: AuthorizedAdminAction,
    store: &SessionStore,
    messenger: &Arc<dyn Messenger>,
) -> String {
    match action {
        AuthorizedAdminAction::ForceBreak => {
            let reached = fan_out(store, messenger, Event::BreakForced).await;
            info!("Force-break broadcast reached {} teams", reached);
            format!("Part one cut short for {} teams.", reached)
        }
        AuthorizedAdminAction::ResumePartTwo => {
            // Set the flag before touching any session so a team registering
            // mid-broadcast already sees phase two.
            store.set_phase_two_started(true);
            let reached = fan_out(store, messenger, Event::PhaseTwoResumed).await;
            info!("Phase two resumed for {} teams", reached);
            format!("Part two has been resumed for {} teams.", reached)
        }
        AuthorizedAdminAction::Reset => {
            store.set_phase_two_started(false);
            let reached = fan_out(store, messenger, Event::GameReset).await;
            info!("Game reset for {} teams", reached);
            format!("Game has been reset for {} teams.", reached)
        }
        AuthorizedAdminAction::Broadcast { message } => {
            let chats = store.known_chats().await;
            for chat in &chats {
                send_notice(
                    messenger,
                    *chat,
                    Notice::AdminBroadcast {
                        message: message.clone(),
                    },
                )
                .await;
            }
            info!("Admin broadcast sent to {} chats", chats.len());
            format!("Message sent to {} chats.", chats.len())
        }
    }
}

/// Deliver an admin event to every known session; returns how many sessions
/// had a registered team (the rest were skipped by their transition).
async fn fan_out(store: &SessionStore, messenger: &Arc<dyn Messenger>, event: Event) -> usize {
    let mut reached = 0;
    for chat in store.known_chats().await {
        let state = store.process_event(chat, event.clone(), messenger).await;
        if state.team().is_some() {
            reached += 1;
        }
    }
    reached
}
