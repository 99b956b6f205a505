//! Keyed session store.
//!
//! One state machine per chat, held in a thread-safe map with an explicit
//! lifecycle: created on /start, mutated through the conversation, removed on
//! /cancel, gone at process exit. The process-wide phase flag lives here too,
//! next to the sessions it governs. No persistence: the hunt is a one-day
//! event and state is deliberately in-memory only.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{error, info};

use stationmaster_core::ContentTables;

use super::event::Event;
use super::interpreter::{execute_effects, InterpreterContext};
use super::state::HuntMachineState;
use super::transition::{transition, TransitionResult};
use crate::gateway::{ChatId, Messenger};

/// Thread-safe store for per-chat state machines.
pub struct SessionStore {
    tables: Arc<ContentTables>,
    sessions: RwLock<HashMap<ChatId, HuntMachineState>>,
    /// True once the administrator has resumed phase two. Read by
    /// registration to fast-forward latecomers past the break.
    phase_two_started: AtomicBool,
}

impl SessionStore {
    pub fn new(tables: Arc<ContentTables>) -> Self {
        Self {
            tables,
            sessions: RwLock::new(HashMap::new()),
            phase_two_started: AtomicBool::new(false),
        }
    }

    /// The content tables this store runs against.
    pub fn tables(&self) -> &ContentTables {
        &self.tables
    }

    /// Get the current state for a chat.
    pub async fn get(&self, chat_id: ChatId) -> Option<HuntMachineState> {
        let sessions = self.sessions.read().await;
        sessions.get(&chat_id).cloned()
    }

    /// Set the state for a chat.
    pub async fn set(&self, chat_id: ChatId, state: HuntMachineState) {
        let mut sessions = self.sessions.write().await;
        sessions.insert(chat_id, state);
    }

    /// Remove the state for a chat (player cancelled).
    pub async fn remove(&self, chat_id: ChatId) -> Option<HuntMachineState> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(&chat_id)
    }

    /// Every chat with a session, for admin fan-out.
    pub async fn known_chats(&self) -> Vec<ChatId> {
        let sessions = self.sessions.read().await;
        sessions.keys().copied().collect()
    }

    /// Whether phase two has begun.
    pub fn phase_two_started(&self) -> bool {
        self.phase_two_started.load(Ordering::SeqCst)
    }

    /// Flip the phase flag (resume sets it, reset clears it).
    pub fn set_phase_two_started(&self, started: bool) {
        self.phase_two_started.store(started, Ordering::SeqCst);
    }

    /// Process an event for a chat: transition the state and execute effects.
    ///
    /// This is the main entry point for handling events. It:
    /// 1. Gets (or creates) the current state
    /// 2. Runs the pure transition function
    /// 3. Executes effects via the interpreter
    /// 4. Stores the resulting state
    ///
    /// An invariant violation (out-of-range table lookup) is logged loudly
    /// and leaves the session untouched.
    pub async fn process_event(
        &self,
        chat_id: ChatId,
        event: Event,
        messenger: &Arc<dyn Messenger>,
    ) -> HuntMachineState {
        let current = self.get(chat_id).await.unwrap_or_default();

        info!(
            "Processing event {} for chat {} in state {:?}",
            event.log_summary(),
            chat_id,
            current
        );

        let TransitionResult { state, effects } = match transition(
            &self.tables,
            self.phase_two_started(),
            current.clone(),
            event,
        ) {
            Ok(result) => result,
            Err(err) => {
                error!(
                    "Invariant violated for chat {} in state {:?}: {}",
                    chat_id, current, err
                );
                return current;
            }
        };

        if !effects.is_empty() {
            let ctx = InterpreterContext {
                messenger: messenger.clone(),
                chat_id,
            };
            execute_effects(&ctx, effects).await;
        }

        self.set(chat_id, state.clone()).await;

        info!("Chat {} now in state {:?}", chat_id, state);

        state
    }
}
