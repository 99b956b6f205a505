//! Effect interpreter that executes effects against the messaging gateway.
//!
//! The interpreter is the boundary between the pure state machine and the
//! impure world of I/O. It takes effects (descriptions of what to do),
//! renders notices to user-facing text, and sends them. Delivery failures
//! are logged and never abort the remaining effects.

use std::sync::Arc;

use tracing::{error, info, warn};

use stationmaster_core::TeamNumber;

use super::effect::{Effect, LogLevel, Notice};
use crate::gateway::{ChatId, Messenger, TextFormat};

/// Whom players should contact when stuck.
pub const SUPPORT_CONTACT: &str = "the organisers at the control desk";

/// Context needed by the interpreter to execute effects.
pub struct InterpreterContext {
    pub messenger: Arc<dyn Messenger>,
    pub chat_id: ChatId,
}

/// Execute a list of effects in order.
///
/// Effects are executed sequentially. If one fails, execution continues with
/// the remaining effects and the error is logged; retries are the player's
/// (or the gateway's) concern, not ours.
pub async fn execute_effects(ctx: &InterpreterContext, effects: Vec<Effect>) {
    for effect in effects {
        if let Err(err) = execute_effect(ctx, effect).await {
            error!("Effect execution failed for chat {}: {:#}", ctx.chat_id, err);
        }
    }
}

async fn execute_effect(ctx: &InterpreterContext, effect: Effect) -> anyhow::Result<()> {
    match effect {
        Effect::SendNotice { notice } => {
            let rendered = render_notice(&notice);
            ctx.messenger
                .send_text(ctx.chat_id, &rendered.text, rendered.format)
                .await
        }

        Effect::SendImage { asset } => ctx.messenger.send_image(ctx.chat_id, &asset).await,

        Effect::SendLocation {
            latitude,
            longitude,
        } => {
            ctx.messenger
                .send_location(ctx.chat_id, latitude, longitude)
                .await
        }

        Effect::Log { level, message } => {
            match level {
                LogLevel::Debug => tracing::debug!("{}", message),
                LogLevel::Info => info!("{}", message),
                LogLevel::Warn => warn!("{}", message),
                LogLevel::Error => error!("{}", message),
            }
            Ok(())
        }
    }
}

/// Send a single notice outside the state machine (command replies,
/// admin confirmations). Failures are logged, never returned.
pub async fn send_notice(messenger: &Arc<dyn Messenger>, chat_id: ChatId, notice: Notice) {
    let ctx = InterpreterContext {
        messenger: messenger.clone(),
        chat_id,
    };
    execute_effects(&ctx, vec![Effect::SendNotice { notice }]).await;
}

/// A notice rendered to text ready for the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedNotice {
    pub text: String,
    pub format: TextFormat,
}

impl RenderedNotice {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Plain,
        }
    }

    fn html(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Html,
        }
    }
}

/// Render a notice to the text players see.
///
/// All wording lives here so transitions stay comparable as data and the
/// copy can change without touching the machine.
pub fn render_notice(notice: &Notice) -> RenderedNotice {
    match notice {
        Notice::Welcome => RenderedNotice::plain(
            "Welcome to the scavenger hunt!\n\n\
             This bot will guide your team along the route. Find the map below!\n\n\
             After completing each station you will receive a code from your \
             station master. Entering the code unlocks the clue to the next \
             station.\n\nFeel free to use /help if you get stuck.\n\nHave fun!",
        ),
        Notice::PromptTeamNumber => RenderedNotice::plain("Please enter your team number."),
        Notice::InvalidTeamNumber { team_count } => RenderedNotice::plain(format!(
            "Invalid input. Please enter a valid team number (1-{}).",
            team_count
        )),
        Notice::TeamConfirmed { team } => RenderedNotice::plain(format!(
            "Thanks for confirming! Your team number is {}.",
            team
        )),

        Notice::Clue { station, body } => RenderedNotice::html(format!(
            "<b>Clue for Station {}:</b>\n\n{}",
            station, body
        )),
        Notice::PhotoClueHeader { station } => {
            RenderedNotice::html(format!("<b>Clue for Station {}:</b>", station))
        }
        Notice::IncorrectCode => RenderedNotice::plain("Incorrect completion code!"),

        Notice::BreakStarted => RenderedNotice::plain(
            "Part one is over!\n\nPlease proceed to the assembly point below.",
        ),
        Notice::PartOneCutShort => RenderedNotice::plain(
            "Due to time constraints, part one is ending early. Please head to \
             the assembly point.",
        ),
        Notice::PleaseWait => {
            RenderedNotice::plain("Please wait until the break is over.")
        }
        Notice::PhaseTwoStarting => {
            RenderedNotice::plain("Part two is starting now! Here is your next clue:")
        }

        Notice::HuntComplete => RenderedNotice::plain(
            "Congratulations! You have completed all the stations! Please make \
             your way back to the start point for the closing address.",
        ),
        Notice::AllStationsComplete => {
            RenderedNotice::plain("You have completed all the stations!")
        }
        Notice::GameReset => {
            RenderedNotice::plain("The game has been reset. Back to the first station!")
        }
        Notice::AdminBroadcast { message } => {
            RenderedNotice::plain(format!("ADMIN MESSAGE: {}", message))
        }

        Notice::Farewell => RenderedNotice::plain(
            "Sad to see you leave! Send /start to rejoin the hunt.",
        ),
        Notice::Unauthorized => RenderedNotice::plain(
            "Nice try. You are not authorized to perform this action.",
        ),
        Notice::UnrecognizedCommand { attempted } => RenderedNotice::plain(format!(
            "Unknown command {}. Try /help.",
            attempted
        )),
        Notice::MapCaption => RenderedNotice::plain("Map of the route:"),
        Notice::Help {
            team,
            station,
            clue,
        } => RenderedNotice::plain(render_help(*team, *station, clue.as_deref())),
    }
}

fn render_help(team: Option<TeamNumber>, station: Option<usize>, clue: Option<&str>) -> String {
    let mut text = format!("Contact {} if you are stuck.", SUPPORT_CONTACT);
    if let Some(team) = team {
        text.push_str(&format!("\n\nTeam number: {}", team));
    }
    if let Some(station) = station {
        text.push_str(&format!("\nCurrent station: {}", station));
    }
    if let Some(clue) = clue {
        text.push_str(&format!("\nCurrent clue: {}", clue));
    }
    text
}
