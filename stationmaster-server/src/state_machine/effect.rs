//! Effects (side effects as data).
//!
//! Effects describe what should happen as a result of a state transition.
//! They are pure data - the interpreter executes them against the messaging
//! gateway. This separation enables testing the transition logic without
//! mocking HTTP.

use stationmaster_core::TeamNumber;

/// All effects that can be produced by state transitions.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Send a rendered notice to the session's chat.
    SendNotice { notice: Notice },

    /// Send an image asset (clue photo, park map) to the session's chat.
    SendImage { asset: String },

    /// Send fixed coordinates (the break assembly point) to the session's chat.
    SendLocation { latitude: f64, longitude: f64 },

    /// Log a message (for debugging/tracing).
    Log { level: LogLevel, message: String },
}

/// Content for messages sent to a chat.
///
/// Notices are rendered to text by the interpreter so wording lives in one
/// place and transitions stay comparable in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    // =========================================================================
    // Registration
    // =========================================================================
    /// Greeting sent on /start, before the map image and team prompt.
    Welcome,
    /// Ask for the team number.
    PromptTeamNumber,
    /// The submitted team number did not parse or was out of range.
    InvalidTeamNumber { team_count: usize },
    /// Echo the confirmed team number back.
    TeamConfirmed { team: TeamNumber },

    // =========================================================================
    // Stations
    // =========================================================================
    /// A text clue, labeled with the player-facing station number.
    Clue { station: usize, body: String },
    /// Header preceding an image clue.
    PhotoClueHeader { station: usize },
    /// The submitted completion code did not match.
    IncorrectCode,

    // =========================================================================
    // Break and phase two
    // =========================================================================
    /// Phase one is over; proceed to the assembly point.
    BreakStarted,
    /// The administrator cut phase one short.
    PartOneCutShort,
    /// Input rejected while parked at the break.
    PleaseWait,
    /// Phase two is starting; the next clue follows.
    PhaseTwoStarting,

    // =========================================================================
    // Terminal and admin
    // =========================================================================
    /// Congratulations on entering the final station's code.
    HuntComplete,
    /// Idempotent "nothing left" notice for an already-finished session.
    AllStationsComplete,
    /// The game was reset to the first station.
    GameReset,
    /// Operator-supplied broadcast text.
    AdminBroadcast { message: String },

    // =========================================================================
    // Command replies (sent by the update handler, outside the machine)
    // =========================================================================
    /// The session was cancelled at the player's request.
    Farewell,
    /// A non-admin chat invoked an admin command.
    Unauthorized,
    /// A slash command the bot does not know.
    UnrecognizedCommand { attempted: String },
    /// Caption preceding the park map image.
    MapCaption,
    /// Support contact plus the session's current position, if registered.
    Help {
        team: Option<TeamNumber>,
        station: Option<usize>,
        clue: Option<String>,
    },
}

/// Log level for logging effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}
