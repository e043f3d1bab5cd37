//! Constants used throughout the OT board core crate.
//!
//! Storage names, view copy and timer cadences live here so the API, the CLI and the
//! display logic agree on them.

/// Default directory for the record slot when no explicit directory is configured.
pub const DEFAULT_DATA_DIR: &str = "ot_data";

/// Filename of the single storage slot holding every patient record.
pub const RECORDS_SLOT_FILENAME: &str = "ot_status_records.json";

/// Number of records shown in the "recent updates" ticker.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Seconds between display board polls.
pub const DEFAULT_POLL_SECS: u64 = 10;

/// Seconds between ticker refreshes on the display.
pub const TICKER_REFRESH_SECS: u64 = 5;

/// Seconds between tip refreshes.
pub const TIP_REFRESH_SECS: u64 = 30;

/// Seconds a session may sit unused before it expires.
pub const SESSION_IDLE_TTL_SECS: u64 = 12 * 60 * 60;

/// Most sessions held at once; the least recently used is evicted beyond this.
pub const MAX_SESSIONS: usize = 1024;

/// Seconds before a staff banner clears itself.
pub const BANNER_CLEAR_SECS: u64 = 3;

/// Board title shown above both views.
pub const BOARD_TITLE: &str = "OT Command Center";

/// Fixed ticker line shown after the tip.
pub const HELP_DESK_NOTICE: &str =
    "Stay hydrated and reach out to the help desk if you need assistance.";

/// Ticker text shown until the first tip arrives.
pub const TIP_PLACEHOLDER: &str = "Loading helpful health tips...";

/// Minimum scroll duration of the display queue, in seconds.
pub const MIN_SCROLL_SECS: u64 = 20;

/// Scroll time budgeted per record, in seconds.
pub const SCROLL_SECS_PER_RECORD: u64 = 5;
