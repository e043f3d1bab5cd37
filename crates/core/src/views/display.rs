//! Public display: the scrolling board and the ticker.
//!
//! The display re-reads the store on a fixed cadence rather than subscribing to changes, so a
//! staff edit shows up on the board within one poll interval.

use crate::constants::{
    BOARD_TITLE, DEFAULT_RECENT_LIMIT, HELP_DESK_NOTICE, MIN_SCROLL_SECS, SCROLL_SECS_PER_RECORD,
    TICKER_REFRESH_SECS,
};
use crate::record::PatientRecord;
use crate::session::Role;
use crate::store::SharedRecordStore;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Snapshot of the board at one poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayBoard {
    pub title: &'static str,
    pub subtitle: &'static str,
    /// Records in storage order.
    pub records: Vec<PatientRecord>,
    /// Records repeated for a seamless scroll loop; empty when there are no records.
    pub queue: Vec<PatientRecord>,
    pub scroll_duration_secs: u64,
    pub refresh_in_secs: u64,
    pub generated_at: DateTime<Utc>,
}

impl DisplayBoard {
    /// True when the board should show its "no active cases" placeholder.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Reads the store and builds the board for one poll.
pub fn board(store: &SharedRecordStore, poll_interval: Duration) -> DisplayBoard {
    let records = store.list();
    DisplayBoard {
        title: BOARD_TITLE,
        subtitle: Role::Display.view_title(),
        queue: looped_queue(&records),
        scroll_duration_secs: scroll_duration_secs(records.len()),
        refresh_in_secs: poll_interval.as_secs(),
        generated_at: Utc::now(),
        records,
    }
}

/// Repeats the records so the scroll never shows a gap: four copies for short lists, two
/// otherwise.
pub fn looped_queue(records: &[PatientRecord]) -> Vec<PatientRecord> {
    if records.is_empty() {
        return Vec::new();
    }
    let repeats = if records.len() < 5 { 4 } else { 2 };
    records
        .iter()
        .cycle()
        .take(records.len() * repeats)
        .cloned()
        .collect()
}

/// Time for one full scroll of the queue.
pub fn scroll_duration_secs(record_count: usize) -> u64 {
    (record_count as u64)
        .saturating_mul(SCROLL_SECS_PER_RECORD)
        .max(MIN_SCROLL_SECS)
}

/// Seconds-until-refresh counter ticked once per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshCountdown {
    interval_secs: u64,
    remaining: u64,
}

impl RefreshCountdown {
    pub fn new(poll_interval: Duration) -> Self {
        let interval_secs = poll_interval.as_secs().max(1);
        Self {
            interval_secs,
            remaining: interval_secs,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Advances one second. Returns `true` when the board is due for a poll, in which case
    /// the counter restarts from the full interval.
    pub fn tick(&mut self) -> bool {
        if self.remaining <= 1 {
            self.remaining = self.interval_secs;
            true
        } else {
            self.remaining -= 1;
            false
        }
    }
}

/// Bottom-of-screen ticker contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticker {
    pub updates: Vec<String>,
    pub tip: String,
    pub notice: &'static str,
    pub refresh_secs: u64,
}

/// Builds the ticker from the most recent updates and the current tip text.
pub fn ticker(store: &SharedRecordStore, tip: &str) -> Ticker {
    Ticker {
        updates: store
            .recent_updates(DEFAULT_RECENT_LIMIT)
            .iter()
            .map(PatientRecord::ticker_line)
            .collect(),
        tip: tip.to_owned(),
        notice: HELP_DESK_NOTICE,
        refresh_secs: TICKER_REFRESH_SECS,
    }
}
