//! Surgical status of a patient.
//!
//! The statuses follow the usual theatre pipeline (waiting, shifted to OT, induction, surgery,
//! recovery, back to the ward) with `Cancelled` off to the side. Nothing enforces that order:
//! staff may move a patient from any status to any other.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a patient is in the theatre pipeline.
///
/// Serialised by its display label, e.g. `"Surgery Ongoing"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OtStatus {
    #[default]
    #[serde(rename = "Pre-Op / Waiting")]
    Waiting,
    #[serde(rename = "Shifted to OT")]
    ShiftedToOt,
    #[serde(rename = "Anesthesia Induction")]
    Anesthesia,
    #[serde(rename = "Surgery Ongoing")]
    Ongoing,
    #[serde(rename = "Recovery / Post-Op")]
    Recovery,
    #[serde(rename = "Shifted to Ward / ICU")]
    ShiftedToWard,
    #[serde(rename = "Cancelled / Deferred")]
    Cancelled,
}

/// Visual weight the board gives a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTone {
    Neutral,
    Info,
    Induction,
    Alert,
    Caution,
    Done,
    Muted,
}

impl StatusTone {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusTone::Neutral => "neutral",
            StatusTone::Info => "info",
            StatusTone::Induction => "induction",
            StatusTone::Alert => "alert",
            StatusTone::Caution => "caution",
            StatusTone::Done => "done",
            StatusTone::Muted => "muted",
        }
    }
}

impl OtStatus {
    /// Every status in picker order.
    pub const ALL: [OtStatus; 7] = [
        OtStatus::Waiting,
        OtStatus::ShiftedToOt,
        OtStatus::Anesthesia,
        OtStatus::Ongoing,
        OtStatus::Recovery,
        OtStatus::ShiftedToWard,
        OtStatus::Cancelled,
    ];

    /// Human readable label, also used as the persisted value.
    pub fn label(self) -> &'static str {
        match self {
            OtStatus::Waiting => "Pre-Op / Waiting",
            OtStatus::ShiftedToOt => "Shifted to OT",
            OtStatus::Anesthesia => "Anesthesia Induction",
            OtStatus::Ongoing => "Surgery Ongoing",
            OtStatus::Recovery => "Recovery / Post-Op",
            OtStatus::ShiftedToWard => "Shifted to Ward / ICU",
            OtStatus::Cancelled => "Cancelled / Deferred",
        }
    }

    /// Short command-line friendly key.
    pub fn key(self) -> &'static str {
        match self {
            OtStatus::Waiting => "waiting",
            OtStatus::ShiftedToOt => "shifted-to-ot",
            OtStatus::Anesthesia => "anesthesia",
            OtStatus::Ongoing => "ongoing",
            OtStatus::Recovery => "recovery",
            OtStatus::ShiftedToWard => "shifted-to-ward",
            OtStatus::Cancelled => "cancelled",
        }
    }

    pub fn tone(self) -> StatusTone {
        match self {
            OtStatus::Waiting => StatusTone::Neutral,
            OtStatus::ShiftedToOt => StatusTone::Info,
            OtStatus::Anesthesia => StatusTone::Induction,
            OtStatus::Ongoing => StatusTone::Alert,
            OtStatus::Recovery => StatusTone::Caution,
            OtStatus::ShiftedToWard => StatusTone::Done,
            OtStatus::Cancelled => StatusTone::Muted,
        }
    }
}

impl fmt::Display for OtStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OtStatus {
    type Err = UnknownStatus;

    /// Accepts either the display label or the short key, ignoring surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        OtStatus::ALL
            .into_iter()
            .find(|status| {
                status.label().eq_ignore_ascii_case(wanted)
                    || status.key().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| UnknownStatus(wanted.to_string()))
    }
}
