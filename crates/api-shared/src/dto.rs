//! Request and response bodies for the REST API.
//!
//! These are the wire shapes only. Core types are converted at the boundary so the persisted
//! record layout and the API can evolve separately.

use otboard_core::status::UnknownStatus;
use otboard_core::views::display::{DisplayBoard, Ticker};
use otboard_core::views::staff::{Banner, StaffForm, StaffView};
use otboard_core::{OtStatus, PatientRecord};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginReq {
    pub identifier: String,
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRes {
    pub token: String,
    /// `STAFF` or `DISPLAY`
    pub role: String,
    pub view_title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SessionRes {
    pub role: String,
    pub view_title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatientRecordDto {
    pub uhid: String,
    pub name: String,
    /// Display label, e.g. `Surgery Ongoing`
    pub status: String,
    /// Badge tone for the status
    pub tone: String,
    /// Unix time in milliseconds
    pub last_updated: i64,
}

impl From<&PatientRecord> for PatientRecordDto {
    fn from(record: &PatientRecord) -> Self {
        Self {
            uhid: record.uhid.clone(),
            name: record.name.clone(),
            status: record.status.label().to_string(),
            tone: record.status.tone().as_str().to_string(),
            last_updated: record.last_updated,
        }
    }
}

fn records_dto(records: &[PatientRecord]) -> Vec<PatientRecordDto> {
    records.iter().map(PatientRecordDto::from).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ListRecordsRes {
    pub records: Vec<PatientRecordDto>,
    pub count: usize,
}

impl ListRecordsRes {
    pub fn new(records: &[PatientRecord]) -> Self {
        Self {
            records: records_dto(records),
            count: records.len(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecentQuery {
    /// Maximum number of records, default 5
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StaffFormDto {
    #[serde(default)]
    pub uhid: String,
    #[serde(default)]
    pub name: String,
    /// Status label or key; defaults to `Pre-Op / Waiting`
    #[serde(default)]
    pub status: Option<String>,
}

impl StaffFormDto {
    /// Converts to the core form, parsing the status.
    pub fn into_form(self) -> Result<StaffForm, UnknownStatus> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => OtStatus::default(),
            Some(s) => s.parse()?,
        };
        Ok(StaffForm {
            uhid: self.uhid,
            name: self.name,
            status,
        })
    }
}

impl From<StaffForm> for StaffFormDto {
    fn from(form: StaffForm) -> Self {
        Self {
            uhid: form.uhid,
            name: form.name,
            status: Some(form.status.label().to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BannerDto {
    /// `success` or `error`
    pub kind: String,
    pub text: String,
    pub clear_after_secs: u64,
}

impl From<Banner> for BannerDto {
    fn from(banner: Banner) -> Self {
        Self {
            kind: banner.kind.as_str().to_string(),
            text: banner.text,
            clear_after_secs: banner.clear_after_secs,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StaffViewRes {
    pub form: StaffFormDto,
    pub banner: Option<BannerDto>,
    pub records: Vec<PatientRecordDto>,
    pub count: usize,
    /// Status picker options in pipeline order
    pub statuses: Vec<String>,
}

impl From<StaffView> for StaffViewRes {
    fn from(view: StaffView) -> Self {
        Self {
            count: view.record_count(),
            records: records_dto(&view.records),
            form: view.form.into(),
            banner: view.banner.map(BannerDto::from),
            statuses: status_labels(),
        }
    }
}

pub fn status_labels() -> Vec<String> {
    OtStatus::ALL.iter().map(|s| s.label().to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BoardRes {
    pub title: String,
    pub subtitle: String,
    pub records: Vec<PatientRecordDto>,
    pub queue: Vec<PatientRecordDto>,
    pub is_empty: bool,
    pub scroll_duration_secs: u64,
    pub refresh_in_secs: u64,
    /// RFC 3339 timestamp of this snapshot
    pub generated_at: String,
}

impl From<DisplayBoard> for BoardRes {
    fn from(board: DisplayBoard) -> Self {
        Self {
            title: board.title.to_string(),
            subtitle: board.subtitle.to_string(),
            is_empty: board.is_empty(),
            records: records_dto(&board.records),
            queue: records_dto(&board.queue),
            scroll_duration_secs: board.scroll_duration_secs,
            refresh_in_secs: board.refresh_in_secs,
            generated_at: board.generated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TickerRes {
    pub updates: Vec<String>,
    pub tip: String,
    pub notice: String,
    pub refresh_secs: u64,
}

impl From<Ticker> for TickerRes {
    fn from(ticker: Ticker) -> Self {
        Self {
            updates: ticker.updates,
            tip: ticker.tip,
            notice: ticker.notice.to_string(),
            refresh_secs: ticker.refresh_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_status_defaults_to_waiting() {
        let form = StaffFormDto {
            uhid: "1".into(),
            name: "One".into(),
            status: Some("  ".into()),
        }
        .into_form()
        .expect("blank status is allowed");
        assert_eq!(form.status, OtStatus::Waiting);

        let form = StaffFormDto::default().into_form().expect("missing status");
        assert_eq!(form.status, OtStatus::Waiting);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result = StaffFormDto {
            uhid: "1".into(),
            name: "One".into(),
            status: Some("Teleported".into()),
        }
        .into_form();
        assert!(result.is_err());
    }

    #[test]
    fn record_dto_carries_label_and_tone() {
        let record = PatientRecord {
            uhid: "1234".into(),
            name: "Jane Doe".into(),
            status: OtStatus::Ongoing,
            last_updated: 7,
        };
        let dto = PatientRecordDto::from(&record);
        assert_eq!(dto.status, "Surgery Ongoing");
        assert_eq!(dto.tone, "alert");
        assert_eq!(dto.last_updated, 7);
    }

    #[test]
    fn status_labels_follow_pipeline_order() {
        let labels = status_labels();
        assert_eq!(labels.len(), 7);
        assert_eq!(labels[0], "Pre-Op / Waiting");
        assert_eq!(labels[6], "Cancelled / Deferred");
    }
}
