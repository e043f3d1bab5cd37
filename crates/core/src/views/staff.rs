//! Staff desk: the create/update form and the records table.

use crate::constants::BANNER_CLEAR_SECS;
use crate::record::PatientRecord;
use crate::status::OtStatus;
use crate::store::SharedRecordStore;
use crate::StoreResult;
use otboard_types::{NonEmptyText, Uhid};

/// Contents of the status update form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffForm {
    pub uhid: String,
    pub name: String,
    pub status: OtStatus,
}

impl StaffForm {
    /// Form pre-filled from an existing record, for editing.
    pub fn prefill(record: &PatientRecord) -> Self {
        Self {
            uhid: record.uhid.clone(),
            name: record.name.clone(),
            status: record.status,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

impl BannerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BannerKind::Success => "success",
            BannerKind::Error => "error",
        }
    }
}

/// Transient message shown above the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub text: String,
    /// Seconds until the banner clears itself.
    pub clear_after_secs: u64,
}

impl Banner {
    fn success(text: String) -> Self {
        Self {
            kind: BannerKind::Success,
            text,
            clear_after_secs: BANNER_CLEAR_SECS,
        }
    }

    fn error(text: &str) -> Self {
        Self {
            kind: BannerKind::Error,
            text: text.to_owned(),
            clear_after_secs: BANNER_CLEAR_SECS,
        }
    }
}

/// Everything the staff desk shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffView {
    pub form: StaffForm,
    pub banner: Option<Banner>,
    pub records: Vec<PatientRecord>,
}

impl StaffView {
    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

/// The desk as first opened: empty form, full table.
pub fn open(store: &SharedRecordStore) -> StaffView {
    StaffView {
        form: StaffForm::default(),
        banner: None,
        records: store.list(),
    }
}

/// Handles a form submission.
///
/// Blank UHID or name leaves the store untouched and returns the submitted form with an error
/// banner. Otherwise the UHID is normalised to upper case, the record is upserted and the form
/// is reset.
///
/// # Errors
///
/// Returns a `StoreError` if the record cannot be saved.
pub fn submit(store: &SharedRecordStore, form: StaffForm) -> StoreResult<StaffView> {
    let (uhid, name) = match (Uhid::new(&form.uhid), NonEmptyText::new(&form.name)) {
        (Ok(uhid), Ok(name)) => (uhid, name),
        _ => {
            return Ok(StaffView {
                form,
                banner: Some(Banner::error("Please fill in all fields")),
                records: store.list(),
            });
        }
    };

    let records = store.upsert(uhid.as_str(), name.as_str(), form.status)?;
    tracing::info!(uhid = %uhid, status = %form.status, "staff update saved");

    Ok(StaffView {
        form: StaffForm::default(),
        banner: Some(Banner::success(format!("Update successful for: {name}"))),
        records,
    })
}

/// Form pre-filled for editing `uhid`, if such a record exists.
///
/// `uhid` is normalised the same way [`submit`] stores it; a blank UHID matches nothing.
pub fn edit(store: &SharedRecordStore, uhid: &str) -> Option<StaffForm> {
    let uhid = Uhid::new(uhid).ok()?;
    store
        .get(uhid.as_str())
        .map(|record| StaffForm::prefill(&record))
}

/// Deletes `uhid` immediately and returns the refreshed desk.
///
/// `uhid` is normalised the same way [`submit`] stores it. A blank UHID deletes nothing.
///
/// # Errors
///
/// Returns a `StoreError` if the remaining records cannot be saved.
pub fn delete(store: &SharedRecordStore, uhid: &str) -> StoreResult<StaffView> {
    let records = match Uhid::new(uhid) {
        Ok(uhid) => store.delete(uhid.as_str())?,
        Err(_) => store.list(),
    };
    Ok(StaffView {
        form: StaffForm::default(),
        banner: None,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::MemorySlot;

    fn store() -> SharedRecordStore {
        SharedRecordStore::new(MemorySlot::new())
    }

    fn form(uhid: &str, name: &str, status: OtStatus) -> StaffForm {
        StaffForm {
            uhid: uhid.into(),
            name: name.into(),
            status,
        }
    }

    #[test]
    fn submit_upserts_and_resets_form() {
        let store = store();
        let view = submit(&store, form("ab12", " Jane Doe ", OtStatus::ShiftedToOt))
            .expect("submit should succeed");

        assert_eq!(view.form, StaffForm::default());
        assert_eq!(view.record_count(), 1);
        assert_eq!(view.records[0].uhid, "AB12");
        assert_eq!(view.records[0].name, "Jane Doe");
        assert_eq!(view.records[0].status, OtStatus::ShiftedToOt);

        let banner = view.banner.expect("success banner");
        assert_eq!(banner.kind, BannerKind::Success);
        assert_eq!(banner.text, "Update successful for: Jane Doe");
        assert_eq!(banner.clear_after_secs, 3);
    }

    #[test]
    fn submit_with_blank_fields_keeps_form_and_store() {
        let store = store();
        let submitted = form("  ", "Jane Doe", OtStatus::Recovery);
        let view = submit(&store, submitted.clone()).expect("submit returns a view");

        assert_eq!(view.form, submitted);
        assert!(view.records.is_empty());
        assert!(store.list().is_empty());

        let banner = view.banner.expect("error banner");
        assert_eq!(banner.kind, BannerKind::Error);
        assert_eq!(banner.text, "Please fill in all fields");

        let view = submit(&store, form("1234", "", OtStatus::Waiting)).expect("view");
        assert_eq!(view.banner.map(|b| b.kind), Some(BannerKind::Error));
    }

    #[test]
    fn lower_case_resubmission_updates_the_same_record() {
        let store = store();
        submit(&store, form("x9", "Sam", OtStatus::Waiting)).expect("first");
        let view = submit(&store, form("X9", "Sam", OtStatus::Ongoing)).expect("second");

        assert_eq!(view.record_count(), 1);
        assert_eq!(view.records[0].status, OtStatus::Ongoing);
    }

    #[test]
    fn edit_prefills_from_record() {
        let store = store();
        submit(&store, form("1234", "Jane Doe", OtStatus::Recovery)).expect("submit");

        let prefilled = edit(&store, "1234").expect("record exists");
        assert_eq!(prefilled, form("1234", "Jane Doe", OtStatus::Recovery));
        assert_eq!(edit(&store, "9999"), None);
    }

    #[test]
    fn delete_is_immediate() {
        let store = store();
        submit(&store, form("1", "One", OtStatus::Waiting)).expect("one");
        submit(&store, form("2", "Two", OtStatus::Waiting)).expect("two");

        let view = delete(&store, "1").expect("delete");
        assert_eq!(view.record_count(), 1);
        assert_eq!(view.records[0].uhid, "2");
        assert!(view.banner.is_none());
    }

    #[test]
    fn edit_and_delete_accept_the_uhid_as_typed() {
        let store = store();
        submit(&store, form("ab12", "Jane Doe", OtStatus::Ongoing)).expect("submit");
        assert_eq!(store.list()[0].uhid, "AB12");

        let prefilled = edit(&store, " ab12 ").expect("lower-case edit finds the record");
        assert_eq!(prefilled, form("AB12", "Jane Doe", OtStatus::Ongoing));

        let view = delete(&store, "ab12").expect("delete");
        assert_eq!(view.record_count(), 0);
        assert!(store.list().is_empty());
    }

    #[test]
    fn blank_uhid_edits_and_deletes_nothing() {
        let store = store();
        submit(&store, form("1", "One", OtStatus::Waiting)).expect("one");

        assert_eq!(edit(&store, "   "), None);
        let view = delete(&store, "").expect("blank delete is a no-op");
        assert_eq!(view.record_count(), 1);
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn open_shows_all_records() {
        let store = store();
        submit(&store, form("1", "One", OtStatus::Waiting)).expect("one");
        let view = open(&store);
        assert_eq!(view.record_count(), 1);
        assert!(view.banner.is_none());
    }
}
