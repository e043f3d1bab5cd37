//! Patient record store.
//!
//! The store keeps the whole record list in a single [`StorageSlot`] as a JSON array. Every
//! mutation is a read-modify-write of the full list followed by one save, and returns the list
//! as it stands afterwards so callers can refresh without reading again.
//!
//! Reads fail open: a missing slot, an unreadable slot or content that does not parse is
//! treated as an empty board and logged, never reported to the caller. Content that does not
//! parse is handed to [`StorageSlot::backup`] before the first write replaces it.

use crate::config::CoreConfig;
use crate::record::PatientRecord;
use crate::slot::{FileSlot, StorageSlot};
use crate::status::OtStatus;
use crate::{StoreError, StoreResult};
use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Keyed store of patient records over one storage slot.
///
/// At most one record exists per `uhid`. Keys are compared exactly; callers that want
/// case-insensitive UHIDs normalise before calling.
#[derive(Debug)]
pub struct RecordStore<S> {
    slot: S,
}

impl<S: StorageSlot> RecordStore<S> {
    pub fn new(slot: S) -> Self {
        Self { slot }
    }

    pub fn slot(&self) -> &S {
        &self.slot
    }

    /// All records in storage order.
    pub fn list(&self) -> Vec<PatientRecord> {
        self.read().0
    }

    /// Parsed records, plus the raw slot contents when they could not be parsed.
    fn read(&self) -> (Vec<PatientRecord>, Option<String>) {
        let contents = match self.slot.load() {
            Ok(Some(contents)) => contents,
            Ok(None) => return (Vec::new(), None),
            Err(e) => {
                tracing::warn!("failed to read record slot, treating as empty: {}", e);
                return (Vec::new(), None);
            }
        };

        match serde_json::from_str::<Vec<PatientRecord>>(&contents) {
            Ok(records) => (records, None),
            Err(e) => {
                tracing::warn!(
                    bytes = contents.len(),
                    "record slot is not a valid record list, treating as empty: {}",
                    e
                );
                (Vec::new(), Some(contents))
            }
        }
    }

    /// Creates or updates the record for `uhid`, stamping it with the current time.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the updated list cannot be serialised or saved.
    pub fn upsert(
        &mut self,
        uhid: &str,
        name: &str,
        status: OtStatus,
    ) -> StoreResult<Vec<PatientRecord>> {
        self.upsert_at(uhid, name, status, Utc::now().timestamp_millis())
    }

    /// Creates or updates the record for `uhid` with an explicit `last_updated` timestamp.
    ///
    /// An existing record keeps its position in the list; a new one is appended.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the updated list cannot be serialised or saved.
    pub fn upsert_at(
        &mut self,
        uhid: &str,
        name: &str,
        status: OtStatus,
        last_updated: i64,
    ) -> StoreResult<Vec<PatientRecord>> {
        let (mut records, unparsed) = self.read();
        if let Some(raw) = unparsed {
            self.slot.backup(&raw).map_err(StoreError::SlotBackup)?;
            tracing::warn!("unreadable record slot backed up before overwrite");
        }

        match records.iter_mut().find(|r| r.uhid == uhid) {
            Some(existing) => {
                existing.name = name.to_owned();
                existing.status = status;
                existing.last_updated = last_updated;
            }
            None => records.push(PatientRecord {
                uhid: uhid.to_owned(),
                name: name.to_owned(),
                status,
                last_updated,
            }),
        }

        self.persist(&records)?;
        tracing::debug!(uhid, status = %status, "record upserted");
        Ok(records)
    }

    /// Removes every record matching `uhid` and returns what remains.
    ///
    /// Deleting an unknown `uhid` leaves the slot untouched.
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` if the remaining list cannot be saved.
    pub fn delete(&mut self, uhid: &str) -> StoreResult<Vec<PatientRecord>> {
        let mut records = self.list();
        let before = records.len();
        records.retain(|r| r.uhid != uhid);

        if records.len() != before {
            self.persist(&records)?;
            tracing::debug!(uhid, "record deleted");
        }
        Ok(records)
    }

    /// Up to `limit` records, most recently updated first.
    pub fn recent_updates(&self, limit: usize) -> Vec<PatientRecord> {
        let mut records = self.list();
        records.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        records.truncate(limit);
        records
    }

    /// Looks up a single record by exact `uhid`.
    pub fn get(&self, uhid: &str) -> Option<PatientRecord> {
        self.list().into_iter().find(|r| r.uhid == uhid)
    }

    fn persist(&mut self, records: &[PatientRecord]) -> StoreResult<()> {
        let json = serde_json::to_string(records).map_err(StoreError::Serialization)?;
        self.slot.save(&json).map_err(StoreError::SlotWrite)
    }
}

/// Thread-safe handle to a record store, shared by request handlers.
///
/// Each call holds the lock for one complete read-modify-write, so concurrent staff
/// submissions cannot interleave.
#[derive(Clone)]
pub struct SharedRecordStore {
    inner: Arc<Mutex<RecordStore<Box<dyn StorageSlot>>>>,
}

impl SharedRecordStore {
    pub fn new(slot: impl StorageSlot + 'static) -> Self {
        let slot: Box<dyn StorageSlot> = Box::new(slot);
        Self {
            inner: Arc::new(Mutex::new(RecordStore::new(slot))),
        }
    }

    /// Opens the file-backed store configured in `cfg`, creating the data directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::StorageDirCreation` if the data directory cannot be created.
    pub fn open(cfg: &CoreConfig) -> StoreResult<Self> {
        let slot = FileSlot::create(cfg.records_slot_path())?;
        tracing::info!("record slot at {}", slot.path().display());
        Ok(Self::new(slot))
    }

    fn lock(&self) -> MutexGuard<'_, RecordStore<Box<dyn StorageSlot>>> {
        // A panic mid-request cannot leave a half-written slot behind, so the store is
        // still usable after poisoning.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn list(&self) -> Vec<PatientRecord> {
        self.lock().list()
    }

    pub fn upsert(
        &self,
        uhid: &str,
        name: &str,
        status: OtStatus,
    ) -> StoreResult<Vec<PatientRecord>> {
        self.lock().upsert(uhid, name, status)
    }

    pub fn delete(&self, uhid: &str) -> StoreResult<Vec<PatientRecord>> {
        self.lock().delete(uhid)
    }

    pub fn recent_updates(&self, limit: usize) -> Vec<PatientRecord> {
        self.lock().recent_updates(limit)
    }

    pub fn get(&self, uhid: &str) -> Option<PatientRecord> {
        self.lock().get(uhid)
    }
}

impl std::fmt::Debug for SharedRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedRecordStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slot::{FileSlot, MemorySlot};
    use std::io;
    use tempfile::TempDir;

    fn empty_store() -> RecordStore<MemorySlot> {
        RecordStore::new(MemorySlot::new())
    }

    fn uhids(records: &[PatientRecord]) -> Vec<&str> {
        records.iter().map(|r| r.uhid.as_str()).collect()
    }

    struct BrokenSlot;

    impl StorageSlot for BrokenSlot {
        fn load(&self) -> io::Result<Option<String>> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }

        fn save(&mut self, _contents: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[test]
    fn jane_doe_lifecycle() {
        let mut store = empty_store();
        assert!(store.list().is_empty());

        store
            .upsert("1234", "Jane Doe", OtStatus::Waiting)
            .expect("first upsert");
        let records = store.list();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].uhid, "1234");
        assert_eq!(records[0].name, "Jane Doe");
        assert_eq!(records[0].status, OtStatus::Waiting);

        store
            .upsert("1234", "Jane Doe", OtStatus::Ongoing)
            .expect("second upsert");
        let records = store.list();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, OtStatus::Ongoing);

        let remaining = store.delete("1234").expect("delete");
        assert!(remaining.is_empty());
        assert!(store.list().is_empty());
    }

    #[test]
    fn repeated_upserts_keep_one_record_with_latest_fields() {
        let mut store = empty_store();
        store
            .upsert_at("A1", "First", OtStatus::Waiting, 100)
            .expect("upsert");
        store
            .upsert_at("A1", "Second", OtStatus::Recovery, 200)
            .expect("upsert");
        store
            .upsert_at("A1", "Third", OtStatus::Waiting, 300)
            .expect("upsert");

        let records = store.list();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Third");
        assert_eq!(records[0].status, OtStatus::Waiting);
        assert_eq!(records[0].last_updated, 300);
    }

    #[test]
    fn upsert_grows_only_for_new_uhids_and_keeps_position() {
        let mut store = empty_store();
        let after_a = store.upsert_at("A", "Ann", OtStatus::Waiting, 1).expect("a");
        assert_eq!(after_a.len(), 1);
        let after_b = store.upsert_at("B", "Bob", OtStatus::Waiting, 2).expect("b");
        assert_eq!(after_b.len(), 2);

        let after_edit = store
            .upsert_at("A", "Ann", OtStatus::Anesthesia, 3)
            .expect("edit a");
        assert_eq!(after_edit.len(), 2);
        assert_eq!(uhids(&after_edit), vec!["A", "B"]);
        assert_eq!(after_edit, store.list());
    }

    #[test]
    fn uhid_match_is_exact() {
        let mut store = empty_store();
        store.upsert_at("ab1", "Lower", OtStatus::Waiting, 1).expect("lower");
        store.upsert_at("AB1", "Upper", OtStatus::Waiting, 2).expect("upper");
        assert_eq!(store.list().len(), 2);
    }

    #[test]
    fn deleting_unknown_uhid_is_a_no_op() {
        let mut store = empty_store();
        store.upsert_at("A", "Ann", OtStatus::Waiting, 1).expect("a");
        let before = store.slot().contents().map(str::to_owned);

        let remaining = store.delete("ZZZ").expect("delete");

        assert_eq!(uhids(&remaining), vec!["A"]);
        assert_eq!(store.slot().contents().map(str::to_owned), before);
    }

    #[test]
    fn delete_removes_every_match() {
        let raw = r#"[
            {"uhid":"A","name":"Ann","status":"Pre-Op / Waiting","lastUpdated":1},
            {"uhid":"B","name":"Bob","status":"Surgery Ongoing","lastUpdated":2},
            {"uhid":"A","name":"Ann again","status":"Shifted to OT","lastUpdated":3}
        ]"#;
        let mut store = RecordStore::new(MemorySlot::with_contents(raw));

        let remaining = store.delete("A").expect("delete");

        assert_eq!(uhids(&remaining), vec!["B"]);
        assert!(store.get("A").is_none());
    }

    #[test]
    fn recent_updates_sorts_descending_and_truncates() {
        let mut store = empty_store();
        for (i, uhid) in ["A", "B", "C", "D", "E", "F", "G"].into_iter().enumerate() {
            store
                .upsert_at(uhid, uhid, OtStatus::Waiting, i as i64 * 10)
                .expect("upsert");
        }
        store
            .upsert_at("B", "B", OtStatus::Ongoing, 1_000)
            .expect("touch B");

        let recent = store.recent_updates(5);
        assert_eq!(uhids(&recent), vec!["B", "G", "F", "E", "D"]);
        assert!(recent
            .windows(2)
            .all(|w| w[0].last_updated >= w[1].last_updated));

        assert!(store.recent_updates(0).is_empty());
        assert_eq!(store.recent_updates(100).len(), 7);
    }

    #[test]
    fn re_upserting_identical_values_is_idempotent_in_content() {
        let mut store = empty_store();
        store
            .upsert_at("1234", "Jane Doe", OtStatus::Recovery, 10)
            .expect("upsert");
        let first = store.list();
        store
            .upsert_at("1234", "Jane Doe", OtStatus::Recovery, 20)
            .expect("re-upsert");
        let second = store.list();

        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(second.iter()) {
            assert_eq!((&a.uhid, &a.name, a.status), (&b.uhid, &b.name, b.status));
        }
    }

    #[test]
    fn malformed_slot_reads_as_empty() {
        let store = RecordStore::new(MemorySlot::with_contents("{not json"));
        assert!(store.list().is_empty());
        assert!(store.recent_updates(5).is_empty());

        let wrong_shape = RecordStore::new(MemorySlot::with_contents(r#"{"uhid":"A"}"#));
        assert!(wrong_shape.list().is_empty());
    }

    #[test]
    fn upsert_over_malformed_slot_starts_fresh() {
        let mut store = RecordStore::new(MemorySlot::with_contents("garbage"));
        let records = store
            .upsert_at("A", "Ann", OtStatus::Waiting, 1)
            .expect("upsert");
        assert_eq!(uhids(&records), vec!["A"]);
        assert_eq!(store.slot().backup_contents(), Some("garbage"));
    }

    #[test]
    fn unknown_status_label_is_backed_up_before_overwrite() {
        let raw = r#"[
            {"uhid":"A","name":"Ann","status":"Pre-Op / Waiting","lastUpdated":1},
            {"uhid":"B","name":"Bob","status":"Teleported","lastUpdated":2}
        ]"#;
        let mut store = RecordStore::new(MemorySlot::with_contents(raw));
        assert!(store.list().is_empty());
        assert_eq!(store.slot().backup_contents(), None);

        store
            .upsert_at("C", "Cal", OtStatus::Waiting, 3)
            .expect("upsert");

        assert_eq!(store.slot().backup_contents(), Some(raw));
        assert_eq!(uhids(&store.list()), vec!["C"]);
    }

    #[test]
    fn well_formed_slot_is_never_backed_up() {
        let mut store = empty_store();
        store.upsert_at("A", "Ann", OtStatus::Waiting, 1).expect("a");
        store.upsert_at("A", "Ann", OtStatus::Ongoing, 2).expect("a again");
        assert_eq!(store.slot().backup_contents(), None);
    }

    struct NoBackupSlot {
        contents: String,
    }

    impl StorageSlot for NoBackupSlot {
        fn load(&self) -> io::Result<Option<String>> {
            Ok(Some(self.contents.clone()))
        }

        fn save(&mut self, contents: &str) -> io::Result<()> {
            self.contents = contents.to_owned();
            Ok(())
        }

        fn backup(&mut self, _contents: &str) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "denied"))
        }
    }

    #[test]
    fn failed_backup_leaves_unreadable_slot_in_place() {
        let mut store = RecordStore::new(NoBackupSlot {
            contents: "garbage".into(),
        });

        let err = store
            .upsert("A", "Ann", OtStatus::Waiting)
            .expect_err("backup failure should stop the write");

        assert!(matches!(err, StoreError::SlotBackup(_)));
        assert_eq!(store.slot().contents, "garbage");
    }

    #[test]
    fn file_backed_store_backs_up_unreadable_slot() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("ot_status_records.json");
        std::fs::write(&path, "{truncated").expect("seed slot");

        let mut store = RecordStore::new(FileSlot::new(&path));
        store
            .upsert_at("1234", "Jane Doe", OtStatus::Waiting, 1)
            .expect("upsert");

        let backup = std::fs::read_to_string(temp_dir.path().join("ot_status_records.json.bak"))
            .expect("read backup");
        assert_eq!(backup, "{truncated");
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn unreadable_slot_fails_open_but_write_errors_surface() {
        let mut store = RecordStore::new(BrokenSlot);
        assert!(store.list().is_empty());

        let err = store
            .upsert("A", "Ann", OtStatus::Waiting)
            .expect_err("write should fail");
        assert!(matches!(err, StoreError::SlotWrite(_)));
    }

    #[test]
    fn file_backed_store_persists_across_instances() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("ot_status_records.json");

        let mut store = RecordStore::new(FileSlot::new(&path));
        store
            .upsert_at("1234", "Jane Doe", OtStatus::Ongoing, 42)
            .expect("upsert");

        let reopened = RecordStore::new(FileSlot::new(&path));
        let records = reopened.list();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, OtStatus::Ongoing);
        assert_eq!(records[0].last_updated, 42);

        let raw = std::fs::read_to_string(&path).expect("read slot");
        assert!(raw.contains("\"lastUpdated\":42"));
        assert!(raw.contains("\"status\":\"Surgery Ongoing\""));
    }

    #[test]
    fn upsert_stamps_current_time() {
        let mut store = empty_store();
        let before = Utc::now().timestamp_millis();
        let records = store
            .upsert("1234", "Jane Doe", OtStatus::Waiting)
            .expect("upsert");
        let after = Utc::now().timestamp_millis();

        assert!(records[0].last_updated >= before);
        assert!(records[0].last_updated <= after);
    }

    #[test]
    fn shared_store_opens_configured_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let cfg = CoreConfig::new(
            temp_dir.path().join("data"),
            std::time::Duration::from_secs(10),
        )
        .expect("config");

        let store = SharedRecordStore::open(&cfg).expect("open store");
        store
            .upsert("1234", "Jane Doe", OtStatus::Waiting)
            .expect("upsert");

        assert!(cfg.records_slot_path().is_file());
        assert_eq!(SharedRecordStore::open(&cfg).expect("reopen").list().len(), 1);
    }

    #[test]
    fn shared_store_serialises_concurrent_upserts() {
        let store = SharedRecordStore::new(MemorySlot::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                std::thread::spawn(move || {
                    store
                        .upsert(&format!("P{i}"), "Patient", OtStatus::Waiting)
                        .expect("upsert");
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("thread should finish");
        }

        assert_eq!(store.list().len(), 8);
    }
}
