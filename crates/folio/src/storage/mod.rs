//! Storage layer for folio.
//!
//! Feedback lives in a single pretty-printed JSON array on disk. The whole
//! array is read on every request and rewritten on every submission; each
//! accepted submission is also mirrored to a per-day plain-text log.
//!
//! Entries that do not decode as a [`FeedbackRecord`] (written by an older
//! backend, or edited by hand) are left out of reads but kept in the file
//! when a new record is appended.

pub mod daily_log;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::feedback::FeedbackRecord;

/// File name of the JSON store inside the feedback directory.
pub const STORE_FILE_NAME: &str = "feedback.json";

/// Suffix of the scratch file a new store is written to before it replaces
/// the live one.
const TEMP_SUFFIX: &str = "tmp";

/// Persistence for feedback records.
///
/// Implementors hold the full ordered list of records. Append order is the
/// order records were accepted in.
#[async_trait]
pub trait FeedbackStore: Send + Sync + std::fmt::Debug {
    /// Load every stored record.
    ///
    /// A store that does not exist yet loads as empty.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreRead`] if the store exists but cannot be read,
    /// and [`Error::Json`] if its content is not a JSON array.
    async fn load(&self) -> Result<Vec<FeedbackRecord>>;

    /// Replace the stored records with `records`.
    ///
    /// # Errors
    ///
    /// Returns an error if the records cannot be persisted. The previous
    /// content is left intact in that case.
    async fn write_all(&self, records: &[FeedbackRecord]) -> Result<()>;

    /// Mirror `record` into the human-readable daily log.
    ///
    /// # Errors
    ///
    /// Returns an error if the log cannot be appended to.
    async fn append_daily_log(&self, record: &FeedbackRecord) -> Result<()>;

    /// Load every stored record, treating malformed content as an empty
    /// store.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StoreRead`] if the store cannot be read at all.
    async fn read_all(&self) -> Result<Vec<FeedbackRecord>> {
        match self.load().await {
            Ok(records) => Ok(records),
            Err(Error::Json(e)) => {
                warn!("Treating malformed feedback store as empty: {e}");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    /// Add `record` after the stored records.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read or rewritten. Nothing
    /// is written in that case.
    async fn append(&self, record: &FeedbackRecord) -> Result<()> {
        let mut records = self.read_all().await?;
        records.push(record.clone());
        self.write_all(&records).await
    }
}

/// JSON-file backed feedback store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    /// Directory holding the store and the daily logs.
    dir: PathBuf,
    /// Path to the JSON store.
    path: PathBuf,
    /// Whether submissions are mirrored to daily logs.
    daily_log: bool,
}

impl JsonFileStore {
    /// Point at the store in `dir` without touching the file system.
    ///
    /// Reads of a store that does not exist yet return no records.
    #[must_use]
    pub fn new(dir: impl AsRef<Path>, daily_log: bool) -> Self {
        let dir = dir.as_ref().to_path_buf();
        let path = dir.join(STORE_FILE_NAME);
        Self {
            dir,
            path,
            daily_log,
        }
    }

    /// Open the store in `dir` for writing.
    ///
    /// Creates the directory if it doesn't exist and initializes an empty
    /// store file if there is none yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory or the initial store file cannot
    /// be created.
    pub fn open(dir: impl AsRef<Path>, daily_log: bool) -> Result<Self> {
        let store = Self::new(dir, daily_log);

        if !store.dir.exists() {
            std::fs::create_dir_all(&store.dir).map_err(|source| Error::DirectoryCreate {
                path: store.dir.clone(),
                source,
            })?;
        }

        if !store.path.exists() {
            debug!("Initializing empty feedback store at {}", store.path.display());
            std::fs::write(&store.path, "[]").map_err(|source| Error::StoreWrite {
                path: store.path.clone(),
                source,
            })?;
        }

        info!("Feedback store opened at {}", store.path.display());
        Ok(store)
    }

    /// Get the path to the JSON store.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the directory holding the store and daily logs.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".");
        name.push(TEMP_SUFFIX);
        PathBuf::from(name)
    }

    /// Raw store content, or `None` when the file is missing or blank.
    async fn read_raw(&self) -> Result<Option<String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(data) if data.trim().is_empty() => Ok(None),
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(Error::StoreRead {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Every entry of the stored array, decodable or not.
    async fn load_entries(&self) -> Result<Vec<Value>> {
        match self.read_raw().await? {
            Some(data) => Ok(serde_json::from_str(&data)?),
            None => Ok(Vec::new()),
        }
    }

    /// Write `value` to the scratch file, then move it over the store.
    async fn replace<T: Serialize + Sync + ?Sized>(&self, value: &T) -> Result<()> {
        let data = serde_json::to_string_pretty(value)?;
        let temp = self.temp_path();

        tokio::fs::write(&temp, data)
            .await
            .map_err(|source| Error::StoreWrite {
                path: temp.clone(),
                source,
            })?;

        if let Err(source) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(Error::StoreWrite {
                path: self.path.clone(),
                source,
            });
        }
        Ok(())
    }
}

/// Decode each entry on its own, skipping the ones that are not records.
fn decode_entries(entries: Vec<Value>) -> Vec<FeedbackRecord> {
    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping undecodable feedback entry #{index}: {e}");
                None
            }
        })
        .collect()
}

#[async_trait]
impl FeedbackStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<FeedbackRecord>> {
        let entries = self.load_entries().await?;
        Ok(decode_entries(entries))
    }

    async fn write_all(&self, records: &[FeedbackRecord]) -> Result<()> {
        self.replace(records).await?;
        debug!("Wrote {} feedback records", records.len());
        Ok(())
    }

    async fn append(&self, record: &FeedbackRecord) -> Result<()> {
        let mut entries = match self.load_entries().await {
            Ok(entries) => entries,
            Err(Error::Json(e)) => {
                warn!("Replacing malformed feedback store: {e}");
                Vec::new()
            }
            Err(e) => return Err(e),
        };
        entries.push(serde_json::to_value(record)?);
        self.replace(&entries).await?;
        debug!("Appended {}; store holds {} entries", record.id, entries.len());
        Ok(())
    }

    async fn append_daily_log(&self, record: &FeedbackRecord) -> Result<()> {
        if !self.daily_log {
            return Ok(());
        }

        let date = record
            .submitted_date()
            .unwrap_or_else(|| Utc::now().date_naive());
        let path = self.dir.join(daily_log::file_name(date));
        let entry = daily_log::format_entry(record);

        let append = async {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .await?;
            file.write_all(entry.as_bytes()).await?;
            file.flush().await
        };

        append
            .await
            .map_err(|source| Error::DailyLog { path, source })
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::FeedbackType;

    fn create_test_record(id: &str, submitted_at: &str) -> FeedbackRecord {
        FeedbackRecord {
            id: id.to_string(),
            name: "Test".to_string(),
            email: "test@example.com".to_string(),
            linkedin: None,
            feedback_type: FeedbackType::Other,
            message: format!("message for {id}"),
            timestamp: submitted_at.to_string(),
            user_agent: None,
            page_url: None,
            submitted_at: submitted_at.to_string(),
        }
    }

    fn create_test_store() -> (tempfile::TempDir, JsonFileStore) {
        crate::logging::init_test_logging();
        let dir = tempfile::tempdir().expect("failed to create temp dir");
        let store = JsonFileStore::open(dir.path(), true).expect("failed to open store");
        (dir, store)
    }

    #[test]
    fn test_open_creates_dir_and_empty_store() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("nested").join("feedback");

        let store = JsonFileStore::open(&nested, true).unwrap();

        assert!(nested.is_dir());
        assert_eq!(store.path(), nested.join(STORE_FILE_NAME));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "[]");
    }

    #[test]
    fn test_open_keeps_existing_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE_NAME);
        std::fs::write(&path, "[ ]").unwrap();

        JsonFileStore::open(dir.path(), true).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[ ]");
    }

    #[tokio::test]
    async fn test_write_then_read() {
        let (_dir, store) = create_test_store();
        let records = vec![
            create_test_record("a", "2025-01-01T00:00:00.000Z"),
            create_test_record("b", "2025-01-01T00:00:01.000Z"),
        ];

        store.write_all(&records).await.unwrap();

        assert_eq!(store.read_all().await.unwrap(), records);
    }

    #[tokio::test]
    async fn test_read_missing_file_is_empty() {
        let (_dir, store) = create_test_store();
        std::fs::remove_file(store.path()).unwrap();

        assert!(store.load().await.unwrap().is_empty());
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_empty_file_is_empty() {
        let (_dir, store) = create_test_store();
        std::fs::write(store.path(), "").unwrap();

        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_malformed_file_is_empty() {
        let (_dir, store) = create_test_store();
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(store.load().await.is_err());
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_round_trip_is_noop() {
        let (_dir, store) = create_test_store();
        let records = vec![
            create_test_record("a", "2025-01-01T00:00:00.000Z"),
            create_test_record("b", "2025-01-02T08:15:00.123Z"),
        ];
        store.write_all(&records).await.unwrap();
        let before = std::fs::read_to_string(store.path()).unwrap();

        let loaded = store.read_all().await.unwrap();
        store.write_all(&loaded).await.unwrap();

        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), before);
    }

    #[tokio::test]
    async fn test_write_leaves_no_temp_file() {
        let (_dir, store) = create_test_store();
        store
            .write_all(&[create_test_record("a", "2025-01-01T00:00:00.000Z")])
            .await
            .unwrap();

        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_write_is_pretty_printed() {
        let (_dir, store) = create_test_store();
        store
            .write_all(&[create_test_record("a", "2025-01-01T00:00:00.000Z")])
            .await
            .unwrap();

        let data = std::fs::read_to_string(store.path()).unwrap();
        assert!(data.starts_with("[\n  {\n    \"id\": \"a\""));
        assert!(data.contains("\"submittedAt\": \"2025-01-01T00:00:00.000Z\""));
    }

    #[tokio::test]
    async fn test_write_failure_is_store_error() {
        let (_dir, store) = create_test_store();
        // A directory where the scratch file should go makes the write fail.
        std::fs::create_dir(store.temp_path()).unwrap();

        let err = store
            .write_all(&[create_test_record("a", "2025-01-01T00:00:00.000Z")])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::StoreWrite { .. }));
        assert_eq!(std::fs::read_to_string(store.path()).unwrap(), "[]");
    }

    #[tokio::test]
    async fn test_append_daily_log() {
        let (dir, store) = create_test_store();
        let first = create_test_record("a", "2025-01-01T10:00:00.000Z");
        let second = create_test_record("b", "2025-01-01T11:00:00.000Z");

        store.append_daily_log(&first).await.unwrap();
        store.append_daily_log(&second).await.unwrap();

        let log = std::fs::read_to_string(dir.path().join("feedback_2025-01-01.txt")).unwrap();
        assert!(log.contains("Feedback ID: a"));
        assert!(log.contains("Feedback ID: b"));
        assert!(log.find("Feedback ID: a") < log.find("Feedback ID: b"));
    }

    #[tokio::test]
    async fn test_daily_log_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path(), false).unwrap();

        store
            .append_daily_log(&create_test_record("a", "2025-01-01T10:00:00.000Z"))
            .await
            .unwrap();

        assert!(!dir.path().join("feedback_2025-01-01.txt").exists());
    }

    #[tokio::test]
    async fn test_daily_log_failure_is_reported() {
        let (dir, store) = create_test_store();
        std::fs::create_dir(dir.path().join("feedback_2025-01-01.txt")).unwrap();

        let err = store
            .append_daily_log(&create_test_record("a", "2025-01-01T10:00:00.000Z"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::DailyLog { .. }));
    }

    #[test]
    fn test_new_does_not_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not-yet");

        let store = JsonFileStore::new(&missing, true);

        assert_eq!(store.path(), missing.join(STORE_FILE_NAME));
        assert!(!missing.exists());
    }

    #[tokio::test]
    async fn test_new_reads_missing_dir_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not-yet");
        let store = JsonFileStore::new(&missing, true);

        assert!(store.read_all().await.unwrap().is_empty());
        assert!(!missing.exists());
    }

    #[tokio::test]
    async fn test_unreadable_store_is_an_error() {
        let (_dir, store) = create_test_store();
        // A directory in place of the file cannot be read as text.
        std::fs::remove_file(store.path()).unwrap();
        std::fs::create_dir(store.path()).unwrap();

        let err = store.read_all().await.unwrap_err();
        assert!(matches!(err, Error::StoreRead { .. }));

        let err = store
            .append(&create_test_record("a", "2025-01-01T00:00:00.000Z"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::StoreRead { .. }));
        assert!(store.path().is_dir());
    }

    #[tokio::test]
    async fn test_undecodable_entries_are_skipped_on_read() {
        let (_dir, store) = create_test_store();
        let keep = create_test_record("keep", "2025-01-01T00:00:00.000Z");
        let mut odd = serde_json::to_value(&keep).unwrap();
        odd["id"] = "odd".into();
        odd["type"] = "question".into();
        let data = serde_json::to_string_pretty(&vec![serde_json::to_value(&keep).unwrap(), odd])
            .unwrap();
        std::fs::write(store.path(), data).unwrap();

        assert_eq!(store.read_all().await.unwrap(), vec![keep]);
    }

    #[tokio::test]
    async fn test_append_keeps_undecodable_entries() {
        let (_dir, store) = create_test_store();
        let keep = create_test_record("keep", "2025-01-01T00:00:00.000Z");
        let mut odd = serde_json::to_value(&keep).unwrap();
        odd["id"] = "odd".into();
        odd["type"] = "question".into();
        odd["legacyField"] = 7.into();
        let data = serde_json::to_string_pretty(&vec![serde_json::to_value(&keep).unwrap(), odd.clone()])
            .unwrap();
        std::fs::write(store.path(), data).unwrap();

        let added = create_test_record("new", "2025-01-02T00:00:00.000Z");
        store.append(&added).await.unwrap();

        let raw: Vec<Value> =
            serde_json::from_str(&std::fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw.len(), 3);
        assert_eq!(raw[1], odd);
        assert_eq!(raw[2]["id"], "new");
        assert_eq!(store.read_all().await.unwrap(), vec![keep, added]);
    }

    #[tokio::test]
    async fn test_append_matches_full_rewrite() {
        let (_dir, store) = create_test_store();
        let expected_dir = tempfile::tempdir().unwrap();
        let expected = JsonFileStore::open(expected_dir.path(), false).unwrap();
        let first = create_test_record("a", "2025-01-01T00:00:00.000Z");
        let second = create_test_record("b", "2025-01-01T00:00:01.000Z");

        store.write_all(&[first.clone()]).await.unwrap();
        store.append(&second).await.unwrap();
        expected.write_all(&[first, second]).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(store.path()).unwrap(),
            std::fs::read_to_string(expected.path()).unwrap()
        );
    }

    #[tokio::test]
    async fn test_append_replaces_malformed_store() {
        let (_dir, store) = create_test_store();
        std::fs::write(store.path(), "{ not json").unwrap();

        let record = create_test_record("a", "2025-01-01T00:00:00.000Z");
        store.append(&record).await.unwrap();

        assert_eq!(store.read_all().await.unwrap(), vec![record]);
    }
}
