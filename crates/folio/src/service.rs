//! Feedback intake and read operations.
//!
//! [`FeedbackService`] is the one place that touches the store. Submissions
//! are serialized behind an async mutex so that the read-modify-write cycle
//! on the store never interleaves within a process.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::error::Result;
use crate::feedback::{generate_id, FeedbackRecord, FeedbackSubmission};
use crate::storage::FeedbackStore;
use crate::summary::{self, DailySummary, Stats};

/// Feedback operations over a shared store.
///
/// Cheap to clone; clones share the store and the write lock.
#[derive(Debug, Clone)]
pub struct FeedbackService {
    store: Arc<dyn FeedbackStore>,
    write_lock: Arc<Mutex<()>>,
}

impl FeedbackService {
    /// Create a service over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn FeedbackStore>) -> Self {
        Self {
            store,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Validate and persist a submission, returning the new record.
    ///
    /// Validation happens before any I/O. The record's `submittedAt` never
    /// goes backwards relative to the last stored record, even if the clock
    /// does. A failure to mirror the record into the daily log is logged
    /// and otherwise ignored.
    ///
    /// # Errors
    ///
    /// Returns a validation error for an incomplete submission, or a
    /// storage error if the store could not be read or rewritten. Nothing
    /// is written when the store cannot be read.
    pub async fn submit(&self, submission: FeedbackSubmission) -> Result<FeedbackRecord> {
        submission.validate()?;

        let _guard = self.write_lock.lock().await;
        let records = self.store.read_all().await?;

        let now = match latest_submission(&records) {
            Some(last) => Utc::now().max(last),
            None => Utc::now(),
        };
        let existing: HashSet<&str> = records.iter().map(|r| r.id.as_str()).collect();
        let mut id = generate_id(now);
        while existing.contains(id.as_str()) {
            id = generate_id(now);
        }

        let record = FeedbackRecord::from_submission(submission, id, now)?;
        self.store.append(&record).await?;

        if let Err(e) = self.store.append_daily_log(&record).await {
            warn!("Failed to append daily log for {}: {e}", record.id);
        }

        info!(
            id = %record.id,
            feedback_type = %record.feedback_type,
            "Feedback received from {} ({})",
            record.name,
            record.email
        );
        Ok(record)
    }

    /// Every stored record, in append order.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read.
    pub async fn all(&self) -> Result<Vec<FeedbackRecord>> {
        self.store.read_all().await
    }

    /// Summary of the records submitted on `date`, or today (UTC) if `None`.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read.
    pub async fn summary(&self, date: Option<NaiveDate>) -> Result<DailySummary> {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let records = self.store.read_all().await?;
        Ok(summary::summarize_day(&records, date))
    }

    /// All-time statistics.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the store cannot be read.
    pub async fn stats(&self) -> Result<Stats> {
        let records = self.store.read_all().await?;
        Ok(summary::stats(&records))
    }
}

/// Submission time of the most recently appended record that has one.
fn latest_submission(records: &[FeedbackRecord]) -> Option<DateTime<Utc>> {
    records.iter().rev().find_map(FeedbackRecord::submitted_at_utc)
}
