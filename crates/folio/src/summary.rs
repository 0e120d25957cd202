//! Read models computed over the stored feedback.
//!
//! Both views work on the in-memory list returned by the store. "Recent"
//! always means position in append order; `submittedAt` is never re-sorted.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::feedback::{FeedbackRecord, FeedbackType};

/// Maximum number of characters of a message echoed in a daily summary.
pub const PREVIEW_LENGTH: usize = 100;

/// Number of records returned in [`Stats::recent`].
pub const RECENT_LIMIT: usize = 10;

/// Marker appended to truncated messages.
const ELLIPSIS: &str = "...";

/// Record counts per feedback type. Every bucket is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCounts {
    /// Bug reports.
    pub bug: usize,
    /// Feature requests.
    pub feature: usize,
    /// Complaints.
    pub complaint: usize,
    /// Praise.
    pub praise: usize,
    /// Everything else.
    pub other: usize,
}

impl TypeCounts {
    /// Count the records in `records` by type.
    pub fn tally<'a>(records: impl IntoIterator<Item = &'a FeedbackRecord>) -> Self {
        let mut counts = Self::default();
        for record in records {
            counts.increment(record.feedback_type);
        }
        counts
    }

    /// Add one to the bucket for `feedback_type`.
    pub fn increment(&mut self, feedback_type: FeedbackType) {
        let bucket = match feedback_type {
            FeedbackType::Bug => &mut self.bug,
            FeedbackType::Feature => &mut self.feature,
            FeedbackType::Complaint => &mut self.complaint,
            FeedbackType::Praise => &mut self.praise,
            FeedbackType::Other => &mut self.other,
        };
        *bucket += 1;
    }

    /// The count for `feedback_type`.
    #[must_use]
    pub fn get(&self, feedback_type: FeedbackType) -> usize {
        match feedback_type {
            FeedbackType::Bug => self.bug,
            FeedbackType::Feature => self.feature,
            FeedbackType::Complaint => self.complaint,
            FeedbackType::Praise => self.praise,
            FeedbackType::Other => self.other,
        }
    }

    /// Sum over all buckets.
    #[must_use]
    pub fn total(&self) -> usize {
        self.bug + self.feature + self.complaint + self.praise + self.other
    }
}

/// A shortened view of a record, as listed in a daily summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackPreview {
    /// Record id.
    pub id: String,
    /// Visitor name.
    pub name: String,
    /// Visitor email.
    pub email: String,
    /// Feedback category.
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,
    /// Message, truncated to [`PREVIEW_LENGTH`] characters.
    pub message: String,
    /// The record's server-assigned submission time.
    pub timestamp: String,
}

impl From<&FeedbackRecord> for FeedbackPreview {
    fn from(record: &FeedbackRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            email: record.email.clone(),
            feedback_type: record.feedback_type,
            message: truncate_message(&record.message, PREVIEW_LENGTH),
            timestamp: record.submitted_at.clone(),
        }
    }
}

/// Feedback received on one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailySummary {
    /// The day summarized, `YYYY-MM-DD`.
    pub date: String,
    /// Number of records submitted that day.
    pub total_count: usize,
    /// Per-type breakdown for the day.
    pub by_type: TypeCounts,
    /// The day's records, in append order.
    pub feedback: Vec<FeedbackPreview>,
}

/// All-time statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    /// Number of records in the store.
    pub total: usize,
    /// Per-type breakdown.
    pub by_type: TypeCounts,
    /// Up to [`RECENT_LIMIT`] records, most recent first.
    pub recent: Vec<FeedbackRecord>,
}

/// Summarize the records submitted on `date`.
#[must_use]
pub fn summarize_day(records: &[FeedbackRecord], date: NaiveDate) -> DailySummary {
    let matching: Vec<&FeedbackRecord> = records
        .iter()
        .filter(|record| record.submitted_date() == Some(date))
        .collect();

    DailySummary {
        date: date.format("%Y-%m-%d").to_string(),
        total_count: matching.len(),
        by_type: TypeCounts::tally(matching.iter().copied()),
        feedback: matching.into_iter().map(FeedbackPreview::from).collect(),
    }
}

/// Compute all-time statistics.
#[must_use]
pub fn stats(records: &[FeedbackRecord]) -> Stats {
    Stats {
        total: records.len(),
        by_type: TypeCounts::tally(records),
        recent: records.iter().rev().take(RECENT_LIMIT).cloned().collect(),
    }
}

/// Cap `message` at `max_chars` characters, appending an ellipsis if
/// anything was cut.
#[must_use]
pub fn truncate_message(message: &str, max_chars: usize) -> String {
    match message.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{ELLIPSIS}", &message[..cut]),
        None => message.to_string(),
    }
}
