//! Core feedback types for folio.
//!
//! This module defines the record persisted for every feedback submission,
//! the raw payload accepted from the site's feedback form, and the
//! validation that turns one into the other.

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Prefix shared by every generated feedback id.
const ID_PREFIX: &str = "feedback";

/// Length of the random suffix appended to generated ids.
const ID_SUFFIX_LEN: usize = 9;

/// The category a visitor picked when leaving feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackType {
    /// Something on the site is broken.
    Bug,
    /// A request for something new.
    Feature,
    /// Something the visitor disliked.
    Complaint,
    /// Something the visitor liked.
    Praise,
    /// Anything else.
    Other,
}

impl FeedbackType {
    /// Every feedback type, in the order buckets are reported.
    pub const ALL: [FeedbackType; 5] = [
        Self::Bug,
        Self::Feature,
        Self::Complaint,
        Self::Praise,
        Self::Other,
    ];

    /// The wire name of this type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bug => "bug",
            Self::Feature => "feature",
            Self::Complaint => "complaint",
            Self::Praise => "praise",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for FeedbackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FeedbackType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::invalid_feedback_type(s))
    }
}

/// A stored feedback submission.
///
/// Records are created once, on submission, and never updated. Timestamps
/// are kept as the ISO-8601 strings they were written with so that a
/// read-then-write of the store leaves its content untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    /// Unique identifier, `feedback_<millis>_<suffix>`.
    pub id: String,

    /// Visitor name.
    pub name: String,

    /// Visitor email address. Not format-checked.
    pub email: String,

    /// Optional `LinkedIn` profile URL.
    pub linkedin: Option<String>,

    /// The feedback category.
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,

    /// The feedback body.
    pub message: String,

    /// Client-supplied time of submission. Informational only.
    pub timestamp: String,

    /// Browser user agent reported by the form.
    pub user_agent: Option<String>,

    /// Page the form was submitted from.
    pub page_url: Option<String>,

    /// Server-assigned submission time; authoritative for ordering and
    /// date bucketing.
    pub submitted_at: String,
}

impl FeedbackRecord {
    /// Build a record from a submission, assigning the given id and
    /// submission time.
    ///
    /// # Errors
    ///
    /// Returns a validation error if a required field is missing or empty,
    /// or if the feedback type is not one of the known values.
    pub fn from_submission(
        submission: FeedbackSubmission,
        id: String,
        submitted_at: DateTime<Utc>,
    ) -> Result<Self> {
        let feedback_type = submission.validate()?;
        let submitted_at = format_timestamp(submitted_at);

        let FeedbackSubmission {
            name,
            email,
            linkedin,
            message,
            timestamp,
            user_agent,
            page_url,
            ..
        } = submission;

        Ok(Self {
            id,
            name: name.unwrap_or_default(),
            email: email.unwrap_or_default(),
            linkedin: non_empty(linkedin),
            feedback_type,
            message: message.unwrap_or_default(),
            timestamp: non_empty(timestamp).unwrap_or_else(|| submitted_at.clone()),
            user_agent: non_empty(user_agent),
            page_url: non_empty(page_url),
            submitted_at,
        })
    }

    /// `submitted_at` as a UTC instant, if it is RFC 3339.
    #[must_use]
    pub fn submitted_at_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.submitted_at)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// The UTC calendar day this record was submitted on.
    ///
    /// Falls back to the leading `YYYY-MM-DD` of `submitted_at` when the
    /// full timestamp is not RFC 3339.
    #[must_use]
    pub fn submitted_date(&self) -> Option<NaiveDate> {
        if let Some(dt) = self.submitted_at_utc() {
            return Some(dt.date_naive());
        }
        self.submitted_at
            .get(..10)
            .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
    }
}

/// The raw payload posted by the feedback form.
///
/// Every field is optional here so that a missing field is reported as a
/// validation failure rather than a malformed body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackSubmission {
    /// Visitor name.
    pub name: Option<String>,
    /// Visitor email address.
    pub email: Option<String>,
    /// Optional `LinkedIn` profile URL.
    pub linkedin: Option<String>,
    /// Feedback category, as its wire name.
    #[serde(rename = "type")]
    pub feedback_type: Option<String>,
    /// The feedback body.
    pub message: Option<String>,
    /// Client-side submission time.
    pub timestamp: Option<String>,
    /// Browser user agent.
    pub user_agent: Option<String>,
    /// Page the form was submitted from.
    pub page_url: Option<String>,
}

impl FeedbackSubmission {
    /// Check required fields and parse the feedback type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingFields`] if `name`, `email`, `type` or
    /// `message` is missing or empty, and [`Error::InvalidFeedbackType`] if
    /// `type` is not a known value.
    pub fn validate(&self) -> Result<FeedbackType> {
        let missing: Vec<&'static str> = [
            ("name", &self.name),
            ("email", &self.email),
            ("type", &self.feedback_type),
            ("message", &self.message),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().map_or(true, str::is_empty))
        .map(|(field, _)| field)
        .collect();

        if !missing.is_empty() {
            return Err(Error::MissingFields { fields: missing });
        }

        self.feedback_type.as_deref().unwrap_or_default().parse()
    }
}

/// Generate a record id for a submission made at `now`.
#[must_use]
pub fn generate_id(now: DateTime<Utc>) -> String {
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(ID_SUFFIX_LEN)
        .collect();
    format!("{ID_PREFIX}_{}_{suffix}", now.timestamp_millis())
}

/// Format a timestamp the way it is stored: UTC, millisecond precision,
/// `Z` suffix.
#[must_use]
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
