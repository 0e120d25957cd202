//! Plain-text daily log format.
//!
//! Every accepted submission is mirrored into `feedback_<YYYY-MM-DD>.txt`
//! for manual inspection. The JSON store stays the source of truth; these
//! files are never read back.

use chrono::NaiveDate;

use crate::feedback::FeedbackRecord;

/// Width of the separator rules framing each entry.
const RULE_WIDTH: usize = 80;

/// Placeholder for optional fields the visitor left blank.
const NOT_AVAILABLE: &str = "N/A";

/// File name of the daily log for `date`.
#[must_use]
pub fn file_name(date: NaiveDate) -> String {
    format!("feedback_{}.txt", date.format("%Y-%m-%d"))
}

/// Render one log entry for `record`.
#[must_use]
pub fn format_entry(record: &FeedbackRecord) -> String {
    let heavy = "=".repeat(RULE_WIDTH);
    let light = "-".repeat(RULE_WIDTH);
    let or_na = |value: &Option<String>| value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string());

    format!(
        "\n{heavy}\n\
         Feedback ID: {id}\n\
         Date/Time: {submitted_at}\n\
         Type: {feedback_type}\n\
         {light}\n\
         Name: {name}\n\
         Email: {email}\n\
         LinkedIn: {linkedin}\n\
         Page: {page}\n\
         User Agent: {user_agent}\n\
         {light}\n\
         Message:\n\
         {message}\n\
         {heavy}\n\n",
        id = record.id,
        submitted_at = record.submitted_at,
        feedback_type = record.feedback_type,
        name = record.name,
        email = record.email,
        linkedin = or_na(&record.linkedin),
        page = or_na(&record.page_url),
        user_agent = or_na(&record.user_agent),
        message = record.message,
    )
}
