//! `folio` - backend for a personal portfolio site
//!
//! This library provides feedback intake and its read models (daily
//! summaries and all-time statistics) over a single JSON file, together with
//! the HTTP surface the site's forms talk to.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod feedback;
pub mod logging;
pub mod server;
pub mod service;
pub mod storage;
pub mod summary;

pub use config::Config;
pub use error::{Error, Result};
pub use feedback::{FeedbackRecord, FeedbackSubmission, FeedbackType};
pub use logging::init_logging;
pub use server::{build_router, AppState};
pub use service::FeedbackService;
pub use storage::{FeedbackStore, JsonFileStore};
pub use summary::{DailySummary, Stats, TypeCounts};
