use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::extract::Payload;
use super::AppState;
use crate::error::Error;
use crate::feedback::{format_timestamp, FeedbackRecord, FeedbackSubmission};
use crate::summary::{DailySummary, Stats};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    success: bool,
    message: &'static str,
    feedback_id: String,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    success: bool,
    summary: DailySummary,
}

#[derive(Serialize)]
pub struct AllResponse {
    success: bool,
    count: usize,
    feedback: Vec<FeedbackRecord>,
}

#[derive(Serialize)]
pub struct StatsResponse {
    success: bool,
    stats: Stats,
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    timestamp: String,
    environment: String,
}

#[derive(Serialize)]
pub struct Ack {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
pub struct SummaryQuery {
    date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContactMessage {
    name: Option<String>,
    email: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnalyticsEvent {
    event: Option<String>,
    data: Option<serde_json::Value>,
}

pub async fn submit_feedback(
    State(state): State<AppState>,
    Payload(submission): Payload<FeedbackSubmission>,
) -> Result<Json<SubmitResponse>, ApiError> {
    let record = state
        .service
        .submit(submission)
        .await
        .map_err(|e| ApiError::from_service("Error submitting feedback", e))?;

    Ok(Json(SubmitResponse {
        success: true,
        message: "Feedback submitted successfully",
        feedback_id: record.id,
    }))
}

pub async fn feedback_summary(
    State(state): State<AppState>,
    query: Result<Query<SummaryQuery>, QueryRejection>,
) -> Result<Json<SummaryResponse>, ApiError> {
    let Query(query) = query?;
    let date = match query.date.as_deref().filter(|d| !d.is_empty()) {
        Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            ApiError::from_service(
                "Error generating summary",
                Error::InvalidDate {
                    value: raw.to_string(),
                },
            )
        })?),
        None => None,
    };

    let summary = state
        .service
        .summary(date)
        .await
        .map_err(|e| ApiError::from_service("Error generating summary", e))?;
    Ok(Json(SummaryResponse {
        success: true,
        summary,
    }))
}

pub async fn all_feedback(State(state): State<AppState>) -> Result<Json<AllResponse>, ApiError> {
    let feedback = state
        .service
        .all()
        .await
        .map_err(|e| ApiError::from_service("Error fetching feedback", e))?;
    Ok(Json(AllResponse {
        success: true,
        count: feedback.len(),
        feedback,
    }))
}

pub async fn feedback_stats(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, ApiError> {
    let stats = state
        .service
        .stats()
        .await
        .map_err(|e| ApiError::from_service("Error fetching stats", e))?;
    Ok(Json(StatsResponse {
        success: true,
        stats,
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: format_timestamp(Utc::now()),
        environment: state.environment.to_string(),
    })
}

pub async fn contact(Payload(contact): Payload<ContactMessage>) -> Json<Ack> {
    tracing::info!(
        name = contact.name.as_deref().unwrap_or_default(),
        email = contact.email.as_deref().unwrap_or_default(),
        message = contact.message.as_deref().unwrap_or_default(),
        "Contact form submission"
    );

    Json(Ack {
        success: true,
        message: Some("Message received successfully"),
    })
}

pub async fn analytics(Payload(event): Payload<AnalyticsEvent>) -> Json<Ack> {
    tracing::info!(
        event = event.event.as_deref().unwrap_or_default(),
        data = ?event.data,
        "Analytics event"
    );

    Json(Ack {
        success: true,
        message: None,
    })
}
