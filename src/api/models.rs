use serde::Serialize;

use crate::observability::MetricsSnapshot;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub converters: usize,
    pub metrics: MetricsSnapshot,
}

/// Demo resource served in several representations.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub id: u32,
    pub title: String,
    pub body: String,
}

impl Article {
    pub fn new(id: u32, title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            body: body.into(),
        }
    }
}
