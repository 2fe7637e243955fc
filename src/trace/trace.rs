use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::backend::backend_model::SaveResponse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    FormBuilt,
    ConfigLoaded,
    SaveRequested,
    SaveCompleted,
    SaveRejected,
    SaveFailed,
}

#[derive(Debug, Serialize)]
pub struct FormEvent {
    pub timestamp_ms: u128,
    pub kind: EventKind,

    pub count: Option<usize>,
    pub paths: Vec<String>,

    pub errors: Vec<String>,
    pub warnings: Vec<String>,

    pub reason: Option<String>,
}

impl FormEvent {
    pub fn now(kind: EventKind) -> Self {
        Self {
            timestamp_ms: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or_default(),
            kind,
            count: None,
            paths: vec![],
            errors: vec![],
            warnings: vec![],
            reason: None,
        }
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        self.paths = paths.into_iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_response(mut self, response: &SaveResponse) -> Self {
        self.errors = response.errors.clone();
        self.warnings = response.warnings.clone();
        self.reason = response.reason.clone();
        self
    }

    pub fn with_reason(mut self, reason: impl ToString) -> Self {
        self.reason = Some(reason.to_string());
        self
    }
}
