use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path::codec::FlatConfig;

/// Request body posted to the `/ajax/` endpoint, discriminated by `request`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum BackendRequest {
    /// Fetch the current configuration object (may be null)
    GetCfg,

    /// Validate and store a flat `path -> value` mapping
    SaveCfg { cfgdata: FlatConfig },
}

impl BackendRequest {
    pub fn name(&self) -> &'static str {
        match self {
            BackendRequest::GetCfg => "get_cfg",
            BackendRequest::SaveCfg { .. } => "save_cfg",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveStatus {
    Ok,
    #[serde(alias = "failed")]
    Error,
}

/// Answer to `save_cfg`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub status: SaveStatus,

    /// Canonical nested configuration as stored by the backend
    #[serde(default)]
    pub cfg: Option<Value>,

    #[serde(default)]
    pub errors: Vec<String>,

    #[serde(default)]
    pub warnings: Vec<String>,

    /// Set when the backend crashed while handling the request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SaveResponse {
    pub fn is_ok(&self) -> bool {
        self.status == SaveStatus::Ok
    }
}
