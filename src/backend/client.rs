use log::{debug, info};
use serde_json::Value;

use crate::backend::backend_model::{BackendRequest, SaveResponse};
use crate::backend::error::BackendError;
use crate::path::codec::FlatConfig;

/// The two calls the configuration form makes against the pipeline backend.
pub trait ConfigBackend {
    /// Current configuration object, `None` when the backend has none.
    fn get_cfg(&self) -> Result<Option<Value>, BackendError>;

    /// Submit a flat mapping for validation and storage.
    fn save_cfg(&self, cfgdata: &FlatConfig) -> Result<SaveResponse, BackendError>;
}

// ============================================================================
// HTTP Backend
// ============================================================================

pub const DEFAULT_ENDPOINT: &str = "http://localhost:43254/ajax/";

/// Talks to the `/ajax/` endpoint: one POST per request, JSON body in the
/// `data` form field, JSON answer.
pub struct HttpBackend {
    pub endpoint: String,
    client: reqwest::blocking::Client,
}

impl Default for HttpBackend {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl HttpBackend {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    fn call(&self, request: &BackendRequest) -> Result<String, BackendError> {
        let name = request.name();
        let data = serde_json::to_string(request).map_err(|source| BackendError::JsonSerialize {
            context: name.to_string(),
            source,
        })?;

        debug!("POST {} ({})", self.endpoint, name);
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("data", data)])
            .send()
            .map_err(|source| BackendError::Transport {
                request: name.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::HttpStatus {
                request: name.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().map_err(|source| BackendError::Transport {
            request: name.to_string(),
            source,
        })
    }
}

impl ConfigBackend for HttpBackend {
    fn get_cfg(&self) -> Result<Option<Value>, BackendError> {
        let body = self.call(&BackendRequest::GetCfg)?;
        parse_current_config(&body)
    }

    fn save_cfg(&self, cfgdata: &FlatConfig) -> Result<SaveResponse, BackendError> {
        let body = self.call(&BackendRequest::SaveCfg {
            cfgdata: cfgdata.clone(),
        })?;
        let response = parse_save_response(&body)?;
        info!(
            "save_cfg answered {:?} ({} errors, {} warnings)",
            response.status,
            response.errors.len(),
            response.warnings.len()
        );
        Ok(response)
    }
}

/// `get_cfg` body: a JSON object, or `null`/empty when nothing is stored.
pub fn parse_current_config(body: &str) -> Result<Option<Value>, BackendError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    let value: Value = serde_json::from_str(body).map_err(|source| BackendError::JsonParse {
        context: "get_cfg response".to_string(),
        source,
    })?;
    Ok(match value {
        Value::Null => None,
        Value::Object(ref map) if map.is_empty() => None,
        other => Some(other),
    })
}

pub fn parse_save_response(body: &str) -> Result<SaveResponse, BackendError> {
    serde_json::from_str(body).map_err(|source| BackendError::JsonParse {
        context: "save_cfg response".to_string(),
        source,
    })
}

impl<T: ConfigBackend + ?Sized> ConfigBackend for Box<T> {
    fn get_cfg(&self) -> Result<Option<Value>, BackendError> {
        (**self).get_cfg()
    }

    fn save_cfg(&self, cfgdata: &FlatConfig) -> Result<SaveResponse, BackendError> {
        (**self).save_cfg(cfgdata)
    }
}
