use std::cell::{Cell, RefCell};

use igm_config_ui::backend::{
    backend_model::{SaveResponse, SaveStatus},
    client::{ConfigBackend, HttpBackend},
    error::BackendError,
};
use igm_config_ui::path::codec::{FlatConfig, unflatten_all};
use serde_json::Value;

/// Nothing listens on the discard port, so requests fail at the transport layer.
pub const UNREACHABLE_ENDPOINT: &str = "http://127.0.0.1:9/ajax/";

/// In-memory backend double: stores whatever it is sent, or fails on demand.
#[derive(Default)]
pub struct MemoryBackend {
    pub stored: RefCell<Option<Value>>,
    pub received: RefCell<Vec<FlatConfig>>,
    pub reject_with: Option<Vec<String>>,
    pub unreachable: Cell<bool>,
}

impl MemoryBackend {
    pub fn with_stored(cfg: Value) -> Self {
        Self {
            stored: RefCell::new(Some(cfg)),
            ..Default::default()
        }
    }
}

impl ConfigBackend for MemoryBackend {
    fn get_cfg(&self) -> Result<Option<Value>, BackendError> {
        if self.unreachable.get() {
            return HttpBackend::new(UNREACHABLE_ENDPOINT).get_cfg();
        }
        Ok(self.stored.borrow().clone())
    }

    fn save_cfg(&self, cfgdata: &FlatConfig) -> Result<SaveResponse, BackendError> {
        if self.unreachable.get() {
            return HttpBackend::new(UNREACHABLE_ENDPOINT).save_cfg(cfgdata);
        }
        self.received.borrow_mut().push(cfgdata.clone());

        if let Some(errors) = &self.reject_with {
            return Ok(SaveResponse {
                status: SaveStatus::Error,
                cfg: None,
                errors: errors.clone(),
                warnings: vec![],
                reason: None,
            });
        }

        let cfg = unflatten_all(cfgdata).unwrap();
        *self.stored.borrow_mut() = Some(cfg.clone());
        Ok(SaveResponse {
            status: SaveStatus::Ok,
            cfg: Some(cfg),
            errors: vec![],
            warnings: vec!["stored in memory".into()],
            reason: None,
        })
    }
}
