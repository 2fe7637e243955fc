use log::{info, warn};
use serde_json::Value;

use crate::{
    backend::{backend_model::SaveResponse, client::ConfigBackend, error::BackendError},
    form::{
        builder::build_form,
        form_model::{ConfigForm, UpdateSummary},
    },
    schema::schema_model::Schema,
    trace::{
        logger::TraceLogger,
        trace::{EventKind, FormEvent},
    },
};

pub mod backend;
pub mod cli;
pub mod form;
pub mod path;
pub mod report;
pub mod schema;
pub mod trace;

// =========================================================================
// Session: one form bound to one backend
// =========================================================================

/// A configuration form together with the backend it loads from and saves to.
///
/// `save` takes `&mut self`, so a second save cannot start while one is in
/// flight.
pub struct ConfigSession<B: ConfigBackend> {
    backend: B,
    form: ConfigForm,
    current_cfg: Option<Value>,
    tracer: TraceLogger,
}

impl<B: ConfigBackend> ConfigSession<B> {
    /// Fetch the current configuration and build the form around it.
    pub fn open(backend: B, schema: Schema, tracer: TraceLogger) -> Result<Self, BackendError> {
        let current_cfg = backend.get_cfg()?;
        let form = build_form(schema, current_cfg.as_ref());

        tracer.log(&FormEvent::now(EventKind::FormBuilt).with_count(form.control_count()));
        info!(
            "form opened ({})",
            if current_cfg.is_some() { "existing configuration" } else { "defaults" }
        );

        Ok(Self {
            backend,
            form,
            current_cfg,
            tracer,
        })
    }

    pub fn form(&self) -> &ConfigForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ConfigForm {
        &mut self.form
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Last configuration the backend reported as stored.
    pub fn current_cfg(&self) -> Option<&Value> {
        self.current_cfg.as_ref()
    }

    /// Re-fetch the stored configuration and load it into the form.
    pub fn reload(&mut self) -> Result<UpdateSummary, BackendError> {
        let cfg = self.backend.get_cfg()?;
        let summary = self.form.update(cfg.as_ref());
        self.current_cfg = cfg;

        self.tracer.log(
            &FormEvent::now(EventKind::ConfigLoaded)
                .with_count(summary.applied)
                .with_paths(&summary.unknown),
        );
        Ok(summary)
    }

    /// Send the visible form values to the backend.
    ///
    /// On a transport failure the form is left as it was so the caller can
    /// retry; nothing is retried here.
    pub fn save(&mut self) -> Result<SaveResponse, BackendError> {
        let cfgdata = self.form.get_config();
        self.tracer.log(
            &FormEvent::now(EventKind::SaveRequested)
                .with_count(cfgdata.len())
                .with_paths(cfgdata.keys()),
        );

        let response = match self.backend.save_cfg(&cfgdata) {
            Ok(r) => r,
            Err(e) => {
                warn!("save failed: {}", e);
                self.tracer
                    .log(&FormEvent::now(EventKind::SaveFailed).with_reason(&e));
                return Err(e);
            }
        };

        if response.is_ok() {
            self.current_cfg = response.cfg.clone();
            self.tracer
                .log(&FormEvent::now(EventKind::SaveCompleted).with_response(&response));
        } else {
            warn!("backend rejected configuration: {} errors", response.errors.len());
            self.tracer
                .log(&FormEvent::now(EventKind::SaveRejected).with_response(&response));
        }

        Ok(response)
    }
}
