use std::{fs::OpenOptions, io::Write, path::Path, sync::Mutex};

use log::warn;

use crate::trace::trace::FormEvent;

/// Appends [`FormEvent`]s to a file, one JSON object per line.
pub struct TraceLogger {
    file: Option<Mutex<std::fs::File>>,
}

impl TraceLogger {
    /// Open (or create) the journal. Failure disables tracing instead of erroring.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match OpenOptions::new().create(true).append(true).open(path) {
            Ok(f) => Self {
                file: Some(Mutex::new(f)),
            },
            Err(e) => {
                warn!("could not open trace file '{}': {}", path.display(), e);
                Self::disabled()
            }
        }
    }

    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    pub fn log(&self, event: &FormEvent) {
        let file_mutex = match &self.file {
            Some(f) => f,
            None => return, // tracing disabled
        };

        let json = match serde_json::to_string(event) {
            Ok(j) => j,
            Err(e) => {
                warn!("failed to serialize trace event: {}", e);
                return;
            }
        };

        let mut file = match file_mutex.lock() {
            Ok(f) => f,
            Err(e) => {
                warn!("trace logger lock poisoned: {}", e);
                return;
            }
        };

        if let Err(e) = writeln!(file, "{}", json) {
            warn!("failed to write trace event: {}", e);
        }
    }
}
