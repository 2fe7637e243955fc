use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

// ============================================================================
// CLI Argument Parsing (clap derive)
// ============================================================================

#[derive(Parser, Debug)]
#[command(
    name = "igm-config-ui",
    version,
    about = "Schema-driven configuration editor for the IGM pipeline"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Backend `/ajax/` endpoint
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Use a local folder (igm-config.json) instead of the HTTP backend
    #[arg(long, global = true)]
    pub folder: Option<String>,

    /// Path to settings file (default: igm-config-ui.yaml in current dir)
    #[arg(long, global = true)]
    pub settings: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render the form built from a schema (and optional configuration)
    Show {
        /// Schema JSON file
        #[arg(long)]
        schema: String,

        /// Configuration JSON file to load into the form
        #[arg(long)]
        config: Option<String>,

        /// Edits applied before rendering: path=value
        #[arg(long = "set")]
        set: Vec<String>,

        /// Optional groups to switch on
        #[arg(long)]
        enable: Vec<String>,
    },

    /// Print the flat path -> value mapping of a configuration file
    Flatten {
        /// Configuration JSON file
        #[arg(long)]
        config: String,
    },

    /// Print what the form would submit
    Export {
        #[arg(long)]
        schema: String,

        #[arg(long)]
        config: Option<String>,

        #[arg(long = "set")]
        set: Vec<String>,

        #[arg(long)]
        enable: Vec<String>,

        #[arg(long)]
        disable: Vec<String>,

        /// Output format: flat, nested
        #[arg(long, default_value = "flat")]
        format: String,
    },

    /// Load the stored configuration, apply edits and save it through the backend
    Save {
        #[arg(long)]
        schema: String,

        #[arg(long = "set")]
        set: Vec<String>,

        #[arg(long)]
        enable: Vec<String>,

        #[arg(long)]
        disable: Vec<String>,
    },

    /// Print the configuration currently stored by the backend
    Fetch,
}

// ============================================================================
// Settings File Model (optional YAML)
// ============================================================================

/// Optional YAML settings file: `igm-config-ui.yaml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppSettings {
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub trace: TraceSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct BackendSettings {
    pub endpoint: Option<String>,
    pub folder: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TraceSettings {
    /// JSONL event journal; tracing is off when unset
    pub path: Option<String>,
}

pub const DEFAULT_SETTINGS_FILE: &str = "igm-config-ui.yaml";

// ============================================================================
// Settings File Loading
// ============================================================================

/// Load settings from a YAML file. Returns defaults if file is missing or malformed.
pub fn load_settings(path: Option<&str>) -> AppSettings {
    let settings_path = path.unwrap_or(DEFAULT_SETTINGS_FILE);
    match std::fs::read_to_string(settings_path) {
        Ok(content) => serde_yaml::from_str(&content).unwrap_or_default(),
        Err(_) => AppSettings::default(),
    }
}

/// Where the backend lives, after merging CLI flags over the settings file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendTarget {
    Http(String),
    Folder(String),
}

/// CLI > settings > default endpoint. A folder wins over an endpoint at the same level.
pub fn resolve_backend_target(cli: &Cli, settings: &AppSettings) -> BackendTarget {
    if let Some(folder) = &cli.folder {
        return BackendTarget::Folder(folder.clone());
    }
    if let Some(endpoint) = &cli.endpoint {
        return BackendTarget::Http(endpoint.clone());
    }
    if let Some(folder) = &settings.backend.folder {
        return BackendTarget::Folder(folder.clone());
    }
    BackendTarget::Http(
        settings
            .backend
            .endpoint
            .clone()
            .unwrap_or_else(|| crate::backend::client::DEFAULT_ENDPOINT.to_string()),
    )
}

/// Map `-v` occurrences to a log filter.
pub fn log_level(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
