use clap::Parser;
use igm_config_ui::cli::commands::{
    FormEdits, cmd_export, cmd_fetch, cmd_flatten, cmd_save, cmd_show,
};
use igm_config_ui::cli::config::{Cli, Commands, load_settings, log_level, resolve_backend_target};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = load_settings(cli.settings.as_deref());

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level(cli.verbose)))
        .init();

    // Resolve backend: CLI > settings > defaults
    let target = resolve_backend_target(&cli, &settings);
    let trace_path = settings.trace.path.as_deref();

    match cli.command {
        Commands::Show {
            schema,
            config,
            set,
            enable,
        } => {
            let edits = FormEdits {
                set,
                enable,
                disable: vec![],
            };
            cmd_show(&schema, config.as_deref(), &edits)?;
        }
        Commands::Flatten { config } => {
            cmd_flatten(&config)?;
        }
        Commands::Export {
            schema,
            config,
            set,
            enable,
            disable,
            format,
        } => {
            let edits = FormEdits { set, enable, disable };
            cmd_export(&schema, config.as_deref(), &edits, &format)?;
        }
        Commands::Save {
            schema,
            set,
            enable,
            disable,
        } => {
            let edits = FormEdits { set, enable, disable };
            let accepted = cmd_save(&schema, &edits, &target, trace_path)?;
            if !accepted {
                std::process::exit(1);
            }
        }
        Commands::Fetch => {
            cmd_fetch(&target)?;
        }
    }

    Ok(())
}
